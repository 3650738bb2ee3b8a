mod error;
mod mock_data;
mod operations;
mod requests;
mod types;

pub use error::ExpenseError;
pub use mock_data::generate_seed_expenses;
pub use operations::{
    filter_expenses_by_category, is_reserved_attribute, parse_amount, parse_receipt_date,
    to_money, total_amount, validate_amount, validate_expense, validate_user_id, MAX_AMOUNT,
    RESERVED_ATTRIBUTES,
};
pub use requests::{
    CreateExpenseRequest, ListExpensesQuery, UpdateExpenseRequest, DEFAULT_LIST_LIMIT,
    MAX_LIST_LIMIT,
};
pub use types::{next_updated_at, now, Expense, ReceiptRef};
