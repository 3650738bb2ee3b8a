mod cursor;
mod error;
mod exit_code;
pub mod keys;
mod traits;
mod types;

pub use cursor::Cursor;
pub use error::{CursorError, DateRangeError, RepositoryError, Result};
pub use exit_code::repository_error_to_exit_code;
pub use traits::ExpenseStore;
pub use types::{DateRange, ExpenseKey, ExpensePage, PageRequest};
