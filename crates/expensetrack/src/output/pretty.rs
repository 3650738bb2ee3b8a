//! Pretty output formatting.

use expensetrack_core::expense::Expense;
use expensetrack_core::storage::{keys, ExpensePage};

/// Format an expense for display.
pub fn format_expense(expense: &Expense) -> String {
    let mut output = format!(
        "{} {}\n  ID: {}\n  Date: {}",
        expense.merchant_name,
        expense.amount,
        expense.expense_id,
        keys::format_receipt_date(expense.receipt_date)
    );
    if let Some(category) = &expense.category {
        output.push_str(&format!("\n  Category: {}", category));
    }
    if let Some(receipt) = &expense.receipt {
        output.push_str(&format!(
            "\n  Receipt: s3://{}/{} ({})",
            receipt.bucket, receipt.key, receipt.content_type
        ));
    }
    for (key, value) in &expense.others {
        output.push_str(&format!("\n  {}: {}", key, value));
    }
    output.push_str(&format!("\n  Created: {}", expense.created_at));
    if let Some(updated_at) = expense.updated_at {
        output.push_str(&format!("\n  Updated: {}", updated_at));
    }
    output
}

/// Format expenses for display.
pub fn format_expenses(expenses: &[Expense]) -> String {
    if expenses.is_empty() {
        return "No expenses found.".to_string();
    }
    let mut output = format!("EXPENSES ({})\n", expenses.len());
    output.push_str(&"-".repeat(40));
    for expense in expenses {
        output.push_str(&format!("\n{}", format_expense(expense)));
        output.push('\n');
    }
    output
}

/// Format a listing page with its total and continuation cursor.
pub fn format_page(page: &ExpensePage) -> String {
    let mut output = format_expenses(&page.expenses);
    if !page.expenses.is_empty() {
        output.push_str(&format!("{}\nTotal: {}", "-".repeat(40), page.total_amount()));
    }
    if let Some(cursor) = &page.next_cursor {
        output.push_str(&format!("\nMore results: --cursor {}", cursor));
    }
    output
}
