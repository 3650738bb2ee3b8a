//! JSON output formatting.

use expensetrack_core::storage::ExpensePage;
use serde_json::json;

/// Format a value as JSON.
pub fn format_json<T: serde::Serialize>(value: &T) -> String {
    serde_json::to_string(value).unwrap_or_default()
}

/// Format a listing page as JSON, with the cursor encoded for reuse.
pub fn format_page_json(page: &ExpensePage) -> String {
    let value = json!({
        "expenses": page.expenses,
        "count": page.expenses.len(),
        "totalAmount": page.total_amount(),
        "nextCursor": page.next_cursor.as_ref().map(|c| c.encode()),
    });
    value.to_string()
}
