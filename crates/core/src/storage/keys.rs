//! Key generation functions for the single-table layout.
//!
//! Pure functions for generating partition and sort keys. All functions are
//! sync and have no side effects.
//!
//! | Attribute | Pattern |
//! |---|---|
//! | `PK` | `USER#<user_id>` |
//! | `SK` | `DATE#<receipt_date>#<expense_id>` |
//! | `GSI1PK` | `EXPENSE#<expense_id>` |
//! | `GSI1SK` | `USER#<user_id>` |

use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

use super::DateRange;

// ============================================================================
// Key prefixes
// ============================================================================

pub const USER_PREFIX: &str = "USER#";
pub const DATE_PREFIX: &str = "DATE#";
pub const EXPENSE_PREFIX: &str = "EXPENSE#";

/// Format used for receipt dates inside sort keys.
///
/// Fixed width, so lexicographic order matches chronological order.
pub const RECEIPT_DATE_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// Render a receipt date the way it appears in keys and items.
pub fn format_receipt_date(receipt_date: DateTime<Utc>) -> String {
    receipt_date.format(RECEIPT_DATE_FORMAT).to_string()
}

// ============================================================================
// Primary keys
// ============================================================================

/// Generate partition key for an Expense.
///
/// Pattern: `USER#<user_id>`
pub fn expense_pk(user_id: &str) -> String {
    format!("{USER_PREFIX}{user_id}")
}

/// Generate sort key for an Expense.
///
/// Pattern: `DATE#<receipt_date>#<expense_id>`
///
/// The expense ID breaks ties between receipts sharing a timestamp.
pub fn expense_sk(receipt_date: DateTime<Utc>, expense_id: Uuid) -> String {
    format!(
        "{DATE_PREFIX}{}#{expense_id}",
        format_receipt_date(receipt_date)
    )
}

/// Generate the start bound for a date range query on SK.
///
/// Pattern: `DATE#<date>`
///
/// Sorts before every timestamp on that day.
pub fn expense_sk_start(date: NaiveDate) -> String {
    format!("{DATE_PREFIX}{}", date.format("%Y-%m-%d"))
}

/// Generate the end bound for a date range query on SK.
///
/// Pattern: `DATE#<date>~`
///
/// The `~` character (ASCII 126) is higher than the `T` that follows the
/// date, so every timestamp on the end date is included.
pub fn expense_sk_end(date: NaiveDate) -> String {
    format!("{DATE_PREFIX}{}~", date.format("%Y-%m-%d"))
}

/// Inclusive SK bounds for a query, covering the whole partition when no
/// range is given.
pub fn expense_sk_bounds(date_range: Option<&DateRange>) -> (String, String) {
    match date_range {
        Some(range) => (expense_sk_start(range.start), expense_sk_end(range.end)),
        None => (DATE_PREFIX.to_string(), format!("{DATE_PREFIX}~")),
    }
}

// ============================================================================
// GSI1 keys
// ============================================================================

/// Generate GSI1 partition key for Expense ID lookup.
///
/// Pattern: `EXPENSE#<expense_id>`
pub fn expense_gsi1_pk(expense_id: Uuid) -> String {
    format!("{EXPENSE_PREFIX}{expense_id}")
}

/// Generate GSI1 sort key for Expense ID lookup.
///
/// Pattern: `USER#<user_id>`
pub fn expense_gsi1_sk(user_id: &str) -> String {
    format!("{USER_PREFIX}{user_id}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn id() -> Uuid {
        Uuid::parse_str("550e8400-e29b-41d4-a716-446655440003").unwrap()
    }

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    #[test]
    fn test_expense_pk() {
        assert_eq!(expense_pk("12345"), "USER#12345");
    }

    #[test]
    fn test_expense_sk() {
        let receipt_date = Utc.with_ymd_and_hms(2025, 1, 12, 0, 0, 0).unwrap();
        assert_eq!(
            expense_sk(receipt_date, id()),
            "DATE#2025-01-12T00:00:00Z#550e8400-e29b-41d4-a716-446655440003"
        );
    }

    #[test]
    fn test_expense_sk_orders_chronologically() {
        let earlier = Utc.with_ymd_and_hms(2024, 12, 31, 23, 59, 59).unwrap();
        let later = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        let far_later = Utc.with_ymd_and_hms(2025, 10, 1, 0, 0, 0).unwrap();

        assert!(expense_sk(earlier, Uuid::from_u128(u128::MAX)) < expense_sk(later, Uuid::nil()));
        assert!(expense_sk(later, id()) < expense_sk(far_later, id()));
    }

    #[test]
    fn test_expense_gsi1_keys() {
        assert_eq!(
            expense_gsi1_pk(id()),
            "EXPENSE#550e8400-e29b-41d4-a716-446655440003"
        );
        assert_eq!(expense_gsi1_sk("12345"), "USER#12345");
    }

    #[test]
    fn test_expense_sk_range_bounds() {
        let day = date(2025, 1, 12);
        assert_eq!(expense_sk_start(day), "DATE#2025-01-12");
        assert_eq!(expense_sk_end(day), "DATE#2025-01-12~");
    }

    #[test]
    fn test_range_bounds_include_whole_days() {
        let range = DateRange::new(date(2025, 1, 12), date(2025, 1, 13)).unwrap();
        let (start, end) = expense_sk_bounds(Some(&range));

        let first = expense_sk(Utc.with_ymd_and_hms(2025, 1, 12, 0, 0, 0).unwrap(), Uuid::nil());
        let last = expense_sk(
            Utc.with_ymd_and_hms(2025, 1, 13, 23, 59, 59).unwrap(),
            Uuid::from_u128(u128::MAX),
        );
        let before = expense_sk(
            Utc.with_ymd_and_hms(2025, 1, 11, 23, 59, 59).unwrap(),
            Uuid::from_u128(u128::MAX),
        );
        let after = expense_sk(Utc.with_ymd_and_hms(2025, 1, 14, 0, 0, 0).unwrap(), Uuid::nil());

        assert!(start <= first && first <= end);
        assert!(start <= last && last <= end);
        assert!(before < start);
        assert!(after > end);
    }

    #[test]
    fn test_unbounded_range_covers_partition() {
        let (start, end) = expense_sk_bounds(None);
        let sk = expense_sk(Utc.with_ymd_and_hms(9999, 12, 31, 23, 59, 59).unwrap(), Uuid::from_u128(u128::MAX));
        assert_eq!(start, "DATE#");
        assert!(start < sk && sk < end);
    }
}
