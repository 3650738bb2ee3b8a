//! Mock data generation for testing and seeding.
//!
//! Pure functions with no side effects; usable from unit tests, integration
//! tests and the CLI `seed` command.

use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;

use super::requests::CreateExpenseRequest;

const MERCHANTS: [(&str, &str); 8] = [
    ("Bhatbhateni Superstore", "Groceries"),
    ("Himalayan Java", "Food"),
    ("Nepal Oil Corporation", "Fuel"),
    ("Daraz", "Shopping"),
    ("Buddha Air", "Travel"),
    ("Ncell", "Utilities"),
    ("Big Movies", "Entertainment"),
    ("Hospital Pharmacy", "Health"),
];

/// Generate `count` expense requests, one per day going back from `latest`.
///
/// Merchants, categories and amounts cycle deterministically so the same
/// arguments always produce the same requests.
///
/// # Example
///
/// ```
/// use expensetrack_core::expense::generate_seed_expenses;
/// use chrono::{TimeZone, Utc};
///
/// let latest = Utc.with_ymd_and_hms(2025, 1, 31, 0, 0, 0).unwrap();
/// let requests = generate_seed_expenses(latest, 10);
///
/// assert_eq!(requests.len(), 10);
/// ```
pub fn generate_seed_expenses(latest: DateTime<Utc>, count: u32) -> Vec<CreateExpenseRequest> {
    (0..count)
        .map(|i| {
            let (merchant, category) = MERCHANTS[i as usize % MERCHANTS.len()];
            // 3.25, 17.50, 31.75, ... wrapping below 1000.
            let cents = 325 + (i64::from(i) * 1_425) % 99_675;
            CreateExpenseRequest::new(
                merchant,
                Decimal::new(cents, 2),
                latest - Duration::days(i64::from(i)),
            )
            .with_category(category)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expense::validate_expense;
    use chrono::TimeZone;
    use uuid::Uuid;

    fn latest() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 31, 0, 0, 0).unwrap()
    }

    #[test]
    fn test_generates_requested_count() {
        assert_eq!(generate_seed_expenses(latest(), 0).len(), 0);
        assert_eq!(generate_seed_expenses(latest(), 25).len(), 25);
    }

    #[test]
    fn test_is_deterministic() {
        assert_eq!(
            generate_seed_expenses(latest(), 12),
            generate_seed_expenses(latest(), 12)
        );
    }

    #[test]
    fn test_one_receipt_per_day_going_back() {
        let requests = generate_seed_expenses(latest(), 3);
        assert_eq!(requests[0].receipt_date, latest());
        assert_eq!(requests[2].receipt_date, latest() - Duration::days(2));
    }

    #[test]
    fn test_generated_expenses_are_valid() {
        for request in generate_seed_expenses(latest(), 200) {
            let expense = request.into_expense("seed-user", Uuid::new_v4(), latest());
            assert!(validate_expense(&expense).is_ok(), "{expense:?}");
        }
    }
}
