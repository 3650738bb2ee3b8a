use std::collections::BTreeMap;

use chrono::{DateTime, Duration, SubsecRound, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::storage::ExpenseKey;

/// Reference to a receipt image held in external blob storage.
///
/// Only the location is persisted here, never the binary itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReceiptRef {
    pub bucket: String,
    pub key: String,
    pub content_type: String,
    pub created_at: DateTime<Utc>,
}

impl ReceiptRef {
    /// Creates a receipt reference stamped with the current time.
    pub fn new(
        bucket: impl Into<String>,
        key: impl Into<String>,
        content_type: impl Into<String>,
    ) -> Self {
        Self {
            bucket: bucket.into(),
            key: key.into(),
            content_type: content_type.into(),
            created_at: now(),
        }
    }

    /// Truncates `created_at` to the millisecond precision it is stored with.
    pub fn truncated(self) -> Self {
        Self {
            created_at: self.created_at.trunc_subsecs(3),
            ..self
        }
    }
}

/// A single expense owned by a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Expense {
    #[serde(rename = "userID")]
    pub user_id: String,
    #[serde(rename = "expenseID")]
    pub expense_id: Uuid,
    pub merchant_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    /// Always carries exactly two fractional digits.
    pub amount: Decimal,
    /// Date printed on the receipt. Part of the sort key.
    pub receipt_date: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub receipt: Option<ReceiptRef>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub others: BTreeMap<String, String>,
}

impl Expense {
    /// Returns the primary key this expense is stored under.
    pub fn key(&self) -> ExpenseKey {
        ExpenseKey::new(self.user_id.clone(), self.receipt_date, self.expense_id)
    }

    /// Returns true if this expense is owned by `user_id`.
    pub fn is_owned_by(&self, user_id: &str) -> bool {
        self.user_id == user_id
    }
}

/// Current time truncated to the millisecond precision timestamps are stored with.
pub fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(3)
}

/// Computes the next `updatedAt` value.
///
/// The result is strictly greater than `previous` so it can be used as an
/// expected-value token for conditional writes.
pub fn next_updated_at(previous: Option<DateTime<Utc>>, now: DateTime<Utc>) -> DateTime<Utc> {
    match previous {
        Some(prev) if now <= prev => prev + Duration::milliseconds(1),
        _ => now,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn ts(secs: i64, millis: u32) -> DateTime<Utc> {
        Utc.timestamp_opt(secs, millis * 1_000_000).unwrap()
    }

    #[test]
    fn test_now_has_millisecond_precision() {
        let t = now();
        assert_eq!(t.timestamp_subsec_nanos() % 1_000_000, 0);
    }

    #[test]
    fn test_next_updated_at_without_previous() {
        let t = ts(1_700_000_000, 5);
        assert_eq!(next_updated_at(None, t), t);
    }

    #[test]
    fn test_next_updated_at_moves_forward_on_clock_tie() {
        let prev = ts(1_700_000_000, 5);
        assert_eq!(next_updated_at(Some(prev), prev), ts(1_700_000_000, 6));
    }

    #[test]
    fn test_next_updated_at_moves_forward_on_clock_skew() {
        let prev = ts(1_700_000_010, 0);
        let skewed = ts(1_700_000_000, 0);
        assert_eq!(next_updated_at(Some(prev), skewed), ts(1_700_000_010, 1));
    }

    #[test]
    fn test_next_updated_at_uses_clock_when_ahead() {
        let prev = ts(1_700_000_000, 0);
        let later = ts(1_700_000_100, 0);
        assert_eq!(next_updated_at(Some(prev), later), later);
    }

    #[test]
    fn test_expense_serializes_with_item_attribute_names() {
        let expense = Expense {
            user_id: "12345".to_string(),
            expense_id: Uuid::parse_str("550e8400-e29b-41d4-a716-446655440003").unwrap(),
            merchant_name: "Bhatbhateni Superstore".to_string(),
            category: None,
            amount: Decimal::new(54075, 2),
            receipt_date: ts(1_736_640_000, 0),
            created_at: ts(1_736_640_000, 0),
            updated_at: None,
            receipt: None,
            others: BTreeMap::new(),
        };

        let json = serde_json::to_value(&expense).unwrap();
        assert_eq!(json["userID"], "12345");
        assert_eq!(json["expenseID"], "550e8400-e29b-41d4-a716-446655440003");
        assert_eq!(json["merchantName"], "Bhatbhateni Superstore");
        assert_eq!(json["amount"], "540.75");
        assert!(json.get("category").is_none());
        assert!(json.get("others").is_none());
    }
}
