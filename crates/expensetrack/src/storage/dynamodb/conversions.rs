//! DynamoDB attribute conversion functions.
//!
//! Pure functions for converting between DynamoDB AttributeValue maps and domain types.
//! These are testable in isolation without DynamoDB access.

use std::collections::{BTreeMap, HashMap};
use std::str::FromStr;

use aws_sdk_dynamodb::types::AttributeValue;
use chrono::{DateTime, SecondsFormat, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use expensetrack_core::expense::{parse_receipt_date, Expense, ReceiptRef};
use expensetrack_core::storage::{keys, Cursor, ExpenseKey, RepositoryError};

pub const ENTITY_TYPE_EXPENSE: &str = "EXPENSE";

type Item = HashMap<String, AttributeValue>;

// ============================================================================
// Expense conversions
// ============================================================================

/// Convert an Expense to DynamoDB item.
pub fn expense_to_item(expense: &Expense) -> Item {
    let mut item = key_to_item(&expense.key());

    item.insert(
        "GSI1PK".to_string(),
        AttributeValue::S(keys::expense_gsi1_pk(expense.expense_id)),
    );
    item.insert(
        "GSI1SK".to_string(),
        AttributeValue::S(keys::expense_gsi1_sk(&expense.user_id)),
    );

    // Entity type
    item.insert(
        "entityType".to_string(),
        AttributeValue::S(ENTITY_TYPE_EXPENSE.to_string()),
    );

    // Data
    item.insert(
        "userID".to_string(),
        AttributeValue::S(expense.user_id.clone()),
    );
    item.insert(
        "expenseID".to_string(),
        AttributeValue::S(expense.expense_id.to_string()),
    );
    item.insert(
        "merchantName".to_string(),
        AttributeValue::S(expense.merchant_name.clone()),
    );
    if let Some(category) = &expense.category {
        item.insert("category".to_string(), AttributeValue::S(category.clone()));
    }
    item.insert(
        "amount".to_string(),
        AttributeValue::N(expense.amount.to_string()),
    );
    item.insert(
        "receiptDate".to_string(),
        AttributeValue::S(keys::format_receipt_date(expense.receipt_date)),
    );
    item.insert(
        "createdAt".to_string(),
        AttributeValue::S(format_timestamp(expense.created_at)),
    );
    if let Some(updated_at) = expense.updated_at {
        item.insert(
            "updatedAt".to_string(),
            AttributeValue::S(format_timestamp(updated_at)),
        );
    }
    if let Some(receipt) = &expense.receipt {
        item.insert("receipt".to_string(), receipt_to_attribute(receipt));
    }
    if !expense.others.is_empty() {
        let others = expense
            .others
            .iter()
            .map(|(k, v)| (k.clone(), AttributeValue::S(v.clone())))
            .collect();
        item.insert("others".to_string(), AttributeValue::M(others));
    }

    item
}

/// Convert a DynamoDB item to Expense.
pub fn item_to_expense(item: &Item) -> Result<Expense, RepositoryError> {
    let receipt_date = get_string(item, "receiptDate")?;

    Ok(Expense {
        user_id: get_string(item, "userID")?,
        expense_id: get_uuid(item, "expenseID")?,
        merchant_name: get_string(item, "merchantName")?,
        category: get_optional_string(item, "category"),
        amount: get_decimal(item, "amount")?,
        receipt_date: parse_receipt_date(&receipt_date)
            .map_err(|e| RepositoryError::InvalidData(format!("Invalid receiptDate: {e}")))?,
        created_at: get_datetime(item, "createdAt")?,
        updated_at: get_optional_datetime(item, "updatedAt")?,
        receipt: item.get("receipt").map(attribute_to_receipt).transpose()?,
        others: get_string_map(item, "others")?,
    })
}

/// Primary key attributes for an expense.
pub fn key_to_item(key: &ExpenseKey) -> Item {
    HashMap::from([
        ("PK".to_string(), AttributeValue::S(key.pk())),
        ("SK".to_string(), AttributeValue::S(key.sk())),
    ])
}

/// Timestamps are stored as RFC 3339 with millisecond precision.
pub fn format_timestamp(timestamp: DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Millis, true)
}

// ============================================================================
// Pagination
// ============================================================================

/// Build the ExclusiveStartKey a cursor resumes from.
pub fn cursor_to_start_key(user_id: &str, cursor: &Cursor) -> Item {
    HashMap::from([
        ("PK".to_string(), AttributeValue::S(keys::expense_pk(user_id))),
        (
            "SK".to_string(),
            AttributeValue::S(cursor.sort_key().to_string()),
        ),
    ])
}

/// Wrap a LastEvaluatedKey into a cursor.
pub fn last_evaluated_key_to_cursor(key: &Item) -> Result<Cursor, RepositoryError> {
    get_string(key, "SK").map(Cursor::from_sort_key)
}

// ============================================================================
// Conditions
// ============================================================================

/// Condition expression requiring the item to exist and still carry
/// `expected_updated_at`, with the attribute values it references.
pub fn expected_version_condition(
    expected_updated_at: Option<DateTime<Utc>>,
) -> (String, Option<Item>) {
    match expected_updated_at {
        Some(expected) => (
            "attribute_exists(PK) AND updatedAt = :expected".to_string(),
            Some(HashMap::from([(
                ":expected".to_string(),
                AttributeValue::S(format_timestamp(expected)),
            )])),
        ),
        None => (
            "attribute_exists(PK) AND attribute_not_exists(updatedAt)".to_string(),
            None,
        ),
    }
}

// ============================================================================
// Nested attributes
// ============================================================================

fn receipt_to_attribute(receipt: &ReceiptRef) -> AttributeValue {
    AttributeValue::M(HashMap::from([
        ("bucket".to_string(), AttributeValue::S(receipt.bucket.clone())),
        ("key".to_string(), AttributeValue::S(receipt.key.clone())),
        (
            "content_type".to_string(),
            AttributeValue::S(receipt.content_type.clone()),
        ),
        (
            "created_at".to_string(),
            AttributeValue::S(format_timestamp(receipt.created_at)),
        ),
    ]))
}

fn attribute_to_receipt(value: &AttributeValue) -> Result<ReceiptRef, RepositoryError> {
    let map = value
        .as_m()
        .map_err(|_| RepositoryError::InvalidData("Invalid field: receipt".to_string()))?;

    Ok(ReceiptRef {
        bucket: get_string(map, "bucket")?,
        key: get_string(map, "key")?,
        content_type: get_string(map, "content_type")?,
        created_at: get_datetime(map, "created_at")?,
    })
}

// ============================================================================
// Helper functions
// ============================================================================

/// Get a required string attribute.
fn get_string(item: &Item, key: &str) -> Result<String, RepositoryError> {
    item.get(key)
        .and_then(|v| v.as_s().ok())
        .map(|s| s.to_string())
        .ok_or_else(|| RepositoryError::InvalidData(format!("Missing or invalid field: {}", key)))
}

/// Get an optional string attribute.
fn get_optional_string(item: &Item, key: &str) -> Option<String> {
    item.get(key)
        .and_then(|v| v.as_s().ok())
        .map(|s| s.to_string())
}

/// Get a required UUID attribute.
fn get_uuid(item: &Item, key: &str) -> Result<Uuid, RepositoryError> {
    let s = get_string(item, key)?;
    Uuid::parse_str(&s)
        .map_err(|e| RepositoryError::InvalidData(format!("Invalid UUID {}: {}", key, e)))
}

/// Get a required number attribute as a decimal.
fn get_decimal(item: &Item, key: &str) -> Result<Decimal, RepositoryError> {
    let n = item
        .get(key)
        .and_then(|v| v.as_n().ok())
        .ok_or_else(|| RepositoryError::InvalidData(format!("Missing or invalid field: {}", key)))?;
    let amount = Decimal::from_str(n)
        .map_err(|e| RepositoryError::InvalidData(format!("Invalid number {}: {}", key, e)))?;
    Ok(expensetrack_core::expense::to_money(amount))
}

/// Get a required datetime attribute (RFC 3339 format).
fn get_datetime(item: &Item, key: &str) -> Result<DateTime<Utc>, RepositoryError> {
    let s = get_string(item, key)?;
    DateTime::parse_from_rfc3339(&s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| RepositoryError::InvalidData(format!("Invalid datetime {}: {}", key, e)))
}

fn get_optional_datetime(item: &Item, key: &str) -> Result<Option<DateTime<Utc>>, RepositoryError> {
    if !item.contains_key(key) {
        return Ok(None);
    }
    get_datetime(item, key).map(Some)
}

/// Get an optional map of strings; absent means empty.
fn get_string_map(item: &Item, key: &str) -> Result<BTreeMap<String, String>, RepositoryError> {
    let Some(value) = item.get(key) else {
        return Ok(BTreeMap::new());
    };
    let map = value
        .as_m()
        .map_err(|_| RepositoryError::InvalidData(format!("Invalid field: {}", key)))?;

    map.iter()
        .map(|(k, v)| {
            v.as_s().map(|s| (k.clone(), s.clone())).map_err(|_| {
                RepositoryError::InvalidData(format!("Invalid value for {}.{}", key, k))
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use expensetrack_core::expense::CreateExpenseRequest;

    fn sample_expense() -> Expense {
        Expense {
            user_id: "12345".to_string(),
            expense_id: Uuid::parse_str("550e8400-e29b-41d4-a716-446655440003").unwrap(),
            merchant_name: "Bhatbhateni Superstore".to_string(),
            category: Some("Groceries".to_string()),
            amount: Decimal::new(54075, 2),
            receipt_date: Utc.with_ymd_and_hms(2025, 1, 12, 0, 0, 0).unwrap(),
            created_at: DateTime::parse_from_rfc3339("2025-01-12T08:30:00.123Z")
                .unwrap()
                .with_timezone(&Utc),
            updated_at: None,
            receipt: Some(ReceiptRef {
                bucket: "expense-receipts".to_string(),
                key: "receipts/12345/550e8400.jpg".to_string(),
                content_type: "image/jpeg".to_string(),
                created_at: DateTime::parse_from_rfc3339("2025-01-12T08:31:00Z")
                    .unwrap()
                    .with_timezone(&Utc),
            }),
            others: BTreeMap::from([("payment".to_string(), "esewa".to_string())]),
        }
    }

    #[test]
    fn test_expense_round_trip() {
        let expense = sample_expense();
        let item = expense_to_item(&expense);
        let parsed = item_to_expense(&item).unwrap();

        assert_eq!(parsed, expense);
    }

    #[test]
    fn test_created_expense_with_precise_receipt_round_trips() {
        let json = r#"{
            "merchant_name": "Bhatbhateni Superstore",
            "amount": "540.75",
            "receipt_date": "2025-01-12",
            "receipt": {
                "bucket": "expense-receipts",
                "key": "receipts/12345/550e8400.jpg",
                "content_type": "image/jpeg",
                "created_at": "2025-01-12T08:31:00.123456789Z"
            }
        }"#;
        let request: CreateExpenseRequest = serde_json::from_str(json).unwrap();
        let expense = request.into_expense(
            "12345",
            Uuid::new_v4(),
            Utc.with_ymd_and_hms(2025, 1, 12, 8, 30, 0).unwrap(),
        );

        let parsed = item_to_expense(&expense_to_item(&expense)).unwrap();

        assert_eq!(parsed, expense);
    }

    #[test]
    fn test_expense_item_has_correct_keys() {
        let item = expense_to_item(&sample_expense());

        assert_eq!(item.get("PK").unwrap().as_s().unwrap(), "USER#12345");
        assert_eq!(
            item.get("SK").unwrap().as_s().unwrap(),
            "DATE#2025-01-12T00:00:00Z#550e8400-e29b-41d4-a716-446655440003"
        );
        assert_eq!(
            item.get("GSI1PK").unwrap().as_s().unwrap(),
            "EXPENSE#550e8400-e29b-41d4-a716-446655440003"
        );
        assert_eq!(item.get("GSI1SK").unwrap().as_s().unwrap(), "USER#12345");
        assert_eq!(item.get("entityType").unwrap().as_s().unwrap(), "EXPENSE");
    }

    #[test]
    fn test_expense_item_attribute_types() {
        let item = expense_to_item(&sample_expense());

        assert_eq!(item.get("amount").unwrap().as_n().unwrap(), "540.75");
        assert_eq!(
            item.get("createdAt").unwrap().as_s().unwrap(),
            "2025-01-12T08:30:00.123Z"
        );
        assert!(item.get("receipt").unwrap().is_m());
        assert!(item.get("others").unwrap().is_m());
        assert!(!item.contains_key("updatedAt"));
    }

    #[test]
    fn test_optional_attributes_are_omitted() {
        let mut expense = sample_expense();
        expense.category = None;
        expense.receipt = None;
        expense.others.clear();

        let item = expense_to_item(&expense);

        assert!(!item.contains_key("category"));
        assert!(!item.contains_key("receipt"));
        assert!(!item.contains_key("others"));
        assert_eq!(item_to_expense(&item).unwrap(), expense);
    }

    #[test]
    fn test_whole_number_amount_reads_back_with_cents() {
        let mut item = expense_to_item(&sample_expense());
        item.insert("amount".to_string(), AttributeValue::N("540".to_string()));

        let parsed = item_to_expense(&item).unwrap();

        assert_eq!(parsed.amount.to_string(), "540.00");
    }

    #[test]
    fn test_missing_field_is_invalid_data() {
        let mut item = expense_to_item(&sample_expense());
        item.remove("merchantName");

        let result = item_to_expense(&item);

        assert!(matches!(result, Err(RepositoryError::InvalidData(_))));
    }

    #[test]
    fn test_cursor_start_key() {
        let expense = sample_expense();
        let cursor = Cursor::from_sort_key(expense.key().sk());

        let start_key = cursor_to_start_key("12345", &cursor);

        assert_eq!(start_key, key_to_item(&expense.key()));
        assert_eq!(last_evaluated_key_to_cursor(&start_key).unwrap(), cursor);
    }

    #[test]
    fn test_expected_version_condition() {
        let (expr, values) = expected_version_condition(None);
        assert_eq!(expr, "attribute_exists(PK) AND attribute_not_exists(updatedAt)");
        assert!(values.is_none());

        let expected = DateTime::parse_from_rfc3339("2025-01-13T10:00:00.500Z")
            .unwrap()
            .with_timezone(&Utc);
        let (expr, values) = expected_version_condition(Some(expected));
        assert_eq!(expr, "attribute_exists(PK) AND updatedAt = :expected");
        assert_eq!(
            values.unwrap().get(":expected").unwrap().as_s().unwrap(),
            "2025-01-13T10:00:00.500Z"
        );
    }
}
