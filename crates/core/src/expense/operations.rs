use chrono::{DateTime, NaiveDate, SubsecRound, Utc};
use rust_decimal::Decimal;

use super::error::ExpenseError;
use super::types::{Expense, ReceiptRef};

/// Attribute names used at the top level of a stored expense item.
/// Metadata keys may not shadow any of them.
pub const RESERVED_ATTRIBUTES: &[&str] = &[
    "PK",
    "SK",
    "GSI1PK",
    "GSI1SK",
    "entityType",
    "userID",
    "expenseID",
    "merchantName",
    "category",
    "amount",
    "receiptDate",
    "createdAt",
    "updatedAt",
    "receipt",
    "others",
];

const MAX_MERCHANT_LEN: usize = 500;
const MAX_CATEGORY_LEN: usize = 100;

/// Largest accepted amount: 999 999.99.
pub const MAX_AMOUNT: Decimal = Decimal::from_parts(99_999_999, 0, 0, false, 2);

/// Parses a receipt date from an RFC 3339 timestamp or a bare `YYYY-MM-DD` date.
///
/// Bare dates resolve to midnight UTC. Sub-second precision is dropped.
pub fn parse_receipt_date(input: &str) -> Result<DateTime<Utc>, ExpenseError> {
    let input = input.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(input) {
        return Ok(dt.with_timezone(&Utc).trunc_subsecs(0));
    }
    NaiveDate::parse_from_str(input, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
        .ok_or_else(|| ExpenseError::InvalidReceiptDate(input.to_string()))
}

/// Parses an amount from its textual form.
pub fn parse_amount(input: &str) -> Result<Decimal, ExpenseError> {
    input
        .trim()
        .parse::<Decimal>()
        .map_err(|_| ExpenseError::InvalidAmount(input.to_string()))
}

/// Rescales `amount` to two fractional digits when that loses no precision.
///
/// Amounts with more significant digits are returned unchanged so
/// [`validate_expense`] can reject them.
pub fn to_money(amount: Decimal) -> Decimal {
    let mut normalized = amount.normalize();
    if normalized.scale() > 2 {
        return amount;
    }
    normalized.rescale(2);
    normalized
}

/// Validates the caller-supplied owner identity.
pub fn validate_user_id(user_id: &str) -> Result<(), ExpenseError> {
    if user_id.trim().is_empty() {
        return Err(ExpenseError::EmptyUserId);
    }
    Ok(())
}

/// Validates an amount against the monetary rules.
pub fn validate_amount(amount: Decimal) -> Result<(), ExpenseError> {
    if amount.is_sign_negative() && !amount.is_zero() {
        return Err(ExpenseError::NegativeAmount);
    }
    if amount > MAX_AMOUNT {
        return Err(ExpenseError::AmountTooLarge);
    }
    if amount.normalize().scale() > 2 {
        return Err(ExpenseError::TooManyDecimalPlaces);
    }
    Ok(())
}

/// Validates an expense before creation or update.
pub fn validate_expense(expense: &Expense) -> Result<(), ExpenseError> {
    validate_user_id(&expense.user_id)?;

    if expense.merchant_name.trim().is_empty() {
        return Err(ExpenseError::EmptyMerchant);
    }
    if expense.merchant_name.chars().count() > MAX_MERCHANT_LEN {
        return Err(ExpenseError::MerchantTooLong);
    }
    if let Some(category) = &expense.category {
        if category.chars().count() > MAX_CATEGORY_LEN {
            return Err(ExpenseError::CategoryTooLong);
        }
    }

    validate_amount(expense.amount)?;

    if let Some(receipt) = &expense.receipt {
        validate_receipt(receipt)?;
    }

    for key in expense.others.keys() {
        if key.trim().is_empty() {
            return Err(ExpenseError::EmptyMetadataKey);
        }
        if is_reserved_attribute(key) {
            return Err(ExpenseError::ReservedMetadataKey(key.clone()));
        }
    }

    Ok(())
}

fn validate_receipt(receipt: &ReceiptRef) -> Result<(), ExpenseError> {
    if receipt.bucket.trim().is_empty() {
        return Err(ExpenseError::EmptyReceiptField("bucket"));
    }
    if receipt.key.trim().is_empty() {
        return Err(ExpenseError::EmptyReceiptField("key"));
    }
    if receipt.content_type.trim().is_empty() {
        return Err(ExpenseError::EmptyReceiptField("content_type"));
    }
    Ok(())
}

/// Returns true if `name` matches a top-level item attribute, ignoring case.
pub fn is_reserved_attribute(name: &str) -> bool {
    RESERVED_ATTRIBUTES
        .iter()
        .any(|reserved| reserved.eq_ignore_ascii_case(name))
}

/// Keeps expenses whose category matches, ignoring case.
pub fn filter_expenses_by_category(expenses: Vec<Expense>, category: &str) -> Vec<Expense> {
    expenses
        .into_iter()
        .filter(|e| {
            e.category
                .as_deref()
                .is_some_and(|c| c.eq_ignore_ascii_case(category))
        })
        .collect()
}

/// Sums the amounts of the given expenses, with two fractional digits.
pub fn total_amount(expenses: &[Expense]) -> Decimal {
    to_money(expenses.iter().map(|e| e.amount).sum())
}
