//! Request types for expense operations.
//!
//! Pure data types with no I/O. The field names follow the snake_case payload
//! shape clients already send (`merchant_name`, `receipt_date`, ...).

use std::collections::BTreeMap;

use chrono::{DateTime, SubsecRound, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::operations::to_money;
use super::types::{Expense, ReceiptRef};
use crate::serde::{
    deserialize_clearable, deserialize_clearable_string, deserialize_optional_receipt_date,
    deserialize_optional_string, deserialize_receipt_date,
};
use crate::storage::{Cursor, DateRange};

/// Default number of expenses returned per page.
pub const DEFAULT_LIST_LIMIT: u32 = 50;

/// Upper bound on the page size a caller may request.
pub const MAX_LIST_LIMIT: u32 = 100;

/// Request payload for creating a new expense.
///
/// The owner is supplied separately by the identity collaborator; the
/// expense ID and `createdAt` are assigned by the repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateExpenseRequest {
    pub merchant_name: String,
    #[serde(
        default,
        deserialize_with = "deserialize_optional_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub category: Option<String>,
    pub amount: Decimal,
    #[serde(deserialize_with = "deserialize_receipt_date")]
    pub receipt_date: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub receipt: Option<ReceiptRef>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub others: BTreeMap<String, String>,
}

impl CreateExpenseRequest {
    /// Create a request with the required fields.
    pub fn new(
        merchant_name: impl Into<String>,
        amount: Decimal,
        receipt_date: DateTime<Utc>,
    ) -> Self {
        Self {
            merchant_name: merchant_name.into(),
            category: None,
            amount,
            receipt_date,
            receipt: None,
            others: BTreeMap::new(),
        }
    }

    /// Set the category.
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    /// Attach a receipt reference.
    pub fn with_receipt(mut self, receipt: ReceiptRef) -> Self {
        self.receipt = Some(receipt);
        self
    }

    /// Add a free-form metadata pair.
    pub fn with_other(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.others.insert(key.into(), value.into());
        self
    }

    /// Convert into an Expense owned by `user_id`.
    ///
    /// Does not validate; run [`validate_expense`](super::validate_expense) on the result.
    pub fn into_expense(
        self,
        user_id: impl Into<String>,
        expense_id: Uuid,
        created_at: DateTime<Utc>,
    ) -> Expense {
        Expense {
            user_id: user_id.into(),
            expense_id,
            merchant_name: self.merchant_name,
            category: self.category,
            amount: to_money(self.amount),
            receipt_date: self.receipt_date.trunc_subsecs(0),
            created_at,
            updated_at: None,
            receipt: self.receipt.map(ReceiptRef::truncated),
            others: self.others,
        }
    }
}

/// Request payload for updating an expense.
///
/// Ownership and identity are not patchable: the type carries no `userID` or
/// `expenseID`, and unknown fields are rejected on deserialization.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateExpenseRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub merchant_name: Option<String>,
    /// `Some(None)` removes the category.
    #[serde(
        default,
        deserialize_with = "deserialize_clearable_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub category: Option<Option<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<Decimal>,
    #[serde(
        default,
        deserialize_with = "deserialize_optional_receipt_date",
        skip_serializing_if = "Option::is_none"
    )]
    pub receipt_date: Option<DateTime<Utc>>,
    /// `Some(None)` detaches the receipt.
    #[serde(
        default,
        deserialize_with = "deserialize_clearable",
        skip_serializing_if = "Option::is_none"
    )]
    pub receipt: Option<Option<ReceiptRef>>,
    /// Replaces the whole metadata map when present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub others: Option<BTreeMap<String, String>>,
}

impl UpdateExpenseRequest {
    /// Create an empty update request.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the merchant name.
    pub fn with_merchant_name(mut self, merchant_name: impl Into<String>) -> Self {
        self.merchant_name = Some(merchant_name.into());
        self
    }

    /// Set the category.
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(Some(category.into()));
        self
    }

    /// Remove the category.
    pub fn clear_category(mut self) -> Self {
        self.category = Some(None);
        self
    }

    /// Set the amount.
    pub fn with_amount(mut self, amount: Decimal) -> Self {
        self.amount = Some(amount);
        self
    }

    /// Move the expense to a different receipt date.
    pub fn with_receipt_date(mut self, receipt_date: DateTime<Utc>) -> Self {
        self.receipt_date = Some(receipt_date);
        self
    }

    /// Replace the receipt reference.
    pub fn with_receipt(mut self, receipt: ReceiptRef) -> Self {
        self.receipt = Some(Some(receipt));
        self
    }

    /// Detach the receipt reference.
    pub fn clear_receipt(mut self) -> Self {
        self.receipt = Some(None);
        self
    }

    /// Replace the metadata map.
    pub fn with_others(mut self, others: BTreeMap<String, String>) -> Self {
        self.others = Some(others);
        self
    }

    /// Returns true if no field would change.
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    /// Apply updates to an existing expense.
    ///
    /// Leaves `updatedAt` untouched; the repository refreshes it.
    pub fn apply_to(self, expense: &mut Expense) {
        if let Some(merchant_name) = self.merchant_name {
            expense.merchant_name = merchant_name;
        }
        if let Some(category) = self.category {
            expense.category = category;
        }
        if let Some(amount) = self.amount {
            expense.amount = to_money(amount);
        }
        if let Some(receipt_date) = self.receipt_date {
            expense.receipt_date = receipt_date.trunc_subsecs(0);
        }
        if let Some(receipt) = self.receipt {
            expense.receipt = receipt.map(ReceiptRef::truncated);
        }
        if let Some(others) = self.others {
            expense.others = others;
        }
    }
}

/// Query options for listing a user's expenses.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListExpensesQuery {
    /// Inclusive receipt-date bound.
    pub date_range: Option<DateRange>,
    /// Case-insensitive category filter.
    pub category: Option<String>,
    /// Page size; defaults to [`DEFAULT_LIST_LIMIT`].
    pub limit: Option<u32>,
    /// Continuation token from a previous page.
    pub cursor: Option<Cursor>,
}

impl ListExpensesQuery {
    /// Create a query for the first page with default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Restrict to a receipt-date range.
    pub fn with_date_range(mut self, date_range: DateRange) -> Self {
        self.date_range = Some(date_range);
        self
    }

    /// Filter by category.
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    /// Set the page size.
    pub fn with_limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Resume after a previous page.
    pub fn with_cursor(mut self, cursor: Cursor) -> Self {
        self.cursor = Some(cursor);
        self
    }

    /// Page size clamped to `1..=MAX_LIST_LIMIT`, falling back to `default`.
    pub fn effective_limit(&self, default: u32) -> u32 {
        self.limit.unwrap_or(default).clamp(1, MAX_LIST_LIMIT)
    }
}
