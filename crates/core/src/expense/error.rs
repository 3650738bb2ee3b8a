use thiserror::Error;

/// Errors that can occur when validating an expense or a change to one.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ExpenseError {
    #[error("User ID cannot be empty")]
    EmptyUserId,
    #[error("Merchant cannot be empty")]
    EmptyMerchant,
    #[error("Merchant too long (max 500 characters)")]
    MerchantTooLong,
    #[error("Category too long (max 100 characters)")]
    CategoryTooLong,
    #[error("Amount cannot be negative")]
    NegativeAmount,
    #[error("Amount too large (max 999999.99)")]
    AmountTooLarge,
    #[error("Amount must have at most two decimal places")]
    TooManyDecimalPlaces,
    #[error("Invalid amount format: {0}")]
    InvalidAmount(String),
    #[error("Invalid receipt_date format: {0}. Use an ISO-8601 timestamp or YYYY-MM-DD")]
    InvalidReceiptDate(String),
    #[error("Receipt {0} cannot be empty")]
    EmptyReceiptField(&'static str),
    #[error("Metadata key cannot be empty")]
    EmptyMetadataKey,
    #[error("Metadata key collides with a reserved attribute: {0}")]
    ReservedMetadataKey(String),
}
