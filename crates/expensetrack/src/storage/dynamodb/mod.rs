//! DynamoDB storage backend implementation.
//!
//! This module provides a DynamoDB-based implementation of `ExpenseStore`
//! using `aws-sdk-dynamodb`. Compiled with the `dynamodb` feature.

mod conversions;
mod error;
mod repository;

pub use repository::DynamoDbStore;
