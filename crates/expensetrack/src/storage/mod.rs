//! Storage backend implementations.
//!
//! This module provides concrete implementations of the `ExpenseStore` trait
//! defined in `expensetrack_core::storage`. The in-memory backend is always
//! compiled; DynamoDB is behind the `dynamodb` feature. The backend is chosen
//! at startup from [`Config`].
//!
//! # Examples
//!
//! Build with DynamoDB support:
//! ```bash
//! cargo build -p expensetrack --features dynamodb
//! ```

use std::sync::Arc;

use expensetrack_core::storage::{ExpenseStore, Result};

use crate::config::{Config, StorageBackend};

pub mod inmemory;

#[cfg(feature = "dynamodb")]
pub mod dynamodb;

pub use inmemory::InMemoryStore;

#[cfg(feature = "dynamodb")]
pub use dynamodb::DynamoDbStore;

/// Opens the store selected by `config`.
pub async fn connect(config: &Config) -> Result<Arc<dyn ExpenseStore>> {
    tracing::debug!(backend = %config.storage, store = %config.target_display(), "Opening store");

    match config.storage {
        StorageBackend::Memory => Ok(Arc::new(InMemoryStore::new())),
        #[cfg(feature = "dynamodb")]
        StorageBackend::DynamoDb => Ok(Arc::new(DynamoDbStore::from_config(config).await)),
        #[cfg(not(feature = "dynamodb"))]
        StorageBackend::DynamoDb => Err(expensetrack_core::storage::RepositoryError::ConnectionFailed(
            "storage backend 'dynamodb' requires building with the `dynamodb` feature"
                .to_string(),
        )),
    }
}
