//! Expense tracking over a single-table key-value store.
//!
//! [`ExpenseRepository`] implements the domain operations on top of any
//! [`ExpenseStore`](expensetrack_core::storage::ExpenseStore) backend.

pub mod cli;
pub mod config;
pub mod output;
pub mod repository;
pub mod storage;

pub use config::{Config, StorageBackend};
pub use repository::ExpenseRepository;
