//! Functional core for expensetrack.
//!
//! Entity types, validation, key encoding and the storage contract. Nothing in
//! this crate performs I/O.

pub mod expense;
pub mod serde;
pub mod storage;
