//! In-memory storage backend.
//!
//! Always compiled. Used by default and as the test double for the
//! repository.

mod repository;

pub use repository::InMemoryStore;
