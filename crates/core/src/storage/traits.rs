use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::expense::Expense;

use super::{ExpenseKey, ExpensePage, PageRequest, Result};

/// Key-value store holding expense items.
///
/// Implementations map each call onto a single store operation (or one
/// native transaction for [`ExpenseStore::relocate`]). They do not validate
/// or check ownership; [`Expense`] values are written as given.
#[async_trait]
pub trait ExpenseStore: Send + Sync {
    /// Writes a new item, failing with `Conflict` if the primary key is taken.
    async fn insert(&self, expense: &Expense) -> Result<()>;

    /// Reads an item by primary key.
    async fn get(&self, key: &ExpenseKey) -> Result<Option<Expense>>;

    /// Resolves an item through the expense-ID index.
    ///
    /// Returns whatever item carries the ID regardless of owner.
    async fn find_by_id(&self, expense_id: Uuid) -> Result<Option<Expense>>;

    /// Reads one page of a user's partition in sort-key order.
    async fn query_by_user(&self, user_id: &str, page: &PageRequest) -> Result<ExpensePage>;

    /// Overwrites an existing item in place.
    ///
    /// The write is conditioned on the stored item still carrying
    /// `expected_updated_at` (`None` meaning the attribute is absent). Fails
    /// with `NotFound` if the item is gone and `Conflict` if it changed.
    async fn replace(
        &self,
        expense: &Expense,
        expected_updated_at: Option<DateTime<Utc>>,
    ) -> Result<()>;

    /// Moves an item to a new primary key in one atomic step.
    ///
    /// Inserts `expense` (which must not exist yet) and deletes `previous`
    /// under the same condition as [`ExpenseStore::replace`].
    async fn relocate(&self, previous: &Expense, expense: &Expense) -> Result<()>;

    /// Deletes an item by primary key.
    ///
    /// Conditioned on `expected_updated_at` like [`ExpenseStore::replace`].
    async fn remove(
        &self,
        key: &ExpenseKey,
        expected_updated_at: Option<DateTime<Utc>>,
    ) -> Result<()>;
}
