//! Expense repository.
//!
//! Domain operations over an [`ExpenseStore`]. The store maps each call onto
//! one native operation; this layer owns validation, identifier assignment,
//! ownership checks and the optimistic-concurrency token.

use std::sync::Arc;

use chrono::{DateTime, SubsecRound, Utc};
use uuid::Uuid;

use expensetrack_core::expense::{
    filter_expenses_by_category, generate_seed_expenses, next_updated_at, now, validate_expense,
    validate_user_id, CreateExpenseRequest, Expense, ListExpensesQuery, UpdateExpenseRequest,
    DEFAULT_LIST_LIMIT,
};
use expensetrack_core::storage::{
    ExpenseKey, ExpensePage, ExpenseStore, PageRequest, RepositoryError, Result,
};

/// Attempts made to insert a new expense before giving up on ID collisions.
pub const MAX_CREATE_ATTEMPTS: u32 = 3;

/// Data-access layer for expenses.
///
/// Stateless apart from the shared store handle, so clones are cheap and
/// any number of instances may serve the same table.
#[derive(Clone)]
pub struct ExpenseRepository {
    store: Arc<dyn ExpenseStore>,
    default_limit: u32,
}

impl ExpenseRepository {
    pub fn new(store: Arc<dyn ExpenseStore>) -> Self {
        Self {
            store,
            default_limit: DEFAULT_LIST_LIMIT,
        }
    }

    /// Page size used when a listing does not ask for one.
    pub fn with_default_limit(mut self, default_limit: u32) -> Self {
        self.default_limit = default_limit;
        self
    }

    /// Validates and stores a new expense owned by `user_id`.
    ///
    /// A fresh expense ID is generated for each attempt; a key collision is
    /// retried up to [`MAX_CREATE_ATTEMPTS`] times before surfacing `Conflict`.
    pub async fn create(&self, user_id: &str, request: CreateExpenseRequest) -> Result<Expense> {
        validate_user_id(user_id)?;

        let mut expense = request.into_expense(user_id, Uuid::new_v4(), now());
        validate_expense(&expense)?;

        let mut attempt = 1;
        loop {
            match self.store.insert(&expense).await {
                Ok(()) => {
                    tracing::info!(
                        user_id = %expense.user_id,
                        expense_id = %expense.expense_id,
                        receipt_date = %expense.receipt_date,
                        "Created expense"
                    );
                    return Ok(expense);
                }
                Err(err) if err.is_conflict() && attempt < MAX_CREATE_ATTEMPTS => {
                    tracing::warn!(
                        expense_id = %expense.expense_id,
                        attempt,
                        "Expense ID collision, retrying with a new ID"
                    );
                    attempt += 1;
                    expense.expense_id = Uuid::new_v4();
                }
                Err(err) => return Err(err),
            }
        }
    }

    /// Fetches an expense by ID through the expense-ID index.
    ///
    /// An expense owned by someone else is reported exactly like a missing one.
    pub async fn get_by_id(&self, user_id: &str, expense_id: Uuid) -> Result<Expense> {
        validate_user_id(user_id)?;

        match self.store.find_by_id(expense_id).await? {
            Some(expense) if expense.is_owned_by(user_id) => Ok(expense),
            Some(_) => {
                tracing::debug!(user_id, expense_id = %expense_id, "Expense owned by another user");
                Err(not_found(expense_id))
            }
            None => Err(not_found(expense_id)),
        }
    }

    /// Fetches an expense by its full primary key.
    pub async fn get_by_key(
        &self,
        user_id: &str,
        receipt_date: DateTime<Utc>,
        expense_id: Uuid,
    ) -> Result<Expense> {
        validate_user_id(user_id)?;

        let key = ExpenseKey::new(user_id, receipt_date.trunc_subsecs(0), expense_id);
        self.store
            .get(&key)
            .await?
            .filter(|expense| expense.is_owned_by(user_id))
            .ok_or_else(|| not_found(expense_id))
    }

    /// Lists one page of a user's expenses ordered by receipt date.
    ///
    /// The category filter applies to the fetched page, so a page can hold
    /// fewer than `limit` items and still carry a cursor.
    pub async fn list_by_user(&self, user_id: &str, query: &ListExpensesQuery) -> Result<ExpensePage> {
        validate_user_id(user_id)?;

        let request = PageRequest {
            date_range: query.date_range,
            limit: query.effective_limit(self.default_limit),
            cursor: query.cursor.clone(),
        };
        let mut page = self.store.query_by_user(user_id, &request).await?;

        if let Some(category) = query.category.as_deref().filter(|c| !c.trim().is_empty()) {
            page.expenses = filter_expenses_by_category(page.expenses, category);
        }

        tracing::debug!(
            user_id,
            count = page.expenses.len(),
            has_more = !page.is_last(),
            "Listed expenses"
        );
        Ok(page)
    }

    /// Applies a patch to an expense and refreshes `updatedAt`.
    ///
    /// The write is conditioned on the `updatedAt` value that was read, so a
    /// concurrent modification yields `Conflict`. A changed receipt date moves
    /// the item to its new key atomically.
    pub async fn update(
        &self,
        user_id: &str,
        expense_id: Uuid,
        request: UpdateExpenseRequest,
    ) -> Result<Expense> {
        let resolved = self.get_by_id(user_id, expense_id).await?;

        // The index may lag; the primary read is authoritative.
        let previous = self
            .store
            .get(&resolved.key())
            .await?
            .ok_or_else(|| not_found(expense_id))?;

        let mut expense = previous.clone();
        request.apply_to(&mut expense);
        validate_expense(&expense)?;
        expense.updated_at = Some(next_updated_at(previous.updated_at, now()));

        if expense.receipt_date != previous.receipt_date {
            self.store.relocate(&previous, &expense).await?;
            tracing::info!(
                user_id,
                expense_id = %expense_id,
                from = %previous.receipt_date,
                to = %expense.receipt_date,
                "Moved expense to new receipt date"
            );
        } else {
            self.store.replace(&expense, previous.updated_at).await?;
            tracing::info!(user_id, expense_id = %expense_id, "Updated expense");
        }

        Ok(expense)
    }

    /// Deletes an expense.
    ///
    /// Conditioned on the `updatedAt` value that was read, like [`update`](Self::update).
    pub async fn delete(&self, user_id: &str, expense_id: Uuid) -> Result<()> {
        let expense = self.get_by_id(user_id, expense_id).await?;
        self.store.remove(&expense.key(), expense.updated_at).await?;

        tracing::info!(user_id, expense_id = %expense_id, "Deleted expense");
        Ok(())
    }

    /// Creates `count` demo expenses for `user_id`, one per day back from `latest`.
    pub async fn seed(
        &self,
        user_id: &str,
        latest: DateTime<Utc>,
        count: u32,
    ) -> Result<Vec<Expense>> {
        let mut created = Vec::with_capacity(count as usize);
        for request in generate_seed_expenses(latest, count) {
            created.push(self.create(user_id, request).await?);
        }

        tracing::info!(user_id, count = created.len(), "Seeded expenses");
        Ok(created)
    }
}

fn not_found(expense_id: Uuid) -> RepositoryError {
    RepositoryError::not_found("Expense", expense_id.to_string())
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};

    use async_trait::async_trait;
    use chrono::TimeZone;
    use rust_decimal::Decimal;

    use super::*;
    use crate::storage::InMemoryStore;

    /// Store whose inserts always collide, counting the attempts.
    #[derive(Default)]
    struct CollidingStore {
        inner: InMemoryStore,
        inserts: AtomicU32,
    }

    #[async_trait]
    impl ExpenseStore for CollidingStore {
        async fn insert(&self, expense: &Expense) -> Result<()> {
            self.inserts.fetch_add(1, Ordering::SeqCst);
            Err(RepositoryError::conflict("Expense", expense.expense_id.to_string()))
        }

        async fn get(&self, key: &ExpenseKey) -> Result<Option<Expense>> {
            self.inner.get(key).await
        }

        async fn find_by_id(&self, expense_id: Uuid) -> Result<Option<Expense>> {
            self.inner.find_by_id(expense_id).await
        }

        async fn query_by_user(&self, user_id: &str, page: &PageRequest) -> Result<ExpensePage> {
            self.inner.query_by_user(user_id, page).await
        }

        async fn replace(
            &self,
            expense: &Expense,
            expected_updated_at: Option<DateTime<Utc>>,
        ) -> Result<()> {
            self.inner.replace(expense, expected_updated_at).await
        }

        async fn relocate(&self, previous: &Expense, expense: &Expense) -> Result<()> {
            self.inner.relocate(previous, expense).await
        }

        async fn remove(
            &self,
            key: &ExpenseKey,
            expected_updated_at: Option<DateTime<Utc>>,
        ) -> Result<()> {
            self.inner.remove(key, expected_updated_at).await
        }
    }

    fn request() -> CreateExpenseRequest {
        CreateExpenseRequest::new(
            "Bhatbhateni Superstore",
            Decimal::new(54075, 2),
            Utc.with_ymd_and_hms(2025, 1, 12, 0, 0, 0).unwrap(),
        )
    }

    #[tokio::test]
    async fn test_create_gives_up_after_repeated_collisions() {
        let store = Arc::new(CollidingStore::default());
        let repository = ExpenseRepository::new(store.clone());

        let result = repository.create("12345", request()).await;

        assert!(matches!(result, Err(RepositoryError::Conflict { .. })));
        assert_eq!(store.inserts.load(Ordering::SeqCst), MAX_CREATE_ATTEMPTS);
    }

    #[tokio::test]
    async fn test_create_rejects_invalid_input_without_writing() {
        let store = Arc::new(CollidingStore::default());
        let repository = ExpenseRepository::new(store.clone());

        let mut invalid = request();
        invalid.merchant_name = "   ".to_string();
        let result = repository.create("12345", invalid).await;

        assert!(matches!(result, Err(RepositoryError::Validation(_))));
        assert_eq!(store.inserts.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_empty_user_id_is_rejected() {
        let repository = ExpenseRepository::new(Arc::new(InMemoryStore::new()));

        let result = repository.create("", request()).await;
        assert!(matches!(result, Err(RepositoryError::Validation(_))));

        let result = repository.get_by_id(" ", Uuid::new_v4()).await;
        assert!(matches!(result, Err(RepositoryError::Validation(_))));
    }

    #[tokio::test]
    async fn test_default_limit_applies_when_unset() {
        let repository =
            ExpenseRepository::new(Arc::new(InMemoryStore::new())).with_default_limit(2);
        let latest = Utc.with_ymd_and_hms(2025, 1, 31, 0, 0, 0).unwrap();
        repository.seed("12345", latest, 5).await.unwrap();

        let page = repository
            .list_by_user("12345", &ListExpensesQuery::new())
            .await
            .unwrap();

        assert_eq!(page.expenses.len(), 2);
        assert!(!page.is_last());
    }
}
