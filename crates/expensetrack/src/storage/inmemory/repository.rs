//! In-memory store implementation.

use std::collections::{BTreeMap, HashMap};
use std::ops::Bound;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use expensetrack_core::expense::Expense;
use expensetrack_core::storage::{
    keys, Cursor, ExpenseKey, ExpensePage, ExpenseStore, PageRequest, RepositoryError, Result,
};

/// Items grouped by partition key, each partition ordered by sort key.
#[derive(Debug, Default)]
struct Tables {
    partitions: BTreeMap<String, BTreeMap<String, Expense>>,
    /// Expense-ID index.
    by_id: HashMap<Uuid, ExpenseKey>,
}

impl Tables {
    fn get(&self, key: &ExpenseKey) -> Option<&Expense> {
        self.partitions.get(&key.pk())?.get(&key.sk())
    }

    fn contains(&self, key: &ExpenseKey) -> bool {
        self.get(key).is_some()
    }

    fn put(&mut self, expense: &Expense) {
        let key = expense.key();
        self.partitions
            .entry(key.pk())
            .or_default()
            .insert(key.sk(), expense.clone());
        self.by_id.insert(expense.expense_id, key);
    }

    fn delete(&mut self, key: &ExpenseKey) -> Option<Expense> {
        let pk = key.pk();
        let partition = self.partitions.get_mut(&pk)?;
        let removed = partition.remove(&key.sk())?;
        if partition.is_empty() {
            self.partitions.remove(&pk);
        }
        if self.by_id.get(&key.expense_id) == Some(key) {
            self.by_id.remove(&key.expense_id);
        }
        Some(removed)
    }

    /// Checks the optimistic-concurrency condition against the stored item.
    fn check_expected(
        &self,
        key: &ExpenseKey,
        expected_updated_at: Option<DateTime<Utc>>,
    ) -> Result<()> {
        match self.get(key) {
            None => Err(RepositoryError::not_found(
                "Expense",
                key.expense_id.to_string(),
            )),
            Some(stored) if stored.updated_at != expected_updated_at => Err(
                RepositoryError::conflict("Expense", key.expense_id.to_string()),
            ),
            Some(_) => Ok(()),
        }
    }
}

/// In-memory storage backend for testing and local use.
///
/// Mirrors the single-table layout: one ordered map per user partition plus
/// an expense-ID index. Data is not persisted and will be lost when the last
/// clone of the store is dropped.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    tables: Arc<RwLock<Tables>>,
}

impl InMemoryStore {
    /// Creates a new empty in-memory store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of items held across all partitions.
    pub async fn len(&self) -> usize {
        let tables = self.tables.read().await;
        tables.partitions.values().map(BTreeMap::len).sum()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl ExpenseStore for InMemoryStore {
    async fn insert(&self, expense: &Expense) -> Result<()> {
        let mut tables = self.tables.write().await;
        let key = expense.key();
        if tables.contains(&key) || tables.by_id.contains_key(&expense.expense_id) {
            return Err(RepositoryError::conflict(
                "Expense",
                expense.expense_id.to_string(),
            ));
        }
        tables.put(expense);
        Ok(())
    }

    async fn get(&self, key: &ExpenseKey) -> Result<Option<Expense>> {
        let tables = self.tables.read().await;
        Ok(tables.get(key).cloned())
    }

    async fn find_by_id(&self, expense_id: Uuid) -> Result<Option<Expense>> {
        let tables = self.tables.read().await;
        Ok(tables
            .by_id
            .get(&expense_id)
            .and_then(|key| tables.get(key))
            .cloned())
    }

    async fn query_by_user(&self, user_id: &str, page: &PageRequest) -> Result<ExpensePage> {
        let tables = self.tables.read().await;
        let Some(partition) = tables.partitions.get(&keys::expense_pk(user_id)) else {
            return Ok(ExpensePage::default());
        };

        let (start, end) = keys::expense_sk_bounds(page.date_range.as_ref());
        let lower = match &page.cursor {
            Some(cursor) if cursor.sort_key() >= start.as_str() => {
                Bound::Excluded(cursor.sort_key().to_string())
            }
            _ => Bound::Included(start),
        };

        // BTreeMap::range panics on inverted or empty-exclusive bounds.
        let empty = match &lower {
            Bound::Included(lo) => lo.as_str() > end.as_str(),
            Bound::Excluded(lo) => lo.as_str() >= end.as_str(),
            Bound::Unbounded => false,
        };
        if empty {
            return Ok(ExpensePage::default());
        }

        let limit = page.limit as usize;
        let mut items = partition.range((lower, Bound::Included(end)));
        let expenses: Vec<Expense> = items.by_ref().take(limit).map(|(_, e)| e.clone()).collect();

        let next_cursor = match (items.next(), expenses.last()) {
            (Some(_), Some(last)) => Some(Cursor::from_sort_key(last.key().sk())),
            _ => None,
        };

        Ok(ExpensePage {
            expenses,
            next_cursor,
        })
    }

    async fn replace(
        &self,
        expense: &Expense,
        expected_updated_at: Option<DateTime<Utc>>,
    ) -> Result<()> {
        let mut tables = self.tables.write().await;
        tables.check_expected(&expense.key(), expected_updated_at)?;
        tables.put(expense);
        Ok(())
    }

    async fn relocate(&self, previous: &Expense, expense: &Expense) -> Result<()> {
        let mut tables = self.tables.write().await;
        let new_key = expense.key();
        if tables.contains(&new_key) {
            return Err(RepositoryError::conflict(
                "Expense",
                expense.expense_id.to_string(),
            ));
        }
        let old_key = previous.key();
        tables.check_expected(&old_key, previous.updated_at)?;

        tables.delete(&old_key);
        tables.put(expense);
        Ok(())
    }

    async fn remove(
        &self,
        key: &ExpenseKey,
        expected_updated_at: Option<DateTime<Utc>>,
    ) -> Result<()> {
        let mut tables = self.tables.write().await;
        tables.check_expected(key, expected_updated_at)?;
        tables.delete(key);
        Ok(())
    }
}
