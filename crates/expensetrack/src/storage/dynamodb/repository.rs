//! DynamoDB store implementation.
//!
//! Implements `ExpenseStore` from `expensetrack_core::storage` over a single
//! table keyed by `PK`/`SK` with the expense-ID index on `GSI1PK`/`GSI1SK`.

use async_trait::async_trait;
use aws_sdk_dynamodb::types::{
    AttributeValue, Delete, Put, ReturnValuesOnConditionCheckFailure, TransactWriteItem,
};
use aws_sdk_dynamodb::Client;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use expensetrack_core::expense::Expense;
use expensetrack_core::storage::{
    keys, ExpenseKey, ExpensePage, ExpenseStore, PageRequest, RepositoryError, Result,
};

use super::conversions::{
    cursor_to_start_key, expected_version_condition, expense_to_item, item_to_expense,
    key_to_item, last_evaluated_key_to_cursor,
};
use super::error::{
    map_delete_item_error, map_get_item_error, map_put_item_error, map_query_error,
    map_transact_write_error,
};
use crate::config::Config;

/// DynamoDB-based store implementation.
pub struct DynamoDbStore {
    client: Client,
    table_name: String,
    gsi1_name: String,
}

impl DynamoDbStore {
    /// Creates a new store with the given DynamoDB client, table and index names.
    pub fn new(client: Client, table_name: impl Into<String>, gsi1_name: impl Into<String>) -> Self {
        Self {
            client,
            table_name: table_name.into(),
            gsi1_name: gsi1_name.into(),
        }
    }

    /// Creates a new store from application configuration.
    ///
    /// Uses the AWS SDK default credential chain with the configured region
    /// and, when set, a custom endpoint such as DynamoDB Local.
    pub async fn from_config(config: &Config) -> Self {
        let mut loader = aws_config::defaults(aws_config::BehaviorVersion::latest())
            .region(aws_config::Region::new(config.aws_region.clone()));

        if let Some(endpoint) = &config.aws_endpoint_url {
            loader = loader.endpoint_url(endpoint);
        }

        let sdk_config = loader.load().await;
        Self::new(
            Client::new(&sdk_config),
            &config.table_name,
            &config.gsi1_name,
        )
    }

    /// Get the table name.
    pub fn table_name(&self) -> &str {
        &self.table_name
    }
}

#[async_trait]
impl ExpenseStore for DynamoDbStore {
    async fn insert(&self, expense: &Expense) -> Result<()> {
        self.client
            .put_item()
            .table_name(&self.table_name)
            .set_item(Some(expense_to_item(expense)))
            .condition_expression("attribute_not_exists(PK)")
            .send()
            .await
            .map_err(|e| map_put_item_error(e, expense.expense_id.to_string(), false))?;

        Ok(())
    }

    async fn get(&self, key: &ExpenseKey) -> Result<Option<Expense>> {
        let result = self
            .client
            .get_item()
            .table_name(&self.table_name)
            .set_key(Some(key_to_item(key)))
            .consistent_read(true)
            .send()
            .await
            .map_err(map_get_item_error)?;

        match result.item {
            Some(item) => Ok(Some(item_to_expense(&item)?)),
            None => Ok(None),
        }
    }

    async fn find_by_id(&self, expense_id: Uuid) -> Result<Option<Expense>> {
        // Index reads are eventually consistent.
        let result = self
            .client
            .query()
            .table_name(&self.table_name)
            .index_name(&self.gsi1_name)
            .key_condition_expression("GSI1PK = :pk")
            .expression_attribute_values(":pk", AttributeValue::S(keys::expense_gsi1_pk(expense_id)))
            .send()
            .await
            .map_err(map_query_error)?;

        let items = result.items.unwrap_or_default();
        match items.first() {
            Some(item) => Ok(Some(item_to_expense(item)?)),
            None => Ok(None),
        }
    }

    async fn query_by_user(&self, user_id: &str, page: &PageRequest) -> Result<ExpensePage> {
        let (start, end) = keys::expense_sk_bounds(page.date_range.as_ref());

        // DynamoDB rejects a start key outside the key condition.
        let start_key = match &page.cursor {
            Some(cursor) if cursor.sort_key() >= end.as_str() => {
                return Ok(ExpensePage::default());
            }
            Some(cursor) if cursor.sort_key() >= start.as_str() => {
                Some(cursor_to_start_key(user_id, cursor))
            }
            _ => None,
        };

        let result = self
            .client
            .query()
            .table_name(&self.table_name)
            .key_condition_expression("PK = :pk AND SK BETWEEN :start AND :end")
            .expression_attribute_values(":pk", AttributeValue::S(keys::expense_pk(user_id)))
            .expression_attribute_values(":start", AttributeValue::S(start))
            .expression_attribute_values(":end", AttributeValue::S(end))
            .set_exclusive_start_key(start_key)
            .limit(i32::try_from(page.limit).unwrap_or(i32::MAX))
            .consistent_read(true)
            .send()
            .await
            .map_err(map_query_error)?;

        let expenses = result
            .items
            .unwrap_or_default()
            .iter()
            .map(item_to_expense)
            .collect::<Result<Vec<_>>>()?;
        let next_cursor = result
            .last_evaluated_key
            .as_ref()
            .map(last_evaluated_key_to_cursor)
            .transpose()?;

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
        let (condition, values) = expected_version_condition(expected_updated_at);

        self.client
            .put_item()
            .table_name(&self.table_name)
            .set_item(Some(expense_to_item(expense)))
            .condition_expression(condition)
            .set_expression_attribute_values(values)
            .return_values_on_condition_check_failure(ReturnValuesOnConditionCheckFailure::AllOld)
            .send()
            .await
            .map_err(|e| map_put_item_error(e, expense.expense_id.to_string(), true))?;

        Ok(())
    }

    async fn relocate(&self, previous: &Expense, expense: &Expense) -> Result<()> {
        let build_failed = |e: aws_sdk_dynamodb::error::BuildError| {
            RepositoryError::QueryFailed(format!("Invalid transaction: {e}"))
        };
        let (condition, values) = expected_version_condition(previous.updated_at);

        let put = Put::builder()
            .table_name(&self.table_name)
            .set_item(Some(expense_to_item(expense)))
            .condition_expression("attribute_not_exists(PK)")
            .build()
            .map_err(build_failed)?;
        let delete = Delete::builder()
            .table_name(&self.table_name)
            .set_key(Some(key_to_item(&previous.key())))
            .condition_expression(condition)
            .set_expression_attribute_values(values)
            .return_values_on_condition_check_failure(ReturnValuesOnConditionCheckFailure::AllOld)
            .build()
            .map_err(build_failed)?;

        self.client
            .transact_write_items()
            .transact_items(TransactWriteItem::builder().put(put).build())
            .transact_items(TransactWriteItem::builder().delete(delete).build())
            .send()
            .await
            .map_err(|e| map_transact_write_error(e, expense.expense_id.to_string()))?;

        Ok(())
    }

    async fn remove(
        &self,
        key: &ExpenseKey,
        expected_updated_at: Option<DateTime<Utc>>,
    ) -> Result<()> {
        let (condition, values) = expected_version_condition(expected_updated_at);

        self.client
            .delete_item()
            .table_name(&self.table_name)
            .set_key(Some(key_to_item(key)))
            .condition_expression(condition)
            .set_expression_attribute_values(values)
            .return_values_on_condition_check_failure(ReturnValuesOnConditionCheckFailure::AllOld)
            .send()
            .await
            .map_err(|e| map_delete_item_error(e, key.expense_id.to_string()))?;

        Ok(())
    }
}
