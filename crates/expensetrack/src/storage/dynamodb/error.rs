//! DynamoDB error mapping.
//!
//! Maps AWS SDK errors to `RepositoryError` from `expensetrack_core::storage`.

use std::fmt::Debug;

use aws_sdk_dynamodb::error::SdkError;
use aws_sdk_dynamodb::operation::delete_item::DeleteItemError;
use aws_sdk_dynamodb::operation::get_item::GetItemError;
use aws_sdk_dynamodb::operation::put_item::PutItemError;
use aws_sdk_dynamodb::operation::query::QueryError;
use aws_sdk_dynamodb::operation::transact_write_items::TransactWriteItemsError;
use aws_sdk_dynamodb::types::CancellationReason;
use expensetrack_core::storage::RepositoryError;

const ENTITY: &str = "Expense";
const CONDITIONAL_CHECK_FAILED: &str = "ConditionalCheckFailed";

/// Map a GetItem SDK error to RepositoryError.
pub fn map_get_item_error<R: Debug + Send + Sync + 'static>(
    err: SdkError<GetItemError, R>,
) -> RepositoryError {
    match err.into_service_error() {
        GetItemError::ResourceNotFoundException(_) => {
            RepositoryError::QueryFailed("Table not found".to_string())
        }
        GetItemError::ProvisionedThroughputExceededException(_) => {
            RepositoryError::QueryFailed("Throughput exceeded, please retry".to_string())
        }
        GetItemError::RequestLimitExceeded(_) => {
            RepositoryError::QueryFailed("Request limit exceeded, please retry".to_string())
        }
        GetItemError::InternalServerError(_) => {
            RepositoryError::QueryFailed("DynamoDB internal server error".to_string())
        }
        err => RepositoryError::QueryFailed(format!("GetItem failed: {:?}", err)),
    }
}

/// Map a Query SDK error to RepositoryError.
pub fn map_query_error<R: Debug + Send + Sync + 'static>(
    err: SdkError<QueryError, R>,
) -> RepositoryError {
    match err.into_service_error() {
        QueryError::ResourceNotFoundException(_) => {
            RepositoryError::QueryFailed("Table or index not found".to_string())
        }
        QueryError::ProvisionedThroughputExceededException(_) => {
            RepositoryError::QueryFailed("Throughput exceeded, please retry".to_string())
        }
        QueryError::RequestLimitExceeded(_) => {
            RepositoryError::QueryFailed("Request limit exceeded, please retry".to_string())
        }
        QueryError::InternalServerError(_) => {
            RepositoryError::QueryFailed("DynamoDB internal server error".to_string())
        }
        err => RepositoryError::QueryFailed(format!("Query failed: {:?}", err)),
    }
}

/// Map a PutItem SDK error to RepositoryError.
///
/// A failed condition means the primary key was taken when `expect_existing`
/// is false. Otherwise the returned old item tells a concurrent modification
/// (`Conflict`) apart from a vanished item (`NotFound`).
pub fn map_put_item_error<R: Debug + Send + Sync + 'static>(
    err: SdkError<PutItemError, R>,
    id: impl Into<String>,
    expect_existing: bool,
) -> RepositoryError {
    let id = id.into();
    match err.into_service_error() {
        PutItemError::ConditionalCheckFailedException(e) => {
            if !expect_existing || e.item().is_some() {
                RepositoryError::conflict(ENTITY, id)
            } else {
                RepositoryError::not_found(ENTITY, id)
            }
        }
        PutItemError::ResourceNotFoundException(_) => {
            RepositoryError::QueryFailed("Table not found".to_string())
        }
        PutItemError::ProvisionedThroughputExceededException(_) => {
            RepositoryError::QueryFailed("Throughput exceeded, please retry".to_string())
        }
        PutItemError::RequestLimitExceeded(_) => {
            RepositoryError::QueryFailed("Request limit exceeded, please retry".to_string())
        }
        PutItemError::ItemCollectionSizeLimitExceededException(_) => {
            RepositoryError::QueryFailed("Item collection size limit exceeded".to_string())
        }
        PutItemError::TransactionConflictException(_) => RepositoryError::conflict(ENTITY, id),
        PutItemError::InternalServerError(_) => {
            RepositoryError::QueryFailed("DynamoDB internal server error".to_string())
        }
        err => RepositoryError::QueryFailed(format!("PutItem failed: {:?}", err)),
    }
}

/// Map a DeleteItem SDK error to RepositoryError.
///
/// A failed condition that returns the old item means it changed since it
/// was read (`Conflict`); without an item it was already gone (`NotFound`).
pub fn map_delete_item_error<R: Debug + Send + Sync + 'static>(
    err: SdkError<DeleteItemError, R>,
    id: impl Into<String>,
) -> RepositoryError {
    let id = id.into();
    match err.into_service_error() {
        DeleteItemError::ConditionalCheckFailedException(e) => {
            if e.item().is_some() {
                RepositoryError::conflict(ENTITY, id)
            } else {
                RepositoryError::not_found(ENTITY, id)
            }
        }
        DeleteItemError::ResourceNotFoundException(_) => {
            RepositoryError::QueryFailed("Table not found".to_string())
        }
        DeleteItemError::ProvisionedThroughputExceededException(_) => {
            RepositoryError::QueryFailed("Throughput exceeded, please retry".to_string())
        }
        DeleteItemError::RequestLimitExceeded(_) => {
            RepositoryError::QueryFailed("Request limit exceeded, please retry".to_string())
        }
        DeleteItemError::TransactionConflictException(_) => RepositoryError::conflict(ENTITY, id),
        DeleteItemError::InternalServerError(_) => {
            RepositoryError::QueryFailed("DynamoDB internal server error".to_string())
        }
        err => RepositoryError::QueryFailed(format!("DeleteItem failed: {:?}", err)),
    }
}

/// Map a TransactWriteItems SDK error from a receipt-date move.
///
/// The transaction holds the put of the new item at index 0 and the delete
/// of the old item at index 1.
pub fn map_transact_write_error<R: Debug + Send + Sync + 'static>(
    err: SdkError<TransactWriteItemsError, R>,
    id: impl Into<String>,
) -> RepositoryError {
    let id = id.into();
    match err.into_service_error() {
        TransactWriteItemsError::TransactionCanceledException(e) => {
            map_cancellation_reasons(e.cancellation_reasons(), id)
        }
        TransactWriteItemsError::TransactionInProgressException(_) => {
            RepositoryError::conflict(ENTITY, id)
        }
        TransactWriteItemsError::ResourceNotFoundException(_) => {
            RepositoryError::QueryFailed("Table not found".to_string())
        }
        TransactWriteItemsError::ProvisionedThroughputExceededException(_) => {
            RepositoryError::QueryFailed("Throughput exceeded, please retry".to_string())
        }
        TransactWriteItemsError::RequestLimitExceeded(_) => {
            RepositoryError::QueryFailed("Request limit exceeded, please retry".to_string())
        }
        TransactWriteItemsError::InternalServerError(_) => {
            RepositoryError::QueryFailed("DynamoDB internal server error".to_string())
        }
        err => RepositoryError::QueryFailed(format!("TransactWriteItems failed: {:?}", err)),
    }
}

/// Classify the per-item reasons of a cancelled move transaction.
pub fn map_cancellation_reasons(reasons: &[CancellationReason], id: String) -> RepositoryError {
    let failed = |index: usize| {
        reasons
            .get(index)
            .filter(|r| r.code() == Some(CONDITIONAL_CHECK_FAILED))
    };

    if failed(0).is_some() {
        return RepositoryError::conflict(ENTITY, id);
    }
    if let Some(reason) = failed(1) {
        return if reason.item().is_some() {
            RepositoryError::conflict(ENTITY, id)
        } else {
            RepositoryError::not_found(ENTITY, id)
        };
    }
    if reasons
        .iter()
        .any(|r| r.code() == Some("TransactionConflict"))
    {
        return RepositoryError::conflict(ENTITY, id);
    }

    let codes: Vec<&str> = reasons.iter().filter_map(|r| r.code()).collect();
    RepositoryError::QueryFailed(format!("Transaction cancelled: {}", codes.join(", ")))
}
