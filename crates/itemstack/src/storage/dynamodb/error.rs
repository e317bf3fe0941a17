//! DynamoDB error mapping.
//!
//! Maps AWS SDK errors to `StoreError` from `itemstack_core::storage`.

use std::fmt::Debug;

use aws_sdk_dynamodb::error::{ProvideErrorMetadata, SdkError};
use aws_sdk_dynamodb::operation::delete_item::DeleteItemError;
use aws_sdk_dynamodb::operation::get_item::GetItemError;
use aws_sdk_dynamodb::operation::put_item::PutItemError;
use itemstack_core::storage::StoreError;

/// Transport failures never reach the service error types.
fn transport_error<E: Debug, R: Debug>(err: &SdkError<E, R>) -> Option<StoreError> {
    match err {
        SdkError::DispatchFailure(_) | SdkError::TimeoutError(_) => {
            Some(StoreError::ConnectionFailed(format!("{err:?}")))
        }
        _ => None,
    }
}

/// Key shape problems come back as a generic `ValidationException`.
fn unhandled(err: impl ProvideErrorMetadata + Debug, operation: &str) -> StoreError {
    match err.code() {
        Some("ValidationException") => {
            StoreError::InvalidKey(err.message().unwrap_or("validation failed").to_string())
        }
        _ => StoreError::RequestFailed(format!("{operation} failed: {err:?}")),
    }
}

/// Map a GetItem SDK error to StoreError.
pub fn map_get_item_error<R: Debug + Send + Sync + 'static>(
    err: SdkError<GetItemError, R>,
    table_name: &str,
) -> StoreError {
    if let Some(error) = transport_error(&err) {
        return error;
    }
    match err.into_service_error() {
        GetItemError::ResourceNotFoundException(_) => {
            StoreError::TableNotFound(table_name.to_string())
        }
        GetItemError::ProvisionedThroughputExceededException(_) => {
            StoreError::Throttled("Throughput exceeded, please retry".to_string())
        }
        GetItemError::RequestLimitExceeded(_) => {
            StoreError::Throttled("Request limit exceeded, please retry".to_string())
        }
        GetItemError::InternalServerError(_) => {
            StoreError::RequestFailed("DynamoDB internal server error".to_string())
        }
        err => unhandled(err, "GetItem"),
    }
}

/// Map a PutItem SDK error to StoreError.
pub fn map_put_item_error<R: Debug + Send + Sync + 'static>(
    err: SdkError<PutItemError, R>,
    table_name: &str,
) -> StoreError {
    if let Some(error) = transport_error(&err) {
        return error;
    }
    match err.into_service_error() {
        PutItemError::ResourceNotFoundException(_) => {
            StoreError::TableNotFound(table_name.to_string())
        }
        PutItemError::ProvisionedThroughputExceededException(_) => {
            StoreError::Throttled("Throughput exceeded, please retry".to_string())
        }
        PutItemError::RequestLimitExceeded(_) => {
            StoreError::Throttled("Request limit exceeded, please retry".to_string())
        }
        PutItemError::ItemCollectionSizeLimitExceededException(_) => {
            StoreError::RequestFailed("Item collection size limit exceeded".to_string())
        }
        PutItemError::TransactionConflictException(_) => {
            StoreError::RequestFailed("Transaction conflict, please retry".to_string())
        }
        PutItemError::InternalServerError(_) => {
            StoreError::RequestFailed("DynamoDB internal server error".to_string())
        }
        err => unhandled(err, "PutItem"),
    }
}

/// Map a DeleteItem SDK error to StoreError.
pub fn map_delete_item_error<R: Debug + Send + Sync + 'static>(
    err: SdkError<DeleteItemError, R>,
    table_name: &str,
) -> StoreError {
    if let Some(error) = transport_error(&err) {
        return error;
    }
    match err.into_service_error() {
        DeleteItemError::ResourceNotFoundException(_) => {
            StoreError::TableNotFound(table_name.to_string())
        }
        DeleteItemError::ProvisionedThroughputExceededException(_) => {
            StoreError::Throttled("Throughput exceeded, please retry".to_string())
        }
        DeleteItemError::RequestLimitExceeded(_) => {
            StoreError::Throttled("Request limit exceeded, please retry".to_string())
        }
        DeleteItemError::ItemCollectionSizeLimitExceededException(_) => {
            StoreError::RequestFailed("Item collection size limit exceeded".to_string())
        }
        DeleteItemError::TransactionConflictException(_) => {
            StoreError::RequestFailed("Transaction conflict, please retry".to_string())
        }
        DeleteItemError::InternalServerError(_) => {
            StoreError::RequestFailed("DynamoDB internal server error".to_string())
        }
        err => unhandled(err, "DeleteItem"),
    }
}
