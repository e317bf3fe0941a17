//! Pure functions for mapping store errors to GraphQL `errorType` values.
//!
//! The names follow what AppSync reports for DynamoDB resolver failures.

use super::StoreError;

/// Maps a [`StoreError`] to the `errorType` reported in a GraphQL error.
///
/// - `TableNotFound` -> `DynamoDB:ResourceNotFoundException`
/// - `Throttled` -> `DynamoDB:ProvisionedThroughputExceededException`
/// - `InvalidKey` -> `DynamoDB:ValidationException`
/// - `ConnectionFailed` / `RequestFailed` -> `DynamoDB:InternalServerError`
///
/// # Examples
///
/// ```
/// use itemstack_core::storage::{store_error_type, StoreError};
///
/// let error = StoreError::TableNotFound("items".to_string());
/// assert_eq!(store_error_type(&error), "DynamoDB:ResourceNotFoundException");
/// ```
pub fn store_error_type(error: &StoreError) -> &'static str {
    match error {
        StoreError::TableNotFound(_) => "DynamoDB:ResourceNotFoundException",
        StoreError::Throttled(_) => "DynamoDB:ProvisionedThroughputExceededException",
        StoreError::InvalidKey(_) => "DynamoDB:ValidationException",
        StoreError::ConnectionFailed(_) => "DynamoDB:InternalServerError",
        StoreError::RequestFailed(_) => "DynamoDB:InternalServerError",
    }
}
