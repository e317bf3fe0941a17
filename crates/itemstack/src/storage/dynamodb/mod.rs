//! DynamoDB item store.
//!
//! Implements `ItemStore` from `itemstack_core::storage` using
//! `aws-sdk-dynamodb`.

mod conversions;
mod error;
mod repository;

pub use repository::DynamoDbItemStore;
