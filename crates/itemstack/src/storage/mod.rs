//! Item store selection.
//!
//! The backend is chosen at compile time:
//!
//! - `inmemory` (default): `InMemoryItemStore` from `itemstack_core`
//! - `dynamodb`: a real table through `aws-sdk-dynamodb`, honouring
//!   `AWS_ENDPOINT_URL` for DynamoDB Local
//!
//! ```bash
//! cargo run -p itemstack --no-default-features --features dynamodb -- serve
//! ```

#[cfg(all(feature = "dynamodb", feature = "inmemory"))]
compile_error!(
    "Features 'inmemory' and 'dynamodb' are mutually exclusive. \
    Enable only one item store at a time."
);

#[cfg(not(any(feature = "inmemory", feature = "dynamodb")))]
compile_error!(
    "No item store selected. Enable 'inmemory' or 'dynamodb' feature. \
    Example: cargo build -p itemstack --features dynamodb"
);

#[cfg(feature = "dynamodb")]
pub mod dynamodb;

use std::sync::Arc;

use anyhow::Result;
use itemstack_core::storage::ItemStore;

use crate::config::Config;

/// Builds the in-memory store, keyed on the table's partition key.
#[cfg(feature = "inmemory")]
pub async fn create_store(_config: &Config, key_attribute: &str) -> Result<Arc<dyn ItemStore>> {
    use itemstack_core::storage::InMemoryItemStore;

    tracing::info!(key = key_attribute, "Using in-memory item store");
    Ok(Arc::new(InMemoryItemStore::new(key_attribute)))
}

/// Connects to the configured DynamoDB table.
#[cfg(feature = "dynamodb")]
pub async fn create_store(config: &Config, _key_attribute: &str) -> Result<Arc<dyn ItemStore>> {
    let store = dynamodb::DynamoDbItemStore::from_env(&config.dynamodb_table_name).await;

    tracing::info!(table = store.table_name(), "Using DynamoDB item store");
    Ok(Arc::new(store))
}
