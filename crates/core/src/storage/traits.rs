use async_trait::async_trait;

use crate::templates::AttributeMap;

use super::Result;

/// Item-level access to the table behind the data source.
///
/// Mirrors the three DynamoDB calls the resolvers issue. None of them
/// checks for existence: a missing key is `Ok(None)`, never an error.
#[async_trait]
pub trait ItemStore: Send + Sync {
    /// Point lookup by key.
    async fn get_item(&self, key: &AttributeMap) -> Result<Option<AttributeMap>>;

    /// Writes `key` + `attributes` as a whole item, replacing any existing
    /// one, and returns the item as written.
    async fn put_item(&self, key: &AttributeMap, attributes: &AttributeMap)
        -> Result<AttributeMap>;

    /// Removes the item and returns its previous value, if there was one.
    async fn delete_item(&self, key: &AttributeMap) -> Result<Option<AttributeMap>>;
}
