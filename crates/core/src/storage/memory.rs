//! In-memory item store.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::templates::{AttributeMap, AttributeValue};

use super::{ItemStore, Result, StoreError};

/// In-memory storage backend, keyed on a single partition key attribute.
///
/// Uses a HashMap wrapped in `Arc<RwLock<_>>` for thread-safe access.
/// Data is not persisted and will be lost when the store is dropped.
#[derive(Debug, Clone)]
pub struct InMemoryItemStore {
    key_attribute: String,
    items: Arc<RwLock<HashMap<String, AttributeMap>>>,
}

impl InMemoryItemStore {
    /// Creates an empty store whose items are keyed by `key_attribute`.
    pub fn new(key_attribute: impl Into<String>) -> Self {
        Self {
            key_attribute: key_attribute.into(),
            items: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Number of stored items.
    pub async fn len(&self) -> usize {
        self.items.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.items.read().await.is_empty()
    }

    /// Extracts the partition key value. The key must hold exactly the key
    /// attribute, as a non-empty string.
    fn key_value(&self, key: &AttributeMap) -> Result<String> {
        if key.len() != 1 {
            return Err(StoreError::InvalidKey(format!(
                "expected only '{}', got {} attributes",
                self.key_attribute,
                key.len()
            )));
        }
        match key.get(&self.key_attribute) {
            Some(AttributeValue::S(value)) if !value.is_empty() => Ok(value.clone()),
            Some(AttributeValue::S(_)) => Err(StoreError::InvalidKey(format!(
                "'{}' must not be empty",
                self.key_attribute
            ))),
            Some(_) => Err(StoreError::InvalidKey(format!(
                "'{}' must be a string",
                self.key_attribute
            ))),
            None => Err(StoreError::InvalidKey(format!(
                "missing attribute '{}'",
                self.key_attribute
            ))),
        }
    }
}

#[async_trait]
impl ItemStore for InMemoryItemStore {
    async fn get_item(&self, key: &AttributeMap) -> Result<Option<AttributeMap>> {
        let id = self.key_value(key)?;
        let items = self.items.read().await;
        Ok(items.get(&id).cloned())
    }

    async fn put_item(
        &self,
        key: &AttributeMap,
        attributes: &AttributeMap,
    ) -> Result<AttributeMap> {
        let id = self.key_value(key)?;
        let mut item = attributes.clone();
        item.extend(key.iter().map(|(k, v)| (k.clone(), v.clone())));

        let mut items = self.items.write().await;
        items.insert(id, item.clone());
        Ok(item)
    }

    async fn delete_item(&self, key: &AttributeMap) -> Result<Option<AttributeMap>> {
        let id = self.key_value(key)?;
        let mut items = self.items.write().await;
        Ok(items.remove(&id))
    }
}
