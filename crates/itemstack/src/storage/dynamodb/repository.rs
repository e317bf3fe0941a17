//! DynamoDB item store.

use async_trait::async_trait;
use aws_sdk_dynamodb::types::ReturnValue;
use aws_sdk_dynamodb::Client;

use itemstack_core::storage::{ItemStore, Result};
use itemstack_core::templates::AttributeMap;

use super::conversions::{from_sdk_item, to_sdk_item};
use super::error::{map_delete_item_error, map_get_item_error, map_put_item_error};

/// `ItemStore` backed by a single DynamoDB table.
pub struct DynamoDbItemStore {
    client: Client,
    table_name: String,
}

impl DynamoDbItemStore {
    /// Creates a new store with the given DynamoDB client and table name.
    pub fn new(client: Client, table_name: impl Into<String>) -> Self {
        Self {
            client,
            table_name: table_name.into(),
        }
    }

    /// Creates a new store from the AWS SDK default credential chain.
    ///
    /// `AWS_ENDPOINT_URL` redirects the client to DynamoDB Local.
    pub async fn from_env(table_name: &str) -> Self {
        let config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
        Self::new(Client::new(&config), table_name)
    }

    /// Get the table name.
    pub fn table_name(&self) -> &str {
        &self.table_name
    }
}

#[async_trait]
impl ItemStore for DynamoDbItemStore {
    async fn get_item(&self, key: &AttributeMap) -> Result<Option<AttributeMap>> {
        let result = self
            .client
            .get_item()
            .table_name(&self.table_name)
            .set_key(Some(to_sdk_item(key)))
            .send()
            .await
            .map_err(|e| map_get_item_error(e, &self.table_name))?;

        result.item.as_ref().map(from_sdk_item).transpose()
    }

    async fn put_item(
        &self,
        key: &AttributeMap,
        attributes: &AttributeMap,
    ) -> Result<AttributeMap> {
        let mut item = attributes.clone();
        item.extend(key.iter().map(|(k, v)| (k.clone(), v.clone())));

        self.client
            .put_item()
            .table_name(&self.table_name)
            .set_item(Some(to_sdk_item(&item)))
            .send()
            .await
            .map_err(|e| map_put_item_error(e, &self.table_name))?;

        tracing::debug!(table = %self.table_name, "Item written");
        Ok(item)
    }

    async fn delete_item(&self, key: &AttributeMap) -> Result<Option<AttributeMap>> {
        let result = self
            .client
            .delete_item()
            .table_name(&self.table_name)
            .set_key(Some(to_sdk_item(key)))
            .return_values(ReturnValue::AllOld)
            .send()
            .await
            .map_err(|e| map_delete_item_error(e, &self.table_name))?;

        result.attributes.as_ref().map(from_sdk_item).transpose()
    }
}
