//! AWS SDK client setup (Imperative Shell).

use aws_sdk_dynamodb::types::{
    KeyType, ScalarAttributeType, TableDescription, TableStatus as SdkTableStatus,
};
use aws_sdk_dynamodb::Client;

use super::config::{AttributeType, KeyAttribute, Throughput};
use super::error::{DynamodbError, Result};
use super::planning::{TableState, TableStatus};

/// AWS client configuration.
#[derive(Debug, Clone)]
pub struct AwsConfig {
    /// Custom endpoint URL (for local DynamoDB).
    pub endpoint_url: Option<String>,
    /// AWS region.
    pub region: String,
}

impl Default for AwsConfig {
    fn default() -> Self {
        Self {
            endpoint_url: std::env::var("AWS_ENDPOINT_URL").ok(),
            region: std::env::var("AWS_REGION").unwrap_or_else(|_| "us-east-1".to_string()),
        }
    }
}

impl AwsConfig {
    /// Returns a display string for the target environment.
    pub fn target_display(&self) -> String {
        match &self.endpoint_url {
            Some(url) => format!("Local DynamoDB ({})", url),
            None => format!("AWS DynamoDB (region: {})", self.region),
        }
    }
}

/// Creates a DynamoDB client with the given configuration.
pub async fn create_client(config: &AwsConfig) -> Result<Client> {
    let mut sdk_config_loader = aws_config::defaults(aws_config::BehaviorVersion::latest())
        .region(aws_config::Region::new(config.region.clone()));

    if let Some(endpoint) = &config.endpoint_url {
        sdk_config_loader = sdk_config_loader.endpoint_url(endpoint);
    }

    let sdk_config = sdk_config_loader.load().await;
    Ok(Client::new(&sdk_config))
}

/// Fetches current table state, returns None if table doesn't exist.
pub async fn get_table_state(client: &Client, table_name: &str) -> Result<Option<TableState>> {
    match client.describe_table().table_name(table_name).send().await {
        Ok(response) => {
            let table = response.table().ok_or_else(|| {
                DynamodbError::AwsSdk(format!("DescribeTable returned no table for '{table_name}'"))
            })?;
            Ok(Some(table_state(table)))
        }
        Err(err) => {
            let not_found = err
                .as_service_error()
                .is_some_and(|e| e.is_resource_not_found_exception());
            if not_found {
                Ok(None)
            } else {
                Err(DynamodbError::AwsSdk(err.to_string()))
            }
        }
    }
}

fn table_state(table: &TableDescription) -> TableState {
    let status = match table.table_status() {
        Some(SdkTableStatus::Creating) => TableStatus::Creating,
        Some(SdkTableStatus::Updating) => TableStatus::Updating,
        Some(SdkTableStatus::Deleting) => TableStatus::Deleting,
        _ => TableStatus::Active,
    };

    let partition_key = table
        .key_schema()
        .iter()
        .find(|k| k.key_type() == &KeyType::Hash)
        .and_then(|key| {
            let definition = table
                .attribute_definitions()
                .iter()
                .find(|a| a.attribute_name() == key.attribute_name())?;
            let attribute_type = match definition.attribute_type() {
                ScalarAttributeType::S => AttributeType::String,
                ScalarAttributeType::N => AttributeType::Number,
                ScalarAttributeType::B => AttributeType::Binary,
                _ => return None,
            };
            Some(KeyAttribute {
                name: key.attribute_name().to_string(),
                attribute_type,
            })
        });

    // On-demand tables report zero capacity.
    let throughput = table
        .provisioned_throughput()
        .and_then(|t| {
            Some(Throughput {
                read: t.read_capacity_units()?,
                write: t.write_capacity_units()?,
            })
        })
        .filter(|t| t.read > 0 || t.write > 0);

    TableState {
        status,
        partition_key,
        throughput,
    }
}
