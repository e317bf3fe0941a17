//! Table configuration types (Functional Core - pure data).

use itemstack_core::stack::{assemble, ScalarAttributeType, StackConfig, Table};

use super::error::{DynamodbError, Result};

/// Table schema configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableConfig {
    pub table_name: String,
    pub partition_key: KeyAttribute,
    pub throughput: Throughput,
}

/// A key attribute definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyAttribute {
    pub name: String,
    pub attribute_type: AttributeType,
}

/// DynamoDB key attribute types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttributeType {
    String,
    Number,
    Binary,
}

impl AttributeType {
    pub fn code(self) -> &'static str {
        match self {
            AttributeType::String => "S",
            AttributeType::Number => "N",
            AttributeType::Binary => "B",
        }
    }
}

/// Provisioned read/write capacity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Throughput {
    pub read: i64,
    pub write: i64,
}

impl TableConfig {
    /// Sets the table name.
    pub fn with_table_name(mut self, name: &str) -> Self {
        self.table_name = name.to_string();
        self
    }

    /// Reads the table declared in the CloudFormation description.
    pub fn from_stack_table(table: &Table) -> Option<Self> {
        let (name, attribute_type) = table.partition_key()?;
        Some(Self {
            table_name: table.table_name.clone(),
            partition_key: KeyAttribute {
                name: name.to_string(),
                attribute_type: match attribute_type {
                    ScalarAttributeType::S => AttributeType::String,
                    ScalarAttributeType::N => AttributeType::Number,
                    ScalarAttributeType::B => AttributeType::Binary,
                },
            },
            throughput: Throughput {
                read: i64::from(table.provisioned_throughput.read_capacity_units),
                write: i64::from(table.provisioned_throughput.write_capacity_units),
            },
        })
    }
}

/// Returns the items table configuration, taken from the assembled stack so
/// local tables match what gets deployed.
pub fn items_table_config() -> Result<TableConfig> {
    let stack =
        assemble(&StackConfig::default()).map_err(|e| DynamodbError::Stack(e.to_string()))?;
    stack
        .table()
        .and_then(|(_, table)| TableConfig::from_stack_table(table))
        .ok_or_else(|| DynamodbError::Stack("stack declares no keyed table".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_items_table_config_matches_stack() {
        let config = items_table_config().unwrap();

        assert_eq!(config.table_name, "items");
        assert_eq!(config.partition_key.name, "id");
        assert_eq!(config.partition_key.attribute_type, AttributeType::String);
        assert_eq!(config.throughput, Throughput { read: 5, write: 5 });
    }

    #[test]
    fn test_with_table_name() {
        let config = items_table_config().unwrap().with_table_name("items-dev");
        assert_eq!(config.table_name, "items-dev");
    }
}
