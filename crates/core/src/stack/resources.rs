//! CloudFormation resource types used by the items stack (Functional Core -
//! pure data).
//!
//! Property names follow the CloudFormation resource reference exactly;
//! the structs serialize straight into a template's `Properties` block.

use serde::Serialize;
use serde_json::Value;

use super::expr::{Expr, AWS_PARTITION};

/// Service principal AppSync assumes roles with.
pub const APPSYNC_PRINCIPAL: &str = "appsync.amazonaws.com";

/// AWS managed policy granting full access to DynamoDB tables.
pub const DYNAMODB_FULL_ACCESS: &str = "AmazonDynamoDBFullAccess";

/// A resource in the stack.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resource {
    GraphQlApi(GraphQlApi),
    ApiKey(ApiKey),
    GraphQlSchema(GraphQlSchema),
    Table(Table),
    Role(Role),
    DataSource(DataSource),
    Resolver(Resolver),
}

impl Resource {
    /// CloudFormation resource type.
    pub fn type_name(&self) -> &'static str {
        match self {
            Resource::GraphQlApi(_) => "AWS::AppSync::GraphQLApi",
            Resource::ApiKey(_) => "AWS::AppSync::ApiKey",
            Resource::GraphQlSchema(_) => "AWS::AppSync::GraphQLSchema",
            Resource::Table(_) => "AWS::DynamoDB::Table",
            Resource::Role(_) => "AWS::IAM::Role",
            Resource::DataSource(_) => "AWS::AppSync::DataSource",
            Resource::Resolver(_) => "AWS::AppSync::Resolver",
        }
    }

    /// Serialized `Properties` block.
    pub fn properties(&self) -> serde_json::Result<Value> {
        match self {
            Resource::GraphQlApi(r) => serde_json::to_value(r),
            Resource::ApiKey(r) => serde_json::to_value(r),
            Resource::GraphQlSchema(r) => serde_json::to_value(r),
            Resource::Table(r) => serde_json::to_value(r),
            Resource::Role(r) => serde_json::to_value(r),
            Resource::DataSource(r) => serde_json::to_value(r),
            Resource::Resolver(r) => serde_json::to_value(r),
        }
    }
}

// ============================================================================
// AppSync
// ============================================================================

/// How callers authenticate against the API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum AuthenticationType {
    #[serde(rename = "API_KEY")]
    ApiKey,
}

/// `AWS::AppSync::GraphQLApi`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct GraphQlApi {
    pub name: String,
    pub authentication_type: AuthenticationType,
}

/// `AWS::AppSync::ApiKey`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct ApiKey {
    pub api_id: Expr,
}

/// `AWS::AppSync::GraphQLSchema`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct GraphQlSchema {
    pub api_id: Expr,
    pub definition: String,
}

/// Data source kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DataSourceType {
    #[serde(rename = "AMAZON_DYNAMODB")]
    AmazonDynamoDb,
}

/// DynamoDB settings of a data source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct DynamoDbConfig {
    pub table_name: Expr,
    pub aws_region: Expr,
}

/// `AWS::AppSync::DataSource`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct DataSource {
    pub api_id: Expr,
    pub name: String,
    #[serde(rename = "Type")]
    pub kind: DataSourceType,
    pub service_role_arn: Expr,
    #[serde(rename = "DynamoDBConfig")]
    pub dynamo_db_config: DynamoDbConfig,
}

/// `AWS::AppSync::Resolver` (unit resolver with VTL templates).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Resolver {
    pub api_id: Expr,
    pub type_name: String,
    pub field_name: String,
    pub data_source_name: Expr,
    pub request_mapping_template: String,
    pub response_mapping_template: String,
}

// ============================================================================
// DynamoDB
// ============================================================================

/// Key role of an attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum KeyType {
    #[serde(rename = "HASH")]
    Hash,
    #[serde(rename = "RANGE")]
    Range,
}

/// Scalar types a key attribute can have.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ScalarAttributeType {
    S,
    N,
    B,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct KeySchemaElement {
    pub attribute_name: String,
    pub key_type: KeyType,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct AttributeDefinition {
    pub attribute_name: String,
    pub attribute_type: ScalarAttributeType,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct ProvisionedThroughput {
    pub read_capacity_units: u32,
    pub write_capacity_units: u32,
}

impl Default for ProvisionedThroughput {
    fn default() -> Self {
        Self {
            read_capacity_units: 5,
            write_capacity_units: 5,
        }
    }
}

/// `AWS::DynamoDB::Table`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Table {
    pub key_schema: Vec<KeySchemaElement>,
    pub attribute_definitions: Vec<AttributeDefinition>,
    pub provisioned_throughput: ProvisionedThroughput,
    pub table_name: String,
}

impl Table {
    /// A table keyed by a single string partition key.
    pub fn with_partition_key(table_name: &str, key: &str) -> Self {
        Self {
            key_schema: vec![KeySchemaElement {
                attribute_name: key.to_string(),
                key_type: KeyType::Hash,
            }],
            attribute_definitions: vec![AttributeDefinition {
                attribute_name: key.to_string(),
                attribute_type: ScalarAttributeType::S,
            }],
            provisioned_throughput: ProvisionedThroughput::default(),
            table_name: table_name.to_string(),
        }
    }

    /// The HASH key element and its declared type.
    pub fn partition_key(&self) -> Option<(&str, ScalarAttributeType)> {
        let element = self
            .key_schema
            .iter()
            .find(|k| k.key_type == KeyType::Hash)?;
        let definition = self
            .attribute_definitions
            .iter()
            .find(|a| a.attribute_name == element.attribute_name)?;
        Some((element.attribute_name.as_str(), definition.attribute_type))
    }
}

// ============================================================================
// IAM
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Principal {
    #[serde(rename = "Service")]
    pub service: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct PolicyStatement {
    pub action: String,
    pub effect: String,
    pub principal: Principal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct PolicyDocument {
    pub statement: Vec<PolicyStatement>,
    pub version: String,
}

/// `AWS::IAM::Role`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Role {
    pub assume_role_policy_document: PolicyDocument,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub managed_policy_arns: Vec<Expr>,
}

impl Role {
    /// A role that `service` can assume, with no policies attached yet.
    pub fn assumed_by(service: &str) -> Self {
        Self {
            assume_role_policy_document: PolicyDocument {
                statement: vec![PolicyStatement {
                    action: "sts:AssumeRole".to_string(),
                    effect: "Allow".to_string(),
                    principal: Principal {
                        service: service.to_string(),
                    },
                }],
                version: "2012-10-17".to_string(),
            },
            managed_policy_arns: Vec::new(),
        }
    }

    /// Binds an AWS managed policy by name.
    pub fn add_aws_managed_policy(&mut self, policy_name: &str) {
        self.managed_policy_arns
            .push(aws_managed_policy_arn(policy_name));
    }
}

/// `arn:${AWS::Partition}:iam::aws:policy/<name>`
pub fn aws_managed_policy_arn(policy_name: &str) -> Expr {
    Expr::join(
        "",
        vec![
            Expr::literal("arn:"),
            Expr::reference(AWS_PARTITION),
            Expr::literal(format!(":iam::aws:policy/{policy_name}")),
        ],
    )
}
