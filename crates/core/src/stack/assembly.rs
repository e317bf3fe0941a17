//! Assembles the items API stack (Functional Core - no I/O).

use crate::schema::{self, Operation};
use crate::templates::{request_template, response_template, KEY_ATTRIBUTE};
use crate::TABLE_NAME;

use super::error::Result;
use super::expr::{Expr, AWS_REGION};
use super::model::{DeletionPolicy, Stack};
use super::resources::{
    ApiKey, AuthenticationType, DataSource, DataSourceType, DynamoDbConfig, GraphQlApi,
    GraphQlSchema, Resolver, Resource, Role, Table, APPSYNC_PRINCIPAL, DYNAMODB_FULL_ACCESS,
};

pub const API_ID: &str = "AppSyncAPI";
pub const API_KEY_ID: &str = "ItemsApiKey";
pub const SCHEMA_ID: &str = "ItemsSchema";
pub const TABLE_ID: &str = "items";
pub const ROLE_ID: &str = "dataSourceIamRole";
pub const DATA_SOURCE_ID: &str = "dataSource";

/// Name of the AppSync data source bound to the table.
pub const DATA_SOURCE_NAME: &str = "ItemsDynamoDataSource";

/// Account and region the stack targets. Both are optional; an unset region
/// resolves at deploy time through `AWS::Region`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Environment {
    pub account: Option<String>,
    pub region: Option<String>,
}

impl Environment {
    pub fn new(account: Option<String>, region: Option<String>) -> Self {
        Self { account, region }
    }

    fn region_expr(&self) -> Expr {
        match &self.region {
            Some(region) => Expr::literal(region.as_str()),
            None => Expr::reference(AWS_REGION),
        }
    }
}

/// Inputs of [`assemble`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StackConfig {
    pub stack_name: String,
    pub api_name: String,
    /// Shared by the table and the GraphQL entity type.
    pub table_name: String,
    pub environment: Environment,
}

impl Default for StackConfig {
    fn default() -> Self {
        Self {
            stack_name: "ItemsStack".to_string(),
            api_name: "MyAppSyncAPI".to_string(),
            table_name: TABLE_NAME.to_string(),
            environment: Environment::default(),
        }
    }
}

impl StackConfig {
    /// Sets the stack name.
    pub fn with_stack_name(mut self, name: &str) -> Self {
        self.stack_name = name.to_string();
        self
    }

    /// Sets the table (and entity type) name.
    pub fn with_table_name(mut self, name: &str) -> Self {
        self.table_name = name.to_string();
        self
    }

    /// Sets the target environment.
    pub fn with_environment(mut self, environment: Environment) -> Self {
        self.environment = environment;
        self
    }
}

/// Builds the stack: API, API key, schema, table, role (with the DynamoDB
/// managed policy bound), data source and one resolver per operation.
///
/// Every resolver depends explicitly on the schema attachment. The rest of
/// the ordering comes from property references, and the whole graph is
/// validated before returning.
pub fn assemble(config: &StackConfig) -> Result<Stack> {
    let definition = schema::definition(&config.table_name);
    schema::validate_definition(&definition, &config.table_name)?;

    let mut stack = Stack::new(config.clone());
    let api_id = Expr::get_att(API_ID, "ApiId");

    stack.add(
        API_ID,
        Resource::GraphQlApi(GraphQlApi {
            name: config.api_name.clone(),
            authentication_type: AuthenticationType::ApiKey,
        }),
    )?;

    stack.add(
        API_KEY_ID,
        Resource::ApiKey(ApiKey {
            api_id: api_id.clone(),
        }),
    )?;

    stack.add(
        SCHEMA_ID,
        Resource::GraphQlSchema(GraphQlSchema {
            api_id: api_id.clone(),
            definition,
        }),
    )?;

    stack
        .add(
            TABLE_ID,
            Resource::Table(Table::with_partition_key(&config.table_name, KEY_ATTRIBUTE)),
        )?
        .with_deletion_policy(DeletionPolicy::Delete);

    let mut role = Role::assumed_by(APPSYNC_PRINCIPAL);
    role.add_aws_managed_policy(DYNAMODB_FULL_ACCESS);
    stack.add(ROLE_ID, Resource::Role(role))?;

    stack.add(
        DATA_SOURCE_ID,
        Resource::DataSource(DataSource {
            api_id: api_id.clone(),
            name: DATA_SOURCE_NAME.to_string(),
            kind: DataSourceType::AmazonDynamoDb,
            service_role_arn: Expr::get_att(ROLE_ID, "Arn"),
            dynamo_db_config: DynamoDbConfig {
                table_name: Expr::reference(TABLE_ID),
                aws_region: config.environment.region_expr(),
            },
        }),
    )?;

    for op in Operation::ALL {
        stack
            .add(
                op.resolver_logical_id(),
                Resource::Resolver(Resolver {
                    api_id: api_id.clone(),
                    type_name: op.root_type().to_string(),
                    field_name: op.field_name().to_string(),
                    data_source_name: Expr::get_att(DATA_SOURCE_ID, "Name"),
                    request_mapping_template: request_template(op),
                    response_mapping_template: response_template(op).to_string(),
                }),
            )?
            .depends_on(SCHEMA_ID);
    }

    stack.graph()?.validate()?;
    Ok(stack)
}
