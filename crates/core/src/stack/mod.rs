mod assembly;
mod error;
mod expr;
mod graph;
mod model;
mod resources;
mod template;

pub use assembly::{
    assemble, Environment, StackConfig, API_ID, API_KEY_ID, DATA_SOURCE_ID, DATA_SOURCE_NAME,
    ROLE_ID, SCHEMA_ID, TABLE_ID,
};
pub use error::{GraphError, Result, StackError};
pub use expr::{collect_references, Expr, AWS_PARTITION, AWS_REGION};
pub use graph::{DependencyGraph, EdgeKind};
pub use model::{DeletionPolicy, Stack, StackResource};
pub use resources::{
    ApiKey, AttributeDefinition, AuthenticationType, DataSource, DataSourceType, DynamoDbConfig,
    GraphQlApi, GraphQlSchema, KeySchemaElement, KeyType, ProvisionedThroughput, Resolver,
    Resource, Role, ScalarAttributeType, Table, APPSYNC_PRINCIPAL, DYNAMODB_FULL_ACCESS,
};
pub use template::TEMPLATE_FORMAT_VERSION;
