//! Serialization of a [`Stack`] into a CloudFormation template.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;
use serde_json::Value;

use super::assembly::{API_ID, API_KEY_ID};
use super::error::{GraphError, Result, StackError};
use super::expr::{collect_references, Expr};
use super::model::{DeletionPolicy, Stack};

pub const TEMPLATE_FORMAT_VERSION: &str = "2010-09-09";

#[derive(Debug, Serialize)]
struct Template<'a> {
    #[serde(rename = "AWSTemplateFormatVersion")]
    format_version: &'static str,
    #[serde(rename = "Description")]
    description: String,
    #[serde(rename = "Metadata", skip_serializing_if = "Option::is_none")]
    metadata: Option<Value>,
    #[serde(rename = "Resources")]
    resources: BTreeMap<&'a str, ResourceEntry<'a>>,
    #[serde(rename = "Outputs", skip_serializing_if = "BTreeMap::is_empty")]
    outputs: BTreeMap<&'static str, Output>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct ResourceEntry<'a> {
    #[serde(rename = "Type")]
    kind: &'static str,
    properties: Value,
    #[serde(skip_serializing_if = "<[String]>::is_empty")]
    depends_on: &'a [String],
    #[serde(skip_serializing_if = "Option::is_none")]
    update_replace_policy: Option<DeletionPolicy>,
    #[serde(skip_serializing_if = "Option::is_none")]
    deletion_policy: Option<DeletionPolicy>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct Output {
    description: &'static str,
    value: Expr,
}

impl Stack {
    /// Validates the dependency graph and emits the template.
    pub fn to_template(&self) -> Result<Value> {
        let graph = self.graph()?;
        graph.validate()?;

        let mut resources = BTreeMap::new();
        for resource in self.resources() {
            let properties = resource
                .resource
                .properties()
                .map_err(|e| StackError::Serialization(e.to_string()))?;
            resources.insert(
                resource.logical_id.as_str(),
                ResourceEntry {
                    kind: resource.resource.type_name(),
                    properties,
                    depends_on: &resource.depends_on,
                    update_replace_policy: resource.deletion_policy,
                    deletion_policy: resource.deletion_policy,
                },
            );
        }

        let outputs = self.outputs();
        let output_value = serde_json::to_value(&outputs)
            .map_err(|e| StackError::Serialization(e.to_string()))?;
        let mut output_refs = BTreeSet::new();
        collect_references(&output_value, &mut output_refs);
        if let Some(missing) = output_refs.into_iter().find(|id| !graph.contains(id)) {
            return Err(GraphError::DanglingReference {
                from: "Outputs".to_string(),
                to: missing,
            }
            .into());
        }

        let template = Template {
            format_version: TEMPLATE_FORMAT_VERSION,
            description: format!(
                "{}: GraphQL API over the '{}' table",
                self.config().stack_name,
                self.config().table_name
            ),
            metadata: self.metadata(),
            resources,
            outputs,
        };

        serde_json::to_value(&template).map_err(|e| StackError::Serialization(e.to_string()))
    }

    /// Pretty-printed template text.
    pub fn to_json_pretty(&self) -> Result<String> {
        let template = self.to_template()?;
        serde_json::to_string_pretty(&template)
            .map_err(|e| StackError::Serialization(e.to_string()))
    }

    fn outputs(&self) -> BTreeMap<&'static str, Output> {
        let mut outputs = BTreeMap::new();
        if self.get(API_ID).is_some() {
            outputs.insert(
                "GraphQLUrl",
                Output {
                    description: "GraphQL endpoint URL",
                    value: Expr::get_att(API_ID, "GraphQLUrl"),
                },
            );
        }
        if self.get(API_KEY_ID).is_some() {
            outputs.insert(
                "ApiKey",
                Output {
                    description: "API key for the GraphQL endpoint",
                    value: Expr::get_att(API_KEY_ID, "ApiKey"),
                },
            );
        }
        outputs
    }

    fn metadata(&self) -> Option<Value> {
        let env = &self.config().environment;
        if env.account.is_none() && env.region.is_none() {
            return None;
        }
        let mut target = serde_json::Map::new();
        if let Some(account) = &env.account {
            target.insert("Account".to_string(), Value::String(account.clone()));
        }
        if let Some(region) = &env.region {
            target.insert("Region".to_string(), Value::String(region.clone()));
        }
        let mut metadata = serde_json::Map::new();
        metadata.insert("Environment".to_string(), Value::Object(target));
        Some(Value::Object(metadata))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{validate_definition, Operation};
    use crate::stack::assembly::{assemble, Environment, StackConfig, SCHEMA_ID, TABLE_ID};
    use crate::stack::resources::{Resource, Table};
    use serde_json::json;

    fn template() -> Value {
        assemble(&StackConfig::default())
            .unwrap()
            .to_template()
            .unwrap()
    }

    #[test]
    fn test_template_header() {
        let template = template();
        assert_eq!(template["AWSTemplateFormatVersion"], "2010-09-09");
        assert_eq!(template["Resources"].as_object().unwrap().len(), 9);
        assert!(template.get("Metadata").is_none());
    }

    #[test]
    fn test_resolvers_declare_depends_on_schema() {
        let template = template();
        for op in Operation::ALL {
            let resolver = &template["Resources"][op.resolver_logical_id()];
            assert_eq!(resolver["Type"], "AWS::AppSync::Resolver");
            assert_eq!(resolver["DependsOn"], json!([SCHEMA_ID]));
            assert_eq!(resolver["Properties"]["FieldName"], op.field_name());
            assert_eq!(
                resolver["Properties"]["DataSourceName"],
                json!({"Fn::GetAtt": ["dataSource", "Name"]})
            );
        }
    }

    #[test]
    fn test_only_resolvers_have_depends_on() {
        let template = template();
        for (id, resource) in template["Resources"].as_object().unwrap() {
            let is_resolver = resource["Type"] == "AWS::AppSync::Resolver";
            assert_eq!(resource.get("DependsOn").is_some(), is_resolver, "{id}");
        }
    }

    #[test]
    fn test_table_entry() {
        let template = template();
        let table = &template["Resources"][TABLE_ID];
        assert_eq!(table["Type"], "AWS::DynamoDB::Table");
        assert_eq!(table["DeletionPolicy"], "Delete");
        assert_eq!(table["UpdateReplacePolicy"], "Delete");
        assert_eq!(
            table["Properties"]["KeySchema"],
            json!([{"AttributeName": "id", "KeyType": "HASH"}])
        );
        assert_eq!(
            table["Properties"]["AttributeDefinitions"],
            json!([{"AttributeName": "id", "AttributeType": "S"}])
        );
    }

    #[test]
    fn test_embedded_schema_is_valid() {
        let template = template();
        let definition = template["Resources"][SCHEMA_ID]["Properties"]["Definition"]
            .as_str()
            .unwrap();
        let summary = validate_definition(definition, "items").unwrap();
        assert_eq!(
            summary.field_names(),
            vec!["getItem", "addItem", "deleteItem"]
        );
    }

    #[test]
    fn test_outputs() {
        let template = template();
        assert_eq!(
            template["Outputs"]["GraphQLUrl"]["Value"],
            json!({"Fn::GetAtt": ["AppSyncAPI", "GraphQLUrl"]})
        );
        assert_eq!(
            template["Outputs"]["ApiKey"]["Value"],
            json!({"Fn::GetAtt": ["ItemsApiKey", "ApiKey"]})
        );
    }

    #[test]
    fn test_region_defaults_to_pseudo_parameter() {
        let template = template();
        assert_eq!(
            template["Resources"]["dataSource"]["Properties"]["DynamoDBConfig"]["AwsRegion"],
            json!({"Ref": "AWS::Region"})
        );
    }

    #[test]
    fn test_metadata_records_environment() {
        let config = StackConfig::default().with_environment(Environment::new(
            Some("123456789012".to_string()),
            Some("us-west-2".to_string()),
        ));
        let template = assemble(&config).unwrap().to_template().unwrap();
        assert_eq!(
            template["Metadata"],
            json!({"Environment": {"Account": "123456789012", "Region": "us-west-2"}})
        );
    }

    #[test]
    fn test_dangling_reference_is_rejected() {
        let mut stack = Stack::new(StackConfig::default());
        stack
            .add(
                "lonely",
                Resource::ApiKey(crate::stack::resources::ApiKey {
                    api_id: Expr::get_att("missing", "ApiId"),
                }),
            )
            .unwrap();

        assert_eq!(
            stack.to_template().unwrap_err(),
            StackError::Graph(GraphError::DanglingReference {
                from: "lonely".to_string(),
                to: "missing".to_string(),
            })
        );
    }

    #[test]
    fn test_retained_and_snapshotted_tables() {
        for (policy, expected) in [
            (DeletionPolicy::Retain, "Retain"),
            (DeletionPolicy::Snapshot, "Snapshot"),
        ] {
            let mut stack = Stack::new(StackConfig::default());
            stack
                .add(
                    TABLE_ID,
                    Resource::Table(Table::with_partition_key("items", "id")),
                )
                .unwrap()
                .with_deletion_policy(policy);

            let template = stack.to_template().unwrap();
            let table = &template["Resources"][TABLE_ID];
            assert_eq!(table["DeletionPolicy"], expected);
            assert_eq!(table["UpdateReplacePolicy"], expected);
        }
    }

    #[test]
    fn test_unset_policy_is_omitted() {
        let mut stack = Stack::new(StackConfig::default());
        stack
            .add(
                TABLE_ID,
                Resource::Table(Table::with_partition_key("items", "id")),
            )
            .unwrap();
        let template = stack.to_template().unwrap();
        let table = template["Resources"][TABLE_ID].as_object().unwrap();
        assert!(!table.contains_key("DeletionPolicy"));
        assert!(!table.contains_key("UpdateReplacePolicy"));
    }

    #[test]
    fn test_outputs_are_skipped_for_partial_stacks() {
        let mut stack = Stack::new(StackConfig::default());
        stack
            .add(
                TABLE_ID,
                Resource::Table(Table::with_partition_key("items", "id")),
            )
            .unwrap();
        let template = stack.to_template().unwrap();
        assert!(template.get("Outputs").is_none());
    }
}
