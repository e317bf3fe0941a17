//! Executes the resolvers of an assembled stack against an [`ItemStore`].

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::{Map, Value};

use crate::stack::Stack;
use crate::storage::ItemStore;
use crate::templates::{
    map_to_json, render, DataSourceRequest, IdGenerator, TemplateContext, TemplateError,
};

use super::error::{ResolveError, Result};

#[derive(Debug, Clone)]
struct AttachedResolver {
    request_template: String,
    response_template: String,
}

/// Local stand-in for the AppSync resolver pipeline: request template ->
/// data source call -> response template.
#[derive(Clone)]
pub struct ResolverEngine {
    store: Arc<dyn ItemStore>,
    ids: Arc<dyn IdGenerator>,
    entity_type: String,
    resolvers: HashMap<(String, String), AttachedResolver>,
}

impl ResolverEngine {
    /// Uses the resolver resources of `stack`, so the exact templates that
    /// would be deployed are the ones executed.
    pub fn from_stack(
        stack: &Stack,
        store: Arc<dyn ItemStore>,
        ids: Arc<dyn IdGenerator>,
    ) -> Self {
        let resolvers = stack
            .resolvers()
            .map(|(_, resolver)| {
                (
                    (resolver.type_name.clone(), resolver.field_name.clone()),
                    AttachedResolver {
                        request_template: resolver.request_mapping_template.clone(),
                        response_template: resolver.response_mapping_template.clone(),
                    },
                )
            })
            .collect();

        Self {
            store,
            ids,
            entity_type: stack.config().table_name.clone(),
            resolvers,
        }
    }

    /// GraphQL type every resolver returns.
    pub fn entity_type(&self) -> &str {
        &self.entity_type
    }

    /// Whether `type_name.field_name` has a resolver attached.
    pub fn has_field(&self, type_name: &str, field_name: &str) -> bool {
        self.resolvers
            .contains_key(&(type_name.to_string(), field_name.to_string()))
    }

    /// Resolves one root field with the given arguments.
    pub async fn resolve(
        &self,
        type_name: &str,
        field_name: &str,
        arguments: Map<String, Value>,
    ) -> Result<Value> {
        let resolver = self
            .resolvers
            .get(&(type_name.to_string(), field_name.to_string()))
            .ok_or_else(|| ResolveError::NoResolver {
                type_name: type_name.to_string(),
                field_name: field_name.to_string(),
            })?;

        let context = TemplateContext::with_arguments(arguments);
        let rendered = render(&resolver.request_template, &context, self.ids.as_ref())?;
        let request = DataSourceRequest::parse(&rendered)?;

        let item = match request {
            DataSourceRequest::GetItem { key, .. } => self.store.get_item(&key).await?,
            DataSourceRequest::PutItem {
                key,
                attribute_values,
                ..
            } => Some(self.store.put_item(&key, &attribute_values).await?),
            DataSourceRequest::DeleteItem { key, .. } => self.store.delete_item(&key).await?,
        };

        let result = match item {
            Some(item) => Value::Object(map_to_json(&item)?),
            None => Value::Null,
        };

        let context = context.with_result(result);
        let rendered = render(&resolver.response_template, &context, self.ids.as_ref())?;
        let value = serde_json::from_str(&rendered)
            .map_err(|e| TemplateError::InvalidResponse(e.to_string()))?;
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stack::{assemble, StackConfig};
    use crate::storage::InMemoryItemStore;
    use crate::templates::SequentialIds;
    use serde_json::json;

    fn engine() -> ResolverEngine {
        let stack = assemble(&StackConfig::default()).unwrap();
        ResolverEngine::from_stack(
            &stack,
            Arc::new(InMemoryItemStore::new("id")),
            Arc::new(SequentialIds::new("item")),
        )
    }

    fn args(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => Map::new(),
        }
    }

    #[tokio::test]
    async fn test_add_get_delete_lifecycle() {
        let engine = engine();

        let added = engine
            .resolve("Mutation", "addItem", args(json!({"name": "widget"})))
            .await
            .unwrap();
        assert_eq!(added, json!({"id": "item-1", "name": "widget"}));

        let fetched = engine
            .resolve("Query", "getItem", args(json!({"id": "item-1"})))
            .await
            .unwrap();
        assert_eq!(fetched, added);

        let deleted = engine
            .resolve("Mutation", "deleteItem", args(json!({"id": "item-1"})))
            .await
            .unwrap();
        assert_eq!(deleted, added);

        let gone = engine
            .resolve("Query", "getItem", args(json!({"id": "item-1"})))
            .await
            .unwrap();
        assert_eq!(gone, Value::Null);
    }

    #[tokio::test]
    async fn test_get_nonexistent_is_null_not_error() {
        let engine = engine();
        let value = engine
            .resolve("Query", "getItem", args(json!({"id": "nonexistent"})))
            .await
            .unwrap();
        assert_eq!(value, Value::Null);
    }

    #[tokio::test]
    async fn test_delete_nonexistent_is_null_not_error() {
        let engine = engine();
        let value = engine
            .resolve("Mutation", "deleteItem", args(json!({"id": "nonexistent"})))
            .await
            .unwrap();
        assert_eq!(value, Value::Null);
    }

    #[tokio::test]
    async fn test_add_item_ignores_caller_id() {
        let engine = engine();
        let added = engine
            .resolve(
                "Mutation",
                "addItem",
                args(json!({"name": "widget", "id": "mine"})),
            )
            .await
            .unwrap();
        assert_eq!(added["id"], "item-1");
    }

    #[tokio::test]
    async fn test_unknown_field() {
        let engine = engine();
        assert!(!engine.has_field("Query", "listItems"));
        let err = engine
            .resolve("Query", "listItems", Map::new())
            .await
            .unwrap_err();
        assert!(matches!(err, ResolveError::NoResolver { .. }));
    }

    #[tokio::test]
    async fn test_missing_id_is_a_store_validation_error() {
        let engine = engine();
        let err = engine
            .resolve("Query", "getItem", Map::new())
            .await
            .unwrap_err();
        assert_eq!(err.error_type(), "DynamoDB:ValidationException");
    }
}
