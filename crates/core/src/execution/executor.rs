//! Executes GraphQL documents against a [`ResolverEngine`].
//!
//! Only root fields have resolvers; nested selections are projected out of
//! the value the resolver returned, the way AppSync does for fields without
//! their own resolver.

use std::collections::{HashMap, HashSet};

use graphql_parser::query::{
    parse_query, Definition, Field, FragmentDefinition, OperationDefinition, Selection,
    SelectionSet, Value as GqlValue, VariableDefinition,
};
use serde_json::{Map, Number, Value};

use crate::resolver::ResolverEngine;
use crate::schema::{Operation, ENTITY_FIELDS};

use super::types::{GraphQlError, GraphQlRequest, GraphQlResponse};

type Fragments<'t, 'd> = HashMap<&'d str, &'d FragmentDefinition<'t, String>>;

/// Runs `request` and builds the response. Field-level failures become
/// entries in `errors` with a `null` value in `data`; they never abort the
/// other fields.
pub async fn execute(engine: &ResolverEngine, request: &GraphQlRequest) -> GraphQlResponse {
    let document = match parse_query::<String>(&request.query) {
        Ok(document) => document,
        Err(e) => {
            return GraphQlResponse::request_error(GraphQlError::new(
                format!("Invalid syntax: {e}"),
                "InvalidSyntax",
            ))
        }
    };

    let mut operations = Vec::new();
    let mut fragments: Fragments<'_, '_> = HashMap::new();
    for definition in &document.definitions {
        match definition {
            Definition::Operation(op) => operations.push(op),
            Definition::Fragment(fragment) => {
                fragments.insert(fragment.name.as_str(), fragment);
            }
        }
    }

    let operation = match select_operation(&operations, request.operation_name.as_deref()) {
        Ok(op) => op,
        Err(error) => return GraphQlResponse::request_error(error),
    };

    let (root, variable_definitions, selection_set) = match operation {
        OperationDefinition::SelectionSet(set) => ("Query", &[][..], set),
        OperationDefinition::Query(q) => ("Query", &q.variable_definitions[..], &q.selection_set),
        OperationDefinition::Mutation(m) => {
            ("Mutation", &m.variable_definitions[..], &m.selection_set)
        }
        OperationDefinition::Subscription(_) => {
            return GraphQlResponse::request_error(GraphQlError::new(
                "Subscriptions are not supported",
                "UnsupportedOperation",
            ))
        }
    };

    let variables = coerce_variables(variable_definitions, request.variables.as_ref());

    let mut data = Map::new();
    let mut errors = Vec::new();

    for (response_key, fields) in collect_fields(&[selection_set], &fragments) {
        let Some(field) = fields.first().copied() else {
            continue;
        };

        if field.name == "__typename" {
            data.insert(response_key, Value::String(root.to_string()));
            continue;
        }

        let mut arguments: Map<String, Value> = field
            .arguments
            .iter()
            .map(|(name, value)| (name.clone(), to_json(value, &variables)))
            .collect();

        let checked = validate_field(
            root,
            &response_key,
            &fields,
            &mut arguments,
            engine.entity_type(),
            &fragments,
        );
        if let Err(error) = checked {
            errors.push(error.at(response_key.clone()));
            data.insert(response_key, Value::Null);
            continue;
        }

        match engine.resolve(root, &field.name, arguments).await {
            Ok(value) => {
                let projected = project(&value, &fields, engine.entity_type(), &fragments);
                data.insert(response_key, projected);
            }
            Err(e) => {
                errors.push(GraphQlError::new(e.to_string(), e.error_type()).at(response_key.clone()));
                data.insert(response_key, Value::Null);
            }
        }
    }

    GraphQlResponse {
        data: Some(Value::Object(data)),
        errors,
    }
}

fn select_operation<'t, 'd>(
    operations: &[&'d OperationDefinition<'t, String>],
    name: Option<&str>,
) -> Result<&'d OperationDefinition<'t, String>, GraphQlError> {
    match name {
        Some(wanted) => operations
            .iter()
            .copied()
            .find(|op| operation_name(op) == Some(wanted))
            .ok_or_else(|| {
                GraphQlError::new(format!("Unknown operation named '{wanted}'"), "BadRequest")
            }),
        None => match operations {
            [only] => Ok(*only),
            [] => Err(GraphQlError::new("No operation in document", "BadRequest")),
            _ => Err(GraphQlError::new(
                "Must provide operation name if query contains multiple operations",
                "BadRequest",
            )),
        },
    }
}

fn operation_name<'t, 'd>(op: &'d OperationDefinition<'t, String>) -> Option<&'d str> {
    match op {
        OperationDefinition::SelectionSet(_) => None,
        OperationDefinition::Query(q) => q.name.as_deref(),
        OperationDefinition::Mutation(m) => m.name.as_deref(),
        OperationDefinition::Subscription(s) => s.name.as_deref(),
    }
}

/// Supplied variables, falling back to the declared defaults.
fn coerce_variables(
    definitions: &[VariableDefinition<'_, String>],
    supplied: Option<&Map<String, Value>>,
) -> Map<String, Value> {
    let empty = Map::new();
    let supplied = supplied.unwrap_or(&empty);
    definitions
        .iter()
        .map(|def| {
            let value = match supplied.get(&def.name) {
                Some(value) => value.clone(),
                None => def
                    .default_value
                    .as_ref()
                    .map(|v| to_json(v, &empty))
                    .unwrap_or(Value::Null),
            };
            (def.name.clone(), value)
        })
        .collect()
}

fn validation_error(message: String) -> GraphQlError {
    GraphQlError::new(format!("Validation error: {message}"), "ValidationError")
}

/// Checks one root response key against the schema before it is resolved.
/// Fields that are not operations are left to the engine, which reports
/// them as undefined.
fn validate_field<'t, 'd>(
    root: &str,
    response_key: &str,
    fields: &[&'d Field<'t, String>],
    arguments: &mut Map<String, Value>,
    type_name: &str,
    fragments: &Fragments<'t, 'd>,
) -> Result<(), GraphQlError> {
    check_mergeable(response_key, fields)?;
    let Some(field) = fields.first() else {
        return Ok(());
    };
    let Some(op) = Operation::from_field(root, &field.name) else {
        return Ok(());
    };
    check_arguments(op, arguments)?;
    check_selection(op, fields, type_name, fragments)
}

/// Fields sharing a response key must select the same field with the same
/// arguments.
fn check_mergeable(response_key: &str, fields: &[&Field<'_, String>]) -> Result<(), GraphQlError> {
    let Some((first, rest)) = fields.split_first() else {
        return Ok(());
    };
    if rest
        .iter()
        .all(|f| f.name == first.name && f.arguments == first.arguments)
    {
        Ok(())
    } else {
        Err(validation_error(format!(
            "fields under response key '{response_key}' conflict because they select different fields or arguments"
        )))
    }
}

/// The declared argument must be present and non-null, and no other
/// argument is accepted. `ID` arguments also accept integers, which are
/// coerced to strings in place.
fn check_arguments(op: Operation, arguments: &mut Map<String, Value>) -> Result<(), GraphQlError> {
    let argument = op.argument();
    if let Some(unknown) = arguments.keys().find(|name| name.as_str() != argument.name) {
        return Err(validation_error(format!(
            "unknown argument '{unknown}' on '{}'",
            op.field_name()
        )));
    }
    match arguments.get_mut(argument.name) {
        None | Some(Value::Null) => Err(validation_error(format!(
            "missing required argument '{}' of type '{}' on '{}'",
            argument.name,
            argument.type_signature,
            op.field_name()
        ))),
        Some(Value::String(_)) => Ok(()),
        Some(value @ Value::Number(_)) if argument.type_signature.starts_with("ID") => {
            *value = Value::String(value.to_string());
            Ok(())
        }
        Some(other) => Err(validation_error(format!(
            "argument '{}' on '{}' expects '{}', got {}",
            argument.name,
            op.field_name(),
            argument.type_signature,
            other
        ))),
    }
}

/// Every operation returns the entity type, so the selection must be a
/// non-empty set of its scalar fields.
fn check_selection<'t, 'd>(
    op: Operation,
    fields: &[&'d Field<'t, String>],
    type_name: &str,
    fragments: &Fragments<'t, 'd>,
) -> Result<(), GraphQlError> {
    let selected = collect_fields(&selection_sets(fields), fragments);
    if selected.is_empty() {
        return Err(validation_error(format!(
            "field '{}' of type '{type_name}' must have a selection of subfields",
            op.field_name()
        )));
    }

    for (response_key, sub_fields) in &selected {
        check_mergeable(response_key, sub_fields)?;
        let Some(sub_field) = sub_fields.first() else {
            continue;
        };
        let name = sub_field.name.as_str();
        let known = name == "__typename" || ENTITY_FIELDS.iter().any(|(field, _)| *field == name);
        if !known {
            return Err(validation_error(format!(
                "field '{name}' is not defined on type '{type_name}'"
            )));
        }
        if let Some((unknown, _)) = sub_field.arguments.first() {
            return Err(validation_error(format!(
                "unknown argument '{unknown}' on '{type_name}.{name}'"
            )));
        }
        if sub_fields.iter().any(|f| !f.selection_set.items.is_empty()) {
            return Err(validation_error(format!(
                "field '{name}' is a scalar and cannot have a selection of subfields"
            )));
        }
    }
    Ok(())
}

type FieldGroups<'t, 'd> = Vec<(String, Vec<&'d Field<'t, String>>)>;

fn response_key(field: &Field<'_, String>) -> String {
    field.alias.as_deref().unwrap_or(&field.name).to_string()
}

fn selection_sets<'t, 'd>(fields: &[&'d Field<'t, String>]) -> Vec<&'d SelectionSet<'t, String>> {
    fields.iter().copied().map(|field| &field.selection_set).collect()
}

/// Flattens fragment spreads and inline fragments, then groups the fields
/// by response key in first-seen order. Each fragment is expanded once.
fn collect_fields<'t, 'd>(
    selection_sets: &[&'d SelectionSet<'t, String>],
    fragments: &Fragments<'t, 'd>,
) -> FieldGroups<'t, 'd> {
    let mut groups = Vec::new();
    let mut visited = HashSet::new();
    for selection_set in selection_sets.iter().copied() {
        group_fields(selection_set, fragments, &mut visited, &mut groups);
    }
    groups
}

fn group_fields<'t, 'd>(
    selection_set: &'d SelectionSet<'t, String>,
    fragments: &Fragments<'t, 'd>,
    visited: &mut HashSet<&'d str>,
    groups: &mut FieldGroups<'t, 'd>,
) {
    for selection in &selection_set.items {
        match selection {
            Selection::Field(field) => {
                let key = response_key(field);
                match groups.iter_mut().find(|(existing, _)| *existing == key) {
                    Some((_, fields)) => fields.push(field),
                    None => groups.push((key, vec![field])),
                }
            }
            Selection::FragmentSpread(spread) => {
                if !visited.insert(spread.fragment_name.as_str()) {
                    continue;
                }
                if let Some(fragment) = fragments.get(spread.fragment_name.as_str()).copied() {
                    group_fields(&fragment.selection_set, fragments, visited, groups);
                }
            }
            Selection::InlineFragment(inline) => {
                group_fields(&inline.selection_set, fragments, visited, groups);
            }
        }
    }
}

/// Keeps only the selected fields of a resolver result, merging the
/// sub-selections of every field under the same response key.
fn project<'t, 'd>(
    value: &Value,
    fields: &[&'d Field<'t, String>],
    type_name: &str,
    fragments: &Fragments<'t, 'd>,
) -> Value {
    let selected = collect_fields(&selection_sets(fields), fragments);
    if selected.is_empty() {
        return value.clone();
    }
    match value {
        Value::Object(map) => {
            let mut out = Map::new();
            for (key, sub_fields) in &selected {
                let Some(sub_field) = sub_fields.first() else {
                    continue;
                };
                let projected = if sub_field.name == "__typename" {
                    Value::String(type_name.to_string())
                } else {
                    let inner = map.get(&sub_field.name).unwrap_or(&Value::Null);
                    project(inner, sub_fields, type_name, fragments)
                };
                out.insert(key.clone(), projected);
            }
            Value::Object(out)
        }
        Value::Array(items) => Value::Array(
            items
                .iter()
                .map(|item| project(item, fields, type_name, fragments))
                .collect(),
        ),
        other => other.clone(),
    }
}

fn to_json(value: &GqlValue<'_, String>, variables: &Map<String, Value>) -> Value {
    match value {
        GqlValue::Variable(name) => variables.get(name).cloned().unwrap_or(Value::Null),
        GqlValue::Int(n) => n.as_i64().map(Value::from).unwrap_or(Value::Null),
        GqlValue::Float(f) => Number::from_f64(*f)
            .map(Value::Number)
            .unwrap_or(Value::Null),
        GqlValue::String(s) => Value::String(s.clone()),
        GqlValue::Boolean(b) => Value::Bool(*b),
        GqlValue::Null => Value::Null,
        GqlValue::Enum(e) => Value::String(e.clone()),
        GqlValue::List(items) => {
            Value::Array(items.iter().map(|v| to_json(v, variables)).collect())
        }
        GqlValue::Object(fields) => Value::Object(
            fields
                .iter()
                .map(|(k, v)| (k.clone(), to_json(v, variables)))
                .collect(),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

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

    async fn run(engine: &ResolverEngine, query: &str) -> GraphQlResponse {
        execute(engine, &GraphQlRequest::new(query)).await
    }

    #[tokio::test]
    async fn test_widget_lifecycle() {
        let engine = engine();

        let added = run(&engine, r#"mutation { addItem(name: "widget") { id name } }"#).await;
        assert!(added.is_ok(), "{:?}", added.errors);
        let item = &added.data.as_ref().unwrap()["addItem"];
        let id = item["id"].as_str().unwrap().to_string();
        assert!(!id.is_empty());
        assert_eq!(item["name"], "widget");

        let fetched = run(&engine, &format!(r#"{{ getItem(id: "{id}") {{ id name }} }}"#)).await;
        assert_eq!(fetched.data.unwrap()["getItem"], *item);

        let deleted = run(
            &engine,
            &format!(r#"mutation {{ deleteItem(id: "{id}") {{ id }} }}"#),
        )
        .await;
        assert_eq!(deleted.data.unwrap()["deleteItem"], json!({"id": id}));

        let gone = run(&engine, &format!(r#"{{ getItem(id: "{id}") {{ id }} }}"#)).await;
        assert!(gone.is_ok());
        assert_eq!(gone.data.unwrap()["getItem"], Value::Null);
    }

    #[tokio::test]
    async fn test_get_nonexistent_returns_null_without_error() {
        let engine = engine();
        let response = run(&engine, r#"{ getItem(id: "nonexistent") { id name } }"#).await;
        assert!(response.is_ok());
        assert_eq!(response.data.unwrap(), json!({"getItem": null}));
    }

    #[tokio::test]
    async fn test_variables_alias_and_typename() {
        let engine = engine();
        let request = GraphQlRequest::new(
            "mutation Add($n: String!) { created: addItem(name: $n) { __typename name } }",
        )
        .with_variables(json!({"n": "gizmo"}).as_object().unwrap().clone());

        let response = execute(&engine, &request).await;
        assert_eq!(
            response.data.unwrap(),
            json!({"created": {"__typename": "items", "name": "gizmo"}})
        );
    }

    #[tokio::test]
    async fn test_variable_default_value() {
        let engine = engine();
        let response = run(
            &engine,
            r#"mutation Add($n: String = "fallback") { addItem(name: $n) { name } }"#,
        )
        .await;
        assert_eq!(
            response.data.unwrap()["addItem"]["name"],
            json!("fallback")
        );
    }

    #[tokio::test]
    async fn test_fragments_are_expanded() {
        let engine = engine();
        let response = run(
            &engine,
            r#"
            mutation { addItem(name: "w") { ...Fields } }
            fragment Fields on items { id ... on items { name } }
            "#,
        )
        .await;
        assert_eq!(
            response.data.unwrap()["addItem"],
            json!({"id": "item-1", "name": "w"})
        );
    }

    #[tokio::test]
    async fn test_missing_required_argument_is_field_error() {
        let engine = engine();
        let response = run(&engine, "{ getItem { id } }").await;
        assert_eq!(response.data.unwrap(), json!({"getItem": null}));
        assert_eq!(response.errors.len(), 1);
        assert_eq!(response.errors[0].path, vec!["getItem".to_string()]);
        assert_eq!(response.errors[0].error_type.as_deref(), Some("ValidationError"));
    }

    #[tokio::test]
    async fn test_wrong_argument_type_is_field_error() {
        let engine = engine();
        let response = run(&engine, "mutation { addItem(name: 5) { id } }").await;
        assert_eq!(response.errors.len(), 1);
        assert!(response.errors[0].message.contains("expects 'String!'"));
    }

    #[tokio::test]
    async fn test_integer_id_is_coerced() {
        let engine = engine();
        let response = run(&engine, "{ getItem(id: 42) { id } }").await;
        assert!(response.is_ok(), "{:?}", response.errors);
        assert_eq!(response.data.unwrap(), json!({"getItem": null}));
    }

    #[tokio::test]
    async fn test_unknown_field_does_not_abort_siblings() {
        let engine = engine();
        let response = run(
            &engine,
            r#"{ listItems { id } getItem(id: "x") { id } }"#,
        )
        .await;
        assert_eq!(
            response.data.unwrap(),
            json!({"listItems": null, "getItem": null})
        );
        assert_eq!(response.errors.len(), 1);
        assert_eq!(response.errors[0].error_type.as_deref(), Some("FieldUndefined"));
    }

    #[tokio::test]
    async fn test_duplicate_keys_are_merged() {
        let engine = engine();
        run(&engine, r#"mutation { addItem(name: "w") { id } }"#).await;

        let response = run(
            &engine,
            r#"{ getItem(id: "item-1") { id } getItem(id: "item-1") { name } }"#,
        )
        .await;
        assert!(response.is_ok(), "{:?}", response.errors);
        assert_eq!(
            response.data.unwrap(),
            json!({"getItem": {"id": "item-1", "name": "w"}})
        );
    }

    #[tokio::test]
    async fn test_duplicate_mutation_key_runs_once() {
        let engine = engine();
        let response = run(
            &engine,
            r#"mutation { a: addItem(name: "w") { id } a: addItem(name: "w") { name } }"#,
        )
        .await;
        assert_eq!(
            response.data.unwrap(),
            json!({"a": {"id": "item-1", "name": "w"}})
        );

        let second = run(&engine, r#"{ getItem(id: "item-2") { id } }"#).await;
        assert_eq!(second.data.unwrap(), json!({"getItem": null}));
    }

    #[tokio::test]
    async fn test_conflicting_fields_under_one_key_are_rejected() {
        let engine = engine();
        let response = run(
            &engine,
            r#"{ x: getItem(id: "1") { id } x: getItem(id: "2") { id } }"#,
        )
        .await;
        assert_eq!(response.data.unwrap(), json!({"x": null}));
        assert_eq!(response.errors[0].error_type.as_deref(), Some("ValidationError"));
    }

    #[tokio::test]
    async fn test_unknown_entity_field_is_rejected() {
        let engine = engine();
        run(&engine, r#"mutation { addItem(name: "w") { id } }"#).await;

        let response = run(&engine, r#"{ getItem(id: "item-1") { id bogus } }"#).await;
        assert_eq!(response.data.unwrap(), json!({"getItem": null}));
        assert_eq!(response.errors.len(), 1);
        assert_eq!(response.errors[0].path, vec!["getItem".to_string()]);
        assert_eq!(response.errors[0].error_type.as_deref(), Some("ValidationError"));
        assert!(response.errors[0].message.contains("'bogus'"));
    }

    #[tokio::test]
    async fn test_unknown_argument_is_rejected_before_resolving() {
        let engine = engine();
        let response = run(&engine, r#"{ getItem(id: "item-1", extra: 3) { id } }"#).await;
        assert_eq!(response.data.unwrap(), json!({"getItem": null}));
        assert!(response.errors[0].message.contains("unknown argument 'extra'"));

        let response = run(&engine, r#"mutation { addItem(name: "w", id: "x") { id } }"#).await;
        assert_eq!(response.errors[0].error_type.as_deref(), Some("ValidationError"));
        let untouched = run(&engine, r#"{ getItem(id: "item-1") { id } }"#).await;
        assert_eq!(untouched.data.unwrap(), json!({"getItem": null}));
    }

    #[tokio::test]
    async fn test_selection_shape_is_checked() {
        let engine = engine();

        let response = run(&engine, r#"{ getItem(id: "1") }"#).await;
        assert!(response.errors[0].message.contains("selection of subfields"));

        let response = run(&engine, r#"{ getItem(id: "1") { id { x } } }"#).await;
        assert!(response.errors[0].message.contains("is a scalar"));

        let response = run(&engine, r#"{ getItem(id: "1") { name(upper: true) } }"#).await;
        assert!(response.errors[0].message.contains("unknown argument 'upper'"));
    }

    #[tokio::test]
    async fn test_syntax_error_has_no_data() {
        let engine = engine();
        let response = run(&engine, "{ getItem(id: ").await;
        assert!(response.data.is_none());
        assert_eq!(response.errors[0].error_type.as_deref(), Some("InvalidSyntax"));
    }

    #[tokio::test]
    async fn test_operation_selection() {
        let engine = engine();
        let query = r#"
            query A { getItem(id: "1") { id } }
            query B { __typename }
        "#;

        let response = run(&engine, query).await;
        assert!(response.data.is_none());
        assert_eq!(response.errors[0].error_type.as_deref(), Some("BadRequest"));

        let response = execute(&engine, &GraphQlRequest::new(query).with_operation_name("B")).await;
        assert_eq!(response.data.unwrap(), json!({"__typename": "Query"}));

        let response = execute(&engine, &GraphQlRequest::new(query).with_operation_name("C")).await;
        assert!(response.errors[0].message.contains("'C'"));
    }

    #[tokio::test]
    async fn test_subscription_is_rejected() {
        let engine = engine();
        let response = run(&engine, "subscription { onItem { id } }").await;
        assert!(response.data.is_none());
        assert_eq!(
            response.errors[0].error_type.as_deref(),
            Some("UnsupportedOperation")
        );
    }
}
