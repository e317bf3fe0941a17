//! Structural checks on a schema definition.
//!
//! The schema attachment resource would reject malformed SDL at deploy time;
//! this catches it earlier and also checks the operation contract.

use std::collections::HashMap;

use graphql_parser::schema::{parse_schema, Definition, Field, ObjectType, Type, TypeDefinition};

use super::definition::ENTITY_FIELDS;
use super::error::{Result, SchemaError};
use super::operations::{Operation, RootType};

/// Shape of one root field as found in the parsed schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationSignature {
    pub root: RootType,
    pub field: String,
    pub arguments: Vec<(String, String)>,
    pub return_type: String,
}

/// What a valid schema declares.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaSummary {
    pub entity_type: String,
    pub operations: Vec<OperationSignature>,
}

impl SchemaSummary {
    pub fn field_names(&self) -> Vec<&str> {
        self.operations.iter().map(|op| op.field.as_str()).collect()
    }
}

/// Parses `sdl` and checks it declares the items contract for `type_name`.
pub fn validate_definition(sdl: &str, type_name: &str) -> Result<SchemaSummary> {
    let document = parse_schema::<String>(sdl).map_err(|e| SchemaError::Parse(e.to_string()))?;

    let mut objects: HashMap<&str, &ObjectType<'_, String>> = HashMap::new();
    let mut roots: Option<(Option<&str>, Option<&str>)> = None;

    for definition in &document.definitions {
        match definition {
            Definition::TypeDefinition(TypeDefinition::Object(object)) => {
                objects.insert(object.name.as_str(), object);
            }
            Definition::SchemaDefinition(schema) => {
                roots = Some((schema.query.as_deref(), schema.mutation.as_deref()));
            }
            _ => {}
        }
    }

    let entity = objects
        .get(type_name)
        .ok_or_else(|| SchemaError::MissingType(type_name.to_string()))?;
    check_fields(entity, &ENTITY_FIELDS)?;

    let (query, mutation) = roots.ok_or(SchemaError::MissingSchemaBlock)?;
    check_root("query", RootType::Query, query)?;
    check_root("mutation", RootType::Mutation, mutation)?;

    let mut operations = Vec::new();
    for root in [RootType::Query, RootType::Mutation] {
        let object = objects
            .get(root.as_str())
            .ok_or_else(|| SchemaError::MissingType(root.to_string()))?;

        let expected: Vec<Operation> = Operation::on_root(root).collect();
        for field in &object.fields {
            if !expected.iter().any(|op| op.field_name() == field.name) {
                return Err(SchemaError::UnexpectedField {
                    type_name: root.to_string(),
                    field: field.name.clone(),
                });
            }
        }

        for op in expected {
            let field = object
                .fields
                .iter()
                .find(|f| f.name == op.field_name())
                .ok_or_else(|| SchemaError::MissingField {
                    type_name: root.to_string(),
                    field: op.field_name().to_string(),
                })?;
            operations.push(check_operation(root, op, field, type_name)?);
        }
    }

    Ok(SchemaSummary {
        entity_type: type_name.to_string(),
        operations,
    })
}

fn check_root(root: &'static str, expected: RootType, found: Option<&str>) -> Result<()> {
    match found {
        Some(name) if name == expected.as_str() => Ok(()),
        other => Err(SchemaError::RootMismatch {
            root,
            expected: expected.to_string(),
            found: other.unwrap_or_default().to_string(),
        }),
    }
}

fn check_fields(object: &ObjectType<'_, String>, expected: &[(&str, &str)]) -> Result<()> {
    for field in &object.fields {
        if !expected.iter().any(|(name, _)| *name == field.name) {
            return Err(SchemaError::UnexpectedField {
                type_name: object.name.clone(),
                field: field.name.clone(),
            });
        }
    }

    for (name, signature) in expected {
        let field = object
            .fields
            .iter()
            .find(|f| f.name == *name)
            .ok_or_else(|| SchemaError::MissingField {
                type_name: object.name.clone(),
                field: name.to_string(),
            })?;
        let found = type_signature(&field.field_type);
        if found != *signature {
            return Err(SchemaError::FieldType {
                type_name: object.name.clone(),
                field: name.to_string(),
                expected: signature.to_string(),
                found,
            });
        }
    }
    Ok(())
}

fn check_operation(
    root: RootType,
    op: Operation,
    field: &Field<'_, String>,
    type_name: &str,
) -> Result<OperationSignature> {
    let arguments: Vec<(String, String)> = field
        .arguments
        .iter()
        .map(|arg| (arg.name.clone(), type_signature(&arg.value_type)))
        .collect();

    let expected_arg = op.argument();
    let matches = arguments.len() == 1
        && arguments[0].0 == expected_arg.name
        && arguments[0].1 == expected_arg.type_signature;
    if !matches {
        return Err(SchemaError::Arguments {
            type_name: root.to_string(),
            field: op.field_name().to_string(),
            expected: format!("{}: {}", expected_arg.name, expected_arg.type_signature),
            found: format_arguments(&arguments),
        });
    }

    let return_type = type_signature(&field.field_type);
    if return_type != type_name {
        return Err(SchemaError::FieldType {
            type_name: root.to_string(),
            field: op.field_name().to_string(),
            expected: type_name.to_string(),
            found: return_type,
        });
    }

    Ok(OperationSignature {
        root,
        field: op.field_name().to_string(),
        arguments,
        return_type,
    })
}

fn format_arguments(arguments: &[(String, String)]) -> String {
    arguments
        .iter()
        .map(|(name, ty)| format!("{name}: {ty}"))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Renders a type reference the way it is written in SDL (`ID!`, `[items]`).
fn type_signature(ty: &Type<'_, String>) -> String {
    match ty {
        Type::NamedType(name) => name.clone(),
        Type::ListType(inner) => format!("[{}]", type_signature(inner)),
        Type::NonNullType(inner) => format!("{}!", type_signature(inner)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::definition;

    #[test]
    fn test_generated_definition_is_valid() {
        let summary = validate_definition(&definition("items"), "items").unwrap();

        assert_eq!(summary.entity_type, "items");
        assert_eq!(
            summary.field_names(),
            vec!["getItem", "addItem", "deleteItem"]
        );

        let add = &summary.operations[1];
        assert_eq!(add.root, RootType::Mutation);
        assert_eq!(
            add.arguments,
            vec![("name".to_string(), "String!".to_string())]
        );
        assert_eq!(add.return_type, "items");

        for op in &summary.operations {
            if op.field != "addItem" {
                assert_eq!(op.arguments, vec![("id".to_string(), "ID!".to_string())]);
            }
        }
    }

    #[test]
    fn test_rejects_unparsable_text() {
        let err = validate_definition("type items {", "items").unwrap_err();
        assert!(matches!(err, SchemaError::Parse(_)));
    }

    #[test]
    fn test_rejects_missing_entity_type() {
        let err = validate_definition(&definition("items"), "things").unwrap_err();
        assert_eq!(err, SchemaError::MissingType("things".to_string()));
    }

    #[test]
    fn test_rejects_missing_schema_block() {
        let sdl = definition("items").replace(
            "schema {\n  query: Query\n  mutation: Mutation\n}\n",
            "",
        );
        let err = validate_definition(&sdl, "items").unwrap_err();
        assert_eq!(err, SchemaError::MissingSchemaBlock);
    }

    #[test]
    fn test_rejects_extra_operation() {
        let sdl = definition("items").replace(
            "  getItem(id: ID!): items\n",
            "  getItem(id: ID!): items\n  listItems: [items]\n",
        );
        let err = validate_definition(&sdl, "items").unwrap_err();
        assert_eq!(
            err,
            SchemaError::UnexpectedField {
                type_name: "Query".to_string(),
                field: "listItems".to_string(),
            }
        );
    }

    #[test]
    fn test_rejects_wrong_argument_shape() {
        let sdl = definition("items").replace("addItem(name: String!)", "addItem(name: String)");
        let err = validate_definition(&sdl, "items").unwrap_err();
        assert!(matches!(err, SchemaError::Arguments { ref field, .. } if field == "addItem"));
    }

    #[test]
    fn test_rejects_nullable_id() {
        let sdl = definition("items").replace("  id: ID!\n", "  id: ID\n");
        let err = validate_definition(&sdl, "items").unwrap_err();
        assert!(matches!(err, SchemaError::FieldType { ref field, .. } if field == "id"));
    }
}
