//! SDL text for the schema attachment (Functional Core - pure data).

use super::operations::{Operation, RootType};

/// Fields of the entity type as `(name, type signature)`.
pub const ENTITY_FIELDS: [(&str, &str); 2] = [("id", "ID!"), ("name", "String")];

/// Returns the schema definition for the entity type `type_name`.
///
/// Pure and deterministic: the operation fields are derived from
/// [`Operation::ALL`], so the resolvers and the SDL can never disagree.
pub fn definition(type_name: &str) -> String {
    let entity_fields: Vec<String> = ENTITY_FIELDS
        .iter()
        .map(|(name, signature)| format!("  {name}: {signature}"))
        .collect();
    let mut blocks = vec![format!(
        "type {type_name} {{\n{}\n}}",
        entity_fields.join("\n")
    )];

    for root in [RootType::Query, RootType::Mutation] {
        let fields: Vec<String> = Operation::on_root(root)
            .map(|op| {
                let arg = op.argument();
                format!(
                    "  {}({}: {}): {}",
                    op.field_name(),
                    arg.name,
                    arg.type_signature,
                    type_name
                )
            })
            .collect();
        blocks.push(format!("type {} {{\n{}\n}}", root, fields.join("\n")));
    }

    blocks.push(format!(
        "schema {{\n  query: {}\n  mutation: {}\n}}",
        RootType::Query,
        RootType::Mutation
    ));

    let mut sdl = blocks.join("\n\n");
    sdl.push('\n');
    sdl
}
