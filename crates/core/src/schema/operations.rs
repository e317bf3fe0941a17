//! The three GraphQL operations and how each maps onto the table.

use std::fmt;

/// Root type an operation field lives on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RootType {
    Query,
    Mutation,
}

impl RootType {
    pub fn as_str(self) -> &'static str {
        match self {
            RootType::Query => "Query",
            RootType::Mutation => "Mutation",
        }
    }
}

impl fmt::Display for RootType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// DynamoDB operation a resolver issues.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TableOperation {
    GetItem,
    PutItem,
    DeleteItem,
}

impl TableOperation {
    pub fn as_str(self) -> &'static str {
        match self {
            TableOperation::GetItem => "GetItem",
            TableOperation::PutItem => "PutItem",
            TableOperation::DeleteItem => "DeleteItem",
        }
    }
}

/// Where the partition key value comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeySource {
    /// The caller passes the id as an argument.
    Argument(&'static str),
    /// A unique id is generated when the request template is rendered.
    Generated,
}

/// A single field argument (name and GraphQL type signature).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Argument {
    pub name: &'static str,
    pub type_signature: &'static str,
}

/// The operations exposed by the items API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    GetItem,
    AddItem,
    DeleteItem,
}

impl Operation {
    pub const ALL: [Operation; 3] = [Operation::GetItem, Operation::AddItem, Operation::DeleteItem];

    pub fn field_name(self) -> &'static str {
        match self {
            Operation::GetItem => "getItem",
            Operation::AddItem => "addItem",
            Operation::DeleteItem => "deleteItem",
        }
    }

    pub fn root_type(self) -> RootType {
        match self {
            Operation::GetItem => RootType::Query,
            Operation::AddItem | Operation::DeleteItem => RootType::Mutation,
        }
    }

    pub fn argument(self) -> Argument {
        match self {
            Operation::GetItem | Operation::DeleteItem => Argument {
                name: "id",
                type_signature: "ID!",
            },
            Operation::AddItem => Argument {
                name: "name",
                type_signature: "String!",
            },
        }
    }

    pub fn table_operation(self) -> TableOperation {
        match self {
            Operation::GetItem => TableOperation::GetItem,
            Operation::AddItem => TableOperation::PutItem,
            Operation::DeleteItem => TableOperation::DeleteItem,
        }
    }

    pub fn key_source(self) -> KeySource {
        match self {
            Operation::GetItem | Operation::DeleteItem => KeySource::Argument("id"),
            Operation::AddItem => KeySource::Generated,
        }
    }

    /// Arguments copied into non-key item attributes.
    pub fn copied_attributes(self) -> &'static [&'static str] {
        match self {
            Operation::AddItem => &["name"],
            Operation::GetItem | Operation::DeleteItem => &[],
        }
    }

    /// Logical id of the resolver resource attached to this field.
    pub fn resolver_logical_id(self) -> &'static str {
        match self {
            Operation::GetItem => "getItemResolver",
            Operation::AddItem => "addItemResolver",
            Operation::DeleteItem => "deleteItemResolver",
        }
    }

    /// Looks up the operation served by `root.field`.
    pub fn from_field(root: &str, field: &str) -> Option<Operation> {
        Operation::ALL
            .into_iter()
            .find(|op| op.root_type().as_str() == root && op.field_name() == field)
    }

    /// Operations that live on the given root type, in declaration order.
    pub fn on_root(root: RootType) -> impl Iterator<Item = Operation> {
        Operation::ALL
            .into_iter()
            .filter(move |op| op.root_type() == root)
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.root_type(), self.field_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_field_matches_root_and_name() {
        assert_eq!(
            Operation::from_field("Query", "getItem"),
            Some(Operation::GetItem)
        );
        assert_eq!(
            Operation::from_field("Mutation", "deleteItem"),
            Some(Operation::DeleteItem)
        );
        assert_eq!(Operation::from_field("Mutation", "getItem"), None);
        assert_eq!(Operation::from_field("Query", "listItems"), None);
    }

    #[test]
    fn test_only_add_item_generates_its_key() {
        for op in Operation::ALL {
            match op {
                Operation::AddItem => assert_eq!(op.key_source(), KeySource::Generated),
                _ => assert_eq!(op.key_source(), KeySource::Argument("id")),
            }
        }
    }

    #[test]
    fn test_on_root_keeps_declaration_order() {
        let mutations: Vec<_> = Operation::on_root(RootType::Mutation).collect();
        assert_eq!(mutations, vec![Operation::AddItem, Operation::DeleteItem]);
    }

    #[test]
    fn test_display() {
        assert_eq!(Operation::AddItem.to_string(), "Mutation.addItem");
    }
}
