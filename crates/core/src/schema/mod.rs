mod definition;
mod error;
mod operations;
mod validation;

pub use definition::{definition, ENTITY_FIELDS};
pub use error::{Result, SchemaError};
pub use operations::{Argument, KeySource, Operation, RootType, TableOperation};
pub use validation::{validate_definition, OperationSignature, SchemaSummary};
