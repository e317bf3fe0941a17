use thiserror::Error;

use crate::schema::SchemaError;

/// Errors in the resource dependency graph.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GraphError {
    #[error("Resource '{0}' is declared more than once")]
    DuplicateResource(String),

    #[error("Resource '{0}' is not declared")]
    UnknownResource(String),

    #[error("'{from}' references undeclared resource '{to}'")]
    DanglingReference { from: String, to: String },

    #[error("Dependency cycle between: {}", .0.join(", "))]
    Cycle(Vec<String>),
}

/// Errors raised while assembling or emitting the stack.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StackError {
    #[error(transparent)]
    Graph(#[from] GraphError),

    #[error("Invalid schema definition: {0}")]
    Schema(#[from] SchemaError),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Result type for stack operations.
pub type Result<T> = std::result::Result<T, StackError>;
