use thiserror::Error;

use crate::storage::{store_error_type, StoreError};
use crate::templates::TemplateError;

/// Errors raised while resolving a single field.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ResolveError {
    #[error("No resolver is attached to {type_name}.{field_name}")]
    NoResolver {
        type_name: String,
        field_name: String,
    },

    #[error(transparent)]
    Template(#[from] TemplateError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl ResolveError {
    /// Value for the `errorType` field of a GraphQL error.
    pub fn error_type(&self) -> &'static str {
        match self {
            ResolveError::NoResolver { .. } => "FieldUndefined",
            ResolveError::Template(_) => "MappingTemplate",
            ResolveError::Store(err) => store_error_type(err),
        }
    }
}

/// Result type for resolver operations.
pub type Result<T> = std::result::Result<T, ResolveError>;
