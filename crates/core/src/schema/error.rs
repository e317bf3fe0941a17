use thiserror::Error;

/// Errors found while checking a schema definition.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SchemaError {
    #[error("Schema does not parse: {0}")]
    Parse(String),

    #[error("Type '{0}' is not defined")]
    MissingType(String),

    #[error("Schema block is missing")]
    MissingSchemaBlock,

    #[error("Schema block maps {root} to '{found}', expected '{expected}'")]
    RootMismatch {
        root: &'static str,
        expected: String,
        found: String,
    },

    #[error("Missing field '{type_name}.{field}'")]
    MissingField { type_name: String, field: String },

    #[error("Unexpected field '{type_name}.{field}'")]
    UnexpectedField { type_name: String, field: String },

    #[error("Field '{type_name}.{field}' has type '{found}', expected '{expected}'")]
    FieldType {
        type_name: String,
        field: String,
        expected: String,
        found: String,
    },

    #[error("Arguments of '{type_name}.{field}' are ({found}), expected ({expected})")]
    Arguments {
        type_name: String,
        field: String,
        expected: String,
        found: String,
    },
}

/// Result type for schema checks.
pub type Result<T> = std::result::Result<T, SchemaError>;
