use thiserror::Error;

/// Errors raised while rendering or interpreting a mapping template.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TemplateError {
    #[error("Unknown template reference '${0}'")]
    UnknownReference(String),

    #[error("Malformed template expression at byte {position}: {message}")]
    Syntax { position: usize, message: String },

    #[error("Rendered request is not valid JSON: {0}")]
    InvalidRequest(String),

    #[error("Rendered response is not valid JSON: {0}")]
    InvalidResponse(String),

    #[error("Unsupported template version '{0}'")]
    UnsupportedVersion(String),

    #[error("Invalid number attribute '{0}'")]
    InvalidNumber(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Result type for template operations.
pub type Result<T> = std::result::Result<T, TemplateError>;
