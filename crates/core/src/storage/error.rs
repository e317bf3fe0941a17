use thiserror::Error;

/// Errors that can occur during item store operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("Table not found: {0}")]
    TableNotFound(String),
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),
    #[error("Throughput exceeded: {0}")]
    Throttled(String),
    #[error("Request failed: {0}")]
    RequestFailed(String),
    #[error("Invalid key: {0}")]
    InvalidKey(String),
}

/// Result type for item store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
