use std::{env, time::Duration};

use itemstack_core::TABLE_NAME;

/// Emulator configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Per-request timeout in seconds (default: 10)
    pub request_timeout_seconds: u64,
    /// Table the DynamoDB store talks to (default: "items").
    /// Note: Only used when the `dynamodb` feature is enabled.
    #[allow(dead_code)]
    pub dynamodb_table_name: String,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Environment variables:
    /// - `REQUEST_TIMEOUT_SECONDS` - Per-request timeout in seconds (default: 10)
    /// - `DYNAMODB_TABLE_NAME` - DynamoDB table name (default: "items")
    pub fn from_env() -> Self {
        Self {
            request_timeout_seconds: env::var("REQUEST_TIMEOUT_SECONDS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(10),
            dynamodb_table_name: env::var("DYNAMODB_TABLE_NAME")
                .unwrap_or_else(|_| TABLE_NAME.to_string()),
        }
    }

    /// Get the request timeout as a Duration.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_seconds)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_timeout_conversion() {
        let config = Config {
            request_timeout_seconds: 30,
            dynamodb_table_name: "items".to_string(),
        };

        assert_eq!(config.request_timeout(), Duration::from_secs(30));
    }

    #[test]
    fn test_default_values() {
        env::remove_var("REQUEST_TIMEOUT_SECONDS");
        env::remove_var("DYNAMODB_TABLE_NAME");

        let config = Config::from_env();

        assert_eq!(config.request_timeout_seconds, 10);
        assert_eq!(config.dynamodb_table_name, "items");
    }
}
