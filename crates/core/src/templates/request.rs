//! Typed form of a rendered request template.

use serde::Deserialize;

use super::attribute::AttributeMap;
use super::error::{Result, TemplateError};

/// Template versions the DynamoDB resolver accepts.
pub const SUPPORTED_VERSIONS: [&str; 2] = ["2017-02-28", "2018-05-29"];

/// A request for the DynamoDB data source.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "operation")]
pub enum DataSourceRequest {
    GetItem {
        version: String,
        key: AttributeMap,
    },
    PutItem {
        version: String,
        key: AttributeMap,
        #[serde(default, rename = "attributeValues")]
        attribute_values: AttributeMap,
    },
    DeleteItem {
        version: String,
        key: AttributeMap,
    },
}

impl DataSourceRequest {
    /// Parses rendered template text.
    pub fn parse(rendered: &str) -> Result<Self> {
        let request: DataSourceRequest = serde_json::from_str(rendered)
            .map_err(|e| TemplateError::InvalidRequest(e.to_string()))?;

        if !SUPPORTED_VERSIONS.iter().any(|v| *v == request.version()) {
            return Err(TemplateError::UnsupportedVersion(
                request.version().to_string(),
            ));
        }
        Ok(request)
    }

    pub fn version(&self) -> &str {
        match self {
            DataSourceRequest::GetItem { version, .. }
            | DataSourceRequest::PutItem { version, .. }
            | DataSourceRequest::DeleteItem { version, .. } => version,
        }
    }

    pub fn key(&self) -> &AttributeMap {
        match self {
            DataSourceRequest::GetItem { key, .. }
            | DataSourceRequest::PutItem { key, .. }
            | DataSourceRequest::DeleteItem { key, .. } => key,
        }
    }
}
