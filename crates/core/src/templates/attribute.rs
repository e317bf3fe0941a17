//! DynamoDB attribute-value encoding.
//!
//! Pure functions for converting between plain JSON values and the typed
//! `{"S": "..."}` encoding used by the table's native protocol.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};

use super::error::{Result, TemplateError};

/// A map of attribute names to typed values (a key or a whole item).
pub type AttributeMap = BTreeMap<String, AttributeValue>;

/// A single typed attribute value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AttributeValue {
    S(String),
    N(String),
    #[serde(rename = "BOOL")]
    Bool(bool),
    #[serde(rename = "NULL")]
    Null(bool),
    L(Vec<AttributeValue>),
    M(AttributeMap),
}

impl AttributeValue {
    /// Returns the string payload of an `S` value.
    pub fn as_s(&self) -> Option<&str> {
        match self {
            AttributeValue::S(s) => Some(s),
            _ => None,
        }
    }

    /// Encodes a plain JSON value.
    pub fn from_json(value: &Value) -> AttributeValue {
        match value {
            Value::Null => AttributeValue::Null(true),
            Value::Bool(b) => AttributeValue::Bool(*b),
            Value::Number(n) => AttributeValue::N(n.to_string()),
            Value::String(s) => AttributeValue::S(s.clone()),
            Value::Array(items) => {
                AttributeValue::L(items.iter().map(AttributeValue::from_json).collect())
            }
            Value::Object(fields) => AttributeValue::M(
                fields
                    .iter()
                    .map(|(k, v)| (k.clone(), AttributeValue::from_json(v)))
                    .collect(),
            ),
        }
    }

    /// Decodes into a plain JSON value.
    pub fn to_json(&self) -> Result<Value> {
        Ok(match self {
            AttributeValue::S(s) => Value::String(s.clone()),
            AttributeValue::N(n) => Value::Number(parse_number(n)?),
            AttributeValue::Bool(b) => Value::Bool(*b),
            AttributeValue::Null(_) => Value::Null,
            AttributeValue::L(items) => Value::Array(
                items
                    .iter()
                    .map(AttributeValue::to_json)
                    .collect::<Result<_>>()?,
            ),
            AttributeValue::M(fields) => Value::Object(map_to_json(fields)?),
        })
    }
}

/// Decodes a whole item into a plain JSON object.
pub fn map_to_json(map: &AttributeMap) -> Result<Map<String, Value>> {
    map.iter()
        .map(|(k, v)| Ok((k.clone(), v.to_json()?)))
        .collect()
}

fn parse_number(n: &str) -> Result<Number> {
    serde_json::from_str::<Number>(n).map_err(|_| TemplateError::InvalidNumber(n.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_serializes_with_type_tags() {
        let value = AttributeValue::S("widget".to_string());
        assert_eq!(serde_json::to_value(&value).unwrap(), json!({"S": "widget"}));

        let value = AttributeValue::Null(true);
        assert_eq!(serde_json::to_value(&value).unwrap(), json!({"NULL": true}));

        let value = AttributeValue::Bool(false);
        assert_eq!(serde_json::to_value(&value).unwrap(), json!({"BOOL": false}));
    }

    #[test]
    fn test_from_json_nested() {
        let encoded = AttributeValue::from_json(&json!({"tags": ["a", 1], "ok": true}));
        assert_eq!(
            serde_json::to_value(&encoded).unwrap(),
            json!({"M": {"ok": {"BOOL": true}, "tags": {"L": [{"S": "a"}, {"N": "1"}]}}})
        );
    }

    #[test]
    fn test_to_json_decodes_numbers() {
        let value = AttributeValue::N("12.5".to_string());
        assert_eq!(value.to_json().unwrap(), json!(12.5));
    }

    #[test]
    fn test_to_json_rejects_bad_number() {
        let value = AttributeValue::N("twelve".to_string());
        assert_eq!(
            value.to_json().unwrap_err(),
            TemplateError::InvalidNumber("twelve".to_string())
        );
    }

    #[test]
    fn test_map_to_json() {
        let mut item = AttributeMap::new();
        item.insert("id".to_string(), AttributeValue::S("1".to_string()));
        item.insert("name".to_string(), AttributeValue::S("widget".to_string()));

        let json = map_to_json(&item).unwrap();
        assert_eq!(Value::Object(json), json!({"id": "1", "name": "widget"}));
    }
}
