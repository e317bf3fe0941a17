//! Conversions between the core attribute encoding and the SDK's.

use std::collections::HashMap;

use aws_sdk_dynamodb::types::AttributeValue as SdkValue;
use itemstack_core::storage::{Result, StoreError};
use itemstack_core::templates::{AttributeMap, AttributeValue};

pub fn to_sdk_value(value: &AttributeValue) -> SdkValue {
    match value {
        AttributeValue::S(s) => SdkValue::S(s.clone()),
        AttributeValue::N(n) => SdkValue::N(n.clone()),
        AttributeValue::Bool(b) => SdkValue::Bool(*b),
        AttributeValue::Null(b) => SdkValue::Null(*b),
        AttributeValue::L(items) => SdkValue::L(items.iter().map(to_sdk_value).collect()),
        AttributeValue::M(fields) => SdkValue::M(to_sdk_item(fields)),
    }
}

pub fn to_sdk_item(map: &AttributeMap) -> HashMap<String, SdkValue> {
    map.iter()
        .map(|(k, v)| (k.clone(), to_sdk_value(v)))
        .collect()
}

/// Binary and set types never come out of the mapping templates, so they
/// are rejected rather than approximated.
pub fn from_sdk_value(value: &SdkValue) -> Result<AttributeValue> {
    Ok(match value {
        SdkValue::S(s) => AttributeValue::S(s.clone()),
        SdkValue::N(n) => AttributeValue::N(n.clone()),
        SdkValue::Bool(b) => AttributeValue::Bool(*b),
        SdkValue::Null(b) => AttributeValue::Null(*b),
        SdkValue::L(items) => AttributeValue::L(
            items
                .iter()
                .map(from_sdk_value)
                .collect::<Result<_>>()?,
        ),
        SdkValue::M(fields) => AttributeValue::M(from_sdk_item(fields)?),
        other => {
            return Err(StoreError::RequestFailed(format!(
                "unsupported attribute type: {other:?}"
            )))
        }
    })
}

pub fn from_sdk_item(item: &HashMap<String, SdkValue>) -> Result<AttributeMap> {
    item.iter()
        .map(|(k, v)| Ok((k.clone(), from_sdk_value(v)?)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_item_converts_both_ways() {
        let mut nested = AttributeMap::new();
        nested.insert("flag".to_string(), AttributeValue::Bool(true));

        let mut item = AttributeMap::new();
        item.insert("id".to_string(), AttributeValue::S("1".to_string()));
        item.insert("count".to_string(), AttributeValue::N("3".to_string()));
        item.insert(
            "tags".to_string(),
            AttributeValue::L(vec![AttributeValue::Null(true)]),
        );
        item.insert("meta".to_string(), AttributeValue::M(nested));

        let sdk = to_sdk_item(&item);
        assert_eq!(sdk["id"], SdkValue::S("1".to_string()));
        assert_eq!(from_sdk_item(&sdk).unwrap(), item);
    }

    #[test]
    fn test_string_sets_are_rejected() {
        let value = SdkValue::Ss(vec!["a".to_string()]);
        assert!(matches!(
            from_sdk_value(&value),
            Err(StoreError::RequestFailed(_))
        ));
    }
}
