//! Property values: literals and CloudFormation intrinsic functions.

use std::collections::BTreeSet;

use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_json::Value;

/// Pseudo parameter resolving to the deployment region.
pub const AWS_REGION: &str = "AWS::Region";

/// Pseudo parameter resolving to the partition (`aws`, `aws-cn`, ...).
pub const AWS_PARTITION: &str = "AWS::Partition";

/// A property value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expr {
    Literal(String),
    /// `{"Ref": id}` for a resource or a pseudo parameter.
    Ref(String),
    /// `{"Fn::GetAtt": [id, attribute]}`.
    GetAtt(String, String),
    /// `{"Fn::Join": [separator, [parts...]]}`.
    Join(String, Vec<Expr>),
}

impl Expr {
    pub fn literal(value: impl Into<String>) -> Self {
        Expr::Literal(value.into())
    }

    pub fn reference(logical_id: impl Into<String>) -> Self {
        Expr::Ref(logical_id.into())
    }

    pub fn get_att(logical_id: impl Into<String>, attribute: impl Into<String>) -> Self {
        Expr::GetAtt(logical_id.into(), attribute.into())
    }

    pub fn join(separator: impl Into<String>, parts: Vec<Expr>) -> Self {
        Expr::Join(separator.into(), parts)
    }
}

impl From<&str> for Expr {
    fn from(value: &str) -> Self {
        Expr::literal(value)
    }
}

impl Serialize for Expr {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Expr::Literal(s) => serializer.serialize_str(s),
            Expr::Ref(id) => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry("Ref", id)?;
                map.end()
            }
            Expr::GetAtt(id, attribute) => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry("Fn::GetAtt", &[id, attribute])?;
                map.end()
            }
            Expr::Join(separator, parts) => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry("Fn::Join", &(separator, parts))?;
                map.end()
            }
        }
    }
}

/// Collects the logical ids referenced anywhere inside serialized
/// properties. Pseudo parameters (`AWS::*`) are not resources and are
/// skipped.
pub fn collect_references(value: &Value, out: &mut BTreeSet<String>) {
    match value {
        Value::Object(map) => {
            if let (1, Some(Value::String(id))) = (map.len(), map.get("Ref")) {
                if !id.starts_with("AWS::") {
                    out.insert(id.clone());
                }
                return;
            }
            if let (1, Some(Value::Array(args))) = (map.len(), map.get("Fn::GetAtt")) {
                if let Some(Value::String(id)) = args.first() {
                    out.insert(id.clone());
                }
                return;
            }
            for nested in map.values() {
                collect_references(nested, out);
            }
        }
        Value::Array(items) => {
            for item in items {
                collect_references(item, out);
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_serialize_intrinsics() {
        assert_eq!(serde_json::to_value(Expr::literal("x")).unwrap(), json!("x"));
        assert_eq!(
            serde_json::to_value(Expr::reference("items")).unwrap(),
            json!({"Ref": "items"})
        );
        assert_eq!(
            serde_json::to_value(Expr::get_att("AppSyncAPI", "ApiId")).unwrap(),
            json!({"Fn::GetAtt": ["AppSyncAPI", "ApiId"]})
        );
        assert_eq!(
            serde_json::to_value(Expr::join(
                "",
                vec![Expr::literal("arn:"), Expr::reference(AWS_PARTITION)]
            ))
            .unwrap(),
            json!({"Fn::Join": ["", ["arn:", {"Ref": "AWS::Partition"}]]})
        );
    }

    #[test]
    fn test_collect_references_skips_pseudo_parameters() {
        let value = json!({
            "ApiId": {"Fn::GetAtt": ["AppSyncAPI", "ApiId"]},
            "DynamoDBConfig": {
                "TableName": {"Ref": "items"},
                "AwsRegion": {"Ref": "AWS::Region"}
            },
            "Arns": [{"Fn::Join": ["", [{"Ref": "AWS::Partition"}, {"Ref": "other"}]]}]
        });

        let mut refs = BTreeSet::new();
        collect_references(&value, &mut refs);

        let refs: Vec<&str> = refs.iter().map(String::as_str).collect();
        assert_eq!(refs, vec!["AppSyncAPI", "items", "other"]);
    }
}
