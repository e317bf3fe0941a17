//! Request and response mapping templates for the items resolvers.

use crate::schema::{KeySource, Operation, TableOperation};

/// Template language version the request templates declare.
pub const TEMPLATE_VERSION: &str = "2017-02-28";

/// Response template shared by every resolver: the raw table result is
/// returned as-is.
pub const RESPONSE_PASSTHROUGH: &str = "$util.toJson($ctx.result)";

/// Name of the partition key attribute.
pub const KEY_ATTRIBUTE: &str = "id";

/// Description of a request mapping template for one operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestMapping {
    pub operation: TableOperation,
    pub key: KeySource,
    /// Non-key attributes, each copied from the argument of the same name.
    pub attribute_values: Vec<&'static str>,
}

impl RequestMapping {
    pub fn for_operation(op: Operation) -> Self {
        Self {
            operation: op.table_operation(),
            key: op.key_source(),
            attribute_values: op.copied_attributes().to_vec(),
        }
    }

    /// Whether the template reads `$ctx.args.<name>`.
    pub fn references_argument(&self, name: &str) -> bool {
        matches!(self.key, KeySource::Argument(arg) if arg == name)
            || self.attribute_values.iter().any(|attr| *attr == name)
    }

    /// Renders the template text.
    pub fn render(&self) -> String {
        let key_value = match self.key {
            KeySource::Argument(arg) => to_dynamodb_json(arg),
            KeySource::Generated => r#"{ "S": "$util.autoId()" }"#.to_string(),
        };

        let mut lines = vec![
            "{".to_string(),
            format!(r#"  "version": "{TEMPLATE_VERSION}","#),
            format!(r#"  "operation": "{}","#, self.operation.as_str()),
            r#"  "key": {"#.to_string(),
            format!(r#"    "{KEY_ATTRIBUTE}": {key_value}"#),
        ];

        if self.attribute_values.is_empty() {
            lines.push("  }".to_string());
        } else {
            lines.push("  },".to_string());
            lines.push(r#"  "attributeValues": {"#.to_string());
            let values: Vec<String> = self
                .attribute_values
                .iter()
                .map(|attr| format!(r#"    "{attr}": {}"#, to_dynamodb_json(attr)))
                .collect();
            lines.push(values.join(",\n"));
            lines.push("  }".to_string());
        }

        lines.push("}".to_string());
        lines.join("\n")
    }
}

/// Request template text for `op`.
pub fn request_template(op: Operation) -> String {
    RequestMapping::for_operation(op).render()
}

/// Response template text for `op`.
pub fn response_template(_op: Operation) -> &'static str {
    RESPONSE_PASSTHROUGH
}

fn to_dynamodb_json(arg: &str) -> String {
    format!("$util.dynamodb.toDynamoDBJson($ctx.args.{arg})")
}
