//! Evaluator for the mapping-template subset the items resolvers use.
//!
//! Supported references:
//! - `$ctx.args.<name>` / `$context.arguments.<name>` (nested paths allowed)
//! - `$ctx.result` / `$context.result`
//! - `$util.dynamodb.toDynamoDBJson(<expr>)`
//! - `$util.autoId()`
//! - `$util.toJson(<expr>)`
//!
//! Anything else starting with `$<letter>` is an error; a `$` followed by
//! anything else is copied through.

use serde_json::{Map, Value};

use super::attribute::AttributeValue;
use super::error::{Result, TemplateError};
use super::ids::IdGenerator;

/// Values a template can read.
#[derive(Debug, Clone, Default)]
pub struct TemplateContext {
    pub arguments: Map<String, Value>,
    pub result: Value,
}

impl TemplateContext {
    pub fn with_arguments(arguments: Map<String, Value>) -> Self {
        Self {
            arguments,
            result: Value::Null,
        }
    }

    pub fn with_result(mut self, result: Value) -> Self {
        self.result = result;
        self
    }
}

/// Renders `template` against `context`.
pub fn render(template: &str, context: &TemplateContext, ids: &dyn IdGenerator) -> Result<String> {
    Renderer {
        src: template,
        pos: 0,
        context,
        ids,
    }
    .run()
}

struct Renderer<'a> {
    src: &'a str,
    pos: usize,
    context: &'a TemplateContext,
    ids: &'a dyn IdGenerator,
}

impl Renderer<'_> {
    fn run(mut self) -> Result<String> {
        let mut out = String::with_capacity(self.src.len());
        while let Some(c) = self.peek() {
            if c == '$' && self.starts_reference() {
                match self.expression()? {
                    Value::String(s) => out.push_str(&s),
                    other => out.push_str(&other.to_string()),
                }
            } else {
                out.push(c);
                self.pos += c.len_utf8();
            }
        }
        Ok(out)
    }

    fn peek(&self) -> Option<char> {
        self.src[self.pos..].chars().next()
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.src[self.pos..].chars().nth(offset)
    }

    fn starts_reference(&self) -> bool {
        self.peek_at(1).is_some_and(|c| c.is_ascii_alphabetic())
    }

    fn syntax(&self, message: impl Into<String>) -> TemplateError {
        TemplateError::Syntax {
            position: self.pos,
            message: message.into(),
        }
    }

    fn expect(&mut self, expected: char) -> Result<()> {
        match self.peek() {
            Some(c) if c == expected => {
                self.pos += c.len_utf8();
                Ok(())
            }
            Some(c) => Err(self.syntax(format!("expected '{expected}', found '{c}'"))),
            None => Err(self.syntax(format!("expected '{expected}', found end of template"))),
        }
    }

    fn skip_whitespace(&mut self) {
        while let Some(c) = self.peek().filter(|c| c.is_whitespace()) {
            self.pos += c.len_utf8();
        }
    }

    fn identifier(&mut self) -> &str {
        let start = self.pos;
        while let Some(c) = self
            .peek()
            .filter(|c| c.is_ascii_alphanumeric() || *c == '_')
        {
            self.pos += c.len_utf8();
        }
        &self.src[start..self.pos]
    }

    /// `ident ('.' ident)*`; a trailing dot not followed by a letter is left
    /// in the text.
    fn path(&mut self) -> Vec<String> {
        let mut segments = vec![self.identifier().to_string()];
        while self.peek() == Some('.') && self.peek_at(1).is_some_and(|c| c.is_ascii_alphabetic())
        {
            self.pos += 1;
            segments.push(self.identifier().to_string());
        }
        segments
    }

    fn expression(&mut self) -> Result<Value> {
        self.skip_whitespace();
        match self.peek() {
            Some('"') | Some('\'') => return self.string_literal(),
            Some('$') => {}
            _ => return Err(self.syntax("expected a reference or string literal")),
        }

        self.expect('$')?;
        let path = self.path();

        if self.peek() != Some('(') {
            return self.lookup(&path);
        }

        self.expect('(')?;
        self.skip_whitespace();
        let argument = if self.peek() == Some(')') {
            None
        } else {
            Some(self.expression()?)
        };
        self.skip_whitespace();
        self.expect(')')?;
        self.call(&path, argument)
    }

    fn string_literal(&mut self) -> Result<Value> {
        let quote = self.peek().unwrap_or('"');
        self.pos += 1;
        let start = self.pos;
        while let Some(c) = self.peek() {
            if c == quote {
                let literal = self.src[start..self.pos].to_string();
                self.pos += 1;
                return Ok(Value::String(literal));
            }
            self.pos += c.len_utf8();
        }
        Err(self.syntax("unterminated string literal"))
    }

    fn lookup(&self, path: &[String]) -> Result<Value> {
        let segments: Vec<&str> = path.iter().map(String::as_str).collect();
        match segments.as_slice() {
            ["ctx" | "context", "args" | "arguments", rest @ ..] => {
                let root = Value::Object(self.context.arguments.clone());
                Ok(descend(&root, rest))
            }
            ["ctx" | "context", "result", rest @ ..] => Ok(descend(&self.context.result, rest)),
            _ => Err(TemplateError::UnknownReference(path.join("."))),
        }
    }

    fn call(&self, path: &[String], argument: Option<Value>) -> Result<Value> {
        let name = path.join(".");
        match (name.as_str(), argument) {
            ("util.autoId", None) => Ok(Value::String(self.ids.next_id())),
            ("util.dynamodb.toDynamoDBJson", Some(value)) => {
                let encoded = AttributeValue::from_json(&value);
                serde_json::to_string(&encoded)
                    .map(Value::String)
                    .map_err(|e| TemplateError::Serialization(e.to_string()))
            }
            ("util.toJson", Some(value)) => serde_json::to_string(&value)
                .map(Value::String)
                .map_err(|e| TemplateError::Serialization(e.to_string())),
            ("util.autoId", Some(_)) => Err(self.syntax("$util.autoId takes no argument")),
            ("util.dynamodb.toDynamoDBJson" | "util.toJson", None) => {
                Err(self.syntax(format!("${name} requires an argument")))
            }
            _ => Err(TemplateError::UnknownReference(name)),
        }
    }
}

fn descend(root: &Value, path: &[&str]) -> Value {
    path.iter()
        .try_fold(root, |value, key| value.get(*key))
        .cloned()
        .unwrap_or(Value::Null)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::templates::ids::SequentialIds;
    use serde_json::json;

    fn context(args: Value) -> TemplateContext {
        match args {
            Value::Object(map) => TemplateContext::with_arguments(map),
            _ => TemplateContext::default(),
        }
    }

    #[test]
    fn test_to_dynamodb_json_on_argument() {
        let ids = SequentialIds::new("id");
        let out = render(
            r#"{"id": $util.dynamodb.toDynamoDBJson($ctx.args.id)}"#,
            &context(json!({"id": "abc"})),
            &ids,
        )
        .unwrap();
        assert_eq!(out, r#"{"id": {"S":"abc"}}"#);
    }

    #[test]
    fn test_auto_id_inside_quotes() {
        let ids = SequentialIds::new("item");
        let out = render(
            r#"{ "S": "$util.autoId()" }"#,
            &TemplateContext::default(),
            &ids,
        )
        .unwrap();
        assert_eq!(out, r#"{ "S": "item-1" }"#);
    }

    #[test]
    fn test_to_json_result_passthrough() {
        let ids = SequentialIds::new("id");
        let ctx = TemplateContext::default().with_result(json!({"id": "1", "name": "widget"}));
        let out = render("$util.toJson($ctx.result)", &ctx, &ids).unwrap();
        assert_eq!(
            serde_json::from_str::<Value>(&out).unwrap(),
            json!({"id": "1", "name": "widget"})
        );
    }

    #[test]
    fn test_null_result_renders_null() {
        let ids = SequentialIds::new("id");
        let out = render("$util.toJson($ctx.result)", &TemplateContext::default(), &ids).unwrap();
        assert_eq!(out, "null");
    }

    #[test]
    fn test_long_form_context_and_nested_path() {
        let ids = SequentialIds::new("id");
        let out = render(
            "$context.arguments.input.name",
            &context(json!({"input": {"name": "widget"}})),
            &ids,
        )
        .unwrap();
        assert_eq!(out, "widget");
    }

    #[test]
    fn test_missing_argument_encodes_as_null() {
        let ids = SequentialIds::new("id");
        let out = render(
            "$util.dynamodb.toDynamoDBJson($ctx.args.missing)",
            &TemplateContext::default(),
            &ids,
        )
        .unwrap();
        assert_eq!(out, r#"{"NULL":true}"#);
    }

    #[test]
    fn test_dollar_without_reference_is_literal() {
        let ids = SequentialIds::new("id");
        let out = render("costs $5 or $ more", &TemplateContext::default(), &ids).unwrap();
        assert_eq!(out, "costs $5 or $ more");
    }

    #[test]
    fn test_unknown_reference() {
        let ids = SequentialIds::new("id");
        let err = render("$util.time.nowISO8601()", &TemplateContext::default(), &ids).unwrap_err();
        assert_eq!(
            err,
            TemplateError::UnknownReference("util.time.nowISO8601".to_string())
        );
    }

    #[test]
    fn test_unclosed_call() {
        let ids = SequentialIds::new("id");
        let err = render("$util.toJson($ctx.result", &TemplateContext::default(), &ids).unwrap_err();
        assert!(matches!(err, TemplateError::Syntax { .. }));
    }

    #[test]
    fn test_string_literal_argument() {
        let ids = SequentialIds::new("id");
        let out = render(
            "$util.dynamodb.toDynamoDBJson(\"fixed\")",
            &TemplateContext::default(),
            &ids,
        )
        .unwrap();
        assert_eq!(out, r#"{"S":"fixed"}"#);
    }
}
