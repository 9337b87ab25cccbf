//! Execution outcome and its JSON form.
//!
//! The encoder replaces embedded double quotes with single quotes in every
//! string it emits, matching what clients of the wire format already expect.

use serde::Serialize;

use crate::engine::catalog::{FieldDef, MethodDef, TypeDef};
use crate::engine::error::EngineError;
use crate::engine::value::Value;

/// Replace embedded double quotes with single quotes.
pub fn sanitize(text: &str) -> String {
    text.replace('"', "'")
}

/// Introspection result for `Class(...)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClassDescription {
    #[serde(rename = "class")]
    pub class_name: String,
    pub fields: Vec<String>,
    pub methods: Vec<String>,
}

impl ClassDescription {
    pub fn describe(ty: &TypeDef, fields: &[FieldDef], methods: &[MethodDef]) -> Self {
        Self {
            class_name: sanitize(ty.name),
            fields: fields.iter().map(|f| sanitize(&f.to_string())).collect(),
            methods: methods.iter().map(|m| sanitize(&m.to_string())).collect(),
        }
    }
}

/// Payload of a successful execution.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Payload {
    Value(Value),
    Class(ClassDescription),
}

impl From<Value> for Payload {
    fn from(value: Value) -> Self {
        match value {
            Value::Text(text) => Payload::Value(Value::Text(sanitize(&text))),
            other => Payload::Value(other),
        }
    }
}

impl From<ClassDescription> for Payload {
    fn from(description: ClassDescription) -> Self {
        Payload::Class(description)
    }
}

/// Outcome of running one command: `{"value": ...}` or `{"error": "..."}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum ExecutionResult {
    #[serde(rename = "value")]
    Success(Payload),
    #[serde(rename = "error")]
    Failure(String),
}

impl ExecutionResult {
    pub fn success(payload: impl Into<Payload>) -> Self {
        ExecutionResult::Success(payload.into())
    }

    pub fn failure(message: &str) -> Self {
        ExecutionResult::Failure(sanitize(message))
    }

    pub fn is_success(&self) -> bool {
        matches!(self, ExecutionResult::Success(_))
    }

    /// Compact JSON rendering.
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|e| {
            tracing::error!(error = %e, "Failed to encode execution result");
            format!("{{\"error\":\"{}\"}}", sanitize(&e.to_string()))
        })
    }
}

impl From<EngineError> for ExecutionResult {
    fn from(err: EngineError) -> Self {
        ExecutionResult::failure(&err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_wraps_value() {
        assert_eq!(ExecutionResult::success(Value::Int(3)).to_json(), r#"{"value":3}"#);
        assert_eq!(ExecutionResult::success(Value::Null).to_json(), r#"{"value":null}"#);
        assert_eq!(ExecutionResult::success(Value::Bool(false)).to_json(), r#"{"value":false}"#);
    }

    #[test]
    fn text_quotes_are_replaced() {
        let json = ExecutionResult::success(Value::Text(r#"say "hi""#.into())).to_json();
        assert_eq!(json, r#"{"value":"say 'hi'"}"#);

        let json = ExecutionResult::failure(r#"For input string: "abc""#).to_json();
        assert_eq!(json, r#"{"error":"For input string: 'abc'"}"#);
    }

    #[test]
    fn class_description_shape() {
        let description = ClassDescription {
            class_name: "demo.T".into(),
            fields: vec!["int x".into()],
            methods: vec!["int f(int)".into()],
        };
        let json = ExecutionResult::success(description).to_json();
        assert_eq!(
            json,
            r#"{"value":{"class":"demo.T","fields":["int x"],"methods":["int f(int)"]}}"#
        );
    }

    #[test]
    fn engine_errors_convert_to_failures() {
        let result: ExecutionResult = EngineError::UnknownOperation("nope".into()).into();
        assert!(!result.is_success());
        assert_eq!(result.to_json(), r#"{"error":"Unknown operation: nope"}"#);
    }
}
