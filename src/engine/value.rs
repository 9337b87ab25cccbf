//! Argument kinds, coerced arguments and invocation results.

use std::fmt;

use serde::Serialize;

use crate::engine::error::EngineError;

/// The three parameter kinds a command may declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    Int,
    Double,
    Text,
}

impl ValueKind {
    /// Map a command type token (`int`, `double`, `string`, any case).
    pub fn from_token(token: &str) -> Result<Self, EngineError> {
        match token.trim().to_ascii_lowercase().as_str() {
            "int" => Ok(ValueKind::Int),
            "double" => Ok(ValueKind::Double),
            "string" => Ok(ValueKind::Text),
            _ => Err(EngineError::UnsupportedType(token.trim().to_string())),
        }
    }

    /// The declared parameter type a value of this kind binds to.
    pub fn param_type(self) -> TypeRef {
        match self {
            ValueKind::Int => TypeRef::Int,
            ValueKind::Double => TypeRef::Double,
            ValueKind::Text => TypeRef::String,
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueKind::Int => write!(f, "int"),
            ValueKind::Double => write!(f, "double"),
            ValueKind::Text => write!(f, "string"),
        }
    }
}

/// An argument whose kind is known but whose text has not been coerced yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypedValue {
    pub kind: ValueKind,
    pub raw: String,
}

impl TypedValue {
    /// Pair a type token with its raw value, rejecting unsupported tokens.
    pub fn new(type_token: &str, raw: &str) -> Result<Self, EngineError> {
        Ok(Self {
            kind: ValueKind::from_token(type_token)?,
            raw: raw.to_string(),
        })
    }

    /// Coerce the raw text into a concrete argument.
    pub fn coerce(&self) -> Result<Argument, EngineError> {
        let coercion_failure = || EngineError::ValueCoercion {
            kind: self.kind,
            raw: self.raw.clone(),
        };
        match self.kind {
            ValueKind::Int => self
                .raw
                .trim()
                .parse::<i32>()
                .map(Argument::Int)
                .map_err(|_| coercion_failure()),
            ValueKind::Double => parse_double(&self.raw)
                .map(Argument::Double)
                .ok_or_else(coercion_failure),
            ValueKind::Text => Ok(Argument::Text(unquote(&self.raw).to_string())),
        }
    }
}

/// Parse a decimal double the way `Double.parseDouble` does.
///
/// Accepts an optional sign, the literals `NaN` and `Infinity` (exact case),
/// decimal and exponent forms, and one trailing `f`/`F`/`d`/`D`. Rejects the
/// `inf`/`nan` spellings Rust's own parser allows.
pub fn parse_double(text: &str) -> Option<f64> {
    let trimmed = text.trim();
    let (negative, body) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };

    let magnitude = match body {
        "NaN" => f64::NAN,
        "Infinity" => f64::INFINITY,
        _ => {
            let digits = body
                .strip_suffix(|c: char| matches!(c, 'f' | 'F' | 'd' | 'D'))
                .unwrap_or(body);
            let well_formed = digits.bytes().any(|b| b.is_ascii_digit())
                && digits
                    .bytes()
                    .all(|b| b.is_ascii_digit() || matches!(b, b'.' | b'e' | b'E' | b'+' | b'-'));
            if !well_formed {
                return None;
            }
            digits.parse::<f64>().ok()?
        }
    };

    Some(if negative { -magnitude } else { magnitude })
}

/// Strip one pair of matching surrounding quotes, if present.
pub fn unquote(raw: &str) -> &str {
    let t = raw.trim();
    let quoted = t.len() >= 2
        && ((t.starts_with('"') && t.ends_with('"')) || (t.starts_with('\'') && t.ends_with('\'')));
    if quoted {
        &t[1..t.len() - 1]
    } else {
        t
    }
}

/// A coerced argument ready to be passed to a native function.
#[derive(Debug, Clone, PartialEq)]
pub enum Argument {
    Int(i32),
    Double(f64),
    Text(String),
}

impl Argument {
    pub fn kind(&self) -> ValueKind {
        match self {
            Argument::Int(_) => ValueKind::Int,
            Argument::Double(_) => ValueKind::Double,
            Argument::Text(_) => ValueKind::Text,
        }
    }
}

/// A declared type as it appears in field and method signatures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeRef {
    Void,
    Boolean,
    Int,
    Long,
    Double,
    String,
    /// Any other declared type, rendered by its fully qualified name.
    Named(&'static str),
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TypeRef::Void => "void",
            TypeRef::Boolean => "boolean",
            TypeRef::Int => "int",
            TypeRef::Long => "long",
            TypeRef::Double => "double",
            TypeRef::String => "java.lang.String",
            TypeRef::Named(name) => name,
        };
        f.write_str(name)
    }
}

/// The value returned by an invoked method.
///
/// Serializes untagged: numbers and booleans as JSON literals, `Null` as
/// `null`, text as a JSON string.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i32),
    Long(i64),
    Double(f64),
    Text(String),
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Long(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Double(v)
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl From<Option<String>> for Value {
    fn from(v: Option<String>) -> Self {
        v.map_or(Value::Null, Value::Text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn type_tokens_are_case_insensitive() {
        assert_eq!(ValueKind::from_token("INT").unwrap(), ValueKind::Int);
        assert_eq!(ValueKind::from_token(" Double ").unwrap(), ValueKind::Double);
        assert_eq!(ValueKind::from_token("String").unwrap(), ValueKind::Text);
        assert!(matches!(
            ValueKind::from_token("float"),
            Err(EngineError::UnsupportedType(t)) if t == "float"
        ));
    }

    #[test]
    fn coerces_numbers_and_strips_quotes() {
        let int = TypedValue::new("int", " -3 ").unwrap().coerce().unwrap();
        assert_eq!(int, Argument::Int(-3));

        let double = TypedValue::new("double", "2.5e1").unwrap().coerce().unwrap();
        assert_eq!(double, Argument::Double(25.0));

        let text = TypedValue::new("string", "'hello, world'").unwrap().coerce().unwrap();
        assert_eq!(text, Argument::Text("hello, world".into()));

        let bare = TypedValue::new("string", "plain").unwrap().coerce().unwrap();
        assert_eq!(bare, Argument::Text("plain".into()));
    }

    #[test]
    fn non_numeric_int_is_a_coercion_failure() {
        let err = TypedValue::new("int", "\"abc\"").unwrap().coerce().unwrap_err();
        assert!(matches!(err, EngineError::ValueCoercion { kind: ValueKind::Int, .. }));
    }

    #[test]
    fn double_coercion_follows_parse_double_rules() {
        for (raw, expected) in [("1.5", 1.5), ("-2e3", -2000.0), (".5", 0.5), ("7d", 7.0), ("+3F", 3.0)] {
            assert_eq!(
                TypedValue::new("double", raw).unwrap().coerce().unwrap(),
                Argument::Double(expected),
                "{raw}"
            );
        }
        assert_eq!(parse_double("-Infinity"), Some(f64::NEG_INFINITY));
        assert!(parse_double("NaN").is_some_and(f64::is_nan));

        for raw in ["inf", "infinity", "INF", "nan", "NAN", "-inf", "Infinityd", "", "-", "e5", "1.5x"] {
            let err = TypedValue::new("double", raw).unwrap().coerce().unwrap_err();
            assert!(
                matches!(err, EngineError::ValueCoercion { kind: ValueKind::Double, .. }),
                "{raw} should be rejected"
            );
        }
    }

    #[test]
    fn lone_quote_is_not_stripped() {
        assert_eq!(unquote("\""), "\"");
        assert_eq!(unquote("\"\""), "");
        assert_eq!(unquote("'mixed\""), "'mixed\"");
    }

    #[test]
    fn values_serialize_as_json_literals() {
        assert_eq!(serde_json::to_string(&Value::Int(3)).unwrap(), "3");
        assert_eq!(serde_json::to_string(&Value::Double(1.5)).unwrap(), "1.5");
        assert_eq!(serde_json::to_string(&Value::Bool(true)).unwrap(), "true");
        assert_eq!(serde_json::to_string(&Value::Null).unwrap(), "null");
        assert_eq!(serde_json::to_string(&Value::Text("x".into())).unwrap(), "\"x\"");
    }
}
