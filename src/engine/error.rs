//! Engine error taxonomy.
//!
//! Every variant renders as a short `<category>: <message>` diagnostic (the
//! grammar-level variants keep their historical wording) and ends up in the
//! `error` field of the JSON result. Nothing here reaches the HTTP layer as a
//! status code.

use std::fmt;

use crate::command::ParseError;
use crate::engine::value::ValueKind;

/// A failure raised by a native function while it was running.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fault {
    /// Short fault class, e.g. `ArithmeticException`.
    pub category: &'static str,
    pub message: String,
}

impl Fault {
    pub fn new(category: &'static str, message: impl Into<String>) -> Self {
        Self {
            category,
            message: message.into(),
        }
    }

    pub fn arithmetic(message: impl Into<String>) -> Self {
        Self::new("ArithmeticException", message)
    }

    pub fn number_format(input: &str) -> Self {
        Self::new("NumberFormatException", format!("For input string: \"{input}\""))
    }
}

impl fmt::Display for Fault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.category, self.message)
    }
}

/// Expected argument count, rendered as `1 argument` / `N arguments`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArgCount(pub usize);

impl fmt::Display for ArgCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0 == 1 {
            write!(f, "1 argument")
        } else {
            write!(f, "{} arguments", self.0)
        }
    }
}

/// Errors produced while executing a command.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EngineError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error("Unknown operation: {0}")]
    UnknownOperation(String),

    #[error("{operation} expects {expected}")]
    ArityMismatch {
        operation: &'static str,
        expected: ArgCount,
    },

    #[error("IllegalArgumentException: Unsupported type: {0}")]
    UnsupportedType(String),

    #[error("ValueCoercionFailure: cannot parse '{raw}' as {kind}")]
    ValueCoercion { kind: ValueKind, raw: String },

    #[error("TypeResolutionFailure: {0}")]
    TypeResolution(String),

    #[error("MethodResolutionFailure: {type_name}.{method}({params})")]
    MethodResolution {
        type_name: String,
        method: String,
        params: String,
    },

    #[error("NotStatic: only static methods allowed ({type_name}.{method})")]
    NotStatic { type_name: String, method: String },

    #[error("InvocationFault: {0}")]
    Invocation(Fault),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arity_message_pluralizes() {
        let one = EngineError::ArityMismatch {
            operation: "Class",
            expected: ArgCount(1),
        };
        assert_eq!(one.to_string(), "Class expects 1 argument");

        let six = EngineError::ArityMismatch {
            operation: "binaryInvoke",
            expected: ArgCount(6),
        };
        assert_eq!(six.to_string(), "binaryInvoke expects 6 arguments");
    }

    #[test]
    fn parse_errors_keep_their_wording() {
        let err: EngineError = ParseError::MalformedCommand.into();
        assert_eq!(err.to_string(), "Malformed command");
    }

    #[test]
    fn unsupported_type_carries_category() {
        let err = EngineError::UnsupportedType("float".into());
        assert_eq!(err.to_string(), "IllegalArgumentException: Unsupported type: float");
    }

    #[test]
    fn invocation_fault_carries_category() {
        let err = EngineError::Invocation(Fault::arithmetic("/ by zero"));
        assert_eq!(err.to_string(), "InvocationFault: ArithmeticException: / by zero");
    }
}
