//! Command string parsing.
//!
//! # Responsibilities
//! - Reject empty and structurally malformed commands
//! - Extract the operation name preceding `(`
//! - Split the parenthesised interior on commas outside quoted spans
//!
//! # Design Decisions
//! - The first `(` and the last `)` delimit the argument list; anything after
//!   the closing parenthesis is ignored
//! - A quote preceded by a backslash never toggles the quoting state
//! - A trailing empty remainder is dropped, other empty tokens are kept

/// Errors produced while parsing a command string.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    /// The command was empty after trimming.
    #[error("Empty command")]
    EmptyCommand,
    /// Parentheses missing or out of order.
    #[error("Malformed command")]
    MalformedCommand,
}

/// A parsed command: an operation name and its raw arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    /// Operation name as written (case-sensitive).
    pub operation: String,
    /// Trimmed arguments in left-to-right order, quotes preserved.
    pub arguments: Vec<String>,
}

impl Command {
    /// Number of arguments.
    pub fn arity(&self) -> usize {
        self.arguments.len()
    }
}

/// Parse a raw command string of the form `Operation(arg1, arg2, ...)`.
pub fn parse(raw: &str) -> Result<Command, ParseError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ParseError::EmptyCommand);
    }

    let open = trimmed.find('(').ok_or(ParseError::MalformedCommand)?;
    let close = trimmed.rfind(')').ok_or(ParseError::MalformedCommand)?;
    if close < open {
        return Err(ParseError::MalformedCommand);
    }

    let operation = trimmed[..open].trim().to_string();
    let inside = &trimmed[open + 1..close];

    Ok(Command {
        operation,
        arguments: split_arguments(inside),
    })
}

/// Split an argument list on commas that are not inside a quoted span.
pub fn split_arguments(inside: &str) -> Vec<String> {
    let mut out = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut quote_char = '\0';
    let mut previous: Option<char> = None;

    for c in inside.chars() {
        let is_quote = (c == '"' || c == '\'') && previous != Some('\\');
        if is_quote {
            if !in_quotes {
                in_quotes = true;
                quote_char = c;
            } else if c == quote_char {
                in_quotes = false;
            }
            current.push(c);
        } else if c == ',' && !in_quotes {
            out.push(current.trim().to_string());
            current.clear();
        } else {
            current.push(c);
        }
        previous = Some(c);
    }

    let last = current.trim();
    if !last.is_empty() {
        out.push(last.to_string());
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_operation_and_arguments() {
        let cmd = parse("  binaryInvoke(java.lang.Math, max, double, 4.5, double, -3.7)  ").unwrap();
        assert_eq!(cmd.operation, "binaryInvoke");
        assert_eq!(
            cmd.arguments,
            vec!["java.lang.Math", "max", "double", "4.5", "double", "-3.7"]
        );
        assert_eq!(cmd.arity(), 6);
    }

    #[test]
    fn empty_command_rejected() {
        assert_eq!(parse(""), Err(ParseError::EmptyCommand));
        assert_eq!(parse("   \t "), Err(ParseError::EmptyCommand));
    }

    #[test]
    fn missing_or_misordered_parentheses_rejected() {
        assert_eq!(parse("Class java.lang.Math"), Err(ParseError::MalformedCommand));
        assert_eq!(parse("Class(java.lang.Math"), Err(ParseError::MalformedCommand));
        assert_eq!(parse("Class)java.lang.Math("), Err(ParseError::MalformedCommand));
    }

    #[test]
    fn comma_inside_quotes_does_not_split() {
        let cmd = parse(r#"unaryInvoke(Foo, bar, string, "a,b")"#).unwrap();
        assert_eq!(cmd.arity(), 4);
        assert_eq!(cmd.arguments[3], r#""a,b""#);

        let cmd = parse("unaryInvoke(Foo, bar, string, 'x, \"y\", z')").unwrap();
        assert_eq!(cmd.arity(), 4);
        assert_eq!(cmd.arguments[3], "'x, \"y\", z'");
    }

    #[test]
    fn escaped_quote_does_not_toggle() {
        let args = split_arguments(r#"a\"b, c"#);
        assert_eq!(args, vec![r#"a\"b"#, "c"]);
    }

    #[test]
    fn trailing_empty_remainder_dropped_but_inner_empties_kept() {
        assert_eq!(split_arguments("a,,b"), vec!["a", "", "b"]);
        assert_eq!(split_arguments("a, "), vec!["a"]);
        assert_eq!(split_arguments(","), vec![""]);
        assert!(split_arguments("   ").is_empty());
    }

    #[test]
    fn unknown_operation_is_not_a_parse_error() {
        let cmd = parse("frobnicate()").unwrap();
        assert_eq!(cmd.operation, "frobnicate");
        assert!(cmd.arguments.is_empty());
    }

    #[test]
    fn text_after_last_parenthesis_ignored() {
        let cmd = parse("Class(java.lang.Math) trailing").unwrap();
        assert_eq!(cmd.arguments, vec!["java.lang.Math"]);
    }

    #[test]
    fn split_then_rejoin_is_idempotent() {
        let commands = [
            "invoke(java.lang.System, currentTimeMillis)",
            "binaryInvoke( java.lang.Integer ,parseInt, string, \"ff\", int ,16)",
            "unaryInvoke(java.lang.Math, abs, int, -3)",
        ];
        for raw in commands {
            let first = parse(raw).unwrap();
            let rejoined = format!("{}({})", first.operation, first.arguments.join(","));
            let second = parse(&rejoined).unwrap();
            assert_eq!(first, second, "round trip changed {raw}");
        }
    }
}
