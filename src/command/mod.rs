//! Command grammar subsystem.
//!
//! # Data Flow
//! ```text
//! raw `comando` value
//!     → parser.rs (trim, locate parentheses, quote-aware split)
//!     → Command { operation, arguments }
//!     → handed to the engine, which resolves the operation name
//! ```
//!
//! # Design Decisions
//! - No nesting, so a single linear scan replaces a recursive grammar
//! - Unknown operation names are not a parse error; the engine reports them
//! - Arguments keep their quotes until type-specific coercion

pub mod parser;

pub use parser::{parse, split_arguments, Command, ParseError};
