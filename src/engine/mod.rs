//! Reflective execution engine.
//!
//! # Data Flow
//! ```text
//! raw command
//!     → command::parse (operation + raw arguments)
//!     → executor.rs (operation lookup, arity, type tokens, coercion)
//!     → catalog.rs (resolve type, find method, invoke)
//!     → result.rs (ExecutionResult → JSON string)
//! ```
//!
//! # Design Decisions
//! - Introspection is a capability (`TypeCatalog`), not a language feature
//! - The shipped catalog is an allow-list registry of native functions
//! - Every failure is converted to a JSON error at the engine boundary

pub mod builtin;
pub mod catalog;
pub mod error;
pub mod executor;
pub mod result;
pub mod value;

pub use catalog::{Registry, TypeCatalog, TypeDef};
pub use error::{EngineError, Fault};
pub use executor::{Engine, Operation};
pub use result::{ClassDescription, ExecutionResult, Payload};
pub use value::{Argument, TypeRef, TypedValue, Value, ValueKind};
