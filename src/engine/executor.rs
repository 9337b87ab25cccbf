//! Command execution.
//!
//! # Responsibilities
//! - Resolve the operation name to one of the supported operations
//! - Enforce per-operation arity
//! - Coerce typed arguments and invoke through the catalog
//! - Convert every failure into an `ExecutionResult::Failure`
//!
//! # Design Decisions
//! - Stateless: the engine only holds a shared, read-only catalog
//! - Type tokens are mapped before any value is coerced, so an unsupported
//!   type is reported ahead of a bad value

use std::sync::Arc;

use crate::command::{self, Command};
use crate::engine::catalog::{Registry, TypeCatalog};
use crate::engine::error::{ArgCount, EngineError};
use crate::engine::result::{ClassDescription, ExecutionResult, Payload};
use crate::engine::value::{Argument, TypedValue, ValueKind};

/// The fixed set of supported operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Class,
    Invoke,
    UnaryInvoke,
    BinaryInvoke,
}

impl Operation {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "Class" => Some(Operation::Class),
            "invoke" => Some(Operation::Invoke),
            "unaryInvoke" => Some(Operation::UnaryInvoke),
            "binaryInvoke" => Some(Operation::BinaryInvoke),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Operation::Class => "Class",
            Operation::Invoke => "invoke",
            Operation::UnaryInvoke => "unaryInvoke",
            Operation::BinaryInvoke => "binaryInvoke",
        }
    }

    /// Exact number of arguments the operation takes.
    pub fn arity(self) -> usize {
        match self {
            Operation::Class => 1,
            Operation::Invoke => 2,
            Operation::UnaryInvoke => 4,
            Operation::BinaryInvoke => 6,
        }
    }
}

/// Reflective execution engine.
#[derive(Clone)]
pub struct Engine {
    catalog: Arc<dyn TypeCatalog>,
}

impl Engine {
    pub fn new(catalog: Arc<dyn TypeCatalog>) -> Self {
        Self { catalog }
    }

    /// Engine over the full builtin catalog.
    pub fn builtin() -> Self {
        Self::new(Arc::new(Registry::builtin()))
    }

    /// Execute a raw command and return the JSON result.
    pub fn execute(&self, raw: &str) -> String {
        self.run(raw).to_json()
    }

    /// Execute a raw command.
    pub fn run(&self, raw: &str) -> ExecutionResult {
        let outcome = command::parse(raw)
            .map_err(EngineError::from)
            .and_then(|cmd| self.dispatch(&cmd));

        match outcome {
            Ok(payload) => ExecutionResult::success(payload),
            Err(err) => {
                tracing::debug!(command = raw, error = %err, "Command failed");
                err.into()
            }
        }
    }

    fn dispatch(&self, cmd: &Command) -> Result<Payload, EngineError> {
        let operation = Operation::from_name(&cmd.operation)
            .ok_or_else(|| EngineError::UnknownOperation(cmd.operation.clone()))?;

        if cmd.arity() != operation.arity() {
            return Err(EngineError::ArityMismatch {
                operation: operation.name(),
                expected: ArgCount(operation.arity()),
            });
        }

        let args = &cmd.arguments;
        match operation {
            Operation::Class => self.describe(&args[0]),
            Operation::Invoke => self.invoke(&args[0], &args[1], &[]),
            Operation::UnaryInvoke => {
                let params = [TypedValue::new(&args[2], &args[3])?];
                self.invoke(&args[0], &args[1], &params)
            }
            Operation::BinaryInvoke => {
                let params = [
                    TypedValue::new(&args[2], &args[3])?,
                    TypedValue::new(&args[4], &args[5])?,
                ];
                self.invoke(&args[0], &args[1], &params)
            }
        }
    }

    fn describe(&self, type_name: &str) -> Result<Payload, EngineError> {
        let ty = self.catalog.resolve_type(type_name)?;
        let description = ClassDescription::describe(
            ty,
            self.catalog.list_fields(ty),
            self.catalog.list_methods(ty),
        );
        Ok(description.into())
    }

    fn invoke(
        &self,
        type_name: &str,
        method_name: &str,
        params: &[TypedValue],
    ) -> Result<Payload, EngineError> {
        let ty = self.catalog.resolve_type(type_name)?;
        let arguments = params
            .iter()
            .map(TypedValue::coerce)
            .collect::<Result<Vec<Argument>, _>>()?;
        let kinds: Vec<ValueKind> = params.iter().map(|p| p.kind).collect();

        let method = self.catalog.find_static_method(ty, method_name, &kinds)?;
        tracing::debug!(
            type_name = ty.name,
            method = method.name,
            arity = arguments.len(),
            "Invoking static method"
        );
        let value = self.catalog.invoke_static(method, &arguments)?;
        Ok(value.into())
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::builtin()
    }
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine").finish_non_exhaustive()
    }
}
