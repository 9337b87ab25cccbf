//! Type catalog: the introspection and invocation capability the engine runs
//! against.
//!
//! # Responsibilities
//! - Resolve a fully qualified type name to its declaration
//! - Expose declared fields and methods in declaration order
//! - Find a method by exact name and parameter kinds
//! - Invoke static methods, turning panics into faults
//!
//! # Design Decisions
//! - The shipped catalog is an explicit registry: only functions registered
//!   here can ever be invoked from a command
//! - Instance methods are declared without a body so they can be listed and
//!   reported as non-static, never called
//! - Declaration order is the order of registration

use std::collections::HashMap;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};

use crate::engine::error::{EngineError, Fault};
use crate::engine::value::{Argument, TypeRef, Value, ValueKind};

/// Signature of a registered static function.
pub type NativeFn = fn(&Args<'_>) -> Result<Value, Fault>;

/// Positional access to coerced arguments inside a native function.
pub struct Args<'a>(&'a [Argument]);

impl<'a> Args<'a> {
    pub fn new(args: &'a [Argument]) -> Self {
        Self(args)
    }

    pub fn int(&self, index: usize) -> Result<i32, Fault> {
        match self.0.get(index) {
            Some(Argument::Int(v)) => Ok(*v),
            other => Err(mismatch(index, "int", other)),
        }
    }

    pub fn double(&self, index: usize) -> Result<f64, Fault> {
        match self.0.get(index) {
            Some(Argument::Double(v)) => Ok(*v),
            other => Err(mismatch(index, "double", other)),
        }
    }

    pub fn text(&self, index: usize) -> Result<&'a str, Fault> {
        match self.0.get(index) {
            Some(Argument::Text(v)) => Ok(v.as_str()),
            other => Err(mismatch(index, "string", other)),
        }
    }
}

fn mismatch(index: usize, expected: &str, found: Option<&Argument>) -> Fault {
    let found = found.map_or_else(|| "nothing".to_string(), |a| a.kind().to_string());
    Fault::new(
        "IllegalArgumentException",
        format!("argument {index}: expected {expected}, found {found}"),
    )
}

/// A declared field.
#[derive(Debug, Clone)]
pub struct FieldDef {
    pub name: &'static str,
    pub ty: TypeRef,
}

impl fmt::Display for FieldDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.ty, self.name)
    }
}

/// How a declared method can be called.
#[derive(Clone, Copy)]
pub enum MethodBody {
    Static(NativeFn),
    Instance,
}

impl fmt::Debug for MethodBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MethodBody::Static(_) => f.write_str("Static(..)"),
            MethodBody::Instance => f.write_str("Instance"),
        }
    }
}

/// A declared method.
#[derive(Debug, Clone)]
pub struct MethodDef {
    pub name: &'static str,
    pub returns: TypeRef,
    pub params: Vec<TypeRef>,
    pub body: MethodBody,
}

impl MethodDef {
    pub fn is_static(&self) -> bool {
        matches!(self.body, MethodBody::Static(_))
    }

    /// True when the declared parameters are exactly the given kinds.
    pub fn accepts(&self, kinds: &[ValueKind]) -> bool {
        self.params.len() == kinds.len()
            && self
                .params
                .iter()
                .zip(kinds)
                .all(|(param, kind)| *param == kind.param_type())
    }
}

impl fmt::Display for MethodDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}(", self.returns, self.name)?;
        for (i, param) in self.params.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{param}")?;
        }
        f.write_str(")")
    }
}

/// A declared type with its own (non-inherited) members.
#[derive(Debug, Clone)]
pub struct TypeDef {
    pub name: &'static str,
    fields: Vec<FieldDef>,
    methods: Vec<MethodDef>,
}

impl TypeDef {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            fields: Vec::new(),
            methods: Vec::new(),
        }
    }

    /// Declare a field. Rendering does not distinguish static from instance
    /// fields, so neither does the declaration.
    pub fn field(mut self, ty: TypeRef, name: &'static str) -> Self {
        self.fields.push(FieldDef { name, ty });
        self
    }

    pub fn static_method(
        mut self,
        returns: TypeRef,
        name: &'static str,
        params: &[TypeRef],
        body: NativeFn,
    ) -> Self {
        self.methods.push(MethodDef {
            name,
            returns,
            params: params.to_vec(),
            body: MethodBody::Static(body),
        });
        self
    }

    pub fn instance_method(mut self, returns: TypeRef, name: &'static str, params: &[TypeRef]) -> Self {
        self.methods.push(MethodDef {
            name,
            returns,
            params: params.to_vec(),
            body: MethodBody::Instance,
        });
        self
    }

    pub fn fields(&self) -> &[FieldDef] {
        &self.fields
    }

    pub fn methods(&self) -> &[MethodDef] {
        &self.methods
    }
}

/// Introspection and invocation capability used by the engine.
pub trait TypeCatalog: Send + Sync {
    /// Resolve a fully qualified type name.
    fn resolve_type(&self, name: &str) -> Result<&TypeDef, EngineError>;

    /// Declared fields, declaration order.
    fn list_fields<'a>(&self, ty: &'a TypeDef) -> &'a [FieldDef] {
        ty.fields()
    }

    /// Declared methods, declaration order.
    fn list_methods<'a>(&self, ty: &'a TypeDef) -> &'a [MethodDef] {
        ty.methods()
    }

    /// Find a method by exact name and parameter kinds.
    ///
    /// A match that is not static yields [`EngineError::NotStatic`].
    fn find_static_method<'a>(
        &self,
        ty: &'a TypeDef,
        name: &str,
        params: &[ValueKind],
    ) -> Result<&'a MethodDef, EngineError> {
        let method = ty
            .methods()
            .iter()
            .find(|m| m.name == name && m.accepts(params))
            .ok_or_else(|| EngineError::MethodResolution {
                type_name: ty.name.to_string(),
                method: name.to_string(),
                params: params
                    .iter()
                    .map(|k| k.param_type().to_string())
                    .collect::<Vec<_>>()
                    .join(", "),
            })?;

        if !method.is_static() {
            return Err(EngineError::NotStatic {
                type_name: ty.name.to_string(),
                method: name.to_string(),
            });
        }
        Ok(method)
    }

    /// Invoke a static method with already coerced arguments.
    fn invoke_static(&self, method: &MethodDef, args: &[Argument]) -> Result<Value, EngineError>;
}

/// An allow-list of invokable types backed by native functions.
#[derive(Debug, Default, Clone)]
pub struct Registry {
    types: HashMap<&'static str, TypeDef>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with every builtin `java.lang` type.
    pub fn builtin() -> Self {
        crate::engine::builtin::registry()
    }

    /// Register a type, replacing any earlier declaration with the same name.
    pub fn register(&mut self, ty: TypeDef) {
        self.types.insert(ty.name, ty);
    }

    pub fn with(mut self, ty: TypeDef) -> Self {
        self.register(ty);
        self
    }

    /// Keep only the named types. Names that are not registered are returned.
    pub fn retain_only(&mut self, allowed: &[String]) -> Vec<String> {
        let unknown = allowed
            .iter()
            .filter(|name| !self.types.contains_key(name.as_str()))
            .cloned()
            .collect();
        self.types
            .retain(|name, _| allowed.iter().any(|a| a == name));
        unknown
    }

    /// Registered type names, sorted.
    pub fn type_names(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.types.keys().copied().collect();
        names.sort_unstable();
        names
    }
}

impl TypeCatalog for Registry {
    fn resolve_type(&self, name: &str) -> Result<&TypeDef, EngineError> {
        self.types
            .get(name)
            .ok_or_else(|| EngineError::TypeResolution(name.to_string()))
    }

    fn invoke_static(&self, method: &MethodDef, args: &[Argument]) -> Result<Value, EngineError> {
        let MethodBody::Static(body) = method.body else {
            return Err(EngineError::NotStatic {
                type_name: String::new(),
                method: method.name.to_string(),
            });
        };

        let outcome = panic::catch_unwind(AssertUnwindSafe(|| body(&Args::new(args))));
        match outcome {
            Ok(result) => result.map_err(EngineError::Invocation),
            Err(payload) => {
                let message = payload
                    .downcast_ref::<&str>()
                    .map(|s| s.to_string())
                    .or_else(|| payload.downcast_ref::<String>().cloned())
                    .unwrap_or_else(|| "native function panicked".to_string());
                tracing::warn!(method = method.name, %message, "Native function panicked");
                Err(EngineError::Invocation(Fault::new("Panic", message)))
            }
        }
    }
}
