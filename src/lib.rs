//! Reflective command calculator.
//!
//! Two cooperating servers speaking a minimal HTTP/1.1 over raw sockets:
//! a backend that executes `Class` / `invoke` / `unaryInvoke` /
//! `binaryInvoke` commands against a registry of reflectable types, and a
//! facade that serves a browser client and proxies queries to the backend.

pub mod command;
pub mod config;
pub mod engine;
pub mod http;
pub mod lifecycle;
pub mod net;
pub mod observability;
pub mod proxy;
pub mod service;

pub use config::AppConfig;
pub use engine::{Engine, ExecutionResult};
pub use http::{HttpRequest, HttpResponse, HttpServer};
pub use lifecycle::Shutdown;
pub use proxy::Forwarder;
