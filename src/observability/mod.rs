//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → tracing events with structured fields
//!       (connection_id, peer_addr, path, status, operation)
//!     → logging.rs subscriber (EnvFilter + fmt layer)
//!     → stdout
//! ```
//!
//! # Design Decisions
//! - Each connection task runs inside a `connection` span
//! - Log level configurable via config and environment

pub mod logging;
