//! Upstream proxying subsystem.
//!
//! # Data Flow
//! ```text
//! Facade /consulta?comando=...
//!     → forwarder.rs (encode, raw GET to backend, decode)
//!     → body relayed to the facade client unchanged
//! ```

pub mod forwarder;

pub use forwarder::{Forwarder, ProxyError, MAX_RESPONSE_BYTES};
