//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for both roles.
//! All types derive Serde traits for deserialization from config files.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::http::request::DEFAULT_MAX_HEADER_BYTES;

/// Root configuration shared by the backend and the facade.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct AppConfig {
    /// Backend listener (executes commands).
    pub backend: BackendConfig,

    /// Facade listener (serves the page, proxies queries).
    pub facade: FacadeConfig,

    /// Execution engine settings.
    pub engine: EngineConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Request size limits.
    pub limits: LimitsConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Backend listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct BackendConfig {
    /// Bind address (e.g., "0.0.0.0:45000").
    pub bind_address: String,

    /// Maximum concurrent connections (backpressure).
    pub max_connections: usize,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:45000".to_string(),
            max_connections: 1_024,
        }
    }
}

/// Facade listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct FacadeConfig {
    /// Bind address (e.g., "0.0.0.0:35000").
    pub bind_address: String,

    /// Base URL of the backend the facade forwards to.
    pub backend_url: String,

    /// Maximum concurrent connections (backpressure).
    pub max_connections: usize,
}

impl Default for FacadeConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:35000".to_string(),
            backend_url: "http://localhost:45000".to_string(),
            max_connections: 1_024,
        }
    }
}

/// Engine configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct EngineConfig {
    /// Fully qualified type names the engine may reflect on.
    /// Empty means every builtin type.
    pub allowed_types: Vec<String>,
}

/// Timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Time allowed for a client to send its request head, in seconds.
    pub read_secs: u64,

    /// Total time for one facade → backend exchange, in seconds.
    pub upstream_secs: u64,

    /// Time allowed to drain in-flight connections on shutdown, in seconds.
    pub drain_secs: u64,
}

impl TimeoutConfig {
    pub fn read(&self) -> Duration {
        Duration::from_secs(self.read_secs)
    }

    pub fn upstream(&self) -> Duration {
        Duration::from_secs(self.upstream_secs)
    }

    pub fn drain(&self) -> Duration {
        Duration::from_secs(self.drain_secs)
    }
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            read_secs: 10,
            upstream_secs: 15,
            drain_secs: 5,
        }
    }
}

/// Request size limits.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Bound on the request line plus headers, in bytes.
    pub max_header_bytes: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_header_bytes: DEFAULT_MAX_HEADER_BYTES,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}
