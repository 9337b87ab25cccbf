//! Startup orchestration.
//!
//! # Responsibilities
//! - Build the engine and the facade forwarder from configuration
//! - Bind listeners and begin accepting traffic
//! - Run the chosen role until shutdown
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - Listeners start last (traffic only when ready)
//! - `serve_*` take an already bound listener so tests can use ephemeral ports

use std::sync::Arc;

use tokio::sync::broadcast;

use crate::config::{AppConfig, EngineConfig};
use crate::engine::{Engine, Registry};
use crate::http::{ConnectionSettings, HttpServer};
use crate::lifecycle::shutdown::Shutdown;
use crate::net::{Listener, ListenerError};
use crate::proxy::{Forwarder, ProxyError};
use crate::service::backend::EXECUTE_PATH;
use crate::service::{BackendService, FacadeService};

/// Errors that abort startup or the accept loop.
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error(transparent)]
    Listener(#[from] ListenerError),

    #[error(transparent)]
    Proxy(#[from] ProxyError),
}

/// Build the engine over the builtin catalog, narrowed to `allowed_types`.
pub fn build_engine(config: &EngineConfig) -> Engine {
    let mut registry = Registry::builtin();
    if !config.allowed_types.is_empty() {
        for name in registry.retain_only(&config.allowed_types) {
            tracing::warn!(type_name = %name, "Ignoring unknown type in engine.allowed_types");
        }
    }
    tracing::info!(types = ?registry.type_names(), "Type catalog ready");
    Engine::new(Arc::new(registry))
}

/// Per-connection limits derived from configuration.
pub fn connection_settings(config: &AppConfig) -> ConnectionSettings {
    ConnectionSettings {
        read_timeout: config.timeouts.read(),
        max_header_bytes: config.limits.max_header_bytes,
        drain_timeout: config.timeouts.drain(),
    }
}

/// Forwarder from the facade to the configured backend.
pub fn build_forwarder(config: &AppConfig) -> Result<Forwarder, ProxyError> {
    Forwarder::new(
        &config.facade.backend_url,
        EXECUTE_PATH,
        config.timeouts.upstream(),
    )
}

/// Bind the backend listener and serve until shutdown.
pub async fn run_backend(config: &AppConfig, shutdown: &Shutdown) -> Result<(), StartupError> {
    let listener =
        Listener::bind(&config.backend.bind_address, config.backend.max_connections).await?;
    serve_backend(listener, config, shutdown.subscribe()).await
}

/// Serve the backend role on an already bound listener.
pub async fn serve_backend(
    listener: Listener,
    config: &AppConfig,
    shutdown: broadcast::Receiver<()>,
) -> Result<(), StartupError> {
    let service = BackendService::new(build_engine(&config.engine));
    HttpServer::new(service, connection_settings(config))
        .run(listener, shutdown)
        .await?;
    Ok(())
}

/// Bind the facade listener and serve until shutdown.
pub async fn run_facade(config: &AppConfig, shutdown: &Shutdown) -> Result<(), StartupError> {
    // Check the backend URL before taking the port.
    let forwarder = build_forwarder(config)?;
    let listener =
        Listener::bind(&config.facade.bind_address, config.facade.max_connections).await?;
    serve_facade_with(listener, forwarder, config, shutdown.subscribe()).await
}

/// Serve the facade role on an already bound listener.
pub async fn serve_facade(
    listener: Listener,
    config: &AppConfig,
    shutdown: broadcast::Receiver<()>,
) -> Result<(), StartupError> {
    let forwarder = build_forwarder(config)?;
    serve_facade_with(listener, forwarder, config, shutdown).await
}

async fn serve_facade_with(
    listener: Listener,
    forwarder: Forwarder,
    config: &AppConfig,
    shutdown: broadcast::Receiver<()>,
) -> Result<(), StartupError> {
    tracing::info!(backend = %forwarder.authority(), "Facade forwarding to backend");
    HttpServer::new(FacadeService::new(forwarder), connection_settings(config))
        .run(listener, shutdown)
        .await?;
    Ok(())
}
