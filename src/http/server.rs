//! HTTP server: the per-connection accept loop.
//!
//! # Responsibilities
//! - Accept connections from the bounded listener
//! - Run each connection on its own task: decode → handle → encode → close
//! - Stop accepting on shutdown and drain in-flight connections
//!
//! # Design Decisions
//! - One request per connection, `Connection: close` on every response
//! - A request head that cannot be decoded closes the socket without a reply
//! - Handlers never fail: they always produce a response

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tokio::sync::broadcast;
use tracing::Instrument;

use crate::http::request::{HttpRequest, DEFAULT_MAX_HEADER_BYTES};
use crate::http::response::HttpResponse;
use crate::net::{ConnectionError, ConnectionTracker, Listener, ListenerError};

/// Produces a response for a decoded request.
pub trait Handler: Send + Sync + 'static {
    /// Name used in logs (`backend`, `facade`).
    fn name(&self) -> &'static str;

    fn handle(&self, request: HttpRequest) -> impl Future<Output = HttpResponse> + Send;
}

/// Per-connection limits.
#[derive(Debug, Clone)]
pub struct ConnectionSettings {
    /// Time allowed for the client to send its request head.
    pub read_timeout: Duration,
    /// Bound on the request line plus headers.
    pub max_header_bytes: usize,
    /// Time allowed for in-flight connections to finish after shutdown.
    pub drain_timeout: Duration,
}

impl Default for ConnectionSettings {
    fn default() -> Self {
        Self {
            read_timeout: Duration::from_secs(10),
            max_header_bytes: DEFAULT_MAX_HEADER_BYTES,
            drain_timeout: Duration::from_secs(5),
        }
    }
}

/// HTTP server driving one [`Handler`].
pub struct HttpServer<H> {
    handler: Arc<H>,
    settings: ConnectionSettings,
    tracker: ConnectionTracker,
}

impl<H: Handler> HttpServer<H> {
    pub fn new(handler: H, settings: ConnectionSettings) -> Self {
        Self {
            handler: Arc::new(handler),
            settings,
            tracker: ConnectionTracker::new(),
        }
    }

    /// Tracker of in-flight connections.
    pub fn tracker(&self) -> ConnectionTracker {
        self.tracker.clone()
    }

    /// Run the accept loop until the shutdown signal fires.
    pub async fn run(
        self,
        listener: Listener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), ListenerError> {
        let role = self.handler.name();
        let addr = listener.local_addr().map_err(ListenerError::Accept)?;
        tracing::info!(role, address = %addr, "HTTP server starting");

        loop {
            tokio::select! {
                _ = shutdown.recv() => {
                    tracing::info!(role, "Shutdown signal received, no longer accepting");
                    break;
                }
                accepted = listener.accept() => match accepted {
                    Ok((stream, peer, permit)) => {
                        let guard = self.tracker.track();
                        let span = tracing::info_span!(
                            "connection",
                            role,
                            connection_id = %guard.id(),
                            peer_addr = %peer
                        );
                        let handler = Arc::clone(&self.handler);
                        let settings = self.settings.clone();
                        tokio::spawn(
                            async move {
                                let _permit = permit;
                                let _guard = guard;
                                match serve_connection(stream, handler.as_ref(), &settings).await {
                                    Ok(status) => tracing::trace!(status, "Connection finished"),
                                    Err(ConnectionError::Request(e)) => {
                                        tracing::debug!(error = %e, "Dropping undecodable request");
                                    }
                                    Err(e) => tracing::warn!(error = %e, "Connection failed"),
                                }
                            }
                            .instrument(span),
                        );
                    }
                    Err(ListenerError::Closed) => return Err(ListenerError::Closed),
                    Err(e) => {
                        tracing::warn!(role, error = %e, "Accept failed");
                        tokio::time::sleep(Duration::from_millis(50)).await;
                    }
                },
            }
        }

        drop(listener);
        if tokio::time::timeout(self.settings.drain_timeout, self.tracker.wait_idle())
            .await
            .is_err()
        {
            tracing::warn!(
                role,
                active = self.tracker.active_count(),
                "Drain timeout elapsed with connections still open"
            );
        }

        tracing::info!(role, "HTTP server stopped");
        Ok(())
    }
}

/// Service one connection: read the head, handle it, write the response.
async fn serve_connection<H: Handler>(
    mut stream: TcpStream,
    handler: &H,
    settings: &ConnectionSettings,
) -> Result<u16, ConnectionError> {
    let (read_half, mut write_half) = stream.split();
    let mut reader = BufReader::new(read_half);

    let request = tokio::time::timeout(
        settings.read_timeout,
        HttpRequest::read_from(&mut reader, settings.max_header_bytes),
    )
    .await
    .map_err(|_| ConnectionError::ReadTimeout(settings.read_timeout))??;

    let method = request.method().to_string();
    let path = request.path().to_string();

    let response = handler.handle(request).await;
    tracing::info!(
        method = %method,
        path = %path,
        status = response.status(),
        "Request served"
    );

    response.write_to(&mut write_half).await?;
    write_half.shutdown().await?;
    Ok(response.status())
}
