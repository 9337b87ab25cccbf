//! Shared utilities for integration testing.

#![allow(dead_code)]

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use compreflex::config::AppConfig;
use compreflex::lifecycle::{serve_backend, serve_facade, Shutdown};
use compreflex::net::Listener;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpListener;
use tokio::sync::mpsc;

/// A server running on an ephemeral port; shuts down when dropped.
pub struct RunningServer {
    pub addr: SocketAddr,
    shutdown: Shutdown,
}

impl RunningServer {
    pub fn url(&self, target: &str) -> String {
        format!("http://{}{}", self.addr, target)
    }
}

impl Drop for RunningServer {
    fn drop(&mut self) {
        self.shutdown.trigger();
    }
}

async fn ephemeral_listener() -> Listener {
    let tcp = TcpListener::bind("127.0.0.1:0").await.unwrap();
    Listener::from_tcp(tcp, 64)
}

/// Start a backend with the given configuration.
pub async fn spawn_backend_with(config: AppConfig) -> RunningServer {
    let listener = ephemeral_listener().await;
    let addr = listener.local_addr().unwrap();
    let shutdown = Shutdown::new();
    let rx = shutdown.subscribe();
    tokio::spawn(async move {
        serve_backend(listener, &config, rx).await.unwrap();
    });
    RunningServer { addr, shutdown }
}

/// Start a backend with default configuration.
pub async fn spawn_backend() -> RunningServer {
    spawn_backend_with(AppConfig::default()).await
}

/// Start a facade forwarding to `backend_url`.
pub async fn spawn_facade(backend_url: &str) -> RunningServer {
    let mut config = AppConfig::default();
    config.facade.backend_url = backend_url.to_string();
    config.timeouts.upstream_secs = 2;

    let listener = ephemeral_listener().await;
    let addr = listener.local_addr().unwrap();
    let shutdown = Shutdown::new();
    let rx = shutdown.subscribe();
    tokio::spawn(async move {
        serve_facade(listener, &config, rx).await.unwrap();
    });
    RunningServer { addr, shutdown }
}

/// Start a programmable mock backend on an ephemeral port.
///
/// Every request line received is sent on the returned channel; `f` decides
/// the status and body of the reply.
pub async fn start_programmable_backend<F, Fut>(f: F) -> (SocketAddr, mpsc::UnboundedReceiver<String>)
where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = (u16, String)> + Send + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (tx, rx) = mpsc::unbounded_channel();
    let f = Arc::new(f);

    tokio::spawn(async move {
        while let Ok((socket, _)) = listener.accept().await {
            let f = f.clone();
            let tx = tx.clone();
            tokio::spawn(async move {
                let (read_half, mut write_half) = socket.into_split();
                let mut reader = BufReader::new(read_half);

                // Consume the head so closing does not reset the connection.
                let mut request_line = String::new();
                let _ = reader.read_line(&mut request_line).await;
                loop {
                    let mut line = String::new();
                    match reader.read_line(&mut line).await {
                        Ok(0) => break,
                        Ok(_) if line.trim().is_empty() => break,
                        Ok(_) => continue,
                        Err(_) => break,
                    }
                }
                let _ = tx.send(request_line.trim_end().to_string());

                let (status, body) = f().await;
                let status_text = match status {
                    200 => "200 OK",
                    400 => "400 Bad Request",
                    404 => "404 Not Found",
                    500 => "500 Internal Server Error",
                    503 => "503 Service Unavailable",
                    _ => "200 OK",
                };
                let response = format!(
                    "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                    status_text,
                    body.len(),
                    body
                );
                let _ = write_half.write_all(response.as_bytes()).await;
                let _ = write_half.shutdown().await;
            });
        }
    });

    (addr, rx)
}

/// Start a mock backend that always answers 200 with `body`.
pub async fn start_mock_backend(body: &'static str) -> (SocketAddr, mpsc::UnboundedReceiver<String>) {
    start_programmable_backend(move || async move { (200, body.to_string()) }).await
}

/// An address nothing listens on.
pub async fn unused_addr() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    listener.local_addr().unwrap()
}

/// HTTP client that never pools or proxies.
pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .timeout(Duration::from_secs(5))
        .build()
        .unwrap()
}
