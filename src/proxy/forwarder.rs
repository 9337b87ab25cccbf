//! Upstream forwarding over raw sockets.
//!
//! # Responsibilities
//! - Turn a command into `GET <base>/<endpoint>?comando=<encoded>`
//! - Perform the exchange on a fresh TCP connection (`Connection: close`)
//! - Decode the upstream response and hand back its body verbatim
//!
//! # Design Decisions
//! - Plain `http` only; TLS is out of scope
//! - The whole exchange (connect, write, read) shares one deadline
//! - Upstream responses are size-bounded

use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use url::{form_urlencoded, Host, Url};

use crate::http::{HttpError, HttpResponse};

/// Upper bound on an upstream response, head included.
pub const MAX_RESPONSE_BYTES: u64 = 8 * 1024 * 1024;

const USER_AGENT: &str = concat!("compreflex/", env!("CARGO_PKG_VERSION"));

/// Errors raised while forwarding a command upstream.
#[derive(Debug, thiserror::Error)]
pub enum ProxyError {
    #[error("invalid upstream URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("connection to {authority} failed: {source}")]
    Connect {
        authority: String,
        source: std::io::Error,
    },

    #[error("upstream {authority} did not answer within {timeout:?}")]
    Timeout { authority: String, timeout: Duration },

    #[error("upstream I/O failure: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Response(#[from] HttpError),
}

/// Forwards commands to one upstream endpoint.
#[derive(Debug, Clone)]
pub struct Forwarder {
    connect_host: String,
    host_header: String,
    port: u16,
    base_path: String,
    endpoint: String,
    timeout: Duration,
}

impl Forwarder {
    /// Create a forwarder for `base_url` (e.g. `http://localhost:45000`) and
    /// an endpoint path such as `/compreflex`.
    pub fn new(base_url: &str, endpoint: &str, timeout: Duration) -> Result<Self, ProxyError> {
        let invalid = |reason: &str| ProxyError::InvalidUrl {
            url: base_url.to_string(),
            reason: reason.to_string(),
        };

        let url = Url::parse(base_url).map_err(|e| invalid(&e.to_string()))?;
        if url.scheme() != "http" {
            return Err(invalid("only http:// upstreams are supported"));
        }
        let connect_host = match url.host() {
            Some(Host::Domain(domain)) => domain.to_string(),
            Some(Host::Ipv4(addr)) => addr.to_string(),
            Some(Host::Ipv6(addr)) => addr.to_string(),
            None => return Err(invalid("missing host")),
        };
        let port = url
            .port_or_known_default()
            .ok_or_else(|| invalid("missing port"))?;
        let host_header = match (url.host_str(), url.port()) {
            (Some(host), Some(port)) => format!("{host}:{port}"),
            (Some(host), None) => host.to_string(),
            (None, _) => return Err(invalid("missing host")),
        };

        Ok(Self {
            connect_host,
            host_header,
            port,
            base_path: url.path().trim_end_matches('/').to_string(),
            endpoint: format!("/{}", endpoint.trim_start_matches('/')),
            timeout,
        })
    }

    /// `host:port` of the upstream, for logs and errors.
    pub fn authority(&self) -> String {
        format!("{}:{}", self.connect_host, self.port)
    }

    /// Request target carrying the form-encoded command.
    pub fn request_target(&self, command: &str) -> String {
        let encoded: String = form_urlencoded::byte_serialize(command.as_bytes()).collect();
        format!("{}{}?comando={}", self.base_path, self.endpoint, encoded)
    }

    /// Forward a command and return the upstream body as received.
    ///
    /// The body is relayed whatever the upstream status; a non-200 status is
    /// only logged.
    pub async fn forward(&self, command: &str) -> Result<String, ProxyError> {
        let target = self.request_target(command);
        let response = self.fetch(&target).await?;
        if response.status() != 200 {
            tracing::warn!(
                upstream = %self.authority(),
                status = response.status(),
                "Upstream answered with a non-200 status"
            );
        }
        Ok(response.into_body())
    }

    /// Issue one GET for `target` and decode the response.
    pub async fn fetch(&self, target: &str) -> Result<HttpResponse, ProxyError> {
        let authority = self.authority();
        let request = format!(
            "GET {target} HTTP/1.1\r\n\
             Host: {host}\r\n\
             User-Agent: {USER_AGENT}\r\n\
             Accept: application/json\r\n\
             Connection: close\r\n\
             \r\n",
            host = self.host_header,
        );

        let exchange = async {
            let mut stream = TcpStream::connect((self.connect_host.as_str(), self.port))
                .await
                .map_err(|source| ProxyError::Connect {
                    authority: authority.clone(),
                    source,
                })?;
            stream.write_all(request.as_bytes()).await?;

            let mut raw = Vec::new();
            (&mut stream).take(MAX_RESPONSE_BYTES).read_to_end(&mut raw).await?;
            Ok::<_, ProxyError>(raw)
        };

        let raw = tokio::time::timeout(self.timeout, exchange)
            .await
            .map_err(|_| ProxyError::Timeout {
                authority: authority.clone(),
                timeout: self.timeout,
            })??;

        tracing::debug!(upstream = %authority, bytes = raw.len(), "Upstream response received");
        Ok(HttpResponse::parse(&raw)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn forwarder(base: &str) -> Forwarder {
        Forwarder::new(base, "/compreflex", Duration::from_secs(1)).unwrap()
    }

    #[test]
    fn builds_encoded_target() {
        let f = forwarder("http://localhost:45000");
        assert_eq!(f.authority(), "localhost:45000");
        assert_eq!(
            f.request_target("unaryInvoke(java.lang.Math, abs, int, -3)"),
            "/compreflex?comando=unaryInvoke%28java.lang.Math%2C+abs%2C+int%2C+-3%29"
        );
    }

    #[test]
    fn base_path_is_preserved() {
        let f = forwarder("http://example.com/reflex/");
        assert_eq!(f.authority(), "example.com:80");
        assert_eq!(f.request_target("x"), "/reflex/compreflex?comando=x");
    }

    #[test]
    fn rejects_unsupported_urls() {
        for url in ["https://localhost:45000", "not a url", "file:///tmp/x"] {
            assert!(
                matches!(
                    Forwarder::new(url, "/compreflex", Duration::from_secs(1)),
                    Err(ProxyError::InvalidUrl { .. })
                ),
                "{url} should be rejected"
            );
        }
    }

    #[tokio::test]
    async fn connection_refused_is_reported() {
        // Bind then drop to get a port nothing listens on.
        let port = {
            let socket = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
            socket.local_addr().unwrap().port()
        };
        let f = forwarder(&format!("http://127.0.0.1:{port}"));
        let err = f.forward("Class(java.lang.Math)").await.unwrap_err();
        assert!(matches!(err, ProxyError::Connect { .. }), "unexpected {err:?}");
    }
}
