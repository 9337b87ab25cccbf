//! Response encoding (and decoding, for upstream replies).
//!
//! # Responsibilities
//! - Render status line, headers and body into wire bytes
//! - Always emit Content-Type, Content-Length, Connection and CORS headers
//! - Decode raw upstream responses for the proxy forwarder
//!
//! # Design Decisions
//! - Content-Length is computed from the UTF-8 body, never trusted from input
//! - Error bodies are `{"error": "..."}` with double quotes in the message
//!   replaced by single quotes
//! - Headers keep insertion order

use serde_json::json;
use tokio::io::{AsyncWrite, AsyncWriteExt};

use crate::http::error::HttpError;
use crate::http::request::split_header;

pub const CONTENT_TYPE_JSON: &str = "application/json; charset=UTF-8";
pub const CONTENT_TYPE_TEXT: &str = "text/plain; charset=UTF-8";
pub const CONTENT_TYPE_HTML: &str = "text/html; charset=UTF-8";

/// A response ready to be rendered once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    status: u16,
    reason: String,
    headers: Vec<(String, String)>,
    body: String,
}

impl HttpResponse {
    pub fn new(status: u16, reason: &str, content_type: &str, body: impl Into<String>) -> Self {
        let body = body.into();
        let headers = vec![
            ("Content-Type".to_string(), content_type.to_string()),
            ("Content-Length".to_string(), body.len().to_string()),
            ("Connection".to_string(), "close".to_string()),
            ("Access-Control-Allow-Origin".to_string(), "*".to_string()),
        ];
        Self {
            status,
            reason: reason.to_string(),
            headers,
            body,
        }
    }

    pub fn ok_json(json: impl Into<String>) -> Self {
        Self::new(200, "OK", CONTENT_TYPE_JSON, json)
    }

    pub fn ok_text(text: impl Into<String>) -> Self {
        Self::new(200, "OK", CONTENT_TYPE_TEXT, text)
    }

    pub fn ok_html(html: impl Into<String>) -> Self {
        Self::new(200, "OK", CONTENT_TYPE_HTML, html)
    }

    pub fn not_found(message: &str) -> Self {
        Self::error(404, message)
    }

    pub fn bad_request(message: &str) -> Self {
        Self::error(400, message)
    }

    pub fn server_error(message: &str) -> Self {
        Self::error(500, message)
    }

    fn error(status: u16, message: &str) -> Self {
        let body = json!({ "error": message.replace('"', "'") }).to_string();
        Self::new(status, reason_phrase(status), CONTENT_TYPE_JSON, body)
    }

    pub fn status(&self) -> u16 {
        self.status
    }

    pub fn reason(&self) -> &str {
        &self.reason
    }

    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    /// First header with the given name, case-insensitive.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn body(&self) -> &str {
        &self.body
    }

    pub fn into_body(self) -> String {
        self.body
    }

    /// Render the full wire form.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut head = format!("HTTP/1.1 {} {}\r\n", self.status, self.reason);
        for (name, value) in &self.headers {
            head.push_str(name);
            head.push_str(": ");
            head.push_str(value);
            head.push_str("\r\n");
        }
        head.push_str("\r\n");

        let mut bytes = head.into_bytes();
        bytes.extend_from_slice(self.body.as_bytes());
        bytes
    }

    pub async fn write_to<W>(&self, writer: &mut W) -> std::io::Result<()>
    where
        W: AsyncWrite + Unpin,
    {
        writer.write_all(&self.to_bytes()).await?;
        writer.flush().await
    }

    /// Decode a complete raw response as read from an upstream socket.
    ///
    /// Headers are kept as received. When a Content-Length header is present
    /// the body is cut to that length; otherwise everything after the head is
    /// the body.
    pub fn parse(raw: &[u8]) -> Result<Self, HttpError> {
        let (head, body) = split_head(raw)
            .ok_or_else(|| HttpError::MalformedResponse("missing end of headers".into()))?;
        let head = std::str::from_utf8(head)
            .map_err(|_| HttpError::MalformedResponse("headers are not valid UTF-8".into()))?;

        let mut lines = head.lines();
        let status_line = lines.next().unwrap_or_default();
        let mut parts = status_line.splitn(3, ' ');
        let version = parts.next().unwrap_or_default();
        if !version.starts_with("HTTP/") {
            return Err(HttpError::MalformedResponse(format!(
                "bad status line: {status_line}"
            )));
        }
        let status = parts
            .next()
            .and_then(|code| code.parse::<u16>().ok())
            .ok_or_else(|| HttpError::MalformedResponse(format!("bad status line: {status_line}")))?;
        let reason = parts.next().unwrap_or_default().to_string();

        let headers: Vec<(String, String)> = lines
            .filter_map(split_header)
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();

        let declared = headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case("Content-Length"))
            .and_then(|(_, v)| v.parse::<usize>().ok());
        let body = match declared {
            Some(len) if len <= body.len() => &body[..len],
            _ => body,
        };
        let body = String::from_utf8(body.to_vec())
            .map_err(|_| HttpError::MalformedResponse("body is not valid UTF-8".into()))?;

        Ok(Self {
            status,
            reason,
            headers,
            body,
        })
    }
}

fn split_head(raw: &[u8]) -> Option<(&[u8], &[u8])> {
    if let Some(pos) = raw.windows(4).position(|w| w == b"\r\n\r\n") {
        return Some((&raw[..pos], &raw[pos + 4..]));
    }
    raw.windows(2)
        .position(|w| w == b"\n\n")
        .map(|pos| (&raw[..pos], &raw[pos + 2..]))
}

/// Reason phrase for the status codes this server emits.
pub fn reason_phrase(status: u16) -> &'static str {
    match status {
        200 => "OK",
        400 => "Bad Request",
        404 => "Not Found",
        500 => "Internal Server Error",
        _ => "Unknown",
    }
}
