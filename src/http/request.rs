//! Request decoding.
//!
//! # Responsibilities
//! - Read the request line and headers up to the blank line
//! - Split the target into path and query string
//! - Percent-decode query keys and values
//!
//! # Design Decisions
//! - No body is ever read: every input travels in the query string
//! - The header section is bounded; exceeding the bound is a malformed request
//! - Header lines without a colon are skipped rather than rejected
//! - Duplicate query keys and header names: last write wins

use std::collections::HashMap;

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncReadExt};
use url::form_urlencoded;

use crate::http::error::HttpError;

/// Default bound on the request line plus headers, in bytes.
pub const DEFAULT_MAX_HEADER_BYTES: usize = 16 * 1024;

/// A decoded request. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    method: String,
    path: String,
    raw_query: String,
    query_params: HashMap<String, String>,
    headers: HashMap<String, String>,
}

impl HttpRequest {
    /// Build a request from its parts, parsing the query string.
    pub fn new(
        method: impl Into<String>,
        path: impl Into<String>,
        raw_query: impl Into<String>,
        headers: HashMap<String, String>,
    ) -> Self {
        let raw_query = raw_query.into();
        Self {
            method: method.into(),
            path: path.into(),
            query_params: parse_query(&raw_query),
            raw_query,
            headers,
        }
    }

    /// Build a request from a method and a request target (`/path?query`).
    pub fn from_target(method: &str, target: &str, headers: HashMap<String, String>) -> Self {
        let (path, query) = target.split_once('?').unwrap_or((target, ""));
        Self::new(method, path, query, headers)
    }

    /// Read one request head from a line-oriented stream.
    pub async fn read_from<R>(reader: &mut R, max_header_bytes: usize) -> Result<Self, HttpError>
    where
        R: AsyncBufRead + Unpin,
    {
        let mut limited = reader.take(max_header_bytes as u64);
        let mut line = String::new();

        limited.read_line(&mut line).await?;
        ensure_within_bound(limited.limit(), &line, max_header_bytes)?;
        let request_line = strip_line_ending(&line);
        if request_line.is_empty() {
            return Err(HttpError::MalformedRequest("empty request".into()));
        }

        let mut parts: Vec<&str> = request_line.split(' ').collect();
        while parts.last().is_some_and(|p| p.is_empty()) {
            parts.pop();
        }
        let method = parts.first().copied().unwrap_or("GET").to_string();
        let target = parts.get(1).copied().unwrap_or("/").to_string();

        let mut headers = HashMap::new();
        loop {
            line.clear();
            let read = limited.read_line(&mut line).await?;
            if read == 0 {
                break;
            }
            ensure_within_bound(limited.limit(), &line, max_header_bytes)?;
            let header_line = strip_line_ending(&line);
            if header_line.is_empty() {
                break;
            }
            if let Some((name, value)) = split_header(header_line) {
                headers.insert(name.to_string(), value.to_string());
            }
        }

        Ok(Self::from_target(&method, &target, headers))
    }

    pub fn method(&self) -> &str {
        &self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// Raw query string without the leading `?`.
    pub fn raw_query(&self) -> &str {
        &self.raw_query
    }

    /// Decoded query parameter by exact key.
    pub fn query_param(&self, name: &str) -> Option<&str> {
        self.query_params.get(name).map(String::as_str)
    }

    pub fn query_params(&self) -> &HashMap<String, String> {
        &self.query_params
    }

    /// Header value; exact name first, then a case-insensitive match.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(name)
            .or_else(|| {
                self.headers
                    .iter()
                    .find(|(k, _)| k.eq_ignore_ascii_case(name))
                    .map(|(_, v)| v)
            })
            .map(String::as_str)
    }

    pub fn headers(&self) -> &HashMap<String, String> {
        &self.headers
    }
}

/// Parse `k=v&k2=v2` with percent-decoding; a bare key maps to `""`.
pub fn parse_query(query: &str) -> HashMap<String, String> {
    form_urlencoded::parse(query.as_bytes())
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect()
}

/// Split a header line at the first colon, trimming both sides.
pub(crate) fn split_header(line: &str) -> Option<(&str, &str)> {
    let (name, value) = line.split_once(':')?;
    let name = name.trim();
    if name.is_empty() {
        return None;
    }
    Some((name, value.trim()))
}

/// A line cut short by the byte bound means the head did not fit.
fn ensure_within_bound(remaining: u64, line: &str, max_header_bytes: usize) -> Result<(), HttpError> {
    if remaining == 0 && !line.ends_with('\n') {
        return Err(HttpError::MalformedRequest(format!(
            "header section exceeds {max_header_bytes} bytes"
        )));
    }
    Ok(())
}

fn strip_line_ending(line: &str) -> &str {
    let line = line.strip_suffix('\n').unwrap_or(line);
    line.strip_suffix('\r').unwrap_or(line)
}
