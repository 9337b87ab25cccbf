//! HTTP message errors.

/// Errors raised while decoding HTTP messages from the wire.
#[derive(Debug, thiserror::Error)]
pub enum HttpError {
    /// The request line was missing or the header section was unusable.
    #[error("Malformed request: {0}")]
    MalformedRequest(String),

    /// An upstream response could not be decoded.
    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
