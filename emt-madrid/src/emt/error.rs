//! Transport error types.

use crate::domain::EmtError;

/// Errors from a single HTTP exchange with the EMT API.
///
/// These only describe the HTTP layer. Failures the API reports through
/// its `code` field are interpreted by the normalizer, not here.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// HTTP request failed (connection refused, TLS, body read, etc.)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The request did not complete within the configured timeout
    #[error("request timed out after {timeout_secs} seconds")]
    Timeout { timeout_secs: u64 },

    /// The server answered with a non-2xx status
    #[error("HTTP status {status}: {message}")]
    Status { status: u16, message: String },

    /// The body was not valid JSON
    #[error("JSON parse error: {message}")]
    Json {
        message: String,
        body: Option<String>,
    },

    /// A header value could not be encoded
    #[error("invalid header {0}")]
    InvalidHeader(String),

    /// The transport cannot issue requests anymore
    #[error("transport unavailable: {0}")]
    Unavailable(String),
}

impl TransportError {
    /// The HTTP status code, if the server answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            TransportError::Status { status, .. } => Some(*status),
            TransportError::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

impl From<TransportError> for EmtError {
    fn from(err: TransportError) -> Self {
        EmtError::Transport(err.to_string())
    }
}
