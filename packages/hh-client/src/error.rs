//! Typed errors for the hh.ru API client.
//!
//! Uses `thiserror` for library errors (not `anyhow`). The detail-fetch
//! variants double as the retry contract: callers must never retry
//! [`HhError::NotFound`], while [`HhError::RateLimited`],
//! [`HhError::Transport`] and [`HhError::Status`] are transient.

use thiserror::Error;

/// Errors returned by [`HhClient`](crate::HhClient) operations.
#[derive(Debug, Error)]
pub enum HhError {
    /// Network or connection failure before a full response arrived.
    #[error("transport error: {0}")]
    Transport(#[source] reqwest::Error),

    /// Response body was not the JSON shape we expect.
    #[error("malformed response body: {0}")]
    Parse(#[source] serde_json::Error),

    /// Non-200 response outside the specifically classified codes.
    #[error("unexpected HTTP status {status}")]
    Status { status: u16 },

    /// The vacancy does not exist (HTTP 404). Terminal.
    #[error("vacancy not found")]
    NotFound,

    /// HTTP 403 or 429 - the API is throttling us.
    #[error("rate limited (HTTP {status})")]
    RateLimited { status: u16 },
}

/// Result type alias for client operations.
pub type Result<T> = std::result::Result<T, HhError>;
