//! Error types for the table API client.
//!
//! # Design
//! `Http` keeps the raw status code and body so callers can branch on the
//! status themselves; the client never wraps or retries a server error. The
//! one place a status is interpreted locally is `TableClient::find_many`,
//! which turns a 404 into an empty result set before an `Http` error is ever
//! constructed. `InvalidArgument` and `IncorrectResultSize` are raised by the
//! client without any network traffic having failed.

use thiserror::Error;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors returned by [`TableClient`](crate::TableClient) operations.
#[derive(Debug, Error)]
pub enum Error {
    /// A required input was missing or blank. Raised before any network call.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A query returned a record count outside the caller's expectation.
    #[error("incorrect result size: expected {expected}, actual {actual}")]
    IncorrectResultSize { expected: usize, actual: usize },

    /// The server returned a non-2xx status the client does not translate.
    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },

    /// The response body was not valid JSON, or the `result` envelope key
    /// was missing or held the wrong JSON shape.
    #[error("malformed response: {0}")]
    MalformedResponse(String),

    /// The request record could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    Serialization(String),

    /// The transport failed before an HTTP status was available.
    #[error("transport failure: {0}")]
    Transport(String),
}

impl Error {
    /// True when this is an `Http` error with the given status code.
    pub fn is_status(&self, status: u16) -> bool {
        matches!(self, Error::Http { status: s, .. } if *s == status)
    }
}
