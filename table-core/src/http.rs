//! HTTP transport seam.
//!
//! # Design
//! Requests and responses are plain data; the only I/O abstraction is the
//! [`Transport`] trait, which executes one round-trip. Implementations return
//! `Ok` for every HTTP status the server produces — interpreting status codes
//! (including the 404 special cases) is the client's job, not the
//! transport's. `Err` is reserved for connection-level failures where no
//! status exists.
//!
//! All fields use owned types so request and response values can be queued,
//! logged, or replayed in tests without lifetime concerns.

use crate::error::{Error, Result};

/// HTTP method for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
}

/// An HTTP request described as plain data.
///
/// `body`, when present, is always a JSON document; transports must send it
/// with a `content-type: application/json` header.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: String,
    pub body: Option<String>,
}

/// An HTTP response described as plain data.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    /// True for any 2xx status.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Executes one HTTP round-trip.
///
/// Takes `&self` so a single [`TableClient`](crate::TableClient) can be
/// shared across threads whenever the transport itself is thread-safe.
pub trait Transport {
    fn execute(&self, request: HttpRequest) -> Result<HttpResponse>;
}

impl<T: Transport + ?Sized> Transport for &T {
    fn execute(&self, request: HttpRequest) -> Result<HttpResponse> {
        (**self).execute(request)
    }
}

/// Map a non-2xx response to an [`Error::Http`] carrying status and body.
pub(crate) fn check_status(response: &HttpResponse) -> Result<()> {
    if response.is_success() {
        return Ok(());
    }
    Err(Error::Http {
        status: response.status,
        body: response.body.clone(),
    })
}
