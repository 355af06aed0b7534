//! Command channel: one request, one response.
//!
//! [`CommandTransport`] is the seam: it moves bytes and reports the status
//! code, nothing else. [`RequestExecutor`] builds requests against the
//! current session id and decodes the response envelope.

pub mod executor;

#[cfg(feature = "http")]
pub mod client;

pub use executor::RequestExecutor;

#[cfg(feature = "http")]
pub use client::ReqwestTransport;

use crate::error::HttpError;
use async_trait::async_trait;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
        }
    }
}

impl std::fmt::Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A fully built command request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: Method,
    /// Absolute URL, query string included for `GET`.
    pub url: String,
    pub headers: Vec<(String, String)>,
    /// Form-encoded body for non-`GET` requests.
    pub body: Option<String>,
}

impl HttpRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Sends a request and returns whatever the server answered.
///
/// Non-2xx statuses are not errors at this level; only failing to get an
/// answer at all is.
#[async_trait]
pub trait CommandTransport: Send + Sync {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, HttpError>;
}
