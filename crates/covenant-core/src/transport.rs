//! Transport collaborator.
//!
//! The call pipeline hands a fully formed [`WireRequest`] to a [`Transport`]
//! and gets back a [`WireResponse`] or a [`TransportError`]. Connection
//! handling, TLS and framing live behind this trait.

use async_trait::async_trait;
use bytes::Bytes;
use http::{HeaderMap, Method, StatusCode};
use std::time::Duration;
use thiserror::Error;

/// An outgoing request.
#[derive(Debug, Clone)]
pub struct WireRequest {
    /// HTTP verb.
    pub method: Method,
    /// Path with parameters substituted and encoded, relative to the base URL.
    pub path: String,
    /// Query pairs in the order they were set.
    pub query: Vec<(String, String)>,
    /// Request headers.
    pub headers: HeaderMap,
    /// Encoded body, if any.
    pub body: Option<Bytes>,
}

impl WireRequest {
    /// Creates a request with no query, headers or body.
    #[must_use]
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            headers: HeaderMap::new(),
            body: None,
        }
    }

    /// Returns the first query value with the given name.
    #[must_use]
    pub fn query_value(&self, name: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Returns a header value as text.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|value| value.to_str().ok())
    }
}

/// A received response.
#[derive(Debug, Clone)]
pub struct WireResponse {
    /// HTTP status.
    pub status: StatusCode,
    /// Response headers.
    pub headers: HeaderMap,
    /// Raw body.
    pub body: Bytes,
}

impl WireResponse {
    /// Creates a response with no headers.
    #[must_use]
    pub fn new(status: StatusCode, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            body: body.into(),
        }
    }
}

/// The exchange could not complete.
#[derive(Error, Debug)]
pub enum TransportError {
    /// No response arrived in time.
    #[error("request timed out")]
    Timeout,

    /// The remote end could not be reached.
    #[error("could not connect: {0}")]
    Unreachable(String),

    /// Anything else.
    #[error("transport failure: {0}")]
    Failed(String),
}

/// Performs the network exchange.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Sends a request and waits for the full response.
    ///
    /// # Errors
    ///
    /// Returns a [`TransportError`] when no response can be obtained.
    async fn send(
        &self,
        request: WireRequest,
        timeout: Option<Duration>,
    ) -> Result<WireResponse, TransportError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::header::COOKIE;
    use http::HeaderValue;

    #[test]
    fn test_request_accessors() {
        let mut request = WireRequest::new(Method::GET, "users/7");
        request.query.push(("version".into(), "1.0".into()));
        request
            .headers
            .insert(COOKIE, HeaderValue::from_static("a=1; b=2"));
        assert_eq!(request.query_value("version"), Some("1.0"));
        assert_eq!(request.query_value("other"), None);
        assert_eq!(request.header("cookie"), Some("a=1; b=2"));
    }

    #[test]
    fn test_transport_error_display() {
        assert_eq!(TransportError::Timeout.to_string(), "request timed out");
        assert!(TransportError::Unreachable("refused".into())
            .to_string()
            .contains("refused"));
    }
}
