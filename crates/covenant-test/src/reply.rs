//! Scripted replies.

use bytes::Bytes;
use covenant_core::{TransportError, WireResponse};
use http::header::CONTENT_TYPE;
use http::{HeaderMap, HeaderValue, StatusCode};
use serde_json::Value;
use std::time::Duration;

/// What the mock transport does for one request.
#[derive(Debug, Clone)]
pub enum MockReply {
    /// Answers with a response.
    Respond {
        /// HTTP status.
        status: StatusCode,
        /// Response headers.
        headers: HeaderMap,
        /// Raw body.
        body: Bytes,
    },
    /// Fails with [`TransportError::Timeout`].
    Timeout,
    /// Fails with [`TransportError::Unreachable`].
    Unreachable(String),
    /// Fails with [`TransportError::Failed`].
    Failed(String),
    /// Waits, then behaves like the inner reply.
    Delayed(Duration, Box<MockReply>),
}

impl MockReply {
    /// A `200 OK` JSON response.
    #[must_use]
    pub fn json(node: &Value) -> Self {
        Self::json_with_status(StatusCode::OK, node)
    }

    /// A JSON response with the given status.
    #[must_use]
    pub fn json_with_status(status: StatusCode, node: &Value) -> Self {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        Self::Respond {
            status,
            headers,
            body: Bytes::from(node.to_string()),
        }
    }

    /// A response with a raw body and no headers.
    #[must_use]
    pub fn raw(status: StatusCode, body: impl Into<Bytes>) -> Self {
        Self::Respond {
            status,
            headers: HeaderMap::new(),
            body: body.into(),
        }
    }

    /// Delays this reply.
    #[must_use]
    pub fn after(self, delay: Duration) -> Self {
        Self::Delayed(delay, Box::new(self))
    }

    pub(crate) async fn resolve(self) -> Result<WireResponse, TransportError> {
        let mut reply = self;
        loop {
            match reply {
                Self::Delayed(delay, inner) => {
                    tokio::time::sleep(delay).await;
                    reply = *inner;
                }
                Self::Respond {
                    status,
                    headers,
                    body,
                } => {
                    return Ok(WireResponse {
                        status,
                        headers,
                        body,
                    })
                }
                Self::Timeout => return Err(TransportError::Timeout),
                Self::Unreachable(reason) => return Err(TransportError::Unreachable(reason)),
                Self::Failed(reason) => return Err(TransportError::Failed(reason)),
            }
        }
    }
}
