//! In-memory transport.

use crate::reply::MockReply;
use async_trait::async_trait;
use covenant_core::{Transport, TransportError, WireRequest, WireResponse};
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::time::Duration;

/// A [`Transport`] that answers from a script and records every request.
///
/// Replies are consumed in order. Once the script is empty the fallback
/// reply is used; without one, the exchange fails.
///
/// # Example
///
/// ```
/// use covenant_core::{Transport, WireRequest};
/// use covenant_test::{MockReply, MockTransport};
/// use http::Method;
/// use serde_json::json;
///
/// # tokio_test::block_on(async {
/// let transport = MockTransport::new().reply(MockReply::json(&json!({"code": 0})));
/// let response = transport
///     .send(WireRequest::new(Method::GET, "echo"), None)
///     .await
///     .unwrap();
/// assert_eq!(response.status, 200);
/// assert_eq!(transport.request_count(), 1);
/// # });
/// ```
#[derive(Debug, Default)]
pub struct MockTransport {
    replies: Mutex<VecDeque<MockReply>>,
    fallback: Option<MockReply>,
    requests: Mutex<Vec<WireRequest>>,
}

impl MockTransport {
    /// Creates a transport with an empty script.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a reply to the script.
    #[must_use]
    pub fn reply(self, reply: MockReply) -> Self {
        self.replies.lock().push_back(reply);
        self
    }

    /// Sets the reply used once the script runs out.
    #[must_use]
    pub fn fallback(mut self, reply: MockReply) -> Self {
        self.fallback = Some(reply);
        self
    }

    /// Appends a reply to the script of a shared transport.
    pub fn push(&self, reply: MockReply) {
        self.replies.lock().push_back(reply);
    }

    /// Every request received so far.
    #[must_use]
    pub fn requests(&self) -> Vec<WireRequest> {
        self.requests.lock().clone()
    }

    /// The most recent request.
    #[must_use]
    pub fn last_request(&self) -> Option<WireRequest> {
        self.requests.lock().last().cloned()
    }

    /// Number of requests received.
    #[must_use]
    pub fn request_count(&self) -> usize {
        self.requests.lock().len()
    }

    /// Number of scripted replies not yet used.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.replies.lock().len()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn send(
        &self,
        request: WireRequest,
        timeout: Option<Duration>,
    ) -> Result<WireResponse, TransportError> {
        self.requests.lock().push(request);
        let reply = self.replies.lock().pop_front().or_else(|| self.fallback.clone());
        let Some(reply) = reply else {
            return Err(TransportError::Failed("no scripted reply".to_string()));
        };
        match timeout {
            Some(limit) => tokio::time::timeout(limit, reply.resolve())
                .await
                .unwrap_or(Err(TransportError::Timeout)),
            None => reply.resolve().await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::{Method, StatusCode};
    use serde_json::json;

    fn request() -> WireRequest {
        WireRequest::new(Method::GET, "users/7")
    }

    #[tokio::test]
    async fn test_script_order_and_capture() {
        let transport = MockTransport::new()
            .reply(MockReply::json(&json!({"code": 0})))
            .reply(MockReply::raw(StatusCode::BAD_GATEWAY, "oops"));

        let first = transport.send(request(), None).await.unwrap();
        assert_eq!(first.status, StatusCode::OK);
        let second = transport.send(request(), None).await.unwrap();
        assert_eq!(second.body, "oops");
        assert!(transport.send(request(), None).await.is_err());

        assert_eq!(transport.request_count(), 3);
        assert_eq!(transport.last_request().unwrap().path, "users/7");
    }

    #[tokio::test]
    async fn test_fallback() {
        let transport = MockTransport::new().fallback(MockReply::Unreachable("refused".into()));
        for _ in 0..2 {
            assert!(matches!(
                transport.send(request(), None).await,
                Err(TransportError::Unreachable(_))
            ));
        }
    }

    #[tokio::test]
    async fn test_delayed_reply_times_out() {
        let transport = MockTransport::new()
            .reply(MockReply::json(&json!({})).after(Duration::from_secs(10)));
        let result = transport
            .send(request(), Some(Duration::from_millis(20)))
            .await;
        assert!(matches!(result, Err(TransportError::Timeout)));
    }

    #[test]
    fn test_push_on_shared_transport() {
        let transport = std::sync::Arc::new(MockTransport::new());
        transport.push(MockReply::Timeout);
        assert_eq!(transport.remaining(), 1);
        let result = tokio_test::block_on(transport.send(request(), None));
        assert!(matches!(result, Err(TransportError::Timeout)));
        assert_eq!(transport.remaining(), 0);
    }
}
