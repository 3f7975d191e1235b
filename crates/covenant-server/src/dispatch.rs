//! Running an operation body and rendering its outcome.

use crate::inbound::InboundRequest;
use crate::invocation::Invocation;
use bytes::Bytes;
use covenant_contract::{FailureMapper, Operation};
use covenant_core::{Envelope, Failure, JsonCodec, Outcome, Status, WireCodec};
use futures_util::FutureExt;
use http::header::{HeaderName, HeaderValue, CONTENT_TYPE};
use http::Response;
use serde_json::Value;
use std::any::Any;
use std::fmt;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, warn};

/// Category given to a body that panicked.
pub const PANIC_CATEGORY: &str = "panic";

/// Turns inbound calls into rendered envelopes.
///
/// Dispatch never fails: parameter errors, body failures, panicking bodies
/// and payloads that cannot be translated all end up as an envelope with the
/// matching status.
///
/// # Example
///
/// ```ignore
/// let dispatcher = Dispatcher::new();
/// let response = dispatcher
///     .dispatch(operation, &inbound, |mut invocation| async move {
///         let id: i64 = invocation.require(Slot::Path, "id")?;
///         let user = users.find(id).ok_or_else(|| Failure::not_found(id.to_string(), "no such user"))?;
///         Ok(Outcome::success(Native::Document(user)))
///     })
///     .await;
/// ```
#[derive(Clone)]
pub struct Dispatcher {
    codec: Arc<dyn WireCodec>,
    mapper: Arc<FailureMapper>,
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl Dispatcher {
    /// JSON codec and the built-in failure handlers.
    #[must_use]
    pub fn new() -> Self {
        Self {
            codec: Arc::new(JsonCodec),
            mapper: Arc::new(FailureMapper::new()),
        }
    }

    /// Replaces the codec.
    #[must_use]
    pub fn with_codec(mut self, codec: Arc<dyn WireCodec>) -> Self {
        self.codec = codec;
        self
    }

    /// Replaces the failure mapper.
    #[must_use]
    pub fn with_mapper(mut self, mapper: Arc<FailureMapper>) -> Self {
        self.mapper = mapper;
        self
    }

    /// Reads the parameters, runs `body` and renders the outcome.
    ///
    /// A successful plain-completed outcome is sent with the operation's
    /// declared success status. A body that panics is reported as an
    /// unhandled `panic` failure.
    pub async fn dispatch<F, Fut>(
        &self,
        operation: &Operation,
        inbound: &InboundRequest,
        body: F,
    ) -> Response<Bytes>
    where
        F: FnOnce(Invocation) -> Fut,
        Fut: Future<Output = Result<Outcome, Failure>>,
    {
        info!(
            operation = %operation.qualified_name(),
            "Dispatching resource method '{}'",
            operation.name()
        );
        let started = Instant::now();

        let result = match Invocation::read(operation, inbound) {
            Ok(invocation) => AssertUnwindSafe(body(invocation))
                .catch_unwind()
                .await
                .unwrap_or_else(|panic| Err(panicked(operation, panic.as_ref()))),
            Err(failure) => Err(failure),
        };
        let outcome = match result {
            Ok(outcome) if outcome.status() == Status::OperationCompleted => {
                outcome.with_status(operation.success_status())
            }
            Ok(outcome) => outcome,
            Err(failure) => self.mapper.to_result(operation, &failure),
        };

        let response = self.render(operation, outcome);
        info!(
            operation = %operation.qualified_name(),
            status = response.status().as_u16(),
            elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX),
            "Dispatched resource method"
        );
        response
    }

    /// Renders an outcome as an envelope response.
    ///
    /// The payload goes through the operation's return translator. A payload
    /// that cannot be translated turns the outcome into a translation
    /// failure; a payload on an operation without a return type is dropped.
    pub fn render(&self, operation: &Operation, outcome: Outcome) -> Response<Bytes> {
        let node = match (outcome.payload(), operation.returns()) {
            (Some(payload), Some(returns)) => match returns.translator().native_to_node(payload) {
                Ok(node) => Some(node),
                Err(err) => {
                    let failure = Failure::from(err);
                    let outcome = self.mapper.to_result(operation, &failure);
                    return self.envelope_response(&outcome, None);
                }
            },
            (Some(_), None) => {
                debug!(
                    operation = %operation.qualified_name(),
                    "Dropping payload of an operation without a return type"
                );
                None
            }
            (None, _) => None,
        };
        self.envelope_response(&outcome, node)
    }

    fn envelope_response(&self, outcome: &Outcome, payload: Option<Value>) -> Response<Bytes> {
        let envelope = Envelope::from_outcome(outcome, payload);
        let body = match self.codec.render(&envelope.to_node()) {
            Ok(bytes) => Bytes::from(bytes),
            Err(err) => {
                error!(error = %err, "Cannot render envelope");
                Bytes::new()
            }
        };

        let mut response = Response::new(body);
        *response.status_mut() = outcome.status().http_status();
        let headers = response.headers_mut();
        if let Ok(content_type) = HeaderValue::from_str(self.codec.content_type()) {
            headers.insert(CONTENT_TYPE, content_type);
        }
        for (name, value) in outcome.headers() {
            match (
                HeaderName::from_bytes(name.as_bytes()),
                HeaderValue::from_str(value),
            ) {
                (Ok(name), Ok(value)) => {
                    headers.insert(name, value);
                }
                _ => warn!(header = %name, "Skipping invalid outcome header"),
            }
        }
        response
    }
}

fn panicked(operation: &Operation, panic: &(dyn Any + Send)) -> Failure {
    let reason = panic
        .downcast_ref::<&str>()
        .map(|s| (*s).to_string())
        .or_else(|| panic.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic".to_string());
    error!(
        operation = %operation.qualified_name(),
        panic = %reason,
        "Resource method panicked"
    );
    Failure::other(PANIC_CATEGORY, format!("'{}' panicked: {reason}", operation.qualified_name()))
}

impl fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dispatcher")
            .field("content_type", &self.codec.content_type())
            .field("mapper", &self.mapper)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use covenant_contract::{fixtures, Slot};
    use covenant_core::Native;
    use serde_json::json;
    use std::sync::atomic::{AtomicBool, Ordering};

    fn envelope(response: &Response<Bytes>) -> Value {
        serde_json::from_slice(response.body()).unwrap()
    }

    async fn echo_body(mut invocation: Invocation) -> Result<Outcome, Failure> {
        let value: String = invocation.require(Slot::Query, "value")?;
        Ok(Outcome::success(Native::Text(value)))
    }

    #[tokio::test]
    async fn test_success_envelope() {
        let contract = fixtures::echo_contract().unwrap();
        let operation = contract.operation("echo").unwrap();
        let inbound = InboundRequest::new().with_query("value", "hi");

        let response = Dispatcher::new()
            .dispatch(operation, &inbound, echo_body)
            .await;

        assert_eq!(response.status(), http::StatusCode::OK);
        assert_eq!(response.headers()[CONTENT_TYPE], "application/json");
        assert_eq!(
            envelope(&response),
            json!({ "code": 200, "status": "operation_completed", "return": "hi" })
        );
    }

    #[tokio::test]
    async fn test_declared_success_status() {
        let contract = fixtures::user_service_contract().unwrap();
        let operation = contract.operation("create_user").unwrap();
        let inbound = InboundRequest::new()
            .with_body_field("name", "Ada")
            .with_body_field("email", "ada@example.com");

        let response = Dispatcher::new()
            .dispatch(operation, &inbound, |_| async {
                Ok::<Outcome, Failure>(Outcome::success(Native::Document(json!({ "id": 1 }))))
            })
            .await;

        assert_eq!(response.status(), http::StatusCode::CREATED);
        let node = envelope(&response);
        assert_eq!(node["status"], "operation_created");
        assert_eq!(node["return"], json!({ "id": 1 }));
    }

    #[tokio::test]
    async fn test_invalid_parameter_skips_body() {
        let contract = fixtures::user_service_contract().unwrap();
        let operation = contract.operation("get_user").unwrap();
        let inbound = InboundRequest::new().with_path("id", "abc");

        let ran = Arc::new(AtomicBool::new(false));
        let flag = ran.clone();
        let response = Dispatcher::new()
            .dispatch(operation, &inbound, |_| async move {
                flag.store(true, Ordering::SeqCst);
                Ok::<Outcome, Failure>(Outcome::completed())
            })
            .await;

        assert!(!ran.load(Ordering::SeqCst));
        assert_eq!(response.status(), http::StatusCode::BAD_REQUEST);
        let node = envelope(&response);
        assert_eq!(node["status"], "caller_bad_input");
        assert_eq!(node["subcode"], "id");
    }

    #[tokio::test]
    async fn test_body_failure_is_mapped() {
        let contract = fixtures::user_service_contract().unwrap();
        let operation = contract.operation("get_user").unwrap();
        let inbound = InboundRequest::new().with_path("id", "42");

        let response = Dispatcher::new()
            .dispatch(operation, &inbound, |_| async {
                Err::<Outcome, _>(Failure::not_found("user-42", "no such user"))
            })
            .await;

        assert_eq!(response.status(), http::StatusCode::NOT_FOUND);
        let node = envelope(&response);
        assert_eq!(node["subcode"], "user-42");
        assert!(node.get("return").is_none());
    }

    #[tokio::test]
    async fn test_body_panic_is_mapped() {
        let contract = fixtures::echo_contract().unwrap();
        let operation = contract.operation("echo").unwrap();
        let inbound = InboundRequest::new().with_query("value", "hi");

        let response = Dispatcher::new()
            .dispatch(operation, &inbound, |_| async {
                if inbound.value(Slot::Query, "value").is_some() {
                    panic!("body blew up");
                }
                Ok::<Outcome, Failure>(Outcome::completed())
            })
            .await;

        assert_eq!(response.status(), http::StatusCode::INTERNAL_SERVER_ERROR);
        let node = envelope(&response);
        assert_eq!(node["status"], "local_error");
        assert_eq!(node["subcode"], "unhandled_failure");
        assert!(node["message"].as_str().unwrap().contains("'panic'"));
        assert!(node.get("return").is_none());
    }

    #[test]
    fn test_outcome_headers_rendered() {
        let contract = fixtures::user_service_contract().unwrap();
        let operation = contract.operation("get_user").unwrap();
        let inbound = InboundRequest::new().with_path("id", "42");

        let response = tokio_test::block_on(Dispatcher::new().dispatch(
            operation,
            &inbound,
            |_| async { Err::<Outcome, _>(Failure::unauthorized("token expired")) },
        ));

        assert_eq!(response.status(), http::StatusCode::UNAUTHORIZED);
        assert!(response.headers().contains_key(http::header::WWW_AUTHENTICATE));
    }

    #[test]
    fn test_untranslatable_payload() {
        let contract = fixtures::echo_contract().unwrap();
        let operation = contract.operation("echo").unwrap();

        let response = Dispatcher::new().render(operation, Outcome::success(Native::I32(5)));

        assert_eq!(response.status(), http::StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(envelope(&response)["subcode"], "translation_failure");
    }

    #[test]
    fn test_payload_dropped_without_return_type() {
        let contract = fixtures::user_service_contract().unwrap();
        let operation = contract.operation("delete_user").unwrap();

        let response =
            Dispatcher::new().render(operation, Outcome::success(Native::Text("gone".into())));

        assert_eq!(response.status(), http::StatusCode::OK);
        assert!(envelope(&response).get("return").is_none());
    }
}
