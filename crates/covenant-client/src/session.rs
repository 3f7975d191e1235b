//! One call of one operation.
//!
//! A [`CallSession`] is configured through chained setters, then executed
//! exactly once. Every value is translated to wire form as soon as it is
//! set; path values are translated and percent-encoded when the session is
//! created.
//!
//! Only programmer errors surface as [`UsageError`]. Transport failures,
//! timeouts, unparsable bodies and remote failures all come back from
//! [`execute`](CallSession::execute) as an [`Outcome`].

use crate::client::ContractClient;
use crate::error::UsageError;
use bytes::Bytes;
use covenant_contract::{Operation, Parameter, Slot};
use covenant_core::{
    CommunicationError, CommunicationKind, Envelope, Failure, FailureCategory, Native, Outcome,
    Semantic, TransportError, WireRequest,
};
use covenant_telemetry::record_call;
use http::header::{HeaderName, HeaderValue, ACCEPT, CONTENT_TYPE, COOKIE};
use http::{HeaderMap, Method};
use std::collections::BTreeMap;
use std::time::Instant;
use tracing::{debug, info};

/// Name of the query parameter carrying the contract version.
pub const VERSION_PARAMETER: &str = "version";

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Lifecycle of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Path values bound, nothing else set.
    Created,
    /// At least one parameter, verb or version set.
    Parameterized,
    /// Executed and a response was read; the session can no longer be used.
    Executed,
    /// Executed but the exchange failed; the session can no longer be used.
    Failed,
}

/// A single, not yet executed call.
///
/// Not meant to be shared between tasks; the client it came from is.
#[derive(Debug)]
pub struct CallSession<'a> {
    client: &'a ContractClient,
    operation: &'a Operation,
    state: SessionState,
    method: Method,
    path: String,
    version: Option<String>,
    query: Vec<(String, String)>,
    headers: HeaderMap,
    cookies: BTreeMap<String, String>,
    body: BTreeMap<String, String>,
}

impl<'a> CallSession<'a> {
    pub(crate) fn new(
        client: &'a ContractClient,
        operation: &'a Operation,
        path_values: Vec<Native>,
    ) -> Result<Self, UsageError> {
        let declared = operation.path_parameters();
        if declared.len() != path_values.len() {
            return Err(UsageError::PathArity {
                operation: operation.qualified_name(),
                expected: declared.len(),
                actual: path_values.len(),
            });
        }

        let encoded = declared
            .iter()
            .zip(&path_values)
            .map(|(parameter, value)| {
                wire(operation, parameter, value).map(|text| urlencoding::encode(&text).into_owned())
            })
            .collect::<Result<Vec<_>, _>>()?;

        let method = operation
            .verbs()
            .first()
            .cloned()
            .unwrap_or(Method::GET);

        Ok(Self {
            client,
            operation,
            state: SessionState::Created,
            method,
            path: operation.render_url(&encoded),
            version: None,
            query: Vec::new(),
            headers: client.default_headers.clone(),
            cookies: BTreeMap::new(),
            body: BTreeMap::new(),
        })
    }

    /// The operation being called.
    #[must_use]
    pub fn operation(&self) -> &'a Operation {
        self.operation
    }

    /// Current lifecycle state.
    #[must_use]
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// The verb that will be used.
    #[must_use]
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// The rendered path, root path included.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Chooses one of the operation's declared verbs.
    ///
    /// # Errors
    ///
    /// Fails if the verb is not declared or the session was executed.
    pub fn set_verb(&mut self, method: Method) -> Result<&mut Self, UsageError> {
        self.ensure_open()?;
        if !self.operation.verbs().contains(&method) {
            return Err(UsageError::UnsupportedVerb {
                operation: self.operation.qualified_name(),
                verb: method.to_string(),
            });
        }
        self.method = method;
        self.state = SessionState::Parameterized;
        Ok(self)
    }

    /// Overrides the version sent with the call (the newest declared one by
    /// default).
    ///
    /// # Errors
    ///
    /// Fails if the session was executed.
    pub fn set_version(&mut self, version: impl Into<String>) -> Result<&mut Self, UsageError> {
        self.ensure_open()?;
        self.version = Some(version.into());
        self.state = SessionState::Parameterized;
        Ok(self)
    }

    /// Sets a query parameter.
    ///
    /// # Errors
    ///
    /// Fails if the operation declares no such query parameter, the value
    /// cannot be translated or the session was executed.
    pub fn set_query_parameter<V: Semantic>(
        &mut self,
        name: &str,
        value: V,
    ) -> Result<&mut Self, UsageError> {
        self.set_typed(Slot::Query, name, value)
    }

    /// Sets a form body field.
    ///
    /// # Errors
    ///
    /// Same as [`set_query_parameter`](Self::set_query_parameter).
    pub fn set_body_parameter<V: Semantic>(
        &mut self,
        name: &str,
        value: V,
    ) -> Result<&mut Self, UsageError> {
        self.set_typed(Slot::Body, name, value)
    }

    /// Sets a header parameter.
    ///
    /// # Errors
    ///
    /// Same as [`set_query_parameter`](Self::set_query_parameter), and fails
    /// if the wire text is not a valid header value.
    pub fn set_header_parameter<V: Semantic>(
        &mut self,
        name: &str,
        value: V,
    ) -> Result<&mut Self, UsageError> {
        self.set_typed(Slot::Header, name, value)
    }

    /// Sets a cookie parameter.
    ///
    /// # Errors
    ///
    /// Same as [`set_query_parameter`](Self::set_query_parameter).
    pub fn set_cookie_parameter<V: Semantic>(
        &mut self,
        name: &str,
        value: V,
    ) -> Result<&mut Self, UsageError> {
        self.set_typed(Slot::Cookie, name, value)
    }

    fn set_typed<V: Semantic>(
        &mut self,
        slot: Slot,
        name: &str,
        value: V,
    ) -> Result<&mut Self, UsageError> {
        let native = value
            .into_native()
            .map_err(|source| UsageError::Translation {
                operation: self.operation.qualified_name(),
                parameter: name.to_string(),
                source,
            })?;
        self.set_parameter(slot, name, &native)
    }

    /// Sets a named parameter from a native value.
    ///
    /// Path parameters are positional and cannot be set this way.
    ///
    /// # Errors
    ///
    /// Fails if the slot has no such parameter, the value cannot be
    /// translated or the session was executed. State is unchanged on
    /// failure.
    pub fn set_parameter(
        &mut self,
        slot: Slot,
        name: &str,
        value: &Native,
    ) -> Result<&mut Self, UsageError> {
        self.ensure_open()?;
        let parameter = match slot {
            Slot::Path => None,
            _ => self.operation.parameter(slot, name),
        }
        .ok_or_else(|| UsageError::UnknownParameter {
            operation: self.operation.qualified_name(),
            slot,
            name: name.to_string(),
        })?;
        let text = wire(self.operation, parameter, value)?;

        match slot {
            Slot::Query => {
                self.query.retain(|(key, _)| key != name);
                self.query.push((name.to_string(), text));
            }
            Slot::Header => {
                let invalid = |reason: String| UsageError::InvalidHeader {
                    name: name.to_string(),
                    reason,
                };
                let header =
                    HeaderName::from_bytes(name.as_bytes()).map_err(|e| invalid(e.to_string()))?;
                let value = HeaderValue::from_str(&text).map_err(|e| invalid(e.to_string()))?;
                self.headers.insert(header, value);
            }
            Slot::Cookie => {
                self.cookies
                    .insert(name.to_string(), urlencoding::encode(&text).into_owned());
            }
            Slot::Body => {
                self.body.insert(name.to_string(), text);
            }
            Slot::Path => unreachable!("path parameters are rejected above"),
        }
        self.state = SessionState::Parameterized;
        Ok(self)
    }

    fn ensure_open(&self) -> Result<(), UsageError> {
        if matches!(self.state, SessionState::Executed | SessionState::Failed) {
            return Err(UsageError::AlreadyExecuted {
                operation: self.operation.qualified_name(),
            });
        }
        Ok(())
    }

    /// Sends the call and interprets the response.
    ///
    /// Failures after this point never surface as errors: they are
    /// classified and mapped to an outcome by the client's
    /// [`FailureMapper`](covenant_contract::FailureMapper).
    ///
    /// # Errors
    ///
    /// Fails only if the session was already executed.
    pub async fn execute(&mut self) -> Result<Outcome, UsageError> {
        self.ensure_open()?;
        self.state = SessionState::Executed;

        let contract = self.client.contract.name().to_string();
        info!(
            contract = %contract,
            operation = %self.operation.name(),
            url = %self.path,
            "Executing resource method '{}' from contract '{}'",
            self.operation.name(),
            contract
        );

        let started = Instant::now();
        let outcome = match self.exchange().await {
            Ok(outcome) => outcome,
            Err(failure) => {
                self.state = SessionState::Failed;
                self.client.mapper.to_result(self.operation, &failure)
            }
        };
        let elapsed = started.elapsed();

        info!(
            contract = %contract,
            operation = %self.operation.name(),
            status = %outcome.status(),
            elapsed_ms = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX),
            "Executed resource method"
        );
        record_call(
            &contract,
            self.operation.name(),
            outcome.status().as_str(),
            elapsed,
        );
        Ok(outcome)
    }

    /// Executes and converts the payload to `T`.
    ///
    /// A payload that does not convert is reported as a translation failure
    /// outcome without payload.
    ///
    /// # Errors
    ///
    /// Fails only if the session was already executed.
    pub async fn execute_typed<T: Semantic>(&mut self) -> Result<Outcome<T>, UsageError> {
        let outcome = self.execute().await?;
        Ok(match outcome.try_map_payload(T::from_native) {
            Ok(typed) => typed,
            Err(err) => {
                let failure = Failure::from(err);
                debug!(operation = %self.operation.name(), error = %failure, "Payload type mismatch");
                self.client.mapper.to_result(self.operation, &failure).retype()
            }
        })
    }

    fn build_request(&mut self) -> Result<WireRequest, Failure> {
        let mut request = WireRequest::new(self.method.clone(), self.path.clone());

        let version = self
            .version
            .clone()
            .or_else(|| self.operation.newest_version().map(str::to_string));
        if let Some(version) = version {
            request.query.push((VERSION_PARAMETER.to_string(), version));
        }
        request.query.extend(self.query.iter().cloned());

        request.headers = self.headers.clone();
        if let Ok(accept) = HeaderValue::from_str(self.client.codec.content_type()) {
            request.headers.entry(ACCEPT).or_insert(accept);
        }
        if !self.cookies.is_empty() {
            let cookie = self
                .cookies
                .iter()
                .map(|(name, value)| format!("{name}={value}"))
                .collect::<Vec<_>>()
                .join("; ");
            let cookie = HeaderValue::from_str(&cookie).map_err(|e| {
                Failure::new(FailureCategory::Translation, "cookie header is not valid")
                    .with_source(e)
            })?;
            request.headers.insert(COOKIE, cookie);
        }

        if !self.body.is_empty() {
            let form = serde_urlencoded::to_string(&self.body).map_err(|e| {
                Failure::new(FailureCategory::Translation, "cannot encode form body")
                    .with_source(e)
            })?;
            request
                .headers
                .insert(CONTENT_TYPE, HeaderValue::from_static(FORM_CONTENT_TYPE));
            request.body = Some(Bytes::from(form));
        }
        Ok(request)
    }

    async fn exchange(&mut self) -> Result<Outcome, Failure> {
        let request = self.build_request()?;
        let url = self.path.clone();
        let timeout = self.client.timeout;

        let send = self.client.transport.send(request, timeout);
        let sent = match timeout {
            Some(limit) => tokio::time::timeout(limit, send)
                .await
                .unwrap_or(Err(TransportError::Timeout)),
            None => send.await,
        };
        let response = sent.map_err(|e| communication_failure(&url, e))?;

        let node = if response.body.iter().all(u8::is_ascii_whitespace) {
            serde_json::Value::Object(serde_json::Map::new())
        } else {
            self.client
                .codec
                .parse(&response.body)
                .map_err(|e| CommunicationError::invalid_response(&url).with_source(e))?
        };
        let envelope = Envelope::from_node(node)
            .map_err(|e| CommunicationError::unexpected_data(&url).with_source(e))?;

        let outer: Outcome = envelope.outer(response.status.as_u16());
        let payload = match (&envelope.payload, self.operation.returns()) {
            (Some(node), Some(returns)) => returns
                .translator()
                .node_to_native(node)
                .map_err(|e| CommunicationError::unexpected_data(&url).with_source(e))?,
            _ => None,
        };
        Ok(match payload {
            Some(payload) => outer.with_payload(payload),
            None => outer,
        })
    }
}

fn wire(operation: &Operation, parameter: &Parameter, value: &Native) -> Result<String, UsageError> {
    parameter
        .translator()
        .to_wire(value)
        .map_err(|source| UsageError::Translation {
            operation: operation.qualified_name(),
            parameter: parameter.name().to_string(),
            source,
        })
}

fn communication_failure(url: &str, err: TransportError) -> Failure {
    let error = match &err {
        TransportError::Timeout => CommunicationError::timeout(url),
        TransportError::Unreachable(_) => CommunicationError::unreachable(url),
        TransportError::Failed(reason) => CommunicationError::new(
            CommunicationKind::Failed,
            format!("Communication with '{url}' failed: {reason}"),
        ),
    };
    Failure::from(error.with_source(err))
}
