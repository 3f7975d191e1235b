//! The structured outcome of an invocation.

use crate::native::Native;
use crate::status::Status;
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt;
use std::sync::Arc;

/// Shared error cause attached to an outcome.
pub type Cause = Arc<dyn Error + Send + Sync>;

/// The structured outcome of an invocation.
///
/// Built directly by an operation body or synthesized by the failure mapper.
/// A non-success outcome may still carry a payload.
///
/// # Example
///
/// ```
/// use covenant_core::{Outcome, Status};
///
/// let outcome: Outcome<String> = Outcome::failure(Status::CallerNotFound)
///     .with_subcode("user-42")
///     .with_message("no such user");
/// assert!(!outcome.is_success());
/// assert_eq!(outcome.subcode(), Some("user-42"));
/// ```
#[derive(Clone)]
pub struct Outcome<T = Native> {
    status: Status,
    subcode: Option<String>,
    message: Option<String>,
    payload: Option<T>,
    headers: BTreeMap<String, String>,
    cause: Option<Cause>,
}

impl<T> Outcome<T> {
    /// Creates an outcome with the given status and nothing else.
    #[must_use]
    pub fn new(status: Status) -> Self {
        Self {
            status,
            subcode: None,
            message: None,
            payload: None,
            headers: BTreeMap::new(),
            cause: None,
        }
    }

    /// A completed outcome carrying `payload`.
    #[must_use]
    pub fn success(payload: T) -> Self {
        Self::new(Status::OperationCompleted).with_payload(payload)
    }

    /// A completed outcome without a payload.
    #[must_use]
    pub fn completed() -> Self {
        Self::new(Status::OperationCompleted)
    }

    /// A failed outcome with the given status.
    #[must_use]
    pub fn failure(status: Status) -> Self {
        Self::new(status)
    }

    /// Sets the status.
    #[must_use]
    pub fn with_status(mut self, status: Status) -> Self {
        self.status = status;
        self
    }

    /// Sets the subcode.
    #[must_use]
    pub fn with_subcode(mut self, subcode: impl Into<String>) -> Self {
        self.subcode = Some(subcode.into());
        self
    }

    /// Sets the message.
    #[must_use]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Sets the payload.
    #[must_use]
    pub fn with_payload(mut self, payload: T) -> Self {
        self.payload = Some(payload);
        self
    }

    /// Adds a header.
    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Replaces all headers.
    #[must_use]
    pub fn with_headers(mut self, headers: BTreeMap<String, String>) -> Self {
        self.headers = headers;
        self
    }

    /// Attaches a cause.
    #[must_use]
    pub fn with_cause(mut self, cause: impl Error + Send + Sync + 'static) -> Self {
        self.cause = Some(Arc::new(cause));
        self
    }

    /// Attaches an already shared cause.
    #[must_use]
    pub fn with_shared_cause(mut self, cause: Cause) -> Self {
        self.cause = Some(cause);
        self
    }

    /// Returns the status.
    #[must_use]
    pub fn status(&self) -> Status {
        self.status
    }

    /// Returns `true` if the status is in the success family.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// Returns the subcode.
    #[must_use]
    pub fn subcode(&self) -> Option<&str> {
        self.subcode.as_deref()
    }

    /// Returns the message.
    #[must_use]
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    /// Returns the payload.
    #[must_use]
    pub fn payload(&self) -> Option<&T> {
        self.payload.as_ref()
    }

    /// Takes the payload out.
    pub fn take_payload(&mut self) -> Option<T> {
        self.payload.take()
    }

    /// Consumes the outcome and returns the payload.
    pub fn into_payload(self) -> Option<T> {
        self.payload
    }

    /// Returns the headers.
    #[must_use]
    pub fn headers(&self) -> &BTreeMap<String, String> {
        &self.headers
    }

    /// Returns a header value.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).map(String::as_str)
    }

    /// Returns the cause.
    #[must_use]
    pub fn cause(&self) -> Option<&Cause> {
        self.cause.as_ref()
    }

    /// Converts the payload type, keeping everything else.
    pub fn map_payload<U, F>(self, f: F) -> Outcome<U>
    where
        F: FnOnce(T) -> U,
    {
        Outcome {
            status: self.status,
            subcode: self.subcode,
            message: self.message,
            payload: self.payload.map(f),
            headers: self.headers,
            cause: self.cause,
        }
    }

    /// Converts the payload type through a fallible function.
    ///
    /// # Errors
    ///
    /// Returns the first error produced by `f`.
    pub fn try_map_payload<U, E, F>(self, f: F) -> Result<Outcome<U>, E>
    where
        F: FnOnce(T) -> Result<U, E>,
    {
        let payload = self.payload.map(f).transpose()?;
        Ok(Outcome {
            status: self.status,
            subcode: self.subcode,
            message: self.message,
            payload,
            headers: self.headers,
            cause: self.cause,
        })
    }

    /// Drops the payload and retypes the outcome.
    #[must_use]
    pub fn retype<U>(self) -> Outcome<U> {
        Outcome {
            status: self.status,
            subcode: self.subcode,
            message: self.message,
            payload: None,
            headers: self.headers,
            cause: self.cause,
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Outcome<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Outcome")
            .field("status", &self.status)
            .field("subcode", &self.subcode)
            .field("message", &self.message)
            .field("payload", &self.payload)
            .field("headers", &self.headers)
            .field("cause", &self.cause.as_ref().map(ToString::to_string))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TranslationError;

    #[test]
    fn test_success() {
        let outcome = Outcome::success(Native::Text("hi".into()));
        assert_eq!(outcome.status(), Status::OperationCompleted);
        assert_eq!(outcome.payload(), Some(&Native::Text("hi".into())));
    }

    #[test]
    fn test_failure_with_payload_is_legal() {
        let outcome = Outcome::failure(Status::CallerBadState).with_payload(3);
        assert!(!outcome.is_success());
        assert_eq!(outcome.payload(), Some(&3));
    }

    #[test]
    fn test_retype_keeps_metadata() {
        let outcome: Outcome<i32> = Outcome::failure(Status::LocalError)
            .with_subcode("boom")
            .with_header("x-trace", "1")
            .with_cause(TranslationError::unsupported("x"))
            .with_payload(1);
        let retyped: Outcome<String> = outcome.retype();
        assert_eq!(retyped.subcode(), Some("boom"));
        assert_eq!(retyped.header("x-trace"), Some("1"));
        assert!(retyped.cause().is_some());
        assert!(retyped.payload().is_none());
    }

    #[test]
    fn test_try_map_payload() {
        let outcome = Outcome::success("12".to_string());
        let mapped = outcome.try_map_payload(|s| s.parse::<i32>()).unwrap();
        assert_eq!(mapped.into_payload(), Some(12));

        let outcome = Outcome::success("x".to_string());
        assert!(outcome.try_map_payload(|s| s.parse::<i32>()).is_err());
    }
}
