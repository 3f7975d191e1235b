//! The JSON envelope every response travels in.
//!
//! ```json
//! {
//!   "code": 404,
//!   "status": "caller_not_found",
//!   "subcode": "user-42",
//!   "message": "Cannot find necessary data for 'users.get'.",
//!   "headers": { "x-trace": "1" },
//!   "return": { ... }
//! }
//! ```
//!
//! Every field is optional. A missing `return` means "no payload". Readers
//! accept `code` alone, `status` alone, or neither (the transport's HTTP
//! status then decides).

use crate::outcome::Outcome;
use crate::status::Status;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Name of the payload field.
pub const RETURN_FIELD: &str = "return";

/// The response envelope.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    /// Numeric status code.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<u16>,
    /// Symbolic status.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<Status>,
    /// Machine-readable subcode.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subcode: Option<String>,
    /// Human-readable message.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Headers the outcome carries.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub headers: BTreeMap<String, String>,
    /// The payload, already in wire form.
    #[serde(default, rename = "return", skip_serializing_if = "Option::is_none")]
    pub payload: Option<Value>,
}

impl Envelope {
    /// Reads an envelope from a parsed response node.
    ///
    /// # Errors
    ///
    /// Fails when the node is not an object or a field has the wrong shape.
    pub fn from_node(node: Value) -> Result<Self, serde_json::Error> {
        serde_json::from_value(node)
    }

    /// Builds the envelope for an outcome whose payload is already a node.
    #[must_use]
    pub fn from_outcome<T>(outcome: &Outcome<T>, payload: Option<Value>) -> Self {
        let status = outcome.status();
        Self {
            code: Some(status.code()),
            status: Some(status),
            subcode: outcome.subcode().map(str::to_string),
            message: outcome.message().map(str::to_string),
            headers: outcome.headers().clone(),
            payload,
        }
    }

    /// Resolves the status, preferring `status`, then `code`, then the
    /// transport's HTTP status.
    #[must_use]
    pub fn resolve_status(&self, transport_status: u16) -> Status {
        self.status
            .or_else(|| self.code.map(Status::from_code))
            .unwrap_or_else(|| Status::from_code(transport_status))
    }

    /// Returns the outer outcome: everything except the payload.
    #[must_use]
    pub fn outer<T>(&self, transport_status: u16) -> Outcome<T> {
        let mut outcome = Outcome::new(self.resolve_status(transport_status))
            .with_headers(self.headers.clone());
        if let Some(subcode) = &self.subcode {
            outcome = outcome.with_subcode(subcode.clone());
        }
        if let Some(message) = &self.message {
            outcome = outcome.with_message(message.clone());
        }
        outcome
    }

    /// Renders the envelope as a node.
    #[must_use]
    pub fn to_node(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_code_only() {
        let envelope = Envelope::from_node(json!({"code": 0, "return": "hi"})).unwrap();
        let outer: Outcome<()> = envelope.outer(200);
        assert_eq!(outer.status(), Status::OperationCompleted);
        assert_eq!(envelope.payload, Some(json!("hi")));
    }

    #[test]
    fn test_status_wins_over_code() {
        let envelope = Envelope::from_node(json!({
            "code": 200,
            "status": "caller_bad_state",
            "subcode": "locked",
        }))
        .unwrap();
        let outer: Outcome<()> = envelope.outer(200);
        assert_eq!(outer.status(), Status::CallerBadState);
        assert_eq!(outer.subcode(), Some("locked"));
    }

    #[test]
    fn test_falls_back_to_transport_status() {
        let envelope = Envelope::from_node(json!({})).unwrap();
        assert_eq!(envelope.resolve_status(404), Status::CallerNotFound);
        assert!(envelope.payload.is_none());
    }

    #[test]
    fn test_non_object_is_rejected() {
        assert!(Envelope::from_node(json!([1, 2])).is_err());
        assert!(Envelope::from_node(json!({"code": "abc"})).is_err());
    }

    #[test]
    fn test_render_omits_absent_fields() {
        let outcome: Outcome<()> = Outcome::completed();
        let node = Envelope::from_outcome(&outcome, None).to_node();
        assert_eq!(node, json!({"code": 200, "status": "operation_completed"}));

        let outcome: Outcome<()> = Outcome::failure(Status::CallerUnauthorized)
            .with_header("WWW-Authenticate", "default realm=\"users\"");
        let node = Envelope::from_outcome(&outcome, Some(json!(1))).to_node();
        assert_eq!(node["headers"]["WWW-Authenticate"], "default realm=\"users\"");
        assert_eq!(node[RETURN_FIELD], 1);
    }
}
