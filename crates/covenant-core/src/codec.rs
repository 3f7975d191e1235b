//! Wire codec collaborator.

use serde_json::Value;
use thiserror::Error;

/// The body could not be parsed or rendered.
#[derive(Error, Debug)]
#[error("codec error: {0}")]
pub struct CodecError(#[from] serde_json::Error);

/// Turns raw bytes into a generic node tree and back.
pub trait WireCodec: Send + Sync {
    /// Content type of rendered bodies.
    fn content_type(&self) -> &'static str;

    /// Parses bytes into a node.
    ///
    /// # Errors
    ///
    /// Fails when the bytes are not a valid document.
    fn parse(&self, bytes: &[u8]) -> Result<Value, CodecError>;

    /// Renders a node into bytes.
    ///
    /// # Errors
    ///
    /// Fails when the node cannot be rendered.
    fn render(&self, node: &Value) -> Result<Vec<u8>, CodecError>;

    /// Returns `true` if the node is a primitive scalar rather than a composite.
    fn is_primitive(&self, node: &Value) -> bool {
        !matches!(node, Value::Array(_) | Value::Object(_))
    }

    /// Returns a named field of an object node.
    fn field<'a>(&self, node: &'a Value, name: &str) -> Option<&'a Value> {
        node.as_object().and_then(|object| object.get(name))
    }
}

/// JSON codec backed by `serde_json`.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

impl WireCodec for JsonCodec {
    fn content_type(&self) -> &'static str {
        "application/json"
    }

    fn parse(&self, bytes: &[u8]) -> Result<Value, CodecError> {
        Ok(serde_json::from_slice(bytes)?)
    }

    fn render(&self, node: &Value) -> Result<Vec<u8>, CodecError> {
        Ok(serde_json::to_vec(node)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_and_field() {
        let codec = JsonCodec;
        let node = codec.parse(br#"{"code":0,"return":[1,2]}"#).unwrap();
        assert!(codec.is_primitive(codec.field(&node, "code").unwrap()));
        assert!(!codec.is_primitive(codec.field(&node, "return").unwrap()));
        assert!(codec.field(&node, "missing").is_none());
    }

    #[test]
    fn test_garbage_is_rejected() {
        assert!(JsonCodec.parse(b"<html>oops</html>").is_err());
    }

    #[test]
    fn test_render() {
        let bytes = JsonCodec.render(&json!({"a": 1})).unwrap();
        assert_eq!(bytes, br#"{"a":1}"#);
    }
}
