//! Translator traits and the JSON chain adapters.
//!
//! A translator converts one native type to and from its wire text. The two
//! directions are separate traits so either can be invoked (or registered)
//! on its own; [`Translator`] pairs them.
//!
//! Response payloads arrive as JSON nodes rather than text. The chain
//! adapters [`node_to_native`] and [`native_to_node`] bridge the two:
//!
//! | Node | Text handed to [`FromWire`] |
//! |---|---|
//! | string | the string value |
//! | other primitive | its JSON rendering (`12`, `true`) |
//! | array / object | compact JSON text |
//! | null | nothing, the value is absent |

use covenant_core::{Native, TranslationResult};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

/// How a translator's wire text becomes a JSON node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NodeForm {
    /// The text is carried as a JSON string.
    #[default]
    Text,
    /// The text is itself JSON (numbers, booleans, documents).
    Literal,
}

/// Converts native values to wire text.
pub trait ToWire: Send + Sync {
    /// Renders a native value.
    ///
    /// # Errors
    ///
    /// Fails when the value is not of the type this translator handles.
    fn to_wire(&self, value: &Native) -> TranslationResult<String>;

    /// How the text is embedded in a JSON node.
    fn node_form(&self) -> NodeForm {
        NodeForm::Text
    }
}

/// Converts wire text to native values.
pub trait FromWire: Send + Sync {
    /// Parses wire text.
    ///
    /// # Errors
    ///
    /// Fails on malformed or out-of-range input, or when the translator has
    /// no inbound direction.
    fn from_wire(&self, text: &str) -> TranslationResult<Native>;
}

/// Reads a JSON node through a [`FromWire`]. Null yields `None`.
///
/// # Errors
///
/// Propagates the translator's failure.
pub fn node_to_native(from: &dyn FromWire, node: &Value) -> TranslationResult<Option<Native>> {
    match node {
        Value::Null => Ok(None),
        Value::String(text) => from.from_wire(text).map(Some),
        other => from.from_wire(&other.to_string()).map(Some),
    }
}

/// Writes a native value as a JSON node through a [`ToWire`].
///
/// # Errors
///
/// Propagates the translator's failure.
pub fn native_to_node(to: &dyn ToWire, value: &Native) -> TranslationResult<Value> {
    let text = to.to_wire(value)?;
    Ok(match to.node_form() {
        NodeForm::Text => Value::String(text),
        NodeForm::Literal => serde_json::from_str(&text).unwrap_or(Value::String(text)),
    })
}

/// A pair of outbound and inbound translators for one descriptor.
#[derive(Clone)]
pub struct Translator {
    outbound: Arc<dyn ToWire>,
    inbound: Arc<dyn FromWire>,
}

impl Translator {
    /// Pairs two translators.
    #[must_use]
    pub fn new(outbound: Arc<dyn ToWire>, inbound: Arc<dyn FromWire>) -> Self {
        Self { outbound, inbound }
    }

    /// Uses one value for both directions.
    #[must_use]
    pub fn of<T>(translator: T) -> Self
    where
        T: ToWire + FromWire + 'static,
    {
        let shared = Arc::new(translator);
        Self {
            outbound: shared.clone(),
            inbound: shared,
        }
    }

    /// The outbound half.
    #[must_use]
    pub fn outbound(&self) -> &Arc<dyn ToWire> {
        &self.outbound
    }

    /// The inbound half.
    #[must_use]
    pub fn inbound(&self) -> &Arc<dyn FromWire> {
        &self.inbound
    }

    /// Renders a native value as wire text.
    ///
    /// # Errors
    ///
    /// See [`ToWire::to_wire`].
    pub fn to_wire(&self, value: &Native) -> TranslationResult<String> {
        self.outbound.to_wire(value)
    }

    /// Parses wire text.
    ///
    /// # Errors
    ///
    /// See [`FromWire::from_wire`].
    pub fn from_wire(&self, text: &str) -> TranslationResult<Native> {
        self.inbound.from_wire(text)
    }

    /// Reads a JSON node.
    ///
    /// # Errors
    ///
    /// See [`node_to_native`].
    pub fn node_to_native(&self, node: &Value) -> TranslationResult<Option<Native>> {
        node_to_native(self.inbound.as_ref(), node)
    }

    /// Writes a JSON node.
    ///
    /// # Errors
    ///
    /// See [`native_to_node`].
    pub fn native_to_node(&self, value: &Native) -> TranslationResult<Value> {
        native_to_node(self.outbound.as_ref(), value)
    }
}

impl fmt::Debug for Translator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Translator")
            .field("node_form", &self.outbound.node_form())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::numeric::IntegerTranslator;
    use crate::text::TextTranslator;
    use serde_json::json;

    #[test]
    fn test_node_to_native_primitive_and_string() {
        let ints = Translator::of(IntegerTranslator::<i64>::strict());
        assert_eq!(ints.node_to_native(&json!(12)).unwrap(), Some(Native::I64(12)));
        assert_eq!(ints.node_to_native(&json!("12")).unwrap(), Some(Native::I64(12)));
        assert_eq!(ints.node_to_native(&Value::Null).unwrap(), None);
    }

    #[test]
    fn test_composite_node_becomes_compact_text() {
        let text = Translator::of(TextTranslator);
        assert_eq!(
            text.node_to_native(&json!({"a": [1, 2]})).unwrap(),
            Some(Native::Text(r#"{"a":[1,2]}"#.into()))
        );
    }

    #[test]
    fn test_native_to_node_respects_form() {
        let ints = Translator::of(IntegerTranslator::<i32>::strict());
        assert_eq!(ints.native_to_node(&Native::I32(5)).unwrap(), json!(5));

        let text = Translator::of(TextTranslator);
        assert_eq!(text.native_to_node(&Native::Text("5".into())).unwrap(), json!("5"));
    }
}
