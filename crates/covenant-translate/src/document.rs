//! Structured JSON documents.

use crate::translator::{FromWire, NodeForm, ToWire};
use covenant_core::{Native, TranslationError, TranslationResult};

/// Carries a document as compact JSON text.
#[derive(Debug, Clone)]
pub struct DocumentTranslator {
    name: String,
}

impl DocumentTranslator {
    /// Creates a translator labelled with the document type's name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl Default for DocumentTranslator {
    fn default() -> Self {
        Self::new(covenant_core::names::JSON)
    }
}

impl ToWire for DocumentTranslator {
    fn to_wire(&self, value: &Native) -> TranslationResult<String> {
        match value {
            Native::Document(node) => Ok(node.to_string()),
            other => Err(other.mismatch(&self.name)),
        }
    }

    fn node_form(&self) -> NodeForm {
        NodeForm::Literal
    }
}

impl FromWire for DocumentTranslator {
    fn from_wire(&self, text: &str) -> TranslationResult<Native> {
        serde_json::from_str(text)
            .map(Native::Document)
            .map_err(|e| TranslationError::malformed(&self.name, text, e))
    }
}
