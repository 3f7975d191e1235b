//! Text and boolean translators.

use crate::translator::{FromWire, NodeForm, ToWire};
use covenant_core::{names, Native, TranslationError, TranslationResult};

/// Identity translator for text.
#[derive(Debug, Clone, Copy, Default)]
pub struct TextTranslator;

impl ToWire for TextTranslator {
    fn to_wire(&self, value: &Native) -> TranslationResult<String> {
        value
            .as_text()
            .map(str::to_string)
            .ok_or_else(|| value.mismatch(names::STRING))
    }
}

impl FromWire for TextTranslator {
    fn from_wire(&self, text: &str) -> TranslationResult<Native> {
        Ok(Native::Text(text.to_string()))
    }
}

/// Translator for booleans.
///
/// `true` and `false` are accepted in any case. The lenient mode also takes
/// `1/0`, `yes/no` and `on/off`.
#[derive(Debug, Clone, Copy)]
pub struct BoolTranslator {
    strict: bool,
}

impl BoolTranslator {
    /// Accepts only `true` and `false`.
    #[must_use]
    pub const fn strict() -> Self {
        Self { strict: true }
    }

    /// Accepts the common spellings as well.
    #[must_use]
    pub const fn lenient() -> Self {
        Self { strict: false }
    }
}

impl ToWire for BoolTranslator {
    fn to_wire(&self, value: &Native) -> TranslationResult<String> {
        match value {
            Native::Bool(b) => Ok(b.to_string()),
            other => Err(other.mismatch(names::BOOL)),
        }
    }

    fn node_form(&self) -> NodeForm {
        NodeForm::Literal
    }
}

impl FromWire for BoolTranslator {
    fn from_wire(&self, text: &str) -> TranslationResult<Native> {
        let lowered = text.trim().to_ascii_lowercase();
        let parsed = match lowered.as_str() {
            "true" => Some(true),
            "false" => Some(false),
            "1" | "yes" | "on" if !self.strict => Some(true),
            "0" | "no" | "off" if !self.strict => Some(false),
            _ => None,
        };
        parsed
            .map(Native::Bool)
            .ok_or_else(|| TranslationError::malformed(names::BOOL, text, "not a boolean"))
    }
}
