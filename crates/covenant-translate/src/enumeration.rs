//! Generic translator for enumerations.
//!
//! Built from an enumeration descriptor's variant list. Variants go out by
//! name; inbound text may be a name or a zero-based ordinal.

use crate::translator::{FromWire, ToWire};
use covenant_core::{Native, TranslationError, TranslationResult};

/// Name and ordinal translator for one enumeration.
#[derive(Debug, Clone)]
pub struct EnumTranslator {
    name: String,
    variants: Vec<String>,
}

impl EnumTranslator {
    /// Creates a translator for the given variants, in ordinal order.
    #[must_use]
    pub fn new(name: impl Into<String>, variants: &[String]) -> Self {
        Self {
            name: name.into(),
            variants: variants.to_vec(),
        }
    }

    /// The enumeration's name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    fn unknown(&self, text: &str) -> TranslationError {
        TranslationError::malformed(&self.name, text, "unknown variant")
    }
}

impl ToWire for EnumTranslator {
    fn to_wire(&self, value: &Native) -> TranslationResult<String> {
        match value {
            Native::Enum(variant) if self.variants.contains(variant) => Ok(variant.clone()),
            Native::Enum(variant) => Err(self.unknown(variant)),
            other => Err(other.mismatch(&self.name)),
        }
    }
}

impl FromWire for EnumTranslator {
    fn from_wire(&self, text: &str) -> TranslationResult<Native> {
        let trimmed = text.trim();
        if let Some(variant) = self.variants.iter().find(|v| v.as_str() == trimmed) {
            return Ok(Native::Enum(variant.clone()));
        }
        trimmed
            .parse::<usize>()
            .ok()
            .and_then(|ordinal| self.variants.get(ordinal))
            .map(|variant| Native::Enum(variant.clone()))
            .ok_or_else(|| self.unknown(text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn colors() -> EnumTranslator {
        EnumTranslator::new("Color", &["red".to_string(), "green".to_string()])
    }

    #[test]
    fn test_name_and_ordinal_inbound() {
        let t = colors();
        assert_eq!(t.from_wire("green").unwrap(), Native::Enum("green".into()));
        assert_eq!(t.from_wire("0").unwrap(), Native::Enum("red".into()));
        assert!(t.from_wire("2").is_err());
        assert!(t.from_wire("blue").is_err());
    }

    #[test]
    fn test_outbound_checks_membership() {
        let t = colors();
        assert_eq!(t.to_wire(&Native::Enum("red".into())).unwrap(), "red");
        assert!(t.to_wire(&Native::Enum("blue".into())).is_err());
        assert!(t.to_wire(&Native::Text("red".into())).is_err());
    }
}
