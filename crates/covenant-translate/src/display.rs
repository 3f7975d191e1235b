//! The catch-all outbound translator.

use crate::translator::{FromWire, ToWire};
use covenant_core::{Native, TranslationError, TranslationResult};

/// Renders any native value through its string form.
///
/// There is no safe generic way back, so inbound translation always fails
/// with [`TranslationError::Unsupported`].
#[derive(Debug, Clone, Copy, Default)]
pub struct DisplayTranslator;

impl ToWire for DisplayTranslator {
    fn to_wire(&self, value: &Native) -> TranslationResult<String> {
        Ok(value.to_string())
    }
}

impl FromWire for DisplayTranslator {
    fn from_wire(&self, _text: &str) -> TranslationResult<Native> {
        Err(TranslationError::unsupported("opaque"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv4Addr;
    use std::sync::Arc;

    #[test]
    fn test_renders_through_display() {
        let value = Native::Opaque(Arc::new(Ipv4Addr::new(10, 0, 0, 1)));
        assert_eq!(DisplayTranslator.to_wire(&value).unwrap(), "10.0.0.1");
        assert_eq!(DisplayTranslator.to_wire(&value).unwrap(), "10.0.0.1");
    }

    #[test]
    fn test_inbound_is_unsupported() {
        assert!(matches!(
            DisplayTranslator.from_wire("10.0.0.1"),
            Err(TranslationError::Unsupported { .. })
        ));
    }
}
