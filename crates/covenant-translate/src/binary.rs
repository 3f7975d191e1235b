//! Binary, identifier and bit-set translators.

use crate::translator::{FromWire, ToWire};
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use covenant_core::{names, Native, TranslationError, TranslationResult};
use fixedbitset::FixedBitSet;
use uuid::Uuid;

/// Binary blobs as standard base64.
#[derive(Debug, Clone, Copy, Default)]
pub struct BytesTranslator;

impl ToWire for BytesTranslator {
    fn to_wire(&self, value: &Native) -> TranslationResult<String> {
        match value {
            Native::Bytes(bytes) => Ok(STANDARD.encode(bytes)),
            other => Err(other.mismatch(names::BYTES)),
        }
    }
}

impl FromWire for BytesTranslator {
    fn from_wire(&self, text: &str) -> TranslationResult<Native> {
        STANDARD
            .decode(text.trim())
            .map(Native::Bytes)
            .map_err(|e| TranslationError::malformed(names::BYTES, text, e))
    }
}

/// UUIDs in hyphenated form. Any standard form is accepted inbound.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidTranslator;

impl ToWire for UuidTranslator {
    fn to_wire(&self, value: &Native) -> TranslationResult<String> {
        match value {
            Native::Uuid(id) => Ok(id.hyphenated().to_string()),
            other => Err(other.mismatch(names::UUID)),
        }
    }
}

impl FromWire for UuidTranslator {
    fn from_wire(&self, text: &str) -> TranslationResult<Native> {
        Uuid::parse_str(text.trim())
            .map(Native::Uuid)
            .map_err(|e| TranslationError::malformed(names::UUID, text, e))
    }
}

/// Bit-sets as a string of `0` and `1`, bit 0 first.
#[derive(Debug, Clone, Copy, Default)]
pub struct BitSetTranslator;

impl ToWire for BitSetTranslator {
    fn to_wire(&self, value: &Native) -> TranslationResult<String> {
        match value {
            Native::Bits(bits) => Ok((0..bits.len())
                .map(|i| if bits.contains(i) { '1' } else { '0' })
                .collect()),
            other => Err(other.mismatch(names::BITSET)),
        }
    }
}

impl FromWire for BitSetTranslator {
    fn from_wire(&self, text: &str) -> TranslationResult<Native> {
        let mut bits = FixedBitSet::with_capacity(text.len());
        for (index, c) in text.chars().enumerate() {
            match c {
                '1' => bits.insert(index),
                '0' => {}
                other => {
                    return Err(TranslationError::malformed(
                        names::BITSET,
                        text,
                        format!("unexpected character '{other}' at {index}"),
                    ))
                }
            }
        }
        Ok(Native::Bits(bits))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_bytes_encoding() {
        assert_eq!(BytesTranslator.to_wire(&Native::Bytes(b"hi".to_vec())).unwrap(), "aGk=");
        assert!(BytesTranslator.from_wire("not base64!").is_err());
    }

    #[test]
    fn test_uuid_accepts_simple_form() {
        let id = Uuid::now_v7();
        let simple = id.simple().to_string();
        assert_eq!(UuidTranslator.from_wire(&simple).unwrap(), Native::Uuid(id));
    }

    #[test]
    fn test_bitset_rejects_other_characters() {
        assert!(BitSetTranslator.from_wire("0120").is_err());
        let Native::Bits(bits) = BitSetTranslator.from_wire("0110").unwrap() else {
            panic!("expected bits");
        };
        assert_eq!(bits.ones().collect::<Vec<_>>(), vec![1, 2]);
    }

    proptest! {
        #[test]
        fn prop_bytes_round_trip(bytes in proptest::collection::vec(any::<u8>(), 0..64)) {
            let text = BytesTranslator.to_wire(&Native::Bytes(bytes.clone())).unwrap();
            prop_assert_eq!(BytesTranslator.from_wire(&text).unwrap(), Native::Bytes(bytes));
        }

        #[test]
        fn prop_uuid_round_trip(raw in any::<u128>()) {
            let id = Uuid::from_u128(raw);
            let text = UuidTranslator.to_wire(&Native::Uuid(id)).unwrap();
            prop_assert_eq!(UuidTranslator.from_wire(&text).unwrap(), Native::Uuid(id));
        }

        #[test]
        fn prop_bitset_round_trip(flags in proptest::collection::vec(any::<bool>(), 0..100)) {
            let mut bits = FixedBitSet::with_capacity(flags.len());
            for (i, on) in flags.iter().enumerate() {
                bits.set(i, *on);
            }
            let text = BitSetTranslator.to_wire(&Native::Bits(bits.clone())).unwrap();
            prop_assert_eq!(BitSetTranslator.from_wire(&text).unwrap(), Native::Bits(bits));
        }
    }
}
