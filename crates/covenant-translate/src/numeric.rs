//! Numeric translators.
//!
//! Every numeric translator has a strict and a lenient mode. Both trim
//! surrounding whitespace. Strict mode then requires the whole text to parse
//! and fit; lenient mode truncates fractional text toward zero for integers
//! and saturates out-of-range values.

use crate::translator::{FromWire, NodeForm, ToWire};
use covenant_core::{names, Native, TranslationError, TranslationResult};
use rust_decimal::Decimal;
use std::fmt::Display;
use std::marker::PhantomData;
use std::num::{IntErrorKind, ParseIntError};
use std::str::FromStr;

/// An integer type with a native variant.
pub trait IntegerType:
    Copy + Display + FromStr<Err = ParseIntError> + Send + Sync + 'static
{
    /// Descriptor name.
    const NAME: &'static str;

    /// Wraps the value.
    fn wrap(self) -> Native;

    /// Unwraps the value if the variant matches.
    fn unwrap(native: &Native) -> Option<Self>;

    /// Converts a float with saturation.
    fn saturate(value: f64) -> Self;
}

impl IntegerType for i32 {
    const NAME: &'static str = names::I32;

    fn wrap(self) -> Native {
        Native::I32(self)
    }

    fn unwrap(native: &Native) -> Option<Self> {
        match native {
            Native::I32(v) => Some(*v),
            _ => None,
        }
    }

    #[allow(clippy::cast_possible_truncation)]
    fn saturate(value: f64) -> Self {
        value as Self
    }
}

impl IntegerType for i64 {
    const NAME: &'static str = names::I64;

    fn wrap(self) -> Native {
        Native::I64(self)
    }

    fn unwrap(native: &Native) -> Option<Self> {
        match native {
            Native::I64(v) => Some(*v),
            _ => None,
        }
    }

    #[allow(clippy::cast_possible_truncation)]
    fn saturate(value: f64) -> Self {
        value as Self
    }
}

/// Translator for signed integers.
#[derive(Debug, Clone, Copy)]
pub struct IntegerTranslator<T> {
    strict: bool,
    marker: PhantomData<fn() -> T>,
}

impl<T: IntegerType> IntegerTranslator<T> {
    /// Rejects anything that is not a complete in-range integer.
    #[must_use]
    pub const fn strict() -> Self {
        Self {
            strict: true,
            marker: PhantomData,
        }
    }

    /// Truncates and saturates instead of failing.
    #[must_use]
    pub const fn lenient() -> Self {
        Self {
            strict: false,
            marker: PhantomData,
        }
    }

    fn lenient_parse(text: &str) -> TranslationResult<T> {
        match text.parse::<f64>() {
            Ok(value) if !value.is_nan() => Ok(T::saturate(value.trunc())),
            _ => Err(TranslationError::malformed(T::NAME, text, "not a number")),
        }
    }
}

impl<T: IntegerType> ToWire for IntegerTranslator<T> {
    fn to_wire(&self, value: &Native) -> TranslationResult<String> {
        T::unwrap(value)
            .map(|v| v.to_string())
            .ok_or_else(|| value.mismatch(T::NAME))
    }

    fn node_form(&self) -> NodeForm {
        NodeForm::Literal
    }
}

impl<T: IntegerType> FromWire for IntegerTranslator<T> {
    fn from_wire(&self, text: &str) -> TranslationResult<Native> {
        let trimmed = text.trim();
        match trimmed.parse::<T>() {
            Ok(value) => Ok(value.wrap()),
            Err(_) if !self.strict => Self::lenient_parse(trimmed).map(T::wrap),
            Err(e) => match e.kind() {
                IntErrorKind::PosOverflow | IntErrorKind::NegOverflow => {
                    Err(TranslationError::out_of_range(T::NAME, text))
                }
                _ => Err(TranslationError::malformed(T::NAME, text, e)),
            },
        }
    }
}

/// A float type with a native variant.
pub trait FloatType: Copy + Display + FromStr + Send + Sync + 'static {
    /// Descriptor name.
    const NAME: &'static str;

    /// Wraps the value.
    fn wrap(self) -> Native;

    /// Unwraps the value if the variant matches.
    fn unwrap(native: &Native) -> Option<Self>;

    /// Returns `true` for positive or negative infinity.
    fn is_infinite(self) -> bool;
}

impl FloatType for f32 {
    const NAME: &'static str = names::F32;

    fn wrap(self) -> Native {
        Native::F32(self)
    }

    fn unwrap(native: &Native) -> Option<Self> {
        match native {
            Native::F32(v) => Some(*v),
            _ => None,
        }
    }

    fn is_infinite(self) -> bool {
        Self::is_infinite(self)
    }
}

impl FloatType for f64 {
    const NAME: &'static str = names::F64;

    fn wrap(self) -> Native {
        Native::F64(self)
    }

    fn unwrap(native: &Native) -> Option<Self> {
        match native {
            Native::F64(v) => Some(*v),
            _ => None,
        }
    }

    fn is_infinite(self) -> bool {
        Self::is_infinite(self)
    }
}

/// Translator for floating point numbers.
#[derive(Debug, Clone, Copy)]
pub struct FloatTranslator<T> {
    strict: bool,
    marker: PhantomData<fn() -> T>,
}

impl<T: FloatType> FloatTranslator<T> {
    /// Rejects text that overflows to infinity.
    #[must_use]
    pub const fn strict() -> Self {
        Self {
            strict: true,
            marker: PhantomData,
        }
    }

    /// Lets overflowing text saturate to infinity.
    #[must_use]
    pub const fn lenient() -> Self {
        Self {
            strict: false,
            marker: PhantomData,
        }
    }
}

impl<T: FloatType> ToWire for FloatTranslator<T> {
    fn to_wire(&self, value: &Native) -> TranslationResult<String> {
        T::unwrap(value)
            .map(|v| v.to_string())
            .ok_or_else(|| value.mismatch(T::NAME))
    }

    fn node_form(&self) -> NodeForm {
        NodeForm::Literal
    }
}

impl<T: FloatType> FromWire for FloatTranslator<T> {
    fn from_wire(&self, text: &str) -> TranslationResult<Native> {
        let trimmed = text.trim();
        let value = trimmed
            .parse::<T>()
            .map_err(|_| TranslationError::malformed(T::NAME, text, "not a number"))?;
        if self.strict && value.is_infinite() && !trimmed.to_ascii_lowercase().contains("inf") {
            return Err(TranslationError::out_of_range(T::NAME, text));
        }
        Ok(value.wrap())
    }
}

/// Translator for arbitrary-precision decimals.
///
/// Decimals travel as JSON strings so no precision is lost to a float
/// reader on the other side.
#[derive(Debug, Clone, Copy)]
pub struct DecimalTranslator {
    strict: bool,
}

impl DecimalTranslator {
    /// Accepts plain decimal notation only.
    #[must_use]
    pub const fn strict() -> Self {
        Self { strict: true }
    }

    /// Also accepts scientific notation, rounding if needed.
    #[must_use]
    pub const fn lenient() -> Self {
        Self { strict: false }
    }
}

impl ToWire for DecimalTranslator {
    fn to_wire(&self, value: &Native) -> TranslationResult<String> {
        match value {
            Native::Decimal(d) => Ok(d.to_string()),
            other => Err(other.mismatch(names::DECIMAL)),
        }
    }
}

impl FromWire for DecimalTranslator {
    fn from_wire(&self, text: &str) -> TranslationResult<Native> {
        let trimmed = text.trim();
        Decimal::from_str_exact(trimmed)
            .or_else(|e| {
                if self.strict {
                    Err(e)
                } else {
                    Decimal::from_scientific(trimmed).or_else(|_| Decimal::from_str(trimmed))
                }
            })
            .map(Native::Decimal)
            .map_err(|e| TranslationError::malformed(names::DECIMAL, text, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_strict_integer_rejects_garbage_and_overflow() {
        let t = IntegerTranslator::<i32>::strict();
        assert_eq!(t.from_wire(" 42 ").unwrap(), Native::I32(42));
        assert!(matches!(
            t.from_wire("12.7"),
            Err(TranslationError::Malformed { .. })
        ));
        assert!(matches!(
            t.from_wire("99999999999"),
            Err(TranslationError::OutOfRange { .. })
        ));
    }

    #[test]
    fn test_lenient_integer_truncates_and_saturates() {
        let t = IntegerTranslator::<i32>::lenient();
        assert_eq!(t.from_wire("12.7").unwrap(), Native::I32(12));
        assert_eq!(t.from_wire("-12.7").unwrap(), Native::I32(-12));
        assert_eq!(t.from_wire("99999999999").unwrap(), Native::I32(i32::MAX));
        assert!(t.from_wire("abc").is_err());
        assert!(t.from_wire("NaN").is_err());
    }

    #[test]
    fn test_integer_type_mismatch() {
        let t = IntegerTranslator::<i64>::strict();
        assert!(matches!(
            t.to_wire(&Native::I32(1)),
            Err(TranslationError::TypeMismatch { .. })
        ));
    }

    #[test]
    fn test_strict_float_overflow() {
        let t = FloatTranslator::<f32>::strict();
        assert!(t.from_wire("1e40").is_err());
        assert_eq!(t.from_wire("inf").unwrap(), Native::F32(f32::INFINITY));
        let t = FloatTranslator::<f32>::lenient();
        assert_eq!(t.from_wire("1e40").unwrap(), Native::F32(f32::INFINITY));
    }

    #[test]
    fn test_decimal_modes() {
        assert!(DecimalTranslator::strict().from_wire("1.5e3").is_err());
        assert_eq!(
            DecimalTranslator::lenient().from_wire("1.5e3").unwrap(),
            Native::Decimal(Decimal::from(1500))
        );
        assert_eq!(
            DecimalTranslator::strict().to_wire(&Native::Decimal(Decimal::new(1050, 2))).unwrap(),
            "10.50"
        );
    }

    proptest! {
        #[test]
        fn prop_i32_round_trip(v in any::<i32>()) {
            let t = IntegerTranslator::<i32>::strict();
            let text = t.to_wire(&Native::I32(v)).unwrap();
            prop_assert_eq!(t.from_wire(&text).unwrap(), Native::I32(v));
        }

        #[test]
        fn prop_i64_round_trip(v in any::<i64>()) {
            let t = IntegerTranslator::<i64>::strict();
            let text = t.to_wire(&Native::I64(v)).unwrap();
            prop_assert_eq!(t.from_wire(&text).unwrap(), Native::I64(v));
        }

        #[test]
        fn prop_f64_round_trip(v in any::<f64>().prop_filter("finite", |v| v.is_finite())) {
            let t = FloatTranslator::<f64>::strict();
            let text = t.to_wire(&Native::F64(v)).unwrap();
            prop_assert_eq!(t.from_wire(&text).unwrap(), Native::F64(v));
        }

        #[test]
        fn prop_f32_round_trip(v in any::<f32>().prop_filter("finite", |v| v.is_finite())) {
            let t = FloatTranslator::<f32>::strict();
            let text = t.to_wire(&Native::F32(v)).unwrap();
            prop_assert_eq!(t.from_wire(&text).unwrap(), Native::F32(v));
        }

        #[test]
        fn prop_decimal_round_trip(mantissa in any::<i64>(), scale in 0u32..=18) {
            let value = Decimal::new(mantissa, scale);
            let t = DecimalTranslator::strict();
            let text = t.to_wire(&Native::Decimal(value)).unwrap();
            prop_assert_eq!(t.from_wire(&text).unwrap(), Native::Decimal(value));
        }
    }
}
