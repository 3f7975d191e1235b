//! Native values and the typed bridge into them.
//!
//! Translators work on [`Native`], a closed set of the value kinds the
//! runtime knows how to carry. Rust types reach that set through the
//! [`Semantic`] trait, which also names the [`TypeDescriptor`] used to find
//! the translator for them.

use crate::descriptor::{names, TypeDescriptor};
use crate::error::{TranslationError, TranslationResult};
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime};
use fixedbitset::FixedBitSet;
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use uuid::Uuid;

/// A native value handed to, or produced by, a translator.
#[derive(Clone)]
pub enum Native {
    /// 32-bit signed integer.
    I32(i32),
    /// 64-bit signed integer.
    I64(i64),
    /// 32-bit float.
    F32(f32),
    /// 64-bit float.
    F64(f64),
    /// Arbitrary-precision decimal.
    Decimal(Decimal),
    /// Boolean.
    Bool(bool),
    /// Text.
    Text(String),
    /// Binary blob.
    Bytes(Vec<u8>),
    /// UUID identifier.
    Uuid(Uuid),
    /// Bit-set.
    Bits(FixedBitSet),
    /// Calendar date.
    Date(NaiveDate),
    /// Local date-time.
    DateTime(NaiveDateTime),
    /// Date-time with offset.
    OffsetDateTime(DateTime<FixedOffset>),
    /// Enumeration variant, by name.
    Enum(String),
    /// Structured document.
    Document(serde_json::Value),
    /// Anything renderable through its string form. Outbound only.
    Opaque(Arc<dyn fmt::Display + Send + Sync>),
}

impl Native {
    /// Returns a short name of the value's kind, for error messages.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::I32(_) => names::I32,
            Self::I64(_) => names::I64,
            Self::F32(_) => names::F32,
            Self::F64(_) => names::F64,
            Self::Decimal(_) => names::DECIMAL,
            Self::Bool(_) => names::BOOL,
            Self::Text(_) => names::STRING,
            Self::Bytes(_) => names::BYTES,
            Self::Uuid(_) => names::UUID,
            Self::Bits(_) => names::BITSET,
            Self::Date(_) => names::DATE,
            Self::DateTime(_) => names::DATETIME,
            Self::OffsetDateTime(_) => names::OFFSET_DATETIME,
            Self::Enum(_) => "enum",
            Self::Document(_) => names::JSON,
            Self::Opaque(_) => "opaque",
        }
    }

    /// Builds a type mismatch error for this value.
    #[must_use]
    pub fn mismatch(&self, expected: &str) -> TranslationError {
        TranslationError::mismatch(expected, self.kind())
    }

    /// Returns the text if this is a text value.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            _ => None,
        }
    }
}

impl fmt::Debug for Native {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::I32(v) => f.debug_tuple("I32").field(v).finish(),
            Self::I64(v) => f.debug_tuple("I64").field(v).finish(),
            Self::F32(v) => f.debug_tuple("F32").field(v).finish(),
            Self::F64(v) => f.debug_tuple("F64").field(v).finish(),
            Self::Decimal(v) => f.debug_tuple("Decimal").field(v).finish(),
            Self::Bool(v) => f.debug_tuple("Bool").field(v).finish(),
            Self::Text(v) => f.debug_tuple("Text").field(v).finish(),
            Self::Bytes(v) => f.debug_tuple("Bytes").field(v).finish(),
            Self::Uuid(v) => f.debug_tuple("Uuid").field(v).finish(),
            Self::Bits(v) => f.debug_tuple("Bits").field(v).finish(),
            Self::Date(v) => f.debug_tuple("Date").field(v).finish(),
            Self::DateTime(v) => f.debug_tuple("DateTime").field(v).finish(),
            Self::OffsetDateTime(v) => f.debug_tuple("OffsetDateTime").field(v).finish(),
            Self::Enum(v) => f.debug_tuple("Enum").field(v).finish(),
            Self::Document(v) => f.debug_tuple("Document").field(v).finish(),
            Self::Opaque(v) => f.debug_tuple("Opaque").field(&v.to_string()).finish(),
        }
    }
}

/// Generic string rendering, used by the catch-all outbound translator.
impl fmt::Display for Native {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::I32(v) => write!(f, "{v}"),
            Self::I64(v) => write!(f, "{v}"),
            Self::F32(v) => write!(f, "{v}"),
            Self::F64(v) => write!(f, "{v}"),
            Self::Decimal(v) => write!(f, "{v}"),
            Self::Bool(v) => write!(f, "{v}"),
            Self::Text(v) | Self::Enum(v) => f.write_str(v),
            Self::Bytes(v) => v.iter().try_for_each(|b| write!(f, "{b:02x}")),
            Self::Uuid(v) => write!(f, "{v}"),
            Self::Bits(v) => (0..v.len()).try_for_each(|i| f.write_str(if v.contains(i) { "1" } else { "0" })),
            Self::Date(v) => write!(f, "{v}"),
            Self::DateTime(v) => write!(f, "{v}"),
            Self::OffsetDateTime(v) => write!(f, "{v}"),
            Self::Document(v) => write!(f, "{v}"),
            Self::Opaque(v) => write!(f, "{v}"),
        }
    }
}

impl PartialEq for Native {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::I32(a), Self::I32(b)) => a == b,
            (Self::I64(a), Self::I64(b)) => a == b,
            (Self::F32(a), Self::F32(b)) => a == b,
            (Self::F64(a), Self::F64(b)) => a == b,
            (Self::Decimal(a), Self::Decimal(b)) => a == b,
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::Text(a), Self::Text(b)) | (Self::Enum(a), Self::Enum(b)) => a == b,
            (Self::Bytes(a), Self::Bytes(b)) => a == b,
            (Self::Uuid(a), Self::Uuid(b)) => a == b,
            (Self::Bits(a), Self::Bits(b)) => a == b,
            (Self::Date(a), Self::Date(b)) => a == b,
            (Self::DateTime(a), Self::DateTime(b)) => a == b,
            (Self::OffsetDateTime(a), Self::OffsetDateTime(b)) => a == b,
            (Self::Document(a), Self::Document(b)) => a == b,
            (Self::Opaque(a), Self::Opaque(b)) => a.to_string() == b.to_string(),
            _ => false,
        }
    }
}

/// A Rust type that can travel through a contract.
///
/// Implementors name their descriptor and convert to and from [`Native`].
pub trait Semantic: Sized {
    /// The descriptor used to look up this type's translator.
    fn descriptor() -> TypeDescriptor;

    /// Converts into a native value.
    fn into_native(self) -> TranslationResult<Native>;

    /// Converts from a native value produced by this type's translator.
    fn from_native(native: Native) -> TranslationResult<Self>;
}

macro_rules! semantic_scalar {
    ($ty:ty, $variant:ident, $name:expr) => {
        impl Semantic for $ty {
            fn descriptor() -> TypeDescriptor {
                TypeDescriptor::scalar($name)
            }

            fn into_native(self) -> TranslationResult<Native> {
                Ok(Native::$variant(self))
            }

            fn from_native(native: Native) -> TranslationResult<Self> {
                match native {
                    Native::$variant(value) => Ok(value),
                    other => Err(other.mismatch($name)),
                }
            }
        }

        impl From<$ty> for Native {
            fn from(value: $ty) -> Self {
                Native::$variant(value)
            }
        }
    };
}

semantic_scalar!(i32, I32, names::I32);
semantic_scalar!(i64, I64, names::I64);
semantic_scalar!(f32, F32, names::F32);
semantic_scalar!(f64, F64, names::F64);
semantic_scalar!(Decimal, Decimal, names::DECIMAL);
semantic_scalar!(bool, Bool, names::BOOL);
semantic_scalar!(String, Text, names::STRING);
semantic_scalar!(Vec<u8>, Bytes, names::BYTES);
semantic_scalar!(Uuid, Uuid, names::UUID);
semantic_scalar!(FixedBitSet, Bits, names::BITSET);
semantic_scalar!(NaiveDate, Date, names::DATE);
semantic_scalar!(NaiveDateTime, DateTime, names::DATETIME);
semantic_scalar!(DateTime<FixedOffset>, OffsetDateTime, names::OFFSET_DATETIME);

impl From<&str> for Native {
    fn from(value: &str) -> Self {
        Native::Text(value.to_string())
    }
}

/// A serde type carried as a structured JSON document.
///
/// The descriptor is parameterized on `T`, so each wrapped type is a
/// distinct translator key.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Json<T>(pub T);

impl<T> Json<T> {
    /// Consumes the wrapper and returns the inner value.
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T: Serialize + DeserializeOwned> Semantic for Json<T> {
    fn descriptor() -> TypeDescriptor {
        TypeDescriptor::document(names::JSON)
            .with_parameter(TypeDescriptor::scalar(std::any::type_name::<T>()))
    }

    fn into_native(self) -> TranslationResult<Native> {
        serde_json::to_value(&self.0)
            .map(Native::Document)
            .map_err(|e| TranslationError::malformed(std::any::type_name::<T>(), "", e))
    }

    fn from_native(native: Native) -> TranslationResult<Self> {
        match native {
            Native::Document(node) => {
                let input = node.to_string();
                serde_json::from_value(node)
                    .map(Json)
                    .map_err(|e| TranslationError::malformed(std::any::type_name::<T>(), input, e))
            }
            other => Err(other.mismatch(names::JSON)),
        }
    }
}

impl Semantic for serde_json::Value {
    fn descriptor() -> TypeDescriptor {
        TypeDescriptor::document(names::JSON)
    }

    fn into_native(self) -> TranslationResult<Native> {
        Ok(Native::Document(self))
    }

    fn from_native(native: Native) -> TranslationResult<Self> {
        match native {
            Native::Document(node) => Ok(node),
            other => Err(other.mismatch(names::JSON)),
        }
    }
}

/// A value sent through its `Display` form. There is no way back.
pub struct Opaque<T>(pub T);

impl<T: fmt::Display + Send + Sync + 'static> Semantic for Opaque<T> {
    fn descriptor() -> TypeDescriptor {
        TypeDescriptor::opaque(std::any::type_name::<T>())
    }

    fn into_native(self) -> TranslationResult<Native> {
        Ok(Native::Opaque(Arc::new(self.0)))
    }

    fn from_native(_native: Native) -> TranslationResult<Self> {
        Err(TranslationError::unsupported(std::any::type_name::<T>()))
    }
}

/// A Rust enum whose variants travel by name.
///
/// Usually implemented through [`contract_enum!`](crate::contract_enum).
pub trait ContractEnum: Sized + 'static {
    /// The enumeration's name.
    const NAME: &'static str;
    /// Variant names in ordinal order.
    const VARIANTS: &'static [&'static str];

    /// Returns this value's variant name.
    fn variant_name(&self) -> &'static str;

    /// Looks up a value by variant name.
    fn from_variant_name(name: &str) -> Option<Self>;

    /// The enumeration descriptor for this type.
    fn enum_descriptor() -> TypeDescriptor {
        TypeDescriptor::enumeration(Self::NAME, Self::VARIANTS.iter().copied())
    }
}

/// Declares an enum that can travel through a contract.
///
/// # Example
///
/// ```
/// use covenant_core::{contract_enum, Native, Semantic};
///
/// contract_enum! {
///     /// Account tiers.
///     pub enum Tier {
///         Free => "free",
///         Pro => "pro",
///     }
/// }
///
/// assert_eq!(Tier::descriptor().variants().map(<[String]>::len), Some(2));
/// assert_eq!(Tier::Pro.into_native().unwrap(), Native::Enum("pro".to_string()));
/// ```
#[macro_export]
macro_rules! contract_enum {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $($(#[$vmeta:meta])* $variant:ident => $wire:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        $vis enum $name {
            $($(#[$vmeta])* $variant),+
        }

        impl $crate::ContractEnum for $name {
            const NAME: &'static str = stringify!($name);
            const VARIANTS: &'static [&'static str] = &[$($wire),+];

            fn variant_name(&self) -> &'static str {
                match self {
                    $(Self::$variant => $wire),+
                }
            }

            fn from_variant_name(name: &str) -> Option<Self> {
                match name {
                    $($wire => Some(Self::$variant),)+
                    _ => None,
                }
            }
        }

        impl $crate::Semantic for $name {
            fn descriptor() -> $crate::TypeDescriptor {
                <Self as $crate::ContractEnum>::enum_descriptor()
            }

            fn into_native(self) -> $crate::TranslationResult<$crate::Native> {
                Ok($crate::Native::Enum(
                    <Self as $crate::ContractEnum>::variant_name(&self).to_string(),
                ))
            }

            fn from_native(native: $crate::Native) -> $crate::TranslationResult<Self> {
                match native {
                    $crate::Native::Enum(name) => {
                        <Self as $crate::ContractEnum>::from_variant_name(&name).ok_or_else(|| {
                            $crate::TranslationError::malformed(stringify!($name), name, "unknown variant")
                        })
                    }
                    other => Err(other.mismatch(stringify!($name))),
                }
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    contract_enum! {
        enum Color {
            Red => "red",
            Green => "green",
        }
    }

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Order {
        id: u32,
        item: String,
    }

    #[test]
    fn test_scalar_bridge() {
        let native = 42i64.into_native().unwrap();
        assert_eq!(native, Native::I64(42));
        assert_eq!(i64::from_native(native).unwrap(), 42);
        assert!(i32::from_native(Native::I64(1)).is_err());
    }

    #[test]
    fn test_json_descriptor_is_parameterized() {
        assert_ne!(Json::<Order>::descriptor(), Json::<Vec<u32>>::descriptor());
        assert!(Json::<Order>::descriptor().is_document());
    }

    #[test]
    fn test_json_bridge() {
        let order = Order {
            id: 7,
            item: "lamp".to_string(),
        };
        let native = Json(order).into_native().unwrap();
        let back = Json::<Order>::from_native(native).unwrap().into_inner();
        assert_eq!(back.item, "lamp");
    }

    #[test]
    fn test_enum_bridge() {
        assert_eq!(
            Color::descriptor().variants().unwrap(),
            &["red".to_string(), "green".to_string()]
        );
        assert_eq!(Color::Green.into_native().unwrap(), Native::Enum("green".into()));
        assert_eq!(Color::from_native(Native::Enum("red".into())).unwrap(), Color::Red);
        assert!(Color::from_native(Native::Enum("blue".into())).is_err());
    }

    #[test]
    fn test_opaque_is_outbound_only() {
        let native = Opaque(std::net::Ipv4Addr::LOCALHOST).into_native().unwrap();
        assert!(matches!(native, Native::Opaque(_)));
        assert!(Opaque::<std::net::Ipv4Addr>::from_native(native).is_err());
        assert!(Opaque::<std::net::Ipv4Addr>::descriptor().is_opaque());
    }

    #[test]
    fn test_display() {
        assert_eq!(Native::Bytes(vec![0x0f, 0xa0]).to_string(), "0fa0");
        let mut bits = FixedBitSet::with_capacity(3);
        bits.insert(1);
        assert_eq!(Native::Bits(bits).to_string(), "010");
        assert_eq!(Native::I64(-3).to_string(), "-3");
    }

    #[test]
    fn test_opaque_equality_uses_rendering() {
        let a = Native::Opaque(Arc::new("x"));
        let b = Native::Opaque(Arc::new(String::from("x")));
        assert_eq!(a, b);
    }
}
