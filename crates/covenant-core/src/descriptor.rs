//! Semantic type descriptors.
//!
//! A [`TypeDescriptor`] identifies a native type for translator lookup. It
//! carries the raw type name, any generic parameterization, and the
//! [`Shape`] of the type, so that `Json<Order>` and `Json<Invoice>` (or two
//! enumerations sharing a name but not their variants) are distinct keys.
//!
//! Equality and hashing are structural over all three parts.
//!
//! # Example
//!
//! ```
//! use covenant_core::{names, TypeDescriptor};
//!
//! let id = TypeDescriptor::scalar(names::I64);
//! assert_eq!(id, TypeDescriptor::scalar("i64"));
//!
//! let orders = TypeDescriptor::document("json").with_parameter(TypeDescriptor::scalar("Order"));
//! let invoices = TypeDescriptor::document("json").with_parameter(TypeDescriptor::scalar("Invoice"));
//! assert_ne!(orders, invoices);
//! assert_eq!(orders.to_string(), "json<Order>");
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

/// Well-known descriptor names for the built-in scalar types.
pub mod names {
    /// 32-bit signed integer.
    pub const I32: &str = "i32";
    /// 64-bit signed integer.
    pub const I64: &str = "i64";
    /// 32-bit float.
    pub const F32: &str = "f32";
    /// 64-bit float.
    pub const F64: &str = "f64";
    /// Arbitrary-precision decimal.
    pub const DECIMAL: &str = "decimal";
    /// Boolean.
    pub const BOOL: &str = "bool";
    /// Text.
    pub const STRING: &str = "string";
    /// Binary blob.
    pub const BYTES: &str = "bytes";
    /// UUID identifier.
    pub const UUID: &str = "uuid";
    /// Bit-set.
    pub const BITSET: &str = "bitset";
    /// Calendar date without time.
    pub const DATE: &str = "date";
    /// Local date-time without offset.
    pub const DATETIME: &str = "datetime";
    /// Date-time with a UTC offset.
    pub const OFFSET_DATETIME: &str = "offset_datetime";
    /// Untyped JSON document.
    pub const JSON: &str = "json";
}

/// The structural category of a described type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Shape {
    /// A scalar with a dedicated translator (numbers, text, temporal, ...).
    #[default]
    Scalar,
    /// A closed set of named variants, in ordinal order.
    Enumeration {
        /// Variant names in declaration order.
        variants: Vec<String>,
    },
    /// A structured document carried as a JSON node.
    Document,
    /// A type that can only be rendered outbound through its string form.
    Opaque,
}

/// Identifies a native type for translator lookup.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TypeDescriptor {
    name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    parameters: Vec<TypeDescriptor>,
    #[serde(default)]
    shape: Shape,
}

impl TypeDescriptor {
    /// Creates a scalar descriptor.
    #[must_use]
    pub fn scalar(name: impl Into<String>) -> Self {
        Self::with_shape(name, Shape::Scalar)
    }

    /// Creates an enumeration descriptor with its variants in ordinal order.
    #[must_use]
    pub fn enumeration<I, S>(name: impl Into<String>, variants: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::with_shape(
            name,
            Shape::Enumeration {
                variants: variants.into_iter().map(Into::into).collect(),
            },
        )
    }

    /// Creates a structured document descriptor.
    #[must_use]
    pub fn document(name: impl Into<String>) -> Self {
        Self::with_shape(name, Shape::Document)
    }

    /// Creates an opaque, outbound-only descriptor.
    #[must_use]
    pub fn opaque(name: impl Into<String>) -> Self {
        Self::with_shape(name, Shape::Opaque)
    }

    fn with_shape(name: impl Into<String>, shape: Shape) -> Self {
        Self {
            name: name.into(),
            parameters: Vec::new(),
            shape,
        }
    }

    /// Adds a generic parameter.
    #[must_use]
    pub fn with_parameter(mut self, parameter: TypeDescriptor) -> Self {
        self.parameters.push(parameter);
        self
    }

    /// Returns the raw type name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the generic parameters.
    #[must_use]
    pub fn parameters(&self) -> &[TypeDescriptor] {
        &self.parameters
    }

    /// Returns the shape.
    #[must_use]
    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    /// Returns the variant names if this describes an enumeration.
    #[must_use]
    pub fn variants(&self) -> Option<&[String]> {
        match &self.shape {
            Shape::Enumeration { variants } => Some(variants),
            _ => None,
        }
    }

    /// Returns `true` for enumeration descriptors.
    #[must_use]
    pub fn is_enumeration(&self) -> bool {
        matches!(self.shape, Shape::Enumeration { .. })
    }

    /// Returns `true` for document descriptors.
    #[must_use]
    pub fn is_document(&self) -> bool {
        self.shape == Shape::Document
    }

    /// Returns `true` for opaque descriptors.
    #[must_use]
    pub fn is_opaque(&self) -> bool {
        self.shape == Shape::Opaque
    }
}

impl fmt::Display for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)?;
        if !self.parameters.is_empty() {
            f.write_str("<")?;
            for (index, parameter) in self.parameters.iter().enumerate() {
                if index > 0 {
                    f.write_str(", ")?;
                }
                write!(f, "{parameter}")?;
            }
            f.write_str(">")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_structural_equality() {
        let a = TypeDescriptor::enumeration("Color", ["red", "green"]);
        let b = TypeDescriptor::enumeration("Color", vec!["red".to_string(), "green".to_string()]);
        let c = TypeDescriptor::enumeration("Color", ["red"]);
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_generic_parameters_are_distinct_keys() {
        let mut keys = HashSet::new();
        keys.insert(TypeDescriptor::document("json").with_parameter(TypeDescriptor::scalar("A")));
        keys.insert(TypeDescriptor::document("json").with_parameter(TypeDescriptor::scalar("B")));
        keys.insert(TypeDescriptor::document("json").with_parameter(TypeDescriptor::scalar("A")));
        assert_eq!(keys.len(), 2);
    }

    #[test]
    fn test_shape_distinguishes_same_name() {
        assert_ne!(TypeDescriptor::scalar("x"), TypeDescriptor::opaque("x"));
    }

    #[test]
    fn test_display() {
        let nested = TypeDescriptor::document("map")
            .with_parameter(TypeDescriptor::scalar(names::STRING))
            .with_parameter(TypeDescriptor::scalar(names::I64));
        assert_eq!(nested.to_string(), "map<string, i64>");
    }

    #[test]
    fn test_deserialize_defaults_to_scalar() {
        let descriptor: TypeDescriptor = serde_json::from_str(r#"{"name":"i32"}"#).unwrap();
        assert_eq!(descriptor, TypeDescriptor::scalar(names::I32));

        let descriptor: TypeDescriptor = serde_json::from_str(
            r#"{"name":"Color","shape":{"kind":"enumeration","variants":["red","blue"]}}"#,
        )
        .unwrap();
        assert_eq!(descriptor.variants().map(<[String]>::len), Some(2));
    }
}
