//! # Covenant Translate
//!
//! Bidirectional translation between native values and their wire form.
//!
//! - [`ToWire`] / [`FromWire`] - The two directions of a translator
//! - [`Translator`] - A pair of both, bound once per parameter
//! - [`node_to_native`] / [`native_to_node`] - Chain adapters for JSON nodes
//! - [`TranslatorRegistry`] - The shared, lazily extended lookup table
//!
//! Built-in translators cover integers, floats, decimals, booleans, text,
//! base64 blobs, UUIDs, bit-sets, three temporal granularities, documents,
//! enumerations and an outbound-only catch-all.

#![doc(html_root_url = "https://docs.rs/covenant-translate/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod binary;
mod display;
mod document;
mod enumeration;
mod numeric;
mod registry;
mod temporal;
mod text;
mod translator;

pub use binary::{BitSetTranslator, BytesTranslator, UuidTranslator};
pub use display::DisplayTranslator;
pub use document::DocumentTranslator;
pub use enumeration::EnumTranslator;
pub use numeric::{DecimalTranslator, FloatTranslator, FloatType, IntegerTranslator, IntegerType};
pub use registry::TranslatorRegistry;
pub use temporal::{DateTimeTranslator, DateTranslator, OffsetDateTimeTranslator};
pub use text::{BoolTranslator, TextTranslator};
pub use translator::{native_to_node, node_to_native, FromWire, NodeForm, ToWire, Translator};
