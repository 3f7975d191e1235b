//! # Covenant Contract
//!
//! Contract declarations and the validated model built from them.
//!
//! - [`ContractDeclaration`] - Raw metadata, written in code or loaded from TOML/JSON
//! - [`ContractBuilder`] - Validates a declaration and binds translators
//! - [`Contract`] / [`Operation`] / [`Parameter`] - The immutable call table
//! - [`PathPattern`] - Verb and path patterns such as `GET : items/{id}`
//! - [`FailureMapper`] - Turns domain failures into outcomes

#![doc(html_root_url = "https://docs.rs/covenant-contract/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod builder;
mod contract;
mod declaration;
pub mod fixtures;
mod mapper;
mod path;

pub use builder::ContractBuilder;
pub use contract::{compare_versions, Contract, Operation, Parameter, ReturnType};
pub use declaration::{
    ContractDeclaration, DeclarationError, DeclarationSource, OperationDeclaration,
    ParameterDeclaration, Slot, Visibility,
};
pub use mapper::{
    FailureHandler, FailureMapper, DEFAULT_SCHEME, TRANSLATION_SUBCODE, UNHANDLED_SUBCODE,
};
pub use path::{join_path, normalize_root, PathPattern, PathSegment};
