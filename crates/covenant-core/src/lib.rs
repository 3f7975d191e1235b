//! # Covenant Core
//!
//! Core types shared by every Covenant crate.
//!
//! - [`TypeDescriptor`] - Structural key used to look up translators
//! - [`Native`] and [`Semantic`] - Native values and the typed bridge into them
//! - [`Status`] and [`Outcome`] - The structured result of an invocation
//! - [`Envelope`] - The JSON shape outcomes travel in
//! - [`Failure`] - Domain failures tagged with a [`FailureCategory`]
//! - [`ContractError`], [`TranslationError`], [`CommunicationError`] - Error taxonomy
//! - [`Transport`] and [`WireCodec`] - Collaborators the call pipeline drives

#![doc(html_root_url = "https://docs.rs/covenant-core/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod codec;
pub mod descriptor;
mod envelope;
mod error;
mod failure;
mod native;
mod outcome;
mod status;
mod transport;

pub use codec::{CodecError, JsonCodec, WireCodec};
pub use descriptor::{names, Shape, TypeDescriptor};
pub use envelope::{Envelope, RETURN_FIELD};
pub use error::{
    CommunicationError, CommunicationKind, ContractError, ContractResult, TranslationError,
    TranslationResult,
};
pub use failure::{DependencyProblem, Failure, FailureCategory, FailureDetail};
pub use native::{ContractEnum, Json, Native, Opaque, Semantic};
pub use outcome::{Cause, Outcome};
pub use status::Status;
pub use transport::{Transport, TransportError, WireRequest, WireResponse};
