//! Client error types.
//!
//! Only programmer errors are reported as errors. Everything that depends on
//! the network or the remote service comes back as an
//! [`Outcome`](covenant_core::Outcome).

use covenant_contract::Slot;
use covenant_core::TranslationError;
use thiserror::Error;

/// A session was used in a way its operation does not allow.
#[derive(Error, Debug)]
pub enum UsageError {
    /// The contract has no such operation.
    #[error("contract '{contract}' has no operation '{operation}'")]
    UnknownOperation {
        /// Contract name.
        contract: String,
        /// Requested operation.
        operation: String,
    },

    /// Wrong number of path values.
    #[error("'{operation}' takes {expected} path value(s), got {actual}")]
    PathArity {
        /// Qualified operation name.
        operation: String,
        /// Declared path parameters.
        expected: usize,
        /// Values supplied.
        actual: usize,
    },

    /// The operation declares no such parameter in that slot.
    #[error("'{operation}' has no {slot} parameter '{name}'")]
    UnknownParameter {
        /// Qualified operation name.
        operation: String,
        /// Slot searched.
        slot: Slot,
        /// Parameter name.
        name: String,
    },

    /// The verb is not declared for the operation.
    #[error("'{operation}' does not accept verb {verb}")]
    UnsupportedVerb {
        /// Qualified operation name.
        operation: String,
        /// Rejected verb.
        verb: String,
    },

    /// A value could not be translated to wire form.
    #[error("cannot translate '{parameter}' of '{operation}': {source}")]
    Translation {
        /// Qualified operation name.
        operation: String,
        /// Parameter name.
        parameter: String,
        /// Underlying error.
        #[source]
        source: TranslationError,
    },

    /// A header parameter produced text that is not a valid header.
    #[error("invalid header '{name}': {reason}")]
    InvalidHeader {
        /// Header name.
        name: String,
        /// Why it was rejected.
        reason: String,
    },

    /// The session has already been executed.
    #[error("'{operation}' was already executed by this session")]
    AlreadyExecuted {
        /// Qualified operation name.
        operation: String,
    },
}

/// A client could not be constructed.
#[derive(Error, Debug)]
pub enum ClientError {
    /// The HTTP client could not be built.
    #[error("failed to build HTTP client: {0}")]
    Http(#[from] reqwest::Error),

    /// A configured header is invalid.
    #[error("invalid header '{name}': {reason}")]
    InvalidHeader {
        /// Header name.
        name: String,
        /// Why it was rejected.
        reason: String,
    },
}
