//! Error types for Covenant.
//!
//! Errors fall into three groups that never mix:
//!
//! | Type | Raised when | Recoverable at call time |
//! |---|---|---|
//! | [`ContractError`] | building a contract, registering translators or handlers | no, abort startup |
//! | [`TranslationError`] | a single value cannot be converted in the requested direction | per value |
//! | [`CommunicationError`] | the transport, or the response it returned, is unusable | mapped into an outcome |
//!
//! Domain failures raised by operation bodies are modelled separately as
//! [`Failure`](crate::Failure).

use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// Result alias for translations.
pub type TranslationResult<T> = Result<T, TranslationError>;

/// Result alias for configuration-time operations.
pub type ContractResult<T> = Result<T, ContractError>;

/// A value could not be converted between its native and wire forms.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TranslationError {
    /// The wire text is not a valid representation of the target type.
    #[error("malformed {target} value '{input}': {reason}")]
    Malformed {
        /// Target type name.
        target: String,
        /// The offending input.
        input: String,
        /// What went wrong.
        reason: String,
    },

    /// The value parsed but does not fit the target type.
    #[error("{target} value '{input}' is out of range")]
    OutOfRange {
        /// Target type name.
        target: String,
        /// The offending input.
        input: String,
    },

    /// The native value is not of the type the translator handles.
    #[error("type mismatch: expected {expected}, got {actual}")]
    TypeMismatch {
        /// Type the translator handles.
        expected: String,
        /// Type that was supplied.
        actual: String,
    },

    /// The translator does not support this direction.
    #[error("translation of {target} from the wire is not supported")]
    Unsupported {
        /// Target type name.
        target: String,
    },
}

impl TranslationError {
    /// Creates a malformed-input error.
    #[must_use]
    pub fn malformed(
        target: impl Into<String>,
        input: impl Into<String>,
        reason: impl fmt::Display,
    ) -> Self {
        Self::Malformed {
            target: target.into(),
            input: input.into(),
            reason: reason.to_string(),
        }
    }

    /// Creates an out-of-range error.
    #[must_use]
    pub fn out_of_range(target: impl Into<String>, input: impl Into<String>) -> Self {
        Self::OutOfRange {
            target: target.into(),
            input: input.into(),
        }
    }

    /// Creates a type mismatch error.
    #[must_use]
    pub fn mismatch(expected: impl Into<String>, actual: impl Into<String>) -> Self {
        Self::TypeMismatch {
            expected: expected.into(),
            actual: actual.into(),
        }
    }

    /// Creates an unsupported-direction error.
    #[must_use]
    pub fn unsupported(target: impl Into<String>) -> Self {
        Self::Unsupported {
            target: target.into(),
        }
    }
}

/// A contract declaration or runtime setup is invalid.
///
/// These are fatal at build/setup time.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ContractError {
    /// The contract has no name.
    #[error("contract name must be given")]
    MissingName,

    /// The contract declares no versions.
    #[error("contract '{contract}' must have at least one version")]
    MissingVersions {
        /// Contract name.
        contract: String,
    },

    /// A declared operation cannot be invoked.
    #[error("operation '{contract}.{operation}' is not invocable")]
    NotInvocable {
        /// Contract name.
        contract: String,
        /// Operation name.
        operation: String,
    },

    /// Two operations share a name.
    #[error("operation '{operation}' is declared more than once in '{contract}'")]
    DuplicateOperation {
        /// Contract name.
        contract: String,
        /// Operation name.
        operation: String,
    },

    /// The verb/path pattern cannot be parsed.
    #[error("invalid path pattern '{pattern}' for '{operation}': {reason}")]
    InvalidPattern {
        /// Operation name.
        operation: String,
        /// The offending pattern.
        pattern: String,
        /// What went wrong.
        reason: String,
    },

    /// Declared path parameters do not match the pattern's placeholders.
    #[error(
        "operation '{operation}' declares {declared} path parameter(s) but its path has {placeholders} placeholder(s)"
    )]
    PathParameterMismatch {
        /// Operation name.
        operation: String,
        /// Number of declared path parameters.
        declared: usize,
        /// Number of placeholders in the pattern.
        placeholders: usize,
    },

    /// A path parameter is declared out of order or under a different name.
    #[error("operation '{operation}' path parameter {position} is '{declared}' but the path names '{expected}'")]
    PathParameterName {
        /// Operation name.
        operation: String,
        /// Zero-based position.
        position: usize,
        /// Declared name.
        declared: String,
        /// Name in the pattern.
        expected: String,
    },

    /// Two parameters share a slot and name.
    #[error("operation '{operation}' declares {slot} parameter '{name}' more than once")]
    DuplicateParameter {
        /// Operation name.
        operation: String,
        /// Binding slot.
        slot: String,
        /// Parameter name.
        name: String,
    },

    /// No translator can be resolved for a descriptor.
    #[error("no translator for type '{descriptor}' used by '{operation}.{parameter}'")]
    MissingTranslator {
        /// Operation name.
        operation: String,
        /// Parameter name, or `return`.
        parameter: String,
        /// The descriptor that could not be resolved.
        descriptor: String,
    },

    /// A parameter is marked required but also carries a default.
    #[error("parameter '{operation}.{parameter}' is required but declares a default value")]
    DefaultConflict {
        /// Operation name.
        operation: String,
        /// Parameter name.
        parameter: String,
    },

    /// A translator is already registered for the descriptor.
    #[error("a translator for '{descriptor}' is already registered")]
    DuplicateTranslator {
        /// The descriptor.
        descriptor: String,
    },

    /// A failure handler is already registered for the category.
    #[error("a failure handler for category '{category}' already exists")]
    DuplicateHandler {
        /// The failure category.
        category: String,
    },
}

/// How a remote call failed to communicate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommunicationKind {
    /// The server could not be reached.
    Unreachable,
    /// The exchange did not complete in time.
    Timeout,
    /// The server answered with a body the codec cannot parse.
    InvalidResponse,
    /// The body parsed but did not match the expected envelope or return type.
    UnexpectedData,
    /// Any other transport failure.
    Failed,
}

impl CommunicationKind {
    /// Returns the machine-readable subcode for this kind.
    #[must_use]
    pub const fn subcode(&self) -> &'static str {
        match self {
            Self::Unreachable => "communication_unreachable",
            Self::Timeout => "communication_timeout",
            Self::InvalidResponse => "invalid_response",
            Self::UnexpectedData => "unexpected_data",
            Self::Failed => "communication_failure",
        }
    }
}

impl fmt::Display for CommunicationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.subcode())
    }
}

/// A remote call failed for reasons outside the operation's own logic.
///
/// The message always names the target operation URL and the original cause
/// is preserved.
#[derive(Error, Debug, Clone)]
#[error("{message}")]
pub struct CommunicationError {
    kind: CommunicationKind,
    message: String,
    #[source]
    source: Option<Arc<dyn std::error::Error + Send + Sync>>,
}

impl CommunicationError {
    /// Creates a communication error.
    #[must_use]
    pub fn new(kind: CommunicationKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            source: None,
        }
    }

    /// Server unreachable.
    #[must_use]
    pub fn unreachable(url: &str) -> Self {
        Self::new(
            CommunicationKind::Unreachable,
            format!("Could not reach '{url}'."),
        )
    }

    /// Call timed out.
    #[must_use]
    pub fn timeout(url: &str) -> Self {
        Self::new(
            CommunicationKind::Timeout,
            format!("Timed out while communicating with '{url}'."),
        )
    }

    /// Response body could not be parsed.
    #[must_use]
    pub fn invalid_response(url: &str) -> Self {
        Self::new(
            CommunicationKind::InvalidResponse,
            format!("Invalid response from '{url}'."),
        )
    }

    /// Response body did not match the declared types.
    #[must_use]
    pub fn unexpected_data(url: &str) -> Self {
        Self::new(
            CommunicationKind::UnexpectedData,
            format!(
                "Unexpected data while converting response from '{url}'. \
                 Verify defined parameter and return types match what is sent on the wire."
            ),
        )
    }

    /// Attaches the underlying cause.
    #[must_use]
    pub fn with_source(mut self, source: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.source = Some(Arc::new(source));
        self
    }

    /// Returns the failure kind.
    #[must_use]
    pub fn kind(&self) -> CommunicationKind {
        self.kind
    }

    /// Returns the message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_translation_error_display() {
        let err = TranslationError::malformed("i32", "abc", "invalid digit");
        assert_eq!(err.to_string(), "malformed i32 value 'abc': invalid digit");

        let err = TranslationError::out_of_range("i32", "99999999999");
        assert!(err.to_string().contains("out of range"));
    }

    #[test]
    fn test_contract_error_display() {
        let err = ContractError::MissingVersions {
            contract: "com.example.users".to_string(),
        };
        assert!(err.to_string().contains("at least one version"));

        let err = ContractError::DuplicateHandler {
            category: "not_found".to_string(),
        };
        assert!(err.to_string().contains("not_found"));
    }

    #[test]
    fn test_communication_error_names_url_and_keeps_cause() {
        let cause = TranslationError::unsupported("opaque");
        let err = CommunicationError::unexpected_data("users/{id}").with_source(cause.clone());
        assert_eq!(err.kind(), CommunicationKind::UnexpectedData);
        assert!(err.to_string().contains("users/{id}"));
        assert_eq!(err.source().map(|e| e.to_string()), Some(cause.to_string()));
    }

    #[test]
    fn test_kinds_have_distinct_subcodes() {
        let kinds = [
            CommunicationKind::Unreachable,
            CommunicationKind::Timeout,
            CommunicationKind::InvalidResponse,
            CommunicationKind::UnexpectedData,
            CommunicationKind::Failed,
        ];
        let subcodes: std::collections::HashSet<_> = kinds.iter().map(|k| k.subcode()).collect();
        assert_eq!(subcodes.len(), kinds.len());
    }
}
