//! Domain failures raised by operation bodies and the call pipeline.
//!
//! Every [`Failure`] carries an explicit [`FailureCategory`] chosen at
//! construction. The failure mapper dispatches on that tag.

use crate::error::{CommunicationError, CommunicationKind, TranslationError};
use crate::status::Status;
use std::borrow::Cow;
use std::error::Error as StdError;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// The category a failure belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FailureCategory {
    /// A dependency misbehaved.
    Dependency,
    /// A parameter value was rejected.
    InvalidParameter,
    /// The target is in the wrong state.
    InvalidState,
    /// Something referred to does not exist.
    NotFound,
    /// The caller is not authorized.
    Authorization,
    /// A remote call could not complete.
    Communication,
    /// A value could not be translated.
    Translation,
    /// An application-defined category.
    Other(Cow<'static, str>),
}

impl FailureCategory {
    /// Returns the category name.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Dependency => "dependency",
            Self::InvalidParameter => "invalid_parameter",
            Self::InvalidState => "invalid_state",
            Self::NotFound => "not_found",
            Self::Authorization => "authorization",
            Self::Communication => "communication",
            Self::Translation => "translation",
            Self::Other(name) => name,
        }
    }
}

impl fmt::Display for FailureCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// What went wrong with a dependency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DependencyProblem {
    /// The dependency returned an error.
    Error,
    /// The dependency is not available.
    Unavailable,
    /// The dependency took too long.
    Timeout,
    /// Talking to the dependency failed.
    CommunicationFailure,
}

impl DependencyProblem {
    /// The status reported for this problem.
    #[must_use]
    pub const fn status(&self) -> Status {
        match self {
            Self::Error => Status::DependencyError,
            Self::Unavailable => Status::DependencyUnavailable,
            Self::Timeout => Status::DependencyTimeout,
            Self::CommunicationFailure => Status::DependencyCommunicationFailure,
        }
    }
}

/// Category-specific data carried by a failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureDetail {
    /// Nothing beyond the message.
    None,
    /// Dependency problem.
    Dependency {
        /// The problem.
        problem: DependencyProblem,
    },
    /// The rejected parameter.
    InvalidParameter {
        /// Parameter name.
        name: String,
    },
    /// The missing thing.
    NotFound {
        /// Identifier that could not be found.
        identifier: String,
    },
    /// Challenge data.
    Authorization {
        /// Authentication scheme, if not the default.
        scheme: Option<String>,
        /// Realm, if not the contract name.
        realm: Option<String>,
    },
    /// Communication failure kind.
    Communication {
        /// The kind.
        kind: CommunicationKind,
    },
}

/// A domain failure with an explicit category.
///
/// # Example
///
/// ```
/// use covenant_core::{Failure, FailureCategory};
///
/// let failure = Failure::not_found("user-42", "no such user");
/// assert_eq!(failure.category(), &FailureCategory::NotFound);
/// assert_eq!(failure.to_string(), "no such user");
/// ```
#[derive(Error, Debug, Clone)]
#[error("{message}")]
pub struct Failure {
    category: FailureCategory,
    message: String,
    detail: FailureDetail,
    #[source]
    source: Option<Arc<dyn StdError + Send + Sync>>,
}

impl Failure {
    /// Creates a failure of any category.
    #[must_use]
    pub fn new(category: FailureCategory, message: impl Into<String>) -> Self {
        Self {
            category,
            message: message.into(),
            detail: FailureDetail::None,
            source: None,
        }
    }

    /// A dependency failure.
    #[must_use]
    pub fn dependency(problem: DependencyProblem, message: impl Into<String>) -> Self {
        Self::new(FailureCategory::Dependency, message)
            .with_detail(FailureDetail::Dependency { problem })
    }

    /// A rejected parameter.
    #[must_use]
    pub fn invalid_parameter(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(FailureCategory::InvalidParameter, message)
            .with_detail(FailureDetail::InvalidParameter { name: name.into() })
    }

    /// The target is in the wrong state.
    #[must_use]
    pub fn invalid_state(message: impl Into<String>) -> Self {
        Self::new(FailureCategory::InvalidState, message)
    }

    /// Something could not be found.
    #[must_use]
    pub fn not_found(identifier: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(FailureCategory::NotFound, message).with_detail(FailureDetail::NotFound {
            identifier: identifier.into(),
        })
    }

    /// The caller is not authorized, using the default challenge.
    #[must_use]
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(FailureCategory::Authorization, message).with_detail(
            FailureDetail::Authorization {
                scheme: None,
                realm: None,
            },
        )
    }

    /// Sets the challenge scheme and realm of an authorization failure.
    #[must_use]
    pub fn with_challenge(mut self, scheme: impl Into<String>, realm: impl Into<String>) -> Self {
        self.detail = FailureDetail::Authorization {
            scheme: Some(scheme.into()),
            realm: Some(realm.into()),
        };
        self
    }

    /// An application-defined failure.
    #[must_use]
    pub fn other(category: impl Into<Cow<'static, str>>, message: impl Into<String>) -> Self {
        Self::new(FailureCategory::Other(category.into()), message)
    }

    /// Replaces the detail.
    #[must_use]
    pub fn with_detail(mut self, detail: FailureDetail) -> Self {
        self.detail = detail;
        self
    }

    /// Attaches the underlying cause.
    #[must_use]
    pub fn with_source(mut self, source: impl StdError + Send + Sync + 'static) -> Self {
        self.source = Some(Arc::new(source));
        self
    }

    /// Attaches an `anyhow` error as the underlying cause.
    #[must_use]
    pub fn with_anyhow(mut self, source: anyhow::Error) -> Self {
        let boxed: Box<dyn StdError + Send + Sync> = source.into();
        self.source = Some(Arc::from(boxed));
        self
    }

    /// Returns the category.
    #[must_use]
    pub fn category(&self) -> &FailureCategory {
        &self.category
    }

    /// Returns the message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns the category-specific detail.
    #[must_use]
    pub fn detail(&self) -> &FailureDetail {
        &self.detail
    }

    /// Returns the underlying cause.
    #[must_use]
    pub fn cause(&self) -> Option<&Arc<dyn StdError + Send + Sync>> {
        self.source.as_ref()
    }
}

impl From<CommunicationError> for Failure {
    fn from(err: CommunicationError) -> Self {
        let kind = err.kind();
        Self::new(FailureCategory::Communication, err.message())
            .with_detail(FailureDetail::Communication { kind })
            .with_source(err)
    }
}

impl From<TranslationError> for Failure {
    fn from(err: TranslationError) -> Self {
        Self::new(FailureCategory::Translation, err.to_string()).with_source(err)
    }
}

impl From<anyhow::Error> for Failure {
    fn from(err: anyhow::Error) -> Self {
        Self::other("unhandled", err.to_string()).with_anyhow(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constructors_set_category_and_detail() {
        let failure = Failure::invalid_parameter("age", "must be positive");
        assert_eq!(failure.category(), &FailureCategory::InvalidParameter);
        assert_eq!(
            failure.detail(),
            &FailureDetail::InvalidParameter { name: "age".into() }
        );

        let failure = Failure::dependency(DependencyProblem::Timeout, "slow");
        assert_eq!(failure.category(), &FailureCategory::Dependency);
    }

    #[test]
    fn test_challenge() {
        let failure = Failure::unauthorized("nope").with_challenge("Bearer", "users");
        assert_eq!(
            failure.detail(),
            &FailureDetail::Authorization {
                scheme: Some("Bearer".into()),
                realm: Some("users".into()),
            }
        );
    }

    #[test]
    fn test_from_communication_error_keeps_kind_and_cause() {
        let failure = Failure::from(CommunicationError::timeout("users/7"));
        assert_eq!(failure.category(), &FailureCategory::Communication);
        assert_eq!(
            failure.detail(),
            &FailureDetail::Communication {
                kind: CommunicationKind::Timeout
            }
        );
        assert!(failure.message().contains("users/7"));
        assert!(failure.source().is_some());
    }

    #[test]
    fn test_from_anyhow() {
        let failure = Failure::from(anyhow::anyhow!("disk full"));
        assert_eq!(failure.category().name(), "unhandled");
        assert!(failure.cause().is_some());
    }

    #[test]
    fn test_dependency_problem_status() {
        assert_eq!(
            DependencyProblem::Unavailable.status(),
            Status::DependencyUnavailable
        );
        assert_eq!(
            DependencyProblem::CommunicationFailure.status(),
            Status::DependencyCommunicationFailure
        );
    }
}
