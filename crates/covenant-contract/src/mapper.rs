//! Maps failures to outcomes.
//!
//! A [`FailureMapper`] holds at most one handler per [`FailureCategory`].
//! [`to_result`](FailureMapper::to_result) never fails: unknown categories
//! become a `local_error` outcome, and a handler that panics is replaced by
//! a fallback outcome naming both problems.
//!
//! Handlers are registered through `&mut self` during setup. Once the mapper
//! is shared (typically behind an `Arc`) the table is read-only, so
//! registration and mapping never overlap.
//!
//! | Category | Status | Subcode |
//! |---|---|---|
//! | dependency | from the problem | |
//! | invalid parameter | `caller_bad_input` | parameter name |
//! | invalid state | `caller_bad_state` | |
//! | not found | `caller_not_found` | missing identifier |
//! | authorization | `caller_unauthorized` | |
//! | communication | from the kind | kind subcode |
//! | translation | `local_error` | `translation_failure` |
//! | anything else | `local_error` | `unhandled_failure` |

use crate::contract::Operation;
use covenant_core::{
    CommunicationKind, ContractError, ContractResult, Failure, FailureCategory, FailureDetail,
    Outcome, Status,
};
use http::header::WWW_AUTHENTICATE;
use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::panic::{catch_unwind, AssertUnwindSafe};
use tracing::{error, info};

/// Subcode for failures no handler covers.
pub const UNHANDLED_SUBCODE: &str = "unhandled_failure";

/// Subcode for translation failures.
pub const TRANSLATION_SUBCODE: &str = "translation_failure";

/// Scheme used in authorization challenges when none is given.
pub const DEFAULT_SCHEME: &str = "default";

/// A failure handler.
pub type FailureHandler = Box<dyn Fn(&Operation, &Failure) -> Outcome + Send + Sync>;

/// Per-category table of failure handlers.
pub struct FailureMapper {
    handlers: HashMap<FailureCategory, FailureHandler>,
}

impl FailureMapper {
    /// Creates a mapper with the built-in handlers.
    #[must_use]
    pub fn new() -> Self {
        let mut handlers: HashMap<FailureCategory, FailureHandler> = HashMap::new();
        handlers.insert(FailureCategory::Dependency, Box::new(dependency));
        handlers.insert(FailureCategory::InvalidParameter, Box::new(invalid_parameter));
        handlers.insert(FailureCategory::InvalidState, Box::new(invalid_state));
        handlers.insert(FailureCategory::NotFound, Box::new(not_found));
        handlers.insert(FailureCategory::Authorization, Box::new(authorization));
        handlers.insert(FailureCategory::Communication, Box::new(communication));
        handlers.insert(FailureCategory::Translation, Box::new(translation));
        Self { handlers }
    }

    /// Creates a mapper with no handlers.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            handlers: HashMap::new(),
        }
    }

    /// Registers a handler for a category.
    ///
    /// # Errors
    ///
    /// Returns [`ContractError::DuplicateHandler`] if the category already
    /// has a handler.
    pub fn register_handler<F>(&mut self, category: FailureCategory, handler: F) -> ContractResult<()>
    where
        F: Fn(&Operation, &Failure) -> Outcome + Send + Sync + 'static,
    {
        if self.handlers.contains_key(&category) {
            return Err(ContractError::DuplicateHandler {
                category: category.to_string(),
            });
        }
        self.handlers.insert(category, Box::new(handler));
        Ok(())
    }

    /// Returns `true` if a handler exists for the category.
    #[must_use]
    pub fn handles(&self, category: &FailureCategory) -> bool {
        self.handlers.contains_key(category)
    }

    /// Converts a failure into an outcome. Never panics.
    #[must_use]
    pub fn to_result(&self, operation: &Operation, failure: &Failure) -> Outcome {
        let Some(handler) = self.handlers.get(failure.category()) else {
            return unhandled(operation, failure);
        };
        match catch_unwind(AssertUnwindSafe(|| handler(operation, failure))) {
            Ok(outcome) => {
                info!(
                    operation = %operation.qualified_name(),
                    category = %failure.category(),
                    status = %outcome.status(),
                    "Remapped a failure"
                );
                outcome
            }
            Err(panic) => fallback(operation, failure, &panic_message(panic.as_ref())),
        }
    }
}

impl Default for FailureMapper {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for FailureMapper {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut categories: Vec<_> = self.handlers.keys().map(FailureCategory::name).collect();
        categories.sort_unstable();
        f.debug_struct("FailureMapper")
            .field("categories", &categories)
            .finish()
    }
}

fn unhandled(operation: &Operation, failure: &Failure) -> Outcome {
    let message = format!(
        "Unmanaged failure '{}' occurred while running '{}'.",
        failure.category(),
        operation.qualified_name()
    );
    error!(
        operation = %operation.qualified_name(),
        category = %failure.category(),
        error = %failure,
        "{message}"
    );
    Outcome::failure(Status::LocalError)
        .with_subcode(UNHANDLED_SUBCODE)
        .with_message(message)
        .with_cause(failure.clone())
}

fn fallback(operation: &Operation, failure: &Failure, panic: &str) -> Outcome {
    let message = format!(
        "While attempting to handle failure '{}', which occurred while running '{}', a panic '{}' occurred.",
        failure.category(),
        operation.qualified_name(),
        panic
    );
    error!(operation = %operation.qualified_name(), "{message}");
    Outcome::failure(Status::LocalError)
        .with_subcode(UNHANDLED_SUBCODE)
        .with_message(message)
        .with_cause(failure.clone())
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    panic
        .downcast_ref::<&str>()
        .map(|s| (*s).to_string())
        .or_else(|| panic.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "panic".to_string())
}

fn dependency(_operation: &Operation, failure: &Failure) -> Outcome {
    let status = match failure.detail() {
        FailureDetail::Dependency { problem } => problem.status(),
        _ => Status::DependencyError,
    };
    Outcome::failure(status)
        .with_message(failure.message())
        .with_cause(failure.clone())
}

fn invalid_parameter(operation: &Operation, failure: &Failure) -> Outcome {
    let outcome = Outcome::failure(Status::CallerBadInput)
        .with_message(format!(
            "Received invalid data for '{}'.",
            operation.qualified_name()
        ))
        .with_cause(failure.clone());
    match failure.detail() {
        FailureDetail::InvalidParameter { name } => outcome.with_subcode(name.clone()),
        _ => outcome,
    }
}

fn invalid_state(operation: &Operation, failure: &Failure) -> Outcome {
    Outcome::failure(Status::CallerBadState)
        .with_message(format!(
            "'{}' indicated it is in an invalid state.",
            operation.qualified_name()
        ))
        .with_cause(failure.clone())
}

fn not_found(operation: &Operation, failure: &Failure) -> Outcome {
    let outcome = Outcome::failure(Status::CallerNotFound)
        .with_message(format!(
            "Cannot find necessary data for '{}'.",
            operation.qualified_name()
        ))
        .with_cause(failure.clone());
    match failure.detail() {
        FailureDetail::NotFound { identifier } => outcome.with_subcode(identifier.clone()),
        _ => outcome,
    }
}

fn authorization(operation: &Operation, failure: &Failure) -> Outcome {
    let (scheme, realm) = match failure.detail() {
        FailureDetail::Authorization { scheme, realm } => (scheme.clone(), realm.clone()),
        _ => (None, None),
    };
    let scheme = scheme.unwrap_or_else(|| DEFAULT_SCHEME.to_string());
    let realm = realm
        .or_else(|| operation.contract().map(|c| c.name().to_string()))
        .unwrap_or_default();
    Outcome::failure(Status::CallerUnauthorized)
        .with_message(format!(
            "Not authorized to execute method '{}'.",
            operation.qualified_name()
        ))
        .with_header(WWW_AUTHENTICATE.as_str(), format!("{scheme} realm=\"{realm}\""))
        .with_cause(failure.clone())
}

fn communication(_operation: &Operation, failure: &Failure) -> Outcome {
    let kind = match failure.detail() {
        FailureDetail::Communication { kind } => *kind,
        _ => CommunicationKind::Failed,
    };
    let status = match kind {
        CommunicationKind::Timeout => Status::DependencyTimeout,
        CommunicationKind::Unreachable => Status::DependencyUnavailable,
        CommunicationKind::InvalidResponse
        | CommunicationKind::UnexpectedData
        | CommunicationKind::Failed => Status::DependencyCommunicationFailure,
    };
    Outcome::failure(status)
        .with_subcode(kind.subcode())
        .with_message(failure.message())
        .with_cause(failure.clone())
}

fn translation(_operation: &Operation, failure: &Failure) -> Outcome {
    Outcome::failure(Status::LocalError)
        .with_subcode(TRANSLATION_SUBCODE)
        .with_message(failure.message())
        .with_cause(failure.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::user_service_contract;
    use covenant_core::{CommunicationError, DependencyProblem, TranslationError};

    fn mapped(failure: &Failure) -> Outcome {
        let contract = user_service_contract().unwrap();
        let operation = contract.operation("get_user").unwrap();
        FailureMapper::new().to_result(operation, failure)
    }

    #[test]
    fn test_not_found_uses_identifier_as_subcode() {
        let outcome = mapped(&Failure::not_found("user-42", "no such user"));
        assert_eq!(outcome.status(), Status::CallerNotFound);
        assert_eq!(outcome.subcode(), Some("user-42"));
        assert_eq!(
            outcome.message(),
            Some("Cannot find necessary data for 'com.example.users.get_user'.")
        );
        assert!(outcome.cause().is_some());
    }

    #[test]
    fn test_invalid_parameter_uses_name_as_subcode() {
        let outcome = mapped(&Failure::invalid_parameter("id", "not a number"));
        assert_eq!(outcome.status(), Status::CallerBadInput);
        assert_eq!(outcome.subcode(), Some("id"));
    }

    #[test]
    fn test_invalid_state() {
        let outcome = mapped(&Failure::invalid_state("locked"));
        assert_eq!(outcome.status(), Status::CallerBadState);
    }

    #[test]
    fn test_dependency_status_follows_problem() {
        let outcome = mapped(&Failure::dependency(DependencyProblem::Timeout, "slow"));
        assert_eq!(outcome.status(), Status::DependencyTimeout);
        assert_eq!(outcome.message(), Some("slow"));
    }

    #[test]
    fn test_authorization_default_challenge() {
        let outcome = mapped(&Failure::unauthorized("no token"));
        assert_eq!(outcome.status(), Status::CallerUnauthorized);
        assert_eq!(
            outcome.header("www-authenticate"),
            Some("default realm=\"com.example.users\"")
        );
    }

    #[test]
    fn test_authorization_explicit_challenge() {
        let outcome = mapped(&Failure::unauthorized("no token").with_challenge("Bearer", "admin"));
        assert_eq!(outcome.header("www-authenticate"), Some("Bearer realm=\"admin\""));
    }

    #[test]
    fn test_communication_kinds() {
        let outcome = mapped(&Failure::from(CommunicationError::timeout("users/7")));
        assert_eq!(outcome.status(), Status::DependencyTimeout);
        assert_eq!(outcome.subcode(), Some("communication_timeout"));

        let outcome = mapped(&Failure::from(CommunicationError::invalid_response("users/7")));
        assert_eq!(outcome.status(), Status::DependencyCommunicationFailure);
        assert_eq!(outcome.subcode(), Some("invalid_response"));

        let outcome = mapped(&Failure::from(CommunicationError::unreachable("users/7")));
        assert_eq!(outcome.status(), Status::DependencyUnavailable);
    }

    #[test]
    fn test_translation() {
        let outcome = mapped(&Failure::from(TranslationError::unsupported("opaque")));
        assert_eq!(outcome.status(), Status::LocalError);
        assert_eq!(outcome.subcode(), Some(TRANSLATION_SUBCODE));
    }

    #[test]
    fn test_unhandled_category() {
        let outcome = mapped(&Failure::other("quota", "over quota"));
        assert_eq!(outcome.status(), Status::LocalError);
        assert_eq!(outcome.subcode(), Some(UNHANDLED_SUBCODE));
        let message = outcome.message().unwrap();
        assert!(message.contains("quota"));
        assert!(message.contains("com.example.users.get_user"));
    }

    #[test]
    fn test_duplicate_registration_fails() {
        let mut mapper = FailureMapper::new();
        let err = mapper
            .register_handler(FailureCategory::NotFound, |_, _| Outcome::completed())
            .unwrap_err();
        assert!(matches!(err, ContractError::DuplicateHandler { .. }));

        mapper
            .register_handler(FailureCategory::Other("quota".into()), |_, failure| {
                Outcome::failure(Status::CallerForbidden).with_message(failure.message())
            })
            .unwrap();
        assert!(mapper.handles(&FailureCategory::Other("quota".into())));
    }

    #[test]
    fn test_custom_handler_is_used() {
        let contract = user_service_contract().unwrap();
        let operation = contract.operation("get_user").unwrap();
        let mut mapper = FailureMapper::empty();
        mapper
            .register_handler(FailureCategory::Other("quota".into()), |_, _| {
                Outcome::failure(Status::CallerForbidden).with_subcode("quota")
            })
            .unwrap();
        let outcome = mapper.to_result(operation, &Failure::other("quota", "over"));
        assert_eq!(outcome.status(), Status::CallerForbidden);
    }

    #[test]
    fn test_panicking_handler_falls_back() {
        let contract = user_service_contract().unwrap();
        let operation = contract.operation("get_user").unwrap();
        let mut mapper = FailureMapper::empty();
        mapper
            .register_handler(FailureCategory::InvalidState, |_, _| panic!("handler bug"))
            .unwrap();
        let outcome = mapper.to_result(operation, &Failure::invalid_state("locked"));
        assert_eq!(outcome.status(), Status::LocalError);
        assert_eq!(outcome.subcode(), Some(UNHANDLED_SUBCODE));
        assert!(outcome.message().unwrap().contains("handler bug"));
    }
}
