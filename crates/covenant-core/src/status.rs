//! Outcome status codes.
//!
//! Statuses group into four families:
//!
//! | Family | Statuses |
//! |---|---|
//! | success | `OperationCompleted`, `OperationCreated`, `OperationAsync`, `OperationNotModified` |
//! | caller error | `CallerBadInput`, `CallerUnauthorized`, `CallerForbidden`, `CallerNotFound`, `CallerBadState`, `CallerTimeout` |
//! | local error | `LocalError`, `LocalUnavailable` |
//! | dependency error | `DependencyError`, `DependencyUnavailable`, `DependencyTimeout`, `DependencyCommunicationFailure` |
//!
//! Each status serializes in `snake_case` and knows the HTTP code it is sent
//! with.

use http::StatusCode;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The status of an [`Outcome`](crate::Outcome).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    /// The operation completed.
    OperationCompleted,
    /// The operation created a new entity.
    OperationCreated,
    /// The operation was accepted and continues asynchronously.
    OperationAsync,
    /// Nothing changed since the caller's copy.
    OperationNotModified,
    /// The caller sent invalid input.
    CallerBadInput,
    /// The caller is not authenticated.
    CallerUnauthorized,
    /// The caller is not allowed to do this.
    CallerForbidden,
    /// Something the caller referred to does not exist.
    CallerNotFound,
    /// The target is in a state that does not allow the call.
    CallerBadState,
    /// The caller took too long.
    CallerTimeout,
    /// The service failed locally.
    LocalError,
    /// The service is not available.
    LocalUnavailable,
    /// A dependency failed.
    DependencyError,
    /// A dependency is not available.
    DependencyUnavailable,
    /// A dependency took too long.
    DependencyTimeout,
    /// Communication with a dependency failed.
    DependencyCommunicationFailure,
}

impl Status {
    /// Returns the HTTP status code this status is sent with.
    #[must_use]
    pub const fn http_status(&self) -> StatusCode {
        match self {
            Self::OperationCompleted => StatusCode::OK,
            Self::OperationCreated => StatusCode::CREATED,
            Self::OperationAsync => StatusCode::ACCEPTED,
            Self::OperationNotModified => StatusCode::NOT_MODIFIED,
            Self::CallerBadInput => StatusCode::BAD_REQUEST,
            Self::CallerUnauthorized => StatusCode::UNAUTHORIZED,
            Self::CallerForbidden => StatusCode::FORBIDDEN,
            Self::CallerNotFound => StatusCode::NOT_FOUND,
            Self::CallerBadState => StatusCode::CONFLICT,
            Self::CallerTimeout => StatusCode::REQUEST_TIMEOUT,
            Self::LocalError => StatusCode::INTERNAL_SERVER_ERROR,
            Self::LocalUnavailable | Self::DependencyUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            Self::DependencyError | Self::DependencyCommunicationFailure => StatusCode::BAD_GATEWAY,
            Self::DependencyTimeout => StatusCode::GATEWAY_TIMEOUT,
        }
    }

    /// Returns the numeric HTTP code.
    #[must_use]
    pub fn code(&self) -> u16 {
        self.http_status().as_u16()
    }

    /// Returns `true` for the success family.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(
            self,
            Self::OperationCompleted
                | Self::OperationCreated
                | Self::OperationAsync
                | Self::OperationNotModified
        )
    }

    /// Derives a status from a numeric code found on the wire.
    ///
    /// `0` and unlisted 2xx codes mean `OperationCompleted`; unlisted 4xx
    /// codes mean `CallerBadInput`; anything else unlisted is a `LocalError`.
    #[must_use]
    pub const fn from_code(code: u16) -> Self {
        match code {
            0 | 200 => Self::OperationCompleted,
            201 => Self::OperationCreated,
            202 => Self::OperationAsync,
            304 => Self::OperationNotModified,
            401 => Self::CallerUnauthorized,
            403 => Self::CallerForbidden,
            404 => Self::CallerNotFound,
            408 => Self::CallerTimeout,
            409 => Self::CallerBadState,
            502 => Self::DependencyError,
            503 => Self::LocalUnavailable,
            504 => Self::DependencyTimeout,
            203..=299 => Self::OperationCompleted,
            400..=499 => Self::CallerBadInput,
            _ => Self::LocalError,
        }
    }

    /// Returns the `snake_case` wire name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::OperationCompleted => "operation_completed",
            Self::OperationCreated => "operation_created",
            Self::OperationAsync => "operation_async",
            Self::OperationNotModified => "operation_not_modified",
            Self::CallerBadInput => "caller_bad_input",
            Self::CallerUnauthorized => "caller_unauthorized",
            Self::CallerForbidden => "caller_forbidden",
            Self::CallerNotFound => "caller_not_found",
            Self::CallerBadState => "caller_bad_state",
            Self::CallerTimeout => "caller_timeout",
            Self::LocalError => "local_error",
            Self::LocalUnavailable => "local_unavailable",
            Self::DependencyError => "dependency_error",
            Self::DependencyUnavailable => "dependency_unavailable",
            Self::DependencyTimeout => "dependency_timeout",
            Self::DependencyCommunicationFailure => "dependency_communication_failure",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
