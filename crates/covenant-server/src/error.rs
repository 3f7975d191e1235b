//! Inbound request errors.

use covenant_core::Failure;
use thiserror::Error;

/// A raw request could not be read into an [`InboundRequest`](crate::InboundRequest).
#[derive(Error, Debug)]
pub enum InboundError {
    /// The query string is not valid `application/x-www-form-urlencoded`.
    #[error("invalid query string: {0}")]
    InvalidQuery(#[source] serde_urlencoded::de::Error),

    /// The form body is not valid `application/x-www-form-urlencoded`.
    #[error("invalid form body: {0}")]
    InvalidForm(#[source] serde_urlencoded::de::Error),

    /// The `Cookie` header is not valid UTF-8.
    #[error("invalid UTF-8 in Cookie header")]
    InvalidCookieHeader,
}

impl InboundError {
    /// Which part of the request was rejected.
    #[must_use]
    pub const fn part(&self) -> &'static str {
        match self {
            Self::InvalidQuery(_) => "query",
            Self::InvalidForm(_) => "body",
            Self::InvalidCookieHeader => "cookie",
        }
    }
}

impl From<InboundError> for Failure {
    fn from(err: InboundError) -> Self {
        Self::invalid_parameter(err.part(), err.to_string()).with_source(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use covenant_core::{FailureCategory, FailureDetail};

    #[test]
    fn test_into_failure() {
        let failure = Failure::from(InboundError::InvalidCookieHeader);
        assert_eq!(failure.category(), &FailureCategory::InvalidParameter);
        assert_eq!(
            failure.detail(),
            &FailureDetail::InvalidParameter {
                name: "cookie".to_string()
            }
        );
        assert!(failure.cause().is_some());
    }
}
