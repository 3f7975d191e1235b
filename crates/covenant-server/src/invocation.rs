//! Reading inbound parameters into native values.

use crate::inbound::InboundRequest;
use covenant_contract::{Operation, Parameter, Slot};
use covenant_core::{Failure, Native, Semantic};
use std::collections::HashMap;
use tracing::debug;

const SLOTS: [Slot; 5] = [Slot::Path, Slot::Query, Slot::Body, Slot::Header, Slot::Cookie];

/// The translated parameters of one inbound call.
///
/// Absent optional parameters without a default are simply missing.
#[derive(Debug, Clone, Default)]
pub struct Invocation {
    values: HashMap<(Slot, String), Native>,
}

impl Invocation {
    /// Translates every declared parameter of `operation` from `inbound`.
    ///
    /// A missing value falls back to the parameter's declared default.
    ///
    /// # Errors
    ///
    /// Returns an invalid-parameter [`Failure`] naming the first parameter
    /// that is required but missing, or whose text does not translate.
    pub fn read(operation: &Operation, inbound: &InboundRequest) -> Result<Self, Failure> {
        let mut values = HashMap::new();
        for slot in SLOTS {
            for parameter in operation.parameters(slot) {
                if let Some(value) = read_parameter(operation, parameter, inbound)? {
                    values.insert((slot, parameter.name().to_string()), value);
                }
            }
        }
        Ok(Self { values })
    }

    /// The native value of a parameter.
    #[must_use]
    pub fn get(&self, slot: Slot, name: &str) -> Option<&Native> {
        self.values.get(&(slot, name.to_string()))
    }

    /// Takes a parameter out as `T`.
    ///
    /// # Errors
    ///
    /// Fails with a translation failure if the value is not a `T`.
    pub fn take<T: Semantic>(&mut self, slot: Slot, name: &str) -> Result<Option<T>, Failure> {
        self.values
            .remove(&(slot, name.to_string()))
            .map(T::from_native)
            .transpose()
            .map_err(Failure::from)
    }

    /// Takes a parameter out as `T`, failing if it is absent.
    ///
    /// # Errors
    ///
    /// Fails with an invalid-parameter failure if absent, or a translation
    /// failure if the value is not a `T`.
    pub fn require<T: Semantic>(&mut self, slot: Slot, name: &str) -> Result<T, Failure> {
        self.take(slot, name)?.ok_or_else(|| {
            Failure::invalid_parameter(name, format!("Missing required parameter '{name}'."))
        })
    }

    /// Number of values read.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether no values were read.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

fn read_parameter(
    operation: &Operation,
    parameter: &Parameter,
    inbound: &InboundRequest,
) -> Result<Option<Native>, Failure> {
    let name = parameter.name();
    let text = match inbound.value(parameter.slot(), name) {
        Some(text) => text,
        None => match parameter.default_value() {
            Some(default) => {
                debug!(
                    operation = %operation.qualified_name(),
                    parameter = %name,
                    "Applying default value"
                );
                default
            }
            None if parameter.is_required() => {
                return Err(Failure::invalid_parameter(
                    name,
                    format!("Missing required parameter '{name}'."),
                ));
            }
            None => return Ok(None),
        },
    };

    parameter
        .translator()
        .from_wire(text)
        .map(Some)
        .map_err(|e| {
            Failure::invalid_parameter(
                name,
                format!("Cannot read parameter '{name}' of '{}'.", operation.qualified_name()),
            )
            .with_source(e)
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use covenant_contract::fixtures;
    use covenant_core::{FailureCategory, FailureDetail};

    fn rejected_name(failure: &Failure) -> &str {
        match failure.detail() {
            FailureDetail::InvalidParameter { name } => name,
            other => panic!("unexpected detail {other:?}"),
        }
    }

    #[test]
    fn test_read_path_and_cookie() {
        let contract = fixtures::user_service_contract().unwrap();
        let operation = contract.operation("get_user").unwrap();
        let inbound = InboundRequest::new()
            .with_path("id", "42")
            .with_cookie("session", "abc");

        let mut invocation = Invocation::read(operation, &inbound).unwrap();
        assert_eq!(invocation.len(), 2);
        assert_eq!(invocation.get(Slot::Path, "id"), Some(&Native::I64(42)));
        assert_eq!(invocation.require::<i64>(Slot::Path, "id").unwrap(), 42);
        assert_eq!(
            invocation.take::<String>(Slot::Cookie, "session").unwrap(),
            Some("abc".to_string())
        );
    }

    #[test]
    fn test_optional_parameter_may_be_absent() {
        let contract = fixtures::user_service_contract().unwrap();
        let operation = contract.operation("get_user").unwrap();
        let inbound = InboundRequest::new().with_path("id", "1");

        let mut invocation = Invocation::read(operation, &inbound).unwrap();
        assert!(invocation.get(Slot::Cookie, "session").is_none());
        assert!(invocation
            .take::<String>(Slot::Cookie, "session")
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_default_applied() {
        let contract = fixtures::user_service_contract().unwrap();
        let operation = contract.operation("list_users").unwrap();

        let invocation = Invocation::read(operation, &InboundRequest::new()).unwrap();
        assert_eq!(invocation.get(Slot::Query, "limit"), Some(&Native::I32(20)));

        let inbound = InboundRequest::new().with_query("limit", "5");
        let invocation = Invocation::read(operation, &inbound).unwrap();
        assert_eq!(invocation.get(Slot::Query, "limit"), Some(&Native::I32(5)));
    }

    #[test]
    fn test_missing_required() {
        let contract = fixtures::user_service_contract().unwrap();
        let operation = contract.operation("create_user").unwrap();
        let inbound = InboundRequest::new().with_body_field("name", "Ada");

        let failure = Invocation::read(operation, &inbound).unwrap_err();
        assert_eq!(failure.category(), &FailureCategory::InvalidParameter);
        assert_eq!(rejected_name(&failure), "email");
    }

    #[test]
    fn test_malformed_value() {
        let contract = fixtures::user_service_contract().unwrap();
        let operation = contract.operation("get_user").unwrap();
        let inbound = InboundRequest::new().with_path("id", "forty-two");

        let failure = Invocation::read(operation, &inbound).unwrap_err();
        assert_eq!(rejected_name(&failure), "id");
        assert!(failure.cause().is_some());
        assert!(failure.message().contains("com.example.users.get_user"));
    }

    #[test]
    fn test_require_wrong_type() {
        let contract = fixtures::user_service_contract().unwrap();
        let operation = contract.operation("get_user").unwrap();
        let inbound = InboundRequest::new().with_path("id", "7");

        let mut invocation = Invocation::read(operation, &inbound).unwrap();
        let failure = invocation.require::<String>(Slot::Path, "id").unwrap_err();
        assert_eq!(failure.category(), &FailureCategory::Translation);
    }
}
