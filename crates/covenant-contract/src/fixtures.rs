//! Ready-made contracts for tests.
//!
//! # Example
//!
//! ```
//! use covenant_contract::fixtures;
//!
//! let contract = fixtures::user_service_contract().unwrap();
//! assert!(contract.operation("get_user").is_some());
//! ```

use crate::builder::ContractBuilder;
use crate::contract::Contract;
use crate::declaration::{ContractDeclaration, OperationDeclaration, ParameterDeclaration};
use covenant_core::{ContractResult, Status};
use std::sync::Arc;

/// Name of the echo contract.
pub const ECHO_CONTRACT: &str = "com.example.echo";

/// Name of the user service contract.
pub const USER_SERVICE_CONTRACT: &str = "com.example.users";

/// A contract with one operation, `echo`, answering `GET | POST : echo`.
///
/// `echo` takes a text query parameter `value` and returns text.
#[must_use]
pub fn echo_declaration() -> ContractDeclaration {
    ContractDeclaration::new(ECHO_CONTRACT)
        .description("Returns what it is given")
        .version("1.0")
        .operation(
            OperationDeclaration::new("echo", "GET | POST : echo")
                .parameter(ParameterDeclaration::query::<String>("value"))
                .returns::<String>(),
        )
}

/// Builds [`echo_declaration`] with no root path.
pub fn echo_contract() -> ContractResult<Arc<Contract>> {
    ContractBuilder::new().build(&echo_declaration(), "")
}

/// A user management contract:
///
/// - `get_user` - `GET : users/{id}`, optional `session` cookie
/// - `list_users` - `GET : users`, `limit` query defaulting to 20
/// - `create_user` - `POST : users`, `name` and `email` body fields, optional
///   `x-request-id` header, reports `operation_created`
/// - `delete_user` - `DELETE : users/{id}`, no payload
#[must_use]
pub fn user_service_declaration() -> ContractDeclaration {
    ContractDeclaration::new(USER_SERVICE_CONTRACT)
        .description("User management")
        .version("1.0")
        .version("1.1")
        .operation(
            OperationDeclaration::new("get_user", "GET : users/{id}")
                .description("Retrieves a user by id")
                .parameter(ParameterDeclaration::path::<i64>("id"))
                .parameter(ParameterDeclaration::cookie::<String>("session").optional())
                .returns::<serde_json::Value>(),
        )
        .operation(
            OperationDeclaration::new("list_users", "GET : users")
                .parameter(ParameterDeclaration::query::<i32>("limit").with_default("20"))
                .returns::<serde_json::Value>(),
        )
        .operation(
            OperationDeclaration::new("create_user", "POST : users")
                .version("1.1")
                .parameter(ParameterDeclaration::body::<String>("name"))
                .parameter(ParameterDeclaration::body::<String>("email"))
                .parameter(ParameterDeclaration::header::<String>("x-request-id").optional())
                .returns::<serde_json::Value>()
                .status(Status::OperationCreated),
        )
        .operation(
            OperationDeclaration::new("delete_user", "DELETE : users/{id}")
                .parameter(ParameterDeclaration::path::<i64>("id")),
        )
}

/// Builds [`user_service_declaration`] under the `api` root path.
pub fn user_service_contract() -> ContractResult<Arc<Contract>> {
    ContractBuilder::new().build(&user_service_declaration(), "/api/*")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::declaration::Slot;

    #[test]
    fn test_echo_contract() {
        let contract = echo_contract().unwrap();
        let echo = contract.operation("echo").unwrap();
        assert_eq!(echo.url(), "echo");
        assert_eq!(echo.verbs().len(), 2);
        assert!(echo.parameter(Slot::Query, "value").unwrap().is_required());
    }

    #[test]
    fn test_user_service_contract() {
        let contract = user_service_contract().unwrap();
        assert_eq!(contract.operations().len(), 4);
        assert_eq!(contract.operation("get_user").unwrap().url(), "api/users/{id}");
        assert!(contract.operation("delete_user").unwrap().returns().is_none());
    }
}
