//! Contract declarations.
//!
//! A declaration is the raw metadata a contract is built from: names,
//! versions, verb/path patterns, parameters and return types. It can be
//! written in code with the fluent helpers below or loaded from TOML/JSON.
//!
//! # Example
//!
//! ```
//! use covenant_contract::{ContractDeclaration, OperationDeclaration, ParameterDeclaration};
//!
//! let declaration = ContractDeclaration::new("com.example.echo")
//!     .version("1.0")
//!     .operation(
//!         OperationDeclaration::new("echo", "GET | POST : echo")
//!             .parameter(ParameterDeclaration::query::<String>("value"))
//!             .returns::<String>(),
//!     );
//! assert_eq!(declaration.operations.len(), 1);
//! ```
//!
//! The same declaration in TOML:
//!
//! ```toml
//! name = "com.example.echo"
//! versions = ["1.0"]
//!
//! [[operations]]
//! name = "echo"
//! pattern = "GET | POST : echo"
//! returns = { name = "string" }
//!
//! [[operations.parameters]]
//! name = "value"
//! slot = "query"
//! type = { name = "string" }
//! ```

use covenant_core::{Semantic, Status, TypeDescriptor};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// A declaration could not be loaded.
#[derive(Error, Debug)]
pub enum DeclarationError {
    /// Invalid TOML.
    #[error("invalid TOML declaration: {0}")]
    Toml(#[from] toml::de::Error),

    /// Invalid JSON.
    #[error("invalid JSON declaration: {0}")]
    Json(#[from] serde_json::Error),
}

/// Who a contract or operation is meant for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Visibility {
    /// Anyone.
    #[default]
    Public,
    /// Services within the same deployment.
    Internal,
    /// Diagnostics only.
    Debug,
}

/// Where a parameter travels in the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Slot {
    /// A path segment, by position.
    Path,
    /// A query string pair.
    Query,
    /// A form-encoded body field.
    Body,
    /// A request header.
    Header,
    /// A cookie.
    Cookie,
}

impl Slot {
    /// Lowercase slot name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Path => "path",
            Self::Query => "query",
            Self::Body => "body",
            Self::Header => "header",
            Self::Cookie => "cookie",
        }
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

const fn default_true() -> bool {
    true
}

/// A declared parameter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ParameterDeclaration {
    /// Parameter name. For path parameters, the placeholder name.
    pub name: String,
    /// Binding slot.
    pub slot: Slot,
    /// Semantic type.
    #[serde(rename = "type")]
    pub descriptor: TypeDescriptor,
    /// Whether a value must be supplied.
    #[serde(default = "default_true")]
    pub required: bool,
    /// Wire text used when no value is supplied.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,
}

impl ParameterDeclaration {
    /// Declares a required parameter.
    #[must_use]
    pub fn new(name: impl Into<String>, slot: Slot, descriptor: TypeDescriptor) -> Self {
        Self {
            name: name.into(),
            slot,
            descriptor,
            required: true,
            default: None,
        }
    }

    /// Declares a parameter whose type is `T`.
    #[must_use]
    pub fn of<T: Semantic>(name: impl Into<String>, slot: Slot) -> Self {
        Self::new(name, slot, T::descriptor())
    }

    /// A path parameter of type `T`.
    #[must_use]
    pub fn path<T: Semantic>(name: impl Into<String>) -> Self {
        Self::of::<T>(name, Slot::Path)
    }

    /// A query parameter of type `T`.
    #[must_use]
    pub fn query<T: Semantic>(name: impl Into<String>) -> Self {
        Self::of::<T>(name, Slot::Query)
    }

    /// A body parameter of type `T`.
    #[must_use]
    pub fn body<T: Semantic>(name: impl Into<String>) -> Self {
        Self::of::<T>(name, Slot::Body)
    }

    /// A header parameter of type `T`.
    #[must_use]
    pub fn header<T: Semantic>(name: impl Into<String>) -> Self {
        Self::of::<T>(name, Slot::Header)
    }

    /// A cookie parameter of type `T`.
    #[must_use]
    pub fn cookie<T: Semantic>(name: impl Into<String>) -> Self {
        Self::of::<T>(name, Slot::Cookie)
    }

    /// Marks the parameter optional.
    #[must_use]
    pub fn optional(mut self) -> Self {
        self.required = false;
        self
    }

    /// Sets the default wire text and marks the parameter optional.
    #[must_use]
    pub fn with_default(mut self, default: impl Into<String>) -> Self {
        self.required = false;
        self.default = Some(default.into());
        self
    }
}

/// A declared operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OperationDeclaration {
    /// Operation name, unique within the contract.
    pub name: String,
    /// Human-readable description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Supported versions. Empty means the contract's.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub versions: Vec<String>,
    /// Verb and path pattern, e.g. `GET | POST : items/{id}`.
    pub pattern: String,
    /// Parameters. Path parameters must follow the pattern's placeholder order.
    #[serde(default)]
    pub parameters: Vec<ParameterDeclaration>,
    /// Return type, if the operation has a payload.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub returns: Option<TypeDescriptor>,
    /// Status reported on success instead of `operation_completed`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<Status>,
    /// Access mode.
    #[serde(default)]
    pub visibility: Visibility,
    /// Whether the operation can be invoked at all.
    #[serde(default = "default_true")]
    pub invocable: bool,
}

impl OperationDeclaration {
    /// Declares an operation.
    #[must_use]
    pub fn new(name: impl Into<String>, pattern: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            versions: Vec::new(),
            pattern: pattern.into(),
            parameters: Vec::new(),
            returns: None,
            status: None,
            visibility: Visibility::Public,
            invocable: true,
        }
    }

    /// Sets the description.
    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Adds a supported version.
    #[must_use]
    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.versions.push(version.into());
        self
    }

    /// Adds a parameter.
    #[must_use]
    pub fn parameter(mut self, parameter: ParameterDeclaration) -> Self {
        self.parameters.push(parameter);
        self
    }

    /// Sets the return type to `T`.
    #[must_use]
    pub fn returns<T: Semantic>(mut self) -> Self {
        self.returns = Some(T::descriptor());
        self
    }

    /// Sets the return type descriptor.
    #[must_use]
    pub fn returns_descriptor(mut self, descriptor: TypeDescriptor) -> Self {
        self.returns = Some(descriptor);
        self
    }

    /// Sets the success status override.
    #[must_use]
    pub fn status(mut self, status: Status) -> Self {
        self.status = Some(status);
        self
    }

    /// Sets the access mode.
    #[must_use]
    pub fn visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = visibility;
        self
    }

    /// Sets whether the operation can be invoked.
    #[must_use]
    pub fn invocable(mut self, invocable: bool) -> Self {
        self.invocable = invocable;
        self
    }
}

/// A declared contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ContractDeclaration {
    /// Unique contract name.
    pub name: String,
    /// Human-readable description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Supported versions.
    #[serde(default)]
    pub versions: Vec<String>,
    /// Access mode.
    #[serde(default)]
    pub visibility: Visibility,
    /// Declared operations.
    #[serde(default)]
    pub operations: Vec<OperationDeclaration>,
}

impl ContractDeclaration {
    /// Declares a contract.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            versions: Vec::new(),
            visibility: Visibility::Public,
            operations: Vec::new(),
        }
    }

    /// Sets the description.
    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Adds a supported version.
    #[must_use]
    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.versions.push(version.into());
        self
    }

    /// Sets the access mode.
    #[must_use]
    pub fn visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = visibility;
        self
    }

    /// Adds an operation.
    #[must_use]
    pub fn operation(mut self, operation: OperationDeclaration) -> Self {
        self.operations.push(operation);
        self
    }

    /// Loads a declaration from TOML.
    ///
    /// # Errors
    ///
    /// Fails on invalid TOML or unknown fields.
    pub fn from_toml(text: &str) -> Result<Self, DeclarationError> {
        Ok(toml::from_str(text)?)
    }

    /// Loads a declaration from JSON.
    ///
    /// # Errors
    ///
    /// Fails on invalid JSON or unknown fields.
    pub fn from_json(text: &str) -> Result<Self, DeclarationError> {
        Ok(serde_json::from_str(text)?)
    }
}

/// Something that can declare a contract.
pub trait DeclarationSource {
    /// Returns the contract declaration.
    fn declaration(&self) -> ContractDeclaration;
}

impl DeclarationSource for ContractDeclaration {
    fn declaration(&self) -> ContractDeclaration {
        self.clone()
    }
}
