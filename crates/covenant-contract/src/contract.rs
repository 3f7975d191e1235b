//! The validated contract model.
//!
//! A [`Contract`] owns its [`Operation`]s. Each operation keeps a weak
//! back-reference to its contract, used for naming in diagnostics. Every
//! [`Parameter`] and the return type carry the [`Translator`] that was
//! resolved for them when the contract was built.
//!
//! Contracts are created by [`ContractBuilder`](crate::ContractBuilder) and
//! are immutable afterwards.

use crate::declaration::{Slot, Visibility};
use crate::path::{join_path, PathPattern};
use covenant_core::{Status, TypeDescriptor};
use covenant_translate::Translator;
use http::Method;
use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::{Arc, Weak};

/// A parameter with its translator bound.
#[derive(Debug, Clone)]
pub struct Parameter {
    pub(crate) name: String,
    pub(crate) slot: Slot,
    pub(crate) descriptor: TypeDescriptor,
    pub(crate) translator: Translator,
    pub(crate) required: bool,
    pub(crate) default: Option<String>,
}

impl Parameter {
    /// Parameter name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Binding slot.
    #[must_use]
    pub fn slot(&self) -> Slot {
        self.slot
    }

    /// Semantic type.
    #[must_use]
    pub fn descriptor(&self) -> &TypeDescriptor {
        &self.descriptor
    }

    /// The bound translator.
    #[must_use]
    pub fn translator(&self) -> &Translator {
        &self.translator
    }

    /// Whether a value must be supplied.
    #[must_use]
    pub fn is_required(&self) -> bool {
        self.required
    }

    /// Default wire text.
    #[must_use]
    pub fn default_value(&self) -> Option<&str> {
        self.default.as_deref()
    }
}

/// The declared return type with its translator bound.
#[derive(Debug, Clone)]
pub struct ReturnType {
    pub(crate) descriptor: TypeDescriptor,
    pub(crate) translator: Translator,
}

impl ReturnType {
    /// Semantic type.
    #[must_use]
    pub fn descriptor(&self) -> &TypeDescriptor {
        &self.descriptor
    }

    /// The bound translator.
    #[must_use]
    pub fn translator(&self) -> &Translator {
        &self.translator
    }
}

/// One invocable operation of a contract.
#[derive(Debug)]
pub struct Operation {
    pub(crate) name: String,
    pub(crate) description: Option<String>,
    pub(crate) versions: Vec<String>,
    pub(crate) pattern: PathPattern,
    pub(crate) root: String,
    pub(crate) url: String,
    pub(crate) visibility: Visibility,
    pub(crate) contract: Weak<Contract>,
    pub(crate) path_parameters: Vec<Parameter>,
    pub(crate) query: HashMap<String, Parameter>,
    pub(crate) body: HashMap<String, Parameter>,
    pub(crate) headers: HashMap<String, Parameter>,
    pub(crate) cookies: HashMap<String, Parameter>,
    pub(crate) returns: Option<ReturnType>,
    pub(crate) success_status: Option<Status>,
}

impl Operation {
    /// Operation name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Description.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Supported versions (the contract's when none were declared).
    #[must_use]
    pub fn versions(&self) -> &[String] {
        &self.versions
    }

    /// The newest supported version.
    #[must_use]
    pub fn newest_version(&self) -> Option<&str> {
        newest(&self.versions)
    }

    /// The verb and path pattern.
    #[must_use]
    pub fn pattern(&self) -> &PathPattern {
        &self.pattern
    }

    /// Declared verbs, first is the default.
    #[must_use]
    pub fn verbs(&self) -> &[Method] {
        self.pattern.verbs()
    }

    /// Path template below the base URL, root path included.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Renders the URL with already encoded path values.
    #[must_use]
    pub fn render_url(&self, values: &[String]) -> String {
        join_path(&self.root, &self.pattern.render(values))
    }

    /// Access mode.
    #[must_use]
    pub fn visibility(&self) -> Visibility {
        self.visibility
    }

    /// The owning contract, if it is still alive.
    #[must_use]
    pub fn contract(&self) -> Option<Arc<Contract>> {
        self.contract.upgrade()
    }

    /// `contract.operation`, for diagnostics.
    #[must_use]
    pub fn qualified_name(&self) -> String {
        match self.contract.upgrade() {
            Some(contract) => format!("{}.{}", contract.name(), self.name),
            None => self.name.clone(),
        }
    }

    /// Path parameters in position order.
    #[must_use]
    pub fn path_parameters(&self) -> &[Parameter] {
        &self.path_parameters
    }

    /// Looks up a named parameter in a slot.
    ///
    /// Path parameters are looked up by placeholder name.
    #[must_use]
    pub fn parameter(&self, slot: Slot, name: &str) -> Option<&Parameter> {
        match slot {
            Slot::Path => self.path_parameters.iter().find(|p| p.name == name),
            Slot::Query => self.query.get(name),
            Slot::Body => self.body.get(name),
            Slot::Header => self.headers.get(name),
            Slot::Cookie => self.cookies.get(name),
        }
    }

    /// All parameters of a slot. Path parameters come in position order.
    pub fn parameters(&self, slot: Slot) -> Box<dyn Iterator<Item = &Parameter> + '_> {
        match slot {
            Slot::Path => Box::new(self.path_parameters.iter()),
            Slot::Query => Box::new(self.query.values()),
            Slot::Body => Box::new(self.body.values()),
            Slot::Header => Box::new(self.headers.values()),
            Slot::Cookie => Box::new(self.cookies.values()),
        }
    }

    /// The return type.
    #[must_use]
    pub fn returns(&self) -> Option<&ReturnType> {
        self.returns.as_ref()
    }

    /// Status reported on success.
    #[must_use]
    pub fn success_status(&self) -> Status {
        self.success_status.unwrap_or(Status::OperationCompleted)
    }
}

/// An immutable, validated contract.
#[derive(Debug)]
pub struct Contract {
    pub(crate) name: String,
    pub(crate) description: Option<String>,
    pub(crate) versions: Vec<String>,
    pub(crate) root_path: String,
    pub(crate) visibility: Visibility,
    pub(crate) operations: Vec<Operation>,
    pub(crate) operation_index: HashMap<String, usize>,
}

impl Contract {
    /// Contract name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Description.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Supported versions, never empty.
    #[must_use]
    pub fn versions(&self) -> &[String] {
        &self.versions
    }

    /// The newest supported version.
    #[must_use]
    pub fn newest_version(&self) -> Option<&str> {
        newest(&self.versions)
    }

    /// Normalized root path.
    #[must_use]
    pub fn root_path(&self) -> &str {
        &self.root_path
    }

    /// Access mode.
    #[must_use]
    pub fn visibility(&self) -> Visibility {
        self.visibility
    }

    /// Operations in declaration order.
    #[must_use]
    pub fn operations(&self) -> &[Operation] {
        &self.operations
    }

    /// Looks up an operation by name.
    #[must_use]
    pub fn operation(&self, name: &str) -> Option<&Operation> {
        self.operation_index
            .get(name)
            .map(|&idx| &self.operations[idx])
    }

    /// Finds the operation serving a verb and concrete path, with its raw
    /// path values.
    #[must_use]
    pub fn match_operation(
        &self,
        method: &Method,
        path: &str,
    ) -> Option<(&Operation, HashMap<String, String>)> {
        let relative = path.trim_start_matches('/');
        let relative = if self.root_path.is_empty() {
            relative
        } else {
            relative
                .strip_prefix(self.root_path.as_str())
                .filter(|rest| rest.is_empty() || rest.starts_with('/'))?
        };
        self.operations
            .iter()
            .filter(|operation| operation.verbs().contains(method))
            .find_map(|operation| {
                operation
                    .pattern
                    .match_path(relative)
                    .map(|params| (operation, params))
            })
    }
}

fn newest(versions: &[String]) -> Option<&str> {
    versions
        .iter()
        .max_by(|a, b| compare_versions(a, b))
        .map(String::as_str)
}

/// Compares dotted versions, numerically where both parts are numbers.
#[must_use]
pub fn compare_versions(a: &str, b: &str) -> Ordering {
    let mut left = a.split('.');
    let mut right = b.split('.');
    loop {
        match (left.next(), right.next()) {
            (None, None) => return Ordering::Equal,
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(l), Some(r)) => {
                let ordering = match (l.parse::<u64>(), r.parse::<u64>()) {
                    (Ok(l), Ok(r)) => l.cmp(&r),
                    _ => l.cmp(r),
                };
                if ordering != Ordering::Equal {
                    return ordering;
                }
            }
        }
    }
}
