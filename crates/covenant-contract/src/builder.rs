//! Builds validated contracts from declarations.
//!
//! The build is a single synchronous pass. It either returns a complete
//! [`Contract`] or the first [`ContractError`] found; no partial contract is
//! ever exposed.
//!
//! # Example
//!
//! ```
//! use covenant_contract::{ContractBuilder, ContractDeclaration, OperationDeclaration, ParameterDeclaration};
//!
//! let declaration = ContractDeclaration::new("com.example.users")
//!     .version("1.0")
//!     .operation(
//!         OperationDeclaration::new("lookup", "GET : users/{id}")
//!             .parameter(ParameterDeclaration::path::<i64>("id"))
//!             .returns::<String>(),
//!     );
//!
//! let contract = ContractBuilder::new().build(&declaration, "/api/*").unwrap();
//! let lookup = contract.operation("lookup").unwrap();
//! assert_eq!(lookup.url(), "api/users/{id}");
//! assert_eq!(lookup.qualified_name(), "com.example.users.lookup");
//! ```

use crate::contract::{Contract, Operation, Parameter, ReturnType};
use crate::declaration::{DeclarationSource, OperationDeclaration, ParameterDeclaration, Slot};
use crate::path::{join_path, normalize_root, PathPattern};
use covenant_core::{ContractError, ContractResult, TypeDescriptor};
use covenant_translate::{DocumentTranslator, Translator, TranslatorRegistry};
use std::collections::hash_map::Entry;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::info;

/// Builds contracts, resolving translators from a registry.
#[derive(Debug, Clone)]
pub struct ContractBuilder {
    registry: Arc<TranslatorRegistry>,
}

impl Default for ContractBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// An operation whose parts are resolved but which is not yet attached to
/// its contract.
struct ResolvedOperation {
    declaration: OperationDeclaration,
    versions: Vec<String>,
    pattern: PathPattern,
    path_parameters: Vec<Parameter>,
    named: HashMap<Slot, HashMap<String, Parameter>>,
    returns: Option<ReturnType>,
}

impl ContractBuilder {
    /// Uses the process-wide registry.
    #[must_use]
    pub fn new() -> Self {
        Self::with_registry(TranslatorRegistry::global())
    }

    /// Uses the given registry.
    #[must_use]
    pub fn with_registry(registry: Arc<TranslatorRegistry>) -> Self {
        Self { registry }
    }

    /// The registry translators are resolved from.
    #[must_use]
    pub fn registry(&self) -> &Arc<TranslatorRegistry> {
        &self.registry
    }

    /// Builds a contract.
    ///
    /// `root_path` is normalized first: a trailing `/*` and surrounding
    /// slashes are removed.
    ///
    /// # Errors
    ///
    /// Returns the first structural violation found.
    pub fn build(
        &self,
        source: &dyn DeclarationSource,
        root_path: &str,
    ) -> ContractResult<Arc<Contract>> {
        let declaration = source.declaration();
        let name = declaration.name.trim().to_string();
        if name.is_empty() {
            return Err(ContractError::MissingName);
        }
        if declaration.versions.is_empty() {
            return Err(ContractError::MissingVersions { contract: name });
        }
        let root = normalize_root(root_path);

        let mut seen = HashSet::new();
        let mut resolved = Vec::with_capacity(declaration.operations.len());
        for operation in declaration.operations {
            if !seen.insert(operation.name.clone()) {
                return Err(ContractError::DuplicateOperation {
                    contract: name,
                    operation: operation.name,
                });
            }
            resolved.push(self.resolve_operation(&name, &declaration.versions, operation)?);
        }

        let contract = Arc::new_cyclic(|weak| {
            let operations: Vec<Operation> = resolved
                .into_iter()
                .map(|mut parts| {
                    let url = join_path(&root, &parts.pattern.render(&[]));
                    let mut take = |slot: Slot| parts.named.remove(&slot).unwrap_or_default();
                    let query = take(Slot::Query);
                    let body = take(Slot::Body);
                    let headers = take(Slot::Header);
                    let cookies = take(Slot::Cookie);
                    Operation {
                        name: parts.declaration.name,
                        description: parts.declaration.description,
                        versions: parts.versions,
                        pattern: parts.pattern,
                        root: root.clone(),
                        url,
                        visibility: parts.declaration.visibility,
                        contract: weak.clone(),
                        path_parameters: parts.path_parameters,
                        query,
                        body,
                        headers,
                        cookies,
                        returns: parts.returns,
                        success_status: parts.declaration.status,
                    }
                })
                .collect();
            let operation_index = operations
                .iter()
                .enumerate()
                .map(|(idx, operation)| (operation.name.clone(), idx))
                .collect();
            Contract {
                name: name.clone(),
                description: declaration.description,
                versions: declaration.versions,
                root_path: root.clone(),
                visibility: declaration.visibility,
                operations,
                operation_index,
            }
        });

        info!(
            contract = %contract.name(),
            operations = contract.operations().len(),
            root_path = %contract.root_path(),
            "Built contract"
        );
        Ok(contract)
    }

    fn resolve_operation(
        &self,
        contract: &str,
        contract_versions: &[String],
        declaration: OperationDeclaration,
    ) -> ContractResult<ResolvedOperation> {
        if !declaration.invocable {
            return Err(ContractError::NotInvocable {
                contract: contract.to_string(),
                operation: declaration.name,
            });
        }

        let pattern = PathPattern::parse(&declaration.pattern).map_err(|reason| {
            ContractError::InvalidPattern {
                operation: declaration.name.clone(),
                pattern: declaration.pattern.clone(),
                reason,
            }
        })?;

        let versions = if declaration.versions.is_empty() {
            contract_versions.to_vec()
        } else {
            declaration.versions.clone()
        };

        let mut path_parameters = Vec::new();
        let mut named: HashMap<Slot, HashMap<String, Parameter>> = HashMap::new();
        for parameter in &declaration.parameters {
            let bound = self.bind_parameter(&declaration.name, parameter)?;
            if parameter.slot == Slot::Path {
                if path_parameters.iter().any(|p: &Parameter| p.name == bound.name) {
                    return Err(duplicate(&declaration.name, &bound));
                }
                path_parameters.push(bound);
                continue;
            }
            match named.entry(parameter.slot).or_default().entry(bound.name.clone()) {
                Entry::Occupied(_) => return Err(duplicate(&declaration.name, &bound)),
                Entry::Vacant(slot) => {
                    slot.insert(bound);
                }
            }
        }

        let placeholders: Vec<&str> = pattern.placeholders().collect();
        if placeholders.len() != path_parameters.len() {
            return Err(ContractError::PathParameterMismatch {
                operation: declaration.name,
                declared: path_parameters.len(),
                placeholders: placeholders.len(),
            });
        }
        for (position, (parameter, expected)) in path_parameters.iter().zip(&placeholders).enumerate() {
            if parameter.name != *expected {
                return Err(ContractError::PathParameterName {
                    operation: declaration.name,
                    position,
                    declared: parameter.name.clone(),
                    expected: (*expected).to_string(),
                });
            }
        }

        let returns = match &declaration.returns {
            Some(descriptor) => Some(ReturnType {
                translator: self.resolve(descriptor).ok_or_else(|| {
                    ContractError::MissingTranslator {
                        operation: declaration.name.clone(),
                        parameter: "return".to_string(),
                        descriptor: descriptor.to_string(),
                    }
                })?,
                descriptor: descriptor.clone(),
            }),
            None => None,
        };

        Ok(ResolvedOperation {
            declaration,
            versions,
            pattern,
            path_parameters,
            named,
            returns,
        })
    }

    fn bind_parameter(
        &self,
        operation: &str,
        declaration: &ParameterDeclaration,
    ) -> ContractResult<Parameter> {
        if declaration.required && declaration.default.is_some() {
            return Err(ContractError::DefaultConflict {
                operation: operation.to_string(),
                parameter: declaration.name.clone(),
            });
        }
        let translator =
            self.resolve(&declaration.descriptor)
                .ok_or_else(|| ContractError::MissingTranslator {
                    operation: operation.to_string(),
                    parameter: declaration.name.clone(),
                    descriptor: declaration.descriptor.to_string(),
                })?;
        Ok(Parameter {
            name: declaration.name.clone(),
            slot: declaration.slot,
            descriptor: declaration.descriptor.clone(),
            translator,
            required: declaration.required,
            default: declaration.default.clone(),
        })
    }

    /// Registry lookup, falling back to a JSON document translator for
    /// document descriptors the registry does not know.
    fn resolve(&self, descriptor: &TypeDescriptor) -> Option<Translator> {
        self.registry.translator(descriptor).or_else(|| {
            descriptor
                .is_document()
                .then(|| Translator::of(DocumentTranslator::new(descriptor.to_string())))
        })
    }
}

fn duplicate(operation: &str, parameter: &Parameter) -> ContractError {
    ContractError::DuplicateParameter {
        operation: operation.to_string(),
        slot: parameter.slot.to_string(),
        name: parameter.name.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::declaration::{ContractDeclaration, Visibility};
    use covenant_core::{contract_enum, Json, Semantic, Status};
    use serde::{Deserialize, Serialize};

    contract_enum! {
        enum Tier {
            Free => "free",
            Pro => "pro",
        }
    }

    #[derive(Serialize, Deserialize)]
    struct Profile {
        name: String,
    }

    fn users() -> ContractDeclaration {
        ContractDeclaration::new("com.example.users")
            .version("1.0")
            .version("1.1")
            .operation(
                OperationDeclaration::new("lookup", "GET : users/{id}")
                    .parameter(ParameterDeclaration::path::<i64>("id")),
            )
            .operation(
                OperationDeclaration::new("create", "POST : users")
                    .version("1.1")
                    .parameter(ParameterDeclaration::body::<String>("name"))
                    .parameter(ParameterDeclaration::query::<Tier>("tier").with_default("free"))
                    .returns::<Json<Profile>>()
                    .status(Status::OperationCreated),
            )
    }

    fn build(declaration: &ContractDeclaration) -> ContractResult<Arc<Contract>> {
        ContractBuilder::with_registry(Arc::new(TranslatorRegistry::new())).build(declaration, "/")
    }

    #[test]
    fn test_build_success() {
        let contract = build(&users()).unwrap();
        assert_eq!(contract.operations().len(), 2);
        assert_eq!(contract.newest_version(), Some("1.1"));

        let lookup = contract.operation("lookup").unwrap();
        assert_eq!(lookup.versions(), &["1.0".to_string(), "1.1".to_string()]);
        assert_eq!(lookup.path_parameters().len(), 1);
        assert!(Arc::ptr_eq(&lookup.contract().unwrap(), &contract));

        let create = contract.operation("create").unwrap();
        assert_eq!(create.versions(), &["1.1".to_string()]);
        assert_eq!(create.success_status(), Status::OperationCreated);
        assert_eq!(
            create.returns().unwrap().descriptor(),
            &Json::<Profile>::descriptor()
        );
        assert_eq!(
            create.parameter(Slot::Query, "tier").unwrap().default_value(),
            Some("free")
        );
        assert!(create.parameter(Slot::Body, "tier").is_none());
    }

    #[test]
    fn test_missing_name() {
        let err = build(&ContractDeclaration::new("  ").version("1.0")).unwrap_err();
        assert_eq!(err, ContractError::MissingName);
    }

    #[test]
    fn test_zero_versions_fails() {
        let err = build(&ContractDeclaration::new("x")).unwrap_err();
        assert!(matches!(err, ContractError::MissingVersions { .. }));
    }

    #[test]
    fn test_not_invocable_fails() {
        let declaration = ContractDeclaration::new("x")
            .version("1.0")
            .operation(OperationDeclaration::new("hidden", "GET : hidden").invocable(false));
        assert!(matches!(
            build(&declaration).unwrap_err(),
            ContractError::NotInvocable { .. }
        ));
    }

    #[test]
    fn test_internal_visibility_is_allowed() {
        let declaration = ContractDeclaration::new("x").version("1.0").operation(
            OperationDeclaration::new("stats", "GET : stats").visibility(Visibility::Internal),
        );
        let contract = build(&declaration).unwrap();
        assert_eq!(
            contract.operation("stats").unwrap().visibility(),
            Visibility::Internal
        );
    }

    #[test]
    fn test_path_parameter_count_mismatch() {
        let declaration = ContractDeclaration::new("x")
            .version("1.0")
            .operation(OperationDeclaration::new("lookup", "GET : users/{id}"));
        assert!(matches!(
            build(&declaration).unwrap_err(),
            ContractError::PathParameterMismatch {
                declared: 0,
                placeholders: 1,
                ..
            }
        ));
    }

    #[test]
    fn test_path_parameter_order() {
        let declaration = ContractDeclaration::new("x").version("1.0").operation(
            OperationDeclaration::new("role", "GET : users/{id}/roles/{role}")
                .parameter(ParameterDeclaration::path::<String>("role"))
                .parameter(ParameterDeclaration::path::<i64>("id")),
        );
        assert!(matches!(
            build(&declaration).unwrap_err(),
            ContractError::PathParameterName { position: 0, .. }
        ));
    }

    #[test]
    fn test_duplicate_named_parameter() {
        let declaration = ContractDeclaration::new("x").version("1.0").operation(
            OperationDeclaration::new("search", "GET : search")
                .parameter(ParameterDeclaration::query::<String>("q"))
                .parameter(ParameterDeclaration::query::<i32>("q")),
        );
        assert!(matches!(
            build(&declaration).unwrap_err(),
            ContractError::DuplicateParameter { .. }
        ));
    }

    #[test]
    fn test_same_name_in_different_slots_is_fine() {
        let declaration = ContractDeclaration::new("x").version("1.0").operation(
            OperationDeclaration::new("search", "GET : search")
                .parameter(ParameterDeclaration::query::<String>("q"))
                .parameter(ParameterDeclaration::header::<String>("q")),
        );
        assert!(build(&declaration).is_ok());
    }

    #[test]
    fn test_missing_translator() {
        let declaration = ContractDeclaration::new("x").version("1.0").operation(
            OperationDeclaration::new("odd", "GET : odd").parameter(ParameterDeclaration::new(
                "value",
                Slot::Query,
                TypeDescriptor::scalar("Unregistered"),
            )),
        );
        assert!(matches!(
            build(&declaration).unwrap_err(),
            ContractError::MissingTranslator { .. }
        ));
    }

    #[test]
    fn test_default_conflict() {
        let mut parameter = ParameterDeclaration::query::<i32>("limit").with_default("20");
        parameter.required = true;
        let declaration = ContractDeclaration::new("x")
            .version("1.0")
            .operation(OperationDeclaration::new("list", "GET : items").parameter(parameter));
        assert!(matches!(
            build(&declaration).unwrap_err(),
            ContractError::DefaultConflict { .. }
        ));
    }

    #[test]
    fn test_duplicate_operation() {
        let declaration = ContractDeclaration::new("x")
            .version("1.0")
            .operation(OperationDeclaration::new("a", "GET : a"))
            .operation(OperationDeclaration::new("a", "GET : b"));
        assert!(matches!(
            build(&declaration).unwrap_err(),
            ContractError::DuplicateOperation { .. }
        ));
    }

    #[test]
    fn test_document_translator_is_not_cached() {
        let registry = Arc::new(TranslatorRegistry::new());
        let before = registry.len();
        ContractBuilder::with_registry(registry.clone())
            .build(&users(), "")
            .unwrap();
        assert!(!registry.contains(&Json::<Profile>::descriptor()));
        // the enumeration translator for `tier` was generated and kept
        assert_eq!(registry.len(), before + 1);
    }

    #[test]
    fn test_match_operation_under_root() {
        let contract = ContractBuilder::with_registry(Arc::new(TranslatorRegistry::new()))
            .build(&users(), "/api/*")
            .unwrap();
        let (operation, params) = contract
            .match_operation(&http::Method::GET, "/api/users/7")
            .unwrap();
        assert_eq!(operation.name(), "lookup");
        assert_eq!(params.get("id").map(String::as_str), Some("7"));
        assert!(contract.match_operation(&http::Method::GET, "/users/7").is_none());
        assert!(contract.match_operation(&http::Method::POST, "/api/users/7").is_none());
    }
}
