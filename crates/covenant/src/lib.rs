//! # Covenant
//!
//! **Contract-driven remote invocation with semantic type translation**
//!
//! A contract names its operations, their verbs and paths, and the semantic
//! type of every parameter and return value. Covenant binds each of those
//! types to a translator once, when the contract is built, and then moves
//! values between native Rust types and wire text on both ends of a call.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use covenant::prelude::*;
//!
//! let declaration = ContractDeclaration::new("com.example.users")
//!     .version("1.0")
//!     .operation(
//!         OperationDeclaration::new("get_user", "GET : users/{id}")
//!             .parameter(ParameterDeclaration::path::<i64>("id"))
//!             .returns::<serde_json::Value>(),
//!     );
//! let contract = ContractBuilder::new().build(&declaration, "/api/*")?;
//!
//! let config = ConfigLoader::new().with_env_prefix("COVENANT").load()?;
//! init_logging(&config.logging)?;
//! let client = ContractClient::from_config(contract, &config.client)?;
//!
//! let outcome = client
//!     .request("get_user", [Native::I64(42)])?
//!     .execute_typed::<serde_json::Value>()
//!     .await?;
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ContractDeclaration → ContractBuilder (+ TranslatorRegistry) → Arc<Contract>
//!                                                                    ↓
//! ContractClient → CallSession → Transport ⇢ InboundRequest → Invocation → Dispatcher
//!        ↑                                                                     ↓
//!     Outcome ← FailureMapper ← Envelope ←──────────────────────────────── Envelope
//! ```

#![doc(html_root_url = "https://docs.rs/covenant/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

// Re-export core types
pub use covenant_core as core;

// Re-export translators and the registry
pub use covenant_translate as translate;

// Re-export contract model and builder
pub use covenant_contract as contract;

// Re-export the client
pub use covenant_client as client;

// Re-export the inbound side
pub use covenant_server as server;

// Re-export configuration
pub use covenant_config as config;

// Re-export logging and metrics setup
pub use covenant_telemetry as telemetry;

// Re-export the enum declaration macro
pub use covenant_core::contract_enum;

/// Prelude module for convenient imports.
///
/// # Example
///
/// ```rust
/// use covenant::prelude::*;
///
/// let contract = ContractBuilder::new()
///     .build(
///         &ContractDeclaration::new("com.example.echo")
///             .version("1.0")
///             .operation(
///                 OperationDeclaration::new("echo", "GET : echo")
///                     .parameter(ParameterDeclaration::query::<String>("value"))
///                     .returns::<String>(),
///             ),
///         "",
///     )
///     .unwrap();
/// assert_eq!(contract.operation("echo").unwrap().url(), "echo");
/// ```
pub mod prelude {
    pub use covenant_core::{
        CommunicationError, CommunicationKind, ContractEnum, ContractError, ContractResult,
        Failure, FailureCategory, Json, Native, Opaque, Outcome, Semantic, Status, Transport,
        TranslationError, TranslationResult, TypeDescriptor, WireCodec,
    };

    // Re-export translator types
    pub use covenant_translate::{FromWire, ToWire, Translator, TranslatorRegistry};

    // Re-export contract types
    pub use covenant_contract::{
        Contract, ContractBuilder, ContractDeclaration, DeclarationSource, FailureMapper, Operation,
        OperationDeclaration, ParameterDeclaration, Slot, Visibility,
    };

    // Re-export client types
    pub use covenant_client::{CallSession, ContractClient, HttpTransport, UsageError};

    // Re-export server types
    pub use covenant_server::{Dispatcher, InboundRequest, Invocation};

    // Re-export configuration types
    pub use covenant_config::{ClientConfig, ConfigLoader, CovenantConfig};

    // Re-export logging setup
    pub use covenant_telemetry::{init_logging, LogConfig};
}
