//! # Covenant Client
//!
//! Invokes contract operations over a pluggable transport.
//!
//! - [`ContractClient`] - Shared entry point bound to one contract
//! - [`CallSession`] - One configured call, executed once
//! - [`HttpTransport`] - `reqwest`-backed transport
//! - [`UsageError`] - Programmer errors caught before anything is sent
//!
//! Every call sends the contract version as the `version` query parameter,
//! form-encodes body parameters and joins cookie parameters into a single
//! `Cookie` header. The response envelope is decoded into an
//! [`Outcome`](covenant_core::Outcome); transport and decoding failures are
//! classified and mapped by the client's
//! [`FailureMapper`](covenant_contract::FailureMapper).
//!
//! ```ignore
//! use covenant_client::ContractClient;
//! use covenant_config::ConfigLoader;
//!
//! let config = ConfigLoader::new().with_env_prefix("COVENANT").load()?;
//! let client = ContractClient::from_config(contract, &config.client)?;
//!
//! let mut session = client.request("get_user", [Native::I64(42)])?;
//! let outcome = session.execute().await?;
//! if outcome.is_success() {
//!     println!("{:?}", outcome.payload());
//! }
//! ```

#![doc(html_root_url = "https://docs.rs/covenant-client/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod client;
mod error;
mod session;
mod transport;

pub use client::ContractClient;
pub use error::{ClientError, UsageError};
pub use session::{CallSession, SessionState, VERSION_PARAMETER};
pub use transport::HttpTransport;
