//! # Covenant Server
//!
//! The inbound side of a contract: everything between a routed HTTP request
//! and the envelope sent back. Routing itself is left to the host server.
//!
//! - [`InboundRequest`] - Raw path, query, form body, header and cookie strings
//! - [`Invocation`] - Parameters translated to native values, defaults applied
//! - [`Dispatcher`] - Runs an operation body and renders its outcome
//!
//! ```ignore
//! let inbound = InboundRequest::from_http(&request, [("id".to_string(), id)])?;
//! let response = dispatcher
//!     .dispatch(operation, &inbound, |mut invocation| async move {
//!         let id: i64 = invocation.require(Slot::Path, "id")?;
//!         lookup(id).await
//!     })
//!     .await;
//! ```

#![doc(html_root_url = "https://docs.rs/covenant-server/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod dispatch;
mod error;
mod inbound;
mod invocation;

pub use dispatch::{Dispatcher, PANIC_CATEGORY};
pub use error::InboundError;
pub use inbound::InboundRequest;
pub use invocation::Invocation;
