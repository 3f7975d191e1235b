//! # Covenant Test
//!
//! Test utilities for code built on Covenant.
//!
//! - [`MockTransport`] - In-memory transport answering from a script
//! - [`MockReply`] - One scripted response or transport failure
//!
//! ```ignore
//! use covenant_test::{MockReply, MockTransport};
//! use serde_json::json;
//!
//! let transport = Arc::new(MockTransport::new().reply(MockReply::json(&json!({
//!     "code": 0,
//!     "return": "hi",
//! }))));
//! let client = ContractClient::new(contract, transport.clone());
//! // ... execute a call ...
//! assert_eq!(transport.last_request().unwrap().query_value("value"), Some("hi"));
//! ```

#![doc(html_root_url = "https://docs.rs/covenant-test/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod reply;
mod transport;

pub use reply::MockReply;
pub use transport::MockTransport;
