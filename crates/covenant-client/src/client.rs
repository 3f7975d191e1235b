//! The contract client.

use crate::error::{ClientError, UsageError};
use crate::session::CallSession;
use crate::transport::HttpTransport;
use covenant_config::ClientConfig;
use covenant_contract::{Contract, FailureMapper, Operation};
use covenant_core::{JsonCodec, Native, Transport, WireCodec};
use http::header::{HeaderName, HeaderValue, USER_AGENT};
use http::HeaderMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Invokes the operations of one contract.
///
/// The client is cheap to clone and safe to share. Each call gets its own
/// [`CallSession`], which is not.
///
/// # Example
///
/// ```ignore
/// let client = ContractClient::new(contract, Arc::new(HttpTransport::new("http://localhost:8080")?));
/// let mut session = client.request("echo", [])?;
/// session.set_query_parameter("value", "hi".to_string())?;
/// let outcome = session.execute_typed::<String>().await?;
/// assert_eq!(outcome.payload().map(String::as_str), Some("hi"));
/// ```
#[derive(Clone)]
pub struct ContractClient {
    pub(crate) contract: Arc<Contract>,
    pub(crate) transport: Arc<dyn Transport>,
    pub(crate) codec: Arc<dyn WireCodec>,
    pub(crate) mapper: Arc<FailureMapper>,
    pub(crate) timeout: Option<Duration>,
    pub(crate) default_headers: HeaderMap,
}

impl ContractClient {
    /// Creates a client with the JSON codec, the built-in failure handlers
    /// and no timeout of its own.
    #[must_use]
    pub fn new(contract: Arc<Contract>, transport: Arc<dyn Transport>) -> Self {
        Self {
            contract,
            transport,
            codec: Arc::new(JsonCodec),
            mapper: Arc::new(FailureMapper::new()),
            timeout: None,
            default_headers: HeaderMap::new(),
        }
    }

    /// Creates an HTTP client from configuration.
    ///
    /// # Errors
    ///
    /// Fails if the HTTP client cannot be built or a configured header is
    /// invalid.
    pub fn from_config(contract: Arc<Contract>, config: &ClientConfig) -> Result<Self, ClientError> {
        let transport = HttpTransport::from_config(config)?;
        let mut client = Self::new(contract, Arc::new(transport)).with_timeout(config.timeout());
        client.insert_default_header(USER_AGENT.as_str(), &config.user_agent)?;
        for (name, value) in &config.default_headers {
            client.insert_default_header(name, value)?;
        }
        Ok(client)
    }

    /// Replaces the codec.
    #[must_use]
    pub fn with_codec(mut self, codec: Arc<dyn WireCodec>) -> Self {
        self.codec = codec;
        self
    }

    /// Replaces the failure mapper.
    #[must_use]
    pub fn with_mapper(mut self, mapper: Arc<FailureMapper>) -> Self {
        self.mapper = mapper;
        self
    }

    /// Bounds every call, in addition to any transport limit.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Adds a header sent with every call.
    ///
    /// # Errors
    ///
    /// Fails if the name or value is not valid HTTP.
    pub fn with_default_header(mut self, name: &str, value: &str) -> Result<Self, ClientError> {
        self.insert_default_header(name, value)?;
        Ok(self)
    }

    fn insert_default_header(&mut self, name: &str, value: &str) -> Result<(), ClientError> {
        let invalid = |reason: String| ClientError::InvalidHeader {
            name: name.to_string(),
            reason,
        };
        let header = HeaderName::from_bytes(name.as_bytes()).map_err(|e| invalid(e.to_string()))?;
        let value = HeaderValue::from_str(value).map_err(|e| invalid(e.to_string()))?;
        self.default_headers.insert(header, value);
        Ok(())
    }

    /// The contract.
    #[must_use]
    pub fn contract(&self) -> &Arc<Contract> {
        &self.contract
    }

    /// Looks up an operation.
    ///
    /// # Errors
    ///
    /// Fails if the contract has no such operation.
    pub fn operation(&self, name: &str) -> Result<&Operation, UsageError> {
        self.contract
            .operation(name)
            .ok_or_else(|| UsageError::UnknownOperation {
                contract: self.contract.name().to_string(),
                operation: name.to_string(),
            })
    }

    /// Starts a call of the named operation with its path values in order.
    ///
    /// # Errors
    ///
    /// Fails on an unknown operation, a wrong number of path values or a
    /// path value that cannot be translated. No request is sent.
    pub fn request<I>(&self, operation: &str, path_values: I) -> Result<CallSession<'_>, UsageError>
    where
        I: IntoIterator<Item = Native>,
    {
        let operation = self.operation(operation)?;
        CallSession::new(self, operation, path_values.into_iter().collect())
    }
}

impl fmt::Debug for ContractClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContractClient")
            .field("contract", &self.contract.name())
            .field("mapper", &self.mapper)
            .field("timeout", &self.timeout)
            .field("default_headers", &self.default_headers)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use covenant_config::ClientConfig;
    use covenant_contract::fixtures;

    #[test]
    fn test_from_config_sets_headers() {
        let mut config = ClientConfig::default();
        config
            .default_headers
            .insert("x-team".to_string(), "identity".to_string());
        let client = ContractClient::from_config(fixtures::echo_contract().unwrap(), &config).unwrap();
        assert_eq!(client.timeout, Some(config.timeout()));
        assert_eq!(client.default_headers["x-team"], "identity");
        assert!(client.default_headers[USER_AGENT]
            .to_str()
            .unwrap()
            .starts_with("covenant/"));
    }

    #[test]
    fn test_invalid_default_header() {
        let transport = Arc::new(HttpTransport::new("http://localhost").unwrap());
        let result = ContractClient::new(fixtures::echo_contract().unwrap(), transport)
            .with_default_header("bad header", "x");
        assert!(matches!(result, Err(ClientError::InvalidHeader { .. })));
    }

    #[test]
    fn test_unknown_operation() {
        let transport = Arc::new(HttpTransport::new("http://localhost").unwrap());
        let client = ContractClient::new(fixtures::echo_contract().unwrap(), transport);
        assert!(matches!(
            client.request("shout", []),
            Err(UsageError::UnknownOperation { .. })
        ));
    }
}
