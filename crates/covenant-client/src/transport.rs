//! HTTP transport backed by `reqwest`.

use async_trait::async_trait;
use covenant_config::ClientConfig;
use covenant_core::{Transport, TransportError, WireRequest, WireResponse};
use std::time::Duration;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(3);
const POOL_IDLE_TIMEOUT: Duration = Duration::from_secs(90);

/// Sends wire requests to a base URL over HTTP.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    base_url: String,
}

impl HttpTransport {
    /// Creates a transport with default connection settings.
    ///
    /// # Errors
    ///
    /// Fails if the underlying client cannot be built (e.g. no TLS backend).
    pub fn new(base_url: impl Into<String>) -> Result<Self, reqwest::Error> {
        let client = builder().build()?;
        Ok(Self::with_client(client, base_url))
    }

    /// Wraps an existing client.
    #[must_use]
    pub fn with_client(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Creates a transport from configuration. The configured timeout is the
    /// client-wide ceiling; sessions may pass a shorter one per call.
    ///
    /// # Errors
    ///
    /// Fails if the underlying client cannot be built.
    pub fn from_config(config: &ClientConfig) -> Result<Self, reqwest::Error> {
        let client = builder().timeout(config.timeout()).build()?;
        Ok(Self::with_client(client, config.base_url.clone()))
    }

    /// The base URL, without a trailing slash.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// The absolute URL for a relative path.
    #[must_use]
    pub fn url_for(&self, path: &str) -> String {
        let path = path.trim_start_matches('/');
        if path.is_empty() {
            self.base_url.clone()
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }
}

fn builder() -> reqwest::ClientBuilder {
    reqwest::Client::builder()
        .connect_timeout(CONNECT_TIMEOUT)
        .pool_idle_timeout(POOL_IDLE_TIMEOUT)
}

fn classify(err: reqwest::Error) -> TransportError {
    if err.is_timeout() {
        TransportError::Timeout
    } else if err.is_connect() {
        TransportError::Unreachable(err.to_string())
    } else {
        TransportError::Failed(err.to_string())
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(
        &self,
        request: WireRequest,
        timeout: Option<Duration>,
    ) -> Result<WireResponse, TransportError> {
        let mut builder = self
            .client
            .request(request.method, self.url_for(&request.path))
            .headers(request.headers);
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(body) = request.body {
            builder = builder.body(body);
        }
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        let response = builder.send().await.map_err(classify)?;
        let status = response.status();
        let headers = response.headers().clone();
        let body = response.bytes().await.map_err(classify)?;
        Ok(WireResponse {
            status,
            headers,
            body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_for() {
        let transport = HttpTransport::new("http://localhost:8080/").unwrap();
        assert_eq!(transport.base_url(), "http://localhost:8080");
        assert_eq!(
            transport.url_for("/api/users/7"),
            "http://localhost:8080/api/users/7"
        );
        assert_eq!(transport.url_for(""), "http://localhost:8080");
    }
}
