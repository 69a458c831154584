use async_trait::async_trait;
use reqwest::Client;
use thiserror::Error;
use tracing::{debug, info};

#[cfg(test)]
use mockall::automock;

use crate::config::WebExConfig;

/// Errors that can occur while exchanging a request with the WebEx site
#[derive(Debug, Error)]
pub enum TransportError {
    /// Connection, TLS or I/O failure
    #[error("Network error talking to WebEx site: {0}")]
    Network(String),

    /// The site answered with a non-success HTTP status
    #[error("WebEx site returned HTTP {0}")]
    Status(u16),
}

/// One request/response exchange with the WebEx XML API.
///
/// Implementations POST the full XML body and return the full response body
/// as text.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request_xml: &str) -> Result<String, TransportError>;
}

/// HTTPS transport backed by reqwest.
///
/// Idle connections are never kept, so every call opens its own connection.
pub struct HttpTransport {
    client: Client,
    endpoint: String,
}

impl HttpTransport {
    /// Create a transport for the site configured in `config`
    pub fn new(config: &WebExConfig) -> Result<Self, TransportError> {
        Self::with_endpoint(config.site_url())
    }

    /// Create a transport posting to an explicit endpoint URL
    pub fn with_endpoint(endpoint: impl Into<String>) -> Result<Self, TransportError> {
        let client = Client::builder()
            .pool_max_idle_per_host(0)
            .build()
            .map_err(|e| TransportError::Network(e.to_string()))?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request_xml: &str) -> Result<String, TransportError> {
        debug!("XML Request POSTed to {}", self.endpoint);
        debug!("{}", request_xml);

        let res = self
            .client
            .post(&self.endpoint)
            .header("Content-Type", "application/xml; charset=UTF-8")
            .body(request_xml.to_string())
            .send()
            .await
            .map_err(|e| TransportError::Network(e.to_string()))?;

        let status = res.status();
        info!("Response received with status: {}", status);

        if !status.is_success() {
            return Err(TransportError::Status(status.as_u16()));
        }

        res.text()
            .await
            .map_err(|e| TransportError::Network(e.to_string()))
    }
}
