//! Transport abstraction for mapping fetches.

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;
use url::Url;

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("invalid endpoint url: {0}")]
    InvalidUrl(#[from] url::ParseError),
    #[error("mapping request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("mapping request returned status {0}")]
    Status(u16),
}

/// Fetches raw `_mapping` responses from a cluster.
///
/// Implementations must be cheap to share; the service holds one instance
/// behind an `Arc` for its whole lifetime.
#[async_trait]
pub trait MappingTransport: Send + Sync {
    async fn fetch_mapping(
        &self,
        endpoint: &str,
        index_pattern: &str,
    ) -> Result<Value, TransportError>;
}

/// HTTP transport issuing `GET {endpoint}/{indexPattern}/_mapping`.
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }

    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

impl Default for HttpTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MappingTransport for HttpTransport {
    async fn fetch_mapping(
        &self,
        endpoint: &str,
        index_pattern: &str,
    ) -> Result<Value, TransportError> {
        let base = Url::parse(&format!("{}/", endpoint.trim_end_matches('/')))?;
        let url = base.join(&format!("{index_pattern}/_mapping"))?;
        let response = self.client.get(url).send().await?;
        if !response.status().is_success() {
            return Err(TransportError::Status(response.status().as_u16()));
        }
        Ok(response.json().await?)
    }
}
