//! HTTP client utilities.

use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;

use crate::config::HttpConfig;
use crate::sources::SourceError;

/// Shared HTTP client built from [`HttpConfig`]
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Arc<Client>,
}

impl HttpClient {
    /// Create a new HTTP client with default settings
    pub fn new() -> Result<Self, SourceError> {
        Self::from_config(&HttpConfig::default())
    }

    /// Create a new HTTP client from configuration.
    ///
    /// Without `timeout_secs` a request blocks until the remote responds or
    /// the transport gives up.
    pub fn from_config(config: &HttpConfig) -> Result<Self, SourceError> {
        let mut builder = Client::builder()
            .user_agent(config.user_agent.as_str())
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .pool_idle_timeout(Duration::from_secs(90));

        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }

        let client = builder
            .build()
            .map_err(|e| SourceError::Network(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client: Arc::new(client),
        })
    }

    /// GET `url` and return the body text, failing on non-success statuses.
    ///
    /// `endpoint` names the remote service in errors and logs.
    pub async fn get_text(&self, endpoint: &'static str, url: &str) -> Result<String, SourceError> {
        tracing::debug!(endpoint, url, "sending request");

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| SourceError::Network(format!("Failed to reach {}: {}", endpoint, e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::RemoteFetch {
                endpoint,
                status: status.as_u16(),
            });
        }

        response
            .text()
            .await
            .map_err(|e| SourceError::Network(format!("Failed to read response: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_from_default_config() {
        assert!(HttpClient::new().is_ok());
    }

    #[test]
    fn test_client_with_timeout() {
        let config = HttpConfig {
            timeout_secs: Some(5),
            ..Default::default()
        };
        assert!(HttpClient::from_config(&config).is_ok());
    }
}
