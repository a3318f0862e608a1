//! HTTP client for the Icecast status endpoint
//!
//! The client is stateless and does not cache responses; caching is handled
//! by the status aggregator layer.

use crate::error::{Error, Result};
use crate::models::{IceStats, SourceStats, StatusRoot};
use reqwest::Client;
use std::time::Duration;

/// Default Icecast status URL
pub const DEFAULT_STATUS_URL: &str = "http://localhost:8000/status-json.xsl";

/// Default timeout for status requests (3 seconds)
///
/// Kept short: the aggregator must answer the dashboard in bounded time
/// even when Icecast is down.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 3;

/// Default User-Agent
pub const DEFAULT_USER_AGENT: &str = "KnobRadio/0.1 (knobicecast)";

/// Icecast status client
#[derive(Debug, Clone)]
pub struct IcecastClient {
    client: Client,
    status_url: String,
    timeout: Duration,
}

impl IcecastClient {
    /// Create a new client with default settings
    pub fn new() -> Result<Self> {
        Self::builder().build()
    }

    /// Create a builder for configuring the client
    pub fn builder() -> IcecastClientBuilder {
        IcecastClientBuilder::default()
    }

    /// Get the status URL
    pub fn status_url(&self) -> &str {
        &self.status_url
    }

    /// Fetch the full server status
    ///
    /// Returns the decoded `icestats` envelope. Network errors, non-success
    /// statuses and malformed JSON all surface as errors; the caller
    /// decides whether they are fatal.
    pub async fn fetch_status(&self) -> Result<IceStats> {
        let response = self
            .client
            .get(&self.status_url)
            .timeout(self.timeout)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::StatusCode(status.as_u16()));
        }

        let root: StatusRoot = response.json().await?;
        tracing::debug!(
            sources = root.icestats.source.len(),
            "Fetched Icecast status"
        );
        Ok(root.icestats)
    }

    /// Fetch the status of a single mount
    ///
    /// # Arguments
    ///
    /// * `mount` - Mount path, e.g. `/stream.ogg`
    ///
    /// # Errors
    ///
    /// Returns [`Error::MountNotFound`] when the mount has no live source.
    pub async fn mount_status(&self, mount: &str) -> Result<SourceStats> {
        let stats = self.fetch_status().await?;

        stats
            .source
            .into_iter()
            .find(|source| source.mount().as_deref() == Some(mount))
            .ok_or_else(|| Error::MountNotFound(mount.to_string()))
    }
}

/// Builder for [`IcecastClient`]
pub struct IcecastClientBuilder {
    status_url: String,
    timeout: Duration,
    user_agent: String,
}

impl Default for IcecastClientBuilder {
    fn default() -> Self {
        Self {
            status_url: DEFAULT_STATUS_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl IcecastClientBuilder {
    /// Set the status endpoint URL
    pub fn status_url(mut self, url: impl Into<String>) -> Self {
        self.status_url = url.into();
        self
    }

    /// Set the request timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the User-Agent header
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Build the client
    pub fn build(self) -> Result<IcecastClient> {
        // Validate the URL now rather than on every request
        url::Url::parse(&self.status_url)?;

        let client = Client::builder()
            .user_agent(self.user_agent)
            .timeout(self.timeout)
            .build()?;

        Ok(IcecastClient {
            client,
            status_url: self.status_url,
            timeout: self.timeout,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_defaults() {
        let client = IcecastClient::new().unwrap();
        assert_eq!(client.status_url(), DEFAULT_STATUS_URL);
    }

    #[test]
    fn test_builder_rejects_invalid_url() {
        let result = IcecastClient::builder().status_url("not a url").build();
        assert!(result.is_err());
    }

    #[tokio::test]
    #[ignore = "Integration test - requires a running Icecast server"]
    async fn test_fetch_status_live() {
        let client = IcecastClient::new().unwrap();
        let stats = client.fetch_status().await.unwrap();
        println!("sources: {}", stats.source.len());
    }
}
