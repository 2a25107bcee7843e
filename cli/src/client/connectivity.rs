//! Network reachability probe.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;
use url::Url;

use crate::config::NetworkConfig;
use crate::error::Result;

/// Answers whether the network is reachable.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Connectivity: Send + Sync {
    /// True if a remote could plausibly be reached right now.
    async fn is_online(&self) -> bool;
}

/// Sends a HEAD request to a well-known URL.
pub struct HttpConnectivity {
    client: Client,
    probe_url: Url,
}

impl HttpConnectivity {
    /// Create a probe from the network configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: &NetworkConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(format!("wikisync/{}", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            probe_url: config.probe_url.clone(),
        })
    }
}

#[async_trait]
impl Connectivity for HttpConnectivity {
    async fn is_online(&self) -> bool {
        // Any HTTP answer, even an error status, means the network works.
        match self.client.head(self.probe_url.clone()).send().await {
            Ok(response) => {
                debug!(status = %response.status(), "Connectivity probe answered");
                true
            }
            Err(e) => {
                debug!(error = %e, "Connectivity probe failed");
                false
            }
        }
    }
}
