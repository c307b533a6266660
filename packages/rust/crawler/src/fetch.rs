//! Bounded-timeout HTTP retrieval.
//!
//! All outbound requests identify themselves with the fixed SiteForge
//! client signature and carry a hard per-request deadline. Only GET and
//! HEAD semantics are used (HEAD for existence probing, GET for content).

use std::time::Duration;

use reqwest::Client;
use tracing::debug;
use url::Url;

use siteforge_shared::{DiscoveryConfig, Result, SiteForgeError};

/// User-Agent string for all SiteForge requests.
pub const USER_AGENT: &str = concat!("SiteForge/", env!("CARGO_PKG_VERSION"));

/// Maximum number of redirects to follow.
const MAX_REDIRECTS: usize = 5;

/// HTTP fetcher with bounded timeouts and a fixed client signature.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
    probe_timeout: Duration,
}

impl HttpFetcher {
    /// Build a fetcher from the runtime discovery configuration.
    pub fn new(config: &DiscoveryConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| SiteForgeError::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            probe_timeout: Duration::from_secs(config.probe_timeout_secs),
        })
    }

    /// GET a URL and return the response body as text.
    ///
    /// Non-2xx statuses are errors; callers at the strategy level degrade
    /// them to "no contribution".
    pub async fn get_text(&self, url: &Url) -> Result<String> {
        let response = self
            .client
            .get(url.as_str())
            .send()
            .await
            .map_err(|e| SiteForgeError::Network(format!("{url}: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(SiteForgeError::Network(format!("{url}: HTTP {status}")));
        }

        response
            .text()
            .await
            .map_err(|e| SiteForgeError::Network(format!("{url}: body read failed: {e}")))
    }

    /// GET a URL and parse the response body as JSON.
    pub async fn get_json(&self, url: &Url) -> Result<serde_json::Value> {
        let body = self.get_text(url).await?;
        serde_json::from_str(&body)
            .map_err(|e| SiteForgeError::parse(format!("{url}: invalid JSON: {e}")))
    }

    /// HEAD a URL and report whether it resolves with a 2xx status.
    ///
    /// Uses the shorter probe deadline; any error counts as "absent".
    pub async fn head_ok(&self, url: &Url) -> bool {
        match self
            .client
            .head(url.as_str())
            .timeout(self.probe_timeout)
            .send()
            .await
        {
            Ok(response) => response.status().is_success(),
            Err(e) => {
                debug!(%url, error = %e, "HEAD probe failed");
                false
            }
        }
    }
}
