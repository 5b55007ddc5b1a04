//! Fetch Gateway
//!
//! Outbound requests to the upstream blog, folded into `FetchError`.

use std::time::Duration;

use reqwest::{Client, StatusCode};
use tracing::{debug, warn};

use crate::error::{FetchError, Result};
use crate::fetcher::Feed;

/// Issues one GET per call against the upstream site.
///
/// There is no caching and no retrying here; request frequency is bounded by
/// the cache in front of the gateway. The client is cheap to clone and shares
/// its connection pool.
#[derive(Debug, Clone)]
pub struct FetchGateway {
    client: Client,
    base_url: String,
}

impl FetchGateway {
    /// Builds a gateway whose every request is capped by `timeout`.
    ///
    /// # Arguments
    /// * `base_url` - Upstream address without a trailing slash
    /// * `timeout` - Ceiling for a whole request, fixed for the process lifetime
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> reqwest::Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }

    pub fn feed_url(&self) -> String {
        format!("{}/feed/?type=rss", self.base_url)
    }

    /// Upstream documents live under a trailing slash.
    pub fn document_url(&self, slug: &str) -> String {
        format!("{}/{}/", self.base_url, slug)
    }

    // == Fetch Feed ==
    /// Fetches and parses the RSS feed.
    pub async fn fetch_feed(&self) -> Result<Feed> {
        let url = self.feed_url();
        let not_found = format!("Feed not found at {}", url);
        let response = self.get(&url, not_found).await?;

        let body = response.bytes().await.map_err(FetchError::network)?;
        Feed::parse(&body).map_err(|e| {
            warn!(url = %url, error = %e, "upstream feed could not be parsed");
            FetchError::Server(format!("Invalid feed: {}", e))
        })
    }

    // == Fetch Document ==
    /// Fetches the raw HTML of a post or page.
    pub async fn fetch_document(&self, slug: &str) -> Result<String> {
        let url = self.document_url(slug);
        let not_found = format!("Page not found: {}", slug);
        let response = self.get(&url, not_found).await?;

        response.text().await.map_err(FetchError::network)
    }

    async fn get(&self, url: &str, not_found: String) -> Result<reqwest::Response> {
        debug!(url, "fetching upstream");

        let response = self.client.get(url).send().await.map_err(|e| {
            warn!(url, error = %e, "upstream request failed");
            FetchError::network(e)
        })?;

        classify(response.status(), not_found)?;
        Ok(response)
    }
}

// == Classify ==
/// Maps an upstream status to the error taxonomy.
///
/// - 404 -> `NotFound` carrying `not_found`, never the upstream body
/// - 5xx -> `Server("Server error {code}")`
/// - other 4xx -> `Server("HTTP error {code}")`
/// - anything else is success
pub fn classify(status: StatusCode, not_found: String) -> Result<()> {
    if status == StatusCode::NOT_FOUND {
        return Err(FetchError::NotFound(not_found));
    }
    if status.is_server_error() {
        return Err(FetchError::Server(format!("Server error {}", status.as_u16())));
    }
    if status.is_client_error() {
        return Err(FetchError::Server(format!("HTTP error {}", status.as_u16())));
    }
    Ok(())
}
