//! SerpApi Google Scholar client.
//!
//! The harvest driver only needs "send one page query, get back a parsed JSON
//! document". [`SearchProvider`] is that seam; [`SerpApiClient`] is the HTTP
//! implementation.
//!
//! API details:
//! - Endpoint: GET /search
//! - Params: engine, q, api_key, num, start (zero-based offset)
//! - Results under `organic_results`

use crate::config::ProviderConfig;
use crate::error::{HarvestError, Result};
use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, error};
use url::Url;

/// User agent string for requests
const USER_AGENT: &str = concat!("rustharvest/", env!("CARGO_PKG_VERSION"));

/// One page request against the provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageQuery<'a> {
    pub query: &'a str,
    /// Results per page (`num`)
    pub num: u32,
    /// Zero-based result offset (`start`)
    pub start: u32,
}

/// Source of raw search result documents.
#[async_trait]
pub trait SearchProvider: Send + Sync {
    /// Fetch one page. Any non-success outcome is an error.
    async fn fetch_page(&self, page: &PageQuery<'_>) -> Result<Value>;
}

/// HTTP client for SerpApi.
pub struct SerpApiClient {
    client: reqwest::Client,
    config: ProviderConfig,
}

impl SerpApiClient {
    /// Create a client from validated configuration
    pub fn new(config: ProviderConfig) -> Result<Self> {
        config.validate()?;

        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(config.timeout)
            .build()
            .map_err(|e| HarvestError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { client, config })
    }

    /// Build the search URL for one page
    fn build_search_url(&self, page: &PageQuery<'_>) -> Result<Url> {
        let base = self.config.base_url.trim_end_matches('/');
        let mut url = Url::parse(&format!("{}/search", base))
            .map_err(|e| HarvestError::Config(format!("Invalid base URL: {}", e)))?;

        url.query_pairs_mut()
            .append_pair("engine", &self.config.engine)
            .append_pair("q", page.query)
            .append_pair("api_key", &self.config.api_key)
            .append_pair("num", &page.num.to_string())
            .append_pair("start", &page.start.to_string());

        Ok(url)
    }
}

#[async_trait]
impl SearchProvider for SerpApiClient {
    async fn fetch_page(&self, page: &PageQuery<'_>) -> Result<Value> {
        let url = self.build_search_url(page)?;

        debug!(query = page.query, num = page.num, start = page.start, "Sending SerpApi request");

        let response = self.client.get(url).send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            error!(status = status.as_u16(), body = %body, "SerpApi request failed");
            return Err(HarvestError::Api {
                code: status.as_u16(),
                message: format!("Failed to retrieve data from SerpApi: {}", body),
            });
        }

        debug!(bytes = body.len(), "Received SerpApi response");

        serde_json::from_str(&body)
            .map_err(|e| HarvestError::Parse(format!("Failed to parse SerpApi response: {}", e)))
    }
}
