//! Provider and harvest configuration values.
//!
//! The credential travels as part of [`ProviderConfig`], handed to the client
//! at construction. Nothing is read from ambient state here; the binary maps
//! CLI flags and environment variables onto these structs.

use crate::error::{HarvestError, Result};
use std::time::Duration;

/// Default SerpApi endpoint
pub const DEFAULT_BASE_URL: &str = "https://serpapi.com";

/// SerpApi engine selector for Google Scholar
pub const SCHOLAR_ENGINE: &str = "google_scholar";

/// Default request timeout in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Default number of provider pages per harvest
pub const DEFAULT_MAX_PAGES: u32 = 5;

/// Default results requested per provider page
pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// Connection settings for the search provider.
#[derive(Clone)]
pub struct ProviderConfig {
    /// SerpApi key
    pub api_key: String,
    /// Base URL, e.g. "https://serpapi.com" or a mock server
    pub base_url: String,
    /// Engine parameter sent with every query
    pub engine: String,
    /// Per-request timeout
    pub timeout: Duration,
}

impl ProviderConfig {
    /// Config for the public SerpApi endpoint
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            engine: SCHOLAR_ENGINE.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    /// Override the base URL (mirrors, proxies, tests)
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Reject configs that cannot produce a valid request.
    pub fn validate(&self) -> Result<()> {
        if self.api_key.trim().is_empty() {
            return Err(HarvestError::Config("API key must not be empty".to_string()));
        }
        if self.base_url.trim().is_empty() {
            return Err(HarvestError::Config("Base URL must not be empty".to_string()));
        }
        Ok(())
    }
}

// Keep the key out of logs.
impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("engine", &self.engine)
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Paging limits for one harvest.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HarvestOptions {
    /// Maximum number of provider pages to fetch
    pub max_pages: u32,
    /// Results requested per page (`num`)
    pub page_size: u32,
}

impl Default for HarvestOptions {
    fn default() -> Self {
        Self {
            max_pages: DEFAULT_MAX_PAGES,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl HarvestOptions {
    pub fn validate(&self) -> Result<()> {
        if self.page_size == 0 {
            return Err(HarvestError::Validation(
                "page_size must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Zero-based `start` offset for a 1-based page number
    pub fn offset(&self, page: u32) -> u32 {
        page.saturating_sub(1).saturating_mul(self.page_size)
    }
}
