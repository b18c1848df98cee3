//! Paged harvesting against a search provider.
//!
//! Pages are fetched strictly in order. An empty or missing
//! `organic_results` collection ends the harvest normally; a provider failure
//! on any page fails the whole harvest, discarding pages already fetched.

use crate::config::HarvestOptions;
use crate::dedup::merge_passes;
use crate::error::{HarvestError, Result};
use crate::extract::extract_page;
use crate::provider::{PageQuery, SearchProvider};
use crate::record::ResearchRecord;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use tracing::{error, info, warn};

/// What the query string names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SearchMode {
    ByAuthor,
    ByTitle,
}

impl fmt::Display for SearchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SearchMode::ByAuthor => f.write_str("author"),
            SearchMode::ByTitle => f.write_str("title"),
        }
    }
}

/// Drives paged queries and aggregates extracted records.
pub struct Harvester<P> {
    provider: P,
}

impl<P: SearchProvider> Harvester<P> {
    pub fn new(provider: P) -> Self {
        Self { provider }
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Harvest records whose listing matches an author name
    pub async fn harvest_by_author(
        &self,
        author: &str,
        options: &HarvestOptions,
    ) -> Result<Vec<ResearchRecord>> {
        self.harvest(SearchMode::ByAuthor, author, options).await
    }

    /// Harvest records matching a title query
    pub async fn harvest_by_title(
        &self,
        title: &str,
        options: &HarvestOptions,
    ) -> Result<Vec<ResearchRecord>> {
        self.harvest(SearchMode::ByTitle, title, options).await
    }

    /// Fetch up to `options.max_pages` pages for `query`.
    ///
    /// # Errors
    ///
    /// Returns the provider's error if any page fails, or a validation error
    /// for a zero page size. Malformed individual results never fail the
    /// harvest; they are logged and skipped.
    pub async fn harvest(
        &self,
        mode: SearchMode,
        query: &str,
        options: &HarvestOptions,
    ) -> Result<Vec<ResearchRecord>> {
        options.validate()?;

        info!(
            query,
            mode = %mode,
            max_pages = options.max_pages,
            page_size = options.page_size,
            "Starting harvest"
        );

        let mut all_records = Vec::new();

        for page in 1..=options.max_pages {
            let request = PageQuery {
                query,
                num: options.page_size,
                start: options.offset(page),
            };

            info!(query, mode = %mode, page, "Requesting page");

            let document = match self.provider.fetch_page(&request).await {
                Ok(document) => document,
                Err(e) => {
                    error!(query, mode = %mode, page, error = %e, "Harvest failed");
                    return Err(e);
                }
            };

            let Some(entries) = organic_results(&document) else {
                warn!(query, page, "No results in response, stopping");
                break;
            };

            let records = extract_page(entries, page);
            info!(page, count = records.len(), "Parsed results");
            all_records.extend(records);
        }

        info!(query, mode = %mode, total = all_records.len(), "Harvest complete");
        Ok(all_records)
    }

    /// Run the title pass, then the author pass, and deduplicate.
    ///
    /// At least one of `title` or `author` must be non-empty.
    pub async fn harvest_combined(
        &self,
        title: Option<&str>,
        author: Option<&str>,
        options: &HarvestOptions,
    ) -> Result<Vec<ResearchRecord>> {
        let title = non_empty(title);
        let author = non_empty(author);

        if title.is_none() && author.is_none() {
            return Err(HarvestError::Validation(
                "Either author name or title is required".to_string(),
            ));
        }

        let mut passes = Vec::with_capacity(2);
        if let Some(title) = title {
            passes.push(self.harvest_by_title(title, options).await?);
        }
        if let Some(author) = author {
            passes.push(self.harvest_by_author(author, options).await?);
        }

        Ok(merge_passes(passes))
    }
}

/// Non-empty `organic_results` array, if the document has one.
fn organic_results(document: &Value) -> Option<&[Value]> {
    document
        .get("organic_results")
        .and_then(Value::as_array)
        .filter(|results| !results.is_empty())
        .map(Vec::as_slice)
}

/// Trimmed value, or `None` when absent or blank
pub(crate) fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
