//! Listing and export flows shared by the CLI and the HTTP server.
//!
//! Listing (`search`, `/search`) harvests by author when an author is given,
//! narrowing by title if one is also given, and otherwise harvests by title.
//! Export and save run the combined title-then-author harvest with dedup.
//! Both apply the date range last.

use crate::config::HarvestOptions;
use crate::error::Result;
use crate::filter::{filter_by_date, filter_by_title, DateRange};
use crate::harvest::{non_empty, Harvester};
use crate::provider::SearchProvider;
use crate::record::ResearchRecord;

/// Whether either search term is present and non-blank
pub fn has_term(author: Option<&str>, title: Option<&str>) -> bool {
    non_empty(author).is_some() || non_empty(title).is_some()
}

/// Listing flow. Returns an empty listing, without querying, when neither
/// term is given.
pub async fn collect_listing<P: SearchProvider>(
    harvester: &Harvester<P>,
    author: Option<&str>,
    title: Option<&str>,
    range: &DateRange,
    options: &HarvestOptions,
) -> Result<Vec<ResearchRecord>> {
    let records = match (non_empty(author), non_empty(title)) {
        (Some(author), title) => {
            let records = harvester.harvest_by_author(author, options).await?;
            filter_by_title(records, title.unwrap_or_default())
        }
        (None, Some(title)) => harvester.harvest_by_title(title, options).await?,
        (None, None) => Vec::new(),
    };

    Ok(filter_by_date(records, range))
}

/// Export flow: title pass then author pass, deduplicated, then date range.
///
/// # Errors
///
/// A validation error when neither term is given, or the first provider
/// failure.
pub async fn collect_export<P: SearchProvider>(
    harvester: &Harvester<P>,
    author: Option<&str>,
    title: Option<&str>,
    range: &DateRange,
    options: &HarvestOptions,
) -> Result<Vec<ResearchRecord>> {
    let records = harvester.harvest_combined(title, author, options).await?;
    Ok(filter_by_date(records, range))
}

/// Query term used to name an export file: title first, then author.
pub fn export_term<'a>(author: Option<&'a str>, title: Option<&'a str>) -> &'a str {
    non_empty(title).or(non_empty(author)).unwrap_or_default()
}
