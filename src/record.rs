//! Normalized bibliographic record.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Placeholder title when the provider omits one
pub const NO_TITLE: &str = "No title available";

/// Placeholder abstract when the provider omits the snippet
pub const NO_ABSTRACT: &str = "No abstract available";

/// Placeholder author when names cannot be resolved
pub const UNKNOWN_AUTHOR: &str = "Unknown";

/// A single harvested research work.
///
/// Built once by the extractor and never mutated afterwards; filtering and
/// deduplication produce new collections.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResearchRecord {
    /// Article title
    pub title: String,
    /// Contributor names joined with ", "
    pub author_names: String,
    /// Short text excerpt
    pub abstract_text: String,
    /// Inferred publication date, always January 1 of the inferred year
    pub publication_date: Option<NaiveDate>,
    /// Link to the original listing
    pub source_url: Option<String>,
}

/// Borrowed identity of a record: (title, author_names, source_url).
///
/// Two records with equal keys are duplicates. Comparison is exact and
/// case-sensitive.
pub type IdentityKey<'a> = (&'a str, &'a str, Option<&'a str>);

/// Owned form of [`IdentityKey`], for keys that outlive the record.
pub type OwnedIdentityKey = (String, String, Option<String>);

impl ResearchRecord {
    /// Identity key used for duplicate detection
    pub fn identity_key(&self) -> IdentityKey<'_> {
        (
            self.title.as_str(),
            self.author_names.as_str(),
            self.source_url.as_deref(),
        )
    }

    /// Identity key as owned strings, for hash sets across batches
    pub fn owned_identity_key(&self) -> OwnedIdentityKey {
        (
            self.title.clone(),
            self.author_names.clone(),
            self.source_url.clone(),
        )
    }

    /// Publication date formatted as `yyyy-MM-dd`, or empty when absent
    pub fn formatted_date(&self) -> String {
        self.publication_date
            .map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_default()
    }
}
