//! Result narrowing and display pagination.

use crate::record::ResearchRecord;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Default number of records per display page
pub const DEFAULT_PER_PAGE: usize = 10;

/// Optional inclusive publication-date window.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    /// Earliest accepted date (inclusive)
    pub start: Option<NaiveDate>,
    /// Latest accepted date (inclusive)
    pub end: Option<NaiveDate>,
}

impl DateRange {
    pub fn new(start: Option<NaiveDate>, end: Option<NaiveDate>) -> Self {
        Self { start, end }
    }

    /// True when neither bound is set
    pub fn is_unbounded(&self) -> bool {
        self.start.is_none() && self.end.is_none()
    }

    /// Whether a record's publication date falls inside the window.
    ///
    /// An undated record passes only when no bound is set.
    pub fn contains(&self, date: Option<NaiveDate>) -> bool {
        if self.is_unbounded() {
            return true;
        }
        let Some(date) = date else {
            return false;
        };
        self.start.map_or(true, |start| start <= date) && self.end.map_or(true, |end| date <= end)
    }
}

/// Keep records whose publication date falls within `range`.
pub fn filter_by_date(records: Vec<ResearchRecord>, range: &DateRange) -> Vec<ResearchRecord> {
    records
        .into_iter()
        .filter(|r| range.contains(r.publication_date))
        .collect()
}

/// Keep records whose title contains `needle`, ignoring case.
pub fn filter_by_title(records: Vec<ResearchRecord>, needle: &str) -> Vec<ResearchRecord> {
    let needle = needle.trim().to_lowercase();
    if needle.is_empty() {
        return records;
    }
    records
        .into_iter()
        .filter(|r| r.title.to_lowercase().contains(&needle))
        .collect()
}

/// One display page of results.
#[derive(Debug, Clone, Serialize)]
pub struct ResultPage<'a> {
    /// 1-based page number actually served
    pub current_page: usize,
    /// Number of pages, at least 1
    pub total_pages: usize,
    /// Number of records across all pages
    pub total_items: usize,
    /// Position of the first result within the full listing
    #[serde(skip)]
    pub offset: usize,
    pub results: &'a [ResearchRecord],
}

/// Slice `records` into the 1-based `page` of size `per_page`.
///
/// Page 0 is served as page 1; a page past the end is empty.
pub fn paginate(records: &[ResearchRecord], page: usize, per_page: usize) -> ResultPage<'_> {
    let per_page = per_page.max(1);
    let page = page.max(1);
    let total_items = records.len();
    let total_pages = total_items.div_ceil(per_page).max(1);

    let start = (page - 1).saturating_mul(per_page).min(total_items);
    let end = start.saturating_add(per_page).min(total_items);

    ResultPage {
        current_page: page,
        total_pages,
        total_items,
        offset: start,
        results: &records[start..end],
    }
}
