//! Publication year inference from free-text summaries.
//!
//! Provider summaries look like `"A Smith, B Jones - Nature, 2019 - nature.com"`.
//! The first standalone four-digit run is taken as the year. This is a
//! heuristic: "1234" or "9999" are accepted, and a later, more plausible year
//! in the same text is ignored.

use chrono::NaiveDate;
use regex::Regex;
use std::sync::LazyLock;

/// Exactly four digits, not embedded in a longer word or digit run.
static YEAR_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(\d{4})\b").expect("year pattern is valid"));

/// Infer a publication date (January 1 of the year) from a summary string.
///
/// Returns `None` when no standalone four-digit run exists, or when the first
/// such run is not made of ASCII digits (e.g. other Unicode decimal digits).
pub fn infer_publication_date(text: &str) -> Option<NaiveDate> {
    let year_match = YEAR_REGEX.find(text)?;
    let year: i32 = year_match.as_str().parse().ok()?;
    NaiveDate::from_ymd_opt(year, 1, 1)
}
