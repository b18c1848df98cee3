//! Record extraction from raw provider results.
//!
//! Each entry of `organic_results` is a loosely-shaped JSON object:
//!
//! ```json
//! {
//!   "title": "...",
//!   "link": "...",
//!   "snippet": "...",
//!   "publication_info": {
//!     "summary": "A Smith - Nature, 2019 - nature.com",
//!     "authors": [{ "name": "A Smith" }]
//!   }
//! }
//! ```
//!
//! Every field is optional and `null` counts as absent. Missing fields become
//! sentinels; only a structurally unexpected entry is skipped.

use crate::date::infer_publication_date;
use crate::record::{ResearchRecord, NO_ABSTRACT, NO_TITLE, UNKNOWN_AUTHOR};
use serde_json::Value;
use tracing::{debug, warn};

/// Outcome of extracting one raw result.
#[derive(Debug, Clone, PartialEq)]
pub enum ExtractOutcome {
    /// The entry was normalized into a record
    Record(ResearchRecord),
    /// The entry had an unexpected shape and was dropped
    Skipped {
        /// Human-readable reason, for logs
        diagnostic: String,
    },
}

impl ExtractOutcome {
    fn skipped(diagnostic: impl Into<String>) -> Self {
        ExtractOutcome::Skipped {
            diagnostic: diagnostic.into(),
        }
    }

    /// The record, if extraction succeeded
    pub fn into_record(self) -> Option<ResearchRecord> {
        match self {
            ExtractOutcome::Record(record) => Some(record),
            ExtractOutcome::Skipped { .. } => None,
        }
    }
}

/// Extract a normalized record from one raw search result.
pub fn extract_record(entry: &Value) -> ExtractOutcome {
    match try_extract(entry) {
        Ok(record) => ExtractOutcome::Record(record),
        Err(diagnostic) => ExtractOutcome::skipped(diagnostic),
    }
}

/// Extract every entry on a page, logging and dropping skipped ones.
pub fn extract_page(entries: &[Value], page: u32) -> Vec<ResearchRecord> {
    let mut records = Vec::with_capacity(entries.len());

    for (index, entry) in entries.iter().enumerate() {
        match extract_record(entry) {
            ExtractOutcome::Record(record) => records.push(record),
            ExtractOutcome::Skipped { diagnostic } => {
                warn!(page, index, diagnostic = %diagnostic, "Skipping malformed result");
            }
        }
    }

    debug!(page, extracted = records.len(), total = entries.len(), "Extracted page");
    records
}

fn try_extract(entry: &Value) -> std::result::Result<ResearchRecord, String> {
    let fields = entry
        .as_object()
        .ok_or_else(|| format!("result is {}, expected object", kind(entry)))?;

    let publication_info = match fields.get("publication_info") {
        None | Some(Value::Null) => None,
        Some(Value::Object(info)) => Some(info),
        Some(other) => {
            return Err(format!(
                "publication_info is {}, expected object",
                kind(other)
            ))
        }
    };

    let author_names = match publication_info.and_then(|info| info.get("authors")) {
        None | Some(Value::Null) => UNKNOWN_AUTHOR.to_string(),
        Some(Value::Array(authors)) => join_author_names(authors)?,
        Some(other) => return Err(format!("authors is {}, expected array", kind(other))),
    };

    let summary = optional_text(
        publication_info.and_then(|info| info.get("summary")),
        "publication_info.summary",
    )?
    .unwrap_or_default();

    let title = optional_text(fields.get("title"), "title")?.unwrap_or_else(|| NO_TITLE.to_string());
    let abstract_text =
        optional_text(fields.get("snippet"), "snippet")?.unwrap_or_else(|| NO_ABSTRACT.to_string());
    let source_url = optional_text(fields.get("link"), "link")?;

    Ok(ResearchRecord {
        title,
        author_names,
        abstract_text,
        publication_date: infer_publication_date(&summary),
        source_url,
    })
}

/// Join author names with ", ", substituting "Unknown" per missing name.
fn join_author_names(authors: &[Value]) -> std::result::Result<String, String> {
    let mut names = Vec::with_capacity(authors.len());

    for (i, author) in authors.iter().enumerate() {
        let author = author
            .as_object()
            .ok_or_else(|| format!("authors[{}] is {}, expected object", i, kind(author)))?;
        let name = optional_text(author.get("name"), "authors[].name")?
            .unwrap_or_else(|| UNKNOWN_AUTHOR.to_string());
        names.push(name);
    }

    Ok(names.join(", "))
}

fn optional_text(value: Option<&Value>, field: &str) -> std::result::Result<Option<String>, String> {
    match value {
        Some(value) => text_field(value, field),
        None => Ok(None),
    }
}

/// Render a scalar as text. `null` is absent; containers are a shape error.
fn text_field(value: &Value, field: &str) -> std::result::Result<Option<String>, String> {
    match value {
        Value::Null => Ok(None),
        Value::String(s) => Ok(Some(s.clone())),
        Value::Number(n) => Ok(Some(n.to_string())),
        Value::Bool(b) => Ok(Some(b.to_string())),
        Value::Array(_) | Value::Object(_) => {
            Err(format!("{} is {}, expected text", field, kind(value)))
        }
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use serde_json::json;

    fn record(entry: Value) -> ResearchRecord {
        extract_record(&entry)
            .into_record()
            .expect("entry should extract")
    }

    #[test]
    fn test_full_entry() {
        let r = record(json!({
            "title": "Deep Learning",
            "link": "https://example.com/dl",
            "snippet": "We review deep learning.",
            "publication_info": {
                "summary": "Y LeCun, Y Bengio, G Hinton - nature, 2015 - nature.com",
                "authors": [{"name": "Y LeCun"}, {"name": "Y Bengio"}, {"name": "G Hinton"}]
            }
        }));
        assert_eq!(r.title, "Deep Learning");
        assert_eq!(r.author_names, "Y LeCun, Y Bengio, G Hinton");
        assert_eq!(r.abstract_text, "We review deep learning.");
        assert_eq!(r.source_url.as_deref(), Some("https://example.com/dl"));
        assert_eq!(r.publication_date, NaiveDate::from_ymd_opt(2015, 1, 1));
    }

    #[test]
    fn test_empty_entry_uses_sentinels() {
        let r = record(json!({}));
        assert_eq!(r.title, NO_TITLE);
        assert_eq!(r.author_names, UNKNOWN_AUTHOR);
        assert_eq!(r.abstract_text, NO_ABSTRACT);
        assert_eq!(r.publication_date, None);
        assert_eq!(r.source_url, None);
    }

    #[test]
    fn test_nulls_are_absent() {
        let r = record(json!({
            "title": null,
            "link": null,
            "snippet": null,
            "publication_info": {"summary": null, "authors": null}
        }));
        assert_eq!(r.title, NO_TITLE);
        assert_eq!(r.author_names, UNKNOWN_AUTHOR);
        assert_eq!(r.source_url, None);
        assert_eq!(r.publication_date, None);
    }

    #[test]
    fn test_per_author_fallback() {
        let r = record(json!({
            "publication_info": {"authors": [{"name": "A Smith"}, {}, {"name": null}]}
        }));
        assert_eq!(r.author_names, "A Smith, Unknown, Unknown");
    }

    #[test]
    fn test_empty_author_list_joins_to_empty() {
        let r = record(json!({"publication_info": {"authors": []}}));
        assert_eq!(r.author_names, "");
    }

    #[test]
    fn test_scenario_two_entries() {
        let page = vec![
            json!({
                "title": "First",
                "publication_info": {
                    "summary": "A. Smith - Journal of Things, 2019 - example.org",
                    "authors": [{"name": "A. Smith"}]
                }
            }),
            json!({"title": "Second", "publication_info": {"summary": ""}}),
        ];

        let records = extract_page(&page, 1);
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].author_names, "A. Smith");
        assert_eq!(records[0].publication_date, NaiveDate::from_ymd_opt(2019, 1, 1));
        assert_eq!(records[1].author_names, UNKNOWN_AUTHOR);
        assert_eq!(records[1].publication_date, None);
    }

    #[test]
    fn test_unexpected_shapes_are_skipped() {
        let bad = [
            json!("just a string"),
            json!({"publication_info": "2019"}),
            json!({"publication_info": {"authors": "A Smith"}}),
            json!({"publication_info": {"authors": ["A Smith"]}}),
            json!({"title": ["nested"]}),
        ];
        for entry in &bad {
            assert!(
                matches!(extract_record(entry), ExtractOutcome::Skipped { .. }),
                "expected skip for {}",
                entry
            );
        }
    }

    #[test]
    fn test_bad_entry_does_not_abort_page() {
        let page = vec![json!({"title": "A"}), json!(42), json!({"title": "B"})];
        let titles: Vec<String> = extract_page(&page, 2).into_iter().map(|r| r.title).collect();
        assert_eq!(titles, vec!["A", "B"]);
    }

    #[test]
    fn test_scalar_title_rendered_as_text() {
        assert_eq!(record(json!({"title": 1984})).title, "1984");
    }
}
