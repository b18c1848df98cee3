//! CSV export of harvested records.
//!
//! Output layout:
//!
//! ```text
//! Title,Author,Abstract,PublicationDate,SourceUrl
//! "T","A","B","2020-01-01","U"
//! ```
//!
//! The header is written bare; every data field is quoted, with embedded
//! quotes doubled. Absent dates and URLs become `""`.

use crate::error::{HarvestError, Result};
use crate::record::ResearchRecord;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::info;

/// Header row, written verbatim
pub const CSV_HEADER: &str = "Title,Author,Abstract,PublicationDate,SourceUrl";

/// Suffix appended to the sanitized query term
const FILE_SUFFIX: &str = "_ResearchWorks.csv";

/// Write records as CSV into `writer`.
pub fn write_csv<W: Write>(mut writer: W, records: &[ResearchRecord]) -> Result<()> {
    writeln!(writer, "{}", CSV_HEADER)?;

    let mut wtr = csv::WriterBuilder::new()
        .has_headers(false)
        .quote_style(csv::QuoteStyle::Always)
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(writer);

    for record in records {
        let date = record.formatted_date();
        wtr.write_record([
            record.title.as_str(),
            record.author_names.as_str(),
            record.abstract_text.as_str(),
            date.as_str(),
            record.source_url.as_deref().unwrap_or(""),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}

/// Render records to an in-memory CSV document.
pub fn to_csv_string(records: &[ResearchRecord]) -> Result<String> {
    let mut buffer = Vec::new();
    write_csv(&mut buffer, records)?;
    String::from_utf8(buffer).map_err(|e| HarvestError::Parse(format!("CSV is not UTF-8: {}", e)))
}

/// File name for an export: `{term}_ResearchWorks.csv`.
///
/// Keeps alphanumerics, `-`, `_` and spaces from the term; spaces become `_`.
pub fn export_file_name(term: &str) -> String {
    let safe_term: String = term
        .chars()
        .filter(|c| c.is_alphanumeric() || *c == ' ' || *c == '-' || *c == '_')
        .collect::<String>()
        .trim()
        .replace(' ', "_");
    format!("{}{}", safe_term, FILE_SUFFIX)
}

/// Write records to `{dir}/{term}_ResearchWorks.csv`, creating `dir` if needed.
pub fn save_csv(dir: &Path, term: &str, records: &[ResearchRecord]) -> Result<PathBuf> {
    std::fs::create_dir_all(dir)?;
    let path = dir.join(export_file_name(term));
    let file = std::fs::File::create(&path)?;
    write_csv(std::io::BufWriter::new(file), records)?;
    info!(path = %path.display(), count = records.len(), "Saved CSV");
    Ok(path)
}
