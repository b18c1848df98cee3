//! Persistent record library.
//!
//! Saved records live in a JSON file (default `~/.rustharvest_library.json`).
//! Saving skips any record whose identity key is already stored. Saves on
//! one [`RecordStore`] are serialized, and each write replaces the file
//! atomically, so readers see either the old or the new library. Separate
//! processes sharing a file are not coordinated.

use crate::error::{HarvestError, Result};
use crate::record::{OwnedIdentityKey, ResearchRecord};
use serde::Serialize;
use std::collections::HashSet;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};
use tempfile::NamedTempFile;
use tracing::{debug, info, warn};

const LIBRARY_FILE_NAME: &str = ".rustharvest_library.json";

/// Default library path: `~/.rustharvest_library.json`
fn default_library_path() -> Result<PathBuf> {
    dirs::home_dir()
        .map(|p| p.join(LIBRARY_FILE_NAME))
        .ok_or_else(|| HarvestError::Config("Cannot determine home directory".to_string()))
}

/// Counts from one save call
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SaveSummary {
    pub saved: usize,
    pub skipped: usize,
}

/// JSON-file backed record store
pub struct RecordStore {
    path: PathBuf,
    /// Held across each read-modify-write of the library file
    write_lock: Mutex<()>,
}

impl RecordStore {
    /// Create a store at the default path
    pub fn new() -> Result<Self> {
        Ok(Self::with_path(default_library_path()?))
    }

    /// Create a store at a custom path
    pub fn with_path(path: PathBuf) -> Self {
        Self {
            path,
            write_lock: Mutex::new(()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, ()> {
        // The guarded state lives on disk, so a panicked writer leaves
        // nothing half-updated in memory.
        self.write_lock.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    /// Read stored records, failing on an unreadable or corrupt file.
    ///
    /// A missing file is an empty library.
    pub fn read(&self) -> Result<Vec<ResearchRecord>> {
        if !self.path.exists() {
            debug!("Library file not found: {:?}", self.path);
            return Ok(Vec::new());
        }

        let content = std::fs::read_to_string(&self.path)?;
        let records: Vec<ResearchRecord> = serde_json::from_str(&content)?;
        debug!("Loaded {} records from {:?}", records.len(), self.path);
        Ok(records)
    }

    /// Load stored records
    ///
    /// Returns empty vec if the file doesn't exist or is invalid
    pub fn load(&self) -> Vec<ResearchRecord> {
        self.read().unwrap_or_else(|e| {
            warn!("Failed to load library {:?}: {}", self.path, e);
            Vec::new()
        })
    }

    /// Append records not already present, by identity key.
    ///
    /// Refuses to write when the existing file cannot be parsed, so a corrupt
    /// library is never overwritten.
    pub fn save(&self, records: &[ResearchRecord]) -> Result<SaveSummary> {
        if records.is_empty() {
            warn!("No research works provided to save");
            return Err(HarvestError::Validation(
                "No research works provided to save".to_string(),
            ));
        }

        let _guard = self.lock();

        let mut stored = self.read()?;
        let mut known: HashSet<OwnedIdentityKey> =
            stored.iter().map(ResearchRecord::owned_identity_key).collect();

        let mut summary = SaveSummary::default();
        for record in records {
            if !known.insert(record.owned_identity_key()) {
                info!(
                    title = %record.title,
                    author = %record.author_names,
                    "Duplicate research work found and skipped"
                );
                summary.skipped += 1;
                continue;
            }
            stored.push(record.clone());
            summary.saved += 1;
        }

        if summary.saved > 0 {
            self.write_atomic(&stored)?;
        }

        info!(
            saved = summary.saved,
            skipped = summary.skipped,
            path = ?self.path,
            "Saved research works"
        );
        Ok(summary)
    }

    /// Write `records` to a temp file beside the library, then rename it over
    /// the library.
    fn write_atomic(&self, records: &[ResearchRecord]) -> Result<()> {
        let dir = match self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            Some(parent) => {
                std::fs::create_dir_all(parent)?;
                parent
            }
            None => Path::new("."),
        };

        let mut temp = NamedTempFile::new_in(dir)?;
        serde_json::to_writer_pretty(&mut temp, records)?;
        temp.flush()?;
        temp.persist(&self.path).map_err(|e| e.error)?;
        debug!("Wrote {} records to {:?}", records.len(), self.path);
        Ok(())
    }

    /// Remove the library file
    pub fn clear(&self) -> Result<()> {
        let _guard = self.lock();
        if self.path.exists() {
            std::fs::remove_file(&self.path)?;
            info!("Cleared library at {:?}", self.path);
        }
        Ok(())
    }
}
