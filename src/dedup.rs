//! Exact-key deduplication across harvest passes.

use crate::record::{OwnedIdentityKey, ResearchRecord};
use std::collections::HashSet;
use tracing::debug;

/// Keep the first record for each identity key, preserving input order.
pub fn dedupe(records: Vec<ResearchRecord>) -> Vec<ResearchRecord> {
    let before = records.len();
    let mut seen: HashSet<OwnedIdentityKey> = HashSet::with_capacity(before);

    let unique: Vec<ResearchRecord> = records
        .into_iter()
        .filter(|r| seen.insert(r.owned_identity_key()))
        .collect();

    debug!(before, after = unique.len(), "Deduplicated records");
    unique
}

/// Concatenate several passes in order, then deduplicate.
pub fn merge_passes<I>(passes: I) -> Vec<ResearchRecord>
where
    I: IntoIterator<Item = Vec<ResearchRecord>>,
{
    dedupe(passes.into_iter().flatten().collect())
}
