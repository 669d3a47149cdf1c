use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Identifier the remote API assigns to one vacancy listing.
///
/// Opaque and immutable once observed; also the primary key in the store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ListingKey(pub String);

impl ListingKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ListingKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ListingKey {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// A fully fetched vacancy ready for storage.
#[derive(Debug, Clone)]
pub struct DetailRecord {
    pub key: ListingKey,
    /// Schema-less payload exactly as the API returned it, plus the injected
    /// `description_hash` field.
    pub payload: serde_json::Value,
    /// Fingerprint of the description text; mirrors `description_hash` in
    /// the payload and backs the store's content-uniqueness constraint.
    pub fingerprint: String,
}

/// Terminal outcome of processing one listing key. Produced once per key per
/// run and only counted, never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    /// Fetched, content previously unseen, upserted.
    Stored,
    /// Description fingerprint already known; nothing written.
    SkippedDuplicate,
    /// The API reports the listing no longer exists.
    SkippedNotFound,
    /// Detail payload had no usable description; a retry would fetch the
    /// same bytes, so this is terminal.
    SkippedInvalid,
    /// Retry budget exhausted.
    Failed,
}

/// Final report for one harvest run.
#[derive(Debug, Clone, Default)]
pub struct RunReport {
    pub stored: usize,
    pub skipped_duplicate: usize,
    pub skipped_not_found: usize,
    pub skipped_invalid: usize,
    pub failed: usize,
    /// Search pages successfully fetched and processed.
    pub pages_seen: u32,
    /// Search pages that errored and were skipped.
    pub page_errors: u32,
    pub elapsed: Duration,
}

impl RunReport {
    pub(crate) fn record(&mut self, outcome: FetchOutcome) {
        match outcome {
            FetchOutcome::Stored => self.stored += 1,
            FetchOutcome::SkippedDuplicate => self.skipped_duplicate += 1,
            FetchOutcome::SkippedNotFound => self.skipped_not_found += 1,
            FetchOutcome::SkippedInvalid => self.skipped_invalid += 1,
            FetchOutcome::Failed => self.failed += 1,
        }
    }

    /// Total keys that reached a terminal outcome.
    pub fn total_keys(&self) -> usize {
        self.stored
            + self.skipped_duplicate
            + self.skipped_not_found
            + self.skipped_invalid
            + self.failed
    }
}
