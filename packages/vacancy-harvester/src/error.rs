//! Typed errors for the harvester library.
//!
//! Uses `thiserror` for library errors (not `anyhow`); the `harvest` binary
//! wraps these with `anyhow` context at the edge.

use thiserror::Error;

/// Errors surfaced by [`ListingStore`](crate::store::ListingStore)
/// implementations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A different listing already owns this content fingerprint.
    ///
    /// Expected under concurrency: two vacancies with identical descriptions
    /// can both pass the advisory cache check, and the store's uniqueness
    /// constraint rejects whichever upsert lands second. Callers treat this
    /// as a duplicate skip, not a failure.
    #[error("fingerprint already stored: {fingerprint}")]
    DuplicateFingerprint { fingerprint: String },

    /// Any other database failure. Retryable.
    #[error("database error: {0}")]
    Database(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// Page-level search failure. The pagination driver logs it and moves on;
/// only a failure before the page count is known can become fatal.
#[derive(Debug, Error)]
pub enum SearchError {
    #[error("transport error: {0}")]
    Transport(String),

    #[error("malformed search response: {0}")]
    Parse(String),

    #[error("unexpected HTTP status {status}")]
    Status { status: u16 },
}

/// Errors that abort an entire harvest run.
///
/// Everything else - per-key failures, bad pages past the first - is
/// contained and counted in the [`RunReport`](crate::types::RunReport).
#[derive(Debug, Error)]
pub enum HarvestError {
    /// Seeding the dedup cache from the store failed before any fetching
    /// started.
    #[error("failed to load persisted keys and fingerprints")]
    Seed(#[source] StoreError),

    /// The first page never succeeded, so the server-reported page count is
    /// unknown and the page walk has no terminal condition.
    #[error("could not establish the search page count")]
    PageCountUnknown {
        #[source]
        source: SearchError,
    },
}

/// Result type alias for store operations.
pub type StoreResult<T> = std::result::Result<T, StoreError>;
