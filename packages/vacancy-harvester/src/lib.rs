//! Date-ranged vacancy ingestion pipeline.
//!
//! Walks the hh.ru paged vacancy search for a publication date range,
//! fetches the full record for every listing not yet persisted, drops
//! records whose description content is already stored, and upserts the
//! rest into Postgres keyed by listing id.
//!
//! Failure containment: per-key failures never abort sibling keys or the
//! page, page failures never abort the run; only startup failures (missing
//! configuration, unreachable store, a dead first page) are fatal.
//!
//! # Modules
//!
//! - [`traits`] - seam toward the remote API (mockable)
//! - [`pipeline`] - pagination driver and bounded fetch-retry engine
//! - [`store`] - Postgres and in-memory `ListingStore` implementations
//! - [`dedup`] - process-local key/fingerprint cache seeded from the store
//! - [`testing`] - scripted mocks for exercising the pipeline

pub mod api;
pub mod config;
pub mod dedup;
pub mod error;
pub mod fingerprint;
pub mod pipeline;
pub mod store;
pub mod testing;
pub mod traits;
pub mod types;

pub use api::HhListingApi;
pub use config::HarvestConfig;
pub use dedup::DedupCache;
pub use error::{HarvestError, SearchError, StoreError};
pub use fingerprint::fingerprint;
pub use pipeline::{process_all, run_harvest, FetchPolicy};
pub use store::{ListingStore, MemoryStore, PostgresStore};
pub use traits::{DetailFetch, KeyPage, ListingApi};
pub use types::{DetailRecord, FetchOutcome, ListingKey, RunReport};
