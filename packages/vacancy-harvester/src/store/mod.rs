//! Persistence seam for harvested vacancies.

use async_trait::async_trait;

use crate::error::StoreResult;
use crate::types::DetailRecord;

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PostgresStore;

/// Storage for harvested listings (trait to allow mocking).
///
/// Implementations must enforce uniqueness on both the listing key and the
/// content fingerprint; the pipeline's in-memory cache is only an
/// optimization over those constraints, never their replacement.
#[async_trait]
pub trait ListingStore: Send + Sync {
    /// Project every stored record to `(key, fingerprint)` for cache
    /// seeding.
    async fn load_known(&self) -> StoreResult<Vec<(String, Option<String>)>>;

    /// Insert or replace the record matched by its listing key.
    ///
    /// Idempotent when called twice with identical content. A fingerprint
    /// already owned by a different key surfaces as
    /// [`StoreError::DuplicateFingerprint`](crate::error::StoreError).
    async fn upsert(&self, record: &DetailRecord) -> StoreResult<()>;
}
