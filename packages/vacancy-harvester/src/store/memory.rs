//! In-memory listing store for testing and development.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;

use crate::error::{StoreError, StoreResult};
use crate::store::ListingStore;
use crate::types::DetailRecord;

#[derive(Debug, Clone)]
struct StoredRecord {
    payload: serde_json::Value,
    fingerprint: String,
}

/// Listing store backed by a map. Data is lost on restart; not for
/// production use.
///
/// Enforces the same uniqueness rules as the Postgres store, including the
/// duplicate-fingerprint rejection, so pipeline tests exercise the real
/// conflict path.
pub struct MemoryStore {
    records: RwLock<HashMap<String, StoredRecord>>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self {
            records: RwLock::new(HashMap::new()),
        }
    }

    /// Number of stored records.
    pub fn record_count(&self) -> usize {
        self.records.read().unwrap().len()
    }

    /// Stored payload for a key, for test assertions.
    pub fn payload(&self, key: &str) -> Option<serde_json::Value> {
        self.records
            .read()
            .unwrap()
            .get(key)
            .map(|record| record.payload.clone())
    }
}

#[async_trait]
impl ListingStore for MemoryStore {
    async fn load_known(&self) -> StoreResult<Vec<(String, Option<String>)>> {
        Ok(self
            .records
            .read()
            .unwrap()
            .iter()
            .map(|(key, record)| (key.clone(), Some(record.fingerprint.clone())))
            .collect())
    }

    async fn upsert(&self, record: &DetailRecord) -> StoreResult<()> {
        let mut records = self.records.write().unwrap();

        let conflict = records
            .iter()
            .any(|(key, stored)| stored.fingerprint == record.fingerprint && *key != record.key.0);
        if conflict {
            return Err(StoreError::DuplicateFingerprint {
                fingerprint: record.fingerprint.clone(),
            });
        }

        records.insert(
            record.key.0.clone(),
            StoredRecord {
                payload: record.payload.clone(),
                fingerprint: record.fingerprint.clone(),
            },
        );
        Ok(())
    }
}
