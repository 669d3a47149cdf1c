//! Process-local advisory cache of known listing keys and fingerprints.

use std::collections::HashSet;
use std::sync::RwLock;

use crate::error::StoreResult;
use crate::store::ListingStore;

/// Known listing keys and description fingerprints, seeded once from the
/// store before any fetching begins.
///
/// Advisory only: the store's uniqueness constraints are the actual
/// guarantee. Each operation takes its own lock, so a check followed by a
/// record is not atomic as a pair; the upsert path tolerates losing that
/// race (see the duplicate-fingerprint handling in the fetch engine).
pub struct DedupCache {
    keys: RwLock<HashSet<String>>,
    fingerprints: RwLock<HashSet<String>>,
}

impl Default for DedupCache {
    fn default() -> Self {
        Self::new()
    }
}

impl DedupCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self {
            keys: RwLock::new(HashSet::new()),
            fingerprints: RwLock::new(HashSet::new()),
        }
    }

    /// Build a cache from the store's key/fingerprint projection.
    ///
    /// Runs to completion before the pipeline issues any fetches.
    pub async fn seed<S: ListingStore + ?Sized>(store: &S) -> StoreResult<Self> {
        let cache = Self::new();
        let known = store.load_known().await?;
        {
            let mut keys = cache.keys.write().unwrap();
            let mut fingerprints = cache.fingerprints.write().unwrap();
            for (key, fingerprint) in known {
                keys.insert(key);
                if let Some(fp) = fingerprint {
                    if !fp.is_empty() {
                        fingerprints.insert(fp);
                    }
                }
            }
        }
        tracing::info!(
            keys = cache.key_count(),
            fingerprints = cache.fingerprint_count(),
            "Seeded dedup cache from store"
        );
        Ok(cache)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.keys.read().unwrap().contains(key)
    }

    pub fn contains_fingerprint(&self, fingerprint: &str) -> bool {
        self.fingerprints.read().unwrap().contains(fingerprint)
    }

    /// Mark a key and its fingerprint as persisted.
    pub fn record_accepted(&self, key: &str, fingerprint: &str) {
        self.keys.write().unwrap().insert(key.to_string());
        self.fingerprints
            .write()
            .unwrap()
            .insert(fingerprint.to_string());
    }

    pub fn key_count(&self) -> usize {
        self.keys.read().unwrap().len()
    }

    pub fn fingerprint_count(&self) -> usize {
        self.fingerprints.read().unwrap().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use crate::types::{DetailRecord, ListingKey};

    #[test]
    fn accepted_fingerprint_stays_known() {
        let cache = DedupCache::new();
        assert!(!cache.contains_fingerprint("abc"));

        cache.record_accepted("1", "abc");
        assert!(cache.contains_key("1"));
        assert!(cache.contains_fingerprint("abc"));

        // Recording more keys never evicts earlier entries.
        cache.record_accepted("2", "def");
        assert!(cache.contains_fingerprint("abc"));
    }

    #[tokio::test]
    async fn seed_loads_projection_from_store() {
        let store = MemoryStore::new();
        store
            .upsert(&DetailRecord {
                key: ListingKey::from("42"),
                payload: serde_json::json!({"id": "42"}),
                fingerprint: "f42".to_string(),
            })
            .await
            .unwrap();

        let cache = DedupCache::seed(&store).await.unwrap();
        assert!(cache.contains_key("42"));
        assert!(cache.contains_fingerprint("f42"));
        assert!(!cache.contains_key("43"));
    }
}
