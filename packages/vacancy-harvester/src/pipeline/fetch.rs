//! Bounded-concurrency detail fetch with a fixed retry budget.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Semaphore;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::dedup::DedupCache;
use crate::error::StoreError;
use crate::fingerprint::fingerprint;
use crate::store::ListingStore;
use crate::traits::{DetailFetch, ListingApi};
use crate::types::{DetailRecord, FetchOutcome, ListingKey};

/// Pool width and retry budget for the fetch engine.
#[derive(Debug, Clone)]
pub struct FetchPolicy {
    /// Maximum detail fetches in flight at once.
    pub concurrency: usize,
    /// Retries after the first attempt. Fetch and store failures share the
    /// same counter.
    pub max_retries: u32,
    /// Fixed wait between attempts.
    pub retry_delay: Duration,
}

impl Default for FetchPolicy {
    fn default() -> Self {
        Self {
            concurrency: 10,
            max_retries: 3,
            retry_delay: Duration::from_secs(10),
        }
    }
}

/// Fetch, deduplicate and store every key, returning one terminal outcome
/// per processed key.
///
/// Work is independent per key; no outcome depends on another key's, only
/// on the shared cache and store state. Keys not yet started when `cancel`
/// fires are skipped and absent from the result; in-flight fetches drain.
pub async fn process_all<A, S>(
    keys: Vec<ListingKey>,
    api: Arc<A>,
    store: Arc<S>,
    cache: Arc<DedupCache>,
    policy: &FetchPolicy,
    cancel: &CancellationToken,
) -> HashMap<ListingKey, FetchOutcome>
where
    A: ListingApi + 'static,
    S: ListingStore + 'static,
{
    let semaphore = Arc::new(Semaphore::new(policy.concurrency.max(1)));
    let mut handles = Vec::with_capacity(keys.len());

    for key in keys {
        if cancel.is_cancelled() {
            debug!("Cancellation requested; not dispatching remaining keys");
            break;
        }
        let api = Arc::clone(&api);
        let store = Arc::clone(&store);
        let cache = Arc::clone(&cache);
        let semaphore = Arc::clone(&semaphore);
        let policy = policy.clone();
        let cancel = cancel.clone();

        handles.push(tokio::spawn(async move {
            let _permit = semaphore.acquire_owned().await.unwrap();
            if cancel.is_cancelled() {
                return (key, None);
            }
            let outcome = process_one(
                &key,
                api.as_ref(),
                store.as_ref(),
                cache.as_ref(),
                &policy,
                &cancel,
            )
            .await;
            (key, Some(outcome))
        }));
    }

    let mut outcomes = HashMap::with_capacity(handles.len());
    for handle in handles {
        match handle.await {
            Ok((key, Some(outcome))) => {
                outcomes.insert(key, outcome);
            }
            Ok((_, None)) => {}
            Err(err) => warn!(error = %err, "Fetch worker panicked"),
        }
    }
    outcomes
}

enum Attempt {
    Done(FetchOutcome),
    Retry(String),
}

/// Drive one key to a terminal outcome, applying the retry budget.
async fn process_one<A, S>(
    key: &ListingKey,
    api: &A,
    store: &S,
    cache: &DedupCache,
    policy: &FetchPolicy,
    cancel: &CancellationToken,
) -> FetchOutcome
where
    A: ListingApi + ?Sized,
    S: ListingStore + ?Sized,
{
    let mut retries: u32 = 0;
    loop {
        match attempt_one(key, api, store, cache).await {
            Attempt::Done(outcome) => return outcome,
            Attempt::Retry(reason) => {
                retries += 1;
                if retries > policy.max_retries {
                    warn!(key = %key, retries, "Retry budget exhausted; giving up");
                    return FetchOutcome::Failed;
                }
                debug!(key = %key, attempt = retries, reason = %reason, "Retryable failure; backing off");
                tokio::select! {
                    _ = cancel.cancelled() => {
                        debug!(key = %key, "Cancelled during retry backoff");
                        return FetchOutcome::Failed;
                    }
                    _ = tokio::time::sleep(policy.retry_delay) => {}
                }
            }
        }
    }
}

/// One fetch-hash-dedup-store pass for a key.
async fn attempt_one<A, S>(key: &ListingKey, api: &A, store: &S, cache: &DedupCache) -> Attempt
where
    A: ListingApi + ?Sized,
    S: ListingStore + ?Sized,
{
    let mut payload = match api.fetch_detail(key).await {
        DetailFetch::Payload(payload) => payload,
        DetailFetch::NotFound => {
            debug!(key = %key, "Listing gone (404); skipping");
            return Attempt::Done(FetchOutcome::SkippedNotFound);
        }
        DetailFetch::Invalid(reason) => {
            warn!(key = %key, reason = %reason, "Unparseable detail payload; skipping");
            return Attempt::Done(FetchOutcome::SkippedInvalid);
        }
        DetailFetch::Retryable(reason) => return Attempt::Retry(reason),
    };

    let description = payload
        .get("description")
        .and_then(|value| value.as_str())
        .unwrap_or_default();
    if description.is_empty() {
        warn!(key = %key, "Detail payload has no description; skipping");
        return Attempt::Done(FetchOutcome::SkippedInvalid);
    }

    let hash = fingerprint(description);
    if cache.contains_fingerprint(&hash) {
        debug!(key = %key, "Description fingerprint already known; skipping");
        return Attempt::Done(FetchOutcome::SkippedDuplicate);
    }

    if let Some(object) = payload.as_object_mut() {
        object.insert(
            "description_hash".to_string(),
            serde_json::Value::String(hash.clone()),
        );
    }
    let record = DetailRecord {
        key: key.clone(),
        payload,
        fingerprint: hash,
    };

    match store.upsert(&record).await {
        Ok(()) => {
            cache.record_accepted(key.as_str(), &record.fingerprint);
            debug!(key = %key, fingerprint = %record.fingerprint, "Stored listing");
            Attempt::Done(FetchOutcome::Stored)
        }
        Err(StoreError::DuplicateFingerprint { .. }) => {
            // Another worker stored identical content between our cache
            // check and the upsert; the constraint is the authority.
            debug!(key = %key, "Store rejected duplicate fingerprint; counting as duplicate skip");
            Attempt::Done(FetchOutcome::SkippedDuplicate)
        }
        Err(err) => Attempt::Retry(err.to_string()),
    }
}
