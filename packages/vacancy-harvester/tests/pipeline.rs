//! End-to-end pipeline tests against scripted mocks: page walking, retry
//! policy, dedup, concurrency bounds and failure containment.

use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;
use tokio_util::sync::CancellationToken;

use vacancy_harvester::testing::{MockListingApi, ScriptedDetail};
use vacancy_harvester::{
    fingerprint, process_all, run_harvest, DedupCache, DetailRecord, FetchOutcome, FetchPolicy,
    HarvestError, ListingKey, ListingStore, MemoryStore,
};

fn fast_policy() -> FetchPolicy {
    FetchPolicy {
        concurrency: 10,
        max_retries: 3,
        retry_delay: Duration::from_millis(5),
    }
}

fn dates() -> (NaiveDate, NaiveDate) {
    (
        NaiveDate::from_ymd_opt(2026, 8, 1).unwrap(),
        NaiveDate::from_ymd_opt(2026, 8, 7).unwrap(),
    )
}

#[tokio::test]
async fn walks_every_reported_page() {
    let api = Arc::new(
        MockListingApi::new()
            .with_page(&["1"])
            .with_page(&["2"])
            .with_page(&["3"])
            .with_detail("1", ScriptedDetail::Description("first".into()))
            .with_detail("2", ScriptedDetail::Description("second".into()))
            .with_detail("3", ScriptedDetail::Description("third".into())),
    );
    let store = Arc::new(MemoryStore::new());
    let (from, to) = dates();

    let report = run_harvest(
        from,
        to,
        Arc::clone(&api),
        store,
        &fast_policy(),
        &CancellationToken::new(),
    )
    .await
    .unwrap();

    assert_eq!(api.search_calls(), vec![0, 1, 2]);
    assert_eq!(report.pages_seen, 3);
    assert_eq!(report.stored, 3);
}

#[tokio::test]
async fn not_found_is_never_retried() {
    let api = Arc::new(
        MockListingApi::new()
            .with_page(&["7"])
            .with_detail("7", ScriptedDetail::NotFound),
    );
    let store = Arc::new(MemoryStore::new());
    let (from, to) = dates();

    let report = run_harvest(
        from,
        to,
        Arc::clone(&api),
        store,
        &fast_policy(),
        &CancellationToken::new(),
    )
    .await
    .unwrap();

    assert_eq!(api.detail_attempts("7"), 1);
    assert_eq!(report.skipped_not_found, 1);
    assert_eq!(report.stored, 0);
}

#[tokio::test]
async fn transient_failures_are_retried_until_success() {
    let api = Arc::new(
        MockListingApi::new()
            .with_page(&["9"])
            .with_detail("9", ScriptedDetail::FlakyThenDescription(2, "text".into())),
    );
    let store = Arc::new(MemoryStore::new());
    let (from, to) = dates();

    let report = run_harvest(
        from,
        to,
        Arc::clone(&api),
        store,
        &fast_policy(),
        &CancellationToken::new(),
    )
    .await
    .unwrap();

    // Two transient failures, success on the third attempt.
    assert_eq!(api.detail_attempts("9"), 3);
    assert_eq!(report.stored, 1);
    assert_eq!(report.failed, 0);
}

#[tokio::test]
async fn exhausted_retry_budget_marks_failed() {
    let api = Arc::new(
        MockListingApi::new()
            .with_page(&["9"])
            .with_detail("9", ScriptedDetail::AlwaysRetryable),
    );
    let store = Arc::new(MemoryStore::new());
    let (from, to) = dates();

    let policy = FetchPolicy {
        max_retries: 2,
        ..fast_policy()
    };
    let report = run_harvest(
        from,
        to,
        Arc::clone(&api),
        Arc::clone(&store),
        &policy,
        &CancellationToken::new(),
    )
    .await
    .unwrap();

    // One initial attempt plus two retries.
    assert_eq!(api.detail_attempts("9"), 3);
    assert_eq!(report.failed, 1);
    assert_eq!(store.record_count(), 0);
}

#[tokio::test]
async fn missing_description_is_skipped_without_retry() {
    let api = Arc::new(
        MockListingApi::new()
            .with_page(&["5"])
            .with_detail("5", ScriptedDetail::Payload(serde_json::json!({"id": "5"}))),
    );
    let store = Arc::new(MemoryStore::new());
    let (from, to) = dates();

    let report = run_harvest(
        from,
        to,
        Arc::clone(&api),
        Arc::clone(&store),
        &fast_policy(),
        &CancellationToken::new(),
    )
    .await
    .unwrap();

    assert_eq!(api.detail_attempts("5"), 1);
    assert_eq!(report.skipped_invalid, 1);
    assert_eq!(store.record_count(), 0);
}

#[tokio::test]
async fn identical_descriptions_are_stored_once() {
    let api = Arc::new(
        MockListingApi::new()
            .with_page(&["a", "b"])
            .with_detail("a", ScriptedDetail::Description("same offer text".into()))
            .with_detail("b", ScriptedDetail::Description("same offer text".into())),
    );
    let store = Arc::new(MemoryStore::new());
    let (from, to) = dates();

    let report = run_harvest(
        from,
        to,
        api,
        Arc::clone(&store),
        &fast_policy(),
        &CancellationToken::new(),
    )
    .await
    .unwrap();

    // Whichever key lands first wins; the other is a duplicate skip.
    assert_eq!(report.stored, 1);
    assert_eq!(report.skipped_duplicate, 1);
    assert_eq!(store.record_count(), 1);
}

#[tokio::test]
async fn concurrency_stays_bounded() {
    let keys: Vec<String> = (0..40).map(|i| format!("k{i}")).collect();
    let key_refs: Vec<&str> = keys.iter().map(String::as_str).collect();

    let mut api = MockListingApi::new()
        .with_page(&key_refs)
        .with_detail_delay(Duration::from_millis(10));
    for (i, key) in keys.iter().enumerate() {
        api = api.with_detail(key, ScriptedDetail::Description(format!("offer {i}")));
    }
    let api = Arc::new(api);
    let store = Arc::new(MemoryStore::new());
    let (from, to) = dates();

    let policy = FetchPolicy {
        concurrency: 5,
        ..fast_policy()
    };
    let report = run_harvest(
        from,
        to,
        Arc::clone(&api),
        store,
        &policy,
        &CancellationToken::new(),
    )
    .await
    .unwrap();

    assert_eq!(report.stored, 40);
    assert!(api.max_in_flight() <= 5, "in flight: {}", api.max_in_flight());
    assert!(api.max_in_flight() >= 2, "fetches never overlapped");
}

#[tokio::test]
async fn two_new_listings_end_to_end() {
    let api = Arc::new(
        MockListingApi::new()
            .with_page(&["100"])
            .with_page(&["200"])
            .with_detail("100", ScriptedDetail::Description("backend role".into()))
            .with_detail("200", ScriptedDetail::Description("frontend role".into())),
    );
    let store = Arc::new(MemoryStore::new());
    let (from, to) = dates();

    let report = run_harvest(
        from,
        to,
        api,
        Arc::clone(&store),
        &fast_policy(),
        &CancellationToken::new(),
    )
    .await
    .unwrap();

    assert_eq!(report.stored, 2);
    assert_eq!(report.skipped_duplicate, 0);
    assert_eq!(report.skipped_not_found, 0);
    assert_eq!(report.skipped_invalid, 0);
    assert_eq!(report.failed, 0);

    for key in ["100", "200"] {
        let payload = store.payload(key).expect("record stored");
        let hash = payload
            .get("description_hash")
            .and_then(|v| v.as_str())
            .unwrap_or_default();
        assert_eq!(hash.len(), 64);
    }
}

#[tokio::test]
async fn bad_middle_page_does_not_abort_the_run() {
    let api = Arc::new(
        MockListingApi::new()
            .with_page(&["1"])
            .with_failing_page()
            .with_page(&["3"])
            .with_detail("1", ScriptedDetail::Description("one".into()))
            .with_detail("3", ScriptedDetail::Description("three".into())),
    );
    let store = Arc::new(MemoryStore::new());
    let (from, to) = dates();

    let report = run_harvest(
        from,
        to,
        Arc::clone(&api),
        store,
        &fast_policy(),
        &CancellationToken::new(),
    )
    .await
    .unwrap();

    assert_eq!(api.search_calls(), vec![0, 1, 2]);
    assert_eq!(report.stored, 2);
    assert_eq!(report.page_errors, 1);
    assert_eq!(report.pages_seen, 2);
}

#[tokio::test]
async fn dead_first_page_aborts_after_bounded_retries() {
    let api = Arc::new(MockListingApi::new().with_failing_page());
    let store = Arc::new(MemoryStore::new());
    let (from, to) = dates();

    let policy = FetchPolicy {
        max_retries: 2,
        ..fast_policy()
    };
    let err = run_harvest(
        from,
        to,
        Arc::clone(&api),
        store,
        &policy,
        &CancellationToken::new(),
    )
    .await
    .unwrap_err();

    assert!(matches!(err, HarvestError::PageCountUnknown { .. }));
    // One initial attempt plus two retries, all against page 0.
    assert_eq!(api.search_calls(), vec![0, 0, 0]);
}

#[tokio::test]
async fn flaky_first_page_recovers() {
    let api = Arc::new(
        MockListingApi::new()
            .with_flaky_page(1, &["1"])
            .with_detail("1", ScriptedDetail::Description("one".into())),
    );
    let store = Arc::new(MemoryStore::new());
    let (from, to) = dates();

    let report = run_harvest(
        from,
        to,
        Arc::clone(&api),
        store,
        &fast_policy(),
        &CancellationToken::new(),
    )
    .await
    .unwrap();

    assert_eq!(api.search_calls(), vec![0, 0]);
    assert_eq!(report.stored, 1);
}

#[tokio::test]
async fn seeded_keys_are_not_refetched() {
    let store = Arc::new(MemoryStore::new());
    store
        .upsert(&DetailRecord {
            key: ListingKey::from("1"),
            payload: serde_json::json!({"id": "1", "description_hash": "aaa"}),
            fingerprint: "aaa".to_string(),
        })
        .await
        .unwrap();

    let api = Arc::new(
        MockListingApi::new()
            .with_page(&["1", "2"])
            .with_detail("1", ScriptedDetail::Description("already stored".into()))
            .with_detail("2", ScriptedDetail::Description("brand new".into())),
    );
    let (from, to) = dates();

    let report = run_harvest(
        from,
        to,
        Arc::clone(&api),
        Arc::clone(&store),
        &fast_policy(),
        &CancellationToken::new(),
    )
    .await
    .unwrap();

    // Key 1 is filtered out before any detail fetch is spent on it.
    assert_eq!(api.detail_attempts("1"), 0);
    assert_eq!(api.detail_attempts("2"), 1);
    assert_eq!(report.stored, 1);
    assert_eq!(store.record_count(), 2);
}

#[tokio::test]
async fn store_fingerprint_conflict_counts_as_duplicate() {
    // Another process already stored this content under a different key and
    // our cache was never told - the store constraint must catch it.
    let store = Arc::new(MemoryStore::new());
    store
        .upsert(&DetailRecord {
            key: ListingKey::from("other"),
            payload: serde_json::json!({"id": "other"}),
            fingerprint: fingerprint("shared text"),
        })
        .await
        .unwrap();

    let api = Arc::new(
        MockListingApi::new().with_detail("a", ScriptedDetail::Description("shared text".into())),
    );
    let cache = Arc::new(DedupCache::new());

    let outcomes = process_all(
        vec![ListingKey::from("a")],
        api,
        Arc::clone(&store),
        cache,
        &fast_policy(),
        &CancellationToken::new(),
    )
    .await;

    assert_eq!(
        outcomes.get(&ListingKey::from("a")),
        Some(&FetchOutcome::SkippedDuplicate)
    );
    assert_eq!(store.record_count(), 1);
}

#[tokio::test]
async fn cancelled_run_stops_before_any_page() {
    let api = Arc::new(
        MockListingApi::new()
            .with_page(&["1"])
            .with_detail("1", ScriptedDetail::Description("one".into())),
    );
    let store = Arc::new(MemoryStore::new());
    let (from, to) = dates();

    let cancel = CancellationToken::new();
    cancel.cancel();

    let report = run_harvest(from, to, Arc::clone(&api), store, &fast_policy(), &cancel)
        .await
        .unwrap();

    assert!(api.search_calls().is_empty());
    assert_eq!(report.pages_seen, 0);
    assert_eq!(report.total_keys(), 0);
}
