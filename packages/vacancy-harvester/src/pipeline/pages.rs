//! Sequential page walk over the date-ranged vacancy search.

use std::sync::Arc;
use std::time::Instant;

use chrono::NaiveDate;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::dedup::DedupCache;
use crate::error::HarvestError;
use crate::pipeline::fetch::{self, FetchPolicy};
use crate::store::ListingStore;
use crate::traits::ListingApi;
use crate::types::{ListingKey, RunReport};

/// Harvest every vacancy published inside the date range.
///
/// Seeds the dedup cache from the store, then walks search pages
/// sequentially, handing each page's unseen keys to the fetch engine. A bad
/// page past the first is logged and skipped; the first page gets a bounded
/// retry budget because without its `total_pages` the walk has no terminal
/// condition.
pub async fn run_harvest<A, S>(
    date_from: NaiveDate,
    date_to: NaiveDate,
    api: Arc<A>,
    store: Arc<S>,
    policy: &FetchPolicy,
    cancel: &CancellationToken,
) -> Result<RunReport, HarvestError>
where
    A: ListingApi + 'static,
    S: ListingStore + 'static,
{
    let started = Instant::now();
    let cache = Arc::new(
        DedupCache::seed(store.as_ref())
            .await
            .map_err(HarvestError::Seed)?,
    );

    let from = date_from.format("%Y-%m-%d").to_string();
    let to = date_to.format("%Y-%m-%d").to_string();
    info!(from = %from, to = %to, "Starting harvest run");

    let mut report = RunReport::default();
    let mut page: u32 = 0;
    let mut total_pages: Option<u32> = None;
    let mut first_page_attempts: u32 = 0;

    loop {
        if cancel.is_cancelled() {
            info!(page, "Cancellation requested; stopping page walk");
            break;
        }

        match api.search_page(&from, &to, page).await {
            Ok(key_page) => {
                if total_pages.is_none() {
                    total_pages = Some(key_page.total_pages.max(1));
                    info!(total_pages = key_page.total_pages, "Established page count");
                }
                report.pages_seen += 1;

                let fresh: Vec<ListingKey> = key_page
                    .keys
                    .into_iter()
                    .filter(|key| !cache.contains_key(key.as_str()))
                    .collect();
                info!(page, new_keys = fresh.len(), "Processing search page");

                let outcomes = fetch::process_all(
                    fresh,
                    Arc::clone(&api),
                    Arc::clone(&store),
                    Arc::clone(&cache),
                    policy,
                    cancel,
                )
                .await;
                for outcome in outcomes.values() {
                    report.record(*outcome);
                }
            }
            Err(err) => {
                report.page_errors += 1;
                if total_pages.is_none() {
                    // No terminal condition exists until the server reports
                    // its page count, so the first page gets a bounded
                    // budget instead of the walk advancing past it.
                    first_page_attempts += 1;
                    if first_page_attempts > policy.max_retries {
                        return Err(HarvestError::PageCountUnknown { source: err });
                    }
                    warn!(error = %err, attempt = first_page_attempts, "First search page failed; retrying");
                    tokio::time::sleep(policy.retry_delay).await;
                    continue;
                }
                warn!(page, error = %err, "Search page failed; skipping to next page");
            }
        }

        match total_pages {
            Some(total) if page >= total.saturating_sub(1) => break,
            _ => page += 1,
        }
    }

    report.elapsed = started.elapsed();
    info!(
        stored = report.stored,
        duplicates = report.skipped_duplicate,
        not_found = report.skipped_not_found,
        invalid = report.skipped_invalid,
        failed = report.failed,
        pages = report.pages_seen,
        page_errors = report.page_errors,
        elapsed_ms = report.elapsed.as_millis() as u64,
        "Harvest run complete"
    );
    Ok(report)
}
