//! Mock implementations for exercising the pipeline without a network.
//!
//! [`MockListingApi`] scripts search pages and detail responses and tracks
//! per-key attempt counts plus the in-flight high-water mark, so tests can
//! assert the retry budget and the concurrency bound.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::RwLock;
use std::time::Duration;

use async_trait::async_trait;

use crate::error::SearchError;
use crate::traits::{DetailFetch, KeyPage, ListingApi};
use crate::types::ListingKey;

/// Scripted behavior for one search page index.
pub enum ScriptedPage {
    /// Return these listing keys.
    Keys(Vec<String>),
    /// Fail with an HTTP 500 status error on every call.
    Error,
    /// Fail the first `n` calls for this page, then return the keys.
    FlakyThenKeys(u32, Vec<String>),
}

/// Scripted behavior for one listing key's detail endpoint.
#[derive(Clone)]
pub enum ScriptedDetail {
    /// Respond with a payload carrying this description.
    Description(String),
    /// Respond with an arbitrary JSON payload.
    Payload(serde_json::Value),
    /// 404 on every call.
    NotFound,
    /// Fail retryably the first `n` calls, then succeed with the
    /// description.
    FlakyThenDescription(u32, String),
    /// Fail retryably on every call.
    AlwaysRetryable,
}

/// A mock listing API with scripted pages and details.
pub struct MockListingApi {
    pages: Vec<ScriptedPage>,
    details: RwLock<HashMap<String, ScriptedDetail>>,
    detail_delay: Option<Duration>,

    search_calls: RwLock<Vec<u32>>,
    page_attempts: RwLock<HashMap<u32, u32>>,
    detail_attempts: RwLock<HashMap<String, u32>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl Default for MockListingApi {
    fn default() -> Self {
        Self::new()
    }
}

impl MockListingApi {
    /// Create a mock with no pages and no scripted details.
    pub fn new() -> Self {
        Self {
            pages: Vec::new(),
            details: RwLock::new(HashMap::new()),
            detail_delay: None,
            search_calls: RwLock::new(Vec::new()),
            page_attempts: RwLock::new(HashMap::new()),
            detail_attempts: RwLock::new(HashMap::new()),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
        }
    }

    /// Append a page returning these keys.
    pub fn with_page(mut self, keys: &[&str]) -> Self {
        self.pages
            .push(ScriptedPage::Keys(keys.iter().map(|k| k.to_string()).collect()));
        self
    }

    /// Append a page that always fails.
    pub fn with_failing_page(mut self) -> Self {
        self.pages.push(ScriptedPage::Error);
        self
    }

    /// Append a page that fails `n` times before returning the keys.
    pub fn with_flaky_page(mut self, failures: u32, keys: &[&str]) -> Self {
        self.pages.push(ScriptedPage::FlakyThenKeys(
            failures,
            keys.iter().map(|k| k.to_string()).collect(),
        ));
        self
    }

    /// Script the detail response for a key.
    pub fn with_detail(self, key: &str, detail: ScriptedDetail) -> Self {
        self.details
            .write()
            .unwrap()
            .insert(key.to_string(), detail);
        self
    }

    /// Hold each detail call open for this long, so tests can observe
    /// overlapping fetches.
    pub fn with_detail_delay(mut self, delay: Duration) -> Self {
        self.detail_delay = Some(delay);
        self
    }

    /// Page indices in the order they were searched.
    pub fn search_calls(&self) -> Vec<u32> {
        self.search_calls.read().unwrap().clone()
    }

    /// Detail attempts made for a key.
    pub fn detail_attempts(&self, key: &str) -> u32 {
        self.detail_attempts
            .read()
            .unwrap()
            .get(key)
            .copied()
            .unwrap_or(0)
    }

    /// Highest number of detail calls that were ever in flight at once.
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    fn payload_for(key: &str, description: &str) -> serde_json::Value {
        serde_json::json!({
            "id": key,
            "name": format!("Vacancy {key}"),
            "description": description,
        })
    }
}

#[async_trait]
impl ListingApi for MockListingApi {
    async fn search_page(
        &self,
        _date_from: &str,
        _date_to: &str,
        page: u32,
    ) -> Result<KeyPage, SearchError> {
        self.search_calls.write().unwrap().push(page);
        let total_pages = self.pages.len().max(1) as u32;

        let keys = match self.pages.get(page as usize) {
            None => Vec::new(),
            Some(ScriptedPage::Keys(keys)) => keys.clone(),
            Some(ScriptedPage::Error) => return Err(SearchError::Status { status: 500 }),
            Some(ScriptedPage::FlakyThenKeys(failures, keys)) => {
                let mut attempts = self.page_attempts.write().unwrap();
                let count = attempts.entry(page).or_insert(0);
                *count += 1;
                if *count <= *failures {
                    return Err(SearchError::Transport(
                        "scripted transport failure".to_string(),
                    ));
                }
                keys.clone()
            }
        };

        Ok(KeyPage {
            keys: keys.into_iter().map(ListingKey).collect(),
            total_pages,
        })
    }

    async fn fetch_detail(&self, key: &ListingKey) -> DetailFetch {
        let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(current, Ordering::SeqCst);

        if let Some(delay) = self.detail_delay {
            tokio::time::sleep(delay).await;
        }

        let attempt = {
            let mut attempts = self.detail_attempts.write().unwrap();
            let count = attempts.entry(key.0.clone()).or_insert(0);
            *count += 1;
            *count
        };

        let script = self.details.read().unwrap().get(key.as_str()).cloned();
        let result = match script {
            None => DetailFetch::NotFound,
            Some(ScriptedDetail::Description(text)) => {
                DetailFetch::Payload(Self::payload_for(key.as_str(), &text))
            }
            Some(ScriptedDetail::Payload(value)) => DetailFetch::Payload(value),
            Some(ScriptedDetail::NotFound) => DetailFetch::NotFound,
            Some(ScriptedDetail::FlakyThenDescription(failures, text)) => {
                if attempt <= failures {
                    DetailFetch::Retryable("scripted transient failure".to_string())
                } else {
                    DetailFetch::Payload(Self::payload_for(key.as_str(), &text))
                }
            }
            Some(ScriptedDetail::AlwaysRetryable) => {
                DetailFetch::Retryable("scripted transient failure".to_string())
            }
        };

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        result
    }
}
