//! [`ListingApi`] implementation backed by the hh.ru client.

use async_trait::async_trait;
use hh_client::{HhClient, HhError, SearchFilters};

use crate::error::SearchError;
use crate::traits::{DetailFetch, KeyPage, ListingApi};
use crate::types::ListingKey;

/// Adapter carrying the fixed search scope alongside the REST client.
pub struct HhListingApi {
    client: HhClient,
    filters: SearchFilters,
    per_page: u32,
}

impl HhListingApi {
    pub fn new(client: HhClient, filters: SearchFilters, per_page: u32) -> Self {
        Self {
            client,
            filters,
            per_page,
        }
    }
}

#[async_trait]
impl ListingApi for HhListingApi {
    async fn search_page(
        &self,
        date_from: &str,
        date_to: &str,
        page: u32,
    ) -> Result<KeyPage, SearchError> {
        let resp = self
            .client
            .search_page(date_from, date_to, &self.filters, page, self.per_page)
            .await
            .map_err(search_error)?;

        Ok(KeyPage {
            keys: resp.items.into_iter().map(|item| ListingKey(item.id)).collect(),
            total_pages: resp.pages,
        })
    }

    async fn fetch_detail(&self, key: &ListingKey) -> DetailFetch {
        classify_detail(self.client.fetch_detail(key.as_str()).await)
    }
}

fn search_error(err: HhError) -> SearchError {
    match err {
        HhError::Transport(e) => SearchError::Transport(e.to_string()),
        HhError::Parse(e) => SearchError::Parse(e.to_string()),
        HhError::Status { status } => SearchError::Status { status },
        HhError::NotFound => SearchError::Status { status: 404 },
        HhError::RateLimited { status } => SearchError::Status { status },
    }
}

/// Map a detail-fetch result into the retry engine's vocabulary.
fn classify_detail(result: hh_client::Result<serde_json::Value>) -> DetailFetch {
    match result {
        Ok(payload) => DetailFetch::Payload(payload),
        Err(HhError::NotFound) => DetailFetch::NotFound,
        Err(HhError::Parse(e)) => DetailFetch::Invalid(e.to_string()),
        Err(err @ HhError::RateLimited { .. }) => DetailFetch::Retryable(err.to_string()),
        Err(err @ HhError::Transport(_)) => DetailFetch::Retryable(err.to_string()),
        Err(err @ HhError::Status { .. }) => DetailFetch::Retryable(err.to_string()),
    }
}
