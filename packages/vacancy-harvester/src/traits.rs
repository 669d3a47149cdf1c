//! Trait seam between the pipeline and the remote listing API.

use async_trait::async_trait;

use crate::error::SearchError;
use crate::types::ListingKey;

/// One page of search results: the listing keys plus the server-reported
/// total page count.
#[derive(Debug, Clone)]
pub struct KeyPage {
    pub keys: Vec<ListingKey>,
    pub total_pages: u32,
}

/// How a single detail fetch ended, in the vocabulary the retry engine
/// matches on exhaustively.
#[derive(Debug)]
pub enum DetailFetch {
    /// 200 with a JSON body.
    Payload(serde_json::Value),
    /// The listing is gone (404). Terminal.
    NotFound,
    /// Body was not valid JSON; retrying fetches the same bytes. Terminal.
    Invalid(String),
    /// Throttled or transiently failed; worth another attempt.
    Retryable(String),
}

/// Remote listing API as the pipeline sees it (trait to allow mocking).
#[async_trait]
pub trait ListingApi: Send + Sync {
    /// Fetch one page of listing keys for a publication date range.
    async fn search_page(
        &self,
        date_from: &str,
        date_to: &str,
        page: u32,
    ) -> Result<KeyPage, SearchError>;

    /// Fetch the raw detail payload for one listing.
    async fn fetch_detail(&self, key: &ListingKey) -> DetailFetch;
}
