//! Pure hh.ru vacancies REST API client.
//!
//! A minimal client for the hh.ru job-search API. Supports paged vacancy
//! searches over a publication date range and single-vacancy detail lookups.
//!
//! # Example
//!
//! ```rust,ignore
//! use hh_client::{HhClient, SearchFilters};
//!
//! let client = HhClient::new("your-oauth-token".into());
//!
//! let page = client
//!     .search_page("2026-08-01", "2026-08-07", &SearchFilters::default(), 0, 100)
//!     .await?;
//! for item in &page.items {
//!     println!("{}", item.id);
//! }
//! ```

pub mod error;
pub mod types;

pub use error::{HhError, Result};
pub use types::{SearchFilters, SearchItem, SearchResponse};

const BASE_URL: &str = "https://api.hh.ru";

pub struct HhClient {
    client: reqwest::Client,
    token: String,
}

impl HhClient {
    pub fn new(token: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            token,
        }
    }

    /// Fetch one page of the vacancy search for a publication date range.
    ///
    /// Returns the parsed page including the server-reported total page
    /// count. Does not retry; callers own the retry policy.
    pub async fn search_page(
        &self,
        date_from: &str,
        date_to: &str,
        filters: &SearchFilters,
        page: u32,
        per_page: u32,
    ) -> Result<SearchResponse> {
        let url = format!("{}/vacancies", BASE_URL);
        let per_page_param = per_page.to_string();
        let page_param = page.to_string();
        let query = [
            ("area", filters.area.as_str()),
            ("professional_role", filters.professional_role.as_str()),
            ("date_from", date_from),
            ("date_to", date_to),
            ("per_page", per_page_param.as_str()),
            ("page", page_param.as_str()),
        ];

        let resp = self
            .client
            .get(&url)
            .bearer_auth(&self.token)
            .query(&query)
            .send()
            .await
            .map_err(HhError::Transport)?;

        let status = resp.status();
        if !status.is_success() {
            return Err(HhError::Status {
                status: status.as_u16(),
            });
        }

        let body = resp.text().await.map_err(HhError::Transport)?;
        let parsed: SearchResponse = serde_json::from_str(&body).map_err(HhError::Parse)?;
        tracing::debug!(
            page = parsed.page,
            pages = parsed.pages,
            items = parsed.items.len(),
            "Fetched search page"
        );
        Ok(parsed)
    }

    /// Fetch the full record for a single vacancy.
    ///
    /// The payload is returned as raw JSON - the API's field set is not
    /// contractually stable, so no schema is imposed here. Status codes are
    /// classified for the caller's retry policy: 404 is terminal
    /// ([`HhError::NotFound`]), 403 and 429 are throttling
    /// ([`HhError::RateLimited`]), any other non-200 is transient.
    pub async fn fetch_detail(&self, id: &str) -> Result<serde_json::Value> {
        let url = format!("{}/vacancies/{}", BASE_URL, id);
        let resp = self
            .client
            .get(&url)
            .bearer_auth(&self.token)
            .send()
            .await
            .map_err(HhError::Transport)?;

        match resp.status().as_u16() {
            200 => {
                let body = resp.text().await.map_err(HhError::Transport)?;
                serde_json::from_str(&body).map_err(HhError::Parse)
            }
            404 => Err(HhError::NotFound),
            status @ (403 | 429) => Err(HhError::RateLimited { status }),
            status => Err(HhError::Status { status }),
        }
    }
}
