use anyhow::{Context, Result};
use dotenvy::dotenv;
use std::env;
use std::time::Duration;

use hh_client::SearchFilters;

use crate::pipeline::FetchPolicy;

/// Harvester configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct HarvestConfig {
    pub database_url: String,
    pub bearer_token: String,
    /// Listings per search page.
    pub per_page: u32,
    /// Fixed geographic/role scope for the search endpoint.
    pub filters: SearchFilters,
    pub concurrency: usize,
    pub max_retries: u32,
    pub retry_delay: Duration,
}

impl HarvestConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        // Load .env file if present (development)
        let _ = dotenv();

        Ok(Self {
            database_url: env::var("DATABASE_URL").context("DATABASE_URL must be set")?,
            bearer_token: env::var("HH_BEARER_TOKEN").context("HH_BEARER_TOKEN must be set")?,
            per_page: env::var("HARVEST_PER_PAGE")
                .unwrap_or_else(|_| "100".to_string())
                .parse()
                .context("HARVEST_PER_PAGE must be a valid number")?,
            filters: SearchFilters::default(),
            concurrency: env::var("HARVEST_CONCURRENCY")
                .unwrap_or_else(|_| "10".to_string())
                .parse()
                .context("HARVEST_CONCURRENCY must be a valid number")?,
            max_retries: 3,
            retry_delay: Duration::from_secs(10),
        })
    }

    /// Pool width and retry budget for the fetch engine.
    pub fn fetch_policy(&self) -> FetchPolicy {
        FetchPolicy {
            concurrency: self.concurrency,
            max_retries: self.max_retries,
            retry_delay: self.retry_delay,
        }
    }
}
