//! The ingestion pipeline: sequential page walk, parallel per-key fetch.

pub mod fetch;
pub mod pages;

pub use fetch::{process_all, FetchPolicy};
pub use pages::run_harvest;
