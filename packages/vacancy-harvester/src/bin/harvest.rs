//! Date-ranged vacancy harvest job.
//!
//! Walks the search pages for `--from..--to`, fetches and stores every new
//! vacancy, and prints the stored count. Per-key and per-page failures are
//! logged and counted, never fatal; only missing configuration, an
//! unreachable database, or a dead first page abort the run.

use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::Parser;
use hh_client::HhClient;
use sqlx::PgPool;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use vacancy_harvester::{run_harvest, HarvestConfig, HhListingApi, PostgresStore};

/// Harvest vacancies published inside a date range.
#[derive(Parser, Debug)]
#[command(name = "harvest")]
struct Args {
    /// Start date (YYYY-MM-DD, inclusive)
    #[arg(long)]
    from: NaiveDate,

    /// End date (YYYY-MM-DD, inclusive)
    #[arg(long)]
    to: NaiveDate,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,vacancy_harvester=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_target(true))
        .init();

    let args = Args::parse();
    let config = HarvestConfig::from_env()?;

    let pool = PgPool::connect(&config.database_url)
        .await
        .context("Failed to connect to database")?;

    let store = Arc::new(PostgresStore::new(pool));
    store
        .ensure_schema()
        .await
        .context("Failed to prepare vacancies table")?;

    let client = HhClient::new(config.bearer_token.clone());
    let api = Arc::new(HhListingApi::new(
        client,
        config.filters.clone(),
        config.per_page,
    ));

    // Ctrl-C stops new work; in-flight fetches drain before the report.
    let cancel = CancellationToken::new();
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::warn!("Interrupt received; finishing in-flight work");
                cancel.cancel();
            }
        });
    }

    let report = run_harvest(
        args.from,
        args.to,
        api,
        store,
        &config.fetch_policy(),
        &cancel,
    )
    .await
    .context("Harvest run aborted")?;

    println!(
        "Stored {} new vacancies in {:.1?}",
        report.stored, report.elapsed
    );
    Ok(())
}
