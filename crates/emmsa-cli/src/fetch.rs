//! The `fetch` command: scrape one day's prices, optionally store them in
//! that day's basket, and write the batch as JSON.

use std::path::{Path, PathBuf};

use chrono::{NaiveDate, Utc};
use clap::Args;
use emmsa_core::{load_scraper_config, load_store_config, PriceBatch};
use emmsa_pantry::{basket_name, PantryClient};
use emmsa_scraper::EmmsaClient;

#[derive(Debug, Args)]
pub struct FetchArgs {
    /// Trading date to fetch, as YYYY-MM-DD (defaults to today in UTC)
    #[arg(long)]
    pub date: Option<NaiveDate>,
    /// Write JSON to this file instead of stdout
    #[arg(long, short)]
    pub output: Option<PathBuf>,
    /// Also store the batch in the Pantry basket for the date
    #[arg(long)]
    pub pantry: bool,
}

/// Runs the fetch pipeline.
///
/// The output is always the full [`PriceBatch`] (`date`, `prices`,
/// `fetched`), the same document that is stored in the basket.
///
/// # Errors
///
/// Returns an error if configuration is missing or invalid, the price fetch
/// fails, the basket upload fails, or the output cannot be written.
pub(crate) async fn run_fetch(args: &FetchArgs) -> anyhow::Result<()> {
    let date = args.date.unwrap_or_else(|| Utc::now().date_naive());

    // Load store config up front so a missing key fails before any request.
    let store = if args.pantry {
        let config = load_store_config()?;
        let client = PantryClient::from_config(&config)
            .map_err(|e| anyhow::anyhow!("failed to build Pantry client: {e}"))?;
        Some(client)
    } else {
        None
    };

    let scraper = EmmsaClient::from_config(&load_scraper_config()?)
        .map_err(|e| anyhow::anyhow!("failed to build EMMSA client: {e}"))?;

    let prices = scraper
        .fetch_prices(date)
        .await
        .map_err(|e| anyhow::anyhow!("failed to fetch prices for {date}: {e}"))?;

    let batch = PriceBatch::new(date, prices, Utc::now());
    if batch.is_empty() {
        tracing::warn!(%date, "no prices published for date");
    }

    if let Some(store) = &store {
        store_batch(store, &batch).await?;
    }

    let json = serde_json::to_string_pretty(&batch)?;
    write_output(args.output.as_deref(), &json)
}

/// Upserts `batch` into the basket named after its date, creating the basket
/// first when it does not exist. Returns the basket name.
///
/// # Errors
///
/// Returns an error if the existence check, creation, or update fails.
pub(crate) async fn store_batch(store: &PantryClient, batch: &PriceBatch) -> anyhow::Result<String> {
    let name = basket_name(&batch.date);

    let exists = store
        .exists(&name)
        .await
        .map_err(|e| anyhow::anyhow!("failed to check basket {name}: {e}"))?;

    if !exists {
        store.create(&name).await?;
        tracing::info!(basket = %name, "created basket");
    }

    store.update(&name, batch).await?;
    tracing::info!(basket = %name, records = batch.prices.len(), "stored price batch");

    Ok(name)
}

fn write_output(path: Option<&Path>, json: &str) -> anyhow::Result<()> {
    match path {
        Some(path) => {
            std::fs::write(path, format!("{json}\n"))
                .map_err(|e| anyhow::anyhow!("failed to write {}: {e}", path.display()))?;
            println!("saved prices to {}", path.display());
        }
        None => println!("{json}"),
    }
    Ok(())
}
