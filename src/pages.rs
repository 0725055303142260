//! Fetch-then-parse runs for both pages

use anyhow::Context;
use tracing::{info, warn};

use crate::config::Config;
use crate::error::Result;
use crate::fetch::Fetcher;
use crate::scraping::{parse_muni, parse_volatility, MuniTable, VolatilityRecord};

pub const VOLATILITY_CACHE_FILE: &str = "vol.txt";
pub const MUNI_CACHE_FILE: &str = "muni.txt";

/// Tables from one run. `None` means the page had no table region.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub volatility: Option<Vec<VolatilityRecord>>,
    pub muni: Option<MuniTable>,
}

/// Fetch and parse the volatility page, then the muni page.
pub fn collect(config: &Config) -> Result<Snapshot> {
    let fetcher = Fetcher::new();
    collect_with(&fetcher, config)
}

pub fn collect_with(fetcher: &Fetcher, config: &Config) -> Result<Snapshot> {
    let volatility = fetch_volatility(fetcher, config)?;
    let muni = fetch_muni(fetcher, config)?;
    Ok(Snapshot { volatility, muni })
}

pub fn fetch_volatility(fetcher: &Fetcher, config: &Config) -> Result<Option<Vec<VolatilityRecord>>> {
    let cache_path = config.cache_path(VOLATILITY_CACHE_FILE);
    let text = fetcher
        .fetch(
            &config.volatility_url,
            cache_path.as_deref(),
            config.cache_max_age_secs,
        )
        .context("Failed to fetch volatility page")?;
    let records = parse_volatility(&text)?;
    match &records {
        Some(rows) => info!("Volatility table: {} rows", rows.len()),
        None => warn!(
            "No volatility table found at {}; page layout may have changed",
            config.volatility_url
        ),
    }
    Ok(records)
}

pub fn fetch_muni(fetcher: &Fetcher, config: &Config) -> Result<Option<MuniTable>> {
    let cache_path = config.cache_path(MUNI_CACHE_FILE);
    let text = fetcher
        .fetch(&config.muni_url, cache_path.as_deref(), config.cache_max_age_secs)
        .context("Failed to fetch muni yields page")?;
    let table = parse_muni(&text)?;
    match &table {
        Some(table) => info!("Muni yields as of {}: {} rows", table.as_of, table.rows.len()),
        None => warn!(
            "No muni yield table found at {}; page layout may have changed",
            config.muni_url
        ),
    }
    Ok(table)
}
