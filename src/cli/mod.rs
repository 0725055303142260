//! Terminal entry point: load config, run both pages, render what was found

pub mod formatters;

use anyhow::Result;
use tracing::info;

use crate::config::Config;
use crate::pages;

pub fn run() -> Result<()> {
    let config = Config::load()?;
    info!(
        "Cache dir: {:?}, max age {}s",
        config.cache_dir, config.cache_max_age_secs
    );

    let snapshot = pages::collect(&config)?;

    match &snapshot.volatility {
        Some(records) => print!("{}", formatters::format_volatility_table(records)),
        None => print!(
            "{}",
            formatters::format_missing_table("volatility", &config.volatility_url)
        ),
    }
    match &snapshot.muni {
        Some(muni) => print!("{}", formatters::format_muni_table(muni)),
        None => print!(
            "{}",
            formatters::format_missing_table("muni yield", &config.muni_url)
        ),
    }

    println!("done!");
    Ok(())
}
