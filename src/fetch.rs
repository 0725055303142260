//! Page fetcher with a file-per-page cache
//!
//! A cache file is reused while its mtime is within the freshness window.
//! Every live fetch rewrites the cache file.

use anyhow::{Context, Result};
use reqwest::blocking::Client;
use std::fs;
use std::path::Path;
use std::time::{Duration, SystemTime};
use tracing::{debug, info};

use crate::error::ScrapeError;

pub struct Fetcher {
    client: Client,
}

impl Default for Fetcher {
    fn default() -> Self {
        Self::new()
    }
}

impl Fetcher {
    pub fn new() -> Self {
        Self {
            client: Client::new(),
        }
    }

    /// Return the page at `url`, served from `cache_path` when it is fresh.
    ///
    /// A `max_age_secs` of zero or less never reads the cache, but a given
    /// `cache_path` is still overwritten with the live body.
    pub fn fetch(&self, url: &str, cache_path: Option<&Path>, max_age_secs: i64) -> Result<String> {
        if let Some(path) = cache_path {
            if max_age_secs > 0 && path.exists() && !cache_is_stale(path, max_age_secs)? {
                debug!("Using cached copy of {} from {}", url, path.display());
                let text = fs::read_to_string(path)
                    .map_err(ScrapeError::from)
                    .with_context(|| format!("Failed to read cache file {}", path.display()))?;
                return Ok(text);
            }
        }

        let text = self.fetch_live(url)?;
        if let Some(path) = cache_path {
            write_cache(path, &text)?;
        }
        Ok(text)
    }

    fn fetch_live(&self, url: &str) -> Result<String> {
        info!("Fetching {}", url);
        let bytes = self
            .client
            .get(url)
            .send()
            .with_context(|| format!("Failed to request {}", url))?
            .error_for_status()
            .with_context(|| format!("{} returned an error status", url))?
            .bytes()
            .with_context(|| format!("Failed to read response body from {}", url))?;
        String::from_utf8(bytes.to_vec())
            .with_context(|| format!("Response from {} is not valid UTF-8", url))
    }
}

/// Fetch with a one-off default client.
pub fn fetch_text(url: &str, cache_path: Option<&Path>, max_age_secs: i64) -> Result<String> {
    Fetcher::new().fetch(url, cache_path, max_age_secs)
}

fn cache_is_stale(path: &Path, max_age_secs: i64) -> Result<bool> {
    let metadata = fs::metadata(path)
        .map_err(ScrapeError::from)
        .with_context(|| format!("Failed to read cache metadata {}", path.display()))?;
    let modified = metadata
        .modified()
        .map_err(ScrapeError::from)
        .with_context(|| format!("Failed to read cache mtime {}", path.display()))?;
    let age = SystemTime::now()
        .duration_since(modified)
        .unwrap_or(Duration::from_secs(0));
    let stale = age > Duration::from_secs(max_age_secs as u64);
    debug!(
        "Cache {} is {}s old (max {}s, stale={})",
        path.display(),
        age.as_secs(),
        max_age_secs,
        stale
    );
    Ok(stale)
}

fn write_cache(path: &Path, text: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .map_err(ScrapeError::from)
            .with_context(|| format!("Failed to create cache directory {}", parent.display()))?;
    }
    let mut tmp_name = path.as_os_str().to_os_string();
    tmp_name.push(".tmp");
    let tmp_path = Path::new(&tmp_name);
    fs::write(tmp_path, text)
        .map_err(ScrapeError::from)
        .with_context(|| format!("Failed to write cache file {}", tmp_path.display()))?;
    fs::rename(tmp_path, path)
        .map_err(ScrapeError::from)
        .with_context(|| format!("Failed to finalize cache file {}", path.display()))?;
    Ok(())
}
