//! Runtime configuration
//!
//! Built-in defaults, then an optional TOML file, then environment
//! variables. The cache directory is always passed explicitly to the
//! fetcher; nothing below reaches for a global path at fetch time.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

pub const VOLATILITY_URL: &str = "https://www.optionstrategist.com/calculators/free-volatility-data";
pub const MUNI_URL: &str = "https://www.fmsbonds.com/market-yields/";
pub const DEFAULT_CACHE_MAX_AGE_SECS: i64 = 20 * 3600;

const APP_DIR: &str = "marketpages";
const CONFIG_FILENAME: &str = "config.toml";

pub const ENV_CONFIG: &str = "MARKETPAGES_CONFIG";
pub const ENV_CACHE_DIR: &str = "MARKETPAGES_CACHE_DIR";
pub const ENV_CACHE_MAX_AGE: &str = "MARKETPAGES_CACHE_MAX_AGE";
pub const ENV_VOLATILITY_URL: &str = "MARKETPAGES_VOLATILITY_URL";
pub const ENV_MUNI_URL: &str = "MARKETPAGES_MUNI_URL";

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Directory holding one cache file per page. `None` disables caching.
    pub cache_dir: Option<PathBuf>,
    /// Freshness window in seconds; zero or negative always fetches live.
    pub cache_max_age_secs: i64,
    pub volatility_url: String,
    pub muni_url: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            cache_dir: default_cache_dir(),
            cache_max_age_secs: DEFAULT_CACHE_MAX_AGE_SECS,
            volatility_url: VOLATILITY_URL.to_string(),
            muni_url: MUNI_URL.to_string(),
        }
    }
}

impl Config {
    /// Load defaults, the config file (if any) and environment overrides.
    pub fn load() -> Result<Self> {
        let mut config = match config_file_path() {
            Some(path) if path.exists() => Self::from_file(&path)?,
            _ => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::from_toml_str(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)?;
        Ok(config)
    }

    /// Override fields from environment-style lookups.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(dir) = lookup(ENV_CACHE_DIR) {
            self.cache_dir = if dir.trim().is_empty() {
                None
            } else {
                Some(PathBuf::from(dir))
            };
        }
        if let Some(age) = lookup(ENV_CACHE_MAX_AGE) {
            self.cache_max_age_secs = age
                .trim()
                .parse()
                .with_context(|| format!("Invalid {}: {}", ENV_CACHE_MAX_AGE, age))?;
        }
        if let Some(url) = lookup(ENV_VOLATILITY_URL) {
            self.volatility_url = url;
        }
        if let Some(url) = lookup(ENV_MUNI_URL) {
            self.muni_url = url;
        }
        Ok(())
    }

    /// Cache file for a page, if caching is enabled.
    pub fn cache_path(&self, file_name: &str) -> Option<PathBuf> {
        self.cache_dir.as_ref().map(|dir| dir.join(file_name))
    }
}

fn default_cache_dir() -> Option<PathBuf> {
    std::env::var_os("XDG_CACHE_HOME")
        .map(PathBuf::from)
        .or_else(dir_spec::cache_home)
        .map(|dir| dir.join(APP_DIR))
}

fn config_file_path() -> Option<PathBuf> {
    if let Some(path) = std::env::var_os(ENV_CONFIG) {
        return Some(PathBuf::from(path));
    }
    std::env::var_os("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .or_else(dir_spec::config_home)
        .map(|dir| dir.join(APP_DIR).join(CONFIG_FILENAME))
}
