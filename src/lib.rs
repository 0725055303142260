//! Marketpages - volatility and municipal bond yield page scraper
//!
//! Fetches two public market data pages through a small file cache and
//! parses the tables embedded in them into typed records.

pub mod cli;
pub mod config;
pub mod error;
pub mod fetch;
pub mod pages;
pub mod scraping;
