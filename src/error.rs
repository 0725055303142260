//! Error handling for marketpages
//!
//! Structural scrape failures get their own variants so callers and tests
//! can tell a page-format change apart from a transport problem. Everything
//! else travels as `anyhow::Error` with context attached.

use thiserror::Error;

/// Failures caused by a page no longer looking the way the parsers expect
#[derive(Error, Debug)]
pub enum ScrapeError {
    #[error("marker not found: {0}")]
    MissingMarker(String),

    #[error("expected {expected} rows, found {found}")]
    RowCount { expected: usize, found: usize },

    #[error("line {line}: expected {expected} columns, found {found}")]
    ColumnCount {
        line: usize,
        expected: usize,
        found: usize,
    },

    #[error("line {line}: invalid {column} value {value:?}")]
    InvalidField {
        line: usize,
        column: String,
        value: String,
    },

    #[error("io error")]
    Io(#[from] std::io::Error),
}

/// Result type alias used across the crate
pub type Result<T> = anyhow::Result<T>;
