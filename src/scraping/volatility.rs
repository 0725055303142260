//! Volatility listing parser
//!
//! The page carries a fixed-width text table inside a `<pre>` block. Rows
//! run alphabetically from the `$BKX` index to `ZYXI`; the end marker
//! swallows the `ZYXI` row itself, so that ticker never shows up.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::str::FromStr;
use tracing::debug;

use super::extract_anchored;
use crate::error::ScrapeError;

pub const ANCHOR: &str = "$BKX";
pub const END_MARKER: &str = "ZYXI";

pub const COLUMNS: [&str; 9] = [
    "symbol",
    "hv20",
    "hv50",
    "hv100",
    "date",
    "curiv",
    "days",
    "percentile",
    "close",
];

/// Row the page prints for tickers without current IV data; it has no date.
pub const ZERO_ROW: &str = "0.00     0/  0%ile";
pub const PLACEHOLDER_DATE: &str = "010101";

/// Literal rewrites applied in order before splitting on whitespace.
pub const REWRITES: [(&str, &str); 4] = [
    ("/100%ile", "/ 100%ile"),
    ("%ile", "%ile "),
    ("SERIAL OPTION", "0 0 0"),
    (ZERO_ROW, "010101 0.00     0/  0%ile"),
];

const COMMENT_CHAR: char = '*';
const PERCENTILE_SUFFIX_CHARS: usize = 4;
const DATE_FORMAT: &str = "%y%m%d";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VolatilityRecord {
    pub symbol: String,
    pub hv20: Decimal,
    pub hv50: Decimal,
    pub hv100: Decimal,
    pub date: NaiveDate,
    pub curiv: Decimal,
    pub days: i64,
    pub percentile: i64,
    pub close: Decimal,
}

/// Parse the volatility table out of a fetched page.
///
/// Returns `Ok(None)` when the page has no `$BKX`..`ZYXI` region. A row that
/// does not fit the nine-column layout fails the whole call.
pub fn parse_volatility(text: &str) -> Result<Option<Vec<VolatilityRecord>>> {
    let segment = match extract_anchored(text, ANCHOR, END_MARKER) {
        Some(segment) => segment,
        None => {
            debug!("No {}..{} region on volatility page", ANCHOR, END_MARKER);
            return Ok(None);
        }
    };

    let table = normalize(&rebuild_table(segment));
    let records = parse_table(&table).context("Failed to parse volatility table")?;
    debug!("Parsed {} volatility rows", records.len());
    Ok(Some(records))
}

/// Header line, then the anchor symbol the extraction cut off, then the rows.
fn rebuild_table(segment: &str) -> String {
    format!("{}\n{}{}", COLUMNS.join(" "), ANCHOR, segment)
}

pub fn normalize(table: &str) -> String {
    REWRITES
        .iter()
        .fold(table.to_string(), |acc, (from, to)| acc.replace(from, to))
}

fn strip_comment(line: &str) -> &str {
    match line.find(COMMENT_CHAR) {
        Some(idx) => &line[..idx],
        None => line,
    }
}

pub fn parse_table(table: &str) -> Result<Vec<VolatilityRecord>, ScrapeError> {
    let mut lines = table
        .lines()
        .enumerate()
        .map(|(idx, line)| (idx + 1, strip_comment(line)))
        .filter(|(_, line)| !line.trim().is_empty());

    let (header_line, header) = lines
        .next()
        .ok_or_else(|| ScrapeError::MissingMarker("volatility header".to_string()))?;
    let header: Vec<&str> = header.split_whitespace().collect();
    if header != COLUMNS {
        return Err(ScrapeError::ColumnCount {
            line: header_line,
            expected: COLUMNS.len(),
            found: header.len(),
        });
    }

    let mut records = Vec::new();
    for (line, text) in lines {
        let fields: Vec<&str> = text.split_whitespace().collect();
        if fields.len() != COLUMNS.len() {
            return Err(ScrapeError::ColumnCount {
                line,
                expected: COLUMNS.len(),
                found: fields.len(),
            });
        }
        records.push(parse_row(line, &fields)?);
    }
    Ok(records)
}

fn parse_row(line: usize, fields: &[&str]) -> Result<VolatilityRecord, ScrapeError> {
    Ok(VolatilityRecord {
        symbol: fields[0].to_string(),
        hv20: parse_decimal(line, COLUMNS[1], fields[1])?,
        hv50: parse_decimal(line, COLUMNS[2], fields[2])?,
        hv100: parse_decimal(line, COLUMNS[3], fields[3])?,
        date: parse_date(line, fields[4])?,
        curiv: parse_decimal(line, COLUMNS[5], fields[5])?,
        days: parse_days(line, fields[6])?,
        percentile: parse_percentile(line, fields[7])?,
        close: parse_decimal(line, COLUMNS[8], fields[8])?,
    })
}

fn invalid(line: usize, column: &str, value: &str) -> ScrapeError {
    ScrapeError::InvalidField {
        line,
        column: column.to_string(),
        value: value.to_string(),
    }
}

fn parse_decimal(line: usize, column: &str, value: &str) -> Result<Decimal, ScrapeError> {
    Decimal::from_str(value).map_err(|_| invalid(line, column, value))
}

fn parse_date(line: usize, value: &str) -> Result<NaiveDate, ScrapeError> {
    if value.len() != 6 {
        return Err(invalid(line, "date", value));
    }
    NaiveDate::parse_from_str(value, DATE_FORMAT).map_err(|_| invalid(line, "date", value))
}

/// `142/` -> 142
fn parse_days(line: usize, value: &str) -> Result<i64, ScrapeError> {
    value
        .trim_matches('/')
        .parse()
        .map_err(|_| invalid(line, "days", value))
}

/// `88%ile` -> 88
fn parse_percentile(line: usize, value: &str) -> Result<i64, ScrapeError> {
    let cut = value
        .char_indices()
        .rev()
        .nth(PERCENTILE_SUFFIX_CHARS - 1)
        .map(|(idx, _)| idx)
        .ok_or_else(|| invalid(line, "percentile", value))?;
    value[..cut]
        .parse()
        .map_err(|_| invalid(line, "percentile", value))
}
