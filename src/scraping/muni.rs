//! Municipal bond yield parser
//!
//! The yields page lists national AAA, AA and A curves, three terms each,
//! as plain `<tr>` rows under the "AAA RATED MUNI BONDS" heading. Ratings
//! are not in the rows themselves and are assigned by position.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use regex::Regex;
use rust_decimal::Decimal;
use std::fmt;
use std::str::FromStr;
use tracing::debug;

use super::extract_anchored;
use crate::error::ScrapeError;

pub const ANCHOR: &str = ">AAA RATED MUNI BONDS</";
pub const END_MARKER: &str = "screen-reader-response";

const MODIFIED_TIME_PATTERN: &str = r#"property="article:modified_time" content="(.+?)T"#;
const ROW_PATTERN: &str =
    r"<tr><td>national</td><td>(\d{1,3}) year</td><td>([.0-9]+)</td><td>([.0-9]+)</td></tr>";

/// Tiers in page order, highest first.
pub const RATING_TIERS: [Rating; 3] = [Rating::AAA, Rating::AA, Rating::A];
pub const TERMS_PER_TIER: usize = 3;
pub const EXPECTED_ROWS: usize = RATING_TIERS.len() * TERMS_PER_TIER;

#[allow(clippy::upper_case_acronyms)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rating {
    AAA,
    AA,
    A,
}

impl Rating {
    pub fn as_str(&self) -> &'static str {
        match self {
            Rating::AAA => "AAA",
            Rating::AA => "AA",
            Rating::A => "A",
        }
    }
}

impl fmt::Display for Rating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MuniRecord {
    pub rating: Rating,
    /// Years to maturity
    pub term: u32,
    /// Current yield, in percent
    pub yield_rate: Decimal,
    /// Previous yield, in percent
    pub yield_last: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MuniTable {
    /// Date the page says it was last modified
    pub as_of: NaiveDate,
    pub rows: Vec<MuniRecord>,
}

/// Parse the national muni yield curves out of the page HTML.
///
/// The modified-time meta tag is required even when the table itself is
/// missing. `Ok(None)` means no table region; any row count other than nine
/// is an error.
pub fn parse_muni(text: &str) -> Result<Option<MuniTable>> {
    let as_of = parse_modified_date(text)?;

    let segment = match extract_anchored(text, ANCHOR, END_MARKER) {
        Some(segment) => segment,
        None => {
            debug!("No muni yield region on page modified {}", as_of);
            return Ok(None);
        }
    };

    let rows = parse_rows(segment).context("Failed to parse muni yield table")?;
    Ok(Some(MuniTable { as_of, rows }))
}

fn parse_modified_date(text: &str) -> Result<NaiveDate> {
    let re = Regex::new(MODIFIED_TIME_PATTERN).context("invalid regex")?;
    let raw = re
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
        .ok_or_else(|| ScrapeError::MissingMarker("article:modified_time".to_string()))?;
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|_| ScrapeError::InvalidField {
            line: 0,
            column: "article:modified_time".to_string(),
            value: raw.to_string(),
        })
        .context("Failed to parse muni page modified time")
}

fn parse_rows(segment: &str) -> Result<Vec<MuniRecord>> {
    let re = Regex::new(ROW_PATTERN).context("invalid regex")?;
    let matches: Vec<regex::Captures> = re.captures_iter(segment).collect();
    if matches.len() != EXPECTED_ROWS {
        return Err(ScrapeError::RowCount {
            expected: EXPECTED_ROWS,
            found: matches.len(),
        }
        .into());
    }

    let ratings = RATING_TIERS
        .iter()
        .flat_map(|tier| std::iter::repeat(*tier).take(TERMS_PER_TIER));

    matches
        .iter()
        .zip(ratings)
        .enumerate()
        .map(|(idx, (caps, rating))| -> Result<MuniRecord> {
            let row = idx + 1;
            Ok(MuniRecord {
                rating,
                term: capture(caps, 1, row, "term")?,
                yield_rate: capture(caps, 2, row, "yield")?,
                yield_last: capture(caps, 3, row, "yield_last")?,
            })
        })
        .collect()
}

fn capture<T: FromStr>(
    caps: &regex::Captures,
    group: usize,
    row: usize,
    column: &str,
) -> Result<T, ScrapeError> {
    let value = caps.get(group).map(|m| m.as_str()).unwrap_or_default();
    value.parse().map_err(|_| ScrapeError::InvalidField {
        line: row,
        column: column.to_string(),
        value: value.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn row(term: u32, yield_rate: &str, yield_last: &str) -> String {
        format!(
            "<tr><td>national</td><td>{} year</td><td>{}</td><td>{}</td></tr>",
            term, yield_rate, yield_last
        )
    }

    fn page(rows: &[String]) -> String {
        format!(
            r#"<meta property="article:modified_time" content="2024-05-03T14:22:01+00:00" />
<h3>AAA RATED MUNI BONDS</h3><table>{}</table>
<div class="screen-reader-response"></div>"#,
            rows.join("\n")
        )
    }

    fn nine_rows() -> Vec<String> {
        let mut rows = Vec::new();
        for base in [300, 320, 350] {
            for (i, term) in [2, 5, 10].iter().enumerate() {
                let y = Decimal::new(base + 10 * i as i64, 2);
                rows.push(row(*term, &y.to_string(), &(y - dec!(0.03)).to_string()));
            }
        }
        rows
    }

    #[test]
    fn nine_rows_get_positional_ratings() {
        let table = parse_muni(&page(&nine_rows())).unwrap().unwrap();
        let ratings: Vec<&str> = table.rows.iter().map(|r| r.rating.as_str()).collect();
        assert_eq!(
            ratings,
            vec!["AAA", "AAA", "AAA", "AA", "AA", "AA", "A", "A", "A"]
        );
        let terms: Vec<u32> = table.rows.iter().map(|r| r.term).collect();
        assert_eq!(terms, vec![2, 5, 10, 2, 5, 10, 2, 5, 10]);
        assert_eq!(table.rows[0].yield_rate, dec!(3.00));
        assert_eq!(table.rows[0].yield_last, dec!(2.97));
        assert_eq!(table.rows[8].yield_rate, dec!(3.70));
        assert_eq!(table.as_of, NaiveDate::from_ymd_opt(2024, 5, 3).unwrap());
    }

    #[test]
    fn eight_rows_is_a_structural_error() {
        let mut rows = nine_rows();
        rows.pop();
        let err = parse_muni(&page(&rows)).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ScrapeError>(),
            Some(ScrapeError::RowCount {
                expected: 9,
                found: 8
            })
        ));
    }

    #[test]
    fn ten_rows_is_a_structural_error() {
        let mut rows = nine_rows();
        rows.push(row(30, "4.10", "4.05"));
        let err = parse_muni(&page(&rows)).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ScrapeError>(),
            Some(ScrapeError::RowCount { found: 10, .. })
        ));
    }

    #[test]
    fn state_rows_are_not_counted() {
        let mut rows = nine_rows();
        rows.insert(
            3,
            "<tr><td>california</td><td>5 year</td><td>2.90</td><td>2.88</td></tr>".to_string(),
        );
        let table = parse_muni(&page(&rows)).unwrap().unwrap();
        assert_eq!(table.rows.len(), EXPECTED_ROWS);
        assert_eq!(table.rows[3].rating, Rating::AA);
        assert_eq!(table.rows[3].term, 2);
    }

    #[test]
    fn rows_outside_the_region_are_ignored() {
        let html = format!(
            "{}\n{}",
            page(&nine_rows()),
            row(30, "4.10", "4.05")
        );
        assert_eq!(parse_muni(&html).unwrap().unwrap().rows.len(), 9);
    }

    #[test]
    fn missing_heading_is_absent() {
        let html = page(&nine_rows()).replace("AAA RATED MUNI BONDS", "MUNI YIELDS");
        assert!(parse_muni(&html).unwrap().is_none());
    }

    #[test]
    fn missing_modified_time_is_an_error_even_without_table() {
        let err = parse_muni("<html><body>nothing</body></html>").unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ScrapeError>(),
            Some(ScrapeError::MissingMarker(m)) if m == "article:modified_time"
        ));
    }

    #[test]
    fn malformed_yield_names_the_row() {
        let mut rows = nine_rows();
        rows[4] = row(5, "3..2", "3.20");
        let err = parse_muni(&page(&rows)).unwrap_err();
        match err.downcast_ref::<ScrapeError>() {
            Some(ScrapeError::InvalidField { line, column, value }) => {
                assert_eq!(*line, 5);
                assert_eq!(column, "yield");
                assert_eq!(value, "3..2");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
