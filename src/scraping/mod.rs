//! Table scraping from loosely formatted pages
//!
//! Regions are located by literal markers, then parsed per page format.

pub mod muni;
pub mod volatility;

pub use muni::{parse_muni, MuniRecord, MuniTable, Rating};
pub use volatility::{parse_volatility, VolatilityRecord};

/// Text strictly between the first `anchor` and the next `end_marker`.
///
/// Both markers are literal and case-sensitive. An empty `end_marker`
/// captures through the end of `text`. `None` means the anchor (or an end
/// marker after it) is not on the page.
pub fn extract_anchored<'a>(text: &'a str, anchor: &str, end_marker: &str) -> Option<&'a str> {
    let start = text.find(anchor)? + anchor.len();
    let rest = &text[start..];
    if end_marker.is_empty() {
        return Some(rest);
    }
    rest.find(end_marker).map(|end| &rest[..end])
}
