//! Output formatting module for CLI display
//!
//! Turns parsed tables into terminal text, keeping presentation out of the
//! scraping code.

use colored::Colorize;
use tabled::{
    settings::{object::Columns, Alignment, Style},
    Table, Tabled,
};

use crate::scraping::{MuniTable, VolatilityRecord};

/// Format the volatility listing as a terminal table
pub fn format_volatility_table(records: &[VolatilityRecord]) -> String {
    #[derive(Tabled)]
    struct VolatilityRow {
        #[tabled(rename = "Symbol")]
        symbol: String,
        #[tabled(rename = "HV20")]
        hv20: String,
        #[tabled(rename = "HV50")]
        hv50: String,
        #[tabled(rename = "HV100")]
        hv100: String,
        #[tabled(rename = "Date")]
        date: String,
        #[tabled(rename = "Cur IV")]
        curiv: String,
        #[tabled(rename = "Days")]
        days: String,
        #[tabled(rename = "Pctile")]
        percentile: String,
        #[tabled(rename = "Close")]
        close: String,
    }

    let rows: Vec<VolatilityRow> = records
        .iter()
        .map(|r| VolatilityRow {
            symbol: r.symbol.clone(),
            hv20: r.hv20.to_string(),
            hv50: r.hv50.to_string(),
            hv100: r.hv100.to_string(),
            date: r.date.format("%Y-%m-%d").to_string(),
            curiv: format!("{:.2}", r.curiv),
            days: r.days.to_string(),
            percentile: r.percentile.to_string(),
            close: format!("{:.2}", r.close),
        })
        .collect();

    let mut output = format!(
        "\n{} Volatility ({} symbols)\n\n",
        "📈".cyan().bold(),
        records.len()
    );
    let mut table = Table::new(&rows);
    table.with(Style::rounded());
    // Everything but Symbol is numeric
    table.modify(Columns::new(1..), Alignment::right());
    output.push_str(&table.to_string());
    output.push('\n');
    output
}

/// Format the muni yield curves as a terminal table
pub fn format_muni_table(muni: &MuniTable) -> String {
    #[derive(Tabled)]
    struct MuniRow {
        #[tabled(rename = "Rating")]
        rating: String,
        #[tabled(rename = "Term")]
        term: String,
        #[tabled(rename = "Yield")]
        yield_rate: String,
        #[tabled(rename = "Last")]
        yield_last: String,
    }

    let rows: Vec<MuniRow> = muni
        .rows
        .iter()
        .map(|r| MuniRow {
            rating: r.rating.to_string(),
            term: format!("{}y", r.term),
            yield_rate: format!("{:.2}%", r.yield_rate),
            yield_last: format!("{:.2}%", r.yield_last),
        })
        .collect();

    let mut output = format!(
        "\n{} Municipal bond yields as of {}\n\n",
        "🏛".cyan().bold(),
        muni.as_of.format("%Y-%m-%d")
    );
    let mut table = Table::new(&rows);
    table.with(Style::rounded());
    table.modify(Columns::new(1..), Alignment::right());
    output.push_str(&table.to_string());
    output.push('\n');
    output
}

/// Message shown when a page had no table to parse
pub fn format_missing_table(name: &str, url: &str) -> String {
    format!(
        "{} No {} table found at {}\n",
        "ℹ".blue().bold(),
        name,
        url
    )
}
