//! Index membership scraped from a public constituents table.
//!
//! The page is expected to carry a table with a "Symbol" column and a sector
//! column ("GICS Sector" or "Sector"); Wikipedia's S&P 500 list is the
//! reference layout. Symbols get the provider's class-share spelling
//! (`BRK.B` → `BRK-B`).

use scraper::{ElementRef, Html, Selector};
use std::time::Duration;
use thiserror::Error;

/// Default source for the scraped universe.
pub const SP500_URL: &str = "https://en.wikipedia.org/wiki/List_of_S%26P_500_companies";

#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("http: {0}")]
    Http(#[from] reqwest::Error),

    #[error("bad selector {0}")]
    Selector(String),

    #[error("no constituents table with a Symbol column found")]
    TableNotFound,

    #[error("constituents table has no rows")]
    NoRows,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Constituent {
    pub symbol: String,
    pub sector: String,
}

/// Download and parse the constituents page.
pub fn fetch_constituents(url: &str) -> Result<Vec<Constituent>, ScrapeError> {
    let client = reqwest::blocking::Client::builder()
        .timeout(Duration::from_secs(30))
        .user_agent("Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36")
        .build()?;
    let html = client.get(url).send()?.error_for_status()?.text()?;
    let members = parse_constituents(&html)?;
    tracing::info!(url, count = members.len(), "scraped index constituents");
    Ok(members)
}

/// Provider spelling for class shares.
pub fn normalize_symbol(raw: &str) -> String {
    raw.trim().replace('.', "-")
}

fn selector(css: &str) -> Result<Selector, ScrapeError> {
    Selector::parse(css).map_err(|e| ScrapeError::Selector(format!("{css:?}: {e}")))
}

fn cell_text(cell: ElementRef<'_>) -> String {
    cell.text().collect::<String>().trim().to_string()
}

/// Parse constituents out of an HTML document.
pub fn parse_constituents(html: &str) -> Result<Vec<Constituent>, ScrapeError> {
    let doc = Html::parse_document(html);
    let table_sel = selector("table#constituents, table.wikitable")?;
    let row_sel = selector("tr")?;
    let header_sel = selector("th")?;
    let cell_sel = selector("td")?;

    for table in doc.select(&table_sel) {
        let mut rows = table.select(&row_sel);
        let Some(header) = rows.next() else {
            continue;
        };
        let headers: Vec<String> = header.select(&header_sel).map(cell_text).collect();
        let Some(symbol_col) = headers.iter().position(|h| h.eq_ignore_ascii_case("symbol")) else {
            continue;
        };
        let sector_col = headers
            .iter()
            .position(|h| h.eq_ignore_ascii_case("gics sector"))
            .or_else(|| headers.iter().position(|h| h.eq_ignore_ascii_case("sector")));

        let members: Vec<Constituent> = rows
            .filter_map(|row| {
                let cells: Vec<String> = row.select(&cell_sel).map(cell_text).collect();
                let symbol = cells.get(symbol_col).filter(|s| !s.is_empty())?;
                let sector = sector_col
                    .and_then(|c| cells.get(c))
                    .filter(|s| !s.is_empty())
                    .cloned()
                    .unwrap_or_else(|| super::universe::UNCLASSIFIED.to_string());
                Some(Constituent {
                    symbol: normalize_symbol(symbol),
                    sector,
                })
            })
            .collect();

        if members.is_empty() {
            return Err(ScrapeError::NoRows);
        }
        return Ok(members);
    }

    Err(ScrapeError::TableNotFound)
}
