//! Universe configuration: sector-organized ticker lists.
//!
//! Three sources: the built-in premium list, a TOML file of
//! `sector = [tickers]`, or index membership scraped from a public page.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};
use thiserror::Error;

use super::index_scrape::{self, ScrapeError};

/// Sector label used for tickers the universe does not classify.
pub const UNCLASSIFIED: &str = "Unclassified";

#[derive(Debug, Error)]
pub enum UniverseError {
    #[error("read universe file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("parse universe TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("scrape index membership: {0}")]
    Scrape(#[from] ScrapeError),

    #[error("universe is empty")]
    Empty,
}

/// Where the ticker universe comes from.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum UniverseSource {
    /// Built-in liquid large caps plus index ETFs.
    #[default]
    Static,
    /// TOML file mapping sector names to ticker lists.
    File { path: PathBuf },
    /// Constituents table scraped from an HTML page.
    Scraped { url: String },
}

/// The complete universe: sector name → member tickers.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Universe {
    pub sectors: BTreeMap<String, Vec<String>>,
}

impl Universe {
    pub fn from_file(path: &Path) -> Result<Self, UniverseError> {
        let content = std::fs::read_to_string(path).map_err(|source| UniverseError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self, UniverseError> {
        Ok(toml::from_str(content)?)
    }

    /// Build from (symbol, sector) pairs, keeping first-seen order within a sector.
    pub fn from_pairs<I, S, T>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (S, T)>,
        S: Into<String>,
        T: Into<String>,
    {
        let mut sectors: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for (symbol, sector) in pairs {
            sectors.entry(sector.into()).or_default().push(symbol.into());
        }
        Self { sectors }
    }

    /// All tickers, sector by sector. Later duplicates are dropped.
    pub fn all_tickers(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        self.sectors
            .values()
            .flat_map(|tickers| tickers.iter().map(|t| t.as_str()))
            .filter(|t| seen.insert(*t))
            .collect()
    }

    /// Sector of a ticker (first match), or [`UNCLASSIFIED`].
    pub fn sector_of(&self, ticker: &str) -> &str {
        self.sectors
            .iter()
            .find(|(_, tickers)| tickers.iter().any(|t| t == ticker))
            .map(|(sector, _)| sector.as_str())
            .unwrap_or(UNCLASSIFIED)
    }

    pub fn sector_names(&self) -> Vec<&str> {
        self.sectors.keys().map(|s| s.as_str()).collect()
    }

    pub fn ticker_count(&self) -> usize {
        self.all_tickers().len()
    }

    pub fn is_empty(&self) -> bool {
        self.sectors.values().all(|v| v.is_empty())
    }

    /// Liquid large caps grouped by sector, plus the broad index ETFs used as
    /// trend references.
    pub fn premium() -> Self {
        let groups: [(&str, &[&str]); 8] = [
            (
                "Technology",
                &["AAPL", "MSFT", "GOOGL", "AMZN", "META", "NVDA", "TSLA", "ADBE", "NFLX"],
            ),
            ("Financials", &["JPM", "V", "MA", "BAC", "WFC"]),
            ("Healthcare", &["JNJ", "PFE", "UNH", "MRK", "ABBV"]),
            ("Consumer", &["PG", "KO", "PEP", "WMT", "COST"]),
            ("Industrials", &["CAT", "BA", "MMM", "HON"]),
            ("Energy", &["XOM", "CVX"]),
            ("Communication", &["T", "VZ", "CMCSA"]),
            ("ETFs", &["SPY", "QQQ", "DIA"]),
        ];
        Self::from_pairs(
            groups
                .iter()
                .flat_map(|(sector, tickers)| tickers.iter().map(move |t| (*t, *sector))),
        )
    }
}

/// Resolve a universe from its configured source.
pub fn resolve_universe(source: &UniverseSource) -> Result<Universe, UniverseError> {
    let universe = match source {
        UniverseSource::Static => Universe::premium(),
        UniverseSource::File { path } => Universe::from_file(path)?,
        UniverseSource::Scraped { url } => {
            let members = index_scrape::fetch_constituents(url)?;
            Universe::from_pairs(members.into_iter().map(|m| (m.symbol, m.sector)))
        }
    };
    if universe.is_empty() {
        return Err(UniverseError::Empty);
    }
    tracing::info!(
        tickers = universe.ticker_count(),
        sectors = universe.sectors.len(),
        "universe resolved"
    );
    Ok(universe)
}
