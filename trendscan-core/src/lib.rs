//! trendscan core: weekly SuperTrend stock screener.
//!
//! This crate holds every stage of a run:
//! - Universe resolution (static sector lists, TOML files, scraped index tables)
//! - Weekly OHLCV downloads through a provider trait, with a circuit breaker
//! - Ad hoc series validation
//! - Indicators (SuperTrend, ATR, SMA, EMA, RSI, MACD)
//! - Entry rules, fixed fractional-risk sizing, ranking and selection
//! - Report formatting, delivery, and the flat positions file
//!
//! The `trendscan` binary decides which run to perform and wires the pieces
//! together through [`scan::ScanContext`].

pub mod config;
pub mod data;
pub mod domain;
pub mod indicators;
pub mod notify;
pub mod positions;
pub mod report;
pub mod scan;
pub mod schedule;
pub mod screen;

pub use config::{ConfigError, ScanConfig};
pub use schedule::RunMode;
