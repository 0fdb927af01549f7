//! Screening: entry rules, ranking score, sizing, selection, market gate.

pub mod regime;
pub mod rules;
pub mod scoring;
pub mod selection;
pub mod sizing;

pub use regime::{check_market, MarketCondition};
pub use rules::{evaluate, Rejection};
pub use selection::{rank, select};
pub use sizing::{PositionSize, RiskSizer};
