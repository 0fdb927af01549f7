//! Fixed fractional-risk position sizing.
//!
//! # Formula
//! ```text
//! risk_budget   = portfolio_size * risk_per_trade
//! stop_distance = entry - stop
//! shares        = floor(risk_budget / stop_distance)
//! ```
//!
//! # Example
//! - Portfolio: $50,000, risk 1% ($500)
//! - Entry $102.00, stop $98.00 (distance $4.00)
//! - Shares: floor(500 / 4) = 125, position value $12,750, risk $500

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RiskSizer {
    pub portfolio_size: f64,
    pub risk_per_trade: f64,
}

/// Result of sizing one entry.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PositionSize {
    pub shares: u64,
    /// shares * entry
    pub position_value: f64,
    /// shares * (entry - stop); never above the risk budget
    pub actual_risk: f64,
}

impl RiskSizer {
    pub fn new(portfolio_size: f64, risk_per_trade: f64) -> Self {
        Self {
            portfolio_size,
            risk_per_trade,
        }
    }

    pub fn risk_budget(&self) -> f64 {
        self.portfolio_size * self.risk_per_trade
    }

    /// `None` when the stop is not below the entry or the budget buys no share.
    pub fn size(&self, entry: f64, stop: f64) -> Option<PositionSize> {
        let stop_distance = entry - stop;
        if !(stop_distance > 0.0) || !entry.is_finite() {
            return None;
        }

        let shares = (self.risk_budget() / stop_distance).floor();
        if !(shares >= 1.0) || !shares.is_finite() {
            return None;
        }
        let shares = shares as u64;

        Some(PositionSize {
            shares,
            position_value: shares as f64 * entry,
            actual_risk: shares as f64 * stop_distance,
        })
    }
}
