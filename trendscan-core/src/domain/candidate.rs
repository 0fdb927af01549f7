//! Candidate: a ticker that passed every entry rule, with its sizing.

use serde::{Deserialize, Serialize};

use super::position::SavedPosition;

/// Entry candidate produced by `screen::rules::evaluate`.
///
/// Ephemeral: lives for one run. Only the ticker/stop pair survives, via
/// [`Candidate::to_saved`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    pub ticker: String,
    pub sector: String,
    /// Last close.
    pub price: f64,
    /// SuperTrend band at the last bar; used as the protective stop.
    pub stop: f64,
    pub atr: f64,
    pub shares: u64,
    pub position_value: f64,
    pub actual_risk: f64,
    pub r_score: f64,
    /// Pullback distance expressed in ATR units.
    pub atr_ratio: f64,
    /// (price - stop) / stop
    pub risk_reward: f64,
    pub rsi: Option<f64>,
    pub macd_histogram: Option<f64>,
}

impl Candidate {
    pub fn stop_distance(&self) -> f64 {
        self.price - self.stop
    }

    pub fn to_saved(&self) -> SavedPosition {
        SavedPosition::new(self.ticker.clone(), self.stop)
    }
}
