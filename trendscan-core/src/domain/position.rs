//! Saved positions and the exit-check verdict for each.

use serde::{Deserialize, Serialize};

/// A ticker/stop pair carried from the entry scan to the following exit check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedPosition {
    pub ticker: String,
    pub stop: f64,
}

impl SavedPosition {
    pub fn new(ticker: impl Into<String>, stop: f64) -> Self {
        Self {
            ticker: ticker.into(),
            stop,
        }
    }

    /// True when the close has fallen strictly below the saved stop.
    pub fn stop_hit(&self, close: f64) -> bool {
        close < self.stop
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExitReason {
    /// Last close fell below the saved stop.
    StopHit,
    /// SuperTrend turned down.
    TrendFlip,
}

/// Outcome of re-checking one saved position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ExitDecision {
    Exit { reason: ExitReason, close: f64 },
    Hold { close: f64 },
    NoData { reason: String },
}

/// A saved position together with its exit-check outcome.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExitReview {
    pub position: SavedPosition,
    pub decision: ExitDecision,
}

impl ExitReview {
    pub fn is_exit(&self) -> bool {
        matches!(self.decision, ExitDecision::Exit { .. })
    }
}
