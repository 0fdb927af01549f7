//! Bar: one OHLCV row of a price series.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// OHLCV bar for a single symbol and period (daily or weekly).
///
/// Missing provider prices are stored as `NaN` (a "void" bar) and a missing
/// volume as `None`; either disqualifies the series during validation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: Option<u64>,
    pub adj_close: f64,
}

impl Bar {
    /// Returns true if any OHLC field is NaN.
    pub fn is_void(&self) -> bool {
        self.open.is_nan() || self.high.is_nan() || self.low.is_nan() || self.close.is_nan()
    }

    /// Void, or the provider sent no volume for the period.
    pub fn is_incomplete(&self) -> bool {
        self.is_void() || self.volume.is_none()
    }

    /// Midpoint of the bar's range, the SuperTrend anchor.
    pub fn hl2(&self) -> f64 {
        (self.high + self.low) / 2.0
    }
}

/// Last close of a series, if any.
pub fn last_close(bars: &[Bar]) -> Option<f64> {
    bars.last().map(|b| b.close)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_bar() -> Bar {
        Bar {
            date: NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
            open: 100.0,
            high: 105.0,
            low: 98.0,
            close: 103.0,
            volume: Some(50_000),
            adj_close: 103.0,
        }
    }

    #[test]
    fn bar_detects_void() {
        let mut bar = sample_bar();
        bar.open = f64::NAN;
        assert!(bar.is_void());
        assert!(!sample_bar().is_void());
    }

    #[test]
    fn missing_volume_is_incomplete_but_not_void() {
        let mut bar = sample_bar();
        bar.volume = None;
        assert!(!bar.is_void());
        assert!(bar.is_incomplete());
        assert!(!sample_bar().is_incomplete());
    }

    #[test]
    fn hl2_is_range_midpoint() {
        assert_eq!(sample_bar().hl2(), 101.5);
    }

    #[test]
    fn last_close_of_empty_series() {
        assert_eq!(last_close(&[]), None);
        assert_eq!(last_close(&[sample_bar()]), Some(103.0));
    }
}
