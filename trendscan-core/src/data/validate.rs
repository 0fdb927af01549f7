//! Ad hoc series quality checks run before any indicator math.
//!
//! A series that fails any check is skipped for the run; nothing is repaired.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::Bar;

/// Number of trailing bars whose mean volume is checked.
pub const VOLUME_WINDOW: usize = 10;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationRules {
    pub min_bars: usize,
    pub min_avg_volume: f64,
    pub max_staleness_days: i64,
}

impl Default for ValidationRules {
    fn default() -> Self {
        Self {
            min_bars: 50,
            min_avg_volume: 1_000_000.0,
            max_staleness_days: 14,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationIssue {
    #[error("insufficient data ({bars} bars, need {required})")]
    InsufficientBars { bars: usize, required: usize },

    #[error("low volume ({average:.0} average over last {VOLUME_WINDOW} bars)")]
    LowVolume { average: f64 },

    #[error("missing values in {count} bar(s)")]
    MissingValues { count: usize },

    #[error("stale data (last bar {last}, {days} days old)")]
    Stale { last: NaiveDate, days: i64 },
}

/// Run every check in order; the first failure wins.
pub fn validate_series(
    bars: &[Bar],
    today: NaiveDate,
    rules: &ValidationRules,
) -> Result<(), ValidationIssue> {
    if bars.len() < rules.min_bars || bars.is_empty() {
        return Err(ValidationIssue::InsufficientBars {
            bars: bars.len(),
            required: rules.min_bars,
        });
    }

    // Gaps are left to the missing-values check, not averaged in as zero.
    let tail = &bars[bars.len().saturating_sub(VOLUME_WINDOW)..];
    let reported: Vec<f64> = tail.iter().filter_map(|b| b.volume).map(|v| v as f64).collect();
    if !reported.is_empty() {
        let average = reported.iter().sum::<f64>() / reported.len() as f64;
        if average < rules.min_avg_volume {
            return Err(ValidationIssue::LowVolume { average });
        }
    }

    let count = bars.iter().filter(|b| b.is_incomplete()).count();
    if count > 0 {
        return Err(ValidationIssue::MissingValues { count });
    }

    if let Some(last) = bars.last().map(|b| b.date) {
        let days = (today - last).num_days();
        if days > rules.max_staleness_days {
            return Err(ValidationIssue::Stale { last, days });
        }
    }

    Ok(())
}
