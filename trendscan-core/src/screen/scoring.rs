//! Ranking score for entry candidates.
//!
//! ```text
//! r_score = 0.4 * trend_strength + 0.4 * pullback_score + 0.2 * momentum
//! ```
//!
//! - trend_strength: share of the last `trend_window` bars in an uptrend
//! - pullback_score: `max(0, 1 - |close - st| / st / band)`, 1.0 at the stop
//! - momentum: 1.0 above the momentum SMA, 0.3 otherwise

use crate::config::ScoringConfig;
use crate::domain::{last_close, Bar};
use crate::indicators::{last_valid, Indicator, Sma, SupertrendOutput};

pub const TREND_WEIGHT: f64 = 0.4;
pub const PULLBACK_WEIGHT: f64 = 0.4;
pub const MOMENTUM_WEIGHT: f64 = 0.2;

const MOMENTUM_WEAK: f64 = 0.3;

/// Closeness of `close` to the stop, scaled to [0, 1].
pub fn pullback_score(close: f64, stop: f64, band: f64) -> f64 {
    if !(stop > 0.0) || !(band > 0.0) {
        return 0.0;
    }
    let distance = (close - stop).abs() / stop;
    (1.0 - distance / band).max(0.0)
}

/// 1.0 when `close` is above `ma`, 0.3 otherwise (including an undefined MA).
pub fn momentum_score(close: f64, ma: Option<f64>) -> f64 {
    match ma {
        Some(ma) if close > ma => 1.0,
        _ => MOMENTUM_WEAK,
    }
}

pub fn combine(trend_strength: f64, pullback: f64, momentum: f64) -> f64 {
    TREND_WEIGHT * trend_strength + PULLBACK_WEIGHT * pullback + MOMENTUM_WEIGHT * momentum
}

/// Score the last bar of `bars` against its SuperTrend output.
pub fn r_score(bars: &[Bar], supertrend: &SupertrendOutput, cfg: &ScoringConfig) -> f64 {
    let (Some(close), Some(stop)) = (last_close(bars), supertrend.last_band()) else {
        return 0.0;
    };
    let trend = supertrend.up_fraction(cfg.trend_window).unwrap_or(0.0);
    let pullback = pullback_score(close, stop, cfg.pullback_score_band);
    let ma = last_valid(&Sma::new(cfg.momentum_ma_period).compute(bars));
    combine(trend, pullback, momentum_score(close, ma))
}
