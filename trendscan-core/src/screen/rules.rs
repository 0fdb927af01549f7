//! Entry rules: trend, stop, pullback, optional oscillators, sizing.

use thiserror::Error;

use super::scoring;
use super::sizing::RiskSizer;
use crate::config::ScanConfig;
use crate::domain::{last_close, Bar, Candidate};
use crate::indicators::{last_valid, Atr, Indicator, Macd, Rsi, Supertrend, TrendDirection};

/// Why a ticker did not become a candidate.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Rejection {
    #[error("indicators undefined (not enough clean history)")]
    IndicatorsUndefined,

    #[error("SuperTrend is down")]
    Downtrend,

    #[error("close {close:.2} not above SuperTrend {stop:.2}")]
    BelowStop { close: f64, stop: f64 },

    #[error("pullback {distance:.2} exceeds {limit:.2} ({max_atr} x ATR)")]
    PullbackTooDeep {
        distance: f64,
        limit: f64,
        max_atr: f64,
    },

    #[error("RSI {rsi:.1} above {max:.1}")]
    RsiTooHigh { rsi: f64, max: f64 },

    #[error("MACD not bullish")]
    MacdNotBullish,

    #[error("risk budget buys no share at stop distance {stop_distance:.2}")]
    Unsizable { stop_distance: f64 },
}

/// Evaluate the last bar of a validated series.
pub fn evaluate(
    symbol: &str,
    sector: &str,
    bars: &[Bar],
    cfg: &ScanConfig,
) -> Result<Candidate, Rejection> {
    let supertrend =
        Supertrend::new(cfg.supertrend_period, cfg.supertrend_multiplier).compute_full(bars);
    let atr = last_valid(&Atr::new(cfg.atr_period).compute(bars));

    let (Some(close), Some(stop), Some(direction), Some(atr)) = (
        last_close(bars),
        supertrend.last_band(),
        supertrend.last_direction(),
        atr,
    ) else {
        return Err(Rejection::IndicatorsUndefined);
    };

    if direction != TrendDirection::Up {
        return Err(Rejection::Downtrend);
    }
    if !(close > stop) {
        return Err(Rejection::BelowStop { close, stop });
    }

    let distance = close - stop;
    let limit = cfg.max_pullback_atr * atr;
    if distance > limit {
        return Err(Rejection::PullbackTooDeep {
            distance,
            limit,
            max_atr: cfg.max_pullback_atr,
        });
    }

    let rsi = last_valid(&Rsi::new(cfg.filters.rsi_period).compute(bars));
    if let (Some(max), Some(rsi)) = (cfg.filters.rsi_max, rsi) {
        if rsi > max {
            return Err(Rejection::RsiTooHigh { rsi, max });
        }
    }

    let macd = Macd::new(cfg.filters.macd_fast, cfg.filters.macd_slow, cfg.filters.macd_signal)
        .compute_full(bars);
    if cfg.filters.require_macd_bullish && macd.is_bullish() != Some(true) {
        return Err(Rejection::MacdNotBullish);
    }

    let size = RiskSizer::new(cfg.portfolio_size, cfg.risk_per_trade)
        .size(close, stop)
        .ok_or(Rejection::Unsizable {
            stop_distance: distance,
        })?;

    Ok(Candidate {
        ticker: symbol.to_string(),
        sector: sector.to_string(),
        price: close,
        stop,
        atr,
        shares: size.shares,
        position_value: size.position_value,
        actual_risk: size.actual_risk,
        r_score: scoring::r_score(bars, &supertrend, &cfg.scoring),
        atr_ratio: if atr > 0.0 { distance / atr } else { 0.0 },
        risk_reward: distance / stop,
        rsi,
        macd_histogram: last_valid(&macd.histogram),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::make_ohlc_bars;

    /// Closes rise by 1 per bar with a fixed 2-point range: ATR = 2 and the
    /// SuperTrend (multiplier 2) trails exactly 4 below the close.
    fn staircase(n: usize) -> Vec<Bar> {
        let data: Vec<(f64, f64, f64, f64)> = (0..n)
            .map(|i| {
                let c = 100.0 + i as f64;
                (c, c + 1.0, c - 1.0, c)
            })
            .collect();
        make_ohlc_bars(&data)
    }

    fn cfg() -> ScanConfig {
        ScanConfig {
            supertrend_multiplier: 2.0,
            ..ScanConfig::default()
        }
    }

    #[test]
    fn staircase_passes_with_expected_fields() {
        let bars = staircase(60);
        let c = evaluate("AAA", "Tech", &bars, &cfg()).unwrap();
        assert_eq!(c.price, 159.0);
        assert_eq!(c.stop, 155.0);
        assert_eq!(c.atr, 2.0);
        assert_eq!(c.shares, 125);
        assert_eq!(c.position_value, 125.0 * 159.0);
        assert_eq!(c.actual_risk, 500.0);
        assert_eq!(c.atr_ratio, 2.0);
        assert_eq!(c.sector, "Tech");
        assert!(c.r_score > 0.0 && c.r_score <= 1.0);
    }

    #[test]
    fn pullback_exactly_at_limit_is_included() {
        let bars = staircase(60);
        let cfg = ScanConfig {
            max_pullback_atr: 2.0,
            ..cfg()
        };
        assert!(evaluate("AAA", "Tech", &bars, &cfg).is_ok());

        let cfg = ScanConfig {
            max_pullback_atr: 1.5,
            ..cfg
        };
        assert_eq!(
            evaluate("AAA", "Tech", &bars, &cfg),
            Err(Rejection::PullbackTooDeep {
                distance: 4.0,
                limit: 3.0,
                max_atr: 1.5
            })
        );
    }

    #[test]
    fn downtrend_rejected() {
        let data: Vec<(f64, f64, f64, f64)> = (0..60)
            .map(|i| {
                let c = 200.0 - i as f64;
                (c, c + 1.0, c - 1.0, c)
            })
            .collect();
        let bars = make_ohlc_bars(&data);
        assert_eq!(evaluate("AAA", "Tech", &bars, &cfg()), Err(Rejection::Downtrend));
    }

    #[test]
    fn short_history_is_undefined() {
        let bars = staircase(5);
        assert_eq!(
            evaluate("AAA", "Tech", &bars, &cfg()),
            Err(Rejection::IndicatorsUndefined)
        );
    }

    #[test]
    fn rsi_filter_applies_when_set() {
        let bars = staircase(60);
        let mut cfg = cfg();
        cfg.filters.rsi_max = Some(70.0);
        assert!(matches!(
            evaluate("AAA", "Tech", &bars, &cfg),
            Err(Rejection::RsiTooHigh { .. })
        ));
    }

    /// Staircase that climbs by 1 for 41 bars, then by `late_step` per bar.
    fn bend(late_step: f64) -> Vec<Bar> {
        let mut close = 100.0;
        let data: Vec<(f64, f64, f64, f64)> = (0..60)
            .map(|i| {
                if i > 0 {
                    close += if i <= 40 { 1.0 } else { late_step };
                }
                (close, close + 1.0, close - 1.0, close)
            })
            .collect();
        make_ohlc_bars(&data)
    }

    #[test]
    fn macd_filter_applies_when_set() {
        let mut cfg = cfg();
        cfg.max_pullback_atr = 3.0;
        cfg.filters.require_macd_bullish = true;

        // Flattening: MACD line falls under its signal while the trend holds.
        assert_eq!(
            evaluate("AAA", "Tech", &bend(0.2), &cfg),
            Err(Rejection::MacdNotBullish)
        );

        // Accelerating: line pulls away above the signal.
        let c = evaluate("AAA", "Tech", &bend(3.0), &cfg).unwrap();
        assert!(c.macd_histogram.unwrap() > 1.0);

        cfg.filters.require_macd_bullish = false;
        assert!(evaluate("AAA", "Tech", &bend(0.2), &cfg).is_ok());
    }

    #[test]
    fn tiny_budget_is_unsizable() {
        let bars = staircase(60);
        let cfg = ScanConfig {
            portfolio_size: 300.0,
            ..cfg()
        };
        assert_eq!(
            evaluate("AAA", "Tech", &bars, &cfg),
            Err(Rejection::Unsizable { stop_distance: 4.0 })
        );
    }
}
