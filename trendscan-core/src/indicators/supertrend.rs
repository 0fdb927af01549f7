//! SuperTrend: ATR-banded trend-following indicator.
//!
//! Inherently sequential: the final upper band may only tighten while close
//! stays below it, the final lower band may only tighten while close stays
//! above it, and the direction flips when close crosses the active band.
//!
//! The active band is the lower band (support) in an uptrend and the upper
//! band (resistance) in a downtrend. It doubles as the protective stop.

use serde::{Deserialize, Serialize};

use super::Indicator;
use crate::domain::Bar;
use crate::indicators::atr::{true_range, wilder_smooth};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TrendDirection {
    Up,
    Down,
}

/// Band and direction per bar. Warmup bars have `NaN` / `None`.
#[derive(Debug, Clone, Default)]
pub struct SupertrendOutput {
    pub band: Vec<f64>,
    pub direction: Vec<Option<TrendDirection>>,
}

impl SupertrendOutput {
    pub fn last_band(&self) -> Option<f64> {
        super::last_valid(&self.band)
    }

    pub fn last_direction(&self) -> Option<TrendDirection> {
        self.direction.last().copied().flatten()
    }

    /// Fraction of the last `window` bars that were in an uptrend.
    ///
    /// `None` unless every bar in the window has a direction.
    pub fn up_fraction(&self, window: usize) -> Option<f64> {
        if window == 0 || self.direction.len() < window {
            return None;
        }
        let tail = &self.direction[self.direction.len() - window..];
        let mut ups = 0usize;
        for d in tail {
            match d {
                Some(TrendDirection::Up) => ups += 1,
                Some(TrendDirection::Down) => {}
                None => return None,
            }
        }
        Some(ups as f64 / window as f64)
    }
}

#[derive(Debug, Clone)]
pub struct Supertrend {
    period: usize,
    multiplier: f64,
    name: String,
}

impl Supertrend {
    pub fn new(period: usize, multiplier: f64) -> Self {
        assert!(period >= 1, "SuperTrend period must be >= 1");
        assert!(multiplier > 0.0, "SuperTrend multiplier must be > 0");
        Self {
            period,
            multiplier,
            name: format!("supertrend_{period}_{multiplier}"),
        }
    }

    pub fn compute_full(&self, bars: &[Bar]) -> SupertrendOutput {
        let n = bars.len();
        let mut out = SupertrendOutput {
            band: vec![f64::NAN; n],
            direction: vec![None; n],
        };

        let atr = wilder_smooth(&true_range(bars), self.period);
        let Some(start) = atr.iter().position(|v| !v.is_nan()) else {
            return out;
        };

        let mut upper = bars[start].hl2() + self.multiplier * atr[start];
        let mut lower = bars[start].hl2() - self.multiplier * atr[start];
        let mut direction = if bars[start].close >= lower {
            TrendDirection::Up
        } else {
            TrendDirection::Down
        };
        out.band[start] = active_band(direction, lower, upper);
        out.direction[start] = Some(direction);

        for i in (start + 1)..n {
            let bar = &bars[i];
            if atr[i].is_nan() || bar.is_void() {
                break;
            }

            let basic_upper = bar.hl2() + self.multiplier * atr[i];
            let basic_lower = bar.hl2() - self.multiplier * atr[i];
            let prev_close = bars[i - 1].close;

            upper = if prev_close <= upper {
                basic_upper.min(upper)
            } else {
                basic_upper
            };
            lower = if prev_close >= lower {
                basic_lower.max(lower)
            } else {
                basic_lower
            };

            direction = match direction {
                TrendDirection::Up if bar.close < lower => TrendDirection::Down,
                TrendDirection::Down if bar.close > upper => TrendDirection::Up,
                d => d,
            };

            out.band[i] = active_band(direction, lower, upper);
            out.direction[i] = Some(direction);
        }

        out
    }
}

fn active_band(direction: TrendDirection, lower: f64, upper: f64) -> f64 {
    match direction {
        TrendDirection::Up => lower,
        TrendDirection::Down => upper,
    }
}

impl Indicator for Supertrend {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.period.saturating_sub(1)
    }

    fn compute(&self, bars: &[Bar]) -> Vec<f64> {
        self.compute_full(bars).band
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::make_ohlc_bars;

    fn rising(n: usize) -> Vec<Bar> {
        let data: Vec<_> = (0..n)
            .map(|i| {
                let base = 100.0 + i as f64 * 2.0;
                (base - 1.0, base + 3.0, base - 3.0, base + 1.0)
            })
            .collect();
        make_ohlc_bars(&data)
    }

    #[test]
    fn uptrend_band_sits_below_close() {
        let bars = rising(15);
        let st = Supertrend::new(3, 2.0).compute_full(&bars);
        for i in 5..15 {
            assert_eq!(st.direction[i], Some(TrendDirection::Up));
            assert!(st.band[i] < bars[i].close, "band above close at bar {i}");
        }
    }

    #[test]
    fn lower_band_never_loosens_in_uptrend() {
        let st = Supertrend::new(3, 2.0).compute_full(&rising(20));
        let bands: Vec<f64> = st.band.into_iter().filter(|v| !v.is_nan()).collect();
        for w in bands.windows(2) {
            assert!(w[1] >= w[0]);
        }
    }

    #[test]
    fn crash_flips_direction_down() {
        let mut data: Vec<_> = (0..12)
            .map(|i| {
                let base = 100.0 + i as f64;
                (base, base + 1.0, base - 1.0, base + 0.5)
            })
            .collect();
        data.push((110.0, 110.0, 80.0, 81.0));
        let bars = make_ohlc_bars(&data);
        let st = Supertrend::new(3, 2.0).compute_full(&bars);
        assert_eq!(st.last_direction(), Some(TrendDirection::Down));
        assert!(st.last_band().unwrap() > bars.last().unwrap().close);
    }

    #[test]
    fn up_fraction_counts_window() {
        let st = SupertrendOutput {
            band: vec![1.0; 4],
            direction: vec![
                Some(TrendDirection::Down),
                Some(TrendDirection::Up),
                Some(TrendDirection::Up),
                Some(TrendDirection::Down),
            ],
        };
        assert_eq!(st.up_fraction(4), Some(0.5));
        assert_eq!(st.up_fraction(3), Some(2.0 / 3.0));
        assert_eq!(st.up_fraction(5), None);
    }

    #[test]
    fn up_fraction_needs_full_window() {
        let st = SupertrendOutput {
            band: vec![f64::NAN, 1.0],
            direction: vec![None, Some(TrendDirection::Up)],
        };
        assert_eq!(st.up_fraction(2), None);
        assert_eq!(st.up_fraction(1), Some(1.0));
    }

    #[test]
    fn too_few_bars_is_all_nan() {
        let bars = make_ohlc_bars(&[(100.0, 105.0, 95.0, 102.0)]);
        let st = Supertrend::new(3, 2.0).compute_full(&bars);
        assert!(st.band.iter().all(|v| v.is_nan()));
        assert_eq!(st.last_direction(), None);
    }
}
