//! Broad-market regime gate.
//!
//! New entries are only proposed while the reference index closes above its
//! moving average. When the check cannot be made the scan proceeds.

use chrono::{Duration, NaiveDate};

use crate::config::MarketFilter;
use crate::data::{BarInterval, DataProvider};
use crate::domain::last_close;
use crate::indicators::{last_valid, Indicator, Sma};

#[derive(Debug, Clone, PartialEq)]
pub enum MarketCondition {
    Bullish { close: f64, ma: f64 },
    Bearish { close: f64, ma: f64 },
    /// Filter disabled, too little history, or the fetch failed.
    Unchecked { reason: String },
}

impl MarketCondition {
    pub fn allows_entries(&self) -> bool {
        !matches!(self, MarketCondition::Bearish { .. })
    }
}

pub fn check_market(
    provider: &dyn DataProvider,
    filter: &MarketFilter,
    today: NaiveDate,
) -> MarketCondition {
    if !filter.enabled {
        return MarketCondition::Unchecked {
            reason: "market filter disabled".into(),
        };
    }

    let start = today - Duration::days(filter.lookback_days);
    let bars = match provider.fetch(&filter.symbol, start, today, BarInterval::Weekly) {
        Ok(bars) => bars,
        Err(e) => {
            tracing::warn!(symbol = %filter.symbol, error = %e, "market check failed, continuing");
            return MarketCondition::Unchecked {
                reason: format!("{} unavailable: {e}", filter.symbol),
            };
        }
    };

    if bars.len() < filter.min_bars {
        tracing::warn!(
            symbol = %filter.symbol,
            bars = bars.len(),
            "not enough market history, continuing"
        );
        return MarketCondition::Unchecked {
            reason: format!("{} has only {} bars", filter.symbol, bars.len()),
        };
    }

    let close = last_close(&bars);
    let ma = last_valid(&Sma::new(filter.ma_period).compute(&bars));
    let (Some(close), Some(ma)) = (close.filter(|c| !c.is_nan()), ma) else {
        return MarketCondition::Unchecked {
            reason: format!("{} moving average undefined", filter.symbol),
        };
    };

    let condition = if close > ma {
        MarketCondition::Bullish { close, ma }
    } else {
        MarketCondition::Bearish { close, ma }
    };
    tracing::info!(symbol = %filter.symbol, close, ma, bullish = condition.allows_entries(), "market check");
    condition
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::DataError;
    use crate::domain::Bar;
    use crate::indicators::make_bars;

    struct Fixed(Result<Vec<Bar>, ()>);

    impl DataProvider for Fixed {
        fn name(&self) -> &str {
            "fixed"
        }

        fn fetch(
            &self,
            symbol: &str,
            _start: NaiveDate,
            _end: NaiveDate,
            _interval: BarInterval,
        ) -> Result<Vec<Bar>, DataError> {
            self.0.clone().map_err(|_| DataError::SymbolNotFound {
                symbol: symbol.into(),
            })
        }

        fn is_available(&self) -> bool {
            true
        }
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 3).unwrap()
    }

    #[test]
    fn rising_index_is_bullish() {
        let closes: Vec<f64> = (0..26).map(|i| 400.0 + i as f64).collect();
        let provider = Fixed(Ok(make_bars(&closes)));
        let cond = check_market(&provider, &MarketFilter::default(), today());
        // last 10 closes 416..425 average 420.5
        assert_eq!(
            cond,
            MarketCondition::Bullish {
                close: 425.0,
                ma: 420.5
            }
        );
        assert!(cond.allows_entries());
    }

    #[test]
    fn falling_index_is_bearish() {
        let closes: Vec<f64> = (0..26).map(|i| 500.0 - i as f64).collect();
        let provider = Fixed(Ok(make_bars(&closes)));
        let cond = check_market(&provider, &MarketFilter::default(), today());
        assert!(matches!(cond, MarketCondition::Bearish { .. }));
        assert!(!cond.allows_entries());
    }

    #[test]
    fn short_history_and_errors_proceed() {
        let provider = Fixed(Ok(make_bars(&[1.0; 9])));
        let cond = check_market(&provider, &MarketFilter::default(), today());
        assert!(matches!(cond, MarketCondition::Unchecked { .. }));
        assert!(cond.allows_entries());

        let provider = Fixed(Err(()));
        assert!(check_market(&provider, &MarketFilter::default(), today()).allows_entries());
    }

    #[test]
    fn disabled_filter_skips_fetch() {
        let provider = Fixed(Err(()));
        let filter = MarketFilter {
            enabled: false,
            ..MarketFilter::default()
        };
        assert!(matches!(
            check_market(&provider, &filter, today()),
            MarketCondition::Unchecked { .. }
        ));
    }
}
