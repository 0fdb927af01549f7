//! Shared fixtures: an in-memory provider, a recording notifier, and
//! synthetic weekly series.

#![allow(dead_code)]

use chrono::{Duration, NaiveDate};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use trendscan_core::data::{BarInterval, DataError, DataProvider};
use trendscan_core::domain::Bar;
use trendscan_core::notify::{Notifier, NotifyError};
use trendscan_core::ScanConfig;

pub const BARS: usize = 60;
pub const LIQUID: u64 = 2_000_000;

/// Monday.
pub fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 3, 4).unwrap()
}

/// Weekly bars ending on `today()`, one per close.
pub fn weekly_bars(closes: &[f64], volume: u64) -> Vec<Bar> {
    let n = closes.len();
    closes
        .iter()
        .enumerate()
        .map(|(i, &c)| Bar {
            date: today() - Duration::weeks((n - 1 - i) as i64),
            open: c,
            high: c + 1.0,
            low: c - 1.0,
            close: c,
            volume: Some(volume),
            adj_close: c,
        })
        .collect()
}

/// Close rises by 1 each week from `base`. With a 2-point range the ATR is 2
/// and a multiplier-2 SuperTrend trails exactly 4 below the close.
pub fn uptrend(base: f64) -> Vec<Bar> {
    let closes: Vec<f64> = (0..BARS).map(|i| base + i as f64).collect();
    weekly_bars(&closes, LIQUID)
}

pub fn downtrend(base: f64) -> Vec<Bar> {
    let closes: Vec<f64> = (0..BARS).map(|i| base - i as f64).collect();
    weekly_bars(&closes, LIQUID)
}

/// Config the synthetic series are calibrated for.
pub fn test_config() -> ScanConfig {
    ScanConfig {
        supertrend_multiplier: 2.0,
        workers: 2,
        ..ScanConfig::default()
    }
}

pub struct InMemoryProvider {
    series: HashMap<String, Vec<Bar>>,
    available: AtomicBool,
}

impl InMemoryProvider {
    pub fn new() -> Self {
        Self {
            series: HashMap::new(),
            available: AtomicBool::new(true),
        }
    }

    pub fn with(mut self, symbol: &str, bars: Vec<Bar>) -> Self {
        self.series.insert(symbol.to_string(), bars);
        self
    }

    pub fn block(&self) {
        self.available.store(false, Ordering::SeqCst);
    }
}

impl DataProvider for InMemoryProvider {
    fn name(&self) -> &str {
        "in_memory"
    }

    fn fetch(
        &self,
        symbol: &str,
        _start: NaiveDate,
        _end: NaiveDate,
        _interval: BarInterval,
    ) -> Result<Vec<Bar>, DataError> {
        if !self.is_available() {
            return Err(DataError::CircuitBreakerTripped);
        }
        self.series
            .get(symbol)
            .cloned()
            .ok_or_else(|| DataError::SymbolNotFound {
                symbol: symbol.to_string(),
            })
    }

    fn is_available(&self) -> bool {
        self.available.load(Ordering::SeqCst)
    }
}

#[derive(Default)]
pub struct RecordingNotifier {
    sent: Mutex<Vec<String>>,
    fail: bool,
}

impl RecordingNotifier {
    pub fn failing() -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            fail: true,
        }
    }

    pub fn messages(&self) -> Vec<String> {
        self.sent.lock().unwrap().clone()
    }
}

impl Notifier for RecordingNotifier {
    fn name(&self) -> &str {
        "recording"
    }

    fn send(&self, text: &str) -> Result<(), NotifyError> {
        self.sent.lock().unwrap().push(text.to_string());
        if self.fail {
            return Err(NotifyError::Rejected {
                service: "recording",
                reason: "offline".into(),
            });
        }
        Ok(())
    }
}
