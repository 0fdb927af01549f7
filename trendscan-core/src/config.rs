//! Scan configuration.
//!
//! Built-in defaults, optionally overlaid by a TOML file, then by process
//! environment variables (a `.env` file in the working directory is loaded
//! first when present).

use chrono::Weekday;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::data::{BarInterval, UniverseSource, ValidationRules};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("read config {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("environment variable {key}={value:?} is not a valid value")]
    Env { key: &'static str, value: String },

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Everything one run needs to know.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// Hypothetical account size the risk budget is taken from.
    pub portfolio_size: f64,
    /// Fraction of the portfolio risked per position.
    pub risk_per_trade: f64,
    pub max_positions: usize,

    pub supertrend_period: usize,
    pub supertrend_multiplier: f64,
    pub atr_period: usize,
    /// Largest allowed close-to-stop distance, in ATR units.
    pub max_pullback_atr: f64,

    /// Calendar days of history requested per ticker.
    pub history_days: i64,
    pub interval: BarInterval,
    /// Download pool size.
    pub workers: usize,
    /// Provider retries per ticker; 0 skips a failed ticker straight away.
    pub max_retries: u32,

    pub validation: ValidationRules,
    pub scoring: ScoringConfig,
    pub filters: FilterConfig,
    pub market: MarketFilter,
    pub diversification: Diversification,
    pub universe: UniverseSource,
    pub positions_file: PathBuf,
    pub schedule: Schedule,
    pub notify: NotifyConfig,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            portfolio_size: 50_000.0,
            risk_per_trade: 0.01,
            max_positions: 3,
            supertrend_period: 10,
            supertrend_multiplier: 3.0,
            atr_period: 14,
            max_pullback_atr: 2.0,
            history_days: 730,
            interval: BarInterval::Weekly,
            workers: 5,
            max_retries: 0,
            validation: ValidationRules::default(),
            scoring: ScoringConfig::default(),
            filters: FilterConfig::default(),
            market: MarketFilter::default(),
            diversification: Diversification::default(),
            universe: UniverseSource::default(),
            positions_file: PathBuf::from("positions.json"),
            schedule: Schedule::default(),
            notify: NotifyConfig::default(),
        }
    }
}

/// Weights inputs of the ranking score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    /// Bars inspected for the share of up-trend bars.
    pub trend_window: usize,
    pub momentum_ma_period: usize,
    /// Relative close-to-stop distance at which the pullback score reaches zero.
    pub pullback_score_band: f64,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            trend_window: 10,
            momentum_ma_period: 20,
            pullback_score_band: 0.10,
        }
    }
}

/// Optional oscillator filters. Both are off by default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    pub rsi_period: usize,
    /// Reject candidates whose RSI is above this level.
    pub rsi_max: Option<f64>,
    pub macd_fast: usize,
    pub macd_slow: usize,
    pub macd_signal: usize,
    /// Require the MACD line above its signal line.
    pub require_macd_bullish: bool,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            rsi_period: 14,
            rsi_max: None,
            macd_fast: 12,
            macd_slow: 26,
            macd_signal: 9,
            require_macd_bullish: false,
        }
    }
}

/// Broad-market regime gate run before an entry scan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarketFilter {
    pub enabled: bool,
    pub symbol: String,
    pub ma_period: usize,
    pub lookback_days: i64,
    /// Below this many bars the check is skipped and the scan proceeds.
    pub min_bars: usize,
}

impl Default for MarketFilter {
    fn default() -> Self {
        Self {
            enabled: true,
            symbol: "SPY".to_string(),
            ma_period: 10,
            lookback_days: 182,
            min_bars: 10,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Diversification {
    pub enabled: bool,
    pub max_sectors: usize,
}

impl Default for Diversification {
    fn default() -> Self {
        Self {
            enabled: false,
            max_sectors: 3,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Schedule {
    pub entry_weekday: Weekday,
    pub exit_weekday: Weekday,
}

impl Default for Schedule {
    fn default() -> Self {
        Self {
            entry_weekday: Weekday::Mon,
            exit_weekday: Weekday::Fri,
        }
    }
}

/// Delivery credentials. Usually supplied through the environment.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NotifyConfig {
    pub telegram_token: Option<String>,
    pub telegram_chat_id: Option<String>,
    pub webhook_url: Option<String>,
}

impl ScanConfig {
    /// Defaults, then `path` (if any), then `.env` and the process environment.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        if let Ok(env_file) = dotenv::dotenv() {
            tracing::debug!(path = %env_file.display(), "loaded .env");
        }
        config.apply_env(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Overlay environment overrides. `lookup` returns the raw variable value.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let text = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(v) = text("TELEGRAM_TOKEN") {
            self.notify.telegram_token = Some(v);
        }
        if let Some(v) = text("TELEGRAM_CHAT_ID") {
            self.notify.telegram_chat_id = Some(v);
        }
        if let Some(v) = text("WEBHOOK_URL") {
            self.notify.webhook_url = Some(v);
        }
        if let Some(v) = text("POSITIONS_FILE") {
            self.positions_file = PathBuf::from(v);
        }
        if let Some(v) = text("PORTFOLIO_SIZE") {
            self.portfolio_size = parse_env("PORTFOLIO_SIZE", v)?;
        }
        if let Some(v) = text("RISK_PER_TRADE") {
            self.risk_per_trade = parse_env("RISK_PER_TRADE", v)?;
        }
        if let Some(v) = text("MAX_POSITIONS") {
            self.max_positions = parse_env("MAX_POSITIONS", v)?;
        }
        Ok(())
    }

    /// Risk budget per position in account currency.
    pub fn risk_budget(&self) -> f64 {
        self.portfolio_size * self.risk_per_trade
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |msg: &str| Err(ConfigError::Invalid(msg.to_string()));

        if !(self.portfolio_size.is_finite() && self.portfolio_size > 0.0) {
            return invalid("portfolio_size must be positive");
        }
        if !(self.risk_per_trade > 0.0 && self.risk_per_trade < 1.0) {
            return invalid("risk_per_trade must be in (0, 1)");
        }
        if self.max_positions == 0 {
            return invalid("max_positions must be at least 1");
        }
        if !(self.supertrend_multiplier > 0.0) {
            return invalid("supertrend_multiplier must be positive");
        }
        if !(self.max_pullback_atr >= 0.0) {
            return invalid("max_pullback_atr must not be negative");
        }
        if !(self.scoring.pullback_score_band > 0.0) {
            return invalid("scoring.pullback_score_band must be positive");
        }
        if self.history_days <= 0 || self.market.lookback_days <= 0 {
            return invalid("history windows must be positive");
        }
        if self.workers == 0 {
            return invalid("workers must be at least 1");
        }

        let periods = [
            ("supertrend_period", self.supertrend_period),
            ("atr_period", self.atr_period),
            ("scoring.trend_window", self.scoring.trend_window),
            ("scoring.momentum_ma_period", self.scoring.momentum_ma_period),
            ("filters.rsi_period", self.filters.rsi_period),
            ("filters.macd_fast", self.filters.macd_fast),
            ("filters.macd_signal", self.filters.macd_signal),
            ("market.ma_period", self.market.ma_period),
        ];
        if let Some((name, _)) = periods.iter().find(|(_, p)| *p == 0) {
            return Err(ConfigError::Invalid(format!("{name} must be at least 1")));
        }
        if self.filters.macd_fast >= self.filters.macd_slow {
            return invalid("filters.macd_fast must be below filters.macd_slow");
        }
        if self.diversification.enabled && self.diversification.max_sectors == 0 {
            return invalid("diversification.max_sectors must be at least 1");
        }
        Ok(())
    }
}

fn parse_env<T: std::str::FromStr>(key: &'static str, value: String) -> Result<T, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::Env { key, value })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_are_valid() {
        let cfg = ScanConfig::default();
        assert!(cfg.validate().is_ok());
        assert_eq!(cfg.risk_budget(), 500.0);
        assert_eq!(cfg.schedule.entry_weekday, Weekday::Mon);
        assert_eq!(cfg.positions_file, PathBuf::from("positions.json"));
    }

    #[test]
    fn partial_toml_keeps_other_defaults() {
        let cfg = ScanConfig::from_toml(
            r#"
            max_positions = 5
            workers = 8

            [diversification]
            enabled = true

            [market]
            symbol = "QQQ"
            "#,
        )
        .unwrap();
        assert_eq!(cfg.max_positions, 5);
        assert_eq!(cfg.workers, 8);
        assert!(cfg.diversification.enabled);
        assert_eq!(cfg.diversification.max_sectors, 3);
        assert_eq!(cfg.market.symbol, "QQQ");
        assert_eq!(cfg.market.ma_period, 10);
        assert_eq!(cfg.portfolio_size, 50_000.0);
    }

    #[test]
    fn universe_source_from_toml() {
        let cfg = ScanConfig::from_toml(
            r#"
            [universe]
            type = "scraped"
            url = "https://example.org/list"
            "#,
        )
        .unwrap();
        assert_eq!(
            cfg.universe,
            UniverseSource::Scraped {
                url: "https://example.org/list".into()
            }
        );
    }

    #[test]
    fn env_overrides_apply() {
        let mut cfg = ScanConfig::default();
        cfg.apply_env(env(&[
            ("PORTFOLIO_SIZE", "100000"),
            ("RISK_PER_TRADE", "0.02"),
            ("MAX_POSITIONS", " 4 "),
            ("TELEGRAM_TOKEN", "abc"),
            ("TELEGRAM_CHAT_ID", "42"),
            ("POSITIONS_FILE", "/tmp/p.json"),
            ("WEBHOOK_URL", ""),
        ]))
        .unwrap();
        assert_eq!(cfg.portfolio_size, 100_000.0);
        assert_eq!(cfg.risk_per_trade, 0.02);
        assert_eq!(cfg.max_positions, 4);
        assert_eq!(cfg.notify.telegram_token.as_deref(), Some("abc"));
        assert_eq!(cfg.notify.telegram_chat_id.as_deref(), Some("42"));
        assert_eq!(cfg.notify.webhook_url, None);
        assert_eq!(cfg.positions_file, PathBuf::from("/tmp/p.json"));
    }

    #[test]
    fn bad_env_number_is_reported() {
        let mut cfg = ScanConfig::default();
        let err = cfg.apply_env(env(&[("PORTFOLIO_SIZE", "lots")])).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Env {
                key: "PORTFOLIO_SIZE",
                ..
            }
        ));
    }

    #[test]
    fn validation_rejects_bad_values() {
        let mut cfg = ScanConfig::default();
        cfg.risk_per_trade = 1.0;
        assert!(cfg.validate().is_err());

        let mut cfg = ScanConfig::default();
        cfg.workers = 0;
        assert!(cfg.validate().is_err());

        let mut cfg = ScanConfig::default();
        cfg.filters.macd_fast = 26;
        assert!(cfg.validate().is_err());

        let mut cfg = ScanConfig::default();
        cfg.atr_period = 0;
        let msg = cfg.validate().unwrap_err().to_string();
        assert!(msg.contains("atr_period"));
    }

    #[test]
    fn missing_file_is_read_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = ScanConfig::from_file(&dir.path().join("nope.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }
}
