//! Run orchestration: entry scan, exit check, single-ticker probe.
//!
//! Network access and delivery come in through [`ScanContext`], so every run
//! can be driven by an in-memory provider and a recording notifier.

use chrono::{Duration, NaiveDate};
use thiserror::Error;

use crate::config::ScanConfig;
use crate::data::{fetch_all, validate_series, DataError, DataProvider, Universe, ValidationIssue};
use crate::domain::{last_close, Candidate, ExitDecision, ExitReason, ExitReview, SavedPosition};
use crate::indicators::{Supertrend, SupertrendOutput, TrendDirection};
use crate::notify::{deliver, Notifier};
use crate::positions::{PositionStore, PositionStoreError};
use crate::report::{self, Account};
use crate::screen::{self, MarketCondition, Rejection};

#[derive(Debug, Error)]
pub enum ScanError {
    #[error(transparent)]
    Positions(#[from] PositionStoreError),
}

/// Why a probed ticker produced no candidate.
#[derive(Debug, Error)]
pub enum ProbeFailure {
    #[error("download failed: {0}")]
    Fetch(#[from] DataError),

    #[error("data rejected: {0}")]
    Invalid(#[from] ValidationIssue),

    #[error("no signal: {0}")]
    Rejected(#[from] Rejection),
}

pub struct ScanContext<'a> {
    pub config: &'a ScanConfig,
    pub provider: &'a dyn DataProvider,
    pub notifier: &'a dyn Notifier,
    pub universe: &'a Universe,
    pub store: &'a PositionStore,
    /// When false the positions file is never written.
    pub persist: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EntryOutcome {
    pub market: MarketCondition,
    /// Tickers requested from the provider.
    pub scanned: usize,
    /// Tickers dropped for download or validation failures.
    pub skipped: usize,
    /// Tickers that passed every entry rule, before selection.
    pub qualified: usize,
    pub selected: Vec<Candidate>,
    pub delivered: bool,
    pub saved: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExitOutcome {
    pub reviews: Vec<ExitReview>,
    pub delivered: bool,
}

impl ExitOutcome {
    pub fn exits(&self) -> impl Iterator<Item = &ExitReview> {
        self.reviews.iter().filter(|r| r.is_exit())
    }
}

impl ScanContext<'_> {
    fn history_start(&self, today: NaiveDate) -> NaiveDate {
        today - Duration::days(self.config.history_days)
    }

    fn account(&self) -> Account {
        Account {
            portfolio_size: self.config.portfolio_size,
            risk_per_trade: self.config.risk_per_trade,
        }
    }
}

/// Weekly entry scan.
pub fn run_entry_scan(ctx: &ScanContext<'_>, today: NaiveDate) -> Result<EntryOutcome, ScanError> {
    let cfg = ctx.config;

    let market = screen::check_market(ctx.provider, &cfg.market, today);
    if let MarketCondition::Bearish { close, ma } = market {
        let msg = report::market_warning_report(
            &cfg.market.symbol,
            close,
            ma,
            cfg.market.ma_period,
            today,
        );
        let delivered = deliver(ctx.notifier, &msg);
        tracing::warn!(symbol = %cfg.market.symbol, close, ma, "market below its average, scan skipped");
        return Ok(EntryOutcome {
            market,
            scanned: 0,
            skipped: 0,
            qualified: 0,
            selected: Vec::new(),
            delivered,
            saved: false,
        });
    }

    let tickers = ctx.universe.all_tickers();
    tracing::info!(tickers = tickers.len(), "entry scan started");

    let fetched = fetch_all(
        ctx.provider,
        &tickers,
        ctx.history_start(today),
        today,
        cfg.interval,
        cfg.workers,
    );

    let mut skipped = 0;
    let mut candidates = Vec::new();
    for (symbol, result) in fetched {
        let Ok(bars) = result else {
            skipped += 1;
            continue;
        };
        if let Err(issue) = validate_series(&bars, today, &cfg.validation) {
            tracing::warn!(symbol = %symbol, %issue, "series rejected");
            skipped += 1;
            continue;
        }
        match screen::evaluate(&symbol, ctx.universe.sector_of(&symbol), &bars, cfg) {
            Ok(candidate) => {
                tracing::info!(
                    symbol = %symbol,
                    price = candidate.price,
                    stop = candidate.stop,
                    r_score = candidate.r_score,
                    "entry signal"
                );
                candidates.push(candidate);
            }
            Err(reason) => tracing::debug!(symbol = %symbol, %reason, "no signal"),
        }
    }

    let qualified = candidates.len();
    let selected = screen::select(candidates, cfg.max_positions, &cfg.diversification);

    let msg = if selected.is_empty() {
        report::no_signal_report(today)
    } else {
        report::entry_report(&selected, ctx.account(), today)
    };
    let delivered = deliver(ctx.notifier, &msg);

    let saved = if ctx.persist && !selected.is_empty() {
        let positions: Vec<SavedPosition> = selected.iter().map(Candidate::to_saved).collect();
        ctx.store.save(&positions)?;
        true
    } else {
        false
    };

    tracing::info!(
        scanned = tickers.len(),
        skipped,
        qualified,
        selected = selected.len(),
        delivered,
        saved,
        "entry scan finished"
    );

    Ok(EntryOutcome {
        market,
        scanned: tickers.len(),
        skipped,
        qualified,
        selected,
        delivered,
        saved,
    })
}

/// Re-check the positions saved by the last entry scan.
pub fn run_exit_check(ctx: &ScanContext<'_>, today: NaiveDate) -> Result<ExitOutcome, ScanError> {
    let positions = ctx.store.load()?;
    if positions.is_empty() {
        tracing::info!(path = %ctx.store.path().display(), "no saved positions to check");
        return Ok(ExitOutcome {
            reviews: Vec::new(),
            delivered: false,
        });
    }

    let tickers: Vec<&str> = positions.iter().map(|p| p.ticker.as_str()).collect();
    let fetched = fetch_all(
        ctx.provider,
        &tickers,
        ctx.history_start(today),
        today,
        ctx.config.interval,
        ctx.config.workers,
    );

    let supertrend = Supertrend::new(ctx.config.supertrend_period, ctx.config.supertrend_multiplier);
    let reviews: Vec<ExitReview> = positions
        .into_iter()
        .map(|position| {
            let bars = fetched
                .iter()
                .find(|(symbol, _)| *symbol == position.ticker)
                .map(|(_, result)| result);
            let decision = match bars {
                Some(Ok(bars)) => decide_exit(
                    &position,
                    &supertrend.compute_full(bars),
                    last_close(bars),
                ),
                Some(Err(e)) => ExitDecision::NoData {
                    reason: e.to_string(),
                },
                None => ExitDecision::NoData {
                    reason: "not fetched".into(),
                },
            };
            tracing::info!(symbol = %position.ticker, stop = position.stop, ?decision, "exit check");
            ExitReview { position, decision }
        })
        .collect();

    let delivered = deliver(ctx.notifier, &report::exit_report(&reviews, today));
    Ok(ExitOutcome { reviews, delivered })
}

fn decide_exit(
    position: &SavedPosition,
    supertrend: &SupertrendOutput,
    close: Option<f64>,
) -> ExitDecision {
    let Some(close) = close.filter(|c| !c.is_nan()) else {
        return ExitDecision::NoData {
            reason: "no closing price".into(),
        };
    };
    if position.stop_hit(close) {
        return ExitDecision::Exit {
            reason: ExitReason::StopHit,
            close,
        };
    }
    // A void bar ends the SuperTrend series; an unknown direction is no basis
    // for holding.
    match supertrend.last_direction() {
        Some(TrendDirection::Down) => ExitDecision::Exit {
            reason: ExitReason::TrendFlip,
            close,
        },
        Some(TrendDirection::Up) => ExitDecision::Hold { close },
        None => ExitDecision::NoData {
            reason: "SuperTrend undefined".into(),
        },
    }
}

/// Run one ticker through download, validation and the entry rules.
/// Nothing is sent or saved.
pub fn probe(
    ctx: &ScanContext<'_>,
    symbol: &str,
    today: NaiveDate,
) -> Result<Candidate, ProbeFailure> {
    let cfg = ctx.config;
    let bars = ctx
        .provider
        .fetch(symbol, ctx.history_start(today), today, cfg.interval)?;
    validate_series(&bars, today, &cfg.validation)?;
    Ok(screen::evaluate(symbol, ctx.universe.sector_of(symbol), &bars, cfg)?)
}
