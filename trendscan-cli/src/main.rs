//! trendscan CLI: weekly SuperTrend screener.
//!
//! Commands:
//! - `auto` (default): entry scan or exit check, picked by today's weekday
//! - `entry`: run the entry scan now
//! - `exit`: run the exit check now
//! - `probe TICKER...`: analyse tickers and print the outcome; nothing is sent or saved
//! - `universe`: print the resolved ticker universe

use anyhow::{Context, Result};
use chrono::{Datelike, NaiveDate};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use trendscan_core::data::{resolve_universe, CircuitBreaker, Universe, YahooProvider};
use trendscan_core::notify::{notifier_from_config, LogNotifier, Notifier};
use trendscan_core::positions::PositionStore;
use trendscan_core::scan::{self, ScanContext};
use trendscan_core::{RunMode, ScanConfig};

/// HTTP plumbing that floods debug output.
const NOISY_MODULES: &[&str] = &["hyper", "hyper_util", "reqwest", "h2", "rustls", "html5ever", "selectors"];

#[derive(Parser)]
#[command(
    name = "trendscan",
    version,
    about = "trendscan: weekly SuperTrend stock screener"
)]
struct Cli {
    /// Path to a TOML config file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log the report instead of sending it, and never write the positions file.
    #[arg(long, global = true, default_value_t = false)]
    dry_run: bool,

    /// Pretend today is this date (YYYY-MM-DD).
    #[arg(long, global = true)]
    date: Option<NaiveDate>,

    /// Debug-level logging (RUST_LOG overrides).
    #[arg(short, long, global = true, default_value_t = false)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Pick entry scan or exit check from the weekday.
    Auto,
    /// Run the entry scan regardless of weekday.
    Entry,
    /// Run the exit check regardless of weekday.
    Exit,
    /// Analyse tickers without sending or saving anything.
    Probe {
        #[arg(required = true)]
        tickers: Vec<String>,
    },
    /// Print the resolved universe.
    Universe,
}

fn init_logging(verbose: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let mut directives = String::from(if verbose { "debug" } else { "info" });
        for module in NOISY_MODULES {
            directives.push_str(&format!(",{module}=warn"));
        }
        EnvFilter::new(directives)
    });
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = ScanConfig::load(cli.config.as_deref()).context("loading configuration")?;
    let today = cli.date.unwrap_or_else(|| chrono::Local::now().date_naive());

    match cli.command.unwrap_or(Commands::Auto) {
        Commands::Auto => {
            let mode = RunMode::for_weekday(today.weekday(), &config.schedule);
            tracing::info!(%today, weekday = %today.weekday(), ?mode, "dispatching");
            run_mode(mode, &config, today, cli.dry_run)
        }
        Commands::Entry => run_mode(RunMode::Entry, &config, today, cli.dry_run),
        Commands::Exit => run_mode(RunMode::ExitCheck, &config, today, cli.dry_run),
        Commands::Probe { tickers } => run_probe(&config, &tickers, today),
        Commands::Universe => print_universe(&config),
    }
}

fn build_provider(config: &ScanConfig) -> Result<YahooProvider> {
    let circuit_breaker = Arc::new(CircuitBreaker::default_provider());
    Ok(YahooProvider::new(circuit_breaker, config.max_retries)?)
}

fn build_notifier(config: &ScanConfig, dry_run: bool) -> Result<Box<dyn Notifier>> {
    if dry_run {
        return Ok(Box::new(LogNotifier));
    }
    Ok(notifier_from_config(&config.notify)?)
}

fn run_mode(mode: RunMode, config: &ScanConfig, today: NaiveDate, dry_run: bool) -> Result<()> {
    let universe = match mode {
        RunMode::Idle => {
            tracing::info!(
                entry = %config.schedule.entry_weekday,
                exit = %config.schedule.exit_weekday,
                "nothing scheduled today"
            );
            return Ok(());
        }
        RunMode::Entry => resolve_universe(&config.universe).context("resolving universe")?,
        RunMode::ExitCheck => Universe::default(),
    };

    let provider = build_provider(config)?;
    let notifier = build_notifier(config, dry_run)?;
    let store = PositionStore::new(&config.positions_file);
    let ctx = ScanContext {
        config,
        provider: &provider,
        notifier: notifier.as_ref(),
        universe: &universe,
        store: &store,
        persist: !dry_run,
    };

    if mode == RunMode::Entry {
        let outcome = scan::run_entry_scan(&ctx, today)?;
        println!(
            "Entry scan: {} scanned, {} skipped, {} qualified, {} selected",
            outcome.scanned,
            outcome.skipped,
            outcome.qualified,
            outcome.selected.len()
        );
        for c in &outcome.selected {
            println!(
                "  {:<6} {:<14} price {:>9.2}  stop {:>9.2}  shares {:>6}  r {:.2}",
                c.ticker, c.sector, c.price, c.stop, c.shares, c.r_score
            );
        }
        if outcome.saved {
            println!("Positions saved to {}", store.path().display());
        }
        report_delivery(outcome.delivered);
    } else {
        let outcome = scan::run_exit_check(&ctx, today)?;
        if outcome.reviews.is_empty() {
            println!("No saved positions in {}", store.path().display());
            return Ok(());
        }
        for review in &outcome.reviews {
            println!("  {:<6} {:?}", review.position.ticker, review.decision);
        }
        println!(
            "Exit check: {} position(s), {} exit signal(s)",
            outcome.reviews.len(),
            outcome.exits().count()
        );
        report_delivery(outcome.delivered);
    }
    Ok(())
}

fn report_delivery(delivered: bool) {
    if delivered {
        println!("Notification sent");
    } else {
        eprintln!("Notification could not be sent (see log)");
    }
}

fn run_probe(config: &ScanConfig, tickers: &[String], today: NaiveDate) -> Result<()> {
    let universe = resolve_universe(&config.universe).unwrap_or_else(|e| {
        tracing::warn!(error = %e, "universe unavailable, sectors will be unclassified");
        Universe::default()
    });
    let provider = build_provider(config)?;
    let store = PositionStore::new(&config.positions_file);
    let ctx = ScanContext {
        config,
        provider: &provider,
        notifier: &LogNotifier,
        universe: &universe,
        store: &store,
        persist: false,
    };

    for ticker in tickers {
        let ticker = ticker.trim().to_uppercase();
        match scan::probe(&ctx, &ticker, today) {
            Ok(c) => println!(
                "✅ {}: price {:.2}, stop {:.2}, ATR {:.2}, shares {}, position {:.0}, risk {:.0}, r-score {:.2}",
                c.ticker, c.price, c.stop, c.atr, c.shares, c.position_value, c.actual_risk, c.r_score
            ),
            Err(reason) => println!("❌ {ticker}: {reason}"),
        }
    }
    Ok(())
}

fn print_universe(config: &ScanConfig) -> Result<()> {
    let universe = resolve_universe(&config.universe).context("resolving universe")?;
    for (sector, tickers) in &universe.sectors {
        println!("{sector} ({}): {}", tickers.len(), tickers.join(", "));
    }
    println!(
        "{} tickers in {} sectors",
        universe.ticker_count(),
        universe.sectors.len()
    );
    Ok(())
}
