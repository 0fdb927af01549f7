//! Parallel per-ticker downloads on a private rayon pool.

use chrono::NaiveDate;
use rayon::prelude::*;

use super::provider::{BarInterval, DataError, DataProvider};
use crate::domain::Bar;

/// One ticker's download outcome.
pub type FetchResult = (String, Result<Vec<Bar>, DataError>);

/// Fetch every symbol with at most `workers` requests in flight.
///
/// Completion order is not meaningful; the output is sorted by symbol.
/// Once the provider reports itself unavailable (circuit breaker open) the
/// remaining symbols fail fast with [`DataError::CircuitBreakerTripped`].
pub fn fetch_all<S: AsRef<str> + Sync>(
    provider: &dyn DataProvider,
    symbols: &[S],
    start: NaiveDate,
    end: NaiveDate,
    interval: BarInterval,
    workers: usize,
) -> Vec<FetchResult> {
    let task = |symbol: &S| -> FetchResult {
        let symbol = symbol.as_ref();
        if !provider.is_available() {
            return (symbol.to_string(), Err(DataError::CircuitBreakerTripped));
        }
        let result = provider.fetch(symbol, start, end, interval);
        if let Err(ref e) = result {
            tracing::warn!(symbol, error = %e, "download failed, skipping ticker");
        }
        (symbol.to_string(), result)
    };

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(workers.max(1))
        .thread_name(|i| format!("trendscan-fetch-{i}"))
        .build();

    let mut results: Vec<FetchResult> = match pool {
        Ok(pool) => pool.install(|| symbols.par_iter().map(task).collect()),
        Err(e) => {
            tracing::warn!(error = %e, "could not build fetch pool, downloading sequentially");
            symbols.iter().map(task).collect()
        }
    };

    results.sort_by(|a, b| a.0.cmp(&b.0));

    let ok = results.iter().filter(|(_, r)| r.is_ok()).count();
    tracing::info!(
        provider = provider.name(),
        requested = symbols.len(),
        ok,
        failed = results.len() - ok,
        "fetch complete"
    );
    results
}
