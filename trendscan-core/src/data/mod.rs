//! Market data: universe resolution, provider access, downloads and checks.

pub mod circuit_breaker;
pub mod fetch;
pub mod index_scrape;
pub mod provider;
pub mod universe;
pub mod validate;
pub mod yahoo;

pub use circuit_breaker::CircuitBreaker;
pub use fetch::{fetch_all, FetchResult};
pub use index_scrape::{Constituent, ScrapeError};
pub use provider::{BarInterval, DataError, DataProvider};
pub use universe::{resolve_universe, Universe, UniverseError, UniverseSource};
pub use validate::{validate_series, ValidationIssue, ValidationRules};
pub use yahoo::YahooProvider;
