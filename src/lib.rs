//! `yrweather` - forecast ingestion and formatting for yr.no place feeds
//!
//! This library downloads yr.no forecast feeds for known places, keeps them
//! fresh with a backoff-aware refresh schedule, stores the parsed results
//! and formats them in configurable units.

pub mod aggregate;
pub mod clock;
pub mod condition;
pub mod config;
pub mod error;
pub mod feed;
pub mod fetcher;
pub mod logging;
pub mod models;
pub mod presenter;
pub mod reconcile;
pub mod schedule;
pub mod service;
pub mod store;
pub mod sun;
pub mod units;

// Re-export core types for public API
pub use aggregate::{DailyForecasts, ForecastAggregator, ForecastSlot};
pub use clock::{Clock, FixedClock, SystemClock};
pub use config::WeatherConfig;
pub use error::WeatherError;
pub use feed::{DocumentFetcher, HttpFetcher};
pub use fetcher::{ForecastFetcher, Freshness};
pub use models::{ForecastEntry, Place, PlaceStatus, ScheduleInfo};
pub use presenter::{Presenter, WeatherReport};
pub use reconcile::{PlaceReconciler, Reconciliation};
pub use schedule::ScheduleController;
pub use service::{Weather, WeatherService};
pub use store::{ForecastStore, MemoryStore, PersistentStore, PlaceStore};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Core result type used throughout the library
pub type Result<T> = std::result::Result<T, WeatherError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
