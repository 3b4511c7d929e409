//! Storage capabilities used by the refresh pipeline
//!
//! Two implementations are provided: [`MemoryStore`] for tests and
//! short-lived processes, and [`PersistentStore`] on top of fjall.

use async_trait::async_trait;
use chrono::NaiveDateTime;

use crate::Result;
use crate::models::{ForecastEntry, Place, ScheduleInfo};

pub mod memory;
pub mod persistent;

pub use memory::MemoryStore;
pub use persistent::PersistentStore;

#[async_trait]
pub trait PlaceStore: Send + Sync {
    async fn get_place(&self, geoid: &str) -> Result<Option<Place>>;

    /// Insert or overwrite the place keyed by its geoid.
    async fn upsert_place(&self, place: Place) -> Result<()>;

    /// Place whose feed lives at `country`/`link`, if any.
    async fn find_by_link(&self, country: &str, link: &str) -> Result<Option<Place>>;
}

#[async_trait]
pub trait ForecastStore: Send + Sync {
    async fn schedule_info(&self, geoid: &str) -> Result<Option<ScheduleInfo>>;

    /// Replace the whole schedule record of `geoid`.
    async fn replace_schedule_info(&self, geoid: &str, info: ScheduleInfo) -> Result<()>;

    /// Entries of `geoid` with `time_to >= from`, ordered by `time_from`.
    async fn list_forecasts(&self, geoid: &str, from: NaiveDateTime) -> Result<Vec<ForecastEntry>>;

    /// Drop every entry of `geoid` and store `entries` instead, one per
    /// `time_from`. Readers never observe a partial replacement.
    async fn replace_all_forecasts(&self, geoid: &str, entries: Vec<ForecastEntry>) -> Result<()>;
}

/// Keys a forecast set by `time_from`; later duplicates win.
pub(crate) fn dedup_by_time_from(
    entries: Vec<ForecastEntry>,
) -> std::collections::BTreeMap<NaiveDateTime, ForecastEntry> {
    entries
        .into_iter()
        .map(|entry| (entry.time_from, entry))
        .collect()
}

pub(crate) fn select_from(
    entries: &std::collections::BTreeMap<NaiveDateTime, ForecastEntry>,
    from: NaiveDateTime,
) -> Vec<ForecastEntry> {
    entries
        .values()
        .filter(|entry| entry.time_to >= from)
        .cloned()
        .collect()
}
