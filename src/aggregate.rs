//! Grouping of stored forecasts into days and time ranges

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::Result;
use crate::models::ForecastEntry;
use crate::store::ForecastStore;

/// Forecast values of one time range.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForecastSlot {
    pub period: String,
    pub symbol: String,
    pub precipitation: f64,
    pub wind_direction: i32,
    pub wind_speed: f64,
    pub temperature: i32,
    pub pressure: i32,
    /// The range ends on the following calendar day. It is still filed
    /// under the day it starts on.
    pub ends_next_day: bool,
}

/// `"HH:MM-HH:MM"` -> values, for one day.
pub type DayForecasts = BTreeMap<String, ForecastSlot>;

/// Local date -> that day's time ranges, in date order.
pub type DailyForecasts = BTreeMap<NaiveDate, DayForecasts>;

impl From<&ForecastEntry> for ForecastSlot {
    fn from(entry: &ForecastEntry) -> Self {
        Self {
            period: entry.period.clone(),
            symbol: entry.symbol.clone(),
            precipitation: entry.precipitation,
            wind_direction: entry.wind_direction,
            wind_speed: entry.wind_speed,
            temperature: entry.temperature,
            pressure: entry.pressure,
            ends_next_day: entry.time_to.date() != entry.time_from.date(),
        }
    }
}

pub struct ForecastAggregator {
    store: Arc<dyn ForecastStore>,
}

impl ForecastAggregator {
    pub fn new(store: Arc<dyn ForecastStore>) -> Self {
        Self { store }
    }

    /// Forecasts of `geoid` from the current local time onward.
    ///
    /// `days` limits the number of calendar days (0 for all). Without
    /// `detailed`, days after the first keep only their representative
    /// (period `2`) entry.
    #[tracing::instrument(level = "debug", skip(self))]
    pub async fn get_forecasts(
        &self,
        geoid: &str,
        utc_offset: i32,
        days: u32,
        detailed: bool,
        now: DateTime<Utc>,
    ) -> Result<DailyForecasts> {
        let local_now = (now + Duration::minutes(i64::from(utc_offset))).naive_utc();
        let entries = self.store.list_forecasts(geoid, local_now).await?;
        Ok(select(&entries, days, detailed))
    }
}

/// Applies the day selection to entries already limited to
/// `time_to >= local now` and ordered by `time_from`.
#[must_use]
pub fn select(entries: &[ForecastEntry], days: u32, detailed: bool) -> DailyForecasts {
    let mut daily = DailyForecasts::new();
    let Some(first) = entries.first() else {
        return daily;
    };

    let anchor = first.time_from.date();
    let tomorrow = anchor
        .succ_opt()
        .map_or(NaiveDateTime::MAX, |day| day.and_time(NaiveTime::MIN));
    let until = last_moment(anchor, days);
    let within = |entry: &&ForecastEntry| until.is_none_or(|until| entry.time_from <= until);

    let selected: Vec<&ForecastEntry> = if detailed {
        entries.iter().filter(within).collect()
    } else {
        let anchor_day = entries
            .iter()
            .take_while(|entry| entry.time_from.date() == anchor);
        let following = entries
            .iter()
            .filter(|_| days != 1)
            .filter(|entry| entry.time_from >= tomorrow && entry.is_representative())
            .filter(within);
        anchor_day.chain(following).collect()
    };

    for entry in selected {
        daily
            .entry(entry.time_from.date())
            .or_default()
            .insert(entry.time_range(), ForecastSlot::from(entry));
    }
    daily
}

/// 23:59:59 on the last of `days` days starting at `anchor`.
fn last_moment(anchor: NaiveDate, days: u32) -> Option<NaiveDateTime> {
    if days == 0 {
        return None;
    }
    let last_day = anchor
        .checked_add_days(chrono::Days::new(u64::from(days - 1)))
        .unwrap_or(NaiveDate::MAX);
    last_day.and_hms_opt(23, 59, 59)
}
