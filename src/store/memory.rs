//! In-process store

use async_trait::async_trait;
use chrono::NaiveDateTime;
use std::collections::{BTreeMap, HashMap};
use tokio::sync::RwLock;

use super::{ForecastStore, PlaceStore, dedup_by_time_from, select_from};
use crate::Result;
use crate::models::{ForecastEntry, Place, ScheduleInfo};

type ForecastSet = BTreeMap<NaiveDateTime, ForecastEntry>;

#[derive(Debug, Default)]
pub struct MemoryStore {
    places: RwLock<HashMap<String, Place>>,
    schedules: RwLock<HashMap<String, ScheduleInfo>>,
    forecasts: RwLock<HashMap<String, ForecastSet>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PlaceStore for MemoryStore {
    async fn get_place(&self, geoid: &str) -> Result<Option<Place>> {
        Ok(self.places.read().await.get(geoid).cloned())
    }

    async fn upsert_place(&self, place: Place) -> Result<()> {
        self.places.write().await.insert(place.geoid.clone(), place);
        Ok(())
    }

    async fn find_by_link(&self, country: &str, link: &str) -> Result<Option<Place>> {
        Ok(self
            .places
            .read()
            .await
            .values()
            .find(|place| place.country == country && place.link == link)
            .cloned())
    }
}

#[async_trait]
impl ForecastStore for MemoryStore {
    async fn schedule_info(&self, geoid: &str) -> Result<Option<ScheduleInfo>> {
        Ok(self.schedules.read().await.get(geoid).copied())
    }

    async fn replace_schedule_info(&self, geoid: &str, info: ScheduleInfo) -> Result<()> {
        self.schedules.write().await.insert(geoid.to_string(), info);
        Ok(())
    }

    async fn list_forecasts(&self, geoid: &str, from: NaiveDateTime) -> Result<Vec<ForecastEntry>> {
        Ok(self
            .forecasts
            .read()
            .await
            .get(geoid)
            .map(|set| select_from(set, from))
            .unwrap_or_default())
    }

    async fn replace_all_forecasts(&self, geoid: &str, entries: Vec<ForecastEntry>) -> Result<()> {
        let set = dedup_by_time_from(entries);
        self.forecasts.write().await.insert(geoid.to_string(), set);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PlaceStatus;
    use chrono::NaiveDate;

    fn entry(day: u32, hour: u32) -> ForecastEntry {
        let from = NaiveDate::from_ymd_opt(2013, 10, day)
            .unwrap()
            .and_hms_opt(hour, 0, 0)
            .unwrap();
        ForecastEntry {
            geoid: "geonames_1".to_string(),
            time_from: from,
            time_to: from + chrono::Duration::hours(6),
            period: "2".to_string(),
            symbol: "01d".to_string(),
            precipitation: 0.0,
            wind_direction: 180,
            wind_speed: 2.0,
            temperature: 10,
            pressure: 1010,
        }
    }

    #[tokio::test]
    async fn test_replace_all_is_idempotent() {
        let store = MemoryStore::new();
        let entries = vec![entry(7, 12), entry(8, 12), entry(7, 12)];
        store.replace_all_forecasts("geonames_1", entries.clone()).await.unwrap();
        store.replace_all_forecasts("geonames_1", entries).await.unwrap();

        let from = NaiveDate::from_ymd_opt(2013, 10, 1).unwrap().and_hms_opt(0, 0, 0).unwrap();
        let stored = store.list_forecasts("geonames_1", from).await.unwrap();
        assert_eq!(stored.len(), 2);
        assert!(stored[0].time_from < stored[1].time_from);
    }

    #[tokio::test]
    async fn test_replace_all_drops_old_entries() {
        let store = MemoryStore::new();
        store.replace_all_forecasts("geonames_1", vec![entry(7, 6)]).await.unwrap();
        store.replace_all_forecasts("geonames_1", vec![entry(8, 6)]).await.unwrap();

        let from = NaiveDate::from_ymd_opt(2013, 10, 1).unwrap().and_hms_opt(0, 0, 0).unwrap();
        let stored = store.list_forecasts("geonames_1", from).await.unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].time_from.date(), NaiveDate::from_ymd_opt(2013, 10, 8).unwrap());
    }

    #[tokio::test]
    async fn test_list_filters_on_time_to() {
        let store = MemoryStore::new();
        store
            .replace_all_forecasts("geonames_1", vec![entry(7, 0), entry(7, 6), entry(7, 12)])
            .await
            .unwrap();
        // 06:00-12:00 ends exactly at the bound and is kept.
        let from = NaiveDate::from_ymd_opt(2013, 10, 7).unwrap().and_hms_opt(12, 0, 0).unwrap();
        let stored = store.list_forecasts("geonames_1", from).await.unwrap();
        assert_eq!(stored.len(), 2);
    }

    #[tokio::test]
    async fn test_find_by_link() {
        let store = MemoryStore::new();
        store
            .upsert_place(Place {
                geoid: "geonames_2911298".to_string(),
                latitude: 53.57532,
                longitude: 10.01534,
                country: "Germany".to_string(),
                name: "Hamburg".to_string(),
                link: "Hamburg/Hamburg".to_string(),
                status: PlaceStatus::Original,
            })
            .await
            .unwrap();

        let found = store.find_by_link("Germany", "Hamburg/Hamburg").await.unwrap();
        assert_eq!(found.map(|p| p.geoid).as_deref(), Some("geonames_2911298"));
        assert!(store.find_by_link("Germany", "Hamburg").await.unwrap().is_none());
    }
}
