//! On-disk store backed by fjall
//!
//! Values are postcard-encoded. The forecast set of a place is a single
//! value keyed by geoid, so replacing it is one atomic insert.

use async_trait::async_trait;
use chrono::NaiveDateTime;
use fjall::{Database, Keyspace};
use serde::{Serialize, de::DeserializeOwned};
use std::collections::BTreeMap;
use std::path::Path;
use tokio::task;

use super::{ForecastStore, PlaceStore, dedup_by_time_from, select_from};
use crate::Result;
use crate::models::{ForecastEntry, Place, ScheduleInfo};

type ForecastSet = BTreeMap<NaiveDateTime, ForecastEntry>;

pub struct PersistentStore {
    db: Database,
    places: Keyspace,
    /// `country/link` -> geoid
    links: Keyspace,
    schedules: Keyspace,
    forecasts: Keyspace,
}

fn get_from_store(store: Keyspace, key: Vec<u8>) -> Result<Option<Vec<u8>>> {
    Ok(store.get(key)?.map(|v| v.to_vec()))
}

fn link_key(country: &str, link: &str) -> String {
    format!("{country}/{link}")
}

impl PersistentStore {
    /// Opens (or creates) the store under `path`.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let db = fjall::Database::builder(&path).open()?;
        let places = db.keyspace("places", fjall::KeyspaceCreateOptions::default)?;
        let links = db.keyspace("links", fjall::KeyspaceCreateOptions::default)?;
        let schedules = db.keyspace("schedules", fjall::KeyspaceCreateOptions::default)?;
        let forecasts = db.keyspace("forecasts", fjall::KeyspaceCreateOptions::default)?;
        tracing::debug!(path = %path.as_ref().display(), "Opened forecast store");
        Ok(Self {
            db,
            places,
            links,
            schedules,
            forecasts,
        })
    }

    async fn put<T: Serialize>(store: &Keyspace, key: &str, value: &T) -> Result<()> {
        let store = store.clone();
        let key = key.as_bytes().to_vec();
        let bytes = postcard::to_stdvec(value)?;
        task::spawn_blocking(move || store.insert(key, bytes)).await??;
        Ok(())
    }

    async fn fetch<T: DeserializeOwned>(store: &Keyspace, key: &str) -> Result<Option<T>> {
        let store = store.clone();
        let key = key.as_bytes().to_vec();
        let maybe_bytes = task::spawn_blocking(move || get_from_store(store, key)).await??;
        match maybe_bytes {
            Some(bytes) => Ok(Some(postcard::from_bytes(&bytes)?)),
            None => Ok(None),
        }
    }
}

#[async_trait]
impl PlaceStore for PersistentStore {
    #[tracing::instrument(level = "debug", skip(self))]
    async fn get_place(&self, geoid: &str) -> Result<Option<Place>> {
        Self::fetch(&self.places, geoid).await
    }

    #[tracing::instrument(level = "debug", skip(self, place), fields(geoid = %place.geoid))]
    async fn upsert_place(&self, place: Place) -> Result<()> {
        let new_link = link_key(&place.country, &place.link);
        let previous: Option<Place> = Self::fetch(&self.places, &place.geoid).await?;

        // The old index entry may already belong to another place
        let mut stale_link = None;
        if let Some(previous) = previous {
            let old_link = link_key(&previous.country, &previous.link);
            if old_link != new_link {
                let owner: Option<String> = Self::fetch(&self.links, &old_link).await?;
                if owner.as_deref() == Some(place.geoid.as_str()) {
                    stale_link = Some(old_link);
                }
            }
        }

        let place_bytes = postcard::to_stdvec(&place)?;
        let geoid_bytes = postcard::to_stdvec(&place.geoid)?;
        let geoid_key = place.geoid.into_bytes();
        let db = self.db.clone();
        let places = self.places.clone();
        let links = self.links.clone();
        task::spawn_blocking(move || {
            let mut batch = db.batch();
            if let Some(old_link) = stale_link {
                batch.remove(&links, old_link.into_bytes());
            }
            batch.insert(&places, geoid_key, place_bytes);
            batch.insert(&links, new_link.into_bytes(), geoid_bytes);
            batch.commit()
        })
        .await??;
        Ok(())
    }

    #[tracing::instrument(level = "debug", skip(self))]
    async fn find_by_link(&self, country: &str, link: &str) -> Result<Option<Place>> {
        let geoid: Option<String> = Self::fetch(&self.links, &link_key(country, link)).await?;
        match geoid {
            Some(geoid) => self.get_place(&geoid).await,
            None => Ok(None),
        }
    }
}

#[async_trait]
impl ForecastStore for PersistentStore {
    #[tracing::instrument(level = "debug", skip(self))]
    async fn schedule_info(&self, geoid: &str) -> Result<Option<ScheduleInfo>> {
        Self::fetch(&self.schedules, geoid).await
    }

    #[tracing::instrument(level = "debug", skip(self))]
    async fn replace_schedule_info(&self, geoid: &str, info: ScheduleInfo) -> Result<()> {
        Self::put(&self.schedules, geoid, &info).await
    }

    #[tracing::instrument(level = "debug", skip(self))]
    async fn list_forecasts(&self, geoid: &str, from: NaiveDateTime) -> Result<Vec<ForecastEntry>> {
        let set: Option<ForecastSet> = Self::fetch(&self.forecasts, geoid).await?;
        Ok(set.map(|set| select_from(&set, from)).unwrap_or_default())
    }

    #[tracing::instrument(level = "debug", skip(self, entries), fields(count = entries.len()))]
    async fn replace_all_forecasts(&self, geoid: &str, entries: Vec<ForecastEntry>) -> Result<()> {
        let set = dedup_by_time_from(entries);
        Self::put(&self.forecasts, geoid, &set).await
    }
}
