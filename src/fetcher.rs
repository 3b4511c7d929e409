//! Keeps stored forecasts fresh
//!
//! [`ForecastFetcher::ensure_fresh`] checks a place's schedule, downloads
//! and parses its feed when due, reconciles the place record, replaces the
//! stored forecasts and moves the schedule forward. Download and parse
//! failures never escape: they push the next attempt out with backoff and
//! are reported as a warning on the returned [`Freshness`].

use chrono::{DateTime, Utc};
use futures::future::join_all;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

use crate::Result;
use crate::config::FeedConfig;
use crate::error::WeatherError;
use crate::feed::url::{feed_url_for_place_page, forecast_url, parse_place_url};
use crate::feed::{DocumentFetcher, parse_forecast};
use crate::models::{Place, ScheduleInfo};
use crate::reconcile::{PlaceReconciler, Reconciliation};
use crate::schedule::ScheduleController;
use crate::store::{ForecastStore, PlaceStore};

/// Outcome of a freshness check.
#[derive(Debug, Clone, PartialEq)]
pub struct Freshness {
    pub schedule: ScheduleInfo,
    /// False when a due download or its parsing failed.
    pub fetch_succeeded: bool,
    /// True when a download was attempted during this call.
    pub attempted: bool,
    /// Failure message meant for operators.
    pub warning: Option<String>,
}

/// Result of storing one downloaded feed.
struct Stored {
    geoid: String,
    schedule: ScheduleInfo,
    reconciliation: Reconciliation,
}

pub struct ForecastFetcher {
    places: Arc<dyn PlaceStore>,
    forecasts: Arc<dyn ForecastStore>,
    documents: Arc<dyn DocumentFetcher>,
    base_url: String,
    timeout: Duration,
    in_flight: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl ForecastFetcher {
    pub fn new(
        places: Arc<dyn PlaceStore>,
        forecasts: Arc<dyn ForecastStore>,
        documents: Arc<dyn DocumentFetcher>,
        config: &FeedConfig,
    ) -> Self {
        Self {
            places,
            forecasts,
            documents,
            base_url: config.base_url.clone(),
            timeout: Duration::from_secs(config.timeout_seconds),
            in_flight: Mutex::new(HashMap::new()),
        }
    }

    pub fn places(&self) -> &Arc<dyn PlaceStore> {
        &self.places
    }

    pub fn forecasts(&self) -> &Arc<dyn ForecastStore> {
        &self.forecasts
    }

    /// Per-geoid lock so concurrent callers share one download.
    async fn lock_for(&self, geoid: &str) -> Arc<Mutex<()>> {
        let mut in_flight = self.in_flight.lock().await;
        in_flight
            .entry(geoid.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    /// Downloads the feed of `geoid` if its schedule says so.
    ///
    /// Fails with `NotFound` when a download is due for a place the store
    /// does not know, and with `Store` errors; feed failures are absorbed.
    #[tracing::instrument(level = "debug", skip(self))]
    pub async fn ensure_fresh(&self, geoid: &str, now: DateTime<Utc>) -> Result<Freshness> {
        let lock = self.lock_for(geoid).await;
        let outcome = {
            let _guard = lock.lock().await;
            self.refresh_if_due(geoid, now).await
        };
        self.release(geoid, &lock).await;
        outcome
    }

    /// Drops the lock entry of `geoid` unless another caller is waiting on it.
    async fn release(&self, geoid: &str, lock: &Arc<Mutex<()>>) {
        let mut in_flight = self.in_flight.lock().await;
        // One reference in the map, one held by the caller
        if Arc::strong_count(lock) <= 2 {
            in_flight.remove(geoid);
        }
    }

    async fn refresh_if_due(&self, geoid: &str, now: DateTime<Utc>) -> Result<Freshness> {
        let stored = self.forecasts.schedule_info(geoid).await?;
        let info = stored.unwrap_or_else(|| ScheduleInfo::unknown(now));

        if !ScheduleController::is_due(now, stored.as_ref()) {
            debug!(next_attempt = %info.next_download_attempt, "Forecast is fresh");
            return Ok(Freshness {
                schedule: info,
                fetch_succeeded: true,
                attempted: false,
                warning: None,
            });
        }

        let place = self
            .places
            .get_place(geoid)
            .await?
            .ok_or_else(|| WeatherError::not_found(geoid))?;
        let url = forecast_url(&self.base_url, &place.country, &place.link);
        info!(%url, "Downloading forecast");

        match self.download_and_store(&url, Some(geoid)).await {
            Ok(stored) => {
                let current = self
                    .forecasts
                    .schedule_info(&stored.geoid)
                    .await?
                    .unwrap_or(stored.schedule);
                let schedule = if current.next_update <= now {
                    let backed_off = ScheduleController::backed_off(&current, now);
                    warn!(
                        next_update = %current.next_update,
                        next_attempt = %backed_off.next_download_attempt,
                        "Feed is stale, delaying next download"
                    );
                    self.forecasts
                        .replace_schedule_info(geoid, backed_off)
                        .await?;
                    backed_off
                } else {
                    current
                };
                Ok(Freshness {
                    schedule,
                    fetch_succeeded: true,
                    attempted: true,
                    warning: None,
                })
            }
            Err(err) if err.is_recoverable() => {
                error!(%geoid, error = %err, "Download of forecast failed");
                let backed_off = ScheduleController::backed_off(&info, now);
                self.forecasts
                    .replace_schedule_info(geoid, backed_off)
                    .await?;
                Ok(Freshness {
                    schedule: backed_off,
                    fetch_succeeded: false,
                    attempted: true,
                    warning: Some(format!("Download of forecast failed: {err}")),
                })
            }
            Err(err) => Err(err),
        }
    }

    /// Fetches, parses and stores one feed. `geoid` overrides the id in the
    /// document for the schedule and forecast rows.
    async fn download_and_store(&self, url: &str, geoid: Option<&str>) -> Result<Stored> {
        let document = self.documents.fetch(url, self.timeout).await?;
        let feed = parse_forecast(&document, geoid)?;

        let reconciliation = PlaceReconciler::apply(self.places.as_ref(), &feed.place).await?;
        // Forecasts go first so a failed write leaves the place due
        let count = feed.forecasts.len();
        self.forecasts
            .replace_all_forecasts(&feed.geoid, feed.forecasts)
            .await?;
        debug!(geoid = %feed.geoid, count, "Stored forecasts");
        self.forecasts
            .replace_schedule_info(&feed.geoid, feed.schedule)
            .await?;

        Ok(Stored {
            geoid: feed.geoid,
            schedule: feed.schedule,
            reconciliation,
        })
    }

    /// Adds a place from its yr.no page URL by downloading its feed.
    #[tracing::instrument(level = "debug", skip(self))]
    pub async fn add_place_from_url(&self, url: &str) -> Result<Place> {
        let feed_url = feed_url_for_place_page(url)?;
        let (country, link) = parse_place_url(&feed_url);

        for candidate in [country.clone(), country.replace('_', " ")] {
            if let Some(existing) = self.places.find_by_link(&candidate, &link).await? {
                return Err(WeatherError::validation(format!(
                    "{} already exists as {}",
                    url.trim(),
                    existing.geoid
                )));
            }
        }

        let stored = self.download_and_store(&feed_url, None).await?;
        if let Reconciliation::Update { changed, .. } = &stored.reconciliation {
            info!(geoid = %stored.geoid, ?changed, "Known place updated from added URL");
        }
        self.places
            .get_place(&stored.geoid)
            .await?
            .ok_or_else(|| WeatherError::not_found(stored.geoid))
    }

    /// Runs [`Self::ensure_fresh`] for every geoid concurrently.
    pub async fn sweep(
        &self,
        geoids: &[String],
        now: DateTime<Utc>,
    ) -> Vec<(String, Result<Freshness>)> {
        let checks = geoids.iter().map(|geoid| async move {
            (geoid.clone(), self.ensure_fresh(geoid, now).await)
        });
        join_all(checks).await
    }
}
