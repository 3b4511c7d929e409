//! Entry point tying freshness checks, aggregation and presentation together

use serde::Serialize;
use std::sync::Arc;

use crate::Result;
use crate::aggregate::{DailyForecasts, ForecastAggregator};
use crate::clock::Clock;
use crate::error::WeatherError;
use crate::fetcher::{ForecastFetcher, Freshness};
use crate::models::Place;
use crate::presenter::{Presenter, WeatherReport};

/// Forecasts of a place together with how fresh they are.
#[derive(Debug, Clone, Serialize)]
pub struct Weather {
    pub geoid: String,
    pub utc_offset: i32,
    pub forecasts: DailyForecasts,
    pub fetch_succeeded: bool,
    pub warning: Option<String>,
}

pub struct WeatherService {
    fetcher: ForecastFetcher,
    aggregator: ForecastAggregator,
    clock: Arc<dyn Clock>,
}

impl WeatherService {
    pub fn new(fetcher: ForecastFetcher, clock: Arc<dyn Clock>) -> Self {
        let aggregator = ForecastAggregator::new(fetcher.forecasts().clone());
        Self {
            fetcher,
            aggregator,
            clock,
        }
    }

    /// Refreshes the place if due, then reads its forecasts. A failed
    /// refresh still returns whatever is stored.
    pub async fn get_weather(&self, geoid: &str, days: u32, detailed: bool) -> Result<Weather> {
        let now = self.clock.now();
        let Freshness {
            schedule,
            fetch_succeeded,
            warning,
            ..
        } = self.fetcher.ensure_fresh(geoid, now).await?;

        let forecasts = self
            .aggregator
            .get_forecasts(geoid, schedule.utc_offset, days, detailed, now)
            .await?;

        Ok(Weather {
            geoid: geoid.to_string(),
            utc_offset: schedule.utc_offset,
            forecasts,
            fetch_succeeded,
            warning,
        })
    }

    /// [`Self::get_weather`] rendered for display.
    pub async fn report(
        &self,
        geoid: &str,
        days: u32,
        detailed: bool,
        presenter: &Presenter,
    ) -> Result<WeatherReport> {
        let weather = self.get_weather(geoid, days, detailed).await?;
        let place = self
            .fetcher
            .places()
            .get_place(geoid)
            .await?
            .ok_or_else(|| WeatherError::not_found(geoid))?;
        presenter.render(&place, &weather.forecasts, weather.utc_offset, weather.warning)
    }

    pub async fn add_place(&self, url: &str) -> Result<Place> {
        self.fetcher.add_place_from_url(url).await
    }

    /// Registers a known place without downloading anything.
    pub async fn seed_place(&self, place: Place) -> Result<()> {
        self.fetcher.places().upsert_place(place).await
    }

    pub async fn refresh(&self, geoids: &[String]) -> Vec<(String, Result<Freshness>)> {
        self.fetcher.sweep(geoids, self.clock.now()).await
    }
}
