//! Sunrise and sunset for a place and day

use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};
use serde::Serialize;
use std::fmt;
use sunrise::{Coordinates, SolarDay, SolarEvent};

use crate::Result;
use crate::error::WeatherError;

/// Sun events of one local day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SunInfo {
    /// Local `HH:MM` times, rounded to the nearest minute
    Times { sunrise: String, sunset: String },
    /// The sun stays above the horizon
    PolarDay,
    /// The sun stays below the horizon
    PolarNight,
}

impl fmt::Display for SunInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SunInfo::Times { sunrise, sunset } => write!(f, "Sunrise: {sunrise}, sunset: {sunset}"),
            SunInfo::PolarDay => f.write_str("No sunset, polar day"),
            SunInfo::PolarNight => f.write_str("No sunrise, polar night"),
        }
    }
}

/// Computes sun events for `date` at the given position, reported in the
/// local time given by `utc_offset` minutes.
pub fn sun_info(date: NaiveDate, latitude: f64, longitude: f64, utc_offset: i32) -> Result<SunInfo> {
    let coordinates = Coordinates::new(latitude, longitude).ok_or_else(|| {
        WeatherError::validation(format!("Invalid coordinates: lat={latitude}, lon={longitude}"))
    })?;
    let solar_day = SolarDay::new(coordinates, date);

    match (
        solar_day.event_time(SolarEvent::Sunrise),
        solar_day.event_time(SolarEvent::Sunset),
    ) {
        (Some(sunrise), Some(sunset)) => Ok(SunInfo::Times {
            sunrise: local_minutes(sunrise, utc_offset),
            sunset: local_minutes(sunset, utc_offset),
        }),
        _ if noon_altitude(date, latitude) > 0.0 => Ok(SunInfo::PolarDay),
        _ => Ok(SunInfo::PolarNight),
    }
}

fn local_minutes(time: DateTime<Utc>, utc_offset: i32) -> String {
    let seconds = time.timestamp();
    let rounded = (seconds as f64 / 60.0).round() as i64 * 60;
    let local = DateTime::<Utc>::from_timestamp(rounded, 0).unwrap_or(time)
        + Duration::minutes(i64::from(utc_offset));
    local.format("%H:%M").to_string()
}

/// Approximate solar altitude at local noon, in degrees.
fn noon_altitude(date: NaiveDate, latitude: f64) -> f64 {
    let day_of_year = f64::from(date.ordinal());
    let declination = -23.44 * (360.0 / 365.0 * (day_of_year + 10.0)).to_radians().cos();
    90.0 - (latitude - declination).abs()
}
