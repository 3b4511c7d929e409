//! Forecast entry model

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Period code of the representative daytime bucket.
pub const REPRESENTATIVE_PERIOD: &str = "2";

/// One time bucket of a feed. Times are local to the place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastEntry {
    pub geoid: String,
    pub time_from: NaiveDateTime,
    pub time_to: NaiveDateTime,
    /// Day-part code, `"0"` (night) to `"3"` (evening)
    pub period: String,
    /// Three-character condition code, e.g. `03d`
    pub symbol: String,
    /// Millimetres
    pub precipitation: f64,
    /// Degrees, 0-359
    pub wind_direction: i32,
    /// Metres per second
    pub wind_speed: f64,
    /// Degrees Celsius
    pub temperature: i32,
    /// Hectopascal
    pub pressure: i32,
}

impl ForecastEntry {
    #[must_use]
    pub fn is_representative(&self) -> bool {
        self.period == REPRESENTATIVE_PERIOD
    }

    /// `"HH:MM-HH:MM"` label of the bucket.
    #[must_use]
    pub fn time_range(&self) -> String {
        format!(
            "{}-{}",
            self.time_from.format("%H:%M"),
            self.time_to.format("%H:%M")
        )
    }
}
