//! Unit conversion and formatting of canonical forecast values
//!
//! Stored forecasts keep temperature in °C, pressure in hPa and wind speed
//! in m/s. Everything here is pure: each formatter takes a canonical value
//! plus a unit selector and returns either a display string or the raw
//! converted number (the `*_value` variants).

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::WeatherError;

/// Thin space placed between a value and its unit.
const THIN_SPACE: char = '\u{2009}';

/// Lower bounds (m/s) of Beaufort forces 1 through 12.
const BEAUFORT_THRESHOLDS: [f64; 12] = [
    0.3, 1.6, 3.5, 5.5, 8.0, 10.8, 13.9, 17.2, 20.8, 24.5, 28.5, 32.7,
];

const BEAUFORT_DESCRIPTIONS: [&str; 13] = [
    "Calm",
    "Light air",
    "Light breeze",
    "Gentle breeze",
    "Moderate breeze",
    "Fresh breeze",
    "Strong breeze",
    "Near gale",
    "Gale",
    "Strong gale",
    "Storm",
    "Violent storm",
    "Hurricane",
];

const DIRECTIONS: [&str; 16] = [
    "North",
    "North-Northeast",
    "Northeast",
    "East-Northeast",
    "East",
    "East-Southeast",
    "Southeast",
    "South-Southeast",
    "South",
    "South-Southwest",
    "Southwest",
    "West-Southwest",
    "West",
    "West-Northwest",
    "Northwest",
    "North-Northwest",
];

const DIRECTIONS_ABBREVIATED: [&str; 16] = [
    "N", "NNE", "NE", "ENE", "E", "ESE", "SE", "SSE", "S", "SSW", "SW", "WSW", "W", "WNW", "NW",
    "NNW",
];

/// Windchill is only defined at or below this temperature (°C)...
const WINDCHILL_MAX_TEMPERATURE: i32 = 10;
/// ...and at or above this wind speed (m/s).
const WINDCHILL_MIN_WIND_SPEED: f64 = 1.34;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TemperatureUnit {
    #[default]
    Celsius,
    Fahrenheit,
    /// Celsius first, Fahrenheit in addition
    CelsiusFahrenheit,
    /// Fahrenheit first, Celsius in addition
    FahrenheitCelsius,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PressureUnit {
    #[default]
    Hpa,
    Inhg,
    Mmhg,
    Kpa,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WindSpeedUnit {
    #[default]
    Kmh,
    Mps,
    Mph,
    Knots,
    Beaufort,
}

macro_rules! unit_from_str {
    ($unit:ty, $what:literal, { $($name:literal => $variant:expr),+ $(,)? }) => {
        impl FromStr for $unit {
            type Err = WeatherError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.to_ascii_lowercase().as_str() {
                    $($name => Ok($variant),)+
                    other => Err(WeatherError::validation(format!(
                        "unknown {} unit '{}'",
                        $what, other
                    ))),
                }
            }
        }
    };
}

unit_from_str!(TemperatureUnit, "temperature", {
    "celsius" => TemperatureUnit::Celsius,
    "fahrenheit" => TemperatureUnit::Fahrenheit,
    "celsiusfahrenheit" => TemperatureUnit::CelsiusFahrenheit,
    "fahrenheitcelsius" => TemperatureUnit::FahrenheitCelsius,
});

unit_from_str!(PressureUnit, "pressure", {
    "hpa" => PressureUnit::Hpa,
    "inhg" => PressureUnit::Inhg,
    "mmhg" => PressureUnit::Mmhg,
    "kpa" => PressureUnit::Kpa,
});

unit_from_str!(WindSpeedUnit, "wind speed", {
    "kmh" => WindSpeedUnit::Kmh,
    "mps" => WindSpeedUnit::Mps,
    "mph" => WindSpeedUnit::Mph,
    "knots" => WindSpeedUnit::Knots,
    "beaufort" => WindSpeedUnit::Beaufort,
});

/// Rounds half away from zero to `decimals` places.
#[must_use]
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

/// °C to °F, truncating toward zero before the offset is added.
#[must_use]
pub fn fahrenheit(celsius: i32) -> i32 {
    (f64::from(celsius) * 9.0 / 5.0) as i32 + 32
}

/// Temperature in the primary scale of `unit`.
#[must_use]
pub fn temperature_value(celsius: i32, unit: TemperatureUnit) -> i32 {
    match unit {
        TemperatureUnit::Celsius | TemperatureUnit::CelsiusFahrenheit => celsius,
        TemperatureUnit::Fahrenheit | TemperatureUnit::FahrenheitCelsius => fahrenheit(celsius),
    }
}

#[must_use]
pub fn format_temperature(celsius: i32, unit: TemperatureUnit) -> String {
    let f = fahrenheit(celsius);
    match unit {
        TemperatureUnit::Celsius => format!("{celsius}{THIN_SPACE}°C"),
        TemperatureUnit::Fahrenheit => format!("{f}{THIN_SPACE}°F"),
        TemperatureUnit::CelsiusFahrenheit => {
            format!("{celsius}{THIN_SPACE}°C / {f}{THIN_SPACE}°F")
        }
        TemperatureUnit::FahrenheitCelsius => {
            format!("{f}{THIN_SPACE}°F / {celsius}{THIN_SPACE}°C")
        }
    }
}

/// Windchill temperature in °C, or `None` outside its defined range.
#[must_use]
pub fn windchill_celsius(temperature: i32, wind_speed: f64) -> Option<i32> {
    if temperature > WINDCHILL_MAX_TEMPERATURE || wind_speed < WINDCHILL_MIN_WIND_SPEED {
        return None;
    }
    let t = f64::from(temperature);
    let v = (wind_speed * 3.6).powf(0.16);
    let chill = 13.12 + 0.6215 * t - 11.37 * v + 0.3965 * t * v;
    Some(chill.round() as i32)
}

#[must_use]
pub fn format_windchill(temperature: i32, wind_speed: f64, unit: TemperatureUnit) -> Option<String> {
    windchill_celsius(temperature, wind_speed).map(|chill| format_temperature(chill, unit))
}

#[must_use]
pub fn pressure_value(hpa: i32, unit: PressureUnit) -> f64 {
    let hpa = f64::from(hpa);
    match unit {
        PressureUnit::Hpa => hpa,
        PressureUnit::Inhg => round_to(hpa * 0.02953, 2),
        PressureUnit::Mmhg => round_to(hpa * 0.75006, 0),
        PressureUnit::Kpa => round_to(hpa / 10.0, 1),
    }
}

#[must_use]
pub fn format_pressure(hpa: i32, unit: PressureUnit) -> String {
    let value = pressure_value(hpa, unit);
    let suffix = match unit {
        PressureUnit::Hpa => "hPa",
        PressureUnit::Inhg => "inHg",
        PressureUnit::Mmhg => "mmHg",
        PressureUnit::Kpa => "kPa",
    };
    format!("{value}{THIN_SPACE}{suffix}")
}

/// A Beaufort force with its descriptive label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Beaufort {
    pub number: u8,
    pub description: &'static str,
}

#[must_use]
pub fn beaufort(wind_speed: f64) -> Beaufort {
    let number = BEAUFORT_THRESHOLDS
        .iter()
        .take_while(|threshold| wind_speed >= **threshold)
        .count();
    Beaufort {
        number: number as u8,
        description: BEAUFORT_DESCRIPTIONS[number],
    }
}

/// Wind speed in `unit`; Beaufort yields the force number.
#[must_use]
pub fn wind_speed_value(mps: f64, unit: WindSpeedUnit) -> f64 {
    match unit {
        WindSpeedUnit::Mps => mps,
        WindSpeedUnit::Mph => round_to(mps * 2.23694, 1),
        WindSpeedUnit::Knots => round_to(mps * 1.94384, 1),
        WindSpeedUnit::Kmh => round_to(mps * 3.6, 1),
        WindSpeedUnit::Beaufort => f64::from(beaufort(mps).number),
    }
}

#[must_use]
pub fn format_wind_speed(mps: f64, unit: WindSpeedUnit) -> String {
    let value = wind_speed_value(mps, unit);
    match unit {
        WindSpeedUnit::Mps => format!("{value}{THIN_SPACE}meter/s"),
        WindSpeedUnit::Mph => format!("{value}{THIN_SPACE}mph"),
        WindSpeedUnit::Knots => format!("{value}{THIN_SPACE}knots"),
        WindSpeedUnit::Kmh => format!("{value}{THIN_SPACE}km/h"),
        WindSpeedUnit::Beaufort => format!("Beaufort {value}"),
    }
}

/// Compass bearing to one of 16 sectors, wrapping past 348.75°.
#[must_use]
pub fn bearing_to_text(bearing: f64, abbreviated: bool) -> &'static str {
    let sector = (((bearing + 11.25) / 22.5).floor() as i64).rem_euclid(16) as usize;
    if abbreviated {
        DIRECTIONS_ABBREVIATED[sector]
    } else {
        DIRECTIONS[sector]
    }
}

/// Wind description such as "Gentle breeze, 14.4 km/h from Southwest (225°)".
#[must_use]
pub fn format_wind(
    direction: i32,
    mps: f64,
    unit: WindSpeedUnit,
    abbreviated: bool,
    show_degree: bool,
) -> String {
    let text = bearing_to_text(f64::from(direction), abbreviated);
    let force = beaufort(mps);
    let speed = format_wind_speed(mps, unit);
    if show_degree {
        format!("{}, {speed} from {text} ({direction}°)", force.description)
    } else {
        format!("{}, {speed} from {text}", force.description)
    }
}
