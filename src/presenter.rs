//! Display payload for a place's forecast

use chrono::NaiveDate;
use serde::Serialize;
use std::fmt;
use std::path::PathBuf;

use crate::Result;
use crate::aggregate::{DailyForecasts, ForecastSlot};
use crate::condition::{IconResolver, condition_label};
use crate::config::DisplayConfig;
use crate::feed::url::place_page_url;
use crate::models::Place;
use crate::sun::{SunInfo, sun_info};
use crate::units::{format_pressure, format_temperature, format_wind, format_windchill};

#[derive(Debug, Clone, Serialize)]
pub struct WeatherReport {
    pub geoid: String,
    pub name: String,
    /// Place page on yr.no
    pub link: String,
    pub utc_offset: i32,
    pub days: Vec<DayReport>,
    /// Set when the latest download attempt failed
    pub warning: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DayReport {
    pub date: NaiveDate,
    pub label: String,
    pub sun: Option<SunInfo>,
    pub time_ranges: Vec<SlotReport>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SlotReport {
    pub time_range: String,
    pub condition: &'static str,
    pub icon: PathBuf,
    pub temperature: String,
    pub windchill: Option<String>,
    pub precipitation: String,
    pub pressure: String,
    pub wind: String,
}

pub struct Presenter {
    display: DisplayConfig,
    icons: IconResolver,
    base_url: String,
}

impl Presenter {
    pub fn new(display: DisplayConfig, base_url: impl Into<String>) -> Self {
        let icons = IconResolver::new(
            display.image_directory.clone(),
            display.default_image_directory.clone(),
        );
        Self {
            display,
            icons,
            base_url: base_url.into(),
        }
    }

    pub fn render(
        &self,
        place: &Place,
        forecasts: &DailyForecasts,
        utc_offset: i32,
        warning: Option<String>,
    ) -> Result<WeatherReport> {
        let mut days = Vec::with_capacity(forecasts.len());
        for (position, (date, slots)) in forecasts.iter().enumerate() {
            let sun = if self.display.show_sunrise_sunset {
                Some(sun_info(*date, place.latitude, place.longitude, utc_offset)?)
            } else {
                None
            };
            days.push(DayReport {
                date: *date,
                label: day_label(*date, position),
                sun,
                time_ranges: slots
                    .iter()
                    .map(|(range, slot)| self.slot(range, slot))
                    .collect(),
            });
        }

        Ok(WeatherReport {
            geoid: place.geoid.clone(),
            name: place.name.clone(),
            link: place_page_url(&self.base_url, &place.country, &place.link),
            utc_offset,
            days,
            warning,
        })
    }

    fn slot(&self, time_range: &str, slot: &ForecastSlot) -> SlotReport {
        let display = &self.display;
        SlotReport {
            time_range: time_range.to_string(),
            condition: condition_label(&slot.symbol),
            icon: self.icons.resolve(&slot.symbol),
            temperature: format_temperature(slot.temperature, display.temperature),
            windchill: if display.show_windchill_temperature {
                format_windchill(slot.temperature, slot.wind_speed, display.temperature)
            } else {
                None
            },
            precipitation: format!("{} mm", slot.precipitation),
            pressure: format_pressure(slot.pressure, display.pressure),
            wind: format_wind(
                slot.wind_direction,
                slot.wind_speed,
                display.windspeed,
                display.show_abbreviated_directions,
                display.show_directions_degree,
            ),
        }
    }
}

/// First listed day is "Today", the second "Tomorrow".
fn day_label(date: NaiveDate, position: usize) -> String {
    let formatted = date.format("%A, %B %d").to_string();
    match position {
        0 => format!("Today, {formatted}"),
        1 => format!("Tomorrow, {formatted}"),
        _ => formatted,
    }
}

impl fmt::Display for WeatherReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} ({})", self.name, self.link)?;
        if let Some(warning) = &self.warning {
            writeln!(f, "  ! {warning}")?;
        }
        for day in &self.days {
            writeln!(f)?;
            writeln!(f, "{}", day.label)?;
            if let Some(sun) = &day.sun {
                writeln!(f, "  {sun}")?;
            }
            for slot in &day.time_ranges {
                write!(
                    f,
                    "  {}  {:<32} {:>16}",
                    slot.time_range, slot.condition, slot.temperature
                )?;
                if let Some(chill) = &slot.windchill {
                    write!(f, " (feels {chill})")?;
                }
                writeln!(f)?;
                writeln!(
                    f,
                    "               {} | {} | {}",
                    slot.precipitation, slot.pressure, slot.wind
                )?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PlaceStatus;
    use crate::units::{TemperatureUnit, WindSpeedUnit};

    fn place() -> Place {
        Place {
            geoid: "geonames_2911298".to_string(),
            latitude: 53.57532,
            longitude: 10.01534,
            country: "Germany".to_string(),
            name: "Hamburg".to_string(),
            link: "Hamburg/Hamburg".to_string(),
            status: PlaceStatus::Original,
        }
    }

    fn forecasts() -> DailyForecasts {
        let slot = ForecastSlot {
            period: "2".to_string(),
            symbol: "03d".to_string(),
            precipitation: 0.3,
            wind_direction: 236,
            wind_speed: 3.4,
            temperature: 8,
            pressure: 1016,
            ends_next_day: false,
        };
        let mut daily = DailyForecasts::new();
        for day in 7..10 {
            daily
                .entry(NaiveDate::from_ymd_opt(2013, 10, day).unwrap())
                .or_default()
                .insert("12:00-18:00".to_string(), slot.clone());
        }
        daily
    }

    #[test]
    fn test_day_labels() {
        let presenter = Presenter::new(DisplayConfig::default(), "https://www.yr.no/place");
        let report = presenter.render(&place(), &forecasts(), 120, None).unwrap();
        let labels: Vec<_> = report.days.iter().map(|d| d.label.as_str()).collect();
        assert_eq!(
            labels,
            vec![
                "Today, Monday, October 07",
                "Tomorrow, Tuesday, October 08",
                "Wednesday, October 09"
            ]
        );
        assert_eq!(report.link, "https://www.yr.no/place/Germany/Hamburg/Hamburg/");
    }

    #[test]
    fn test_slot_formatting_defaults() {
        let presenter = Presenter::new(DisplayConfig::default(), "https://www.yr.no/place");
        let report = presenter.render(&place(), &forecasts(), 120, None).unwrap();
        let slot = &report.days[0].time_ranges[0];
        assert_eq!(slot.condition, "Partly cloudy");
        assert_eq!(slot.icon, PathBuf::from("images/03d.png"));
        assert_eq!(slot.temperature, "8\u{2009}°C");
        assert_eq!(slot.windchill, None);
        assert_eq!(slot.precipitation, "0.3 mm");
        assert_eq!(slot.pressure, "1016\u{2009}hPa");
        assert_eq!(slot.wind, "Light breeze, 12.2\u{2009}km/h from Southwest");
        assert!(report.days[0].sun.is_none());
    }

    #[test]
    fn test_optional_fields() {
        let display = DisplayConfig {
            temperature: TemperatureUnit::Fahrenheit,
            windspeed: WindSpeedUnit::Beaufort,
            show_sunrise_sunset: true,
            show_windchill_temperature: true,
            show_abbreviated_directions: true,
            show_directions_degree: true,
            ..DisplayConfig::default()
        };
        let presenter = Presenter::new(display, "https://www.yr.no/place");
        let report = presenter.render(&place(), &forecasts(), 120, None).unwrap();
        let slot = &report.days[0].time_ranges[0];
        assert_eq!(slot.temperature, "46\u{2009}°F");
        assert!(slot.windchill.is_some());
        assert_eq!(slot.wind, "Light breeze, Beaufort 2 from SW (236°)");
        assert!(matches!(report.days[0].sun, Some(SunInfo::Times { .. })));
    }

    #[test]
    fn test_text_rendering_mentions_warning() {
        let presenter = Presenter::new(DisplayConfig::default(), "https://www.yr.no/place");
        let report = presenter
            .render(&place(), &forecasts(), 120, Some("Download of forecast failed".into()))
            .unwrap();
        let text = report.to_string();
        assert!(text.starts_with("Hamburg (https://www.yr.no/place/Germany/Hamburg/Hamburg/)"));
        assert!(text.contains("Download of forecast failed"));
        assert!(text.contains("Tomorrow, Tuesday, October 08"));
    }
}
