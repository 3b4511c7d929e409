//! Configuration management for `yrweather`
//!
//! Handles loading configuration from files, environment variables,
//! and provides validation for all configuration settings.

use crate::error::WeatherError;
use crate::units::{PressureUnit, TemperatureUnit, WindSpeedUnit};
use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct WeatherConfig {
    /// Forecast feed access
    pub feed: FeedConfig,
    /// Forecast store
    pub store: StoreConfig,
    /// Logging configuration
    pub logging: LoggingConfig,
    /// Units and optional fields of the rendered forecast
    pub display: DisplayConfig,
}

/// Feed download settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedConfig {
    /// Base URL place paths are appended to
    pub base_url: String,
    /// Request timeout in seconds
    pub timeout_seconds: u64,
    /// Retries of transient failures within one download
    pub max_retries: u32,
}

/// Store settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Directory of the on-disk store
    pub location: String,
}

/// Logging configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace)
    pub level: String,
    /// Log format (pretty or json)
    pub format: String,
}

/// Display settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    pub temperature: TemperatureUnit,
    pub windspeed: WindSpeedUnit,
    pub pressure: PressureUnit,
    pub show_sunrise_sunset: bool,
    pub show_windchill_temperature: bool,
    pub show_abbreviated_directions: bool,
    pub show_directions_degree: bool,
    /// Number of days shown, 0 for all available
    pub forecast_days: u32,
    /// Directory searched first for condition icons
    pub image_directory: Option<PathBuf>,
    /// Directory holding the bundled condition icons
    pub default_image_directory: PathBuf,
}

// Default value functions
fn default_feed_base_url() -> String {
    "https://www.yr.no/place".to_string()
}

fn default_feed_timeout() -> u64 {
    10
}

fn default_feed_max_retries() -> u32 {
    2
}

fn default_store_location() -> String {
    dirs::cache_dir()
        .map(|dir| dir.join("yrweather"))
        .unwrap_or_else(|| PathBuf::from(".yrweather"))
        .to_string_lossy()
        .into_owned()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

fn default_image_directory() -> PathBuf {
    PathBuf::from("images")
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            base_url: default_feed_base_url(),
            timeout_seconds: default_feed_timeout(),
            max_retries: default_feed_max_retries(),
        }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            location: default_store_location(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            temperature: TemperatureUnit::Celsius,
            windspeed: WindSpeedUnit::Kmh,
            pressure: PressureUnit::Hpa,
            show_sunrise_sunset: false,
            show_windchill_temperature: false,
            show_abbreviated_directions: false,
            show_directions_degree: false,
            forecast_days: 0,
            image_directory: None,
            default_image_directory: default_image_directory(),
        }
    }
}

impl WeatherConfig {
    /// Load configuration from file and environment variables
    pub fn load() -> Result<Self> {
        Self::load_from_path(None)
    }

    /// Load configuration from specified path
    pub fn load_from_path(config_path: Option<PathBuf>) -> Result<Self> {
        let mut builder = Config::builder();

        let config_file = config_path.or_else(Self::get_config_path);
        if let Some(config_file) = config_file {
            builder = builder.add_source(
                File::from(config_file)
                    .required(false)
                    .format(config::FileFormat::Toml),
            );
        }

        // e.g. YRWEATHER_FEED__TIMEOUT_SECONDS=20
        builder = builder.add_source(
            Environment::with_prefix("YRWEATHER")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let settings = builder
            .build()
            .with_context(|| "Failed to build configuration")?;

        let mut config: WeatherConfig = settings
            .try_deserialize()
            .with_context(|| "Failed to deserialize configuration")?;

        config.apply_defaults();
        config.validate()?;

        Ok(config)
    }

    /// Get the default configuration file path
    #[must_use]
    pub fn get_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("yrweather").join("config.toml"))
    }

    /// Apply default values to missing configuration fields
    pub fn apply_defaults(&mut self) {
        if self.feed.base_url.is_empty() {
            self.feed.base_url = default_feed_base_url();
        }
        if self.feed.timeout_seconds == 0 {
            self.feed.timeout_seconds = default_feed_timeout();
        }
        if self.store.location.is_empty() {
            self.store.location = default_store_location();
        }
        if self.logging.level.is_empty() {
            self.logging.level = default_log_level();
        }
        if self.logging.format.is_empty() {
            self.logging.format = default_log_format();
        }
        if self.display.default_image_directory.as_os_str().is_empty() {
            self.display.default_image_directory = default_image_directory();
        }
    }

    /// Validate all configuration settings
    pub fn validate(&self) -> Result<()> {
        self.validate_numeric_ranges()?;
        self.validate_string_values()?;
        Ok(())
    }

    fn validate_numeric_ranges(&self) -> Result<()> {
        if self.feed.timeout_seconds > 300 {
            return Err(WeatherError::config("Feed timeout cannot exceed 300 seconds").into());
        }

        if self.feed.max_retries > 10 {
            return Err(WeatherError::config("Feed max retries cannot exceed 10").into());
        }

        Ok(())
    }

    fn validate_string_values(&self) -> Result<()> {
        let valid_log_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_log_levels.contains(&self.logging.level.as_str()) {
            return Err(WeatherError::config(format!(
                "Invalid log level '{}'. Must be one of: {}",
                self.logging.level,
                valid_log_levels.join(", ")
            ))
            .into());
        }

        let valid_log_formats = ["pretty", "json"];
        if !valid_log_formats.contains(&self.logging.format.as_str()) {
            return Err(WeatherError::config(format!(
                "Invalid log format '{}'. Must be one of: {}",
                self.logging.format,
                valid_log_formats.join(", ")
            ))
            .into());
        }

        if !self.feed.base_url.starts_with("http://") && !self.feed.base_url.starts_with("https://")
        {
            return Err(
                WeatherError::config("Feed base URL must be a valid HTTP or HTTPS URL").into(),
            );
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = WeatherConfig::default();
        assert_eq!(config.feed.base_url, "https://www.yr.no/place");
        assert_eq!(config.feed.timeout_seconds, 10);
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.display.temperature, TemperatureUnit::Celsius);
        assert_eq!(config.display.windspeed, WindSpeedUnit::Kmh);
        assert_eq!(config.display.pressure, PressureUnit::Hpa);
        assert!(!config.display.show_sunrise_sunset);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation_invalid_log_level() {
        let mut config = WeatherConfig::default();
        config.logging.level = "invalid".to_string();
        let result = config.validate();
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("Invalid log level"));
    }

    #[test]
    fn test_config_validation_numeric_ranges() {
        let mut config = WeatherConfig::default();
        config.feed.timeout_seconds = 500;
        let result = config.validate();
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("timeout cannot exceed"));
    }

    #[test]
    fn test_config_validation_base_url() {
        let mut config = WeatherConfig::default();
        config.feed.base_url = "ftp://www.yr.no/place".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_apply_defaults() {
        let mut config = WeatherConfig::default();
        config.feed.timeout_seconds = 0;
        config.logging.format = String::new();
        config.apply_defaults();
        assert_eq!(config.feed.timeout_seconds, 10);
        assert_eq!(config.logging.format, "pretty");
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            r#"
[feed]
timeout_seconds = 20

[display]
temperature = "celsiusfahrenheit"
windspeed = "beaufort"
show_sunrise_sunset = true
"#
        )
        .unwrap();

        let config = WeatherConfig::load_from_path(Some(file.path().to_path_buf())).unwrap();
        assert_eq!(config.feed.timeout_seconds, 20);
        assert_eq!(config.feed.base_url, "https://www.yr.no/place");
        assert_eq!(config.display.temperature, TemperatureUnit::CelsiusFahrenheit);
        assert_eq!(config.display.windspeed, WindSpeedUnit::Beaufort);
        assert!(config.display.show_sunrise_sunset);
    }

    #[test]
    fn test_config_path_generation() {
        if let Some(path) = WeatherConfig::get_config_path() {
            assert!(path.to_string_lossy().contains("yrweather"));
            assert!(path.to_string_lossy().ends_with("config.toml"));
        }
    }
}
