//! Weather condition labels and icons for yr.no symbol codes

use std::path::{Path, PathBuf};

const NO_DATA: &str = "No data";

/// Label for a symbol such as `03n`; only the leading number matters.
#[must_use]
pub fn condition_label(symbol: &str) -> &'static str {
    let digits: String = symbol
        .chars()
        .take(2)
        .take_while(char::is_ascii_digit)
        .collect();
    digits.parse::<u8>().map_or(NO_DATA, label_for_number)
}

fn label_for_number(number: u8) -> &'static str {
    match number {
        1 => "Clear sky",
        2 => "Fair",
        3 => "Partly cloudy",
        4 => "Cloudy",
        5 => "Rain showers",
        6 => "Rain showers and thunder",
        7 => "Sleet showers",
        8 => "Snow showers",
        9 => "Rain",
        10 => "Heavy rain",
        11 => "Heavy rain and thunder",
        12 => "Sleet",
        13 => "Snow",
        14 => "Snow and thunder",
        15 => "Fog",
        20 => "Sleet showers and thunder",
        21 => "Snow showers and thunder",
        22 => "Rain and thunder",
        23 => "Sleet and thunder",
        24 => "Light rain showers and thunder",
        25 => "Heavy rain showers and thunder",
        26 => "Light sleet showers and thunder",
        27 => "Heavy sleet showers and thunder",
        28 => "Light snow showers and thunder",
        29 => "Heavy snow showers and thunder",
        30 => "Light rain and thunder",
        31 => "Light sleet and thunder",
        32 => "Heavy sleet and thunder",
        33 => "Light snow and thunder",
        34 => "Heavy snow and thunder",
        40 => "Light rain showers",
        41 => "Heavy rain showers",
        42 => "Light sleet showers",
        43 => "Heavy sleet showers",
        44 => "Light snow showers",
        45 => "Heavy snow showers",
        46 => "Light rain",
        47 => "Light sleet",
        48 => "Heavy sleet",
        49 => "Light snow",
        50 => "Heavy snow",
        _ => NO_DATA,
    }
}

/// Finds the icon file for a symbol, preferring a custom image directory.
#[derive(Debug, Clone)]
pub struct IconResolver {
    custom_dir: Option<PathBuf>,
    default_dir: PathBuf,
}

impl IconResolver {
    pub fn new(custom_dir: Option<PathBuf>, default_dir: impl Into<PathBuf>) -> Self {
        Self {
            custom_dir,
            default_dir: default_dir.into(),
        }
    }

    /// `<custom>/<symbol>.png` when that file can be opened, else the default.
    #[must_use]
    pub fn resolve(&self, symbol: &str) -> PathBuf {
        let file = format!("{symbol}.png");
        if let Some(custom) = &self.custom_dir {
            let candidate = custom.join(&file);
            if is_readable(&candidate) {
                return candidate;
            }
        }
        self.default_dir.join(file)
    }
}

fn is_readable(path: &Path) -> bool {
    std::fs::File::open(path).is_ok_and(|_| path.is_file())
}
