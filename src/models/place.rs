//! Place model

use serde::{Deserialize, Serialize};
use std::fmt;

/// How a place record came to hold its current values
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlaceStatus {
    /// Imported in bulk and never changed by a download
    #[default]
    Original,
    /// A download reported values differing from the stored ones
    Modified,
    /// First seen through a forecast download
    Added,
}

/// A geographic place with a forecast feed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Place {
    /// Opaque, globally unique identifier, e.g. `geonames_2911298`
    pub geoid: String,
    /// Latitude in decimal degrees, rounded to 5 places
    pub latitude: f64,
    /// Longitude in decimal degrees, rounded to 5 places
    pub longitude: f64,
    pub country: String,
    pub name: String,
    /// Feed path below the country, e.g. `Hamburg/Hamburg`
    pub link: String,
    pub status: PlaceStatus,
}

impl fmt::Display for PlaceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            PlaceStatus::Original => "original",
            PlaceStatus::Modified => "modified",
            PlaceStatus::Added => "added",
        };
        f.write_str(text)
    }
}

impl fmt::Display for Place {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({}, {}) [{:.5}, {:.5}] {}",
            self.name, self.country, self.geoid, self.latitude, self.longitude, self.status
        )
    }
}
