//! yr.no place URLs
//!
//! A place page lives at `<base>/<country>/<link>/` and its feed at
//! `<base>/<country>/<link>/forecast.xml`, e.g.
//! `https://www.yr.no/place/Germany/Hamburg/Hamburg/forecast.xml`.

use crate::Result;
use crate::error::WeatherError;

/// Prefix accepted for user-supplied place URLs.
pub const PLACE_URL_PREFIX: &str = "https://www.yr.no/place/";

const KNOWN_PREFIXES: [&str; 2] = ["http://www.yr.no/place/", "https://www.yr.no/place/"];

const FEED_FILE: &str = "forecast.xml";

/// Country path segment: spaces become `_`, as does a trailing dot.
#[must_use]
pub fn normalize_country(country: &str) -> String {
    let mut normalized = country.replace(' ', "_");
    if normalized.ends_with('.') {
        normalized.pop();
        normalized.push('_');
    }
    normalized
}

/// Feed URL of a place. Every character except `/` is percent-encoded.
#[must_use]
pub fn forecast_url(base: &str, country: &str, link: &str) -> String {
    let path = format!("{}/{}", normalize_country(country), link);
    let encoded = urlencoding::encode(&path).replace("%2F", "/");
    format!("{}/{encoded}/{FEED_FILE}", base.trim_end_matches('/'))
}

/// Human-facing page of a place.
#[must_use]
pub fn place_page_url(base: &str, country: &str, link: &str) -> String {
    format!(
        "{}/{}/{link}/",
        base.trim_end_matches('/'),
        normalize_country(country)
    )
}

/// Splits a place URL into `(country, link)`.
///
/// The host prefix is stripped, the first segment is the country and the
/// last segment (`forecast.xml`, or empty after a trailing slash) is dropped.
#[must_use]
pub fn parse_place_url(url: &str) -> (String, String) {
    let rest = KNOWN_PREFIXES
        .iter()
        .find_map(|prefix| url.strip_prefix(prefix))
        .unwrap_or(url);

    let mut parts: Vec<&str> = rest.split('/').collect();
    let country = if parts.is_empty() {
        String::new()
    } else {
        parts.remove(0).to_string()
    };
    parts.pop();
    (country, parts.join("/"))
}

/// Checks a user-supplied place URL and returns its feed URL.
pub fn feed_url_for_place_page(url: &str) -> Result<String> {
    let url = url.trim();
    if !url.starts_with(PLACE_URL_PREFIX) {
        return Err(WeatherError::validation(format!(
            "place URL must start with {PLACE_URL_PREFIX}"
        )));
    }
    let page = if url.ends_with('/') {
        url.to_string()
    } else {
        format!("{url}/")
    };
    let (country, link) = parse_place_url(&page);
    if country.is_empty() || link.is_empty() {
        return Err(WeatherError::validation(format!(
            "'{url}' does not name a place"
        )));
    }
    Ok(format!("{page}{FEED_FILE}"))
}
