//! Parser for yr.no `weatherdata` documents

use chrono::{Duration, NaiveDateTime};
use quick_xml::de::from_str;
use serde::Deserialize;

use super::url::parse_place_url;
use crate::Result;
use crate::error::WeatherError;
use crate::models::{ForecastEntry, Place, PlaceStatus, ScheduleInfo};
use crate::units::round_to;

const FEED_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Everything extracted from one feed document.
#[derive(Debug, Clone)]
pub struct ParsedFeed {
    /// Key the schedule and forecasts are stored under.
    pub geoid: String,
    /// Place as described by the document, keyed by the document's own id.
    pub place: Place,
    pub schedule: ScheduleInfo,
    pub forecasts: Vec<ForecastEntry>,
}

#[derive(Debug, Deserialize)]
struct WeatherDataXml {
    location: LocationXml,
    credit: Option<CreditXml>,
    meta: MetaXml,
    forecast: ForecastXml,
}

#[derive(Debug, Deserialize)]
struct LocationXml {
    #[serde(default)]
    name: String,
    #[serde(default)]
    country: String,
    timezone: Option<TimezoneXml>,
    location: GeoXml,
}

#[derive(Debug, Deserialize)]
struct TimezoneXml {
    #[serde(rename = "@utcoffsetMinutes")]
    utc_offset_minutes: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GeoXml {
    #[serde(rename = "@geobase")]
    geobase: String,
    #[serde(rename = "@geobaseid")]
    geobase_id: String,
    #[serde(rename = "@latitude")]
    latitude: Option<String>,
    #[serde(rename = "@longitude")]
    longitude: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CreditXml {
    link: Option<LinkXml>,
}

#[derive(Debug, Deserialize)]
struct LinkXml {
    #[serde(rename = "@url")]
    url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct MetaXml {
    lastupdate: String,
    nextupdate: String,
}

#[derive(Debug, Deserialize)]
struct ForecastXml {
    tabular: TabularXml,
}

#[derive(Debug, Deserialize)]
struct TabularXml {
    #[serde(rename = "time", default)]
    times: Vec<TimeXml>,
}

#[derive(Debug, Deserialize)]
struct TimeXml {
    #[serde(rename = "@from")]
    from: String,
    #[serde(rename = "@to")]
    to: String,
    #[serde(rename = "@period", default)]
    period: String,
    symbol: Option<SymbolXml>,
    precipitation: Option<ValueXml>,
    #[serde(rename = "windDirection")]
    wind_direction: Option<WindDirectionXml>,
    #[serde(rename = "windSpeed")]
    wind_speed: Option<WindSpeedXml>,
    temperature: Option<ValueXml>,
    pressure: Option<ValueXml>,
}

#[derive(Debug, Deserialize)]
struct SymbolXml {
    #[serde(rename = "@var", default)]
    var: String,
}

#[derive(Debug, Deserialize)]
struct ValueXml {
    #[serde(rename = "@value")]
    value: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WindDirectionXml {
    #[serde(rename = "@deg")]
    deg: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WindSpeedXml {
    #[serde(rename = "@mps")]
    mps: Option<String>,
}

/// Parses a feed document.
///
/// `geoid` is the id the caller asked for; when `None` the id is built from
/// the document as `<geobase>_<geobaseid>`.
pub fn parse_forecast(document: &str, geoid: Option<&str>) -> Result<ParsedFeed> {
    let xml: WeatherDataXml = from_str(document)
        .map_err(|e| WeatherError::malformed(format!("Failed to parse forecast XML: {e}")))?;

    let document_geoid = format!(
        "{}_{}",
        xml.location.location.geobase, xml.location.location.geobase_id
    );
    let geoid = geoid.map_or_else(|| document_geoid.clone(), str::to_string);

    let link_url = xml
        .credit
        .as_ref()
        .and_then(|credit| credit.link.as_ref())
        .and_then(|link| link.url.as_deref())
        .unwrap_or_default();
    let (_, link) = parse_place_url(link_url);

    let place = Place {
        geoid: document_geoid,
        latitude: round_to(parse_float(xml.location.location.latitude.as_deref(), "latitude")?, 5),
        longitude: round_to(
            parse_float(xml.location.location.longitude.as_deref(), "longitude")?,
            5,
        ),
        country: xml.location.country.trim().to_string(),
        name: xml.location.name.trim().to_string(),
        link,
        status: PlaceStatus::Added,
    };

    let utc_offset = parse_int(
        xml.location
            .timezone
            .as_ref()
            .and_then(|tz| tz.utc_offset_minutes.as_deref()),
        "utcoffsetMinutes",
    )?;
    let offset = Duration::minutes(i64::from(utc_offset));
    let next_update = (parse_time(&xml.meta.nextupdate)? - offset).and_utc();
    let schedule = ScheduleInfo {
        last_update: (parse_time(&xml.meta.lastupdate)? - offset).and_utc(),
        next_update,
        next_download_attempt: next_update,
        utc_offset,
    };

    let forecasts = xml
        .forecast
        .tabular
        .times
        .iter()
        .map(|time| parse_entry(&geoid, time))
        .collect::<Result<Vec<_>>>()?;

    Ok(ParsedFeed {
        geoid,
        place,
        schedule,
        forecasts,
    })
}

fn parse_entry(geoid: &str, time: &TimeXml) -> Result<ForecastEntry> {
    Ok(ForecastEntry {
        geoid: geoid.to_string(),
        time_from: parse_time(&time.from)?,
        time_to: parse_time(&time.to)?,
        period: time.period.clone(),
        symbol: strip_symbol_variant(time.symbol.as_ref().map_or("", |s| s.var.as_str())),
        precipitation: parse_float(
            time.precipitation.as_ref().and_then(|p| p.value.as_deref()),
            "precipitation",
        )?,
        wind_direction: parse_int(
            time.wind_direction.as_ref().and_then(|w| w.deg.as_deref()),
            "windDirection",
        )?,
        wind_speed: parse_float(time.wind_speed.as_ref().and_then(|w| w.mps.as_deref()), "windSpeed")?,
        temperature: parse_int(
            time.temperature.as_ref().and_then(|t| t.value.as_deref()),
            "temperature",
        )?,
        pressure: parse_int(time.pressure.as_ref().and_then(|p| p.value.as_deref()), "pressure")?,
    })
}

/// `mf/03n.56` carries a moon phase around the code; keep only `03n`.
fn strip_symbol_variant(symbol: &str) -> String {
    if symbol.chars().count() > 3 {
        symbol.chars().skip(3).take(3).collect()
    } else {
        symbol.to_string()
    }
}

fn parse_time(text: &str) -> Result<NaiveDateTime> {
    NaiveDateTime::parse_from_str(text.trim(), FEED_TIME_FORMAT)
        .map_err(|e| WeatherError::malformed(format!("Invalid timestamp '{text}': {e}")))
}

/// Missing values count as zero.
fn parse_float(text: Option<&str>, field: &str) -> Result<f64> {
    match text.map(str::trim) {
        None | Some("") => Ok(0.0),
        Some(text) => text
            .parse::<f64>()
            .map_err(|_| WeatherError::malformed(format!("Invalid {field} '{text}'"))),
    }
}

/// Decimal text truncated toward zero, e.g. `236.4` -> 236.
fn parse_int(text: Option<&str>, field: &str) -> Result<i32> {
    parse_float(text, field).map(|value| value.trunc() as i32)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeZone, Utc};

    const SAMPLE: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<weatherdata>
  <location>
    <name>Hamburg</name>
    <type>City - large town</type>
    <country>Germany</country>
    <timezone id="Europe/Berlin" utcoffsetMinutes="120" />
    <location altitude="17" latitude="53.5753200" longitude="10.0153436" geobase="geonames" geobaseid="2911298" />
  </location>
  <credit>
    <link text="Weather forecast from yr.no" url="http://www.yr.no/place/Germany/Hamburg/Hamburg/" />
  </credit>
  <meta>
    <lastupdate>2013-10-07T17:30:00</lastupdate>
    <nextupdate>2013-10-08T06:00:00</nextupdate>
  </meta>
  <forecast>
    <tabular>
      <time from="2013-10-07T18:00:00" to="2013-10-08T00:00:00" period="3">
        <symbol number="3" numberEx="3" name="Partly cloudy" var="mf/03n.11" />
        <precipitation value="0" />
        <windDirection deg="236.4" code="SW" name="Southwest" />
        <windSpeed mps="3.4" name="Gentle breeze" />
        <temperature unit="celsius" value="12" />
        <pressure unit="hPa" value="1016.8" />
      </time>
      <time from="2013-10-08T00:00:00" to="2013-10-08T06:00:00" period="0">
        <symbol number="4" numberEx="4" name="Cloudy" var="04" />
        <precipitation value="0.3" minvalue="0" maxvalue="0.6" />
        <windDirection deg="220.0" code="SW" name="Southwest" />
        <windSpeed mps="2.9" name="Light breeze" />
        <temperature unit="celsius" value="-0.6" />
        <pressure unit="hPa" value="1015.2" />
      </time>
    </tabular>
  </forecast>
</weatherdata>"#;

    #[test]
    fn test_parse_meta_to_utc() {
        let feed = parse_forecast(SAMPLE, None).unwrap();
        assert_eq!(feed.geoid, "geonames_2911298");
        assert_eq!(feed.schedule.utc_offset, 120);
        assert_eq!(
            feed.schedule.last_update,
            Utc.with_ymd_and_hms(2013, 10, 7, 15, 30, 0).unwrap()
        );
        assert_eq!(
            feed.schedule.next_update,
            Utc.with_ymd_and_hms(2013, 10, 8, 4, 0, 0).unwrap()
        );
        assert_eq!(feed.schedule.next_download_attempt, feed.schedule.next_update);
    }

    #[test]
    fn test_parse_place() {
        let feed = parse_forecast(SAMPLE, None).unwrap();
        assert_eq!(feed.place.geoid, "geonames_2911298");
        assert_eq!(feed.place.latitude, 53.57532);
        assert_eq!(feed.place.longitude, 10.01534);
        assert_eq!(feed.place.country, "Germany");
        assert_eq!(feed.place.name, "Hamburg");
        assert_eq!(feed.place.link, "Hamburg/Hamburg");
    }

    #[test]
    fn test_parse_entries() {
        let feed = parse_forecast(SAMPLE, None).unwrap();
        assert_eq!(feed.forecasts.len(), 2);

        let first = &feed.forecasts[0];
        assert_eq!(
            first.time_from,
            NaiveDate::from_ymd_opt(2013, 10, 7).unwrap().and_hms_opt(18, 0, 0).unwrap()
        );
        assert_eq!(first.period, "3");
        assert_eq!(first.symbol, "03n");
        assert_eq!(first.wind_direction, 236);
        assert_eq!(first.wind_speed, 3.4);
        assert_eq!(first.temperature, 12);
        assert_eq!(first.pressure, 1016);

        let second = &feed.forecasts[1];
        assert_eq!(second.symbol, "04");
        assert_eq!(second.precipitation, 0.3);
        assert_eq!(second.temperature, 0);
    }

    #[test]
    fn test_caller_geoid_wins_for_entries() {
        let feed = parse_forecast(SAMPLE, Some("geonames_261745")).unwrap();
        assert_eq!(feed.geoid, "geonames_261745");
        assert!(feed.forecasts.iter().all(|f| f.geoid == "geonames_261745"));
        assert_eq!(feed.place.geoid, "geonames_2911298");
    }

    #[test]
    fn test_malformed_documents() {
        assert!(matches!(
            parse_forecast("<html><body>502</body></html>", None),
            Err(WeatherError::MalformedDocument { .. })
        ));
        assert!(matches!(
            parse_forecast("", None),
            Err(WeatherError::MalformedDocument { .. })
        ));
        let bad_time = SAMPLE.replace("2013-10-07T17:30:00", "yesterday");
        assert!(parse_forecast(&bad_time, None).is_err());
    }

    #[test]
    fn test_strip_symbol_variant() {
        assert_eq!(strip_symbol_variant("mf/03n.56"), "03n");
        assert_eq!(strip_symbol_variant("01d"), "01d");
        assert_eq!(strip_symbol_variant(""), "");
    }
}
