//! Data models for places, refresh schedules and forecast entries
//!
//! - Place: identity and metadata of a forecast location
//! - Schedule: per-place refresh bookkeeping
//! - Forecast: one time bucket of a downloaded feed

pub mod forecast;
pub mod place;
pub mod schedule;

pub use forecast::ForecastEntry;
pub use place::{Place, PlaceStatus};
pub use schedule::ScheduleInfo;
