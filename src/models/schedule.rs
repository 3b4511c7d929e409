//! Refresh bookkeeping kept once per place

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Feed timestamps and the next time a download may be attempted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleInfo {
    pub last_update: DateTime<Utc>,
    pub next_update: DateTime<Utc>,
    pub next_download_attempt: DateTime<Utc>,
    /// Offset of the place's local time from UTC, in minutes
    pub utc_offset: i32,
}

impl ScheduleInfo {
    /// Placeholder for a place that has never been downloaded.
    #[must_use]
    pub fn unknown(now: DateTime<Utc>) -> Self {
        Self {
            last_update: now,
            next_update: now,
            next_download_attempt: now,
            utc_offset: 0,
        }
    }
}
