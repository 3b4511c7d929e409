//! Refresh scheduling with exponential backoff

use chrono::{DateTime, Duration, Utc};

use crate::models::ScheduleInfo;

/// First retry interval after a failed or stale refresh.
pub const INITIAL_RETRY_SECS: i64 = 675;
/// Once the interval reaches a day it grows linearly by this amount.
pub const ONE_DAY_SECS: i64 = 86_400;

/// Decides when a place's feed should be downloaded again.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScheduleController;

impl ScheduleController {
    /// A refresh is due when nothing is scheduled yet or the attempt time has come.
    #[must_use]
    pub fn is_due(now: DateTime<Utc>, info: Option<&ScheduleInfo>) -> bool {
        match info {
            None => true,
            Some(info) => now >= info.next_download_attempt,
        }
    }

    /// Next attempt after `reference`, the feed's announced update time.
    ///
    /// The interval starts at 675 s and doubles until it reaches one day
    /// (675 * 2^7 = 86400), then grows by one day per step, until
    /// `reference + interval` lies after `now`.
    #[must_use]
    pub fn next_attempt(reference: DateTime<Utc>, now: DateTime<Utc>) -> DateTime<Utc> {
        let mut interval = INITIAL_RETRY_SECS;
        while reference + Duration::seconds(interval) <= now {
            if interval < ONE_DAY_SECS {
                interval *= 2;
            } else {
                interval += ONE_DAY_SECS;
            }
        }
        reference + Duration::seconds(interval)
    }

    /// Copy of `info` with a backed-off `next_download_attempt`. The other
    /// fields are kept so the result can fully replace the stored record.
    #[must_use]
    pub fn backed_off(info: &ScheduleInfo, now: DateTime<Utc>) -> ScheduleInfo {
        ScheduleInfo {
            next_download_attempt: Self::next_attempt(info.next_update, now),
            ..*info
        }
    }
}
