//! Lookback window.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Seconds in a day, as a float for fractional ages.
const SECS_PER_DAY: f64 = 86_400.0;

/// The `[start, end]` lookback window of one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub days: u32,
}

impl DateWindow {
    /// Window of `days` days ending at `now`.
    #[must_use]
    pub fn ending_at(now: DateTime<Utc>, days: u32) -> Self {
        Self {
            start: now - Duration::days(i64::from(days)),
            end: now,
            days,
        }
    }

    /// First calendar day of the window.
    #[must_use]
    pub fn from_date(&self) -> NaiveDate {
        self.start.date_naive()
    }

    /// Last calendar day of the window.
    #[must_use]
    pub fn to_date(&self) -> NaiveDate {
        self.end.date_naive()
    }

    /// Whether `ts` falls before the window start.
    ///
    /// Timestamps after `end` are not stale; they are treated as "now".
    #[must_use]
    pub fn is_stale(&self, ts: DateTime<Utc>) -> bool {
        ts < self.start
    }

    /// Age of `ts` relative to the window end, in fractional days.
    ///
    /// Negative for timestamps in the future.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn age_days(&self, ts: DateTime<Utc>) -> f64 {
        (self.end - ts).num_seconds() as f64 / SECS_PER_DAY
    }
}
