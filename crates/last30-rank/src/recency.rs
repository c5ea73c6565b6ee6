//! Recency: linear decay across the lookback window.

use chrono::{DateTime, Utc};
use last30_core::DateWindow;

/// `1 - age / window` clamped to `[0, 1]`.
///
/// Future timestamps score 1. Unknown timestamps score 0.
#[must_use]
pub fn recency(published: Option<DateTime<Utc>>, window: &DateWindow) -> f64 {
    let Some(ts) = published else {
        return 0.0;
    };
    let age = window.age_days(ts);
    if age <= 0.0 {
        return 1.0;
    }
    (1.0 - age / f64::from(window.days.max(1))).clamp(0.0, 1.0)
}
