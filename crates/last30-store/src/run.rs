//! Stored run record.

use chrono::{DateTime, Utc};
use last30_core::{Depth, RankedFinding, RunStats};
use serde::{Deserialize, Serialize};

use crate::error::StoreError;

/// Current record format.
pub const RECORD_VERSION: u32 = 1;

/// One completed run as written to the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredRun {
    /// Record format version.
    pub v: u32,
    pub topic: String,
    pub run_at: DateTime<Utc>,
    pub days: u32,
    pub depth: Depth,
    pub stats: RunStats,
    pub findings: Vec<RankedFinding>,
}

impl StoredRun {
    #[must_use]
    pub fn new(
        topic: impl Into<String>,
        run_at: DateTime<Utc>,
        days: u32,
        depth: Depth,
        stats: RunStats,
        findings: Vec<RankedFinding>,
    ) -> Self {
        Self {
            v: RECORD_VERSION,
            topic: topic.into(),
            run_at,
            days,
            depth,
            stats,
            findings,
        }
    }

    /// Store key.
    #[must_use]
    pub fn key(&self) -> (&str, DateTime<Utc>) {
        (&self.topic, self.run_at)
    }

    pub(crate) fn matches_topic(&self, topic: &str) -> bool {
        self.topic.trim().eq_ignore_ascii_case(topic.trim())
    }

    pub(crate) fn check_version(&self) -> Result<(), StoreError> {
        if self.v > RECORD_VERSION {
            return Err(StoreError::UnsupportedVersion {
                found: self.v,
                expected: RECORD_VERSION,
            });
        }
        Ok(())
    }
}
