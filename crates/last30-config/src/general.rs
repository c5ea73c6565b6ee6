//! General run settings.

use std::time::Duration;

use last30_core::{MAX_TIMEOUT_SECS, RunDefaults};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

const fn default_days() -> u32 {
    30
}

const fn default_stage_timeout_secs() -> u64 {
    60
}

const fn default_run_timeout_secs() -> u64 {
    180
}

const fn default_enrichment_timeout_secs() -> u64 {
    15
}

const fn default_request_timeout_secs() -> u64 {
    30
}

const fn default_transcript_poll_interval_secs() -> u64 {
    3
}

const fn default_transcript_max_wait_secs() -> u64 {
    60
}

const fn default_enrichment_concurrency() -> usize {
    8
}

fn default_user_agent() -> String {
    format!("last30days/{}", env!("CARGO_PKG_VERSION"))
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GeneralConfig {
    /// Lookback window used when `--days` is not given.
    #[serde(default = "default_days")]
    pub default_days: u32,

    /// Upper bound for one discovery phase.
    #[serde(default = "default_stage_timeout_secs")]
    pub stage_timeout_secs: u64,

    /// Upper bound for the whole run.
    #[serde(default = "default_run_timeout_secs")]
    pub run_timeout_secs: u64,

    /// Upper bound for a single enrichment lookup.
    #[serde(default = "default_enrichment_timeout_secs")]
    pub enrichment_timeout_secs: u64,

    /// Per-request HTTP timeout.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Delay between polls of a pending transcription job.
    #[serde(default = "default_transcript_poll_interval_secs")]
    pub transcript_poll_interval_secs: u64,

    /// How long to keep polling a transcription job before giving up.
    /// Transcript lookups get this budget instead of
    /// `enrichment_timeout_secs` when it is longer.
    #[serde(default = "default_transcript_max_wait_secs")]
    pub transcript_max_wait_secs: u64,

    /// Maximum enrichment lookups in flight at once.
    #[serde(default = "default_enrichment_concurrency")]
    pub enrichment_concurrency: usize,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            default_days: default_days(),
            stage_timeout_secs: default_stage_timeout_secs(),
            run_timeout_secs: default_run_timeout_secs(),
            enrichment_timeout_secs: default_enrichment_timeout_secs(),
            request_timeout_secs: default_request_timeout_secs(),
            transcript_poll_interval_secs: default_transcript_poll_interval_secs(),
            transcript_max_wait_secs: default_transcript_max_wait_secs(),
            enrichment_concurrency: default_enrichment_concurrency(),
            user_agent: default_user_agent(),
        }
    }
}

impl GeneralConfig {
    /// Run defaults derived from this section.
    #[must_use]
    pub const fn run_defaults(&self) -> RunDefaults {
        RunDefaults {
            days: self.default_days,
            stage_timeout: Duration::from_secs(self.stage_timeout_secs),
            run_timeout: Duration::from_secs(self.run_timeout_secs),
            enrichment_timeout: Duration::from_secs(self.enrichment_timeout_secs),
        }
    }

    #[must_use]
    pub const fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    #[must_use]
    pub const fn transcript_poll_interval(&self) -> Duration {
        Duration::from_secs(self.transcript_poll_interval_secs)
    }

    #[must_use]
    pub const fn transcript_max_wait(&self) -> Duration {
        Duration::from_secs(self.transcript_max_wait_secs)
    }

    /// Reject values that would make every run fail.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] for a timeout that is zero or
    /// above [`MAX_TIMEOUT_SECS`], or for zero enrichment concurrency.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let timeouts = [
            ("general.stage_timeout_secs", self.stage_timeout_secs),
            ("general.run_timeout_secs", self.run_timeout_secs),
            ("general.enrichment_timeout_secs", self.enrichment_timeout_secs),
            ("general.request_timeout_secs", self.request_timeout_secs),
            ("general.transcript_poll_interval_secs", self.transcript_poll_interval_secs),
            ("general.transcript_max_wait_secs", self.transcript_max_wait_secs),
        ];
        for (field, value) in timeouts {
            if value == 0 {
                return Err(ConfigError::InvalidValue {
                    field: field.to_string(),
                    reason: "must be greater than zero".to_string(),
                });
            }
            if value > MAX_TIMEOUT_SECS {
                return Err(ConfigError::InvalidValue {
                    field: field.to_string(),
                    reason: format!("must be at most {MAX_TIMEOUT_SECS}"),
                });
            }
        }
        if self.enrichment_concurrency == 0 {
            return Err(ConfigError::InvalidValue {
                field: "general.enrichment_concurrency".to_string(),
                reason: "must be greater than zero".to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_correct() {
        let config = GeneralConfig::default();
        assert_eq!(config.default_days, 30);
        assert_eq!(config.stage_timeout_secs, 60);
        assert_eq!(config.run_timeout_secs, 180);
        assert_eq!(config.transcript_poll_interval_secs, 3);
        assert_eq!(config.transcript_max_wait_secs, 60);
        assert!(config.user_agent.starts_with("last30days/"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn run_defaults_carry_timeouts() {
        let config = GeneralConfig {
            stage_timeout_secs: 5,
            ..Default::default()
        };
        let defaults = config.run_defaults();
        assert_eq!(defaults.stage_timeout, Duration::from_secs(5));
        assert_eq!(defaults.days, 30);
    }

    #[test]
    fn zero_timeout_is_invalid() {
        let config = GeneralConfig {
            request_timeout_secs: 0,
            ..Default::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("request_timeout_secs"));
    }

    #[test]
    fn oversized_timeout_is_invalid() {
        let config = GeneralConfig {
            run_timeout_secs: u64::MAX,
            ..Default::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("run_timeout_secs"));
        assert!(err.to_string().contains("at most"));
    }
}
