//! Run configuration.
//!
//! A [`RunConfig`] is resolved once per invocation from [`RunFlags`] (what the
//! user typed) and [`RunDefaults`] (what the config file says), and is
//! immutable afterwards. Resolution performs every flag check, so a
//! [`PipelineError::ConfigInvalid`] is always raised before any network
//! activity.

use std::time::Duration;

use chrono::{DateTime, Utc};

use crate::depth::ResultBounds;
use crate::enums::{Depth, OutputMode, SourceKind};
use crate::errors::PipelineError;
use crate::window::DateWindow;

/// Largest accepted lookback window.
pub const MAX_DAYS: u32 = 365;

/// Largest accepted run timeout, in seconds.
pub const MAX_TIMEOUT_SECS: u64 = 3_600;

/// Raw invocation flags.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunFlags {
    pub days: Option<u32>,
    pub quick: bool,
    pub deep: bool,
    /// Comma-separated names already split by the caller, or `None` for the
    /// default source set.
    pub sources: Option<Vec<String>>,
    pub include_web: bool,
    pub store: bool,
    /// Overrides the configured run timeout.
    pub timeout_secs: Option<u64>,
}

/// Defaults supplied by configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunDefaults {
    pub days: u32,
    pub stage_timeout: Duration,
    pub run_timeout: Duration,
    pub enrichment_timeout: Duration,
}

impl Default for RunDefaults {
    fn default() -> Self {
        Self {
            days: 30,
            stage_timeout: Duration::from_secs(60),
            run_timeout: Duration::from_secs(180),
            enrichment_timeout: Duration::from_secs(15),
        }
    }
}

/// Resolved, immutable parameters of one invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunConfig {
    pub days: u32,
    pub depth: Depth,
    /// Enabled sources in canonical order, without duplicates.
    pub sources: Vec<SourceKind>,
    pub include_web: bool,
    pub output: OutputMode,
    pub stage_timeout: Duration,
    pub run_timeout: Duration,
    pub enrichment_timeout: Duration,
    /// Fixed "now" for the whole run. Scoring and the window derive from it.
    pub now: DateTime<Utc>,
}

impl RunConfig {
    /// Resolve flags against defaults.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::ConfigInvalid`] when `--quick` and `--deep`
    /// are combined, `days` is outside `1..=365`, a source name is unknown,
    /// the source list is empty, or the run timeout is zero or longer than
    /// [`MAX_TIMEOUT_SECS`].
    pub fn resolve(
        flags: &RunFlags,
        defaults: &RunDefaults,
        now: DateTime<Utc>,
    ) -> Result<Self, PipelineError> {
        if flags.quick && flags.deep {
            return Err(PipelineError::ConfigInvalid(
                "--quick and --deep are mutually exclusive".to_string(),
            ));
        }
        let depth = if flags.quick {
            Depth::Quick
        } else if flags.deep {
            Depth::Deep
        } else {
            Depth::Default
        };

        let days = flags.days.unwrap_or(defaults.days);
        if days == 0 || days > MAX_DAYS {
            return Err(PipelineError::ConfigInvalid(format!(
                "--days must be between 1 and {MAX_DAYS}, got {days}"
            )));
        }

        let (sources, include_web) = resolve_sources(flags)?;

        let run_timeout = flags
            .timeout_secs
            .map_or(defaults.run_timeout, Duration::from_secs);
        if run_timeout.is_zero() || defaults.stage_timeout.is_zero() {
            return Err(PipelineError::ConfigInvalid(
                "timeouts must be greater than zero".to_string(),
            ));
        }
        if run_timeout > Duration::from_secs(MAX_TIMEOUT_SECS) {
            return Err(PipelineError::ConfigInvalid(format!(
                "run timeout must be at most {MAX_TIMEOUT_SECS} seconds, got {}",
                run_timeout.as_secs()
            )));
        }

        Ok(Self {
            days,
            depth,
            sources,
            include_web,
            output: if flags.store {
                OutputMode::Persist
            } else {
                OutputMode::Ephemeral
            },
            stage_timeout: defaults.stage_timeout.min(run_timeout),
            run_timeout,
            enrichment_timeout: defaults.enrichment_timeout,
            now,
        })
    }

    /// Lookback window ending at `now`.
    #[must_use]
    pub fn window(&self) -> DateWindow {
        DateWindow::ending_at(self.now, self.days)
    }

    /// Phase 1 bounds for `source` under this run's depth.
    #[must_use]
    pub const fn bounds(&self, source: SourceKind) -> ResultBounds {
        self.depth.discovery_bounds(source)
    }

    #[must_use]
    pub fn is_enabled(&self, source: SourceKind) -> bool {
        self.sources.contains(&source)
    }
}

fn resolve_sources(flags: &RunFlags) -> Result<(Vec<SourceKind>, bool), PipelineError> {
    let Some(names) = &flags.sources else {
        let mut sources = SourceKind::DEFAULTS.to_vec();
        if flags.include_web {
            sources.push(SourceKind::Web);
        }
        return Ok((sources, flags.include_web));
    };

    let mut sources = Vec::new();
    for name in names.iter().map(|n| n.trim()).filter(|n| !n.is_empty()) {
        let kind = name
            .parse::<SourceKind>()
            .map_err(PipelineError::ConfigInvalid)?;
        if !sources.contains(&kind) {
            sources.push(kind);
        }
    }
    if sources.is_empty() {
        return Err(PipelineError::ConfigInvalid(
            "--sources must name at least one source".to_string(),
        ));
    }
    if flags.include_web && !sources.contains(&SourceKind::Web) {
        sources.push(SourceKind::Web);
    }
    sources.sort();
    let include_web = sources.contains(&SourceKind::Web);
    Ok((sources, include_web))
}

/// Validate a topic string.
///
/// # Errors
///
/// Returns [`PipelineError::ConfigInvalid`] for an empty or whitespace-only
/// topic.
pub fn validate_topic(topic: &str) -> Result<&str, PipelineError> {
    let trimmed = topic.trim();
    if trimmed.is_empty() {
        return Err(PipelineError::ConfigInvalid(
            "a topic is required unless --diagnose is given".to_string(),
        ));
    }
    Ok(trimmed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 31, 12, 0, 0).unwrap()
    }

    fn resolve(flags: &RunFlags) -> Result<RunConfig, PipelineError> {
        RunConfig::resolve(flags, &RunDefaults::default(), now())
    }

    #[test]
    fn defaults_resolve() {
        let config = resolve(&RunFlags::default()).unwrap();
        assert_eq!(config.days, 30);
        assert_eq!(config.depth, Depth::Default);
        assert_eq!(
            config.sources,
            vec![SourceKind::Reddit, SourceKind::X, SourceKind::Youtube]
        );
        assert!(!config.include_web);
        assert_eq!(config.output, OutputMode::Ephemeral);
    }

    #[test]
    fn include_web_adds_web() {
        let config = resolve(&RunFlags {
            include_web: true,
            ..Default::default()
        })
        .unwrap();
        assert!(config.is_enabled(SourceKind::Web));
    }

    #[test]
    fn quick_and_deep_conflict() {
        let err = resolve(&RunFlags {
            quick: true,
            deep: true,
            ..Default::default()
        })
        .unwrap_err();
        assert!(matches!(err, PipelineError::ConfigInvalid(_)));
    }

    #[test]
    fn days_out_of_range_rejected() {
        for days in [0, 366] {
            let err = resolve(&RunFlags {
                days: Some(days),
                ..Default::default()
            })
            .unwrap_err();
            assert!(matches!(err, PipelineError::ConfigInvalid(_)), "days={days}");
        }
    }

    #[test]
    fn explicit_sources_are_deduped_and_ordered() {
        let config = resolve(&RunFlags {
            sources: Some(vec!["web".into(), "x".into(), "twitter".into(), " ".into()]),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(config.sources, vec![SourceKind::X, SourceKind::Web]);
        assert!(config.include_web);
    }

    #[test]
    fn unknown_source_rejected() {
        let err = resolve(&RunFlags {
            sources: Some(vec!["reddit".into(), "myspace".into()]),
            ..Default::default()
        })
        .unwrap_err();
        assert!(err.to_string().contains("myspace"));
    }

    #[test]
    fn empty_source_list_rejected() {
        let err = resolve(&RunFlags {
            sources: Some(vec![String::new()]),
            ..Default::default()
        })
        .unwrap_err();
        assert!(matches!(err, PipelineError::ConfigInvalid(_)));
    }

    #[test]
    fn store_selects_persist_mode() {
        let config = resolve(&RunFlags {
            store: true,
            ..Default::default()
        })
        .unwrap();
        assert_eq!(config.output, OutputMode::Persist);
    }

    #[test]
    fn stage_timeout_never_exceeds_run_timeout() {
        let config = resolve(&RunFlags {
            timeout_secs: Some(5),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(config.run_timeout, Duration::from_secs(5));
        assert_eq!(config.stage_timeout, Duration::from_secs(5));
    }

    #[test]
    fn zero_timeout_rejected() {
        let err = resolve(&RunFlags {
            timeout_secs: Some(0),
            ..Default::default()
        })
        .unwrap_err();
        assert!(matches!(err, PipelineError::ConfigInvalid(_)));
    }

    #[rstest::rstest]
    #[case(MAX_TIMEOUT_SECS + 1)]
    #[case(u64::MAX)]
    fn oversized_timeout_rejected(#[case] secs: u64) {
        let err = resolve(&RunFlags {
            timeout_secs: Some(secs),
            ..Default::default()
        })
        .unwrap_err();
        assert!(matches!(err, PipelineError::ConfigInvalid(_)));
        assert!(err.to_string().contains("at most"));
    }

    #[test]
    fn timeout_at_limit_accepted() {
        let config = resolve(&RunFlags {
            timeout_secs: Some(MAX_TIMEOUT_SECS),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(config.run_timeout, Duration::from_secs(MAX_TIMEOUT_SECS));
    }

    #[test]
    fn window_follows_days() {
        let config = resolve(&RunFlags {
            days: Some(7),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(config.window().from_date().to_string(), "2026-03-24");
    }

    #[test]
    fn blank_topic_rejected() {
        assert!(validate_topic("   ").is_err());
        assert_eq!(validate_topic("  rust async ").unwrap(), "rust async");
    }
}
