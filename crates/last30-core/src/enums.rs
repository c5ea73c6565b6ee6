//! Source, depth, phase, status, and stage enums for last30days.
//!
//! All enums use `snake_case` serialization via `#[serde(rename_all = "snake_case")]`.
//! [`Stage`] provides `allowed_next_states()` to enforce the invocation state
//! machine at the pipeline layer.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ---------------------------------------------------------------------------
// SourceKind
// ---------------------------------------------------------------------------

/// A discovery source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    Reddit,
    X,
    Youtube,
    Web,
}

impl SourceKind {
    /// Every source, in canonical order. Merge and report order follow this.
    pub const ALL: [Self; 4] = [Self::Reddit, Self::X, Self::Youtube, Self::Web];

    /// Sources enabled when the user does not pass `--sources`.
    pub const DEFAULTS: [Self; 3] = [Self::Reddit, Self::X, Self::Youtube];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Reddit => "reddit",
            Self::X => "x",
            Self::Youtube => "youtube",
            Self::Web => "web",
        }
    }

    /// Human-facing label used in rendered reports.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Reddit => "Reddit",
            Self::X => "X",
            Self::Youtube => "YouTube",
            Self::Web => "Web",
        }
    }

    /// Whether a missing credential for this source is reported rather than
    /// silently ignored.
    #[must_use]
    pub const fn is_required(self) -> bool {
        matches!(self, Self::Reddit | Self::X)
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SourceKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "reddit" => Ok(Self::Reddit),
            "x" | "twitter" => Ok(Self::X),
            "youtube" | "yt" => Ok(Self::Youtube),
            "web" => Ok(Self::Web),
            other => Err(format!(
                "unknown source '{other}' (expected one of: reddit, x, youtube, web)"
            )),
        }
    }
}

// ---------------------------------------------------------------------------
// Depth
// ---------------------------------------------------------------------------

/// Depth preset: a named bundle of per-source result-count bounds.
///
/// The bounds themselves live in [`crate::depth`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Depth {
    Quick,
    #[default]
    Default,
    Deep,
}

impl Depth {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Quick => "quick",
            Self::Default => "default",
            Self::Deep => "deep",
        }
    }
}

impl fmt::Display for Depth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// OutputMode
// ---------------------------------------------------------------------------

/// Whether a run's report is persisted to the run store.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputMode {
    #[default]
    Ephemeral,
    Persist,
}

impl OutputMode {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Ephemeral => "ephemeral",
            Self::Persist => "persist",
        }
    }
}

// ---------------------------------------------------------------------------
// Phase
// ---------------------------------------------------------------------------

/// Discovery pass that produced a finding.
///
/// `Discovery` is the broad Phase 1 pass; `Supplemental` is the Phase 2 pass
/// seeded by entities extracted from Phase 1.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    #[default]
    Discovery,
    Supplemental,
}

impl Phase {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Discovery => "discovery",
            Self::Supplemental => "supplemental",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// EntityKind
// ---------------------------------------------------------------------------

/// Kind of entity extracted from Phase 1 findings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    /// An `@handle` on X.
    Handle,
    /// An `r/name` subreddit.
    Community,
}

impl EntityKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Handle => "handle",
            Self::Community => "community",
        }
    }
}

// ---------------------------------------------------------------------------
// SourceStatus
// ---------------------------------------------------------------------------

/// Outcome of one source across a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceStatus {
    /// The source answered (possibly with zero findings).
    Ok,
    /// The source was not enabled or not available.
    #[default]
    Skipped,
    /// The source errored in at least one phase and produced nothing usable.
    Failed,
    /// The source did not answer before the stage or run deadline.
    TimedOut,
}

impl SourceStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Ok => "ok",
            Self::Skipped => "skipped",
            Self::Failed => "failed",
            Self::TimedOut => "timed_out",
        }
    }
}

impl fmt::Display for SourceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Stage
// ---------------------------------------------------------------------------

/// Stage of one invocation.
///
/// ```text
/// idle → diagnosing → done                      (--diagnose)
///                   → discovering(discovery) → extracting → discovering(supplemental) → enriching
///                                                         → enriching                (no seeds)
/// enriching → scoring → synthesizing → done
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Idle,
    Diagnosing,
    Discovering(Phase),
    Extracting,
    Enriching,
    Scoring,
    Synthesizing,
    Done,
}

impl Stage {
    /// Valid next states from the current state.
    #[must_use]
    pub const fn allowed_next_states(self) -> &'static [Self] {
        match self {
            Self::Idle => &[Self::Diagnosing],
            Self::Diagnosing => &[Self::Done, Self::Discovering(Phase::Discovery)],
            Self::Discovering(Phase::Discovery) => &[Self::Extracting],
            Self::Extracting => &[Self::Discovering(Phase::Supplemental), Self::Enriching],
            Self::Discovering(Phase::Supplemental) => &[Self::Enriching],
            Self::Enriching => &[Self::Scoring],
            Self::Scoring => &[Self::Synthesizing],
            Self::Synthesizing => &[Self::Done],
            Self::Done => &[],
        }
    }

    /// Check whether transitioning to `next` is allowed.
    #[must_use]
    pub fn can_transition_to(self, next: Self) -> bool {
        self.allowed_next_states().contains(&next)
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Diagnosing => "diagnosing",
            Self::Discovering(Phase::Discovery) => "discovering(phase1)",
            Self::Discovering(Phase::Supplemental) => "discovering(phase2)",
            Self::Extracting => "extracting",
            Self::Enriching => "enriching",
            Self::Scoring => "scoring",
            Self::Synthesizing => "synthesizing",
            Self::Done => "done",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
