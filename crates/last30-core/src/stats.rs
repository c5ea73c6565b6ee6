//! Run statistics and recoverable degradations.
//!
//! Everything that goes wrong without stopping a run lands in
//! [`RunStats::degradations`], so the final report shows what was skipped and
//! why.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::enums::{Phase, SourceKind, SourceStatus};
use crate::finding::Entity;

/// Which model actually served an LLM-backed source request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelUse {
    /// First model in the fallback chain.
    pub requested: String,
    /// Model that produced the response.
    pub served: String,
    /// Total attempts across the chain, including the successful one.
    pub attempts: u32,
}

impl ModelUse {
    /// Whether a fallback model served the request.
    #[must_use]
    pub fn is_degraded(&self) -> bool {
        self.requested != self.served
    }
}

/// A recoverable problem absorbed by the stage where it occurred.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Degradation {
    /// A source was skipped because its credential or local tool is absent.
    CredentialMissing {
        source: SourceKind,
        credential: String,
    },

    /// A source call failed or timed out; it contributed nothing to `phase`.
    SourceFetchFailed {
        source: SourceKind,
        phase: Phase,
        message: String,
    },

    /// The primary model failed and a fallback served the request.
    ModelDegraded {
        source: SourceKind,
        requested: String,
        served: String,
    },

    /// An enrichment lookup failed; the finding was kept unenriched.
    EnrichmentFailed { url: String, message: String },
}

impl fmt::Display for Degradation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CredentialMissing { source, credential } => {
                write!(f, "{source} skipped: {credential} not configured")
            }
            Self::SourceFetchFailed {
                source,
                phase,
                message,
            } => write!(f, "{source} failed during {phase}: {message}"),
            Self::ModelDegraded {
                source,
                requested,
                served,
            } => write!(
                f,
                "{source} served by fallback model {served} (requested {requested})"
            ),
            Self::EnrichmentFailed { url, message } => {
                write!(f, "enrichment failed for {url}: {message}")
            }
        }
    }
}

/// Per-source outcome across both discovery phases.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceReport {
    pub source: SourceKind,
    pub status: SourceStatus,
    /// Findings contributed by Phase 1.
    pub discovered: usize,
    /// Findings contributed by Phase 2.
    pub supplemental: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<ModelUse>,
    /// Provider name for multi-provider sources (web, youtube).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl SourceReport {
    #[must_use]
    pub const fn skipped(source: SourceKind) -> Self {
        Self {
            source,
            status: SourceStatus::Skipped,
            discovered: 0,
            supplemental: 0,
            model: None,
            provider: None,
            detail: None,
        }
    }
}

/// Enrichment counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnrichmentStats {
    pub attempted: usize,
    pub succeeded: usize,
    pub failed: usize,
}

/// Statistics for one run, included in the synthesized report.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunStats {
    pub sources: Vec<SourceReport>,
    pub degradations: Vec<Degradation>,
    pub enrichment: EnrichmentStats,
    /// Entities that seeded Phase 2.
    pub entities: Vec<Entity>,
    /// Findings dropped because they predate the lookback window.
    pub excluded_out_of_window: usize,
    /// Findings dropped as URL duplicates across sources and phases.
    pub duplicates_removed: usize,
    pub elapsed_ms: u64,
}

impl RunStats {
    /// Report for `source`, if one was recorded.
    #[must_use]
    pub fn source(&self, source: SourceKind) -> Option<&SourceReport> {
        self.sources.iter().find(|r| r.source == source)
    }

    /// Mutable report for `source`, inserting a skipped report if absent.
    pub fn source_mut(&mut self, source: SourceKind) -> &mut SourceReport {
        let idx = if let Some(idx) = self.sources.iter().position(|r| r.source == source) {
            idx
        } else {
            self.sources.push(SourceReport::skipped(source));
            self.sources.len() - 1
        };
        &mut self.sources[idx]
    }

    /// Model substitutions recorded during the run.
    pub fn model_degradations(&self) -> impl Iterator<Item = &Degradation> {
        self.degradations
            .iter()
            .filter(|d| matches!(d, Degradation::ModelDegraded { .. }))
    }
}
