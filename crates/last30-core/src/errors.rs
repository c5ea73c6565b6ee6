//! Fatal pipeline errors.
//!
//! Only these stop a run. Source-level failures are recorded as
//! [`crate::Degradation`]s instead. Crate-specific errors (`SourceError`,
//! `StoreError`, `ConfigError`) live in their own crates and converge in the
//! CLI.

use thiserror::Error;

/// Errors that abort a run before Discovery.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PipelineError {
    /// No enabled source has its credential or tool available.
    #[error("no sources available: {}", missing.join("; "))]
    NoSourcesAvailable { missing: Vec<String> },

    /// Conflicting or malformed flags. Raised before any network activity.
    #[error("invalid configuration: {0}")]
    ConfigInvalid(String),
}

impl PipelineError {
    /// Process exit code for this error.
    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::ConfigInvalid(_) => 2,
            Self::NoSourcesAvailable { .. } => 3,
        }
    }
}
