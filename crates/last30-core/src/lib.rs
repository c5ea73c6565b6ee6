//! # last30-core
//!
//! Core types shared across all last30days crates:
//! - [`Finding`] and [`RankedFinding`], the items flowing through the pipeline
//! - Source, depth, phase, and stage enums (with the invocation state machine)
//! - Depth presets that bound per-source result counts
//! - [`RunConfig`] resolution from command-line flags
//! - Run statistics and the recoverable [`Degradation`] taxonomy
//! - Fatal [`PipelineError`]s
//! - URL helpers for domain checks and duplicate detection

pub mod depth;
pub mod enums;
pub mod errors;
pub mod finding;
pub mod run;
pub mod stats;
pub mod urls;
pub mod window;

pub use depth::ResultBounds;
pub use enums::{Depth, EntityKind, OutputMode, Phase, SourceKind, SourceStatus, Stage};
pub use errors::PipelineError;
pub use finding::{CommentExcerpt, Engagement, Entity, Finding, RankedFinding, ScoreBreakdown};
pub use run::{MAX_DAYS, MAX_TIMEOUT_SECS, RunConfig, RunDefaults, RunFlags, validate_topic};
pub use stats::{Degradation, EnrichmentStats, ModelUse, RunStats, SourceReport};
pub use window::DateWindow;
