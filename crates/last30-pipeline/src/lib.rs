//! # last30-pipeline
//!
//! Orchestrates one last30days run:
//!
//! ```text
//! diagnose → phase 1 discovery → entity extraction → phase 2 discovery
//!          → enrichment → scoring → synthesis
//! ```
//!
//! Sources and enrichers are injected as trait objects, so the same
//! [`Pipeline`] drives live API clients and in-memory fakes. Every
//! source-level failure is absorbed into [`RunStats`]; only
//! [`PipelineError`]s stop a run.
//!
//! [`RunStats`]: last30_core::RunStats
//! [`PipelineError`]: last30_core::PipelineError

pub mod diagnostics;
pub mod report;
pub mod tracker;

mod deadline;
mod discovery;
mod enrichment;
mod pipeline;

pub use diagnostics::{Diagnosis, SourceAvailability, diagnose};
pub use pipeline::Pipeline;
pub use report::{Report, SourceCount, Summary};
pub use tracker::StageTracker;
