//! # last30-rank
//!
//! Pure functions over batches of findings:
//! - [`dedupe`] collapses findings that point at the same page
//! - [`extract_entities`] pulls `@handle` and `r/community` seeds for Phase 2
//! - [`rank`] scores, filters, and orders findings into [`RankedFinding`]s
//!
//! Nothing here performs I/O. Given the same findings, topic, and window the
//! output is identical.
//!
//! [`RankedFinding`]: last30_core::RankedFinding

pub mod dedupe;
pub mod engagement;
pub mod entities;
pub mod recency;
pub mod relevance;
pub mod scorer;

pub use dedupe::{Deduped, dedupe};
pub use entities::extract_entities;
pub use relevance::QueryTerms;
pub use scorer::{Ranking, rank, score};
