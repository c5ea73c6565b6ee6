//! Enrichment: lookups that backfill data discovery could not provide.
//!
//! An [`Enricher`] never touches a finding directly. It returns an
//! [`EnrichmentPatch`] that the pipeline merges once every lookup finished.

mod reddit;
mod transcript;

pub use reddit::RedditThreadEnricher;
pub use transcript::TranscriptEnricher;

use std::time::Duration;

use chrono::{DateTime, Utc};
use futures::future::BoxFuture;
use last30_core::{CommentExcerpt, Depth, Engagement, Finding};

use crate::error::SourceError;

/// Data gathered for one finding.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EnrichmentPatch {
    pub engagement: Engagement,
    pub comments: Vec<CommentExcerpt>,
    pub transcript: Option<String>,
    /// Only applied when the finding has no date.
    pub published: Option<DateTime<Utc>>,
}

impl EnrichmentPatch {
    /// Merge into `finding`. Patch values win, absent values leave the
    /// finding alone.
    pub fn apply_to(&self, finding: &mut Finding) {
        finding.engagement.apply(&self.engagement);
        if !self.comments.is_empty() {
            finding.comments.clone_from(&self.comments);
        }
        if self.transcript.is_some() {
            finding.transcript.clone_from(&self.transcript);
        }
        if finding.published.is_none() {
            finding.published = self.published;
        }
    }
}

pub trait Enricher: Send + Sync {
    /// Short name for logs and stats.
    fn name(&self) -> &'static str;

    fn applies_to(&self, finding: &Finding) -> bool;

    /// At most this many findings are enriched per run, best first.
    /// `None` means every applicable finding.
    fn limit(&self, _depth: Depth) -> Option<usize> {
        None
    }

    /// Time one lookup needs when that exceeds the run's enrichment timeout.
    fn timeout(&self) -> Option<Duration> {
        None
    }

    fn enrich<'a>(&'a self, finding: &'a Finding) -> BoxFuture<'a, Result<EnrichmentPatch, SourceError>>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use last30_core::SourceKind;

    #[test]
    fn patch_fills_without_erasing() {
        let published = Utc.with_ymd_and_hms(2026, 3, 2, 0, 0, 0).unwrap();
        let mut finding = Finding::new(SourceKind::Reddit, "https://reddit.com/r/a/comments/1", "t")
            .with_engagement(Engagement {
                score: Some(10),
                comments: Some(3),
                ..Engagement::default()
            });
        let patch = EnrichmentPatch {
            engagement: Engagement {
                score: Some(42),
                upvote_ratio: Some(0.93),
                ..Engagement::default()
            },
            comments: vec![CommentExcerpt {
                author: "ferris".into(),
                score: 12,
                excerpt: "great thread".into(),
            }],
            transcript: None,
            published: Some(published),
        };
        patch.apply_to(&mut finding);

        assert_eq!(finding.engagement.score, Some(42));
        assert_eq!(finding.engagement.comments, Some(3));
        assert_eq!(finding.engagement.upvote_ratio, Some(0.93));
        assert_eq!(finding.comments.len(), 1);
        assert_eq!(finding.published, Some(published));
    }

    #[test]
    fn patch_never_overrides_known_date() {
        let known = Utc.with_ymd_and_hms(2026, 3, 5, 0, 0, 0).unwrap();
        let mut finding = Finding::new(SourceKind::Reddit, "u", "t").with_published(known);
        EnrichmentPatch {
            published: Some(Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap()),
            ..EnrichmentPatch::default()
        }
        .apply_to(&mut finding);
        assert_eq!(finding.published, Some(known));
    }
}
