//! Findings, engagement metrics, scores, and entities.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::enums::{EntityKind, Phase, SourceKind};

/// Raw engagement counts as reported by a source.
///
/// Every field is optional: sources report different subsets, and some
/// (Reddit via LLM search) report nothing until Enrichment backfills them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Engagement {
    /// Reddit score (upvotes minus downvotes). May be negative.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comments: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub upvote_ratio: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub likes: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reposts: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub replies: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quotes: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub views: Option<u64>,
}

impl Engagement {
    /// Whether no metric is present.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.score.is_none()
            && self.comments.is_none()
            && self.upvote_ratio.is_none()
            && self.likes.is_none()
            && self.reposts.is_none()
            && self.replies.is_none()
            && self.quotes.is_none()
            && self.views.is_none()
    }

    /// Overlay `patch` on top of `self`. Present patch fields win.
    pub fn apply(&mut self, patch: &Self) {
        self.score = patch.score.or(self.score);
        self.comments = patch.comments.or(self.comments);
        self.upvote_ratio = patch.upvote_ratio.or(self.upvote_ratio);
        self.likes = patch.likes.or(self.likes);
        self.reposts = patch.reposts.or(self.reposts);
        self.replies = patch.replies.or(self.replies);
        self.quotes = patch.quotes.or(self.quotes);
        self.views = patch.views.or(self.views);
    }
}

/// A top comment attached to a finding by Enrichment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommentExcerpt {
    pub author: String,
    pub score: i64,
    pub excerpt: String,
}

/// One normalized discovered item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Finding {
    pub source: SourceKind,
    pub url: String,
    pub title: String,
    #[serde(default)]
    pub snippet: String,
    /// Author or handle, without a leading `@` or `u/`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    /// Subreddit, channel, or web domain.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub community: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published: Option<DateTime<Utc>>,
    #[serde(default)]
    pub engagement: Engagement,
    /// Relevance estimate supplied by the source itself, in `[0, 1]`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relevance_hint: Option<f64>,
    #[serde(default)]
    pub phase: Phase,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub comments: Vec<CommentExcerpt>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transcript: Option<String>,
    /// Why a curating source picked this item, in its own words.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub why_relevant: Option<String>,
}

impl Finding {
    #[must_use]
    pub fn new(source: SourceKind, url: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            source,
            url: url.into(),
            title: title.into(),
            snippet: String::new(),
            author: None,
            community: None,
            published: None,
            engagement: Engagement::default(),
            relevance_hint: None,
            phase: Phase::Discovery,
            comments: Vec::new(),
            transcript: None,
            why_relevant: None,
        }
    }

    #[must_use]
    pub fn with_snippet(mut self, snippet: impl Into<String>) -> Self {
        self.snippet = snippet.into();
        self
    }

    #[must_use]
    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.author = Some(author.into());
        self
    }

    #[must_use]
    pub fn with_community(mut self, community: impl Into<String>) -> Self {
        self.community = Some(community.into());
        self
    }

    #[must_use]
    pub const fn with_published(mut self, published: DateTime<Utc>) -> Self {
        self.published = Some(published);
        self
    }

    #[must_use]
    pub fn with_engagement(mut self, engagement: Engagement) -> Self {
        self.engagement = engagement;
        self
    }

    #[must_use]
    pub fn with_relevance_hint(mut self, hint: f64) -> Self {
        self.relevance_hint = Some(hint.clamp(0.0, 1.0));
        self
    }

    #[must_use]
    pub fn with_why_relevant(mut self, why: impl Into<String>) -> Self {
        self.why_relevant = Some(why.into());
        self
    }

    #[must_use]
    pub const fn with_phase(mut self, phase: Phase) -> Self {
        self.phase = phase;
        self
    }
}

/// Score components of a ranked finding. Every field is in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub relevance: f64,
    pub recency: f64,
    pub engagement: f64,
    pub total: f64,
}

/// A scored finding. Produced once by the scorer and never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedFinding {
    /// 1-based position in the final ordering.
    pub rank: usize,
    pub score: ScoreBreakdown,
    #[serde(flatten)]
    pub finding: Finding,
}

/// A handle or community name extracted from Phase 1 findings.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Entity {
    pub kind: EntityKind,
    /// Name without its `@` or `r/` prefix, lowercased.
    pub name: String,
    pub mentions: usize,
}

impl Entity {
    /// Prefixed display form: `@name` or `r/name`.
    #[must_use]
    pub fn display(&self) -> String {
        match self.kind {
            EntityKind::Handle => format!("@{}", self.name),
            EntityKind::Community => format!("r/{}", self.name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn engagement_apply_prefers_patch_values() {
        let mut base = Engagement {
            score: Some(3),
            comments: Some(10),
            ..Default::default()
        };
        let patch = Engagement {
            score: Some(120),
            upvote_ratio: Some(0.93),
            ..Default::default()
        };
        base.apply(&patch);
        assert_eq!(base.score, Some(120));
        assert_eq!(base.comments, Some(10));
        assert_eq!(base.upvote_ratio, Some(0.93));
    }

    #[test]
    fn empty_engagement_is_empty() {
        assert!(Engagement::default().is_empty());
        let e = Engagement {
            views: Some(1),
            ..Default::default()
        };
        assert!(!e.is_empty());
    }

    #[test]
    fn finding_skips_empty_optionals_when_serialized() {
        let f = Finding::new(SourceKind::Web, "https://example.com/a", "A");
        let json = serde_json::to_value(&f).unwrap();
        assert!(json.get("author").is_none());
        assert!(json.get("comments").is_none());
        assert_eq!(json["source"], "web");
        assert_eq!(json["phase"], "discovery");
    }

    #[test]
    fn relevance_hint_is_clamped() {
        let f = Finding::new(SourceKind::X, "https://x.com/a/status/1", "t").with_relevance_hint(1.7);
        assert_eq!(f.relevance_hint, Some(1.0));
    }

    #[test]
    fn entity_display_uses_prefix() {
        let handle = Entity {
            kind: EntityKind::Handle,
            name: "karpathy".into(),
            mentions: 3,
        };
        let community = Entity {
            kind: EntityKind::Community,
            name: "localllama".into(),
            mentions: 2,
        };
        assert_eq!(handle.display(), "@karpathy");
        assert_eq!(community.display(), "r/localllama");
    }

    #[test]
    fn ranked_finding_flattens_finding_fields() {
        let ranked = RankedFinding {
            rank: 1,
            score: ScoreBreakdown {
                relevance: 1.0,
                recency: 0.5,
                engagement: 0.0,
                total: 0.575,
            },
            finding: Finding::new(SourceKind::Reddit, "https://reddit.com/r/a/comments/1", "T"),
        };
        let json = serde_json::to_value(&ranked).unwrap();
        assert_eq!(json["url"], "https://reddit.com/r/a/comments/1");
        assert_eq!(json["rank"], 1);
        let back: RankedFinding = serde_json::from_value(json).unwrap();
        assert_eq!(back.finding.title, "T");
    }
}
