//! Engagement normalization.
//!
//! Each source contributes a weighted sum of log-saturated counts:
//! `ln(1 + count) / ln(1 + ceiling)`, capped at 1 per term. Weights per
//! source sum to 1, so the total stays in `[0, 1]`. Missing counts score 0.
//! Web results carry no engagement signal.

use last30_core::{Engagement, Finding, SourceKind};

/// Count at which a single term saturates.
mod ceiling {
    pub const REDDIT_SCORE: f64 = 5_000.0;
    pub const REDDIT_COMMENTS: f64 = 1_000.0;
    /// Applied to `upvote_ratio * 10`.
    pub const REDDIT_RATIO: f64 = 10.0;

    pub const X_LIKES: f64 = 20_000.0;
    pub const X_REPOSTS: f64 = 5_000.0;
    pub const X_REPLIES: f64 = 2_000.0;
    pub const X_QUOTES: f64 = 1_000.0;

    pub const YOUTUBE_VIEWS: f64 = 1_000_000.0;
    pub const YOUTUBE_LIKES: f64 = 50_000.0;
    pub const YOUTUBE_COMMENTS: f64 = 5_000.0;
}

fn saturate(count: f64, ceiling: f64) -> f64 {
    if count <= 0.0 {
        return 0.0;
    }
    (count.ln_1p() / ceiling.ln_1p()).min(1.0)
}

#[allow(clippy::cast_precision_loss)]
fn count(value: Option<u64>) -> f64 {
    value.map_or(0.0, |v| v as f64)
}

fn reddit(e: &Engagement) -> f64 {
    #[allow(clippy::cast_precision_loss)]
    let score = e.score.map_or(0.0, |s| s.max(0) as f64);
    let ratio = e.upvote_ratio.map_or(0.0, |r| r.clamp(0.0, 1.0) * 10.0);
    0.55 * saturate(score, ceiling::REDDIT_SCORE)
        + 0.40 * saturate(count(e.comments), ceiling::REDDIT_COMMENTS)
        + 0.05 * saturate(ratio, ceiling::REDDIT_RATIO)
}

fn x(e: &Engagement) -> f64 {
    0.55 * saturate(count(e.likes), ceiling::X_LIKES)
        + 0.25 * saturate(count(e.reposts), ceiling::X_REPOSTS)
        + 0.15 * saturate(count(e.replies), ceiling::X_REPLIES)
        + 0.05 * saturate(count(e.quotes), ceiling::X_QUOTES)
}

fn youtube(e: &Engagement) -> f64 {
    0.60 * saturate(count(e.views), ceiling::YOUTUBE_VIEWS)
        + 0.30 * saturate(count(e.likes), ceiling::YOUTUBE_LIKES)
        + 0.10 * saturate(count(e.comments), ceiling::YOUTUBE_COMMENTS)
}

/// Normalized engagement of `finding` in `[0, 1]`.
#[must_use]
pub fn engagement(finding: &Finding) -> f64 {
    let e = &finding.engagement;
    let raw = match finding.source {
        SourceKind::Reddit => reddit(e),
        SourceKind::X => x(e),
        SourceKind::Youtube => youtube(e),
        SourceKind::Web => 0.0,
    };
    raw.clamp(0.0, 1.0)
}
