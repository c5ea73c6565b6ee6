//! Weighted scoring and final ordering.
//!
//! `total = 0.45 * relevance + 0.25 * recency + 0.30 * engagement`
//!
//! Findings published before the window start are excluded before scoring.
//! Ordering is total descending, then published descending (unknown dates
//! last), then URL ascending, so ties resolve the same way on every run.

use std::cmp::Ordering;

use last30_core::{DateWindow, Finding, RankedFinding, ScoreBreakdown};

use crate::engagement::engagement;
use crate::recency::recency;
use crate::relevance::{QueryTerms, relevance};

pub const RELEVANCE_WEIGHT: f64 = 0.45;
pub const RECENCY_WEIGHT: f64 = 0.25;
pub const ENGAGEMENT_WEIGHT: f64 = 0.30;

/// Output of [`rank`].
#[derive(Debug, Clone, PartialEq)]
pub struct Ranking {
    pub findings: Vec<RankedFinding>,
    /// Findings dropped for falling outside the window.
    pub excluded: usize,
}

/// Score a single finding. Reads only fields already present on it.
#[must_use]
pub fn score(finding: &Finding, terms: &QueryTerms, window: &DateWindow) -> ScoreBreakdown {
    let relevance = relevance(terms, finding);
    let recency = recency(finding.published, window);
    let engagement = engagement(finding);
    let total = ENGAGEMENT_WEIGHT.mul_add(
        engagement,
        RELEVANCE_WEIGHT.mul_add(relevance, RECENCY_WEIGHT * recency),
    );
    ScoreBreakdown {
        relevance,
        recency,
        engagement,
        total: total.clamp(0.0, 1.0),
    }
}

/// Exclude stale findings, score the rest, and order them.
#[must_use]
pub fn rank(findings: Vec<Finding>, topic: &str, window: &DateWindow) -> Ranking {
    let terms = QueryTerms::new(topic);
    let total = findings.len();

    let mut scored: Vec<(ScoreBreakdown, Finding)> = findings
        .into_iter()
        .filter(|f| f.published.is_none_or(|ts| !window.is_stale(ts)))
        .map(|f| (score(&f, &terms, window), f))
        .collect();
    let excluded = total - scored.len();
    if excluded > 0 {
        tracing::debug!(excluded, "dropped findings older than the window");
    }

    scored.sort_by(|(sa, fa), (sb, fb)| compare(sa, fa, sb, fb));

    let findings = scored
        .into_iter()
        .enumerate()
        .map(|(i, (score, finding))| RankedFinding {
            rank: i + 1,
            score,
            finding,
        })
        .collect();

    Ranking { findings, excluded }
}

fn compare(sa: &ScoreBreakdown, fa: &Finding, sb: &ScoreBreakdown, fb: &Finding) -> Ordering {
    sb.total
        .partial_cmp(&sa.total)
        .unwrap_or(Ordering::Equal)
        .then_with(|| match (fa.published, fb.published) {
            (Some(a), Some(b)) => b.cmp(&a),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        })
        .then_with(|| fa.url.cmp(&fb.url))
}
