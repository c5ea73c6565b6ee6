//! Collapse findings that point at the same page.
//!
//! Findings are keyed by [`canonical_url`]. The first occurrence wins its
//! position and identity; later duplicates only fill fields the first one
//! lacks. Phase 1 findings are merged before Phase 2, so a page found in both
//! keeps its discovery phase.

use std::collections::HashMap;

use last30_core::Finding;
use last30_core::urls::canonical_url;

/// Result of [`dedupe`].
#[derive(Debug, Clone, PartialEq)]
pub struct Deduped {
    pub findings: Vec<Finding>,
    /// Number of findings folded into an earlier one.
    pub removed: usize,
}

/// Merge duplicates, preserving first-seen order.
#[must_use]
pub fn dedupe(findings: Vec<Finding>) -> Deduped {
    let mut index: HashMap<String, usize> = HashMap::with_capacity(findings.len());
    let mut kept: Vec<Finding> = Vec::with_capacity(findings.len());
    let mut removed = 0;

    for finding in findings {
        let key = canonical_url(&finding.url);
        if let Some(&at) = index.get(&key) {
            fill_missing(&mut kept[at], finding);
            removed += 1;
        } else {
            index.insert(key, kept.len());
            kept.push(finding);
        }
    }

    Deduped {
        findings: kept,
        removed,
    }
}

fn fill_missing(target: &mut Finding, other: Finding) {
    if target.snippet.is_empty() {
        target.snippet = other.snippet;
    }
    if target.author.is_none() {
        target.author = other.author;
    }
    if target.community.is_none() {
        target.community = other.community;
    }
    if target.published.is_none() {
        target.published = other.published;
    }
    let mut engagement = other.engagement;
    engagement.apply(&target.engagement);
    target.engagement = engagement;
    target.relevance_hint = match (target.relevance_hint, other.relevance_hint) {
        (Some(a), Some(b)) => Some(a.max(b)),
        (a, b) => a.or(b),
    };
    if target.comments.is_empty() {
        target.comments = other.comments;
    }
    if target.transcript.is_none() {
        target.transcript = other.transcript;
    }
}
