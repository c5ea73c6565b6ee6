//! Entity extraction for Phase 2 seeding.
//!
//! Scans Phase 1 findings for `@handle` and `r/community` references. X
//! authors count as handle mentions and Reddit communities as community
//! mentions. Names are compared case-insensitively and reported lowercased.

use std::collections::{HashMap, HashSet};
use std::sync::LazyLock;

use last30_core::{Entity, EntityKind, Finding, SourceKind};
use regex::Regex;

use crate::relevance::tokenize;

/// `@name` not preceded by a word character or a dot (skips e-mail addresses).
static HANDLE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:^|[^\w.@])@(\w{2,15})\b").expect("handle pattern is valid")
});

static COMMUNITY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\br/(\w{3,21})\b").expect("community pattern is valid"));

fn is_valid(kind: EntityKind, name: &str) -> bool {
    let len = name.chars().count();
    let ok_chars = name.chars().all(|c| c.is_alphanumeric() || c == '_');
    match kind {
        EntityKind::Handle => ok_chars && (2..=15).contains(&len),
        EntityKind::Community => ok_chars && (3..=21).contains(&len),
    }
}

/// Extract up to `limit` entities from `findings`.
///
/// Entities whose name already appears as a word in `topic` are dropped.
/// Output is ordered by mention count descending, then name ascending.
#[must_use]
pub fn extract_entities(findings: &[Finding], topic: &str, limit: usize) -> Vec<Entity> {
    let mut counts: HashMap<(EntityKind, String), usize> = HashMap::new();
    let mut bump = |kind: EntityKind, name: &str| {
        let name = name.trim_start_matches(['@', '/']);
        let name = name.strip_prefix("r/").unwrap_or(name).to_lowercase();
        if is_valid(kind, &name) {
            *counts.entry((kind, name)).or_default() += 1;
        }
    };

    for finding in findings {
        for text in [&finding.title, &finding.snippet] {
            for cap in HANDLE.captures_iter(text) {
                bump(EntityKind::Handle, &cap[1]);
            }
            for cap in COMMUNITY.captures_iter(text) {
                bump(EntityKind::Community, &cap[1]);
            }
        }
        match (finding.source, &finding.author, &finding.community) {
            (SourceKind::X, Some(author), _) => bump(EntityKind::Handle, author),
            (SourceKind::Reddit, _, Some(community)) => bump(EntityKind::Community, community),
            _ => {}
        }
    }

    let topic_words: HashSet<String> = tokenize(topic).collect();
    let mut entities: Vec<Entity> = counts
        .into_iter()
        .filter(|((_, name), _)| !topic_words.contains(name))
        .map(|((kind, name), mentions)| Entity {
            kind,
            name,
            mentions,
        })
        .collect();

    entities.sort_by(|a, b| {
        b.mentions
            .cmp(&a.mentions)
            .then_with(|| a.name.cmp(&b.name))
            .then_with(|| a.kind.cmp(&b.kind))
    });
    entities.truncate(limit);
    entities
}
