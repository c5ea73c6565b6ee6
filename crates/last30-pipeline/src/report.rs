//! Synthesis: the final structured report.
//!
//! Synthesis only orders, groups, and counts. It never changes a finding.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use last30_core::{DateWindow, Depth, RankedFinding, RunStats, SourceKind};
use last30_store::StoredRun;
use serde::Serialize;

/// How many communities and authors the summary names.
const SUMMARY_TOP: usize = 5;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceCount {
    pub source: SourceKind,
    pub count: usize,
}

/// Headline figures for the top of a report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub headline: String,
    pub total: usize,
    /// Findings per source, canonical order, zero counts omitted.
    pub by_source: Vec<SourceCount>,
    /// Most frequent communities (subreddits, channels, domains).
    pub top_communities: Vec<String>,
    pub top_authors: Vec<String>,
}

/// Everything a run produced.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
    pub topic: String,
    pub generated_at: DateTime<Utc>,
    pub window: DateWindow,
    pub depth: Depth,
    pub summary: Summary,
    /// Provider-written overview, when one was returned.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub overview: Option<String>,
    pub findings: Vec<RankedFinding>,
    pub stats: RunStats,
}

impl Report {
    /// Assemble a report from ranked findings.
    #[must_use]
    pub fn synthesize(
        topic: &str,
        generated_at: DateTime<Utc>,
        window: DateWindow,
        depth: Depth,
        findings: Vec<RankedFinding>,
        stats: RunStats,
        overview: Option<String>,
    ) -> Self {
        let summary = summarize(&findings, window.days);
        Self {
            topic: topic.to_string(),
            generated_at,
            window,
            depth,
            summary,
            overview,
            findings,
            stats,
        }
    }

    /// Findings from `source`, best first.
    pub fn findings_from(&self, source: SourceKind) -> impl Iterator<Item = &RankedFinding> {
        self.findings.iter().filter(move |r| r.finding.source == source)
    }

    /// Record for the run store.
    #[must_use]
    pub fn to_stored_run(&self) -> StoredRun {
        StoredRun::new(
            self.topic.clone(),
            self.generated_at,
            self.window.days,
            self.depth,
            self.stats.clone(),
            self.findings.clone(),
        )
    }
}

fn top_names<'a>(names: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for name in names.filter(|n| !n.is_empty()) {
        *counts.entry(name).or_default() += 1;
    }
    let mut ranked: Vec<(&str, usize)> = counts.into_iter().collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
    ranked
        .into_iter()
        .take(SUMMARY_TOP)
        .map(|(name, _)| name.to_string())
        .collect()
}

fn summarize(findings: &[RankedFinding], days: u32) -> Summary {
    let by_source: Vec<SourceCount> = SourceKind::ALL
        .into_iter()
        .map(|source| SourceCount {
            source,
            count: findings.iter().filter(|r| r.finding.source == source).count(),
        })
        .filter(|c| c.count > 0)
        .collect();

    let headline = if findings.is_empty() {
        format!("No findings from the last {days} days")
    } else {
        let labels: Vec<&str> = by_source.iter().map(|c| c.source.label()).collect();
        format!(
            "{} findings across {} from the last {days} days",
            findings.len(),
            join_labels(&labels)
        )
    };

    Summary {
        headline,
        total: findings.len(),
        by_source,
        top_communities: top_names(findings.iter().filter_map(|r| r.finding.community.as_deref())),
        top_authors: top_names(findings.iter().filter_map(|r| r.finding.author.as_deref())),
    }
}

fn join_labels(labels: &[&str]) -> String {
    match labels {
        [] => String::new(),
        [one] => (*one).to_string(),
        [init @ .., last] => format!("{} and {last}", init.join(", ")),
    }
}
