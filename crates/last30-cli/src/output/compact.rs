//! Plain terminal text.

use std::fmt::Write;

use last30_core::SourceStatus;
use last30_pipeline::{Diagnosis, Report};

use super::{byline, clip, engagement_parts};

const DEFAULT_WIDTH: usize = 100;
const SNIPPET_CHARS: usize = 160;

pub fn report(report: &Report, width: Option<usize>) -> anyhow::Result<String> {
    let width = width.unwrap_or(DEFAULT_WIDTH);
    let mut out = String::new();

    writeln!(
        out,
        "last30days: \"{}\" ({} to {}, {} depth)",
        report.topic,
        report.window.from_date(),
        report.window.to_date(),
        report.depth
    )?;
    writeln!(out, "{}", report.summary.headline)?;
    if !report.summary.top_communities.is_empty() {
        writeln!(out, "Top communities: {}", report.summary.top_communities.join(", "))?;
    }
    if let Some(overview) = &report.overview {
        writeln!(out, "\n{}", overview.trim())?;
    }

    if !report.findings.is_empty() {
        writeln!(out)?;
    }
    for ranked in &report.findings {
        let finding = &ranked.finding;
        let lead = format!("{:>3}. [{}] ", ranked.rank, finding.source);
        let title_room = width.saturating_sub(lead.len()).max(20);
        writeln!(out, "{lead}{}", clip(&finding.title, title_room))?;

        let mut meta = byline(finding);
        meta.extend(engagement_parts(finding));
        meta.push(format!("score {:.2}", ranked.score.total));
        writeln!(out, "     {}", meta.join(" | "))?;
        if !finding.snippet.is_empty() {
            writeln!(out, "     {}", clip(&finding.snippet, SNIPPET_CHARS))?;
        }
        writeln!(out, "     {}", finding.url)?;
    }

    let stats = &report.stats;
    writeln!(out)?;
    let sources: Vec<String> = stats
        .sources
        .iter()
        .map(|s| match s.status {
            SourceStatus::Ok => format!("{} ok ({}+{})", s.source, s.discovered, s.supplemental),
            status => match &s.detail {
                Some(detail) => format!("{} {status}: {detail}", s.source),
                None => format!("{} {status}", s.source),
            },
        })
        .collect();
    writeln!(out, "Sources: {}", sources.join("; "))?;
    if !stats.entities.is_empty() {
        let names: Vec<String> = stats.entities.iter().map(last30_core::Entity::display).collect();
        writeln!(out, "Followed up: {}", names.join(", "))?;
    }
    writeln!(
        out,
        "Dropped: {} duplicates, {} outside window | enrichment {}/{} | {}ms",
        stats.duplicates_removed,
        stats.excluded_out_of_window,
        stats.enrichment.succeeded,
        stats.enrichment.attempted,
        stats.elapsed_ms
    )?;
    if !stats.degradations.is_empty() {
        writeln!(out, "Degradations:")?;
        for degradation in &stats.degradations {
            writeln!(out, "  - {degradation}")?;
        }
    }
    Ok(out)
}

pub fn diagnosis(diagnosis: &Diagnosis) -> anyhow::Result<String> {
    let mut out = String::new();
    for entry in &diagnosis.sources {
        let state = match (entry.enabled, entry.available) {
            (_, true) => "available",
            (true, false) if entry.required => "missing",
            (true, false) => "unavailable",
            (false, false) => "off",
        };
        let detail = entry
            .provider
            .as_deref()
            .or(entry.reason.as_deref())
            .unwrap_or_default();
        let enabled = if entry.enabled { "enabled" } else { "disabled" };
        writeln!(out, "{:<8} {enabled:<9} {state:<12} {detail}", entry.source.as_str())?;
    }
    writeln!(
        out,
        "transcripts: {}",
        if diagnosis.transcripts {
            "configured"
        } else {
            "not configured"
        }
    )?;
    Ok(out)
}
