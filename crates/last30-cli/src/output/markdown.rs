//! Markdown document, grouped by source.

use std::fmt::Write;

use last30_core::SourceKind;
use last30_pipeline::{Diagnosis, Report};

use super::{byline, clip, engagement_parts};

const SNIPPET_CHARS: usize = 300;
const COMMENT_CHARS: usize = 200;
const COMMENTS_SHOWN: usize = 2;

/// Escape characters that would break a table cell or link text.
fn escape(text: &str) -> String {
    text.replace('|', "\\|").replace('[', "\\[").replace(']', "\\]")
}

pub fn report(report: &Report) -> anyhow::Result<String> {
    let mut out = String::new();

    writeln!(out, "# last30days: {}\n", escape(&report.topic))?;
    writeln!(
        out,
        "_{}. Window {} to {}, {} depth._\n",
        report.summary.headline,
        report.window.from_date(),
        report.window.to_date(),
        report.depth
    )?;
    if let Some(overview) = &report.overview {
        writeln!(out, "## Overview\n\n{}\n", overview.trim())?;
    }

    for source in SourceKind::ALL {
        let mut findings = report.findings_from(source).peekable();
        if findings.peek().is_none() {
            continue;
        }
        writeln!(out, "## {}\n", source.label())?;
        for ranked in findings {
            let finding = &ranked.finding;
            let mut meta = byline(finding);
            meta.extend(engagement_parts(finding));
            writeln!(
                out,
                "{}. **[{}]({})** ({}) score {:.2}",
                ranked.rank,
                escape(&finding.title),
                finding.url,
                meta.join(", "),
                ranked.score.total
            )?;
            if !finding.snippet.is_empty() {
                writeln!(out, "   > {}", clip(&finding.snippet, SNIPPET_CHARS))?;
            }
            if let Some(why) = &finding.why_relevant {
                writeln!(out, "   - _{}_", clip(why, SNIPPET_CHARS))?;
            }
            for comment in finding.comments.iter().take(COMMENTS_SHOWN) {
                writeln!(
                    out,
                    "   - u/{} ({}): {}",
                    comment.author,
                    comment.score,
                    clip(&comment.excerpt, COMMENT_CHARS)
                )?;
            }
            if finding.transcript.is_some() {
                writeln!(out, "   - transcript available")?;
            }
        }
        writeln!(out)?;
    }

    let stats = &report.stats;
    writeln!(out, "## Sources\n")?;
    writeln!(out, "| Source | Status | Phase 1 | Phase 2 | Provider | Detail |")?;
    writeln!(out, "|---|---|---|---|---|---|")?;
    for s in &stats.sources {
        writeln!(
            out,
            "| {} | {} | {} | {} | {} | {} |",
            s.source.label(),
            s.status,
            s.discovered,
            s.supplemental,
            s.provider.as_deref().unwrap_or("-"),
            escape(s.detail.as_deref().unwrap_or("-"))
        )?;
    }
    writeln!(out)?;
    writeln!(
        out,
        "{} duplicates removed, {} outside the window, enrichment {}/{} succeeded, {} ms.",
        stats.duplicates_removed,
        stats.excluded_out_of_window,
        stats.enrichment.succeeded,
        stats.enrichment.attempted,
        stats.elapsed_ms
    )?;

    if !stats.degradations.is_empty() {
        writeln!(out, "\n## Degradations\n")?;
        for degradation in &stats.degradations {
            writeln!(out, "- {degradation}")?;
        }
    }
    Ok(out)
}

pub fn diagnosis(diagnosis: &Diagnosis) -> anyhow::Result<String> {
    let mut out = String::new();
    writeln!(out, "# last30days diagnostics\n")?;
    writeln!(out, "| Source | Enabled | Available | Provider | Reason |")?;
    writeln!(out, "|---|---|---|---|---|")?;
    for entry in &diagnosis.sources {
        writeln!(
            out,
            "| {} | {} | {} | {} | {} |",
            entry.source.label(),
            if entry.enabled { "yes" } else { "no" },
            if entry.available { "yes" } else { "no" },
            escape(entry.provider.as_deref().unwrap_or("-")),
            escape(entry.reason.as_deref().unwrap_or("-"))
        )?;
    }
    writeln!(
        out,
        "\nTranscripts: {}",
        if diagnosis.transcripts { "configured" } else { "not configured" }
    )?;
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::fixtures;

    #[test]
    fn sections_follow_source_order() {
        let text = report(&fixtures::report()).unwrap();
        let reddit = text.find("## Reddit").unwrap();
        let x = text.find("## X").unwrap();
        let sources = text.find("## Sources").unwrap();
        assert!(reddit < x && x < sources);
        assert!(!text.contains("## YouTube\n"));
    }

    #[test]
    fn findings_link_to_their_url() {
        let text = report(&fixtures::report()).unwrap();
        assert!(text.contains("1. **[Tokio 2.0 plans](https://www.reddit.com/r/rust/comments/abc/)**"));
        assert!(text.contains("   > Discussion of the roadmap"));
        assert!(text.contains("| YouTube | failed | 0 | 0 | - | HTTP 500 |"));
    }

    #[test]
    fn curated_findings_say_why() {
        let mut report = fixtures::report();
        report.findings[1].finding.why_relevant = Some("Cited for the release date".into());
        let text = super::report(&report).unwrap();
        assert!(text.contains("   - _Cited for the release date_"));
    }

    #[test]
    fn table_cells_are_escaped() {
        assert_eq!(escape("a | [b]"), "a \\| \\[b\\]");
    }
}
