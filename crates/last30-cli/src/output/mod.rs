use last30_core::{Finding, SourceKind};
use last30_pipeline::{Diagnosis, Report};
use serde::Serialize;

use crate::cli::EmitFormat;
use crate::ui;

pub mod compact;
pub mod markdown;

/// Render a finished report in the requested format.
pub fn render_report(report: &Report, format: EmitFormat) -> anyhow::Result<String> {
    match format {
        EmitFormat::Json => render_json(report),
        EmitFormat::Compact => compact::report(report, ui::prefs().term_width),
        EmitFormat::Md => markdown::report(report),
    }
}

/// Render a diagnostics result in the requested format.
pub fn render_diagnosis(diagnosis: &Diagnosis, format: EmitFormat) -> anyhow::Result<String> {
    match format {
        EmitFormat::Json => render_json(diagnosis),
        EmitFormat::Compact => compact::diagnosis(diagnosis),
        EmitFormat::Md => markdown::diagnosis(diagnosis),
    }
}

/// Print a rendered value to stdout.
pub fn output(rendered: &str) {
    println!("{}", rendered.trim_end());
}

fn render_json<T: Serialize>(value: &T) -> anyhow::Result<String> {
    Ok(serde_json::to_string_pretty(value)?)
}

/// `1234` -> `1.2k`, `2500000` -> `2.5M`.
#[allow(clippy::cast_precision_loss)]
pub(crate) fn human_count(n: u64) -> String {
    match n {
        0..=999 => n.to_string(),
        1_000..=999_999 => format!("{:.1}k", n as f64 / 1_000.0),
        _ => format!("{:.1}M", n as f64 / 1_000_000.0),
    }
}

/// Engagement figures worth showing for `finding`, in display order.
pub(crate) fn engagement_parts(finding: &Finding) -> Vec<String> {
    let e = &finding.engagement;
    let count = |value: Option<u64>, label: &str| value.map(|v| format!("{} {label}", human_count(v)));
    let mut parts = Vec::new();
    match finding.source {
        SourceKind::Reddit => {
            parts.extend(e.score.map(|score| {
                let sign = if score < 0 { "-" } else { "" };
                format!("{sign}{} pts", human_count(score.unsigned_abs()))
            }));
            parts.extend(count(e.comments, "comments"));
        }
        SourceKind::X => {
            parts.extend(count(e.likes, "likes"));
            parts.extend(count(e.reposts, "reposts"));
            parts.extend(count(e.replies, "replies"));
        }
        SourceKind::Youtube => {
            parts.extend(count(e.views, "views"));
            parts.extend(count(e.likes, "likes"));
            parts.extend(count(e.comments, "comments"));
        }
        SourceKind::Web => {}
    }
    parts
}

/// Where and when: community, author, date.
pub(crate) fn byline(finding: &Finding) -> Vec<String> {
    let mut parts = Vec::new();
    if let Some(community) = &finding.community {
        parts.push(match finding.source {
            SourceKind::Reddit => format!("r/{community}"),
            _ => community.clone(),
        });
    }
    if let Some(author) = &finding.author {
        parts.push(match finding.source {
            SourceKind::Reddit => format!("u/{author}"),
            SourceKind::X => format!("@{author}"),
            _ => author.clone(),
        });
    }
    parts.push(
        finding
            .published
            .map_or_else(|| "date unknown".to_string(), |ts| ts.date_naive().to_string()),
    );
    parts
}

/// Collapse whitespace and cut to `max` characters.
pub(crate) fn clip(text: &str, max: usize) -> String {
    let flat = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if flat.chars().count() <= max {
        return flat;
    }
    let mut out: String = flat.chars().take(max.saturating_sub(1)).collect();
    out.push('…');
    out
}


#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn counts_are_abbreviated() {
        assert_eq!(human_count(999), "999");
        assert_eq!(human_count(1_540), "1.5k");
        assert_eq!(human_count(2_500_000), "2.5M");
    }

    #[test]
    fn clip_flattens_and_truncates() {
        assert_eq!(clip("a  b\nc", 10), "a b c");
        assert_eq!(clip("abcdefghij", 5), "abcd…");
    }

    #[test]
    fn reddit_parts_use_prefixes() {
        let report = fixtures::report();
        let reddit = &report.findings[0].finding;
        assert_eq!(engagement_parts(reddit), vec!["1.5k pts", "212 comments"]);
        assert_eq!(byline(reddit), vec!["r/rust", "u/carllerche", "2026-03-29"]);
    }

    #[test]
    fn undated_finding_says_so() {
        let report = fixtures::report();
        let post = &report.findings[1].finding;
        assert_eq!(byline(post), vec!["@tokio_rs", "date unknown"]);
    }

    #[test]
    fn json_report_is_parseable() {
        let rendered = render_report(&fixtures::report(), EmitFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&rendered).unwrap();
        assert_eq!(value["topic"], "tokio");
        assert_eq!(value["findings"][1]["rank"], 2);
    }
}
