//! YouTube discovery through a local `yt-dlp` binary.
//!
//! Runs `yt-dlp "ytsearchN:<query>" --dump-json`, which prints one JSON
//! object per video. The process is killed if the discovery task is dropped
//! on timeout.

use std::path::Path;
use std::process::Stdio;

use last30_core::{Engagement, Finding, SourceKind};
use serde::Deserialize;

use crate::error::SourceError;
use crate::text::{from_unix, parse_date, truncate_chars};
use crate::youtube::watch_url;
use crate::{Discovery, DiscoveryRequest, SourceClient, cap};

/// Longest stderr excerpt carried into an error.
const MAX_STDERR: usize = 300;

#[derive(Debug, Deserialize)]
struct DumpedVideo {
    id: String,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    channel: Option<String>,
    #[serde(default)]
    uploader: Option<String>,
    /// `YYYYMMDD`.
    #[serde(default)]
    upload_date: Option<String>,
    #[serde(default)]
    timestamp: Option<f64>,
    #[serde(default)]
    view_count: Option<u64>,
    #[serde(default)]
    like_count: Option<u64>,
    #[serde(default)]
    comment_count: Option<u64>,
    #[serde(default)]
    webpage_url: Option<String>,
}

impl DumpedVideo {
    fn into_finding(self) -> Finding {
        let url = self.webpage_url.unwrap_or_else(|| watch_url(&self.id));
        let mut finding = Finding::new(SourceKind::Youtube, url, self.title.unwrap_or_default())
            .with_snippet(truncate_chars(self.description.as_deref().unwrap_or_default(), 500))
            .with_engagement(Engagement {
                views: self.view_count,
                likes: self.like_count,
                comments: self.comment_count,
                ..Engagement::default()
            });
        if let Some(channel) = self.channel.or(self.uploader) {
            finding = finding.with_author(channel.clone()).with_community(channel);
        }
        let published = self
            .timestamp
            .and_then(from_unix)
            .or_else(|| self.upload_date.as_deref().and_then(parse_date));
        if let Some(published) = published {
            finding = finding.with_published(published);
        }
        finding
    }
}

impl SourceClient {
    pub(crate) async fn search_ytdlp(
        &self,
        binary: &Path,
        request: &DiscoveryRequest,
        subject: &str,
    ) -> Result<Discovery, SourceError> {
        let output = tokio::process::Command::new(binary)
            .arg(format!("ytsearch{}:{subject}", request.bounds.max))
            .args(["--dump-json", "--skip-download", "--no-warnings", "--ignore-errors"])
            .arg("--dateafter")
            .arg(request.window.from_date().format("%Y%m%d").to_string())
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| SourceError::Tool(format!("failed to run {}: {e}", binary.display())))?;

        if !output.status.success() && output.stdout.is_empty() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(SourceError::Tool(format!(
                "yt-dlp exited with {}: {}",
                output.status,
                truncate_chars(stderr.trim(), MAX_STDERR)
            )));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let findings: Vec<Finding> = parse_dump(&stdout)
            .into_iter()
            .filter(|f| f.published.is_none_or(|p| !request.window.is_stale(p)))
            .map(|f| f.with_phase(request.phase))
            .collect();
        tracing::debug!(videos = findings.len(), "yt-dlp search finished");

        Ok(Discovery {
            findings: cap(findings, request.bounds),
            provider: Some("yt-dlp".to_string()),
            ..Discovery::default()
        })
    }
}

/// One finding per parseable line of `--dump-json` output.
fn parse_dump(stdout: &str) -> Vec<Finding> {
    stdout
        .lines()
        .map(str::trim)
        .filter(|line| line.starts_with('{'))
        .filter_map(|line| match serde_json::from_str::<DumpedVideo>(line) {
            Ok(video) => Some(video.into_finding()),
            Err(e) => {
                tracing::debug!(%e, "skipping unparseable yt-dlp line");
                None
            }
        })
        .collect()
}
