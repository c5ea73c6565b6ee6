//! Video transcripts from the Supadata API, for YouTube videos and X posts
//! that carry a video.
//!
//! `GET /transcribe` answers 200 with the transcript when captions exist, or
//! 202 with a job id when it has to transcribe the audio. Jobs are polled at
//! `/transcribe/status/{id}` until they complete, fail, or the wait budget
//! runs out.

use std::time::Duration;

use futures::future::BoxFuture;
use last30_core::urls::path_of;
use last30_core::{Depth, Finding, SourceKind};
use serde::Deserialize;
use serde_json::Value;
use tokio::time::Instant;

use super::{Enricher, EnrichmentPatch};
use crate::SourceClient;
use crate::error::SourceError;
use crate::http::check_response;
use crate::text::truncate_words;

/// Words kept from each transcript.
pub const TRANSCRIPT_MAX_WORDS: usize = 500;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct TranscribeResponse {
    #[serde(default)]
    content: Option<Value>,
    #[serde(default)]
    job_id: Option<String>,
}

#[derive(Deserialize)]
struct JobStatus {
    #[serde(default)]
    status: String,
    #[serde(default)]
    content: Option<Value>,
    #[serde(default)]
    error: Option<Value>,
}

/// Attaches transcript excerpts to the top video findings.
pub struct TranscriptEnricher {
    client: SourceClient,
}

impl TranscriptEnricher {
    #[must_use]
    pub const fn new(client: SourceClient) -> Self {
        Self { client }
    }
}

impl Enricher for TranscriptEnricher {
    fn name(&self) -> &'static str {
        "transcript"
    }

    fn applies_to(&self, finding: &Finding) -> bool {
        finding.transcript.is_none() && (finding.source == SourceKind::Youtube || is_x_video(finding))
    }

    fn limit(&self, depth: Depth) -> Option<usize> {
        Some(depth.transcript_limit())
    }

    fn timeout(&self) -> Option<Duration> {
        Some(self.client.transcript_budget())
    }

    fn enrich<'a>(&'a self, finding: &'a Finding) -> BoxFuture<'a, Result<EnrichmentPatch, SourceError>> {
        Box::pin(async move {
            let transcript = self.client.fetch_transcript(&finding.url).await?;
            Ok(EnrichmentPatch {
                transcript: Some(transcript),
                ..EnrichmentPatch::default()
            })
        })
    }
}

/// An X post whose URL points at its video, or whose text says it has one.
fn is_x_video(finding: &Finding) -> bool {
    if finding.source != SourceKind::X {
        return false;
    }
    let path = path_of(&finding.url);
    if !path.contains("/status/") {
        return false;
    }
    path.contains("/video/") || mentions_video(&finding.title) || mentions_video(&finding.snippet)
}

fn mentions_video(text: &str) -> bool {
    text.split(|c: char| !c.is_alphanumeric())
        .any(|word| word.eq_ignore_ascii_case("video"))
}

impl SourceClient {
    /// Longest a transcript lookup can take: the first request, then polls
    /// until the wait budget runs out plus one interval and request.
    pub(crate) fn transcript_budget(&self) -> Duration {
        self.request_timeout
            .saturating_mul(2)
            .saturating_add(self.transcript_max_wait)
            .saturating_add(self.transcript_poll_interval)
    }

    /// Fetch the transcript of `video_url`, truncated to
    /// [`TRANSCRIPT_MAX_WORDS`] words. Accepts YouTube and X URLs.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::MissingCredential`] without a Supadata key,
    /// [`SourceError::Parse`] when the job fails, times out, or yields an
    /// empty transcript, and HTTP/API errors otherwise.
    pub async fn fetch_transcript(&self, video_url: &str) -> Result<String, SourceError> {
        if self.credentials.supadata_api_key.is_empty() {
            return Err(SourceError::MissingCredential("SUPADATA_API_KEY"));
        }
        let base = self.endpoints.supadata.trim_end_matches('/');
        let url = format!(
            "{base}/transcribe?url={}&mode=auto",
            urlencoding::encode(video_url)
        );
        let resp = check_response(
            self.http
                .get(&url)
                .header("x-api-key", &self.credentials.supadata_api_key)
                .send()
                .await?,
        )
        .await?;

        let data: TranscribeResponse = resp.json().await?;
        let content = match (data.content, data.job_id) {
            (Some(content), _) => content,
            (None, Some(job_id)) => self.poll_transcript_job(base, &job_id).await?,
            (None, None) => {
                return Err(SourceError::Parse(
                    "transcribe response has neither content nor jobId".to_string(),
                ));
            }
        };

        let text = content_text(&content);
        if text.trim().is_empty() {
            return Err(SourceError::Parse("empty transcript".to_string()));
        }
        Ok(truncate_words(&text, TRANSCRIPT_MAX_WORDS))
    }

    async fn poll_transcript_job(&self, base: &str, job_id: &str) -> Result<Value, SourceError> {
        let url = format!("{base}/transcribe/status/{}", urlencoding::encode(job_id));
        let deadline = Instant::now() + self.transcript_max_wait;

        loop {
            tokio::time::sleep(self.transcript_poll_interval).await;
            let resp = check_response(
                self.http
                    .get(&url)
                    .header("x-api-key", &self.credentials.supadata_api_key)
                    .send()
                    .await?,
            )
            .await?;
            let job: JobStatus = resp.json().await?;
            tracing::debug!(job_id, status = job.status.as_str(), "transcript job polled");

            match job.status.as_str() {
                "completed" => {
                    return job
                        .content
                        .ok_or_else(|| SourceError::Parse("completed job has no content".to_string()));
                }
                "failed" => {
                    let reason = job.error.map(|e| e.to_string()).unwrap_or_default();
                    return Err(SourceError::Parse(format!("transcript job failed {reason}").trim().to_string()));
                }
                _ => {}
            }

            if Instant::now() >= deadline {
                return Err(SourceError::Parse(format!(
                    "transcript job {job_id} did not finish within {}s",
                    self.transcript_max_wait.as_secs()
                )));
            }
        }
    }
}

/// Plain text from either a string or a list of timed segments.
fn content_text(content: &Value) -> String {
    match content {
        Value::String(text) => text.clone(),
        Value::Array(segments) => segments
            .iter()
            .filter_map(|s| s.get("text").and_then(Value::as_str))
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(" "),
        _ => String::new(),
    }
}
