//! YouTube discovery through the Data API v3.
//!
//! Two calls: `search` for video ids inside the window, then `videos` for
//! view/like/comment counts. A failed statistics call keeps the videos
//! without engagement. Without an API key the local `yt-dlp` backend in
//! [`crate::ytdlp`] is used instead.

use chrono::SecondsFormat;
use last30_core::{Engagement, Finding, SourceKind};
use serde::Deserialize;

use crate::error::SourceError;
use crate::http::check_response;
use crate::text::parse_date;
use crate::{Discovery, DiscoveryRequest, SourceClient, cap, query};

/// Largest page the search endpoint serves.
const MAX_PAGE: usize = 50;

#[derive(Deserialize)]
struct SearchResponse {
    #[serde(default)]
    items: Vec<SearchItem>,
}

#[derive(Deserialize)]
struct SearchItem {
    id: SearchId,
    #[serde(default)]
    snippet: VideoSnippet,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchId {
    video_id: Option<String>,
}

#[derive(Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct VideoSnippet {
    title: String,
    description: String,
    channel_title: String,
    published_at: Option<String>,
}

#[derive(Deserialize)]
struct VideosResponse {
    #[serde(default)]
    items: Vec<VideoStats>,
}

#[derive(Deserialize)]
struct VideoStats {
    id: String,
    #[serde(default)]
    statistics: Statistics,
}

/// The API reports counts as decimal strings.
#[derive(Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct Statistics {
    view_count: Option<String>,
    like_count: Option<String>,
    comment_count: Option<String>,
}

impl Statistics {
    fn engagement(&self) -> Engagement {
        let count = |raw: &Option<String>| raw.as_deref().and_then(|v| v.parse::<u64>().ok());
        Engagement {
            views: count(&self.view_count),
            likes: count(&self.like_count),
            comments: count(&self.comment_count),
            ..Engagement::default()
        }
    }
}

impl SourceClient {
    /// Search YouTube videos about the request topic.
    ///
    /// The query is reduced to its core subject first. Targeted requests
    /// return nothing.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::MissingCredential`] when neither an API key nor
    /// `yt-dlp` is available, or the backend's request error.
    pub async fn search_youtube(&self, request: &DiscoveryRequest) -> Result<Discovery, SourceError> {
        if request.target.is_some() {
            return Ok(Discovery::empty());
        }
        let subject = query::core_subject(&request.topic);
        if !self.credentials.youtube_api_key.is_empty() {
            return self.search_youtube_api(request, &subject).await;
        }
        match &self.tools.yt_dlp {
            Some(path) => self.search_ytdlp(path, request, &subject).await,
            None => Err(SourceError::MissingCredential("YOUTUBE_API_KEY")),
        }
    }

    async fn search_youtube_api(
        &self,
        request: &DiscoveryRequest,
        subject: &str,
    ) -> Result<Discovery, SourceError> {
        let base = self.endpoints.youtube.trim_end_matches('/');
        let key = urlencoding::encode(&self.credentials.youtube_api_key);
        let url = format!(
            "{base}/search?part=snippet&type=video&order=relevance&maxResults={max}&q={q}&publishedAfter={after}&publishedBefore={before}&key={key}",
            max = request.bounds.max.min(MAX_PAGE),
            q = urlencoding::encode(subject),
            after = urlencoding::encode(&request.window.start.to_rfc3339_opts(SecondsFormat::Secs, true)),
            before = urlencoding::encode(&request.window.end.to_rfc3339_opts(SecondsFormat::Secs, true)),
        );
        let resp = check_response(self.http.get(&url).send().await?).await?;
        let data: SearchResponse = resp.json().await?;

        let mut findings: Vec<Finding> = data
            .items
            .into_iter()
            .filter_map(|item| {
                let id = item.id.video_id?;
                Some(video_finding(&id, item.snippet).with_phase(request.phase))
            })
            .collect();
        findings = cap(findings, request.bounds);

        let mut warnings = Vec::new();
        if !findings.is_empty() {
            match self.video_statistics(&findings).await {
                Ok(stats) => {
                    for finding in &mut findings {
                        let id = video_id(&finding.url);
                        if let Some(stat) = stats.iter().find(|s| id == Some(s.id.as_str())) {
                            finding.engagement = stat.statistics.engagement();
                        }
                    }
                }
                Err(e) => {
                    tracing::warn!(%e, "youtube statistics lookup failed");
                    warnings.push(format!("statistics: {e}"));
                }
            }
        }

        Ok(Discovery {
            findings,
            provider: Some("youtube-data-api".to_string()),
            warnings,
            ..Discovery::default()
        })
    }

    async fn video_statistics(&self, findings: &[Finding]) -> Result<Vec<VideoStats>, SourceError> {
        let ids: Vec<&str> = findings.iter().filter_map(|f| video_id(&f.url)).collect();
        let url = format!(
            "{base}/videos?part=statistics&id={ids}&key={key}",
            base = self.endpoints.youtube.trim_end_matches('/'),
            ids = urlencoding::encode(&ids.join(",")),
            key = urlencoding::encode(&self.credentials.youtube_api_key),
        );
        let resp = check_response(self.http.get(&url).send().await?).await?;
        let data: VideosResponse = resp.json().await?;
        Ok(data.items)
    }
}

fn video_finding(id: &str, snippet: VideoSnippet) -> Finding {
    let mut finding = Finding::new(SourceKind::Youtube, watch_url(id), decode_entities(&snippet.title))
        .with_snippet(decode_entities(&snippet.description));
    if !snippet.channel_title.is_empty() {
        finding = finding
            .with_author(snippet.channel_title.clone())
            .with_community(snippet.channel_title);
    }
    if let Some(published) = snippet.published_at.as_deref().and_then(parse_date) {
        finding = finding.with_published(published);
    }
    finding
}

pub(crate) fn watch_url(id: &str) -> String {
    format!("https://www.youtube.com/watch?v={id}")
}

/// Video id from a watch URL.
pub(crate) fn video_id(url: &str) -> Option<&str> {
    url.split_once("v=")
        .map(|(_, rest)| rest.split('&').next().unwrap_or(rest))
        .filter(|id| !id.is_empty())
}

/// The handful of entities the API leaves in titles and descriptions.
fn decode_entities(text: &str) -> String {
    text.replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const SEARCH_FIXTURE: &str = r#"{
        "items": [
            {
                "id": {"kind": "youtube#video", "videoId": "abc123"},
                "snippet": {
                    "title": "Tokio vs async-std &amp; friends",
                    "description": "We compare runtimes",
                    "channelTitle": "Rust Talks",
                    "publishedAt": "2026-03-20T15:00:00Z"
                }
            },
            {
                "id": {"kind": "youtube#channel", "channelId": "UC1"},
                "snippet": {"title": "A channel"}
            }
        ]
    }"#;

    #[test]
    fn parse_search_response() {
        let data: SearchResponse = serde_json::from_str(SEARCH_FIXTURE).unwrap();
        let findings: Vec<Finding> = data
            .items
            .into_iter()
            .filter_map(|item| Some(video_finding(&item.id.video_id?, item.snippet)))
            .collect();
        assert_eq!(findings.len(), 1);
        let video = &findings[0];
        assert_eq!(video.url, "https://www.youtube.com/watch?v=abc123");
        assert_eq!(video.title, "Tokio vs async-std & friends");
        assert_eq!(video.author.as_deref(), Some("Rust Talks"));
        assert!(video.published.is_some());
    }

    #[test]
    fn statistics_strings_become_counts() {
        let data: VideosResponse = serde_json::from_str(
            r#"{"items": [{"id": "abc123", "statistics": {"viewCount": "15000", "likeCount": "900", "favoriteCount": "0"}}]}"#,
        )
        .unwrap();
        let engagement = data.items[0].statistics.engagement();
        assert_eq!(engagement.views, Some(15_000));
        assert_eq!(engagement.likes, Some(900));
        assert_eq!(engagement.comments, None);
    }

    #[test]
    fn video_id_from_watch_url() {
        assert_eq!(video_id("https://www.youtube.com/watch?v=abc123&t=10"), Some("abc123"));
        assert_eq!(video_id("https://youtu.be/abc123"), None);
    }
}
