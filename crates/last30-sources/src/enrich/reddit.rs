//! Reddit thread metrics from the public `<thread>.json` endpoint.

use futures::future::BoxFuture;
use last30_core::urls::path_of;
use last30_core::{CommentExcerpt, Engagement, Finding, SourceKind};
use serde::Deserialize;

use super::{Enricher, EnrichmentPatch};
use crate::error::SourceError;
use crate::http::check_response;
use crate::text::{from_unix, truncate_chars};
use crate::SourceClient;

const TOP_COMMENTS: usize = 3;
const MAX_EXCERPT: usize = 300;

#[derive(Deserialize)]
struct Listing {
    data: ListingData,
}

#[derive(Deserialize)]
struct ListingData {
    #[serde(default)]
    children: Vec<Thing>,
}

#[derive(Deserialize)]
struct Thing {
    #[serde(default)]
    kind: String,
    #[serde(default)]
    data: ThingData,
}

#[derive(Default, Deserialize)]
#[serde(default)]
struct ThingData {
    score: Option<i64>,
    num_comments: Option<u64>,
    upvote_ratio: Option<f64>,
    created_utc: Option<f64>,
    author: Option<String>,
    body: Option<String>,
    stickied: bool,
}

/// Backfills score, comment count, upvote ratio, and top comments.
pub struct RedditThreadEnricher {
    client: SourceClient,
}

impl RedditThreadEnricher {
    #[must_use]
    pub const fn new(client: SourceClient) -> Self {
        Self { client }
    }
}

impl Enricher for RedditThreadEnricher {
    fn name(&self) -> &'static str {
        "reddit-thread"
    }

    fn applies_to(&self, finding: &Finding) -> bool {
        finding.source == SourceKind::Reddit && path_of(&finding.url).contains("/comments/")
    }

    fn enrich<'a>(&'a self, finding: &'a Finding) -> BoxFuture<'a, Result<EnrichmentPatch, SourceError>> {
        Box::pin(self.client.fetch_reddit_thread(&finding.url))
    }
}

impl SourceClient {
    /// Fetch a thread's JSON listing and extract its metrics.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError`] if the HTTP request fails, Reddit returns a
    /// non-success status, or the listing has an unexpected shape.
    pub async fn fetch_reddit_thread(&self, thread_url: &str) -> Result<EnrichmentPatch, SourceError> {
        let path = path_of(thread_url);
        let url = format!(
            "{base}{path}.json?raw_json=1&sort=top",
            base = self.endpoints.reddit.trim_end_matches('/'),
            path = path.trim_end_matches('/'),
        );
        let resp = check_response(self.http.get(&url).send().await?).await?;
        let listings: Vec<Listing> = resp.json().await?;
        parse_thread(listings)
    }
}

fn parse_thread(listings: Vec<Listing>) -> Result<EnrichmentPatch, SourceError> {
    let mut listings = listings.into_iter();
    let post = listings
        .next()
        .and_then(|l| l.data.children.into_iter().next())
        .ok_or_else(|| SourceError::Parse("thread listing has no post".to_string()))?;

    let mut comments: Vec<CommentExcerpt> = listings
        .next()
        .map(|l| l.data.children)
        .unwrap_or_default()
        .into_iter()
        .filter(|c| c.kind == "t1" && !c.data.stickied)
        .filter_map(|c| {
            let body = c.data.body?;
            let body = body.trim();
            if body.is_empty() || body == "[deleted]" || body == "[removed]" {
                return None;
            }
            Some(CommentExcerpt {
                author: c.data.author.unwrap_or_default(),
                score: c.data.score.unwrap_or_default(),
                excerpt: truncate_chars(body, MAX_EXCERPT),
            })
        })
        .collect();
    comments.sort_by(|a, b| b.score.cmp(&a.score));
    comments.truncate(TOP_COMMENTS);

    Ok(EnrichmentPatch {
        engagement: Engagement {
            score: post.data.score,
            comments: post.data.num_comments,
            upvote_ratio: post.data.upvote_ratio,
            ..Engagement::default()
        },
        comments,
        transcript: None,
        published: post.data.created_utc.and_then(from_unix),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const FIXTURE: &str = r#"[
        {"kind": "Listing", "data": {"children": [
            {"kind": "t3", "data": {"score": 812, "num_comments": 164, "upvote_ratio": 0.97, "created_utc": 1772359200.0, "title": "Tokio 2.0"}}
        ]}},
        {"kind": "Listing", "data": {"children": [
            {"kind": "t1", "data": {"author": "mod", "body": "Rules", "score": 1000, "stickied": true}},
            {"kind": "t1", "data": {"author": "a", "body": "first", "score": 10}},
            {"kind": "t1", "data": {"author": "b", "body": "[deleted]", "score": 99}},
            {"kind": "t1", "data": {"author": "c", "body": "best", "score": 50}},
            {"kind": "t1", "data": {"author": "d", "body": "second", "score": 20}},
            {"kind": "t1", "data": {"author": "e", "body": "low", "score": 1}},
            {"kind": "more", "data": {"count": 40, "children": ["x1", "x2"]}}
        ]}}
    ]"#;

    #[test]
    fn parse_thread_listing() {
        let listings: Vec<Listing> = serde_json::from_str(FIXTURE).unwrap();
        let patch = parse_thread(listings).unwrap();
        assert_eq!(patch.engagement.score, Some(812));
        assert_eq!(patch.engagement.comments, Some(164));
        assert_eq!(patch.engagement.upvote_ratio, Some(0.97));
        assert!(patch.published.is_some());

        let authors: Vec<&str> = patch.comments.iter().map(|c| c.author.as_str()).collect();
        assert_eq!(authors, vec!["c", "d", "a"]);
    }

    #[test]
    fn empty_listing_is_a_parse_error() {
        let listings: Vec<Listing> = serde_json::from_str(r#"[{"data": {"children": []}}]"#).unwrap();
        assert!(matches!(parse_thread(listings), Err(SourceError::Parse(_))));
    }

    #[test]
    fn applies_only_to_reddit_threads() {
        let client = SourceClient::new(
            &last30_config::Last30Config::default(),
            last30_config::LocalTools::default(),
        )
        .unwrap();
        let enricher = RedditThreadEnricher::new(client);
        let thread = Finding::new(SourceKind::Reddit, "https://www.reddit.com/r/rust/comments/abc/t/", "t");
        let listing = Finding::new(SourceKind::Reddit, "https://www.reddit.com/r/rust/", "t");
        let video = Finding::new(SourceKind::Youtube, "https://www.youtube.com/watch?v=a", "t");
        assert!(enricher.applies_to(&thread));
        assert!(!enricher.applies_to(&listing));
        assert!(!enricher.applies_to(&video));
    }
}
