//! Responses API plumbing shared by the LLM-backed sources.
//!
//! Both OpenAI and xAI expose `POST /responses` with server-side search
//! tools. The model is asked for `{"items": [...]}`; the first JSON object in
//! the output text is taken and malformed items are skipped one by one.

use last30_core::{Engagement, Finding, SourceKind};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::SourceClient;
use crate::error::SourceError;
use crate::http::check_response;
use crate::text::{extract_json_object, parse_date, truncate_chars};

/// Longest title derived from a snippet when the model gave none.
const DERIVED_TITLE_CHARS: usize = 120;

#[derive(Serialize)]
struct ResponsesRequest<'a> {
    model: &'a str,
    input: &'a str,
    tools: &'a [Value],
}

#[derive(Deserialize)]
struct ResponsesBody {
    #[serde(default)]
    output: Vec<OutputItem>,
    #[serde(default)]
    output_text: Option<String>,
}

#[derive(Deserialize)]
struct OutputItem {
    #[serde(default)]
    content: Vec<ContentPart>,
}

#[derive(Deserialize)]
struct ContentPart {
    #[serde(rename = "type", default)]
    kind: String,
    #[serde(default)]
    text: String,
}

/// Base URL and key of a Responses API provider.
pub struct ResponsesEndpoint<'a> {
    pub base: &'a str,
    pub api_key: &'a str,
}

impl SourceClient {
    /// One Responses API call; returns the concatenated output text.
    pub(crate) async fn responses_text(
        &self,
        endpoint: &ResponsesEndpoint<'_>,
        model: &str,
        input: &str,
        tools: &[Value],
    ) -> Result<String, SourceError> {
        let url = format!("{}/responses", endpoint.base.trim_end_matches('/'));
        let body = ResponsesRequest { model, input, tools };
        let resp = check_response(
            self.http
                .post(&url)
                .bearer_auth(endpoint.api_key)
                .json(&body)
                .send()
                .await?,
        )
        .await?;

        let data: ResponsesBody = resp.json().await?;
        let text = output_text(data);
        if text.trim().is_empty() {
            return Err(SourceError::Parse("response has no output text".to_string()));
        }
        Ok(text)
    }
}

fn output_text(body: ResponsesBody) -> String {
    let parts: Vec<String> = body
        .output
        .into_iter()
        .flat_map(|item| item.content)
        .filter(|part| part.kind == "output_text")
        .map(|part| part.text)
        .collect();
    if parts.is_empty() {
        body.output_text.unwrap_or_default()
    } else {
        parts.join("\n")
    }
}

/// One result item as models tend to spell it.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct LlmItem {
    pub url: Option<String>,
    pub title: Option<String>,
    #[serde(alias = "text", alias = "summary")]
    pub snippet: Option<String>,
    #[serde(alias = "handle", alias = "username")]
    pub author: Option<String>,
    #[serde(alias = "subreddit", alias = "site")]
    pub community: Option<String>,
    #[serde(alias = "published", alias = "created_at")]
    pub date: Option<String>,
    #[serde(alias = "relevance_score")]
    pub relevance: Option<f64>,
    pub score: Option<i64>,
    #[serde(alias = "num_comments")]
    pub comments: Option<u64>,
    pub likes: Option<u64>,
    #[serde(alias = "retweets")]
    pub reposts: Option<u64>,
    pub replies: Option<u64>,
    pub quotes: Option<u64>,
    pub views: Option<u64>,
}

impl LlmItem {
    /// Convert to a finding. Items without a URL are dropped.
    pub fn into_finding(self, source: SourceKind) -> Option<Finding> {
        let url = non_blank(self.url)?;
        let snippet = self.snippet.unwrap_or_default();
        let title = non_blank(self.title)
            .unwrap_or_else(|| truncate_chars(snippet.trim(), DERIVED_TITLE_CHARS));

        let mut finding = Finding::new(source, url, title).with_snippet(snippet.trim());
        if let Some(author) = non_blank(self.author) {
            finding = finding.with_author(author);
        }
        if let Some(community) = non_blank(self.community) {
            finding = finding.with_community(community);
        }
        if let Some(published) = self.date.as_deref().and_then(parse_date) {
            finding = finding.with_published(published);
        }
        if let Some(hint) = self.relevance.filter(|r| r.is_finite()) {
            finding = finding.with_relevance_hint(hint);
        }
        Some(finding.with_engagement(Engagement {
            score: self.score,
            comments: self.comments,
            likes: self.likes,
            reposts: self.reposts,
            replies: self.replies,
            quotes: self.quotes,
            views: self.views,
            ..Engagement::default()
        }))
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Items from the first JSON object in `text`.
///
/// # Errors
///
/// Returns [`SourceError::Parse`] when the text holds no JSON object or the
/// object has no `items` array.
pub fn parse_items(text: &str) -> Result<Vec<LlmItem>, SourceError> {
    let value = extract_json_object(text)
        .ok_or_else(|| SourceError::Parse("no JSON object in model output".to_string()))?;
    let items = value
        .get("items")
        .and_then(Value::as_array)
        .ok_or_else(|| SourceError::Parse("model output has no items array".to_string()))?;
    Ok(items
        .iter()
        .filter_map(|item| serde_json::from_value(item.clone()).ok())
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn output_text_prefers_message_parts() {
        let body: ResponsesBody = serde_json::from_str(
            r#"{
                "output": [
                    {"type": "web_search_call", "status": "completed"},
                    {"type": "message", "content": [
                        {"type": "output_text", "text": "{\"items\": []}"},
                        {"type": "refusal", "refusal": "no"}
                    ]}
                ],
                "output_text": "ignored"
            }"#,
        )
        .unwrap();
        assert_eq!(output_text(body), "{\"items\": []}");
    }

    #[test]
    fn output_text_falls_back_to_top_level() {
        let body: ResponsesBody =
            serde_json::from_str(r#"{"output": [], "output_text": "hello"}"#).unwrap();
        assert_eq!(output_text(body), "hello");
    }

    #[test]
    fn malformed_items_are_skipped() {
        let text = r#"Sure! {"items": [
            {"url": "https://www.reddit.com/r/rust/comments/1/a/", "title": "A", "subreddit": "rust", "date": "2026-03-20", "relevance": 0.9, "num_comments": 12},
            {"url": "https://www.reddit.com/r/rust/comments/2/b/", "score": "lots"},
            {"title": "no url"}
        ]}"#;
        let items = parse_items(text).unwrap();
        assert_eq!(items.len(), 2);

        let findings: Vec<Finding> = items
            .into_iter()
            .filter_map(|item| item.into_finding(SourceKind::Reddit))
            .collect();
        assert_eq!(findings.len(), 1);
        let first = &findings[0];
        assert_eq!(first.community.as_deref(), Some("rust"));
        assert_eq!(first.engagement.comments, Some(12));
        assert_eq!(first.relevance_hint, Some(0.9));
        assert!(first.published.is_some());
    }

    #[test]
    fn missing_title_derives_from_snippet() {
        let item = LlmItem {
            url: Some("https://x.com/a/status/1".into()),
            snippet: Some("  shipping the new runtime today  ".into()),
            ..LlmItem::default()
        };
        let finding = item.into_finding(SourceKind::X).unwrap();
        assert_eq!(finding.title, "shipping the new runtime today");
        assert_eq!(finding.snippet, "shipping the new runtime today");
    }

    #[test]
    fn output_without_items_is_a_parse_error() {
        assert!(matches!(parse_items("nothing here"), Err(SourceError::Parse(_))));
        assert!(matches!(parse_items(r#"{"results": []}"#), Err(SourceError::Parse(_))));
    }
}
