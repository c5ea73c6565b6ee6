//! OpenRouter web search through a search-grounded chat model
//! (Perplexity Sonar by default).
//!
//! The model is asked for the same `{"items": [...]}` shape as the other
//! LLM-backed sources. When its answer holds no usable items, the citations
//! attached to the response are used instead.

use last30_core::urls::host_of;
use last30_core::{Finding, SourceKind};
use serde::{Deserialize, Serialize};

use crate::error::SourceError;
use crate::http::check_response;
use crate::llm::parse_items;
use crate::{DiscoveryRequest, SourceClient, query};

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 1],
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
    #[serde(default)]
    citations: Vec<String>,
}

#[derive(Deserialize)]
struct Choice {
    message: AssistantMessage,
}

#[derive(Deserialize)]
struct AssistantMessage {
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    annotations: Vec<Annotation>,
}

#[derive(Deserialize)]
struct Annotation {
    #[serde(rename = "type", default)]
    kind: String,
    #[serde(default)]
    url_citation: Option<UrlCitation>,
}

#[derive(Deserialize)]
struct UrlCitation {
    url: String,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    content: Option<String>,
}

impl SourceClient {
    /// Ask the configured OpenRouter model to search the web.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError`] if the HTTP request fails, the API returns a
    /// non-success status, or the response cannot be parsed.
    pub async fn search_openrouter(&self, request: &DiscoveryRequest) -> Result<Vec<Finding>, SourceError> {
        let url = format!("{}/chat/completions", self.endpoints.openrouter.trim_end_matches('/'));
        let prompt = query::web_prompt(request);
        let body = ChatRequest {
            model: &self.models.openrouter,
            messages: [ChatMessage {
                role: "user",
                content: &prompt,
            }],
        };
        let resp = check_response(
            self.http
                .post(&url)
                .bearer_auth(&self.credentials.openrouter_api_key)
                .json(&body)
                .send()
                .await?,
        )
        .await?;

        let data: ChatResponse = resp.json().await?;
        Ok(findings_from_response(data))
    }
}

fn findings_from_response(data: ChatResponse) -> Vec<Finding> {
    let ChatResponse { choices, citations } = data;
    let Some(message) = choices.into_iter().next().map(|c| c.message) else {
        return Vec::new();
    };

    let from_items: Vec<Finding> = message
        .content
        .as_deref()
        .and_then(|text| parse_items(text).ok())
        .unwrap_or_default()
        .into_iter()
        .filter_map(|item| item.into_finding(SourceKind::Web))
        .map(with_host_community)
        .collect();
    if !from_items.is_empty() {
        return from_items;
    }

    let annotated: Vec<Finding> = message
        .annotations
        .into_iter()
        .filter(|a| a.kind == "url_citation")
        .filter_map(|a| a.url_citation)
        .map(|c| {
            let title = c.title.unwrap_or_else(|| c.url.clone());
            Finding::new(SourceKind::Web, c.url, title).with_snippet(c.content.unwrap_or_default())
        })
        .map(with_host_community)
        .collect();
    if !annotated.is_empty() {
        return annotated;
    }

    citations
        .into_iter()
        .map(|url| {
            let title = host_of(&url).unwrap_or_else(|| url.clone());
            with_host_community(Finding::new(SourceKind::Web, url, title))
        })
        .collect()
}

fn with_host_community(finding: Finding) -> Finding {
    if finding.community.is_some() {
        return finding;
    }
    match host_of(&finding.url) {
        Some(host) => finding.with_community(host),
        None => finding,
    }
}
