//! Brave Search web results.

use last30_core::{Finding, SourceKind};
use serde::Deserialize;

use crate::error::SourceError;
use crate::http::check_response;
use crate::text::{parse_date, strip_tags};
use crate::{DiscoveryRequest, SourceClient};

/// Largest page the web search endpoint serves.
const MAX_COUNT: usize = 20;

#[derive(Deserialize)]
struct BraveResponse {
    #[serde(default)]
    web: Option<BraveWeb>,
}

#[derive(Deserialize)]
struct BraveWeb {
    #[serde(default)]
    results: Vec<BraveResult>,
}

#[derive(Deserialize)]
struct BraveResult {
    url: String,
    #[serde(default)]
    title: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    page_age: Option<String>,
    #[serde(default)]
    meta_url: Option<MetaUrl>,
}

#[derive(Deserialize)]
struct MetaUrl {
    #[serde(default)]
    hostname: String,
}

impl BraveResult {
    fn into_finding(self) -> Finding {
        let mut finding = Finding::new(SourceKind::Web, self.url, strip_tags(&self.title))
            .with_snippet(strip_tags(&self.description));
        if let Some(host) = self
            .meta_url
            .map(|m| m.hostname.trim_start_matches("www.").to_string())
            .filter(|h| !h.is_empty())
        {
            finding = finding.with_community(host);
        }
        if let Some(published) = self.page_age.as_deref().and_then(parse_date) {
            finding = finding.with_published(published);
        }
        finding
    }
}

impl SourceClient {
    /// Query Brave Search, restricted to the request window.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError`] if the HTTP request fails, the API returns a
    /// non-success status, or the response cannot be parsed.
    pub async fn search_brave(&self, request: &DiscoveryRequest) -> Result<Vec<Finding>, SourceError> {
        let url = format!(
            "{base}/web/search?q={q}&count={count}&freshness={from}to{to}",
            base = self.endpoints.brave.trim_end_matches('/'),
            q = urlencoding::encode(&request.topic),
            count = request.bounds.max.min(MAX_COUNT),
            from = request.window.from_date(),
            to = request.window.to_date(),
        );
        let resp = check_response(
            self.http
                .get(&url)
                .header("Accept", "application/json")
                .header("X-Subscription-Token", &self.credentials.brave_api_key)
                .send()
                .await?,
        )
        .await?;

        let data: BraveResponse = resp.json().await?;
        Ok(data
            .web
            .map(|web| web.results)
            .unwrap_or_default()
            .into_iter()
            .map(BraveResult::into_finding)
            .collect())
    }
}
