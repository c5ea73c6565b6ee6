//! X discovery through the xAI Responses API and its `x_search` tool.

use last30_core::urls::{domain_matches, host_of, path_of};
use last30_core::{EntityKind, Finding, SourceKind};
use serde_json::{Value, json};

use crate::error::SourceError;
use crate::llm::{ResponsesEndpoint, parse_items};
use crate::{Discovery, DiscoveryRequest, SourceClient, cap, query};

const X_DOMAINS: [&str; 2] = ["x.com", "twitter.com"];

impl SourceClient {
    /// Search X posts about the request topic.
    ///
    /// A request targeted at a handle only keeps that author's posts; a
    /// request targeted at a community returns nothing.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::MissingCredential`] without an xAI key, or
    /// [`SourceError::ModelsExhausted`] when every model in the chain failed.
    pub async fn search_x(&self, request: &DiscoveryRequest) -> Result<Discovery, SourceError> {
        let handle = match &request.target {
            Some(target) if target.kind == EntityKind::Handle => Some(target.name.as_str()),
            Some(_) => return Ok(Discovery::empty()),
            None => None,
        };
        if self.credentials.xai_api_key.is_empty() {
            return Err(SourceError::MissingCredential("XAI_API_KEY"));
        }

        let endpoint = ResponsesEndpoint {
            base: &self.endpoints.xai,
            api_key: &self.credentials.xai_api_key,
        };
        let prompt = query::x_prompt(request);
        let tools = [x_search_tool(request, handle)];
        let (endpoint, prompt, tools) = (&endpoint, prompt.as_str(), &tools[..]);

        let (items, model) = self
            .chain(&self.models.x)
            .run(move |model| async move {
                let text = self.responses_text(endpoint, &model, prompt, tools).await?;
                parse_items(&text)
            })
            .await?;

        let findings: Vec<Finding> = items
            .into_iter()
            .filter_map(|item| item.into_finding(SourceKind::X))
            .filter_map(normalize_post)
            .filter(|f| handle.is_none_or(|h| by_author(f, h)))
            .map(|f| f.with_phase(request.phase))
            .collect();

        Ok(Discovery {
            findings: cap(findings, request.bounds),
            model: Some(model),
            provider: Some("xai".to_string()),
            ..Discovery::default()
        })
    }
}

fn x_search_tool(request: &DiscoveryRequest, handle: Option<&str>) -> Value {
    let mut tool = json!({
        "type": "x_search",
        "from_date": request.window.from_date().to_string(),
        "to_date": request.window.to_date().to_string(),
    });
    if let Some(handle) = handle {
        tool["allowed_x_handles"] = json!([handle]);
    }
    tool
}

/// Keep x.com / twitter.com URLs and fill the author from the path.
fn normalize_post(mut finding: Finding) -> Option<Finding> {
    let host = host_of(&finding.url)?;
    if !X_DOMAINS.iter().any(|d| domain_matches(&host, d)) {
        return None;
    }
    let from_path = path_of(&finding.url)
        .split('/')
        .find(|s| !s.is_empty())
        .filter(|s| !matches!(*s, "i" | "search" | "hashtag"))
        .map(ToString::to_string);
    finding.author = finding
        .author
        .map(|a| a.trim().trim_start_matches('@').to_string())
        .filter(|a| !a.is_empty())
        .or(from_path);
    Some(finding)
}

fn by_author(finding: &Finding, handle: &str) -> bool {
    finding
        .author
        .as_deref()
        .is_some_and(|a| a.eq_ignore_ascii_case(handle.trim_start_matches('@')))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use last30_core::{DateWindow, Depth, Entity};

    fn request() -> DiscoveryRequest {
        let now = Utc.with_ymd_and_hms(2026, 3, 31, 12, 0, 0).unwrap();
        DiscoveryRequest::discovery(
            "bun runtime",
            DateWindow::ending_at(now, 7),
            Depth::Quick,
            Depth::Quick.discovery_bounds(SourceKind::X),
        )
    }

    #[test]
    fn tool_carries_date_range() {
        let tool = x_search_tool(&request(), None);
        assert_eq!(tool["from_date"], "2026-03-24");
        assert_eq!(tool["to_date"], "2026-03-31");
        assert!(tool.get("allowed_x_handles").is_none());

        let tool = x_search_tool(&request(), Some("jarredsumner"));
        assert_eq!(tool["allowed_x_handles"][0], "jarredsumner");
    }

    #[test]
    fn author_comes_from_path() {
        let finding = Finding::new(SourceKind::X, "https://twitter.com/jarredsumner/status/123", "t");
        let finding = normalize_post(finding).unwrap();
        assert_eq!(finding.author.as_deref(), Some("jarredsumner"));
    }

    #[test]
    fn at_sign_is_stripped_and_off_domain_dropped() {
        let finding = Finding::new(SourceKind::X, "https://x.com/a/status/1", "t").with_author("@Someone");
        assert_eq!(normalize_post(finding).unwrap().author.as_deref(), Some("Someone"));
        let off = Finding::new(SourceKind::X, "https://nitter.net/a/status/1", "t");
        assert!(normalize_post(off).is_none());
    }

    #[tokio::test]
    async fn community_target_returns_nothing() {
        let client = SourceClient::new(&last30_config::Last30Config::default(), last30_config::LocalTools::default())
            .unwrap();
        let targeted = request().supplemental(Entity {
            kind: EntityKind::Community,
            name: "bun".into(),
            mentions: 2,
        });
        let discovery = client.search_x(&targeted).await.unwrap();
        assert!(discovery.findings.is_empty());
        assert!(discovery.model.is_none());
    }
}
