//! Reddit discovery through the OpenAI Responses API.
//!
//! The `web_search` tool is restricted to reddit.com and the reply is
//! post-filtered to thread URLs, since the model occasionally cites other
//! sites anyway.

use last30_core::urls::{is_on_domain, path_of};
use last30_core::{EntityKind, Finding, SourceKind};
use serde_json::{Value, json};

use crate::error::SourceError;
use crate::llm::{ResponsesEndpoint, parse_items};
use crate::{Discovery, DiscoveryRequest, SourceClient, cap, query};

const REDDIT_DOMAIN: &str = "reddit.com";

impl SourceClient {
    /// Search Reddit threads about the request topic.
    ///
    /// A request targeted at a community searches inside it; a request
    /// targeted at a handle returns nothing.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::MissingCredential`] without an OpenAI key, or
    /// [`SourceError::ModelsExhausted`] when every model in the chain failed.
    pub async fn search_reddit(&self, request: &DiscoveryRequest) -> Result<Discovery, SourceError> {
        let community = match &request.target {
            Some(target) if target.kind == EntityKind::Community => Some(target.name.as_str()),
            Some(_) => return Ok(Discovery::empty()),
            None => None,
        };
        if self.credentials.openai_api_key.is_empty() {
            return Err(SourceError::MissingCredential("OPENAI_API_KEY"));
        }

        let endpoint = ResponsesEndpoint {
            base: &self.endpoints.openai,
            api_key: &self.credentials.openai_api_key,
        };
        let prompt = query::reddit_prompt(request);
        let tools = [web_search_tool()];
        let (endpoint, prompt, tools) = (&endpoint, prompt.as_str(), &tools[..]);

        let (items, model) = self
            .chain(&self.models.reddit)
            .run(move |model| async move {
                let text = self.responses_text(endpoint, &model, prompt, tools).await?;
                parse_items(&text)
            })
            .await?;

        let received = items.len();
        let findings: Vec<Finding> = items
            .into_iter()
            .filter_map(|item| item.into_finding(SourceKind::Reddit))
            .filter_map(normalize_thread)
            .filter(|f| community.is_none_or(|c| in_community(f, c)))
            .map(|f| f.with_phase(request.phase))
            .collect();
        tracing::debug!(
            received,
            kept = findings.len(),
            model = model.served.as_str(),
            "reddit search finished"
        );

        Ok(Discovery {
            findings: cap(findings, request.bounds),
            model: Some(model),
            provider: Some("openai".to_string()),
            ..Discovery::default()
        })
    }
}

fn web_search_tool() -> Value {
    json!({
        "type": "web_search",
        "filters": { "allowed_domains": [REDDIT_DOMAIN] }
    })
}

/// Keep reddit.com thread URLs; fill the community from the path and strip
/// `r/` / `u/` prefixes.
fn normalize_thread(mut finding: Finding) -> Option<Finding> {
    if !is_on_domain(&finding.url, REDDIT_DOMAIN) {
        return None;
    }
    let path = path_of(&finding.url);
    let mut segments = path.split('/').filter(|s| !s.is_empty());
    let from_path = match (segments.next(), segments.next()) {
        (Some("r"), Some(name)) => Some(name.to_string()),
        _ => None,
    };

    finding.community = finding
        .community
        .map(|c| strip_prefix_ci(&c, "r/").to_string())
        .or(from_path);
    finding.author = finding.author.map(|a| strip_prefix_ci(&a, "u/").to_string());
    Some(finding)
}

fn in_community(finding: &Finding, community: &str) -> bool {
    finding
        .community
        .as_deref()
        .is_some_and(|c| c.eq_ignore_ascii_case(community))
}

fn strip_prefix_ci<'a>(value: &'a str, prefix: &str) -> &'a str {
    let value = value.trim().trim_start_matches('/');
    match value.get(..prefix.len()) {
        Some(head) if head.eq_ignore_ascii_case(prefix) => &value[prefix.len()..],
        _ => value,
    }
}
