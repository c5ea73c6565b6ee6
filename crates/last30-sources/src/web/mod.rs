//! Generic web search.
//!
//! The primary provider is Brave, with OpenRouter as its fallback. DataForSEO
//! AI Mode runs alongside whichever primary is configured. Results from all
//! providers are merged in that order, stripped of URLs that belong to the
//! dedicated Reddit and X sources, and deduplicated by canonical URL.

pub mod brave;
pub mod dataforseo;
pub mod openrouter;

use std::collections::HashSet;

use last30_config::WebProvider;
use last30_core::Finding;
use last30_core::urls::{canonical_url, domain_matches, host_of};

use crate::error::SourceError;
use crate::{Discovery, DiscoveryRequest, SourceClient, cap};

/// Hosts covered by their own sources.
const EXCLUDED_DOMAINS: [&str; 4] = ["reddit.com", "redd.it", "x.com", "twitter.com"];

/// Whether a web result should be dropped because another source owns it.
#[must_use]
pub fn is_excluded(url: &str) -> bool {
    host_of(url).is_none_or(|host| EXCLUDED_DOMAINS.iter().any(|d| domain_matches(&host, d)))
}

impl SourceClient {
    /// Search the open web about the request topic.
    ///
    /// One failing provider does not fail the search; its error is carried
    /// in [`Discovery::warnings`]. Targeted requests return nothing.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::MissingCredential`] when no provider is
    /// configured, or the last provider error when every provider failed.
    pub async fn search_web(&self, request: &DiscoveryRequest) -> Result<Discovery, SourceError> {
        if request.target.is_some() {
            return Ok(Discovery::empty());
        }
        let providers = self.credentials.web_providers();
        if providers.is_empty() {
            return Err(SourceError::MissingCredential("BRAVE_API_KEY"));
        }

        let (primary, ai_mode) = tokio::join!(
            self.search_primary(request, &providers),
            self.search_ai_mode_if(request, providers.contains(&WebProvider::DataForSeo)),
        );

        let mut served = Vec::new();
        let mut warnings = Vec::new();
        let mut last_error = None;
        let mut findings = Vec::new();
        let mut overview = None;

        for outcome in primary {
            match outcome.result {
                Ok(found) => {
                    served.push(outcome.provider.as_str());
                    findings.extend(found);
                }
                Err(e) => {
                    tracing::warn!(provider = outcome.provider.as_str(), %e, "web provider failed");
                    warnings.push(format!("{}: {e}", outcome.provider.as_str()));
                    last_error = Some(e);
                }
            }
        }
        if let Some(result) = ai_mode {
            match result {
                Ok(answer) => {
                    served.push(WebProvider::DataForSeo.as_str());
                    findings.extend(answer.findings);
                    overview = answer.overview;
                }
                Err(e) => {
                    tracing::warn!(provider = "dataforseo", %e, "web provider failed");
                    warnings.push(format!("dataforseo: {e}"));
                    last_error = Some(e);
                }
            }
        }

        if served.is_empty() {
            return Err(last_error.unwrap_or(SourceError::MissingCredential("BRAVE_API_KEY")));
        }

        let findings: Vec<Finding> = merge_results(findings)
            .into_iter()
            .map(|f| f.with_phase(request.phase))
            .collect();
        Ok(Discovery {
            findings: cap(findings, request.bounds),
            provider: Some(served.join("+")),
            overview,
            warnings,
            ..Discovery::default()
        })
    }

    /// Brave first, OpenRouter if Brave is absent or fails.
    async fn search_primary(
        &self,
        request: &DiscoveryRequest,
        providers: &[WebProvider],
    ) -> Vec<ProviderOutcome> {
        let mut outcomes = Vec::new();
        for provider in providers.iter().copied().filter(|p| *p != WebProvider::DataForSeo) {
            let result = match provider {
                WebProvider::Brave => self.search_brave(request).await,
                WebProvider::OpenRouter => self.search_openrouter(request).await,
                WebProvider::DataForSeo => continue,
            };
            let succeeded = result.is_ok();
            outcomes.push(ProviderOutcome { provider, result });
            if succeeded {
                break;
            }
        }
        outcomes
    }

    async fn search_ai_mode_if(
        &self,
        request: &DiscoveryRequest,
        enabled: bool,
    ) -> Option<Result<dataforseo::AiModeAnswer, SourceError>> {
        if enabled {
            Some(self.search_dataforseo(request).await)
        } else {
            None
        }
    }
}

struct ProviderOutcome {
    provider: WebProvider,
    result: Result<Vec<Finding>, SourceError>,
}

/// Drop excluded domains and later duplicates, keeping provider order.
fn merge_results(findings: Vec<Finding>) -> Vec<Finding> {
    let mut seen = HashSet::new();
    findings
        .into_iter()
        .filter(|f| !is_excluded(&f.url))
        .filter(|f| seen.insert(canonical_url(&f.url)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use last30_core::SourceKind;
    use rstest::rstest;

    #[rstest]
    #[case("https://www.reddit.com/r/rust/", true)]
    #[case("https://old.reddit.com/r/rust/", true)]
    #[case("https://x.com/a/status/1", true)]
    #[case("https://mobile.twitter.com/a", true)]
    #[case("https://redd.it/abc", true)]
    #[case("https://blog.rust-lang.org/", false)]
    #[case("https://xkcd.com/", false)]
    fn excludes_social_domains(#[case] url: &str, #[case] excluded: bool) {
        assert_eq!(is_excluded(url), excluded);
    }

    #[test]
    fn merge_keeps_first_occurrence() {
        let findings = vec![
            Finding::new(SourceKind::Web, "https://example.com/post/", "from brave"),
            Finding::new(SourceKind::Web, "https://www.reddit.com/r/x", "excluded"),
            Finding::new(SourceKind::Web, "http://www.example.com/post", "from ai mode"),
            Finding::new(SourceKind::Web, "https://example.org/other", "other"),
        ];
        let merged = merge_results(findings);
        let titles: Vec<&str> = merged.iter().map(|f| f.title.as_str()).collect();
        assert_eq!(titles, vec!["from brave", "other"]);
    }
}
