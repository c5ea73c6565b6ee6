//! # last30-sources
//!
//! Source clients for last30days. Each client turns a [`DiscoveryRequest`]
//! into a bounded list of [`Finding`]s:
//! - Reddit through the OpenAI Responses API (`web_search` on reddit.com)
//! - X through the xAI Responses API (`x_search` with a date range)
//! - YouTube through the Data API v3, or the local `yt-dlp` tool
//! - The open web through Brave, OpenRouter, and DataForSEO AI Mode
//!
//! Enrichers backfill Reddit thread metrics and YouTube transcripts.
//!
//! Clients never decide whether a run continues. A missing credential or a
//! failing API surfaces as a [`SourceError`]; the pipeline absorbs it.

pub mod enrich;
pub mod model_chain;
pub mod query;
pub mod reddit;
pub mod web;
pub mod x;
pub mod youtube;
pub mod ytdlp;

mod error;
mod http;
mod llm;
mod text;

pub use enrich::{Enricher, EnrichmentPatch, RedditThreadEnricher, TranscriptEnricher};
pub use error::SourceError;
pub use model_chain::ModelChain;

use std::sync::Arc;
use std::time::Duration;

use futures::future::BoxFuture;
use last30_config::{CredentialsConfig, EndpointsConfig, Last30Config, LocalTools, ModelsConfig};
use last30_core::{DateWindow, Depth, Entity, Finding, ModelUse, Phase, ResultBounds, SourceKind};

// ── Types ──────────────────────────────────────────────────────────

/// What one source is asked to find.
#[derive(Debug, Clone, PartialEq)]
pub struct DiscoveryRequest {
    pub topic: String,
    pub window: DateWindow,
    pub depth: Depth,
    pub bounds: ResultBounds,
    pub phase: Phase,
    /// Phase 2 seed. Sources that cannot target this entity kind return nothing.
    pub target: Option<Entity>,
}

impl DiscoveryRequest {
    /// A Phase 1 request.
    #[must_use]
    pub fn discovery(topic: impl Into<String>, window: DateWindow, depth: Depth, bounds: ResultBounds) -> Self {
        Self {
            topic: topic.into(),
            window,
            depth,
            bounds,
            phase: Phase::Discovery,
            target: None,
        }
    }

    /// A Phase 2 request aimed at `target`.
    #[must_use]
    pub fn supplemental(&self, target: Entity) -> Self {
        Self {
            topic: self.topic.clone(),
            window: self.window,
            depth: self.depth,
            bounds: self.depth.supplemental_bounds(),
            phase: Phase::Supplemental,
            target: Some(target),
        }
    }
}

/// What one source returned.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Discovery {
    pub findings: Vec<Finding>,
    /// Set by LLM-backed sources.
    pub model: Option<ModelUse>,
    /// Provider(s) that served the request, e.g. `brave+dataforseo`.
    pub provider: Option<String>,
    /// Free-text overview some providers return alongside results.
    pub overview: Option<String>,
    /// Sub-provider failures that did not fail the whole source.
    pub warnings: Vec<String>,
}

impl Discovery {
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_findings(findings: Vec<Finding>) -> Self {
        Self {
            findings,
            ..Self::default()
        }
    }
}

/// A discovery backend for one [`SourceKind`].
///
/// Implementations own everything they need, so the pipeline can run each in
/// its own task.
pub trait Source: Send + Sync {
    fn kind(&self) -> SourceKind;

    /// Provider label for diagnostics (`openai`, `yt-dlp`, ...).
    fn provider(&self) -> String;

    fn discover<'a>(&'a self, request: &'a DiscoveryRequest) -> BoxFuture<'a, Result<Discovery, SourceError>>;
}

// ── Client ─────────────────────────────────────────────────────────

/// Shared HTTP client plus the configuration every source reads.
///
/// Cheap to clone; one instance serves a whole run.
#[derive(Debug, Clone)]
pub struct SourceClient {
    http: reqwest::Client,
    endpoints: Arc<EndpointsConfig>,
    credentials: Arc<CredentialsConfig>,
    models: Arc<ModelsConfig>,
    tools: LocalTools,
    request_timeout: Duration,
    transcript_poll_interval: Duration,
    transcript_max_wait: Duration,
}

impl SourceClient {
    /// Build a client from loaded configuration.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::Http`] if the underlying `reqwest::Client`
    /// fails to build.
    pub fn new(config: &Last30Config, tools: LocalTools) -> Result<Self, SourceError> {
        let http = reqwest::Client::builder()
            .user_agent(config.general.user_agent.clone())
            .timeout(config.general.request_timeout())
            .build()?;
        Ok(Self {
            http,
            endpoints: Arc::new(config.endpoints.clone()),
            credentials: Arc::new(config.credentials.clone()),
            models: Arc::new(config.models.clone()),
            tools,
            request_timeout: config.general.request_timeout(),
            transcript_poll_interval: config.general.transcript_poll_interval(),
            transcript_max_wait: config.general.transcript_max_wait(),
        })
    }

    /// Override how transcript jobs are polled.
    #[must_use]
    pub const fn with_transcript_polling(mut self, interval: Duration, max_wait: Duration) -> Self {
        self.transcript_poll_interval = interval;
        self.transcript_max_wait = max_wait;
        self
    }

    /// Fallback chain built from the configured models.
    fn chain(&self, models: &[String]) -> ModelChain {
        ModelChain::new(
            models.to_vec(),
            self.models.attempts_per_model,
            Duration::from_millis(self.models.backoff_ms),
        )
    }

    /// Live source for `kind`, sharing this client.
    #[must_use]
    pub fn source(&self, kind: SourceKind) -> Arc<dyn Source> {
        Arc::new(LiveSource {
            kind,
            client: self.clone(),
        })
    }

    /// Enrichers for every configured enrichment API, in run order.
    #[must_use]
    pub fn enrichers(&self) -> Vec<Arc<dyn Enricher>> {
        let mut enrichers: Vec<Arc<dyn Enricher>> = vec![Arc::new(RedditThreadEnricher::new(self.clone()))];
        if !self.credentials.supadata_api_key.is_empty() {
            enrichers.push(Arc::new(TranscriptEnricher::new(self.clone())));
        }
        enrichers
    }

    /// Search a source by kind.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError`] if the source has no credential, the request
    /// fails, or the response cannot be parsed.
    pub async fn search(&self, kind: SourceKind, request: &DiscoveryRequest) -> Result<Discovery, SourceError> {
        match kind {
            SourceKind::Reddit => self.search_reddit(request).await,
            SourceKind::X => self.search_x(request).await,
            SourceKind::Youtube => self.search_youtube(request).await,
            SourceKind::Web => self.search_web(request).await,
        }
    }

    fn provider_label(&self, kind: SourceKind) -> String {
        match kind {
            SourceKind::Reddit => "openai".to_string(),
            SourceKind::X => "xai".to_string(),
            SourceKind::Youtube => {
                if self.credentials.youtube_api_key.is_empty() && self.tools.yt_dlp.is_some() {
                    "yt-dlp".to_string()
                } else {
                    "youtube-data-api".to_string()
                }
            }
            SourceKind::Web => self
                .credentials
                .web_providers()
                .iter()
                .map(|p| p.as_str())
                .collect::<Vec<_>>()
                .join("+"),
        }
    }
}

struct LiveSource {
    kind: SourceKind,
    client: SourceClient,
}

impl Source for LiveSource {
    fn kind(&self) -> SourceKind {
        self.kind
    }

    fn provider(&self) -> String {
        self.client.provider_label(self.kind)
    }

    fn discover<'a>(&'a self, request: &'a DiscoveryRequest) -> BoxFuture<'a, Result<Discovery, SourceError>> {
        Box::pin(self.client.search(self.kind, request))
    }
}

/// Keep the first `max` findings.
pub(crate) fn cap(mut findings: Vec<Finding>, bounds: ResultBounds) -> Vec<Finding> {
    findings.truncate(bounds.max);
    findings
}
