#![allow(dead_code)]

use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use chrono::{DateTime, TimeZone, Utc};
use futures::future::BoxFuture;
use last30_config::CredentialSet;
use last30_core::{Engagement, Finding, ModelUse, RunConfig, RunDefaults, RunFlags, SourceKind};
use last30_sources::{Discovery, DiscoveryRequest, Enricher, EnrichmentPatch, Source, SourceError};

pub fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 31, 12, 0, 0).unwrap()
}

pub fn days_ago(days: i64) -> DateTime<Utc> {
    now() - chrono::Duration::days(days)
}

pub fn config(flags: &RunFlags) -> RunConfig {
    RunConfig::resolve(flags, &RunDefaults::default(), now()).unwrap()
}

pub fn config_with_stage_timeout(stage_timeout: Duration) -> RunConfig {
    let defaults = RunDefaults {
        stage_timeout,
        ..RunDefaults::default()
    };
    RunConfig::resolve(&RunFlags::default(), &defaults, now()).unwrap()
}

pub fn credentials(sources: &[SourceKind]) -> CredentialSet {
    CredentialSet {
        reddit: sources.contains(&SourceKind::Reddit),
        x: sources.contains(&SourceKind::X),
        youtube: sources
            .contains(&SourceKind::Youtube)
            .then_some(last30_config::YoutubeBackend::DataApi),
        web: if sources.contains(&SourceKind::Web) {
            vec![last30_config::WebProvider::Brave]
        } else {
            Vec::new()
        },
        transcripts: false,
    }
}

pub fn reddit_thread(id: u32, community: &str, title: &str, days: i64) -> Finding {
    Finding::new(
        SourceKind::Reddit,
        format!("https://www.reddit.com/r/{community}/comments/{id}/post/"),
        title,
    )
    .with_community(community)
    .with_published(days_ago(days))
    .with_engagement(Engagement {
        score: Some(i64::from(id) * 10),
        comments: Some(u64::from(id)),
        ..Engagement::default()
    })
}

pub fn x_post(id: u32, author: &str, title: &str, days: i64) -> Finding {
    Finding::new(SourceKind::X, format!("https://x.com/{author}/status/{id}"), title)
        .with_author(author)
        .with_published(days_ago(days))
        .with_engagement(Engagement {
            likes: Some(u64::from(id) * 25),
            ..Engagement::default()
        })
}

/// Scripted source that records every request it receives.
pub struct FakeSource {
    kind: SourceKind,
    discovery: Vec<Finding>,
    supplemental: Vec<Finding>,
    fail_with: Option<u16>,
    delay: Option<Duration>,
    model: Option<ModelUse>,
    calls: AtomicUsize,
    requests: Mutex<Vec<DiscoveryRequest>>,
}

impl FakeSource {
    pub fn new(kind: SourceKind, discovery: Vec<Finding>) -> Self {
        Self {
            kind,
            discovery,
            supplemental: Vec::new(),
            fail_with: None,
            delay: None,
            model: None,
            calls: AtomicUsize::new(0),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(kind: SourceKind, status: u16) -> Self {
        Self {
            fail_with: Some(status),
            ..Self::new(kind, Vec::new())
        }
    }

    pub fn with_supplemental(mut self, findings: Vec<Finding>) -> Self {
        self.supplemental = findings;
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn with_model(mut self, requested: &str, served: &str, attempts: u32) -> Self {
        self.model = Some(ModelUse {
            requested: requested.to_string(),
            served: served.to_string(),
            attempts,
        });
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn requests(&self) -> Vec<DiscoveryRequest> {
        self.requests.lock().unwrap().clone()
    }
}

impl Source for FakeSource {
    fn kind(&self) -> SourceKind {
        self.kind
    }

    fn provider(&self) -> String {
        "fake".to_string()
    }

    fn discover<'a>(&'a self, request: &'a DiscoveryRequest) -> BoxFuture<'a, Result<Discovery, SourceError>> {
        Box::pin(async move {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.requests.lock().unwrap().push(request.clone());
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            if let Some(status) = self.fail_with {
                return Err(SourceError::Api {
                    status,
                    message: "scripted failure".to_string(),
                });
            }
            let findings = if request.target.is_some() {
                self.supplemental.clone()
            } else {
                self.discovery.clone()
            };
            Ok(Discovery {
                findings,
                model: self.model.clone(),
                provider: Some("fake".to_string()),
                ..Discovery::default()
            })
        })
    }
}

/// Enricher that backfills a fixed comment count on Reddit findings.
pub struct CommentCounter {
    pub comments: u64,
    pub fail_url: Option<String>,
}

impl Enricher for CommentCounter {
    fn name(&self) -> &'static str {
        "comment-counter"
    }

    fn applies_to(&self, finding: &Finding) -> bool {
        finding.source == SourceKind::Reddit
    }

    fn enrich<'a>(&'a self, finding: &'a Finding) -> BoxFuture<'a, Result<EnrichmentPatch, SourceError>> {
        Box::pin(async move {
            if self.fail_url.as_deref() == Some(finding.url.as_str()) {
                return Err(SourceError::Api {
                    status: 404,
                    message: "thread gone".to_string(),
                });
            }
            Ok(EnrichmentPatch {
                engagement: Engagement {
                    comments: Some(self.comments),
                    upvote_ratio: Some(0.97),
                    ..Engagement::default()
                },
                ..EnrichmentPatch::default()
            })
        })
    }
}
