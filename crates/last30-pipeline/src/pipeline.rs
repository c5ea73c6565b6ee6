//! The run orchestrator.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;

use last30_config::CredentialSet;
use last30_core::{
    Degradation, Entity, EntityKind, Finding, ModelUse, Phase, PipelineError, RunConfig, RunStats,
    SourceKind, SourceStatus, Stage,
};
use last30_rank::{dedupe, extract_entities, rank};
use last30_sources::{DiscoveryRequest, Enricher, Source, SourceClient};

use crate::deadline::Deadline;
use crate::diagnostics::{Diagnosis, diagnose};
use crate::discovery::{PhaseTask, TaskOutcome, TaskResult, run_phase};
use crate::enrichment::enrich_all;
use crate::report::Report;
use crate::tracker::{StageObserver, StageTracker};

const DEFAULT_ENRICHMENT_CONCURRENCY: usize = 8;

/// Drives one research run over a fixed set of sources and enrichers.
pub struct Pipeline {
    credentials: CredentialSet,
    sources: BTreeMap<SourceKind, Arc<dyn Source>>,
    enrichers: Vec<Arc<dyn Enricher>>,
    enrichment_concurrency: usize,
    observer: Option<Arc<dyn Fn(Stage) + Send + Sync>>,
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("credentials", &self.credentials)
            .field("sources", &self.sources.keys().collect::<Vec<_>>())
            .field("enrichers", &self.enrichers.iter().map(|e| e.name()).collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}

impl Pipeline {
    /// An empty pipeline; register sources with [`Pipeline::with_source`].
    #[must_use]
    pub fn new(credentials: CredentialSet) -> Self {
        Self {
            credentials,
            sources: BTreeMap::new(),
            enrichers: Vec::new(),
            enrichment_concurrency: DEFAULT_ENRICHMENT_CONCURRENCY,
            observer: None,
        }
    }

    /// Live sources for every credentialed source, plus the client's
    /// enrichers.
    #[must_use]
    pub fn live(client: &SourceClient, credentials: CredentialSet) -> Self {
        let mut pipeline = Self::new(credentials);
        for kind in SourceKind::ALL {
            if pipeline.credentials.has(kind) {
                pipeline.sources.insert(kind, client.source(kind));
            }
        }
        pipeline.enrichers = client.enrichers();
        pipeline
    }

    /// Register (or replace) the source for its kind.
    #[must_use]
    pub fn with_source(mut self, source: Arc<dyn Source>) -> Self {
        self.sources.insert(source.kind(), source);
        self
    }

    #[must_use]
    pub fn with_enricher(mut self, enricher: Arc<dyn Enricher>) -> Self {
        self.enrichers.push(enricher);
        self
    }

    #[must_use]
    pub fn with_enrichment_concurrency(mut self, concurrency: usize) -> Self {
        self.enrichment_concurrency = concurrency.max(1);
        self
    }

    /// Notify `observer` on every stage change.
    #[must_use]
    pub fn with_observer(mut self, observer: impl Fn(Stage) + Send + Sync + 'static) -> Self {
        self.observer = Some(Arc::new(observer));
        self
    }

    /// Availability of every source for `config`. No network access.
    #[must_use]
    pub fn diagnose(&self, config: &RunConfig) -> Diagnosis {
        let mut diagnosis = diagnose(&self.credentials, &config.sources);
        for entry in &mut diagnosis.sources {
            if entry.available && !self.sources.contains_key(&entry.source) {
                entry.available = false;
                entry.reason = Some("no client registered".to_string());
            }
        }
        diagnosis
    }

    fn tracker(&self) -> StageTracker {
        let tracker = StageTracker::new();
        match &self.observer {
            Some(observer) => {
                let observer = Arc::clone(observer);
                let boxed: StageObserver = Box::new(move |stage| observer(stage));
                tracker.with_observer(boxed)
            }
            None => tracker,
        }
    }

    /// Run diagnostics only, walking `Idle → Diagnosing → Done`.
    #[must_use]
    pub fn run_diagnostics(&self, config: &RunConfig) -> Diagnosis {
        let mut tracker = self.tracker();
        tracker.advance(Stage::Diagnosing);
        let diagnosis = self.diagnose(config);
        tracker.advance(Stage::Done);
        diagnosis
    }

    /// Run the full pipeline for `topic`.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::ConfigInvalid`] for a blank topic and
    /// [`PipelineError::NoSourcesAvailable`] when no enabled source can run.
    /// Every other failure is recorded in the report's stats.
    pub async fn run(&self, topic: &str, config: &RunConfig) -> Result<Report, PipelineError> {
        let topic = last30_core::validate_topic(topic)?;
        let started = Instant::now();
        let deadline = Deadline::after(config.run_timeout);
        let window = config.window();
        let mut tracker = self.tracker();
        let mut stats = RunStats::default();

        // Diagnose
        tracker.advance(Stage::Diagnosing);
        let diagnosis = self.diagnose(config);
        let usable = diagnosis.usable();
        for entry in diagnosis.sources.iter().filter(|s| s.enabled) {
            let report = stats.source_mut(entry.source);
            report.provider.clone_from(&entry.provider);
            if !entry.available {
                report.detail.clone_from(&entry.reason);
                if entry.required {
                    stats.degradations.push(Degradation::CredentialMissing {
                        source: entry.source,
                        credential: CredentialSet::credential_name(entry.source).to_string(),
                    });
                }
                tracing::info!(source = %entry.source, reason = ?entry.reason, "source unavailable");
            }
        }
        if usable.is_empty() {
            return Err(PipelineError::NoSourcesAvailable {
                missing: diagnosis.missing(),
            });
        }

        // Phase 1
        tracker.advance(Stage::Discovering(Phase::Discovery));
        let tasks: Vec<PhaseTask> = usable
            .iter()
            .filter_map(|kind| {
                let source = self.sources.get(kind)?;
                Some(PhaseTask {
                    source: Arc::clone(source),
                    request: DiscoveryRequest::discovery(topic, window, config.depth, config.bounds(*kind)),
                })
            })
            .collect();
        let outcomes = run_phase(tasks, deadline.cap(config.stage_timeout)).await;
        let mut overview = None;
        let mut findings = absorb(outcomes, Phase::Discovery, &mut stats, &mut overview);

        // Entities
        tracker.advance(Stage::Extracting);
        let entities = extract_entities(&findings, topic, config.depth.entity_seeds());
        stats.entities.clone_from(&entities);
        let follow_ups: Vec<PhaseTask> = entities
            .into_iter()
            .filter_map(|entity| {
                let kind = target_source(&entity);
                if !usable.contains(&kind) {
                    return None;
                }
                let source = self.sources.get(&kind)?;
                let base = DiscoveryRequest::discovery(topic, window, config.depth, config.bounds(kind));
                Some(PhaseTask {
                    source: Arc::clone(source),
                    request: base.supplemental(entity),
                })
            })
            .collect();

        // Phase 2
        if follow_ups.is_empty() {
            tracing::debug!("no entity seeds for supplemental discovery");
        } else if deadline.is_expired() {
            tracing::warn!("run deadline reached; skipping supplemental discovery");
        } else {
            tracker.advance(Stage::Discovering(Phase::Supplemental));
            let outcomes = run_phase(follow_ups, deadline.cap(config.stage_timeout)).await;
            findings.extend(absorb(outcomes, Phase::Supplemental, &mut stats, &mut overview));
        }

        let deduped = dedupe(findings);
        stats.duplicates_removed = deduped.removed;
        let mut findings = deduped.findings;

        // Enrichment
        tracker.advance(Stage::Enriching);
        if deadline.is_expired() {
            tracing::warn!("run deadline reached; skipping enrichment");
        } else if !self.enrichers.is_empty() {
            let run = enrich_all(
                &mut findings,
                &self.enrichers,
                config.depth,
                self.enrichment_concurrency,
                config.enrichment_timeout,
                deadline.remaining(),
            )
            .await;
            stats.enrichment = run.stats;
            stats.degradations.extend(run.degradations);
        }

        // Scoring
        tracker.advance(Stage::Scoring);
        let ranking = rank(findings, topic, &window);
        stats.excluded_out_of_window = ranking.excluded;

        // Synthesis
        tracker.advance(Stage::Synthesizing);
        stats.elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
        let report = Report::synthesize(
            topic,
            config.now,
            window,
            config.depth,
            ranking.findings,
            stats,
            overview,
        );
        tracker.advance(Stage::Done);

        tracing::info!(
            topic,
            findings = report.findings.len(),
            elapsed_ms = report.stats.elapsed_ms,
            "run complete"
        );
        Ok(report)
    }
}

/// Phase 2 source able to follow up on `entity`.
const fn target_source(entity: &Entity) -> SourceKind {
    match entity.kind {
        EntityKind::Handle => SourceKind::X,
        EntityKind::Community => SourceKind::Reddit,
    }
}

fn record_model(stats: &mut RunStats, source: SourceKind, model: &ModelUse) {
    if !model.is_degraded() {
        return;
    }
    let degradation = Degradation::ModelDegraded {
        source,
        requested: model.requested.clone(),
        served: model.served.clone(),
    };
    if !stats.degradations.contains(&degradation) {
        tracing::warn!(source = %source, requested = %model.requested, served = %model.served, "fallback model served request");
        stats.degradations.push(degradation);
    }
}

/// Fold phase outcomes into `stats`; return the findings in task order.
fn absorb(
    outcomes: Vec<TaskOutcome>,
    phase: Phase,
    stats: &mut RunStats,
    overview: &mut Option<String>,
) -> Vec<Finding> {
    let mut findings = Vec::new();
    for TaskOutcome { source, request, result } in outcomes {
        let target = request.target.as_ref().map(Entity::display);
        let failure = match result {
            TaskResult::Done(discovery) => {
                let count = discovery.findings.len();
                tracing::info!(source = %source, phase = %phase, seed = ?target, count, "source answered");
                if let Some(model) = &discovery.model {
                    record_model(stats, source, model);
                }
                let report = stats.source_mut(source);
                report.status = SourceStatus::Ok;
                match phase {
                    Phase::Discovery => report.discovered += count,
                    Phase::Supplemental => report.supplemental += count,
                }
                if discovery.model.is_some() {
                    report.model.clone_from(&discovery.model);
                }
                if discovery.provider.is_some() {
                    report.provider.clone_from(&discovery.provider);
                }
                if !discovery.warnings.is_empty() {
                    for warning in &discovery.warnings {
                        tracing::warn!(source = %source, warning = %warning, "partial source failure");
                    }
                    report.detail = Some(discovery.warnings.join("; "));
                }
                if overview.is_none() {
                    overview.clone_from(&discovery.overview);
                }
                findings.extend(discovery.findings.into_iter().map(|f| f.with_phase(phase)));
                None
            }
            TaskResult::Failed(error) => Some((SourceStatus::Failed, error.to_string())),
            TaskResult::TimedOut(after) => Some((
                SourceStatus::TimedOut,
                format!("timed out after {}ms", after.as_millis()),
            )),
            TaskResult::Aborted => Some((SourceStatus::Failed, "task aborted".to_string())),
        };

        if let Some((status, message)) = failure {
            let message = match &target {
                Some(target) => format!("{target}: {message}"),
                None => message,
            };
            tracing::warn!(source = %source, phase = %phase, error = %message, "source fetch failed");
            let report = stats.source_mut(source);
            if report.status != SourceStatus::Ok {
                report.status = status;
            }
            report.detail = Some(message.clone());
            stats.degradations.push(Degradation::SourceFetchFailed { source, phase, message });
        }
    }
    findings
}
