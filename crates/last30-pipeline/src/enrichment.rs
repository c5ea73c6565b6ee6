//! Concurrent enrichment runner.
//!
//! Each (finding, enricher) lookup is an independent task holding its own
//! copy of the finding, gated by a semaphore and bounded by its own timeout:
//! the enricher's own budget when it asks for a longer one, never past the
//! run deadline.
//! Patches are applied only after every lookup has finished, in finding
//! order then enricher order.

use std::sync::Arc;
use std::time::Duration;

use last30_core::{Degradation, Depth, EnrichmentStats, Finding};
use last30_sources::{Enricher, EnrichmentPatch};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio::time::Instant;

pub(crate) struct EnrichmentRun {
    pub stats: EnrichmentStats,
    pub degradations: Vec<Degradation>,
}

/// Indices of the findings `enricher` should look at, best candidates first.
///
/// With a limit, candidates are ranked by views, then likes, then position.
fn select(findings: &[Finding], enricher: &dyn Enricher, depth: Depth) -> Vec<usize> {
    let mut candidates: Vec<usize> = findings
        .iter()
        .enumerate()
        .filter(|(_, f)| enricher.applies_to(f))
        .map(|(i, _)| i)
        .collect();
    if let Some(limit) = enricher.limit(depth) {
        candidates.sort_by(|&a, &b| {
            let (ea, eb) = (&findings[a].engagement, &findings[b].engagement);
            eb.views
                .cmp(&ea.views)
                .then_with(|| eb.likes.cmp(&ea.likes))
                .then_with(|| a.cmp(&b))
        });
        candidates.truncate(limit);
        candidates.sort_unstable();
    }
    candidates
}

/// Time allowed for one lookup by `enricher`.
fn lookup_timeout(enricher: &dyn Enricher, timeout: Duration, budget: Duration) -> Duration {
    enricher
        .timeout()
        .map_or(timeout, |own| own.max(timeout))
        .min(budget)
}

/// Enrich `findings` in place.
///
/// `timeout` bounds each lookup unless its enricher asks for more; `budget`
/// is what remains of the run and bounds every lookup.
pub(crate) async fn enrich_all(
    findings: &mut [Finding],
    enrichers: &[Arc<dyn Enricher>],
    depth: Depth,
    concurrency: usize,
    timeout: Duration,
    budget: Duration,
) -> EnrichmentRun {
    let semaphore = Arc::new(Semaphore::new(concurrency.max(1)));
    let run_end = Instant::now().checked_add(budget);
    let mut set = JoinSet::new();
    let mut attempted = 0;

    for (order, enricher) in enrichers.iter().enumerate() {
        let per_lookup = lookup_timeout(enricher.as_ref(), timeout, budget);
        for idx in select(findings, enricher.as_ref(), depth) {
            attempted += 1;
            let enricher = Arc::clone(enricher);
            let finding = findings[idx].clone();
            let permits = Arc::clone(&semaphore);
            set.spawn(async move {
                let Ok(_permit) = permits.acquire().await else {
                    return (idx, order, finding.url, Err("enrichment cancelled".to_string()));
                };
                // Time spent queued for a permit still counts against the run.
                let per_lookup = run_end.map_or(per_lookup, |end| {
                    per_lookup.min(end.saturating_duration_since(Instant::now()))
                });
                let result = match tokio::time::timeout(per_lookup, enricher.enrich(&finding)).await {
                    Ok(Ok(patch)) => Ok(patch),
                    Ok(Err(error)) => Err(format!("{}: {error}", enricher.name())),
                    Err(_) => Err(format!(
                        "{}: timed out after {:.1}s",
                        enricher.name(),
                        per_lookup.as_secs_f64()
                    )),
                };
                (idx, order, finding.url, result)
            });
        }
    }

    let mut results: Vec<(usize, usize, String, Result<EnrichmentPatch, String>)> = Vec::with_capacity(attempted);
    while let Some(joined) = set.join_next().await {
        match joined {
            Ok(result) => results.push(result),
            Err(error) => tracing::warn!(%error, "enrichment task did not complete"),
        }
    }
    results.sort_by(|a, b| (a.0, a.1).cmp(&(b.0, b.1)));

    let mut stats = EnrichmentStats {
        attempted,
        ..EnrichmentStats::default()
    };
    let mut degradations = Vec::new();
    for (idx, _, url, result) in results {
        match result {
            Ok(patch) => {
                patch.apply_to(&mut findings[idx]);
                stats.succeeded += 1;
            }
            Err(message) => {
                tracing::warn!(url = %url, error = %message, "enrichment failed");
                degradations.push(Degradation::EnrichmentFailed { url, message });
                stats.failed += 1;
            }
        }
    }
    stats.failed += attempted - stats.succeeded - stats.failed;

    EnrichmentRun { stats, degradations }
}
