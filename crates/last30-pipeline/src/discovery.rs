//! Concurrent discovery phase runner.
//!
//! Every (source, request) pair runs as its own task in a `JoinSet` with its
//! own timeout. Outcomes come back in task order regardless of completion
//! order, so merging is deterministic.

use std::sync::Arc;
use std::time::Duration;

use last30_core::SourceKind;
use last30_sources::{Discovery, DiscoveryRequest, Source, SourceError};
use tokio::task::JoinSet;

/// One unit of work in a phase.
pub(crate) struct PhaseTask {
    pub source: Arc<dyn Source>,
    pub request: DiscoveryRequest,
}

/// How one task ended.
#[derive(Debug)]
pub(crate) enum TaskResult {
    Done(Discovery),
    Failed(SourceError),
    TimedOut(Duration),
    /// The task panicked or was cancelled.
    Aborted,
}

#[derive(Debug)]
pub(crate) struct TaskOutcome {
    pub source: SourceKind,
    pub request: DiscoveryRequest,
    pub result: TaskResult,
}

/// Run `tasks` concurrently, each bounded by `timeout`.
pub(crate) async fn run_phase(tasks: Vec<PhaseTask>, timeout: Duration) -> Vec<TaskOutcome> {
    let mut slots: Vec<(SourceKind, DiscoveryRequest, Option<TaskResult>)> = Vec::with_capacity(tasks.len());
    let mut set = JoinSet::new();

    for (idx, task) in tasks.into_iter().enumerate() {
        let kind = task.source.kind();
        slots.push((kind, task.request.clone(), None));
        set.spawn(async move {
            let PhaseTask { source, request } = task;
            let result = match tokio::time::timeout(timeout, source.discover(&request)).await {
                Ok(Ok(discovery)) => TaskResult::Done(discovery),
                Ok(Err(error)) => TaskResult::Failed(error),
                Err(_) => TaskResult::TimedOut(timeout),
            };
            (idx, result)
        });
    }

    while let Some(joined) = set.join_next().await {
        match joined {
            Ok((idx, result)) => slots[idx].2 = Some(result),
            Err(error) => tracing::warn!(%error, "discovery task did not complete"),
        }
    }

    slots
        .into_iter()
        .map(|(source, request, result)| TaskOutcome {
            source,
            request,
            result: result.unwrap_or(TaskResult::Aborted),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use futures::future::BoxFuture;
    use last30_core::{DateWindow, Depth, Finding};

    struct Sleepy {
        kind: SourceKind,
        delay: Duration,
    }

    impl Source for Sleepy {
        fn kind(&self) -> SourceKind {
            self.kind
        }

        fn provider(&self) -> String {
            "sleepy".into()
        }

        fn discover<'a>(&'a self, _request: &'a DiscoveryRequest) -> BoxFuture<'a, Result<Discovery, SourceError>> {
            Box::pin(async move {
                tokio::time::sleep(self.delay).await;
                Ok(Discovery::with_findings(vec![Finding::new(
                    self.kind,
                    format!("https://example.com/{}", self.kind),
                    "t",
                )]))
            })
        }
    }

    fn request() -> DiscoveryRequest {
        let now = Utc.with_ymd_and_hms(2026, 3, 31, 12, 0, 0).unwrap();
        DiscoveryRequest::discovery(
            "topic",
            DateWindow::ending_at(now, 30),
            Depth::Quick,
            Depth::Quick.discovery_bounds(SourceKind::Reddit),
        )
    }

    fn task(kind: SourceKind, delay_ms: u64) -> PhaseTask {
        PhaseTask {
            source: Arc::new(Sleepy {
                kind,
                delay: Duration::from_millis(delay_ms),
            }),
            request: request(),
        }
    }

    #[tokio::test]
    async fn outcomes_follow_task_order() {
        let outcomes = run_phase(
            vec![task(SourceKind::Reddit, 30), task(SourceKind::X, 1), task(SourceKind::Youtube, 10)],
            Duration::from_secs(1),
        )
        .await;
        let kinds: Vec<SourceKind> = outcomes.iter().map(|o| o.source).collect();
        assert_eq!(kinds, vec![SourceKind::Reddit, SourceKind::X, SourceKind::Youtube]);
        assert!(outcomes.iter().all(|o| matches!(o.result, TaskResult::Done(_))));
    }

    #[tokio::test]
    async fn slow_task_times_out_alone() {
        let outcomes = run_phase(
            vec![task(SourceKind::Reddit, 5_000), task(SourceKind::X, 5)],
            Duration::from_millis(100),
        )
        .await;
        assert!(matches!(outcomes[0].result, TaskResult::TimedOut(_)));
        assert!(matches!(outcomes[1].result, TaskResult::Done(_)));
    }
}
