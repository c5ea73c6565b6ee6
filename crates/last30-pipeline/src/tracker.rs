//! Stage tracking for one invocation.

use std::time::Instant;

use last30_core::Stage;

/// Called on every stage change, e.g. to drive a progress spinner.
pub type StageObserver = Box<dyn Fn(Stage) + Send + Sync>;

/// Walks the invocation state machine and logs each transition.
pub struct StageTracker {
    stage: Stage,
    entered: Instant,
    history: Vec<Stage>,
    observer: Option<StageObserver>,
}

impl std::fmt::Debug for StageTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StageTracker")
            .field("stage", &self.stage)
            .field("history", &self.history)
            .finish_non_exhaustive()
    }
}

impl Default for StageTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl StageTracker {
    #[must_use]
    pub fn new() -> Self {
        Self {
            stage: Stage::Idle,
            entered: Instant::now(),
            history: vec![Stage::Idle],
            observer: None,
        }
    }

    #[must_use]
    pub fn with_observer(mut self, observer: StageObserver) -> Self {
        self.observer = Some(observer);
        self
    }

    #[must_use]
    pub const fn stage(&self) -> Stage {
        self.stage
    }

    /// Stages visited so far, starting with [`Stage::Idle`].
    #[must_use]
    pub fn history(&self) -> &[Stage] {
        &self.history
    }

    /// Move to `next`.
    ///
    /// An illegal transition is a pipeline bug: it is logged and applied
    /// anyway, and trips a debug assertion in test builds.
    pub fn advance(&mut self, next: Stage) {
        let from = self.stage;
        let elapsed_ms = self.entered.elapsed().as_millis();
        if from.can_transition_to(next) {
            tracing::info!(from = %from, to = %next, elapsed_ms, "stage transition");
        } else {
            tracing::warn!(from = %from, to = %next, "unexpected stage transition");
            debug_assert!(false, "illegal stage transition {from} -> {next}");
        }
        self.stage = next;
        self.entered = Instant::now();
        self.history.push(next);
        if let Some(observer) = &self.observer {
            observer(next);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use last30_core::Phase;
    use pretty_assertions::assert_eq;
    use std::sync::{Arc, Mutex};

    #[test]
    fn records_history_and_notifies_observer() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let mut tracker = StageTracker::new().with_observer(Box::new(move |stage| {
            sink.lock().unwrap().push(stage);
        }));

        tracker.advance(Stage::Diagnosing);
        tracker.advance(Stage::Discovering(Phase::Discovery));

        assert_eq!(tracker.stage(), Stage::Discovering(Phase::Discovery));
        assert_eq!(
            tracker.history(),
            [Stage::Idle, Stage::Diagnosing, Stage::Discovering(Phase::Discovery)]
        );
        assert_eq!(seen.lock().unwrap().len(), 2);
    }

    #[test]
    #[should_panic(expected = "illegal stage transition")]
    fn illegal_transition_trips_debug_assert() {
        let mut tracker = StageTracker::new();
        tracker.advance(Stage::Scoring);
    }
}
