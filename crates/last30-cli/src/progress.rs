use std::sync::OnceLock;
use std::time::Duration;

use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use last30_core::{Phase, Stage};

use crate::ui;

/// Stage spinner. A no-op when progress is disabled.
#[derive(Clone)]
pub struct Progress {
    bar: Option<ProgressBar>,
}

static MULTI_PROGRESS: OnceLock<MultiProgress> = OnceLock::new();

fn multi_progress() -> &'static MultiProgress {
    MULTI_PROGRESS.get_or_init(MultiProgress::new)
}

impl Progress {
    #[must_use]
    pub fn spinner(message: &str) -> Self {
        if !ui::prefs().progress {
            return Self { bar: None };
        }

        let bar = multi_progress().add(ProgressBar::new_spinner());
        bar.enable_steady_tick(Duration::from_millis(100));
        bar.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {msg} {elapsed:.dim}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        bar.set_message(message.to_string());
        Self { bar: Some(bar) }
    }

    pub fn set_message(&self, message: &str) {
        if let Some(bar) = &self.bar {
            bar.set_message(message.to_string());
        }
    }

    /// Show what the pipeline is doing in `stage`.
    pub fn stage(&self, stage: Stage) {
        self.set_message(stage_message(stage));
    }

    pub fn finish_clear(&self) {
        if let Some(bar) = &self.bar {
            bar.finish_and_clear();
        }
    }

    pub fn finish_err(&self, message: &str) {
        if let Some(bar) = &self.bar {
            bar.abandon_with_message(message.to_string());
        }
    }
}

#[must_use]
pub const fn stage_message(stage: Stage) -> &'static str {
    match stage {
        Stage::Idle => "starting",
        Stage::Diagnosing => "checking sources",
        Stage::Discovering(Phase::Discovery) => "searching sources",
        Stage::Extracting => "extracting handles and communities",
        Stage::Discovering(Phase::Supplemental) => "following up on entities",
        Stage::Enriching => "fetching engagement and transcripts",
        Stage::Scoring => "scoring",
        Stage::Synthesizing => "writing report",
        Stage::Done => "done",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disabled_progress_is_inert() {
        let progress = Progress { bar: None };
        progress.stage(Stage::Scoring);
        progress.finish_clear();
        progress.finish_err("failed");
    }

    #[test]
    fn every_stage_has_a_message() {
        for stage in [
            Stage::Idle,
            Stage::Diagnosing,
            Stage::Discovering(Phase::Discovery),
            Stage::Extracting,
            Stage::Discovering(Phase::Supplemental),
            Stage::Enriching,
            Stage::Scoring,
            Stage::Synthesizing,
            Stage::Done,
        ] {
            assert!(!stage_message(stage).is_empty());
        }
    }
}
