//! # last30-store
//!
//! Append-only JSONL store of completed runs. One [`StoredRun`] per line,
//! keyed by `(topic, run_at)`. Written once per run, after synthesis, when
//! `--store` is given; read back by topic.

mod error;
mod run;

pub use error::StoreError;
pub use run::{RECORD_VERSION, StoredRun};

use std::path::{Path, PathBuf};

/// Handle to a JSONL run store file.
#[derive(Debug, Clone)]
pub struct RunStore {
    path: PathBuf,
}

impl RunStore {
    /// Open the store at `path`. Nothing is touched until the first write.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: std::io::Error) -> StoreError {
        StoreError::Io {
            path: self.path.clone(),
            source,
        }
    }

    /// Append `run` as one line, creating the file and its parent directory
    /// if needed.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Io`] when the directory cannot be created or the
    /// line cannot be written.
    pub fn append(&self, run: &StoredRun) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| self.io_error(e))?;
        }
        serde_jsonlines::append_json_lines(&self.path, [run]).map_err(|e| self.io_error(e))?;
        tracing::debug!(
            path = %self.path.display(),
            topic = %run.topic,
            findings = run.findings.len(),
            "run stored"
        );
        Ok(())
    }

    /// Every stored run, in file order. A missing file is an empty store.
    ///
    /// Lines that fail to parse are skipped with a warning so one torn write
    /// does not hide the rest of the history.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Io`] when the file exists but cannot be read, or
    /// [`StoreError::UnsupportedVersion`] for a record from a newer format.
    pub fn runs(&self) -> Result<Vec<StoredRun>, StoreError> {
        let lines = match serde_jsonlines::json_lines::<StoredRun, _>(&self.path) {
            Ok(lines) => lines,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(self.io_error(e)),
        };

        let mut runs = Vec::new();
        for (line_no, line) in lines.enumerate() {
            match line {
                Ok(run) => {
                    run.check_version()?;
                    runs.push(run);
                }
                Err(e) if is_malformed(&e) => {
                    tracing::warn!(
                        path = %self.path.display(),
                        line = line_no + 1,
                        error = %e,
                        "skipping unreadable run record"
                    );
                }
                Err(e) => return Err(self.io_error(e)),
            }
        }
        Ok(runs)
    }

    /// Runs recorded for `topic`, oldest first.
    ///
    /// Topics compare case-insensitively after trimming.
    ///
    /// # Errors
    ///
    /// Same as [`RunStore::runs`].
    pub fn runs_for_topic(&self, topic: &str) -> Result<Vec<StoredRun>, StoreError> {
        let mut runs: Vec<StoredRun> = self
            .runs()?
            .into_iter()
            .filter(|run| run.matches_topic(topic))
            .collect();
        runs.sort_by_key(|run| run.run_at);
        Ok(runs)
    }

    /// Most recent run recorded for `topic`.
    ///
    /// # Errors
    ///
    /// Same as [`RunStore::runs`].
    pub fn latest_for_topic(&self, topic: &str) -> Result<Option<StoredRun>, StoreError> {
        Ok(self.runs_for_topic(topic)?.pop())
    }
}

/// Parse failures surface as `InvalidData`, or `UnexpectedEof` for a
/// truncated line.
fn is_malformed(error: &std::io::Error) -> bool {
    matches!(
        error.kind(),
        std::io::ErrorKind::InvalidData | std::io::ErrorKind::UnexpectedEof
    )
}
