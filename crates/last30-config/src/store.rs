//! Run store location.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct StoreConfig {
    /// Explicit JSONL file. Empty means the platform data directory.
    #[serde(default)]
    pub path: String,
}

impl StoreConfig {
    #[must_use]
    pub fn is_configured(&self) -> bool {
        !self.path.is_empty()
    }

    /// Resolved store file, or `None` when no data directory can be found.
    #[must_use]
    pub fn resolved_path(&self) -> Option<PathBuf> {
        if self.path.is_empty() {
            dirs::data_dir().map(|dir| dir.join("last30days").join("runs.jsonl"))
        } else {
            Some(PathBuf::from(&self.path))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_path_wins() {
        let config = StoreConfig {
            path: "/tmp/runs.jsonl".into(),
        };
        assert_eq!(config.resolved_path(), Some(PathBuf::from("/tmp/runs.jsonl")));
    }

    #[test]
    fn default_path_ends_with_runs_file() {
        if let Some(path) = StoreConfig::default().resolved_path() {
            assert!(path.ends_with("last30days/runs.jsonl"));
        }
    }
}
