//! Error types for last30-store.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    /// The store file or its directory could not be created, read, or written.
    #[error("run store I/O failed at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A line was written by a newer, incompatible version.
    #[error("unsupported run record version {found} (expected {expected})")]
    UnsupportedVersion { found: u32, expected: u32 },
}
