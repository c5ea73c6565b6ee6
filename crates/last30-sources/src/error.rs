//! Source client error types.

use thiserror::Error;

/// Errors that can occur while talking to a source or enrichment API.
#[derive(Debug, Error)]
pub enum SourceError {
    /// HTTP transport error.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The API returned a non-success status code.
    #[error("API error ({status}): {message}")]
    Api {
        /// HTTP status code returned by the API.
        status: u16,
        /// Error message or response body.
        message: String,
    },

    /// The response could not be understood.
    #[error("parse error: {0}")]
    Parse(String),

    /// The API returned a 429 Too Many Requests response.
    #[error("rate limited, retry after {retry_after_secs}s")]
    RateLimited {
        /// Seconds to wait before retrying.
        retry_after_secs: u64,
    },

    /// No credential or local tool is configured for this source.
    #[error("missing credential: {0}")]
    MissingCredential(&'static str),

    /// Every model in the fallback chain failed.
    #[error("all models failed: {}", .failures.join("; "))]
    ModelsExhausted {
        /// One line per failed attempt.
        failures: Vec<String>,
    },

    /// A local tool could not be run or exited with an error.
    #[error("tool error: {0}")]
    Tool(String),
}

impl SourceError {
    /// Whether retrying the same request is pointless.
    ///
    /// Client errors (4xx) are final except 408 and 429. Quota exhaustion is
    /// final whatever the status.
    #[must_use]
    pub fn is_non_retryable(&self) -> bool {
        match self {
            Self::Api { status, message } => {
                is_quota_exhausted(message)
                    || ((400..500).contains(status) && *status != 408 && *status != 429)
            }
            Self::Http(err) => err
                .status()
                .is_some_and(|s| s.is_client_error() && s.as_u16() != 408 && s.as_u16() != 429),
            Self::MissingCredential(_) => true,
            Self::Parse(_) | Self::RateLimited { .. } | Self::ModelsExhausted { .. } | Self::Tool(_) => {
                false
            }
        }
    }
}

fn is_quota_exhausted(message: &str) -> bool {
    let lower = message.to_ascii_lowercase();
    lower.contains("insufficient_quota") || lower.contains("exceeded your current quota")
}
