//! Source availability from credentials and local tools.
//!
//! Diagnosis reads the [`CredentialSet`] only. It never builds a request,
//! so `--diagnose` works offline and never touches a discovery API.

use last30_config::{CredentialSet, YoutubeBackend};
use last30_core::SourceKind;
use serde::Serialize;

/// What one source would do in a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceAvailability {
    pub source: SourceKind,
    /// Selected for this run by flags or defaults.
    pub enabled: bool,
    /// Its credential or local tool is present.
    pub available: bool,
    /// A missing credential is reported rather than silently ignored.
    pub required: bool,
    /// Backend that would serve discovery.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,
    /// Why the source is unavailable.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl SourceAvailability {
    /// Enabled and available.
    #[must_use]
    pub const fn is_usable(&self) -> bool {
        self.enabled && self.available
    }
}

/// Per-source availability, in canonical source order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnosis {
    pub sources: Vec<SourceAvailability>,
    /// Transcript enrichment is configured.
    pub transcripts: bool,
}

impl Diagnosis {
    #[must_use]
    pub fn get(&self, source: SourceKind) -> Option<&SourceAvailability> {
        self.sources.iter().find(|s| s.source == source)
    }

    /// Sources a run would query.
    #[must_use]
    pub fn usable(&self) -> Vec<SourceKind> {
        self.sources
            .iter()
            .filter(|s| s.is_usable())
            .map(|s| s.source)
            .collect()
    }

    /// `source: reason` for every enabled source that cannot run.
    #[must_use]
    pub fn missing(&self) -> Vec<String> {
        self.sources
            .iter()
            .filter(|s| s.enabled && !s.available)
            .map(|s| format!("{}: {}", s.source, s.reason.as_deref().unwrap_or("unavailable")))
            .collect()
    }
}

fn provider(credentials: &CredentialSet, source: SourceKind) -> Option<String> {
    match source {
        SourceKind::Reddit => credentials.reddit.then(|| "openai".to_string()),
        SourceKind::X => credentials.x.then(|| "xai".to_string()),
        SourceKind::Youtube => credentials.youtube.as_ref().map(|backend| match backend {
            YoutubeBackend::DataApi => "youtube-data-api".to_string(),
            YoutubeBackend::YtDlp(path) => format!("yt-dlp ({})", path.display()),
        }),
        SourceKind::Web => (!credentials.web.is_empty()).then(|| {
            credentials
                .web
                .iter()
                .map(|p| p.as_str())
                .collect::<Vec<_>>()
                .join("+")
        }),
    }
}

fn reason(source: SourceKind) -> String {
    match source {
        SourceKind::Reddit | SourceKind::X => {
            format!("{} not set", CredentialSet::credential_name(source))
        }
        SourceKind::Youtube => "YOUTUBE_API_KEY not set and yt-dlp not found on PATH".to_string(),
        SourceKind::Web => format!(
            "no web provider configured ({})",
            CredentialSet::credential_name(source)
        ),
    }
}

/// Report availability of every source. `enabled` marks the ones selected
/// for the run.
#[must_use]
pub fn diagnose(credentials: &CredentialSet, enabled: &[SourceKind]) -> Diagnosis {
    let sources = SourceKind::ALL
        .into_iter()
        .map(|source| {
            let available = credentials.has(source);
            SourceAvailability {
                source,
                enabled: enabled.contains(&source),
                available,
                required: source.is_required(),
                provider: provider(credentials, source),
                reason: (!available).then(|| reason(source)),
            }
        })
        .collect();
    Diagnosis {
        sources,
        transcripts: credentials.transcripts,
    }
}
