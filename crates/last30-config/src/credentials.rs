//! API credentials and local tools.
//!
//! Only the *presence* of a credential decides whether a source is usable.
//! [`CredentialSet`] is the read-only presence map consumed by diagnostics and
//! by source construction.

use std::path::{Path, PathBuf};

use last30_core::SourceKind;
use serde::{Deserialize, Serialize};

/// Well-known environment variable names, mapped onto `credentials.*`.
pub const CREDENTIAL_VARS: [&str; 8] = [
    "OPENAI_API_KEY",
    "XAI_API_KEY",
    "YOUTUBE_API_KEY",
    "BRAVE_API_KEY",
    "OPENROUTER_API_KEY",
    "DATAFORSEO_LOGIN",
    "DATAFORSEO_PASSWORD",
    "SUPADATA_API_KEY",
];

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct CredentialsConfig {
    /// OpenAI key for Reddit search.
    #[serde(default)]
    pub openai_api_key: String,

    /// xAI key for X search.
    #[serde(default)]
    pub xai_api_key: String,

    /// YouTube Data API v3 key.
    #[serde(default)]
    pub youtube_api_key: String,

    #[serde(default)]
    pub brave_api_key: String,

    #[serde(default)]
    pub openrouter_api_key: String,

    #[serde(default)]
    pub dataforseo_login: String,

    #[serde(default)]
    pub dataforseo_password: String,

    /// Supadata key for video transcripts.
    #[serde(default)]
    pub supadata_api_key: String,
}

impl CredentialsConfig {
    /// Whether any credential is set.
    #[must_use]
    pub fn is_configured(&self) -> bool {
        [
            &self.openai_api_key,
            &self.xai_api_key,
            &self.youtube_api_key,
            &self.brave_api_key,
            &self.openrouter_api_key,
            &self.dataforseo_login,
            &self.dataforseo_password,
            &self.supadata_api_key,
        ]
        .iter()
        .any(|value| !value.is_empty())
    }

    #[must_use]
    pub fn has_dataforseo(&self) -> bool {
        !self.dataforseo_login.is_empty() && !self.dataforseo_password.is_empty()
    }

    /// Configured web providers in preference order.
    #[must_use]
    pub fn web_providers(&self) -> Vec<WebProvider> {
        let mut providers = Vec::new();
        if !self.brave_api_key.is_empty() {
            providers.push(WebProvider::Brave);
        }
        if !self.openrouter_api_key.is_empty() {
            providers.push(WebProvider::OpenRouter);
        }
        if self.has_dataforseo() {
            providers.push(WebProvider::DataForSeo);
        }
        providers
    }
}

/// Generic web search provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WebProvider {
    Brave,
    OpenRouter,
    /// Google AI Mode via DataForSEO. Supplemental: runs alongside the others.
    DataForSeo,
}

impl WebProvider {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Brave => "brave",
            Self::OpenRouter => "openrouter",
            Self::DataForSeo => "dataforseo",
        }
    }
}

/// How YouTube discovery will be served.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum YoutubeBackend {
    DataApi,
    YtDlp(PathBuf),
}

/// Local executables that can stand in for API credentials.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LocalTools {
    pub yt_dlp: Option<PathBuf>,
}

impl LocalTools {
    /// Look for known tools on `PATH`. Presence check only; nothing is run.
    #[must_use]
    pub fn probe() -> Self {
        let path = std::env::var_os("PATH").unwrap_or_default();
        Self::probe_in(std::env::split_paths(&path))
    }

    /// Look for known tools in `dirs`.
    #[must_use]
    pub fn probe_in<I, P>(dirs: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        let dirs: Vec<PathBuf> = dirs.into_iter().map(|d| d.as_ref().to_path_buf()).collect();
        Self {
            yt_dlp: find_executable(&dirs, "yt-dlp"),
        }
    }
}

fn find_executable(dirs: &[PathBuf], name: &str) -> Option<PathBuf> {
    dirs.iter().find_map(|dir| {
        [name.to_string(), format!("{name}.exe")]
            .into_iter()
            .map(|file| dir.join(file))
            .find(|candidate| candidate.is_file())
    })
}

/// Presence map from source to usable credential or tool.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CredentialSet {
    pub reddit: bool,
    pub x: bool,
    pub youtube: Option<YoutubeBackend>,
    pub web: Vec<WebProvider>,
    pub transcripts: bool,
}

impl CredentialSet {
    #[must_use]
    pub fn from_config(credentials: &CredentialsConfig, tools: &LocalTools) -> Self {
        let youtube = if credentials.youtube_api_key.is_empty() {
            tools.yt_dlp.clone().map(YoutubeBackend::YtDlp)
        } else {
            Some(YoutubeBackend::DataApi)
        };
        Self {
            reddit: !credentials.openai_api_key.is_empty(),
            x: !credentials.xai_api_key.is_empty(),
            youtube,
            web: credentials.web_providers(),
            transcripts: !credentials.supadata_api_key.is_empty(),
        }
    }

    /// Whether `source` has what it needs to run.
    #[must_use]
    pub fn has(&self, source: SourceKind) -> bool {
        match source {
            SourceKind::Reddit => self.reddit,
            SourceKind::X => self.x,
            SourceKind::Youtube => self.youtube.is_some(),
            SourceKind::Web => !self.web.is_empty(),
        }
    }

    /// Environment variable(s) that enable `source`.
    #[must_use]
    pub const fn credential_name(source: SourceKind) -> &'static str {
        match source {
            SourceKind::Reddit => "OPENAI_API_KEY",
            SourceKind::X => "XAI_API_KEY",
            SourceKind::Youtube => "YOUTUBE_API_KEY or yt-dlp",
            SourceKind::Web => "BRAVE_API_KEY, OPENROUTER_API_KEY or DATAFORSEO_LOGIN/PASSWORD",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn required_only() -> CredentialsConfig {
        CredentialsConfig {
            openai_api_key: "sk-test".into(),
            xai_api_key: "xai-test".into(),
            ..Default::default()
        }
    }

    #[test]
    fn required_only_enables_reddit_and_x() {
        let set = CredentialSet::from_config(&required_only(), &LocalTools::default());
        let available: Vec<SourceKind> = SourceKind::ALL
            .into_iter()
            .filter(|s| set.has(*s))
            .collect();
        assert_eq!(available, vec![SourceKind::Reddit, SourceKind::X]);
    }

    #[test]
    fn api_key_beats_local_tool() {
        let creds = CredentialsConfig {
            youtube_api_key: "yt".into(),
            ..Default::default()
        };
        let tools = LocalTools {
            yt_dlp: Some(PathBuf::from("/usr/bin/yt-dlp")),
        };
        let set = CredentialSet::from_config(&creds, &tools);
        assert_eq!(set.youtube, Some(YoutubeBackend::DataApi));
    }

    #[test]
    fn local_tool_enables_youtube() {
        let tools = LocalTools {
            yt_dlp: Some(PathBuf::from("/usr/bin/yt-dlp")),
        };
        let set = CredentialSet::from_config(&CredentialsConfig::default(), &tools);
        assert!(set.has(SourceKind::Youtube));
    }

    #[test]
    fn dataforseo_needs_both_halves() {
        let creds = CredentialsConfig {
            dataforseo_login: "me".into(),
            ..Default::default()
        };
        assert!(creds.web_providers().is_empty());
        let creds = CredentialsConfig {
            dataforseo_password: "pw".into(),
            ..creds
        };
        assert_eq!(creds.web_providers(), vec![WebProvider::DataForSeo]);
    }

    #[test]
    fn web_providers_in_preference_order() {
        let creds = CredentialsConfig {
            openrouter_api_key: "or".into(),
            brave_api_key: "br".into(),
            ..Default::default()
        };
        assert_eq!(
            creds.web_providers(),
            vec![WebProvider::Brave, WebProvider::OpenRouter]
        );
    }

    #[test]
    fn probe_finds_executable_in_dir() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("yt-dlp"), b"#!/bin/sh\n").unwrap();
        let tools = LocalTools::probe_in([dir.path()]);
        assert_eq!(tools.yt_dlp, Some(dir.path().join("yt-dlp")));

        let empty = tempfile::tempdir().unwrap();
        assert!(LocalTools::probe_in([empty.path()]).yt_dlp.is_none());
    }
}
