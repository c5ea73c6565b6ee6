//! # last30-config
//!
//! Layered configuration loading for last30days using figment.
//!
//! Configuration sources (in priority order, highest wins):
//! 1. Well-known credential variables (`OPENAI_API_KEY`, `XAI_API_KEY`, ...)
//! 2. Environment variables (`LAST30DAYS_*` prefix, `__` as separator)
//! 3. Project-level `.last30days/config.toml`
//! 4. User-level `~/.config/last30days/config.toml`
//! 5. Built-in defaults
//!
//! `LAST30DAYS_GENERAL__DEFAULT_DAYS=7` maps to `general.default_days`, and
//! `BRAVE_API_KEY` maps to `credentials.brave_api_key`.
//!
//! ```no_run
//! use last30_config::Last30Config;
//!
//! let config = Last30Config::load_with_dotenv().expect("config");
//! if config.credentials.openai_api_key.is_empty() {
//!     eprintln!("reddit search disabled");
//! }
//! ```

mod credentials;
mod endpoints;
mod error;
mod general;
mod models;
mod store;

pub use credentials::{
    CREDENTIAL_VARS, CredentialSet, CredentialsConfig, LocalTools, WebProvider, YoutubeBackend,
};
pub use endpoints::EndpointsConfig;
pub use error::ConfigError;
pub use general::GeneralConfig;
pub use models::ModelsConfig;
pub use store::StoreConfig;

use std::path::PathBuf;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};

/// Prefix of the namespaced environment variables.
pub const ENV_PREFIX: &str = "LAST30DAYS_";

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Last30Config {
    #[serde(default)]
    pub credentials: CredentialsConfig,
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub models: ModelsConfig,
    #[serde(default)]
    pub endpoints: EndpointsConfig,
    #[serde(default)]
    pub store: StoreConfig,
}

impl Last30Config {
    /// Load configuration from TOML files and environment variables.
    ///
    /// Does not read `.env` files; see [`Self::load_with_dotenv`].
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when a layer fails to parse or a value is
    /// out of range.
    pub fn load() -> Result<Self, ConfigError> {
        let config: Self = Self::figment().extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Load `.env` files into the process environment, then [`Self::load`].
    ///
    /// Variables already set in the environment are never overwritten.
    ///
    /// # Errors
    ///
    /// Same as [`Self::load`].
    pub fn load_with_dotenv() -> Result<Self, ConfigError> {
        Self::load_dotenv_files();
        Self::load()
    }

    /// Build the figment provider chain.
    #[must_use]
    pub fn figment() -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Some(global_path) = Self::global_config_path() {
            if global_path.exists() {
                figment = figment.merge(Toml::file(global_path));
            }
        }

        let local_path = PathBuf::from(".last30days/config.toml");
        if local_path.exists() {
            figment = figment.merge(Toml::file(local_path));
        }

        figment
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .merge(Self::credential_env())
    }

    /// Cross-field checks that figment cannot express.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] for zero timeouts, an empty model
    /// chain, or zero attempts per model.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.general.validate()?;
        if self.models.reddit.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "models.reddit".to_string(),
                reason: "at least one model is required".to_string(),
            });
        }
        if self.models.x.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "models.x".to_string(),
                reason: "at least one model is required".to_string(),
            });
        }
        if self.models.attempts_per_model == 0 {
            return Err(ConfigError::InvalidValue {
                field: "models.attempts_per_model".to_string(),
                reason: "must be greater than zero".to_string(),
            });
        }
        Ok(())
    }

    /// Presence map built from the credentials section and `tools`.
    #[must_use]
    pub fn credential_set(&self, tools: &LocalTools) -> CredentialSet {
        CredentialSet::from_config(&self.credentials, tools)
    }

    /// `OPENAI_API_KEY` -> `credentials.openai_api_key`, etc.
    fn credential_env() -> Env {
        Env::raw()
            .only(&CREDENTIAL_VARS)
            .map(|key| format!("credentials.{}", key.as_str().to_ascii_lowercase()).into())
    }

    fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("last30days").join("config.toml"))
    }

    /// Load `~/.config/last30days/.env`, then `.env` in the working directory.
    ///
    /// Missing files are ignored.
    fn load_dotenv_files() {
        if let Some(dir) = dirs::config_dir() {
            let env_path = dir.join("last30days").join(".env");
            if env_path.exists() {
                let _ = dotenvy::from_path(&env_path);
            }
        }
        let _ = dotenvy::dotenv();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = Last30Config::default();
        assert!(config.validate().is_ok());
        assert!(config.credentials.openai_api_key.is_empty());
        assert_eq!(config.general.default_days, 30);
    }

    #[test]
    fn empty_model_chain_rejected() {
        let mut config = Last30Config::default();
        config.models.reddit.clear();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("models.reddit"));
    }

    #[test]
    fn zero_attempts_rejected() {
        let mut config = Last30Config::default();
        config.models.attempts_per_model = 0;
        assert!(config.validate().is_err());
    }
}
