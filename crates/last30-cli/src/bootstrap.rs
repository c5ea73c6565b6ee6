use anyhow::Context;
use last30_config::{ENV_PREFIX, Last30Config};

/// Load `.env` files, then the layered configuration.
pub fn load_config() -> anyhow::Result<Last30Config> {
    Last30Config::load_with_dotenv().context("failed to load last30days configuration")
}

/// Warn about `LAST30DAYS_*` variables that did not reach their section.
pub fn warn_unconfigured(config: &Last30Config) {
    for warning in collect_unconfigured_warnings(config, std::env::vars()) {
        tracing::warn!("{warning}");
    }
}

fn collect_unconfigured_warnings<I>(config: &Last30Config, env: I) -> Vec<String>
where
    I: IntoIterator<Item = (String, String)>,
{
    let env_keys = env.into_iter().map(|(key, _)| key).collect::<Vec<_>>();

    let mut warnings = Vec::new();

    if !config.credentials.is_configured() && has_env_prefix(&env_keys, "CREDENTIALS") {
        warnings.push(format!(
            "no credentials configured while {ENV_PREFIX}CREDENTIALS* env vars exist. Use double underscores (example: {ENV_PREFIX}CREDENTIALS__OPENAI_API_KEY) or the plain OPENAI_API_KEY."
        ));
    }

    if !config.store.is_configured() && has_env_prefix(&env_keys, "STORE") {
        warnings.push(format!(
            "store path appears default while {ENV_PREFIX}STORE* env vars exist. Use double underscores (example: {ENV_PREFIX}STORE__PATH)."
        ));
    }

    warnings
}

fn has_env_prefix(keys: &[String], section: &str) -> bool {
    let prefix = format!("{ENV_PREFIX}{section}");
    keys.iter().any(|key| key.starts_with(&prefix))
}
