use figment::Jail;
use last30_config::{CREDENTIAL_VARS, Last30Config, LocalTools, WebProvider};
use last30_core::SourceKind;

fn isolate(jail: &mut Jail) {
    let dir = jail.directory().to_path_buf();
    jail.set_env("XDG_CONFIG_HOME", dir.join("xdg").display());
    for var in CREDENTIAL_VARS {
        jail.set_env(var, "");
    }
}

#[test]
fn well_known_vars_fill_credentials() {
    Jail::expect_with(|jail| {
        isolate(jail);
        jail.set_env("OPENAI_API_KEY", "sk-env");
        jail.set_env("XAI_API_KEY", "xai-env");
        jail.set_env("BRAVE_API_KEY", "brave-env");

        let config = Last30Config::load().expect("config loads");
        assert_eq!(config.credentials.openai_api_key, "sk-env");
        assert_eq!(config.credentials.xai_api_key, "xai-env");
        assert_eq!(config.credentials.web_providers(), vec![WebProvider::Brave]);
        Ok(())
    });
}

#[test]
fn prefixed_vars_use_double_underscore_sections() {
    Jail::expect_with(|jail| {
        isolate(jail);
        jail.set_env("LAST30DAYS_GENERAL__DEFAULT_DAYS", "7");
        jail.set_env("LAST30DAYS_MODELS__OPENROUTER", "perplexity/sonar-pro");

        let config = Last30Config::load().expect("config loads");
        assert_eq!(config.general.default_days, 7);
        assert_eq!(config.models.openrouter, "perplexity/sonar-pro");
        Ok(())
    });
}

#[test]
fn well_known_var_beats_prefixed_var() {
    Jail::expect_with(|jail| {
        isolate(jail);
        jail.set_env("LAST30DAYS_CREDENTIALS__XAI_API_KEY", "xai-prefixed");
        jail.set_env("XAI_API_KEY", "xai-plain");

        let config = Last30Config::load().expect("config loads");
        assert_eq!(config.credentials.xai_api_key, "xai-plain");
        Ok(())
    });
}

#[test]
fn env_beats_local_toml() {
    Jail::expect_with(|jail| {
        isolate(jail);
        jail.create_dir(".last30days")?;
        jail.create_file(
            ".last30days/config.toml",
            r#"
            [general]
            default_days = 14
            run_timeout_secs = 90

            [store]
            path = "runs/local.jsonl"
            "#,
        )?;
        jail.set_env("LAST30DAYS_GENERAL__DEFAULT_DAYS", "3");

        let config = Last30Config::load().expect("config loads");
        assert_eq!(config.general.default_days, 3);
        assert_eq!(config.general.run_timeout_secs, 90);
        assert_eq!(config.store.path, "runs/local.jsonl");
        Ok(())
    });
}

#[test]
fn local_toml_beats_global_toml() {
    Jail::expect_with(|jail| {
        isolate(jail);
        jail.create_dir("xdg")?;
        jail.create_dir("xdg/last30days")?;
        jail.create_file(
            "xdg/last30days/config.toml",
            r#"
            [general]
            default_days = 60
            stage_timeout_secs = 20

            [models]
            x = ["grok-global"]
            "#,
        )?;
        jail.create_dir(".last30days")?;
        jail.create_file(
            ".last30days/config.toml",
            r#"
            [general]
            default_days = 10
            "#,
        )?;

        let config = Last30Config::load().expect("config loads");
        assert_eq!(config.general.default_days, 10);
        assert_eq!(config.general.stage_timeout_secs, 20);
        assert_eq!(config.models.x, vec!["grok-global".to_string()]);
        Ok(())
    });
}

#[test]
fn invalid_value_is_rejected_at_load() {
    Jail::expect_with(|jail| {
        isolate(jail);
        jail.set_env("LAST30DAYS_GENERAL__RUN_TIMEOUT_SECS", "0");

        let err = Last30Config::load().unwrap_err();
        assert!(err.to_string().contains("run_timeout_secs"));
        Ok(())
    });
}

#[test]
fn credential_set_reflects_loaded_keys() {
    Jail::expect_with(|jail| {
        isolate(jail);
        jail.set_env("OPENAI_API_KEY", "sk");
        jail.set_env("XAI_API_KEY", "xai");

        let config = Last30Config::load().expect("config loads");
        let set = config.credential_set(&LocalTools::default());
        assert!(set.has(SourceKind::Reddit));
        assert!(set.has(SourceKind::X));
        assert!(!set.has(SourceKind::Youtube));
        assert!(!set.has(SourceKind::Web));
        Ok(())
    });
}
