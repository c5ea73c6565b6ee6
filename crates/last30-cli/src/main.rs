use anyhow::Context;
use chrono::Utc;
use clap::Parser;
use last30_config::LocalTools;
use last30_core::{OutputMode, PipelineError, RunConfig};
use last30_pipeline::Pipeline;
use last30_sources::SourceClient;
use last30_store::RunStore;

mod bootstrap;
mod cli;
mod output;
mod progress;
mod ui;

use progress::Progress;

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        eprintln!("last30days error: {error:#}");
        std::process::exit(exit_code(&error));
    }
}

/// 2 for invalid flags, 3 when no source can run, 1 otherwise.
fn exit_code(error: &anyhow::Error) -> i32 {
    error
        .downcast_ref::<PipelineError>()
        .map_or(1, PipelineError::exit_code)
}

async fn run() -> anyhow::Result<()> {
    let cli = cli::Cli::parse();
    init_tracing(cli.quiet, cli.verbose)?;
    ui::init(&cli);

    let config = bootstrap::load_config()?;
    bootstrap::warn_unconfigured(&config);

    let run_config = RunConfig::resolve(&cli.run_flags(), &config.general.run_defaults(), Utc::now())?;

    let tools = LocalTools::probe();
    let credentials = config.credential_set(&tools);
    let client = SourceClient::new(&config, tools).context("failed to build source clients")?;

    if cli.diagnose {
        let diagnosis = Pipeline::live(&client, credentials).run_diagnostics(&run_config);
        output::output(&output::render_diagnosis(&diagnosis, cli.emit)?);
        return Ok(());
    }

    let topic = cli.topic();
    let topic = last30_core::validate_topic(&topic)?;

    let progress = Progress::spinner("starting");
    let observer = progress.clone();
    let pipeline = Pipeline::live(&client, credentials)
        .with_enrichment_concurrency(config.general.enrichment_concurrency)
        .with_observer(move |stage| observer.stage(stage));

    let report = match pipeline.run(topic, &run_config).await {
        Ok(report) => {
            progress.finish_clear();
            report
        }
        Err(error) => {
            progress.finish_err("run failed");
            return Err(error.into());
        }
    };

    output::output(&output::render_report(&report, cli.emit)?);

    if run_config.output == OutputMode::Persist {
        let path = config
            .store
            .resolved_path()
            .context("no data directory for the run store; set store.path")?;
        let store = RunStore::new(path);
        store
            .append(&report.to_stored_run())
            .with_context(|| format!("failed to store run in {}", store.path().display()))?;
        tracing::info!(path = %store.path().display(), "run stored");
    }

    Ok(())
}

fn init_tracing(quiet: bool, verbose: bool) -> anyhow::Result<()> {
    let level = if quiet {
        "error"
    } else if verbose {
        "debug"
    } else {
        "warn"
    };

    let filter = tracing_subscriber::EnvFilter::try_from_env("LAST30DAYS_LOG")
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|error| anyhow::anyhow!("failed to initialize tracing subscriber: {error}"))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pipeline_errors_map_to_exit_codes() {
        let invalid = anyhow::Error::from(PipelineError::ConfigInvalid("bad".into()));
        let none = anyhow::Error::from(PipelineError::NoSourcesAvailable { missing: Vec::new() });
        assert_eq!(exit_code(&invalid), 2);
        assert_eq!(exit_code(&none), 3);
    }

    #[test]
    fn context_keeps_exit_code() {
        let error = anyhow::Error::from(PipelineError::ConfigInvalid("bad".into())).context("while resolving flags");
        assert_eq!(exit_code(&error), 2);
    }

    #[test]
    fn other_errors_exit_one() {
        assert_eq!(exit_code(&anyhow::anyhow!("disk full")), 1);
    }
}
