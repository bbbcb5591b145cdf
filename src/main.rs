//! Pipeline Runner - Main Entry Point
//!
//! Loads a pipeline file, preflights it, executes it against a fresh Store
//! and optionally writes the resulting Store schema as JSON.

use anyhow::Context;
use clap::Parser;
use matpipe::config::{LoggingConfig, RunnerConfig};
use matpipe::data::DataContainerArray;
use matpipe::pipeline::{
    read_pipeline_file, ExecutionResult, FilterManager, FilterPipeline, StdoutObserver,
    TracingObserver,
};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Run a matpipe pipeline file
#[derive(Parser, Debug)]
#[command(name = "pipeline-runner")]
#[command(about = "Preflight and execute a pipeline file")]
struct Args {
    /// Pipeline file to run
    #[arg(long, short = 'p')]
    pipeline: PathBuf,

    /// Runner config (default: <config dir>/matpipe/runner.toml)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Stop after preflight
    #[arg(long)]
    preflight_only: bool,

    /// Write the resulting Store schema as JSON
    #[arg(long)]
    dump_schema: Option<PathBuf>,

    /// Print progress percentages
    #[arg(long)]
    progress: bool,
}

fn init_logging(config: &LoggingConfig) -> Option<WorkerGuard> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    let (file_layer, guard) = match &config.directory {
        Some(directory) => {
            let appender = tracing_appender::rolling::daily(directory, &config.file_prefix);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = tracing_subscriber::fmt::layer()
                .with_writer(writer)
                .with_ansi(false);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(file_layer)
        .init();

    guard
}

fn dump_schema(dca: &DataContainerArray, path: &Path) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(&dca.schema())?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, json).with_context(|| format!("writing {}", path.display()))?;
    tracing::info!("Wrote Store schema to {}", path.display());
    Ok(())
}

fn main() -> anyhow::Result<ExitCode> {
    let args = Args::parse();
    let config = RunnerConfig::load_or_default(args.config.as_deref())
        .context("Failed to load runner config")?;
    let _log_guard = init_logging(&config.logging);

    let preflight_only = args.preflight_only || config.execution.preflight_only;
    let schema_path = args.dump_schema.or(config.execution.dump_schema);

    let stdout = StdoutObserver {
        show_progress: args.progress,
    };
    let manager = FilterManager::with_core_filters();
    let mut pipeline: FilterPipeline = read_pipeline_file(&args.pipeline, &manager, Some(&stdout))
        .with_context(|| format!("Failed to load pipeline {}", args.pipeline.display()))?;
    pipeline.add_observer(Arc::new(stdout));
    pipeline.add_observer(Arc::new(TracingObserver));

    tracing::info!(
        "Running pipeline '{}' ({} filters)",
        pipeline.name(),
        pipeline.len()
    );

    let preflight = pipeline.preflight_pipeline();
    if preflight < 0 {
        tracing::error!("Preflight failed with code {}", preflight);
        if config.execution.halt_on_preflight_error {
            return Ok(ExitCode::FAILURE);
        }
    }

    if preflight_only {
        if let (Some(path), Some(dca)) = (&schema_path, pipeline.preflight_dca()) {
            dump_schema(dca, path)?;
        }
        return Ok(if preflight < 0 {
            ExitCode::FAILURE
        } else {
            ExitCode::SUCCESS
        });
    }

    let dca = pipeline.execute();
    if let Some(path) = &schema_path {
        dump_schema(&dca, path)?;
    }

    match pipeline.execution_result() {
        ExecutionResult::Completed if pipeline.error_condition() >= 0 => Ok(ExitCode::SUCCESS),
        result => {
            tracing::error!(
                "Pipeline finished with {:?} (error condition {})",
                result,
                pipeline.error_condition()
            );
            Ok(ExitCode::FAILURE)
        }
    }
}
