use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;

use inspect_flow::core::ConfigError;
use inspect_flow::{RunError, Registry, Runner};

/// Run an ETL task or pipeline declared in a YAML configuration document.
#[derive(Debug, Parser)]
#[command(name = "inspect-flow", version, about)]
struct Cli {
    /// Task or pipeline to run. Tasks are looked up first.
    name: String,

    /// Path to the pipeline configuration document.
    #[arg(short, long, default_value = "etl/pipeline.yml")]
    config: PathBuf,

    /// Log filter used when RUST_LOG is not set.
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Resolve every component NAME uses, then exit without running.
    #[arg(long)]
    check: bool,

    /// Print Prometheus metrics for the run to stdout when it finishes.
    #[arg(long)]
    metrics: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    inspect_flow::core::logging::init(&cli.log_level);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e:#}");
            exit_code(&e)
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let runner = Runner::from_path(&cli.config, Registry::with_builtins())
        .with_context(|| format!("loading {}", cli.config.display()))?;

    if cli.check {
        runner
            .check(&cli.name)
            .with_context(|| format!("checking '{}'", cli.name))?;
        tracing::info!(name = %cli.name, "configuration ok");
        return Ok(());
    }

    let result = runner
        .run(&cli.name)
        .await
        .with_context(|| format!("running '{}'", cli.name));
    if cli.metrics {
        print!("{}", inspect_flow::core::metrics::gather_text());
    }
    result
}

/// Configuration problems exit with 2, failures inside components with 1.
fn exit_code(error: &anyhow::Error) -> ExitCode {
    let configuration = error.downcast_ref::<ConfigError>().is_some()
        || error
            .downcast_ref::<RunError>()
            .is_some_and(RunError::is_configuration);
    if configuration {
        ExitCode::from(2)
    } else {
        ExitCode::FAILURE
    }
}
