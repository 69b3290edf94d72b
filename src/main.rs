use clap::Parser;
use release_dl::{Cli, Error, Scheduler, SyncPipeline, run_with_shutdown};
use std::process::ExitCode;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// Exit status for invalid configuration
const EXIT_CONFIG: u8 = 2;

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let config = match cli.into_config() {
        Ok(config) => config,
        Err(e) => return startup_failure(&e),
    };
    config.trace_loaded();

    let pipeline = match SyncPipeline::new(Arc::new(config)) {
        Ok(pipeline) => pipeline,
        Err(e) => return startup_failure(&e),
    };

    match run_with_shutdown(Scheduler::new(Arc::new(pipeline))).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(_) => ExitCode::FAILURE,
    }
}

fn startup_failure(error: &Error) -> ExitCode {
    tracing::error!(code = error.error_code(), error = %error, "invalid configuration");
    ExitCode::from(EXIT_CONFIG)
}
