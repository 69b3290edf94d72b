//! # release-dl
//!
//! Mirror selected GitHub release assets into a local directory.
//!
//! Each run lists the releases of one repository, selects releases and assets
//! by pattern, downloads whatever is not on disk yet, optionally extracts
//! `.gz`, `.tar.gz` and `.zip` archives, and optionally prunes artifacts that
//! earlier runs left behind. Runs are repeated on a fixed interval.
//!
//! ## Guarantees
//!
//! - An asset whose decorated filename already exists is never fetched again.
//! - An archive whose extraction directory already exists is never re-extracted.
//! - Nothing produced or confirmed by the current run is pruned.
//! - No archive entry is written outside its extraction directory.
//!
//! ## Quick Start
//!
//! ```no_run
//! use release_dl::{Config, SyncPipeline};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut config = Config::new("owner/tool".parse()?);
//!     config.filter.filename_pattern = ".*linux-amd64.*".to_string();
//!     config.naming.append_tag = true;
//!     config.extract = true;
//!
//!     let pipeline = SyncPipeline::new(Arc::new(config))?;
//!     let report = pipeline.run().await?;
//!     println!("downloaded {} asset(s)", report.downloaded);
//!
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

/// Retention sweep of stale artifacts
pub mod cleanup;
/// Command-line flags and environment overlay
pub mod cli;
/// Configuration types
pub mod config;
/// Streaming asset downloads
pub mod download;
/// Error types
pub mod error;
/// Archive extraction
pub mod extraction;
/// Release API client
pub mod github;
/// Shared HTTP client construction
pub mod http;
/// Filename decoration
pub mod naming;
/// Tag and filename selector matching
pub mod pattern;
/// One synchronization run
pub mod pipeline;
/// Periodic trigger for sync runs
pub mod scheduler;
/// Release and asset selection
pub mod selection;
/// Core domain types
pub mod types;
/// Utility functions
pub mod utils;

// Re-export commonly used types
pub use cli::Cli;
pub use config::{Config, HttpConfig, NamingPolicy, ScheduleConfig, SelectionFilter};
pub use error::{ArchiveError, Error, Result, TransportError};
pub use github::{GithubClient, ReleaseSource};
pub use pipeline::SyncPipeline;
pub use scheduler::Scheduler;
pub use types::{ArchiveKind, Asset, DownloadRecord, Release, RepositoryId, RunReport};

/// Run the scheduler until a termination signal arrives.
///
/// A signal stops the scheduler between runs; a run in flight completes first.
///
/// SIGTERM and SIGINT on unix, Ctrl+C elsewhere.
///
/// # Example
///
/// ```no_run
/// use release_dl::{Config, Scheduler, SyncPipeline, run_with_shutdown};
/// use std::sync::Arc;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let config = Arc::new(Config::new("owner/tool".parse()?));
///     let pipeline = Arc::new(SyncPipeline::new(config)?);
///
///     run_with_shutdown(Scheduler::new(pipeline)).await?;
///
///     Ok(())
/// }
/// ```
pub async fn run_with_shutdown(scheduler: Scheduler) -> Result<()> {
    let shutdown = tokio_util::sync::CancellationToken::new();

    let signal = termination_signal();
    let signal_token = shutdown.clone();
    let signal_task = tokio::spawn(async move {
        signal.await;
        signal_token.cancel();
    });

    let result = scheduler.run(shutdown).await;
    signal_task.abort();
    result
}

/// Resolves when SIGTERM or SIGINT arrives
///
/// Handlers are installed before this returns, so no signal sent afterwards is
/// lost. If neither can be installed, falls back to `ctrl_c`.
#[cfg(unix)]
fn termination_signal() -> impl Future<Output = ()> {
    use tokio::signal::unix::SignalKind;

    let mut sigterm = install(SignalKind::terminate(), "SIGTERM");
    let mut sigint = install(SignalKind::interrupt(), "SIGINT");

    async move {
        if sigterm.is_none() && sigint.is_none() {
            tracing::warn!("no signal handlers installed, falling back to ctrl_c");
            return ctrl_c().await;
        }
        let name = tokio::select! {
            () = recv(sigterm.as_mut()) => "SIGTERM",
            () = recv(sigint.as_mut()) => "SIGINT",
        };
        tracing::info!(signal = name, "received termination signal");
    }
}

#[cfg(unix)]
fn install(
    kind: tokio::signal::unix::SignalKind,
    name: &'static str,
) -> Option<tokio::signal::unix::Signal> {
    match tokio::signal::unix::signal(kind) {
        Ok(stream) => Some(stream),
        Err(e) => {
            tracing::warn!(signal = name, error = %e, "failed to install signal handler");
            None
        }
    }
}

/// Never resolves for a handler that could not be installed
#[cfg(unix)]
async fn recv(stream: Option<&mut tokio::signal::unix::Signal>) {
    match stream {
        Some(stream) => {
            stream.recv().await;
        }
        None => std::future::pending().await,
    }
}

#[cfg(not(unix))]
fn termination_signal() -> impl Future<Output = ()> {
    ctrl_c()
}

async fn ctrl_c() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::info!(signal = "ctrl_c", "received termination signal"),
        Err(e) => {
            // A missing listener is not a shutdown
            tracing::error!(error = %e, "failed to listen for ctrl_c, only a kill stops the process");
            std::future::pending::<()>().await;
        }
    }
}
