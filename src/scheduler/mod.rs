//! Periodic trigger for sync runs
//!
//! Runs the pipeline on a fixed interval, optionally once immediately at
//! startup, optionally only once. Runs never overlap: the next tick is not
//! awaited until the current run has finished, and a run that overshoots the
//! interval delays the following tick instead of causing a burst.
//!
//! A failed run is logged and the scheduler waits for the next tick. Shutdown
//! is observed between runs only; a run in flight always completes.
//!
//! # Example
//!
//! ```no_run
//! use release_dl::{Config, Scheduler, SyncPipeline};
//! use std::sync::Arc;
//! use tokio_util::sync::CancellationToken;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Arc::new(Config::new("owner/tool".parse()?));
//! let pipeline = Arc::new(SyncPipeline::new(config)?);
//! let shutdown = CancellationToken::new();
//!
//! Scheduler::new(pipeline).run(shutdown).await?;
//! # Ok(())
//! # }
//! ```

use crate::config::ScheduleConfig;
use crate::error::Result;
use crate::pipeline::SyncPipeline;
use crate::types::RunReport;
use std::sync::Arc;
use tokio::time::{Instant, MissedTickBehavior, interval_at};
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

/// Drives [`SyncPipeline`] runs according to a [`ScheduleConfig`]
pub struct Scheduler {
    pipeline: Arc<SyncPipeline>,
    schedule: ScheduleConfig,
}

impl Scheduler {
    /// Create a scheduler using the pipeline's own schedule settings
    pub fn new(pipeline: Arc<SyncPipeline>) -> Self {
        let schedule = pipeline.config().schedule.clone();
        Self::with_schedule(pipeline, schedule)
    }

    /// Create a scheduler with explicit schedule settings
    pub fn with_schedule(pipeline: Arc<SyncPipeline>, schedule: ScheduleConfig) -> Self {
        Self { pipeline, schedule }
    }

    /// Run until `shutdown` is cancelled, or after the first run in single-run mode
    ///
    /// Returns the outcome of that run in single-run mode and `Ok(())` otherwise.
    pub async fn run(self, shutdown: CancellationToken) -> Result<()> {
        info!(
            interval = ?self.schedule.interval,
            now = self.schedule.run_immediately,
            once = self.schedule.run_once,
            "scheduler started"
        );

        if self.schedule.run_immediately && !shutdown.is_cancelled() {
            let result = self.run_logged().await;
            if self.schedule.run_once {
                return result.map(drop);
            }
        }

        let period = self.schedule.interval;
        let mut ticker = interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                biased;

                _ = shutdown.cancelled() => {
                    info!("scheduler shutting down");
                    return Ok(());
                }
                _ = ticker.tick() => {
                    let result = self.run_logged().await;
                    if self.schedule.run_once {
                        return result.map(drop);
                    }
                }
            }
        }
    }

    /// Execute a single run and log its outcome
    pub async fn run_logged(&self) -> Result<RunReport> {
        let repository = &self.pipeline.config().repository;
        info!(%repository, "sync run started");

        match self.pipeline.run().await {
            Ok(report) => {
                info!(
                    %repository,
                    selected = report.selected,
                    downloaded = report.downloaded,
                    skipped = report.skipped,
                    extracted = report.extracted,
                    removed_files = report.removed_files,
                    removed_dirs = report.removed_dirs,
                    elapsed = ?report.elapsed,
                    "sync run finished"
                );
                Ok(report)
            }
            Err(e) => {
                error!(%repository, code = e.error_code(), error = %e, "sync run failed");
                Err(e)
            }
        }
    }
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests;
