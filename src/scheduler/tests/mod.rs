use super::*;
use crate::config::{Config, HttpConfig};
use crate::download::AssetDownloader;
use crate::error::{Error, TransportError};
use crate::github::ReleaseSource;
use crate::types::{Release, RepositoryId};
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tempfile::TempDir;

/// Release source that counts listings and returns nothing (or fails)
struct CountingSource {
    calls: AtomicUsize,
    fail: bool,
}

#[async_trait]
impl ReleaseSource for CountingSource {
    async fn list_releases(&self, _repository: &RepositoryId) -> crate::error::Result<Vec<Release>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(TransportError::Status {
                url: "https://api.example.com/repos/owner/tool/releases".to_string(),
                status: 500,
            }
            .into());
        }
        Ok(vec![])
    }
}

fn setup(fail: bool, schedule: ScheduleConfig) -> (Scheduler, Arc<CountingSource>, TempDir) {
    let temp_dir = TempDir::new().unwrap();
    let mut config = Config::new("owner/tool".parse().unwrap());
    config.output_dir = temp_dir.path().to_path_buf();
    config.schedule = schedule;

    let source = Arc::new(CountingSource {
        calls: AtomicUsize::new(0),
        fail,
    });
    let downloader = AssetDownloader::new(&HttpConfig::default()).unwrap();
    let pipeline = SyncPipeline::with_source(Arc::new(config), source.clone(), downloader);

    (Scheduler::new(Arc::new(pipeline)), source, temp_dir)
}

fn schedule(interval_ms: u64, run_immediately: bool, run_once: bool) -> ScheduleConfig {
    ScheduleConfig {
        interval: Duration::from_millis(interval_ms),
        run_immediately,
        run_once,
    }
}

#[tokio::test]
async fn once_and_now_runs_exactly_once() {
    let (scheduler, source, _dir) = setup(false, schedule(60 * 60 * 1000, true, true));

    scheduler.run(CancellationToken::new()).await.unwrap();

    assert_eq!(source.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn once_mode_reports_run_failure() {
    let (scheduler, source, _dir) = setup(true, schedule(60 * 60 * 1000, true, true));

    let result = scheduler.run(CancellationToken::new()).await;

    assert!(matches!(
        result,
        Err(Error::Transport(TransportError::Status { status: 500, .. }))
    ));
    assert_eq!(source.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn once_without_now_waits_one_interval() {
    let (scheduler, source, _dir) = setup(false, schedule(50, false, true));

    let started = std::time::Instant::now();
    scheduler.run(CancellationToken::new()).await.unwrap();

    assert!(started.elapsed() >= Duration::from_millis(50));
    assert_eq!(source.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn failed_runs_do_not_stop_the_loop() {
    let (scheduler, source, _dir) = setup(true, schedule(20, true, false));
    let shutdown = CancellationToken::new();

    let handle = tokio::spawn(scheduler.run(shutdown.clone()));
    tokio::time::sleep(Duration::from_millis(150)).await;
    shutdown.cancel();

    handle.await.unwrap().unwrap();
    assert!(source.calls.load(Ordering::SeqCst) >= 2);
}

#[tokio::test]
async fn shutdown_before_first_tick_skips_all_runs() {
    let (scheduler, source, _dir) = setup(false, schedule(60 * 60 * 1000, false, false));
    let shutdown = CancellationToken::new();
    shutdown.cancel();

    tokio::time::timeout(Duration::from_secs(5), scheduler.run(shutdown))
        .await
        .expect("scheduler should stop promptly")
        .unwrap();

    assert_eq!(source.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn run_logged_returns_the_report() {
    let (scheduler, _source, _dir) = setup(false, schedule(1000, false, false));

    let report = scheduler.run_logged().await.unwrap();

    assert_eq!(report.selected, 0);
    assert_eq!(report.downloaded, 0);
}
