//! One synchronization run
//!
//! Release fetch, selection, then sequential per-asset download and extraction,
//! then the optional retention sweep. The first asset failure aborts the run;
//! retention failures never do.

use crate::cleanup::{self, KeepSet, SweepPass};
use crate::config::Config;
use crate::download::AssetDownloader;
use crate::error::Result;
use crate::extraction;
use crate::github::{GithubClient, ReleaseSource};
use crate::http::build_client;
use crate::naming;
use crate::selection::{self, Selection};
use crate::types::{Asset, DownloadRecord, RunReport};
use crate::utils::is_existing_file;
use std::collections::HashSet;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, warn};

/// Download/extract/clean sequence for one configured repository
///
/// Holds no state between runs: everything a run needs to know about earlier
/// runs is read back from the output directory.
pub struct SyncPipeline {
    config: Arc<Config>,
    source: Arc<dyn ReleaseSource>,
    downloader: AssetDownloader,
}

impl SyncPipeline {
    /// Create a pipeline talking to the configured release API
    ///
    /// The API client and the downloader share one HTTP client.
    pub fn new(config: Arc<Config>) -> Result<Self> {
        let client = build_client(&config.http)?;
        let source = Arc::new(GithubClient::with_client(client.clone(), &config.http));
        let downloader = AssetDownloader::with_client(client, config.http.token.clone());
        Ok(Self::with_source(config, source, downloader))
    }

    /// Create a pipeline with an explicit release source
    pub fn with_source(
        config: Arc<Config>,
        source: Arc<dyn ReleaseSource>,
        downloader: AssetDownloader,
    ) -> Self {
        Self {
            config,
            source,
            downloader,
        }
    }

    /// The configuration this pipeline runs with
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Execute one run
    ///
    /// # Errors
    ///
    /// Release listing, selector, download, extraction and output-directory
    /// failures abort the run. Assets finished before the failure stay on disk
    /// and are skipped by the next run.
    pub async fn run(&self) -> Result<RunReport> {
        let started = Instant::now();
        let config = &self.config;

        let releases = self.source.list_releases(&config.repository).await?;
        debug!(repository = %config.repository, count = releases.len(), "fetched releases");

        let selection = selection::select(releases, &config.filter)?;
        let mut report = RunReport {
            selected: selection.asset_count(),
            ..Default::default()
        };

        if selection.is_empty() {
            info!(repository = %config.repository, "no assets selected");
            report.elapsed = started.elapsed();
            return Ok(report);
        }

        tokio::fs::create_dir_all(&config.output_dir).await?;

        let records = self.sync_selection(&selection, &mut report).await?;

        if config.auto_clean {
            let (files, dirs) = self.retain(&records).await;
            report.removed_files = files;
            report.removed_dirs = dirs;
        }

        report.elapsed = started.elapsed();
        Ok(report)
    }

    async fn sync_selection(
        &self,
        selection: &Selection,
        report: &mut RunReport,
    ) -> Result<Vec<DownloadRecord>> {
        let mut records = Vec::with_capacity(selection.asset_count());

        for (tag, asset) in selection.iter() {
            let Some(record) = self
                .sync_asset(tag, asset)
                .await
                .inspect_err(|e| {
                    error!(
                        tag,
                        asset = %asset.name,
                        code = e.error_code(),
                        error = %e,
                        "asset sync failed"
                    );
                })?
            else {
                continue;
            };

            if record.downloaded {
                report.downloaded += 1;
            } else {
                report.skipped += 1;
            }
            if record.extracted_dir.is_some() {
                report.extracted += 1;
            }
            records.push(record);
        }

        Ok(records)
    }

    /// Download (if absent) and extract (if enabled) one asset
    ///
    /// Returns `None` when the asset name cannot be used as a local file name.
    async fn sync_asset(&self, tag: &str, asset: &Asset) -> Result<Option<DownloadRecord>> {
        let config = &self.config;
        let file_name = naming::asset_file_name(asset, tag, &config.naming);

        if !is_plain_file_name(&file_name) {
            warn!(tag, asset = %asset.name, "asset name is not a plain file name, skipping");
            return Ok(None);
        }

        let dest = config.output_dir.join(&file_name);

        let downloaded = if is_existing_file(&dest).await? {
            info!(tag, path = ?dest, "file already exists, skipping download");
            false
        } else {
            info!(tag, asset = %asset.name, path = ?dest, "downloading asset");
            let bytes = self.downloader.download(&asset.download_url, &dest).await?;
            info!(tag, path = ?dest, bytes, "download complete");
            true
        };

        let extracted_dir = if config.extract {
            extraction::extract_archive(&dest).await?
        } else {
            None
        };

        Ok(Some(DownloadRecord {
            path: dest,
            downloaded,
            extracted_dir,
        }))
    }

    /// Remove stale files and extraction directories; returns the removal counts
    async fn retain(&self, records: &[DownloadRecord]) -> (usize, usize) {
        let config = &self.config;
        let keep = KeepSet::from_records(records);
        let pattern = config.filter.filename_pattern.as_str();

        let files = sweep_logged(&config.output_dir, &keep.files, SweepPass::Files, pattern).await;
        let dirs =
            sweep_logged(&config.output_dir, &keep.dirs, SweepPass::Directories, pattern).await;
        (files, dirs)
    }
}

async fn sweep_logged(
    output_dir: &Path,
    keep: &HashSet<PathBuf>,
    pass: SweepPass,
    pattern: &str,
) -> usize {
    match cleanup::sweep(output_dir, keep, pass, pattern).await {
        Ok(removed) => removed,
        Err(e) => {
            warn!(path = ?output_dir, ?pass, error = %e, "retention sweep abandoned");
            0
        }
    }
}

/// Whether `name` is a single normal path component
fn is_plain_file_name(name: &str) -> bool {
    let mut components = Path::new(name).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    ) && !name.contains(['/', '\\'])
}
