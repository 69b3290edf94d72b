//! Retention sweep for stale artifacts in the output directory
//!
//! Runs after a successful pipeline run, once for files and once for
//! extraction directories. Only immediate children of the output directory
//! are considered. Removal failures are logged and skipped so a stubborn
//! entry never blocks later syncs; only failing to list the directory is
//! reported to the caller.

use crate::error::{Error, Result};
use crate::pattern;
use crate::types::{ArchiveKind, DownloadRecord};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Which category of entries a sweep pass considers
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SweepPass {
    /// Regular files whose names satisfy the filename selector
    Files,
    /// Directories named like extraction targets (`*-gz`, `*-tar-gz`, `*-zip`)
    /// whose source archive name satisfies the filename selector
    Directories,
}

/// Paths produced (or confirmed present) by the current run
#[derive(Clone, Debug, Default)]
pub struct KeepSet {
    /// Asset files
    pub files: HashSet<PathBuf>,
    /// Extraction directories
    pub dirs: HashSet<PathBuf>,
}

impl KeepSet {
    /// Collect the keep set from a run's download records
    pub fn from_records(records: &[DownloadRecord]) -> Self {
        let mut keep = Self::default();
        for record in records {
            keep.files.insert(record.path.clone());
            if let Some(dir) = &record.extracted_dir {
                keep.dirs.insert(dir.clone());
            }
        }
        keep
    }
}

/// Remove stale entries of one category from `output_dir`
///
/// Entries in `keep` are never touched. A file is only removed when its name
/// satisfies `filename_pattern` (an empty selector matches every file); an
/// extraction directory only when the archive it came from would be. Returns
/// the number of entries removed.
///
/// # Errors
///
/// Returns an error only when `output_dir` cannot be listed.
pub async fn sweep(
    output_dir: &Path,
    keep: &HashSet<PathBuf>,
    pass: SweepPass,
    filename_pattern: &str,
) -> Result<usize> {
    use tokio::fs;

    let mut entries = fs::read_dir(output_dir).await?;
    let mut stale = Vec::new();

    loop {
        let entry = match entries.next_entry().await {
            Ok(Some(entry)) => entry,
            Ok(None) => break,
            Err(e) => {
                warn!(path = ?output_dir, error = %e, "failed to read directory entry during sweep");
                continue;
            }
        };
        let path = entry.path();
        if keep.contains(&path) {
            continue;
        }

        let file_type = match entry.file_type().await {
            Ok(ft) => ft,
            Err(e) => {
                warn!(?path, error = %e, "failed to stat entry during sweep");
                continue;
            }
        };
        let name = entry.file_name();
        let name = name.to_string_lossy();

        let is_stale = match pass {
            SweepPass::Files => file_type.is_file() && file_matches(&path, &name, filename_pattern),
            SweepPass::Directories => {
                file_type.is_dir()
                    && ArchiveKind::source_archive_name(&name)
                        .is_some_and(|archive| file_matches(&path, &archive, filename_pattern))
            }
        };
        if is_stale {
            stale.push(path);
        }
    }

    let mut removed = 0;
    for path in &stale {
        let result = match pass {
            SweepPass::Files => fs::remove_file(path).await,
            SweepPass::Directories => fs::remove_dir_all(path).await,
        };
        match result {
            Ok(()) => {
                debug!(?path, ?pass, "removed stale entry");
                removed += 1;
            }
            Err(e) => {
                let error = Error::Cleanup {
                    path: path.clone(),
                    reason: e.to_string(),
                };
                warn!(code = error.error_code(), error = %error, "failed to remove stale entry");
            }
        }
    }

    if removed > 0 {
        info!(path = ?output_dir, ?pass, removed, "retention sweep complete");
    }
    Ok(removed)
}

fn file_matches(path: &Path, name: &str, filename_pattern: &str) -> bool {
    if filename_pattern.is_empty() {
        return true;
    }
    match pattern::matches(name, filename_pattern) {
        Ok(matched) => matched,
        Err(e) => {
            // Unreachable in practice: selection already compiled the same pattern
            warn!(?path, error = %e, "keeping entry, filename pattern failed to compile");
            false
        }
    }
}
