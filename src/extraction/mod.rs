//! Archive extraction for downloaded assets
//!
//! Supports plain gzip (`.gz`), gzip-compressed tarballs (`.tar.gz`) and ZIP
//! (`.zip`). Each archive is unpacked into a sibling directory named after the
//! archive stem plus a kind suffix (`tool.tar.gz` -> `tool-tar-gz/`), so two
//! archive kinds sharing a stem never collide.
//!
//! Extraction is idempotent: an existing target directory is returned as-is.
//! Entries that would land outside the target directory are skipped. Any other
//! failure removes the half-written target directory so the next run retries.

mod gzip;
mod shared;
mod tar_gz;
mod zip;

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests;

pub use gzip::GzipExtractor;
pub use shared::entry_destination;
pub use tar_gz::TarGzExtractor;
pub use zip::ZipExtractor;

use crate::error::{Error, Result};
use crate::naming::split_name_ext;
use crate::types::ArchiveKind;
use crate::utils::is_existing_dir;
use std::path::{Path, PathBuf};
use tokio::task::spawn_blocking;
use tracing::{debug, info, warn};

/// Extraction directory for `archive_path`, or `None` for unsupported kinds
///
/// ```
/// use release_dl::extraction::target_dir;
/// use std::path::{Path, PathBuf};
///
/// assert_eq!(
///     target_dir(Path::new("out/tool-v1.tar.gz")),
///     Some(PathBuf::from("out/tool-v1-tar-gz"))
/// );
/// assert_eq!(target_dir(Path::new("out/notes.txt")), None);
/// ```
pub fn target_dir(archive_path: &Path) -> Option<PathBuf> {
    let file_name = archive_path.file_name()?.to_string_lossy();
    let suffix = ArchiveKind::from_name(&file_name).dir_suffix()?;
    let (stem, _) = split_name_ext(&file_name);
    Some(archive_path.with_file_name(format!("{stem}-{suffix}")))
}

/// Extract `archive_path` next to itself
///
/// Runs on the blocking thread pool. See [`extract_blocking`].
pub async fn extract_archive(archive_path: &Path) -> Result<Option<PathBuf>> {
    let owned = archive_path.to_path_buf();
    spawn_blocking(move || extract_blocking(&owned))
        .await
        .map_err(|e| Error::Io(std::io::Error::other(format!("extraction task panicked: {e}"))))?
}

/// Extract `archive_path` into its [`target_dir`]
///
/// Blocking file I/O throughout; async callers go through [`extract_archive`].
///
/// # Returns
/// * `Ok(None)` - the file is not a supported archive; nothing was done
/// * `Ok(Some(dir))` - the archive is unpacked in `dir` (now or by an earlier run)
/// * `Err(_)` - extraction failed and no target directory was left behind
pub fn extract_blocking(archive_path: &Path) -> Result<Option<PathBuf>> {
    let file_name = archive_path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let kind = ArchiveKind::from_name(&file_name);

    let Some(target) = target_dir(archive_path) else {
        debug!(?archive_path, "unsupported file extension, skipping extraction");
        return Ok(None);
    };

    if is_existing_dir(&target)? {
        info!(?target, "extraction directory already exists, skipping");
        return Ok(Some(target));
    }

    info!(?archive_path, ?target, %kind, "extracting archive");

    let result = match kind {
        ArchiveKind::Gzip => GzipExtractor::extract(archive_path, &target),
        ArchiveKind::TarGzip => TarGzExtractor::extract(archive_path, &target),
        ArchiveKind::Zip => ZipExtractor::extract(archive_path, &target),
        ArchiveKind::None => return Ok(None),
    };

    if let Err(e) = result {
        if let Err(remove_err) = std::fs::remove_dir_all(&target)
            && remove_err.kind() != std::io::ErrorKind::NotFound
        {
            warn!(?target, error = %remove_err, "failed to remove partial extraction directory");
        }
        return Err(e);
    }

    info!(?archive_path, ?target, "extraction succeeded");
    Ok(Some(target))
}
