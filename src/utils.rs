//! Filesystem existence checks

use crate::error::Result;
use std::io::{self, ErrorKind};
use std::path::Path;

/// Whether `path` exists and is a regular file (or a link to one)
///
/// A missing path is `Ok(false)`; any other stat failure is an error.
pub async fn is_existing_file(path: &Path) -> Result<bool> {
    classify(tokio::fs::metadata(path).await, |meta| !meta.is_dir())
}

/// Whether `path` exists and is a directory
///
/// Blocking; only call this from blocking contexts such as `spawn_blocking`.
/// A missing path is `Ok(false)`; any other stat failure is an error.
///
/// # Examples
///
/// ```
/// use release_dl::utils::is_existing_dir;
///
/// assert!(!is_existing_dir(std::path::Path::new("/definitely/not/here")).unwrap());
/// ```
pub fn is_existing_dir(path: &Path) -> Result<bool> {
    classify(std::fs::metadata(path), |meta| meta.is_dir())
}

fn classify(
    metadata: io::Result<std::fs::Metadata>,
    wanted: impl FnOnce(&std::fs::Metadata) -> bool,
) -> Result<bool> {
    match metadata {
        Ok(meta) => Ok(wanted(&meta)),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e.into()),
    }
}
