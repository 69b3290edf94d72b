use crate::error::Result;
use std::fs::File;
use std::path::Path;
use tracing::{debug, warn};

use super::shared::{corrupt, create_dir, entry_destination, write_entry};

/// Extractor for ZIP containers
pub struct ZipExtractor;

impl ZipExtractor {
    /// Unpack `archive_path` into `target`
    ///
    /// Entries flagged as directories are created; everything else is written
    /// as a regular file. Entries escaping `target` are skipped with a warning.
    pub fn extract(archive_path: &Path, target: &Path) -> Result<()> {
        let file = File::open(archive_path)?;
        let mut archive = zip::ZipArchive::new(file)
            .map_err(|e| corrupt(archive_path, "failed to read ZIP archive", e))?;

        create_dir(archive_path, target)?;

        let mut files = 0usize;
        for i in 0..archive.len() {
            let mut entry = archive
                .by_index(i)
                .map_err(|e| corrupt(archive_path, "failed to read ZIP entry", e))?;
            let name = entry.name().to_string();

            let Some(dest) = entry_destination(target, Path::new(&name)) else {
                warn!(?archive_path, entry = %name, "skipping entry outside extraction directory");
                continue;
            };

            if entry.is_dir() {
                create_dir(archive_path, &dest)?;
            } else if dest == target {
                warn!(?archive_path, entry = %name, "skipping file entry with empty name");
            } else {
                write_entry(archive_path, &mut entry, &dest)?;
                files += 1;
            }
        }

        debug!(?archive_path, files, "ZIP archive unpacked");
        Ok(())
    }
}
