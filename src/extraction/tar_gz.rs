use crate::error::{ArchiveError, Result};
use flate2::read::MultiGzDecoder;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use tar::EntryType;
use tracing::{debug, warn};

use super::shared::{corrupt, create_dir, entry_destination, write_entry};

/// Extractor for gzip-compressed tarballs
pub struct TarGzExtractor;

impl TarGzExtractor {
    /// Unpack `archive_path` into `target`
    ///
    /// Directories and regular files are materialized. Entries escaping
    /// `target` are skipped with a warning. Any other entry type (symlink,
    /// hard link, device, fifo) fails the whole archive.
    pub fn extract(archive_path: &Path, target: &Path) -> Result<()> {
        let file = File::open(archive_path)?;
        let mut archive = tar::Archive::new(MultiGzDecoder::new(BufReader::new(file)));

        create_dir(archive_path, target)?;

        let entries = archive
            .entries()
            .map_err(|e| corrupt(archive_path, "failed to read tar entries", e))?;

        let mut files = 0usize;
        for entry in entries {
            let mut entry =
                entry.map_err(|e| corrupt(archive_path, "failed to read tar entry", e))?;
            let entry_path = entry
                .path()
                .map_err(|e| corrupt(archive_path, "invalid entry path", e))?
                .into_owned();

            let entry_type = entry.header().entry_type();
            if entry_type == EntryType::XGlobalHeader {
                continue;
            }

            let Some(dest) = entry_destination(target, &entry_path) else {
                warn!(?archive_path, entry = ?entry_path, "skipping entry outside extraction directory");
                continue;
            };

            match entry_type {
                EntryType::Directory => create_dir(archive_path, &dest)?,
                EntryType::Regular | EntryType::Continuous => {
                    if dest == target {
                        warn!(?archive_path, entry = ?entry_path, "skipping file entry with empty name");
                        continue;
                    }
                    write_entry(archive_path, &mut entry, &dest)?;
                    files += 1;
                }
                other => {
                    return Err(ArchiveError::UnsupportedEntry {
                        archive: archive_path.to_path_buf(),
                        entry: entry_path.display().to_string(),
                        kind: format!("{other:?}"),
                    }
                    .into());
                }
            }
        }

        debug!(?archive_path, files, "tarball unpacked");
        Ok(())
    }
}
