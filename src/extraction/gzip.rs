use crate::error::Result;
use flate2::read::MultiGzDecoder;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use tracing::debug;

use super::shared::{corrupt, create_dir, write_entry};

/// Extractor for single-stream gzip files
pub struct GzipExtractor;

impl GzipExtractor {
    /// Decompress `archive_path` into `target/<target name>`
    ///
    /// A gzip stream carries one file and no reliable name, so the output is
    /// named after the extraction directory itself. Concatenated members
    /// (`cat a.gz b.gz`, bgzip) are decoded as one stream.
    pub fn extract(archive_path: &Path, target: &Path) -> Result<()> {
        let file = File::open(archive_path)?;
        let mut decoder = MultiGzDecoder::new(BufReader::new(file));
        if decoder.header().is_none() {
            return Err(corrupt(archive_path, "invalid gzip header", "missing magic bytes"));
        }

        create_dir(archive_path, target)?;

        let dest = match target.file_name() {
            Some(name) => target.join(name),
            None => return Err(corrupt(archive_path, "invalid target", target.display())),
        };
        let written = write_entry(archive_path, &mut decoder, &dest)?;

        debug!(?archive_path, ?dest, bytes = written, "gzip stream decompressed");
        Ok(())
    }
}
