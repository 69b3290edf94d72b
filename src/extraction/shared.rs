use crate::error::{ArchiveError, Result};
use std::io::Read;
use std::path::{Component, Path, PathBuf};

/// Resolve an archive entry name against the extraction directory
///
/// Returns `None` when the entry contains a `..` segment or is absolute, i.e.
/// when joining it could escape `target`. `.` segments are dropped.
///
/// ```
/// use release_dl::extraction::entry_destination;
/// use std::path::{Path, PathBuf};
///
/// let target = Path::new("/out/tool-zip");
/// assert_eq!(
///     entry_destination(target, Path::new("./bin/tool")),
///     Some(PathBuf::from("/out/tool-zip/bin/tool"))
/// );
/// assert_eq!(entry_destination(target, Path::new("../evil")), None);
/// assert_eq!(entry_destination(target, Path::new("/etc/passwd")), None);
/// ```
pub fn entry_destination(target: &Path, entry: &Path) -> Option<PathBuf> {
    let mut relative = PathBuf::new();
    for component in entry.components() {
        match component {
            Component::Normal(part) => relative.push(part),
            Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => return None,
        }
    }
    Some(target.join(relative))
}

/// Create `dir` and any missing parents
pub(crate) fn create_dir(archive: &Path, dir: &Path) -> Result<()> {
    std::fs::create_dir_all(dir).map_err(|source| {
        ArchiveError::Write {
            archive: archive.to_path_buf(),
            path: dir.to_path_buf(),
            source,
        }
        .into()
    })
}

/// Stream `reader` into a new file at `dest`, creating parent directories
///
/// Read errors are reported as corrupt archive data; write errors as write
/// failures.
pub(crate) fn write_entry<R: Read>(archive: &Path, reader: &mut R, dest: &Path) -> Result<u64> {
    if let Some(parent) = dest.parent() {
        create_dir(archive, parent)?;
    }

    let write_err = |source: std::io::Error| ArchiveError::Write {
        archive: archive.to_path_buf(),
        path: dest.to_path_buf(),
        source,
    };

    let mut out = std::fs::File::create(dest).map_err(write_err)?;
    let mut buf = vec![0u8; 64 * 1024];
    let mut written = 0u64;
    loop {
        let n = match reader.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(e) => {
                return Err(ArchiveError::Corrupt {
                    archive: archive.to_path_buf(),
                    reason: format!("failed to read entry data for {}: {e}", dest.display()),
                }
                .into());
            }
        };
        std::io::Write::write_all(&mut out, &buf[..n]).map_err(write_err)?;
        written += n as u64;
    }
    Ok(written)
}

/// Wrap a read-side error from a decompressor or container parser
pub(crate) fn corrupt(archive: &Path, what: &str, e: impl std::fmt::Display) -> crate::error::Error {
    ArchiveError::Corrupt {
        archive: archive.to_path_buf(),
        reason: format!("{what}: {e}"),
    }
    .into()
}
