//! Core domain types shared across the sync pipeline

use crate::error::{Error, Result};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

/// A published release as reported by the hosting service
///
/// Fetched fresh on every run and discarded afterwards.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct Release {
    /// Tag name (e.g. "v1.0.0")
    #[serde(rename = "tag_name")]
    pub tag: String,
    /// Whether the release is flagged as a prerelease
    #[serde(default)]
    pub prerelease: bool,
    /// Binary assets in the order the service lists them
    #[serde(default)]
    pub assets: Vec<Asset>,
}

/// A downloadable file attached to a release
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct Asset {
    /// Filename as published
    pub name: String,
    /// Browser-facing download location
    #[serde(rename = "browser_download_url")]
    pub download_url: String,
    /// Last modification time reported by the service, if any
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Repository identifier in `owner/repo` form
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RepositoryId {
    /// Account or organization that owns the repository
    pub owner: String,
    /// Repository name
    pub name: String,
}

impl FromStr for RepositoryId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let parts: Vec<&str> = s.trim().split('/').collect();
        match parts.as_slice() {
            [owner, name] if !owner.is_empty() && !name.is_empty() => Ok(Self {
                owner: (*owner).to_string(),
                name: (*name).to_string(),
            }),
            _ => Err(Error::config(
                format!("invalid repository {s:?}, expected owner/repo"),
                "repository",
            )),
        }
    }
}

impl fmt::Display for RepositoryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

/// Archive type detected by filename suffix
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ArchiveKind {
    /// Single gzip stream (.gz)
    Gzip,
    /// Gzip-compressed tarball (.tar.gz)
    TarGzip,
    /// ZIP container (.zip)
    Zip,
    /// Anything else; extraction is a no-op
    None,
}

impl ArchiveKind {
    /// All kinds that produce an extraction directory
    pub const EXTRACTABLE: [ArchiveKind; 3] =
        [ArchiveKind::TarGzip, ArchiveKind::Gzip, ArchiveKind::Zip];

    /// Detect the kind from a filename, case-insensitively
    ///
    /// `.tar.gz` is checked before the generic `.gz`.
    pub fn from_name(name: &str) -> Self {
        let lower = name.to_lowercase();
        if lower.ends_with(".tar.gz") {
            ArchiveKind::TarGzip
        } else if lower.ends_with(".gz") {
            ArchiveKind::Gzip
        } else if lower.ends_with(".zip") {
            ArchiveKind::Zip
        } else {
            ArchiveKind::None
        }
    }

    /// Suffix appended to the archive stem to name its extraction directory
    ///
    /// Distinct per kind so `tool.gz` and `tool.zip` never share a directory.
    pub fn dir_suffix(self) -> Option<&'static str> {
        match self {
            ArchiveKind::Gzip => Some("gz"),
            ArchiveKind::TarGzip => Some("tar-gz"),
            ArchiveKind::Zip => Some("zip"),
            ArchiveKind::None => None,
        }
    }

    /// Archive filename an extraction directory was produced from
    ///
    /// Inverse of the directory naming: `tool-tar-gz` -> `tool.tar.gz`,
    /// `tool-zip` -> `tool.zip`. `None` for names without an extraction suffix.
    pub fn source_archive_name(dir_name: &str) -> Option<String> {
        // `-tar-gz` also ends in `-gz`, so it is tried first
        Self::EXTRACTABLE.iter().find_map(|kind| {
            let suffix = kind.dir_suffix()?;
            let stem = dir_name.strip_suffix(suffix)?.strip_suffix('-')?;
            if stem.is_empty() {
                return None;
            }
            let ext = match kind {
                ArchiveKind::TarGzip => ".tar.gz",
                ArchiveKind::Gzip => ".gz",
                ArchiveKind::Zip => ".zip",
                ArchiveKind::None => return None,
            };
            Some(format!("{stem}{ext}"))
        })
    }
}

impl fmt::Display for ArchiveKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ArchiveKind::Gzip => "gzip",
            ArchiveKind::TarGzip => "tar.gz",
            ArchiveKind::Zip => "zip",
            ArchiveKind::None => "none",
        };
        f.write_str(s)
    }
}

/// What one selected asset left on disk during a run
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DownloadRecord {
    /// Final path of the (decorated) asset file
    pub path: PathBuf,
    /// Whether bytes were fetched this run (false when the file already existed)
    pub downloaded: bool,
    /// Extraction directory, if the asset was an archive and extraction is enabled
    pub extracted_dir: Option<PathBuf>,
}

/// Summary of one pipeline run
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RunReport {
    /// Number of assets that survived selection
    pub selected: usize,
    /// Assets fetched over the network this run
    pub downloaded: usize,
    /// Assets skipped because the decorated file already existed
    pub skipped: usize,
    /// Extraction directories present after the run (new or pre-existing)
    pub extracted: usize,
    /// Stale files removed by retention
    pub removed_files: usize,
    /// Stale extraction directories removed by retention
    pub removed_dirs: usize,
    /// Wall-clock duration of the run
    pub elapsed: Duration,
}
