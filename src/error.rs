//! Error types for release-dl
//!
//! The taxonomy follows the phases of a sync run:
//! - [`Error::Config`] and [`Error::Pattern`] for bad settings or selectors
//! - [`Error::Transport`] for the release API and asset downloads
//! - [`Error::Archive`] for extraction failures
//! - [`Error::Io`] for the local filesystem
//! - [`Error::Cleanup`] for retention failures, which are only ever logged
//!
//! Apart from configuration errors detected at startup, every error aborts the
//! current run only; the scheduler logs it and waits for the next tick.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for release-dl operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for release-dl
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error with context about which setting is invalid
    #[error("configuration error: {message}")]
    Config {
        /// Human-readable error message describing the configuration issue
        message: String,
        /// The configuration key that caused the error (e.g., "RD_INTERVAL")
        key: Option<String>,
    },

    /// A tag or filename selector failed to compile
    #[error("invalid pattern {pattern:?}: {source}")]
    Pattern {
        /// The selector text as supplied by the user
        pattern: String,
        /// Underlying regex compilation error
        #[source]
        source: regex::Error,
    },

    /// Release API or asset download failure
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// Archive extraction failure
    #[error("archive error: {0}")]
    Archive(#[from] ArchiveError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Stale entry could not be removed (non-fatal, logged as a warning)
    #[error("cleanup failed for {path}: {reason}")]
    Cleanup {
        /// The entry that could not be removed
        path: PathBuf,
        /// The reason removal failed
        reason: String,
    },
}

/// Errors talking to the release API or fetching asset bytes
#[derive(Debug, Error)]
pub enum TransportError {
    /// The request could not be sent or the body could not be read
    #[error("request to {url} failed: {source}")]
    Request {
        /// The URL that was requested
        url: String,
        /// Underlying HTTP client error
        #[source]
        source: reqwest::Error,
    },

    /// The server answered with a non-success status
    #[error("{url} returned status {status}")]
    Status {
        /// The URL that was requested
        url: String,
        /// HTTP status code
        status: u16,
    },

    /// The response body was not the JSON document we expected
    #[error("unexpected response from {url}: {reason}")]
    Decode {
        /// The URL that was requested
        url: String,
        /// The reason decoding failed
        reason: String,
    },
}

/// Archive extraction errors
#[derive(Debug, Error)]
pub enum ArchiveError {
    /// Compressed stream or container structure is malformed
    #[error("corrupt archive {archive}: {reason}")]
    Corrupt {
        /// The archive being extracted
        archive: PathBuf,
        /// What was wrong with it
        reason: String,
    },

    /// A tar entry type we refuse to materialize (symlink, device, ...)
    #[error("unsupported entry {entry} of type {kind} in {archive}")]
    UnsupportedEntry {
        /// The archive being extracted
        archive: PathBuf,
        /// Entry path as recorded in the archive
        entry: String,
        /// Entry type description
        kind: String,
    },

    /// Writing extracted content failed
    #[error("failed to write {path} while extracting {archive}: {source}")]
    Write {
        /// The archive being extracted
        archive: PathBuf,
        /// The destination that could not be written
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },
}

impl Error {
    /// Build a configuration error for a specific setting
    pub fn config(message: impl Into<String>, key: impl Into<String>) -> Self {
        Error::Config {
            message: message.into(),
            key: Some(key.into()),
        }
    }

    /// Machine-readable error code, used as a structured log field
    pub fn error_code(&self) -> &'static str {
        match self {
            Error::Config { .. } => "config_error",
            Error::Pattern { .. } => "pattern_error",
            Error::Transport(e) => match e {
                TransportError::Request { .. } => "transport_request_failed",
                TransportError::Status { .. } => "transport_bad_status",
                TransportError::Decode { .. } => "transport_decode_failed",
            },
            Error::Archive(e) => match e {
                ArchiveError::Corrupt { .. } => "archive_corrupt",
                ArchiveError::UnsupportedEntry { .. } => "archive_unsupported_entry",
                ArchiveError::Write { .. } => "archive_write_failed",
            },
            Error::Io(_) => "io_error",
            Error::Cleanup { .. } => "cleanup_failed",
        }
    }
}
