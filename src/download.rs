//! Asset downloads
//!
//! Bodies are streamed into `<dest>.part` and renamed into place only once the
//! transfer completes, so a file at the final path is always a whole asset.
//! The existence check in the pipeline depends on that.

use crate::config::HttpConfig;
use crate::error::{Result, TransportError};
use crate::http::{auth_headers, build_client};
use reqwest::header::ACCEPT;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};

/// Downloads release assets to local files
pub struct AssetDownloader {
    client: reqwest::Client,
    token: Option<String>,
}

impl AssetDownloader {
    /// Create a downloader from the HTTP settings
    pub fn new(http: &HttpConfig) -> Result<Self> {
        Ok(Self::with_client(build_client(http)?, http.token.clone()))
    }

    /// Create a downloader reusing an existing `reqwest::Client`
    pub fn with_client(client: reqwest::Client, token: Option<String>) -> Self {
        Self { client, token }
    }

    /// Download `url` to `dest`, returning the number of bytes written
    ///
    /// On failure nothing is left at `dest` or at the temporary path.
    pub async fn download(&self, url: &str, dest: &Path) -> Result<u64> {
        let part = part_path(dest);

        match self.fetch_to(url, &part).await {
            Ok(bytes) => {
                tokio::fs::rename(&part, dest).await?;
                debug!(url, dest = ?dest, bytes, "asset downloaded");
                Ok(bytes)
            }
            Err(e) => {
                if let Err(remove_err) = tokio::fs::remove_file(&part).await
                    && remove_err.kind() != std::io::ErrorKind::NotFound
                {
                    warn!(path = ?part, error = %remove_err, "failed to remove partial download");
                }
                Err(e)
            }
        }
    }

    async fn fetch_to(&self, url: &str, part: &Path) -> Result<u64> {
        let request_error = |source: reqwest::Error| TransportError::Request {
            url: url.to_string(),
            source,
        };

        let mut response = self
            .client
            .get(url)
            .headers(auth_headers(self.token.as_deref())?)
            .header(ACCEPT, "application/octet-stream")
            .send()
            .await
            .map_err(request_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(TransportError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            }
            .into());
        }

        let mut file = tokio::fs::File::create(part).await?;
        let mut written = 0u64;
        while let Some(chunk) = response.chunk().await.map_err(request_error)? {
            file.write_all(&chunk).await?;
            written += chunk.len() as u64;
        }
        file.flush().await?;
        file.sync_all().await?;

        Ok(written)
    }
}

/// Temporary path a download is streamed into before the final rename
pub fn part_path(dest: &Path) -> PathBuf {
    let mut name: OsString = dest.file_name().map(OsString::from).unwrap_or_default();
    name.push(".part");
    dest.with_file_name(name)
}
