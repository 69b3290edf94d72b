//! Release API client
//!
//! [`ReleaseSource`] is the seam between the sync pipeline and the hosting
//! service. [`GithubClient`] implements it against the GitHub REST API (or a
//! compatible enterprise endpoint).

use crate::config::HttpConfig;
use crate::error::{Result, TransportError};
use crate::http::{auth_headers, build_client};
use crate::types::{Release, RepositoryId};
use async_trait::async_trait;
use reqwest::header::ACCEPT;
use tracing::debug;

/// Number of releases requested per listing
const RELEASES_PER_PAGE: u32 = 100;

/// Source of release metadata for a repository
///
/// Implementations return releases newest first, the way the hosting service
/// orders them. The selector relies on that order for `latest_only`.
#[async_trait]
pub trait ReleaseSource: Send + Sync {
    /// List releases of `repository`, newest first
    async fn list_releases(&self, repository: &RepositoryId) -> Result<Vec<Release>>;
}

/// GitHub REST API client
pub struct GithubClient {
    client: reqwest::Client,
    api_url: String,
    token: Option<String>,
}

impl GithubClient {
    /// Create a client from the HTTP settings
    pub fn new(http: &HttpConfig) -> Result<Self> {
        Ok(Self::with_client(build_client(http)?, http))
    }

    /// Create a client reusing an existing `reqwest::Client`
    pub fn with_client(client: reqwest::Client, http: &HttpConfig) -> Self {
        Self {
            client,
            api_url: http.api_url.trim_end_matches('/').to_string(),
            token: http.token.clone(),
        }
    }

    fn releases_url(&self, repository: &RepositoryId) -> String {
        format!(
            "{}/repos/{}/{}/releases?per_page={}",
            self.api_url, repository.owner, repository.name, RELEASES_PER_PAGE
        )
    }
}

#[async_trait]
impl ReleaseSource for GithubClient {
    async fn list_releases(&self, repository: &RepositoryId) -> Result<Vec<Release>> {
        let url = self.releases_url(repository);
        debug!(%url, "listing releases");

        let response = self
            .client
            .get(&url)
            .headers(auth_headers(self.token.as_deref())?)
            .header(ACCEPT, "application/vnd.github+json")
            .header("X-GitHub-Api-Version", "2022-11-28")
            .send()
            .await
            .map_err(|source| TransportError::Request {
                url: url.clone(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(TransportError::Status {
                url,
                status: status.as_u16(),
            }
            .into());
        }

        let body = response
            .text()
            .await
            .map_err(|source| TransportError::Request {
                url: url.clone(),
                source,
            })?;

        let releases: Vec<Release> =
            serde_json::from_str(&body).map_err(|e| TransportError::Decode {
                url: url.clone(),
                reason: e.to_string(),
            })?;

        debug!(%url, count = releases.len(), "releases listed");
        Ok(releases)
    }
}
