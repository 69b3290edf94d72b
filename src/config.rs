//! Configuration types for release-dl
//!
//! [`Config`] is built once at startup (see [`crate::cli`]) and passed by
//! reference into every component. Nothing mutates it after construction.

use crate::error::{Error, Result};
use crate::types::RepositoryId;
use std::path::PathBuf;
use std::time::Duration;

/// Default delay between runs
pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(60 * 60);

/// Default per-request HTTP timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Default release API endpoint
pub const DEFAULT_API_URL: &str = "https://api.github.com";

/// Which releases and assets a run acts on
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SelectionFilter {
    /// Tag selector; empty means every tag
    pub tag_pattern: String,
    /// Asset filename selector; empty means every asset
    pub filename_pattern: String,
    /// Only consider the newest qualifying release (tag selector is ignored)
    pub latest_only: bool,
    /// Include releases flagged as prereleases
    pub include_prerelease: bool,
}

/// Decorations appended to downloaded filenames, before the extension
///
/// Applied in a fixed order: tag first, then date.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct NamingPolicy {
    /// Append the owning release tag (`file.zip` -> `file-v1.0.0.zip`)
    pub append_tag: bool,
    /// Append the asset's last-updated timestamp (`file.zip` -> `file-202405021330.zip`)
    pub append_date: bool,
}

/// When runs happen
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScheduleConfig {
    /// Minimum spacing between runs (default: 1 hour)
    pub interval: Duration,
    /// Run once immediately instead of waiting for the first interval
    pub run_immediately: bool,
    /// Exit after the first run
    pub run_once: bool,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            interval: DEFAULT_INTERVAL,
            run_immediately: false,
            run_once: false,
        }
    }
}

/// HTTP client settings shared by the API client and asset downloads
#[derive(Clone, PartialEq, Eq)]
pub struct HttpConfig {
    /// Bearer token (private repositories, higher rate limits)
    pub token: Option<String>,
    /// Per-request timeout; `None` disables it
    pub timeout: Option<Duration>,
    /// Optional proxy URL (http, https or socks5)
    pub proxy: Option<String>,
    /// Release API base URL (default: "https://api.github.com")
    pub api_url: String,
    /// User-Agent sent with every request
    pub user_agent: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            token: None,
            timeout: Some(DEFAULT_TIMEOUT),
            proxy: None,
            api_url: DEFAULT_API_URL.to_string(),
            user_agent: default_user_agent(),
        }
    }
}

impl std::fmt::Debug for HttpConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpConfig")
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .field("timeout", &self.timeout)
            .field("proxy", &self.proxy)
            .field("api_url", &self.api_url)
            .field("user_agent", &self.user_agent)
            .finish()
    }
}

/// Main configuration for a release-dl process
#[derive(Clone, Debug)]
pub struct Config {
    /// Repository to mirror
    pub repository: RepositoryId,

    /// Release and asset selectors
    pub filter: SelectionFilter,

    /// Filename decorations
    pub naming: NamingPolicy,

    /// Directory assets are written to (default: "./tmp")
    pub output_dir: PathBuf,

    /// Extract `.gz`, `.tar.gz` and `.zip` assets after download
    pub extract: bool,

    /// Remove files and extraction directories not produced by the latest run
    pub auto_clean: bool,

    /// Run timing
    pub schedule: ScheduleConfig,

    /// HTTP client settings
    pub http: HttpConfig,
}

impl Config {
    /// Create a configuration for `repository` with every other setting at its default
    pub fn new(repository: RepositoryId) -> Self {
        Self {
            repository,
            filter: SelectionFilter::default(),
            naming: NamingPolicy::default(),
            output_dir: default_output_dir(),
            extract: false,
            auto_clean: false,
            schedule: ScheduleConfig::default(),
            http: HttpConfig::default(),
        }
    }

    /// Log every effective setting (the token is never printed)
    pub fn trace_loaded(&self) {
        tracing::info!(
            repository = %self.repository,
            tag = %self.filter.tag_pattern,
            filename = %self.filter.filename_pattern,
            latest = self.filter.latest_only,
            prerelease = self.filter.include_prerelease,
            token = self.http.token.is_some(),
            proxy = ?self.http.proxy,
            api_url = %self.http.api_url,
            path = ?self.output_dir,
            interval = ?self.schedule.interval,
            now = self.schedule.run_immediately,
            once = self.schedule.run_once,
            timeout = ?self.http.timeout,
            asset_tag = self.naming.append_tag,
            asset_date = self.naming.append_date,
            asset_extract = self.extract,
            autoclean = self.auto_clean,
            "configuration loaded"
        );
    }
}

/// Parse a duration such as `30s`, `5m`, `1h30m` or `250ms`
///
/// Every number needs a unit; only `0` may stand alone.
pub fn parse_duration(input: &str) -> Result<Duration> {
    let s = input.trim();
    let invalid = || {
        Error::Config {
            message: format!("invalid duration {input:?}, expected e.g. 30s, 5m, 1h30m"),
            key: None,
        }
    };

    if s.is_empty() {
        return Err(invalid());
    }
    if s == "0" {
        return Ok(Duration::ZERO);
    }

    let mut total = Duration::ZERO;
    let mut rest = s;
    while !rest.is_empty() {
        let digits = rest
            .find(|c: char| !c.is_ascii_digit() && c != '.')
            .ok_or_else(invalid)?;
        if digits == 0 {
            return Err(invalid());
        }
        let value: f64 = rest[..digits].parse().map_err(|_| invalid())?;
        rest = &rest[digits..];

        let unit_len = rest
            .find(|c: char| c.is_ascii_digit() || c == '.')
            .unwrap_or(rest.len());
        let unit_millis = match &rest[..unit_len] {
            "ms" => 1.0,
            "s" => 1_000.0,
            "m" => 60_000.0,
            "h" => 3_600_000.0,
            _ => return Err(invalid()),
        };
        rest = &rest[unit_len..];

        total += Duration::from_nanos((value * unit_millis * 1_000_000.0).round() as u64);
    }

    Ok(total)
}

/// Parse a boolean setting (`1/0`, `true/false`, `t/f`, `yes/no`, `on/off`)
pub fn parse_bool(input: &str) -> Result<bool> {
    match input.trim().to_ascii_lowercase().as_str() {
        "1" | "t" | "true" | "yes" | "y" | "on" => Ok(true),
        "0" | "f" | "false" | "no" | "n" | "off" => Ok(false),
        _ => Err(Error::Config {
            message: format!("invalid boolean {input:?}"),
            key: None,
        }),
    }
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("./tmp")
}

fn default_user_agent() -> String {
    format!("release-dl/{}", env!("CARGO_PKG_VERSION"))
}
