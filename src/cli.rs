//! Command line flags and environment overrides
//!
//! Every flag has an `RD_*` environment variable counterpart. When both are
//! set, the environment wins, so a container image can bake flags into its
//! entrypoint and still be reconfigured per deployment.

use crate::config::{
    Config, DEFAULT_API_URL, HttpConfig, NamingPolicy, ScheduleConfig, SelectionFilter,
    parse_bool, parse_duration,
};
use crate::error::{Error, Result};
use crate::types::RepositoryId;
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

/// Mirror matching GitHub release assets into a local directory
#[derive(Debug, Clone, Parser)]
#[command(name = "release-dl", version, about)]
pub struct Cli {
    /// GitHub repository in format `owner/repo` [env: RD_REPOSITORY]
    #[arg(long, default_value = "")]
    pub repository: String,

    /// HTTP/HTTPS/SOCKS proxy for all requests (e.g. `socks5://127.0.0.1:1080`) [env: RD_PROXY]
    #[arg(long, default_value = "")]
    pub proxy: String,

    /// Only download releases whose tag matches this selector (regex, e.g. `.*\.18\..*`) [env: RD_TAG]
    #[arg(long, default_value = "")]
    pub tag: String,

    /// Only download assets whose filename matches this selector (regex, e.g. `.*linux-arm64.*\.gz`) [env: RD_FILENAME]
    #[arg(long, default_value = "")]
    pub filename: String,

    /// Only consider the latest release (ignores `--tag`) [env: RD_LATEST]
    #[arg(long)]
    pub latest: bool,

    /// Include prereleases [env: RD_PRERELEASE]
    #[arg(long)]
    pub prerelease: bool,

    /// GitHub personal access token [env: RD_TOKEN]
    #[arg(long, default_value = "")]
    pub token: String,

    /// Directory to save downloaded files [env: RD_PATH]
    #[arg(long, default_value = "./tmp")]
    pub path: PathBuf,

    /// Delay between runs (e.g. `30s`, `5m`, `1h`) [env: RD_INTERVAL]
    #[arg(long, default_value = "1h", value_parser = duration_arg)]
    pub interval: Duration,

    /// Run immediately instead of waiting for the first interval [env: RD_NOW]
    #[arg(long)]
    pub now: bool,

    /// Run once and exit [env: RD_ONCE]
    #[arg(long)]
    pub once: bool,

    /// HTTP request timeout, `0s` disables it [env: RD_TIMEOUT]
    #[arg(long, default_value = "30s", value_parser = duration_arg)]
    pub timeout: Duration,

    /// Append release tag to filename (`file.zip` -> `file-v1.0.0.zip`) [env: RD_ASSET_TAG]
    #[arg(long)]
    pub asset_tag: bool,

    /// Append the asset's update time to filename (`file.zip` -> `file-202405021330.zip`) [env: RD_ASSET_DATE]
    #[arg(long)]
    pub asset_date: bool,

    /// Extract downloaded `.zip`, `.gz` and `.tar.gz` files [env: RD_ASSET_EXTRACT]
    #[arg(long)]
    pub asset_extract: bool,

    /// Remove files from earlier runs that this run did not produce [env: RD_AUTOCLEAN]
    #[arg(long)]
    pub autoclean: bool,

    /// Release API base URL [env: RD_API_URL]
    #[arg(long, default_value = DEFAULT_API_URL)]
    pub api_url: String,
}

fn duration_arg(s: &str) -> std::result::Result<Duration, String> {
    parse_duration(s).map_err(|e| e.to_string())
}

impl Cli {
    /// Overlay process environment variables and validate into a [`Config`]
    pub fn into_config(self) -> Result<Config> {
        self.into_config_with(|key| std::env::var(key).ok())
    }

    /// Same as [`Cli::into_config`] with an injectable environment lookup
    pub fn into_config_with<F>(self, env: F) -> Result<Config>
    where
        F: Fn(&str) -> Option<String>,
    {
        let overlay = EnvOverlay { env: &env };

        let repository = overlay.string("RD_REPOSITORY", self.repository);
        let repository: RepositoryId = repository.parse().map_err(|e| match e {
            Error::Config { message, .. } => Error::config(message, "RD_REPOSITORY"),
            other => other,
        })?;

        let proxy = overlay.string("RD_PROXY", self.proxy);
        let proxy = non_empty(proxy);
        if let Some(proxy) = &proxy {
            url::Url::parse(proxy).map_err(|e| {
                Error::config(format!("invalid proxy URL {proxy:?}: {e}"), "RD_PROXY")
            })?;
        }

        let api_url = overlay.string("RD_API_URL", self.api_url);
        url::Url::parse(&api_url).map_err(|e| {
            Error::config(format!("invalid API URL {api_url:?}: {e}"), "RD_API_URL")
        })?;

        let timeout = overlay.duration("RD_TIMEOUT", self.timeout)?;

        let interval = overlay.duration("RD_INTERVAL", self.interval)?;
        if interval.is_zero() {
            return Err(Error::config("interval must be greater than zero", "RD_INTERVAL"));
        }

        Ok(Config {
            repository,
            filter: SelectionFilter {
                tag_pattern: overlay.string("RD_TAG", self.tag),
                filename_pattern: overlay.string("RD_FILENAME", self.filename),
                latest_only: overlay.bool("RD_LATEST", self.latest)?,
                include_prerelease: overlay.bool("RD_PRERELEASE", self.prerelease)?,
            },
            naming: NamingPolicy {
                append_tag: overlay.bool("RD_ASSET_TAG", self.asset_tag)?,
                append_date: overlay.bool("RD_ASSET_DATE", self.asset_date)?,
            },
            output_dir: PathBuf::from(
                overlay.string("RD_PATH", self.path.to_string_lossy().into_owned()),
            ),
            extract: overlay.bool("RD_ASSET_EXTRACT", self.asset_extract)?,
            auto_clean: overlay.bool("RD_AUTOCLEAN", self.autoclean)?,
            schedule: ScheduleConfig {
                interval,
                run_immediately: overlay.bool("RD_NOW", self.now)?,
                run_once: overlay.bool("RD_ONCE", self.once)?,
            },
            http: HttpConfig {
                token: non_empty(overlay.string("RD_TOKEN", self.token)),
                timeout: (!timeout.is_zero()).then_some(timeout),
                proxy,
                api_url,
                ..HttpConfig::default()
            },
        })
    }
}

/// Environment values that replace flag values when present
struct EnvOverlay<'a, F: Fn(&str) -> Option<String>> {
    env: &'a F,
}

impl<F: Fn(&str) -> Option<String>> EnvOverlay<'_, F> {
    fn string(&self, key: &str, flag: String) -> String {
        (self.env)(key).unwrap_or(flag)
    }

    fn bool(&self, key: &str, flag: bool) -> Result<bool> {
        match (self.env)(key) {
            Some(value) => parse_bool(&value).map_err(|e| with_key(e, key)),
            None => Ok(flag),
        }
    }

    fn duration(&self, key: &str, flag: Duration) -> Result<Duration> {
        match (self.env)(key) {
            Some(value) => parse_duration(&value).map_err(|e| with_key(e, key)),
            None => Ok(flag),
        }
    }
}

fn with_key(error: Error, key: &str) -> Error {
    match error {
        Error::Config { message, .. } => Error::config(message, key),
        other => other,
    }
}

fn non_empty(value: String) -> Option<String> {
    (!value.is_empty()).then_some(value)
}
