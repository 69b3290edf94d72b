//! Shared HTTP client construction

use crate::config::HttpConfig;
use crate::error::{Error, Result};
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};

/// Build the HTTP client used for both API calls and asset downloads
///
/// Applies the user agent, the per-request timeout and the proxy, if any.
pub fn build_client(http: &HttpConfig) -> Result<reqwest::Client> {
    let mut builder = reqwest::Client::builder().user_agent(http.user_agent.clone());

    if let Some(timeout) = http.timeout {
        builder = builder.timeout(timeout);
    }

    if let Some(proxy) = &http.proxy {
        let proxy = reqwest::Proxy::all(proxy)
            .map_err(|e| Error::config(format!("invalid proxy URL {proxy:?}: {e}"), "proxy"))?;
        builder = builder.proxy(proxy);
    }

    builder
        .build()
        .map_err(|e| Error::config(format!("failed to create HTTP client: {e}"), "http"))
}

/// Headers carrying the bearer token, if one is configured
pub(crate) fn auth_headers(token: Option<&str>) -> Result<HeaderMap> {
    let mut headers = HeaderMap::new();
    if let Some(token) = token {
        let mut value = HeaderValue::from_str(&format!("Bearer {token}"))
            .map_err(|_| Error::config("token contains invalid characters", "token"))?;
        value.set_sensitive(true);
        headers.insert(AUTHORIZATION, value);
    }
    Ok(headers)
}
