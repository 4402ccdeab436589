//! Runtime configuration.
//!
//! Read once at startup from the deployment environment. Every value has a
//! default so a bare environment yields a working local-development client.

use std::path::PathBuf;
use std::time::Duration;

use reqwest::Url;

use crate::error::ConfigError;

pub const DEFAULT_BACKEND_URL: &str = "http://localhost:8000";
pub const DEFAULT_ADMIN_EMAIL: &str = "founder@aumryxteach.com";
pub const DEFAULT_SESSION_FILE: &str = "aumryx_session.json";
pub const DEFAULT_SEARCH_DEBOUNCE_MS: u64 = 500;
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

pub const ENV_BACKEND_URL: &str = "AUMRYX_BACKEND_URL";
/// Name used by earlier web deployments; honoured as a fallback.
pub const ENV_BACKEND_URL_LEGACY: &str = "REACT_APP_BACKEND_URL";
pub const ENV_ADMIN_EMAILS: &str = "AUMRYX_ADMIN_EMAILS";
pub const ENV_SESSION_FILE: &str = "AUMRYX_SESSION_FILE";
pub const ENV_SEARCH_DEBOUNCE_MS: &str = "AUMRYX_SEARCH_DEBOUNCE_MS";
pub const ENV_REQUEST_TIMEOUT_SECS: &str = "AUMRYX_REQUEST_TIMEOUT_SECS";

#[derive(Debug, Clone)]
pub struct ClientConfig {
    backend_url: Url,
    /// Privileged identities for the admin view. Must match the backend's list.
    pub admin_emails: Vec<String>,
    pub session_file: PathBuf,
    pub search_debounce: Duration,
    pub request_timeout: Duration,
}

impl ClientConfig {
    /// Defaults for everything except the backend URL.
    pub fn new(backend_url: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            backend_url: parse_backend_url(backend_url)?,
            admin_emails: vec![DEFAULT_ADMIN_EMAIL.to_string()],
            session_file: PathBuf::from(DEFAULT_SESSION_FILE),
            search_debounce: Duration::from_millis(DEFAULT_SEARCH_DEBOUNCE_MS),
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
        })
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let backend_url = get(ENV_BACKEND_URL)
            .or_else(|| get(ENV_BACKEND_URL_LEGACY))
            .unwrap_or_else(|| DEFAULT_BACKEND_URL.to_string());
        let mut config = Self::new(&backend_url)?;

        if let Some(list) = get(ENV_ADMIN_EMAILS) {
            let emails: Vec<String> = list
                .split(',')
                .map(str::trim)
                .filter(|e| !e.is_empty())
                .map(str::to_string)
                .collect();
            if emails.is_empty() {
                return Err(ConfigError::EmptyAdminList);
            }
            config.admin_emails = emails;
        }
        if let Some(path) = get(ENV_SESSION_FILE) {
            config.session_file = PathBuf::from(path);
        }
        if let Some(ms) = get(ENV_SEARCH_DEBOUNCE_MS) {
            config.search_debounce = Duration::from_millis(parse_number(ENV_SEARCH_DEBOUNCE_MS, &ms)?);
        }
        if let Some(secs) = get(ENV_REQUEST_TIMEOUT_SECS) {
            config.request_timeout = Duration::from_secs(parse_number(ENV_REQUEST_TIMEOUT_SECS, &secs)?);
        }
        Ok(config)
    }

    pub fn backend_url(&self) -> &Url {
        &self.backend_url
    }

    /// `<base>/api`, the root every resource path hangs off.
    pub fn api_root(&self) -> Url {
        let mut url = self.backend_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().push("api");
        }
        url
    }
}

fn parse_backend_url(raw: &str) -> Result<Url, ConfigError> {
    let invalid = |reason: String| ConfigError::InvalidBackendUrl {
        value: raw.to_string(),
        reason,
    };
    let url = Url::parse(raw.trim_end_matches('/')).map_err(|e| invalid(e.to_string()))?;
    if url.cannot_be_a_base() || !matches!(url.scheme(), "http" | "https") {
        return Err(invalid("expected an http(s) URL".to_string()));
    }
    if url.query().is_some() || url.fragment().is_some() {
        return Err(invalid("must not carry a query or fragment".to_string()));
    }
    Ok(url)
}

fn parse_number(key: &'static str, value: &str) -> Result<u64, ConfigError> {
    value.parse().map_err(|_| ConfigError::InvalidNumber {
        key,
        value: value.to_string(),
    })
}
