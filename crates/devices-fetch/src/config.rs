use std::time::Duration;

use url::Url;

use crate::limits::DEFAULT_MAX_BODY_BYTES;

pub const BASE_URL_ENV: &str = "DEVICES_API_BASE_URL";
pub const TIMEOUT_SECS_ENV: &str = "DEVICES_API_TIMEOUT_SECS";
pub const MAX_BODY_BYTES_ENV: &str = "DEVICES_API_MAX_BODY_BYTES";

pub const DEFAULT_BASE_URL: &str = "http://localhost:5000/api";

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid base url {value:?}: {reason}")]
    InvalidUrl { value: String, reason: String },
    #[error("unsupported url scheme {0:?} (only http/https allowed)")]
    UnsupportedScheme(String),
    #[error("invalid integer for {key}: {value:?}")]
    InvalidNumber { key: &'static str, value: String },
}

/// Where and how to reach the devices API.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClientConfig {
    base_url: Url,
    /// Client-side request timeout. `None` leaves the transport's own policy in charge.
    timeout: Option<Duration>,
    max_body_bytes: usize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: Url::parse(DEFAULT_BASE_URL).expect("default base url is valid"),
            timeout: None,
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        }
    }
}

impl ClientConfig {
    pub fn new(base_url: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            base_url: parse_base_url(base_url)?,
            ..Self::default()
        })
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from an arbitrary variable lookup (the process environment in
    /// [`ClientConfig::from_env`]).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        if let Some(base) = lookup(BASE_URL_ENV) {
            config.base_url = parse_base_url(&base)?;
        }
        if let Some(secs) = lookup(TIMEOUT_SECS_ENV) {
            let secs = parse_number(TIMEOUT_SECS_ENV, &secs)?;
            config.timeout = (secs > 0).then(|| Duration::from_secs(secs));
        }
        if let Some(bytes) = lookup(MAX_BODY_BYTES_ENV) {
            config.max_body_bytes = parse_number(MAX_BODY_BYTES_ENV, &bytes)? as usize;
        }
        Ok(config)
    }

    pub fn with_base_url(mut self, base_url: &str) -> Result<Self, ConfigError> {
        self.base_url = parse_base_url(base_url)?;
        Ok(self)
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_max_body_bytes(mut self, max_body_bytes: usize) -> Self {
        self.max_body_bytes = max_body_bytes;
        self
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    pub fn max_body_bytes(&self) -> usize {
        self.max_body_bytes
    }

    /// `{base_url}/devices`, keeping any path prefix on the base.
    pub fn devices_url(&self) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().push("devices");
        }
        url
    }
}

fn parse_base_url(value: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(value.trim()).map_err(|err| ConfigError::InvalidUrl {
        value: value.to_string(),
        reason: err.to_string(),
    })?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(ConfigError::UnsupportedScheme(other.to_string())),
    }
}

fn parse_number(key: &'static str, value: &str) -> Result<u64, ConfigError> {
    value
        .trim()
        .parse::<u64>()
        .map_err(|_| ConfigError::InvalidNumber {
            key,
            value: value.to_string(),
        })
}
