use serde::{Deserialize, Serialize};
use std::{fmt, time::Duration};
use url::Url;

pub const DEFAULT_BASE_URL: &str = "https://dashboard.fluentc.io/ai_agent";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 60;
pub const DEFAULT_MAX_POLL_ATTEMPTS: u32 = 60;
pub const MAX_POLL_ATTEMPTS_LIMIT: u32 = 100;
pub const DEFAULT_POLL_WAIT_SECS: u64 = 5;
pub const MIN_POLL_WAIT_SECS: u64 = 5;
pub const ENV_FLUENTC_API_KEY: &str = "FLUENTC_API_KEY";
pub const ENV_FLUENTC_BASE_URL: &str = "FLUENTC_BASE_URL";

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct LanguageCode(pub String);

impl LanguageCode {
    pub fn new<S: Into<String>>(value: S) -> Result<Self, ConfigError> {
        let v = value.into();
        if v.trim().is_empty() {
            return Err(ConfigError::EmptyLanguageCode);
        }
        Ok(Self(v))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LanguageCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Sent verbatim in the `Authorization` header, so surrounding whitespace
/// (a trailing newline from a pasted key) is stripped.
#[derive(Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    pub fn new<S: Into<String>>(value: S) -> Result<Self, ConfigError> {
        let v = value.into();
        let v = v.trim();
        if v.is_empty() {
            return Err(ConfigError::EmptyApiKey);
        }
        Ok(Self(v.to_owned()))
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiKey(**redacted**)")
    }
}

/// Polling policy for batch translation jobs.
///
/// The server's `estimated_wait_seconds` hint decides how long to wait
/// between status checks; `default_wait` stands in when the hint is absent
/// and `min_wait` is the floor applied to either.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PollConfig {
    pub max_attempts: u32,
    pub default_wait: Duration,
    pub min_wait: Duration,
}

impl PollConfig {
    pub fn new(max_attempts: u32) -> Result<Self, ConfigError> {
        if !(1..=MAX_POLL_ATTEMPTS_LIMIT).contains(&max_attempts) {
            return Err(ConfigError::MaxAttemptsOutOfRange(max_attempts));
        }
        Ok(Self {
            max_attempts,
            ..Default::default()
        })
    }

    pub fn with_min_wait(mut self, min_wait: Duration) -> Self {
        self.min_wait = min_wait;
        self
    }

    pub fn with_default_wait(mut self, default_wait: Duration) -> Self {
        self.default_wait = default_wait;
        self
    }

    /// Wait before the next status check given the server's hint in seconds.
    pub fn wait_for(&self, hint_secs: Option<f64>) -> Duration {
        let hinted = hint_secs
            .filter(|s| s.is_finite() && *s >= 0.0)
            .and_then(|s| Duration::try_from_secs_f64(s).ok())
            .unwrap_or(self.default_wait);
        hinted.max(self.min_wait)
    }
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_POLL_ATTEMPTS,
            default_wait: Duration::from_secs(DEFAULT_POLL_WAIT_SECS),
            min_wait: Duration::from_secs(MIN_POLL_WAIT_SECS),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClientConfig {
    pub api_key: ApiKey,
    pub base_url: Url,
    pub request_timeout: Duration,
    pub poll: PollConfig,
}

impl ClientConfig {
    pub fn new(api_key: ApiKey) -> Result<Self, ConfigError> {
        Ok(Self {
            api_key,
            base_url: parse_base_url(DEFAULT_BASE_URL)?,
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            poll: PollConfig::default(),
        })
    }

    pub fn with_base_url(mut self, base_url: &str) -> Result<Self, ConfigError> {
        self.base_url = parse_base_url(base_url)?;
        Ok(self)
    }

    pub fn with_request_timeout(mut self, request_timeout: Duration) -> Self {
        self.request_timeout = request_timeout;
        self
    }

    /// Polling policy handed to the translate node for batch jobs.
    pub fn with_poll(mut self, poll: PollConfig) -> Self {
        self.poll = poll;
        self
    }
}

pub fn parse_base_url(value: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(value.trim()).map_err(|_| ConfigError::InvalidBaseUrl(value.to_owned()))?;
    if url.cannot_be_a_base() || !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidBaseUrl(value.to_owned()));
    }
    Ok(url)
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("language code must not be empty")]
    EmptyLanguageCode,
    #[error("api key must not be empty")]
    EmptyApiKey,
    #[error("api key is required (pass --api-key or set FLUENTC_API_KEY)")]
    MissingApiKey,
    #[error("max polling attempts must be within 1..=100, got {0}")]
    MaxAttemptsOutOfRange(u32),
    #[error("invalid base url: {0}")]
    InvalidBaseUrl(String),
}

pub trait Env {
    fn var(&self, key: &str) -> Option<String>;
}

#[derive(Clone, Debug, Default)]
pub struct StdEnv;

impl Env for StdEnv {
    fn var(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

#[derive(Clone, Debug, Default)]
pub struct MapEnv {
    vars: std::collections::BTreeMap<String, String>,
}

impl MapEnv {
    pub fn with_var(mut self, key: &str, value: &str) -> Self {
        self.vars.insert(key.to_owned(), value.to_owned());
        self
    }
}

impl Env for MapEnv {
    fn var(&self, key: &str) -> Option<String> {
        self.vars.get(key).cloned()
    }
}

pub fn resolve_api_key(
    cli_value: Option<String>,
    env_key: &str,
    env: &impl Env,
) -> Result<Option<ApiKey>, ConfigError> {
    match cli_value {
        Some(v) => Ok(Some(ApiKey::new(v)?)),
        None => match env.var(env_key) {
            Some(v) => Ok(Some(ApiKey::new(v)?)),
            None => Ok(None),
        },
    }
}

pub fn resolve_string_with_default(
    cli_value: Option<String>,
    env_key: &str,
    env: &impl Env,
    default: &str,
) -> String {
    match cli_value {
        Some(v) => v,
        None => env.var(env_key).unwrap_or_else(|| default.to_owned()),
    }
}
