use std::env;
use std::path::PathBuf;
use std::time::Duration;

use url::Url;

use crate::error::ConfigError;

pub const APP_NAME: &str = "Surgery Scheduling System";
pub const DEFAULT_API_URL: &str = "http://localhost:8080";
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_SESSION_FILE: &str = "surgery-session.json";

pub const API_URL_VAR: &str = "SURGERY_API_URL";
pub const TIMEOUT_VAR: &str = "SURGERY_TIMEOUT_SECS";
pub const SESSION_FILE_VAR: &str = "SURGERY_SESSION_FILE";

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: Url,
    /// Overall limit applied to every request; there is no retry.
    pub timeout: Duration,
    pub session_file: PathBuf,
}

impl ClientConfig {
    pub fn new(base_url: &str) -> Result<Self, ConfigError> {
        let base_url = Url::parse(base_url).map_err(|source| ConfigError::InvalidUrl {
            value: base_url.to_string(),
            source,
        })?;

        Ok(Self {
            base_url,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            session_file: PathBuf::from(DEFAULT_SESSION_FILE),
        })
    }

    /// Reads `SURGERY_API_URL`, `SURGERY_TIMEOUT_SECS` and `SURGERY_SESSION_FILE`,
    /// falling back to the defaults for anything unset.
    pub fn from_env() -> Result<Self, ConfigError> {
        let url = env::var(API_URL_VAR).unwrap_or_else(|_| DEFAULT_API_URL.to_string());
        let mut config = Self::new(&url)?;

        if let Ok(raw) = env::var(TIMEOUT_VAR) {
            config.timeout = parse_timeout(&raw)?;
        }
        if let Ok(path) = env::var(SESSION_FILE_VAR) {
            config.session_file = PathBuf::from(path);
        }

        Ok(config)
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_session_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.session_file = path.into();
        self
    }
}

pub fn parse_timeout(raw: &str) -> Result<Duration, ConfigError> {
    match raw.trim().parse::<u64>() {
        Ok(secs) if secs > 0 => Ok(Duration::from_secs(secs)),
        _ => Err(ConfigError::InvalidTimeout(raw.to_string())),
    }
}
