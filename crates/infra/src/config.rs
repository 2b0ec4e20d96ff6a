//! Process configuration read from `STOCKLEDGER_*` environment variables.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use stockledger_observability::LogFormat;
use thiserror::Error;

pub const ENV_BIND: &str = "STOCKLEDGER_BIND";
pub const ENV_DATA_FILE: &str = "STOCKLEDGER_DATA_FILE";
pub const ENV_REFRESH_SECS: &str = "STOCKLEDGER_REFRESH_SECS";
pub const ENV_LOG_FORMAT: &str = "STOCKLEDGER_LOG_FORMAT";
pub const ENV_BACKEND_URL: &str = "STOCKLEDGER_BACKEND_URL";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{var}: invalid value '{value}': {reason}")]
    Invalid {
        var: &'static str,
        value: String,
        reason: String,
    },
}

impl ConfigError {
    fn invalid(var: &'static str, value: &str, reason: impl ToString) -> Self {
        Self::Invalid {
            var,
            value: value.to_string(),
            reason: reason.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Listen address for the HTTP server.
    pub bind: SocketAddr,
    /// Snapshot file used by the JSON file gateway.
    pub data_file: PathBuf,
    /// Remote persistence backend; when set it replaces the data file.
    pub backend_url: Option<String>,
    /// Stats refresh period; `None` disables the background reporter.
    pub refresh_interval: Option<Duration>,
    pub log_format: LogFormat,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from(([127, 0, 0, 1], 8080)),
            data_file: PathBuf::from("data.json"),
            backend_url: None,
            refresh_interval: Some(Duration::from_secs(30)),
            log_format: LogFormat::Json,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup; unset or blank keys use the defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let mut config = Self::default();

        if let Some(raw) = get(ENV_BIND) {
            config.bind = raw
                .parse()
                .map_err(|e| ConfigError::invalid(ENV_BIND, &raw, e))?;
        }
        if let Some(raw) = get(ENV_DATA_FILE) {
            config.data_file = PathBuf::from(raw);
        }
        if let Some(raw) = get(ENV_BACKEND_URL) {
            if !raw.starts_with("http://") && !raw.starts_with("https://") {
                return Err(ConfigError::invalid(ENV_BACKEND_URL, &raw, "expected an http(s) URL"));
            }
            config.backend_url = Some(raw);
        }
        if let Some(raw) = get(ENV_REFRESH_SECS) {
            let secs: u64 = raw
                .parse()
                .map_err(|e| ConfigError::invalid(ENV_REFRESH_SECS, &raw, e))?;
            config.refresh_interval = (secs > 0).then(|| Duration::from_secs(secs));
        }
        if let Some(raw) = get(ENV_LOG_FORMAT) {
            config.log_format = raw
                .parse()
                .map_err(|e: String| ConfigError::invalid(ENV_LOG_FORMAT, &raw, e))?;
        }

        Ok(config)
    }
}
