//! Client configuration parsed from environment variables.

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;

use std::path::PathBuf;

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:9999/api";
pub const DEFAULT_STORAGE_PATH: &str = ".todo-client/storage.json";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

/// Errors produced while reading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A numeric setting held something other than an unsigned integer.
    #[error("invalid value for {var}: {value}")]
    InvalidNumber { var: String, value: String },

    /// The API base URL was empty after trimming.
    #[error("empty API base URL")]
    EmptyBaseUrl,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeouts {
    pub request_secs: u64,
    pub connect_secs: u64,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self { request_secs: DEFAULT_REQUEST_TIMEOUT_SECS, connect_secs: DEFAULT_CONNECT_TIMEOUT_SECS }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// API root including the `/api` prefix, without a trailing slash.
    pub base_url: String,
    /// File backing durable session storage.
    pub storage_path: PathBuf,
    pub timeouts: Timeouts,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_BASE_URL.to_owned(),
            storage_path: PathBuf::from(DEFAULT_STORAGE_PATH),
            timeouts: Timeouts::default(),
        }
    }
}

impl ClientConfig {
    /// Build typed client config from environment variables.
    ///
    /// Optional:
    /// - `TODO_API_BASE_URL`: default `http://localhost:9999/api`
    /// - `TODO_STORAGE_PATH`: default `.todo-client/storage.json`
    /// - `TODO_REQUEST_TIMEOUT_SECS`: default 30
    /// - `TODO_CONNECT_TIMEOUT_SECS`: default 10
    ///
    /// # Errors
    ///
    /// Returns an error if a timeout is not a number or the base URL is blank.
    pub fn from_env() -> Result<Self, ConfigError> {
        let base_url = std::env::var("TODO_API_BASE_URL").unwrap_or_else(|_| DEFAULT_API_BASE_URL.to_owned());
        let storage_path = std::env::var("TODO_STORAGE_PATH")
            .ok()
            .filter(|s| !s.is_empty())
            .map_or_else(|| PathBuf::from(DEFAULT_STORAGE_PATH), PathBuf::from);
        let timeouts = Timeouts {
            request_secs: env_parse_u64("TODO_REQUEST_TIMEOUT_SECS", DEFAULT_REQUEST_TIMEOUT_SECS)?,
            connect_secs: env_parse_u64("TODO_CONNECT_TIMEOUT_SECS", DEFAULT_CONNECT_TIMEOUT_SECS)?,
        };

        Ok(Self { base_url: normalize_base_url(&base_url)?, storage_path, timeouts })
    }

    /// Replace the base URL, applying the same normalization as `from_env`.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is blank.
    pub fn with_base_url(mut self, base_url: &str) -> Result<Self, ConfigError> {
        self.base_url = normalize_base_url(base_url)?;
        Ok(self)
    }
}

pub(crate) fn normalize_base_url(raw: &str) -> Result<String, ConfigError> {
    let trimmed = raw.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        return Err(ConfigError::EmptyBaseUrl);
    }
    Ok(trimmed.to_owned())
}

fn env_parse_u64(key: &str, default: u64) -> Result<u64, ConfigError> {
    match std::env::var(key) {
        Ok(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse::<u64>()
            .map_err(|_| ConfigError::InvalidNumber { var: key.to_owned(), value: raw }),
        _ => Ok(default),
    }
}
