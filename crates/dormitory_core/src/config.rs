//! Environment-driven runtime configuration.
//!
//! Every setting has a default so an empty environment yields a usable
//! in-process configuration.

use crate::context::RequestContext;
use crate::db::{DbOptions, DEFAULT_BUSY_TIMEOUT};
use crate::logging::default_log_level;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;
use std::time::Duration;

pub const ENV_DB_PATH: &str = "DORMITORY_DB_PATH";
pub const ENV_LOG_LEVEL: &str = "DORMITORY_LOG_LEVEL";
pub const ENV_LOG_DIR: &str = "DORMITORY_LOG_DIR";
pub const ENV_BUSY_TIMEOUT_MS: &str = "DORMITORY_BUSY_TIMEOUT_MS";
pub const ENV_REQUEST_DEADLINE_MS: &str = "DORMITORY_REQUEST_DEADLINE_MS";

const DEFAULT_DB_PATH: &str = "dormitory.sqlite3";

#[derive(Debug)]
pub enum ConfigError {
    InvalidNumber { key: &'static str, value: String },
    Empty(&'static str),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidNumber { key, value } => {
                write!(f, "{key} must be a non-negative integer, got `{value}`")
            }
            Self::Empty(key) => write!(f, "{key} is set but empty"),
        }
    }
}

impl Error for ConfigError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoreConfig {
    pub db_path: PathBuf,
    pub log_level: String,
    /// File logging stays off when unset.
    pub log_dir: Option<PathBuf>,
    pub busy_timeout: Duration,
    /// Budget applied to each request context built by [`CoreConfig::request_context`].
    pub request_deadline: Option<Duration>,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from(DEFAULT_DB_PATH),
            log_level: default_log_level().to_string(),
            log_dir: None,
            busy_timeout: DEFAULT_BUSY_TIMEOUT,
            request_deadline: None,
        }
    }
}

impl CoreConfig {
    /// Reads configuration from process environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(path) = non_empty(&lookup, ENV_DB_PATH)? {
            config.db_path = PathBuf::from(path);
        }
        if let Some(level) = non_empty(&lookup, ENV_LOG_LEVEL)? {
            config.log_level = level;
        }
        if let Some(dir) = non_empty(&lookup, ENV_LOG_DIR)? {
            config.log_dir = Some(PathBuf::from(dir));
        }
        if let Some(ms) = millis(&lookup, ENV_BUSY_TIMEOUT_MS)? {
            config.busy_timeout = ms;
        }
        config.request_deadline = millis(&lookup, ENV_REQUEST_DEADLINE_MS)?;

        Ok(config)
    }

    pub fn db_options(&self) -> DbOptions {
        DbOptions {
            busy_timeout: self.busy_timeout,
        }
    }

    /// Stamps the configured request budget onto `ctx`.
    pub fn request_context(&self, ctx: RequestContext) -> RequestContext {
        match self.request_deadline {
            Some(budget) => ctx.with_timeout(budget),
            None => ctx,
        }
    }
}

fn non_empty<F>(lookup: &F, key: &'static str) -> Result<Option<String>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        None => Ok(None),
        Some(value) if value.trim().is_empty() => Err(ConfigError::Empty(key)),
        Some(value) => Ok(Some(value.trim().to_string())),
    }
}

fn millis<F>(lookup: &F, key: &'static str) -> Result<Option<Duration>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let Some(raw) = non_empty(lookup, key)? else {
        return Ok(None);
    };
    raw.parse::<u64>()
        .map(|ms| Some(Duration::from_millis(ms)))
        .map_err(|_| ConfigError::InvalidNumber { key, value: raw })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn empty_environment_yields_defaults() {
        let config = CoreConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, CoreConfig::default());
        assert_eq!(config.db_options().busy_timeout, DEFAULT_BUSY_TIMEOUT);
    }

    #[test]
    fn values_are_read_from_lookup() {
        let config = CoreConfig::from_lookup(lookup(&[
            (ENV_DB_PATH, "/var/lib/dorm.sqlite3"),
            (ENV_LOG_LEVEL, "warn"),
            (ENV_LOG_DIR, "/var/log/dorm"),
            (ENV_BUSY_TIMEOUT_MS, "250"),
            (ENV_REQUEST_DEADLINE_MS, "1500"),
        ]))
        .unwrap();

        assert_eq!(config.db_path, PathBuf::from("/var/lib/dorm.sqlite3"));
        assert_eq!(config.log_level, "warn");
        assert_eq!(config.log_dir, Some(PathBuf::from("/var/log/dorm")));
        assert_eq!(config.busy_timeout, Duration::from_millis(250));
        assert_eq!(config.request_deadline, Some(Duration::from_millis(1500)));
    }

    #[test]
    fn bad_numbers_are_rejected() {
        let err = CoreConfig::from_lookup(lookup(&[(ENV_BUSY_TIMEOUT_MS, "soon")])).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidNumber {
                key: ENV_BUSY_TIMEOUT_MS,
                ..
            }
        ));
    }

    #[test]
    fn blank_values_are_rejected() {
        let err = CoreConfig::from_lookup(lookup(&[(ENV_DB_PATH, "  ")])).unwrap_err();
        assert!(matches!(err, ConfigError::Empty(ENV_DB_PATH)));
    }

    #[test]
    fn request_context_carries_configured_deadline() {
        let mut config = CoreConfig::default();
        assert!(config
            .request_context(RequestContext::anonymous())
            .deadline()
            .is_none());

        config.request_deadline = Some(Duration::from_secs(30));
        assert!(config
            .request_context(RequestContext::anonymous())
            .deadline()
            .is_some());
    }
}
