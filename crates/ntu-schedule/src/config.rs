//! Service configuration read from the environment.

use std::env;
use std::fmt::Display;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;
use tracing::info;

use crate::db::MAX_POOL_SIZE;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid {key} value {value:?}: {message}")]
    InvalidValue {
        key: &'static str,
        value: String,
        message: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub port: u16,
    pub database_path: PathBuf,
    pub pool_size: usize,
    pub query_timeout: Duration,
}

impl Config {
    /// Loads the configuration from the process environment, after merging a
    /// `.env` file from the working directory if one exists.
    pub fn load() -> Result<Self, ConfigError> {
        if dotenv::dotenv().is_ok() {
            info!("Loaded environment from .env");
        }

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let pool_size: usize = try_load(&lookup, "DB_POOL_SIZE", "4")?;
        if !(1..=MAX_POOL_SIZE).contains(&pool_size) {
            return Err(ConfigError::InvalidValue {
                key: "DB_POOL_SIZE",
                value: pool_size.to_string(),
                message: format!("must be between 1 and {MAX_POOL_SIZE}"),
            });
        }

        let query_timeout_ms: u64 = try_load(&lookup, "QUERY_TIMEOUT_MS", "10000")?;
        if query_timeout_ms == 0 {
            return Err(ConfigError::InvalidValue {
                key: "QUERY_TIMEOUT_MS",
                value: query_timeout_ms.to_string(),
                message: "must be positive".to_string(),
            });
        }

        Ok(Self {
            port: try_load(&lookup, "PORT", "8080")?,
            database_path: try_load(&lookup, "DATABASE_PATH", "courses.db")?,
            pool_size,
            query_timeout: Duration::from_millis(query_timeout_ms),
        })
    }
}

fn try_load<T, F>(lookup: &F, key: &'static str, default: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: Display,
    F: Fn(&str) -> Option<String>,
{
    let value = lookup(key).unwrap_or_else(|| {
        info!("{key} not set, using default: {default}");
        default.to_string()
    });

    value.parse().map_err(|e: T::Err| ConfigError::InvalidValue {
        key,
        message: e.to_string(),
        value,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(pairs: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = load(&[]).unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.database_path, PathBuf::from("courses.db"));
        assert_eq!(config.pool_size, 4);
        assert_eq!(config.query_timeout, Duration::from_secs(10));
    }

    #[test]
    fn test_overrides() {
        let config = load(&[
            ("PORT", "3000"),
            ("DATABASE_PATH", "/var/lib/schedule/courses.db"),
            ("DB_POOL_SIZE", "10"),
            ("QUERY_TIMEOUT_MS", "2500"),
        ])
        .unwrap();

        assert_eq!(config.port, 3000);
        assert_eq!(config.database_path, PathBuf::from("/var/lib/schedule/courses.db"));
        assert_eq!(config.pool_size, 10);
        assert_eq!(config.query_timeout, Duration::from_millis(2500));
    }

    #[test]
    fn test_invalid_port() {
        let err = load(&[("PORT", "eighty")]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { key: "PORT", .. }));
    }

    #[test]
    fn test_pool_size_bounds() {
        assert!(load(&[("DB_POOL_SIZE", "0")]).is_err());
        assert!(load(&[("DB_POOL_SIZE", "11")]).is_err());
        assert!(load(&[("DB_POOL_SIZE", "2")]).is_ok());
    }

    #[test]
    fn test_zero_timeout_rejected() {
        assert!(load(&[("QUERY_TIMEOUT_MS", "0")]).is_err());
    }
}
