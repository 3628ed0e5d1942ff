//! Application configuration.
//!
//! # Responsibility
//! - Resolve backend choice, storage paths and logging settings.
//! - Read `CARSTOCK_*` environment variables with defaults.
//!
//! # Invariants
//! - Configuration is an explicit value passed to the shells, never global.
//! - `log_dir` is always absolute after resolution.

use crate::logging::default_log_level;
use crate::repo::Backend;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

pub const BACKEND_ENV: &str = "CARSTOCK_BACKEND";
pub const CSV_PATH_ENV: &str = "CARSTOCK_CSV_PATH";
pub const DB_PATH_ENV: &str = "CARSTOCK_DB_PATH";
pub const LOG_LEVEL_ENV: &str = "CARSTOCK_LOG_LEVEL";
pub const LOG_DIR_ENV: &str = "CARSTOCK_LOG_DIR";

const DEFAULT_CSV_PATH: &str = "data/car_dataset.csv";
const DEFAULT_DB_PATH: &str = "data/cars.sqlite3";
const DEFAULT_LOG_DIR_NAME: &str = "carstock-logs";

#[derive(Debug)]
pub enum ConfigError {
    InvalidBackend(String),
    EmptyValue(&'static str),
    CurrentDir(std::io::Error),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidBackend(message) => write!(f, "{message}"),
            Self::EmptyValue(key) => write!(f, "`{key}` cannot be empty"),
            Self::CurrentDir(err) => write!(f, "cannot resolve current directory: {err}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::CurrentDir(err) => Some(err),
            Self::InvalidBackend(_) | Self::EmptyValue(_) => None,
        }
    }
}

/// Resolved startup settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub backend: Backend,
    pub csv_path: PathBuf,
    pub db_path: PathBuf,
    pub log_level: String,
    pub log_dir: PathBuf,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            backend: Backend::Csv,
            csv_path: PathBuf::from(DEFAULT_CSV_PATH),
            db_path: PathBuf::from(DEFAULT_DB_PATH),
            log_level: default_log_level().to_string(),
            log_dir: std::env::temp_dir().join(DEFAULT_LOG_DIR_NAME),
        }
    }
}

impl AppConfig {
    /// Reads settings from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads settings through `lookup`; absent keys keep their defaults.
    ///
    /// # Errors
    /// - `InvalidBackend` for an unknown backend name.
    /// - `EmptyValue` when a key is set to blank text.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(raw) = non_blank(&lookup, BACKEND_ENV)? {
            config.backend = raw.parse().map_err(ConfigError::InvalidBackend)?;
        }
        if let Some(raw) = non_blank(&lookup, CSV_PATH_ENV)? {
            config.csv_path = PathBuf::from(raw);
        }
        if let Some(raw) = non_blank(&lookup, DB_PATH_ENV)? {
            config.db_path = PathBuf::from(raw);
        }
        if let Some(raw) = non_blank(&lookup, LOG_LEVEL_ENV)? {
            config.log_level = raw;
        }
        if let Some(raw) = non_blank(&lookup, LOG_DIR_ENV)? {
            config.log_dir = absolutize(Path::new(&raw))?;
        }

        Ok(config)
    }

    /// Replaces the log directory, resolving relative paths.
    pub fn set_log_dir(&mut self, dir: impl AsRef<Path>) -> Result<(), ConfigError> {
        self.log_dir = absolutize(dir.as_ref())?;
        Ok(())
    }
}

fn non_blank(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
) -> Result<Option<String>, ConfigError> {
    match lookup(key) {
        Some(raw) if raw.trim().is_empty() => Err(ConfigError::EmptyValue(key)),
        Some(raw) => Ok(Some(raw.trim().to_string())),
        None => Ok(None),
    }
}

fn absolutize(path: &Path) -> Result<PathBuf, ConfigError> {
    if path.is_absolute() {
        return Ok(path.to_path_buf());
    }
    let cwd = std::env::current_dir().map_err(ConfigError::CurrentDir)?;
    Ok(cwd.join(path))
}

#[cfg(test)]
mod tests {
    use super::{AppConfig, ConfigError, BACKEND_ENV, DB_PATH_ENV, LOG_DIR_ENV};
    use crate::repo::Backend;
    use std::collections::HashMap;
    use std::path::PathBuf;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map = pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect::<HashMap<_, _>>();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_apply_when_nothing_is_set() {
        let config = AppConfig::from_lookup(|_| None).unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.backend, Backend::Csv);
        assert!(config.log_dir.is_absolute());
    }

    #[test]
    fn environment_overrides_defaults() {
        let config = AppConfig::from_lookup(lookup_from(&[
            (BACKEND_ENV, "SQLite"),
            (DB_PATH_ENV, "/tmp/cars.db"),
            (LOG_DIR_ENV, "logs"),
        ]))
        .unwrap();

        assert_eq!(config.backend, Backend::Sqlite);
        assert_eq!(config.db_path, PathBuf::from("/tmp/cars.db"));
        assert!(config.log_dir.is_absolute());
        assert!(config.log_dir.ends_with("logs"));
    }

    #[test]
    fn invalid_backend_and_blank_values_are_rejected() {
        let err = AppConfig::from_lookup(lookup_from(&[(BACKEND_ENV, "mongo")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidBackend(_)));

        let err = AppConfig::from_lookup(lookup_from(&[(DB_PATH_ENV, "  ")])).unwrap_err();
        assert!(matches!(err, ConfigError::EmptyValue(DB_PATH_ENV)));
    }
}
