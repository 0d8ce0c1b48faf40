//! Runtime configuration.
//!
//! Values come from built-in defaults, then `config.toml` in the user's
//! config directory, then the environment (a `.env` file included).

use chrono::NaiveDate;
use serde::Deserialize;
use std::env;
use std::fmt::Write;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const API_URL_VAR: &str = "TODO_API_URL";
pub const LOG_FILE_VAR: &str = "TODO_TUI_LOG";
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read { path: PathBuf, source: io::Error },
    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("invalid date format {0:?}")]
    DateFormat(String),
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub base_url: String,
    pub log_file: PathBuf,
    pub date_format: String,
}

impl Default for Config {
    fn default() -> Self {
        let log_dir = dirs::cache_dir().unwrap_or_else(env::temp_dir);
        Config {
            base_url: DEFAULT_BASE_URL.to_string(),
            log_file: log_dir.join("todo-tui").join("todo-tui.log"),
            date_format: "%x".to_string(),
        }
    }
}

impl Config {
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("todo-tui").join("config.toml"))
    }

    /// Resolves the configuration the application starts with. Call after
    /// `dotenv()` so `.env` entries count as environment.
    pub fn load() -> Result<Self, ConfigError> {
        let config = match Self::default_path() {
            Some(path) if path.exists() => Self::from_file(&path)?,
            _ => Self::default(),
        };

        config
            .with_overrides(env::var(API_URL_VAR).ok(), env::var(LOG_FILE_VAR).ok())
            .validated()
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn with_overrides(mut self, base_url: Option<String>, log_file: Option<String>) -> Self {
        if let Some(url) = base_url.filter(|url| !url.trim().is_empty()) {
            self.base_url = url;
        }
        if let Some(file) = log_file.filter(|file| !file.trim().is_empty()) {
            self.log_file = PathBuf::from(file);
        }
        self
    }

    /// Normalises the base URL and rejects date formats that cannot render a
    /// calendar date, including ones with time-of-day fields.
    pub fn validated(mut self) -> Result<Self, ConfigError> {
        self.base_url = self.base_url.trim().trim_end_matches('/').to_string();
        let sample = NaiveDate::default().format(&self.date_format);
        if write!(String::new(), "{}", sample).is_err() {
            return Err(ConfigError::DateFormat(self.date_format));
        }
        Ok(self)
    }
}
