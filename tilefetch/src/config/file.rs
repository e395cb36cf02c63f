//! Configuration file handling for ~/.tilefetch/config.ini.

use std::path::{Path, PathBuf};

use ini::Ini;
use thiserror::Error;

use crate::fetch::{FetcherConfig, DEFAULT_CONCURRENCY, DEFAULT_MAX_RETRIES, DEFAULT_TIMEOUT_SECS};
use crate::provider::{DEFAULT_HOST, DEFAULT_STYLE, DEFAULT_TEMPLATE};

/// Configuration file errors.
#[derive(Debug, Error)]
pub enum ConfigFileError {
    /// Failed to read or parse the config file
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] ini::Error),

    /// Invalid configuration value
    #[error("Invalid configuration: {section}.{key} = '{value}' - {reason}")]
    InvalidValue {
        section: String,
        key: String,
        value: String,
        reason: String,
    },
}

/// `[server]` section: where tiles come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerSettings {
    pub host: String,
    pub style: String,
    /// URL template with `{host}`, `{style}`, `{z}`, `{x}` and `{y}`
    pub template: String,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            style: DEFAULT_STYLE.to_string(),
            template: DEFAULT_TEMPLATE.to_string(),
        }
    }
}

/// `[download]` section: fetcher tuning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DownloadSettings {
    /// Concurrent downloads
    pub workers: usize,
    /// Per-request timeout in seconds
    pub timeout: u64,
    /// Retries after a failed download
    pub retries: u32,
}

impl Default for DownloadSettings {
    fn default() -> Self {
        Self {
            workers: DEFAULT_CONCURRENCY,
            timeout: DEFAULT_TIMEOUT_SECS,
            retries: DEFAULT_MAX_RETRIES,
        }
    }
}

/// Parsed configuration file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigFile {
    pub server: ServerSettings,
    pub download: DownloadSettings,
}

impl ConfigFile {
    /// Load configuration from the default path (~/.tilefetch/config.ini).
    pub fn load() -> Result<Self, ConfigFileError> {
        Self::load_from(&config_file_path())
    }

    /// Load configuration from a specific path.
    ///
    /// If the file doesn't exist, returns defaults.
    pub fn load_from(path: &Path) -> Result<Self, ConfigFileError> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let ini = Ini::load_from_file(path)?;
        super::parser::parse_ini(&ini)
    }

    /// Fetcher configuration derived from the `[download]` section.
    pub fn fetcher_config(&self) -> FetcherConfig {
        FetcherConfig::new()
            .with_concurrency(self.download.workers)
            .with_timeout_secs(self.download.timeout)
            .with_max_retries(self.download.retries)
    }
}

/// Get the path to the config directory (~/.tilefetch).
pub fn config_directory() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".tilefetch")
}

/// Get the path to the config file (~/.tilefetch/config.ini).
pub fn config_file_path() -> PathBuf {
    config_directory().join("config.ini")
}
