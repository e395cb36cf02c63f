//! CLI runner for common setup.
//!
//! Encapsulates logging initialization and config loading.

use tracing::info;

use tilefetch::config::{config_file_path, ConfigFile};
use tilefetch::logging::{default_log_dir, default_log_file, init_logging, LoggingGuard};

use crate::error::CliError;

/// Runner that manages CLI lifecycle.
pub struct CliRunner {
    /// Logging guard - keeps logging active while runner exists
    #[allow(dead_code)]
    logging_guard: LoggingGuard,
    /// Loaded configuration file
    config: ConfigFile,
    /// Whether log lines are also printed to stdout
    stdout_logging: bool,
}

impl CliRunner {
    /// Create a new CLI runner, loading config and initializing logging.
    ///
    /// When stdout is a TTY, stdout logging is disabled so log lines don't
    /// tear through the progress bar.
    ///
    /// # Arguments
    ///
    /// * `debug_mode` - When true, enables debug-level logging regardless of RUST_LOG
    pub fn with_debug(debug_mode: bool) -> Result<Self, CliError> {
        let config = ConfigFile::load()?;

        let stdout_logging = !atty::is(atty::Stream::Stdout);

        let logging_guard = init_logging(
            &default_log_dir(),
            default_log_file(),
            stdout_logging,
            debug_mode,
        )
        .map_err(|e| CliError::LoggingInit(e.to_string()))?;

        Ok(Self {
            logging_guard,
            config,
            stdout_logging,
        })
    }

    /// Get the loaded configuration.
    pub fn config(&self) -> &ConfigFile {
        &self.config
    }

    /// True when a progress bar may be drawn.
    pub fn interactive(&self) -> bool {
        !self.stdout_logging
    }

    /// Log startup information.
    pub fn log_startup(&self) {
        info!("tilefetch v{}", tilefetch::VERSION);
        info!(config = %config_file_path().display(), "Configuration loaded");
    }
}
