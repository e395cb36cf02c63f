//! CLI error handling with user-friendly messages.
//!
//! Centralizes error handling for the CLI, providing consistent formatting
//! and appropriate exit codes.

use std::fmt;
use std::process;

use tilefetch::config::ConfigFileError;
use tilefetch::coord::CoordError;
use tilefetch::fetch::FetchError;
use tilefetch::provider::ProviderError;
use tilefetch::region::RegionError;
use tilefetch::sink::SinkError;

/// CLI-specific errors with user-friendly messages.
#[derive(Debug)]
pub enum CliError {
    /// Failed to initialize logging
    LoggingInit(String),
    /// Configuration file error
    Config(ConfigFileError),
    /// Bounding box or zoom range rejected
    InvalidRegion(CoordError),
    /// Runtime, signal handler or HTTP client setup failed
    Setup(String),
    /// Output directory could not be prepared
    Output(SinkError),
    /// Region download aborted
    Download(RegionError),
    /// Interrupted by the user before the run finished
    Cancelled { succeeded: usize, requested: usize },
}

impl CliError {
    /// Process exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Cancelled { .. } => 130,
            _ => 1,
        }
    }

    /// Exit the process with an appropriate error message and code.
    pub fn exit(&self) -> ! {
        eprintln!("Error: {}", self);

        match self {
            CliError::InvalidRegion(_) => {
                eprintln!();
                eprintln!("Bounds must satisfy:");
                eprintln!("  -85.05112878 <= south < north <= 85.05112878");
                eprintln!("  -180 <= west, east <= 180");
                eprintln!("  0 <= min-zoom <= max-zoom <= 22");
            }
            CliError::Config(_) => {
                eprintln!();
                eprintln!(
                    "Check {} or remove it to use defaults.",
                    tilefetch::config::config_file_path().display()
                );
            }
            _ => {}
        }

        process::exit(self.exit_code())
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::LoggingInit(msg) => write!(f, "Failed to initialize logging: {}", msg),
            CliError::Config(e) => write!(f, "Configuration error: {}", e),
            CliError::InvalidRegion(e) => write!(f, "{}", e),
            CliError::Setup(msg) => write!(f, "Setup failed: {}", msg),
            CliError::Output(e) => write!(f, "{}", e),
            CliError::Download(e) => write!(f, "Download failed: {}", e),
            CliError::Cancelled {
                succeeded,
                requested,
            } => write!(
                f,
                "Download cancelled after {}/{} tiles; no manifest written",
                succeeded, requested
            ),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::Config(e) => Some(e),
            CliError::InvalidRegion(e) => Some(e),
            CliError::Output(e) => Some(e),
            CliError::Download(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ConfigFileError> for CliError {
    fn from(e: ConfigFileError) -> Self {
        CliError::Config(e)
    }
}

impl From<CoordError> for CliError {
    fn from(e: CoordError) -> Self {
        CliError::InvalidRegion(e)
    }
}

impl From<SinkError> for CliError {
    fn from(e: SinkError) -> Self {
        CliError::Output(e)
    }
}

impl From<ProviderError> for CliError {
    fn from(e: ProviderError) -> Self {
        CliError::Setup(e.to_string())
    }
}

impl From<FetchError> for CliError {
    fn from(e: FetchError) -> Self {
        CliError::Setup(e.to_string())
    }
}

impl From<RegionError> for CliError {
    fn from(e: RegionError) -> Self {
        match e {
            RegionError::Coord(e) => CliError::InvalidRegion(e),
            other => CliError::Download(other),
        }
    }
}
