//! User configuration for tilefetch.
//!
//! Settings come from an optional INI file at `~/.tilefetch/config.ini`.
//! Command-line flags override file values, which override the built-in
//! defaults.
//!
//! # Example
//!
//! ```ini
//! [server]
//! host = us.djiservice.org
//! style = osm-bright
//! template = https://{host}/styles/{style}/{z}/{x}/{y}@2x.png
//!
//! [download]
//! workers = 8
//! timeout = 30
//! retries = 0
//! ```

mod file;
mod parser;

pub use file::{
    config_directory, config_file_path, ConfigFile, ConfigFileError, DownloadSettings,
    ServerSettings,
};
