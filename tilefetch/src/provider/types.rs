//! Provider types and traits

use std::fmt;

use crate::coord::TileCoord;

/// Errors that can occur during provider operations.
#[derive(Debug, Clone, PartialEq)]
pub enum ProviderError {
    /// HTTP request failed before a response arrived
    HttpError(String),
    /// Request exceeded the configured timeout
    Timeout(String),
    /// Server answered with a non-success status
    HttpStatus { status: u16, url: String },
    /// URL template is missing a required placeholder
    InvalidTemplate(String),
}

impl fmt::Display for ProviderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProviderError::HttpError(msg) => write!(f, "HTTP error: {}", msg),
            ProviderError::Timeout(url) => write!(f, "Request timed out: {}", url),
            ProviderError::HttpStatus { status, url } => {
                write!(f, "HTTP {} from {}", status, url)
            }
            ProviderError::InvalidTemplate(msg) => write!(f, "Invalid URL template: {}", msg),
        }
    }
}

impl std::error::Error for ProviderError {}

/// Source of tile URLs.
///
/// Implementors map a tile coordinate to the URL it is served from.
pub trait TileSource: Send + Sync {
    /// Returns the URL for the given tile.
    fn tile_url(&self, tile: &TileCoord) -> String;

    /// Returns the source's name for logging and identification.
    fn name(&self) -> &str;
}
