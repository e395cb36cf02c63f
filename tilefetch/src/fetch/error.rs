//! Fetcher construction errors.

use thiserror::Error;

use crate::provider::ProviderError;

/// Errors raised when a fetcher cannot be built.
///
/// Per-tile download and storage problems are never errors; they are
/// recorded in the [`ZoomLevelReport`](super::ZoomLevelReport).
#[derive(Debug, Error)]
pub enum FetchError {
    /// Concurrency limit must be at least 1.
    #[error("Invalid concurrency {0}: at least one worker is required")]
    InvalidConcurrency(usize),

    /// HTTP client or tile source could not be created.
    #[error("Failed to set up tile provider: {0}")]
    Provider(#[from] ProviderError),
}
