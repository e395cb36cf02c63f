//! Region download errors.

use thiserror::Error;

use crate::coord::CoordError;
use crate::fetch::FetchError;
use crate::manifest::ManifestError;
use crate::sink::SinkError;

/// Errors that abort a region download.
///
/// Per-tile failures are not errors; they are reported in the
/// [`RunSummary`](super::RunSummary).
#[derive(Debug, Error)]
pub enum RegionError {
    /// The bounding box or zoom range cannot be projected.
    #[error("Invalid region: {0}")]
    Coord(#[from] CoordError),

    /// The fetcher could not be set up.
    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// The output directory could not be prepared.
    #[error(transparent)]
    Sink(#[from] SinkError),

    /// The manifest could not be written.
    #[error(transparent)]
    Manifest(#[from] ManifestError),
}

/// Result type for region operations.
pub type RegionResult<T> = Result<T, RegionError>;
