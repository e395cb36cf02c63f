//! Per-tile outcomes and per-level batch reports.

use std::time::Duration;

use crate::coord::TileCoord;

/// Why a tile failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// Network error, timeout or non-success HTTP status.
    Download,
    /// The sink could not persist the bytes.
    Storage,
}

/// Terminal state of a single tile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TileOutcome {
    /// Tile downloaded and written.
    Success { bytes: usize },
    /// Tile could not be downloaded or written.
    Failure { kind: FailureKind, reason: String },
}

/// Outcome of one tile download.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadResult {
    pub tile: TileCoord,
    pub outcome: TileOutcome,
}

impl DownloadResult {
    pub fn success(tile: TileCoord, bytes: usize) -> Self {
        Self {
            tile,
            outcome: TileOutcome::Success { bytes },
        }
    }

    pub fn failure(tile: TileCoord, kind: FailureKind, reason: impl Into<String>) -> Self {
        Self {
            tile,
            outcome: TileOutcome::Failure {
                kind,
                reason: reason.into(),
            },
        }
    }
}

/// A tile that failed, with the error description.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailedTile {
    pub tile: TileCoord,
    pub kind: FailureKind,
    pub reason: String,
}

/// Aggregate result of one batch (one zoom level).
///
/// Unless the batch was cancelled, `succeeded + failed.len() == requested`.
/// Tiles never submitted because of cancellation are counted in `skipped`.
#[derive(Debug, Clone, Default)]
pub struct ZoomLevelReport {
    /// Zoom level of the batch.
    pub zoom: u8,
    /// Number of tiles in the batch.
    pub requested: usize,
    /// Number of tiles downloaded and written.
    pub succeeded: usize,
    /// Tiles that failed, in completion order.
    pub failed: Vec<FailedTile>,
    /// Tiles never attempted because the batch was cancelled.
    pub skipped: usize,
    /// Total bytes written for successful tiles.
    pub bytes_downloaded: u64,
    /// Whether cancellation stopped the batch early.
    pub was_cancelled: bool,
    /// Wall-clock duration of the batch.
    pub elapsed: Duration,
}

impl ZoomLevelReport {
    /// Creates an empty report for a batch of `requested` tiles.
    pub fn new(zoom: u8, requested: usize) -> Self {
        Self {
            zoom,
            requested,
            ..Default::default()
        }
    }

    /// Folds one tile result into the report.
    pub fn record(&mut self, result: DownloadResult) {
        match result.outcome {
            TileOutcome::Success { bytes } => {
                self.succeeded += 1;
                self.bytes_downloaded += bytes as u64;
            }
            TileOutcome::Failure { kind, reason } => {
                self.failed.push(FailedTile {
                    tile: result.tile,
                    kind,
                    reason,
                });
            }
        }
    }

    /// Number of tiles that reached a terminal state.
    pub fn attempted(&self) -> usize {
        self.succeeded + self.failed.len()
    }

    pub fn failure_count(&self) -> usize {
        self.failed.len()
    }

    /// True when every requested tile was downloaded.
    pub fn is_complete(&self) -> bool {
        self.succeeded == self.requested
    }
}
