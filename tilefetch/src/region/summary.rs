//! Whole-run results.

use std::time::Duration;

use crate::fetch::ZoomLevelReport;
use crate::manifest::RegionManifest;

/// Outcome of a region download across all zoom levels.
#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    /// Region name.
    pub name: String,
    /// One report per processed zoom level, in ascending zoom order.
    pub levels: Vec<ZoomLevelReport>,
    /// The manifest that was written, if the run was not cancelled.
    pub manifest: Option<RegionManifest>,
    /// Whether cancellation stopped the run early.
    pub was_cancelled: bool,
    /// Wall-clock duration of the run.
    pub elapsed: Duration,
}

impl RunSummary {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn total_requested(&self) -> usize {
        self.levels.iter().map(|l| l.requested).sum()
    }

    pub fn total_succeeded(&self) -> usize {
        self.levels.iter().map(|l| l.succeeded).sum()
    }

    pub fn total_failed(&self) -> usize {
        self.levels.iter().map(|l| l.failure_count()).sum()
    }

    pub fn total_skipped(&self) -> usize {
        self.levels.iter().map(|l| l.skipped).sum()
    }

    pub fn total_bytes(&self) -> u64 {
        self.levels.iter().map(|l| l.bytes_downloaded).sum()
    }

    /// True when every level ran and every tile was downloaded.
    pub fn is_complete(&self) -> bool {
        !self.was_cancelled && self.levels.iter().all(|l| l.is_complete())
    }
}
