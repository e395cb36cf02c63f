//! Region download orchestration.
//!
//! A region is a bounding box plus a zoom range. [`RegionDownloader`]
//! projects the box at every level, downloads each level as one batch, and
//! writes the region manifest once all levels are done.

mod downloader;
mod error;
mod summary;

pub use downloader::{plan_levels, LevelCallback, LevelEvent, RegionDownloader, RegionRequest};
pub use error::{RegionError, RegionResult};
pub use summary::RunSummary;
