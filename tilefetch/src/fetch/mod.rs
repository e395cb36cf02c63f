//! Bounded-concurrency bulk tile download.
//!
//! This module provides the batch download pipeline, including:
//! - Fetcher configuration (`config`)
//! - Per-tile outcomes and per-batch reports (`report`)
//! - Live progress counters shared with the UI (`progress`)
//! - The sliding-window fetcher itself (`fetcher`)
//!
//! # Architecture
//!
//! ```text
//! TileFetcher
//!         │
//!         ├── TileSource      (tile → URL)
//!         ├── AsyncHttpClient (URL → bytes)
//!         ├── TileSink        (bytes → tile-{z}-{x}-{y}.png)
//!         │
//!         ├── ProgressCounters (atomic, shared)
//!         │
//!         └── ZoomLevelReport  (returned per batch)
//! ```
//!
//! Every tile in a batch is attempted exactly once (plus opt-in retries);
//! a failure is recorded in the report and never aborts the batch.

mod config;
mod error;
mod fetcher;
mod progress;
mod report;

pub use config::{
    FetcherConfig, DEFAULT_CONCURRENCY, DEFAULT_MAX_RETRIES, DEFAULT_RETRY_BACKOFF_MS,
    DEFAULT_TIMEOUT_SECS,
};
pub use error::FetchError;
pub use fetcher::TileFetcher;
pub use progress::{ProgressCallback, ProgressCounters, ProgressSnapshot};
pub use report::{DownloadResult, FailedTile, FailureKind, TileOutcome, ZoomLevelReport};
