//! Live progress counters for concurrent downloads.
//!
//! Workers finish in arbitrary order, so progress is tracked with atomic
//! counters that the UI can poll or receive through a callback.

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;

/// Point-in-time view of the counters for the current batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressSnapshot {
    /// Zoom level of the batch in progress.
    pub zoom: u8,
    /// Tiles that finished successfully.
    pub completed: usize,
    /// Tiles that failed.
    pub failed: usize,
    /// Tiles in the batch.
    pub total: usize,
    /// Bytes written so far.
    pub bytes: u64,
}

impl ProgressSnapshot {
    /// Tiles that reached a terminal state.
    pub fn finished(&self) -> usize {
        self.completed + self.failed
    }
}

/// Progress callback invoked after every tile completes.
pub type ProgressCallback = Arc<dyn Fn(ProgressSnapshot) + Send + Sync>;

/// Shared progress counters for one batch at a time.
#[derive(Debug, Default)]
pub struct ProgressCounters {
    zoom: AtomicUsize,
    completed: AtomicUsize,
    failed: AtomicUsize,
    total: AtomicUsize,
    bytes: AtomicU64,
}

impl ProgressCounters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reset the counters for a new batch.
    pub fn start_batch(&self, zoom: u8, total: usize) {
        self.zoom.store(zoom as usize, Ordering::SeqCst);
        self.total.store(total, Ordering::SeqCst);
        self.completed.store(0, Ordering::SeqCst);
        self.failed.store(0, Ordering::SeqCst);
        self.bytes.store(0, Ordering::SeqCst);
    }

    /// Record a successful tile.
    pub fn record_success(&self, bytes: u64) {
        self.bytes.fetch_add(bytes, Ordering::SeqCst);
        self.completed.fetch_add(1, Ordering::SeqCst);
    }

    /// Record a failed tile.
    pub fn record_failure(&self) {
        self.failed.fetch_add(1, Ordering::SeqCst);
    }

    pub fn snapshot(&self) -> ProgressSnapshot {
        ProgressSnapshot {
            zoom: self.zoom.load(Ordering::SeqCst) as u8,
            completed: self.completed.load(Ordering::SeqCst),
            failed: self.failed.load(Ordering::SeqCst),
            total: self.total.load(Ordering::SeqCst),
            bytes: self.bytes.load(Ordering::SeqCst),
        }
    }
}
