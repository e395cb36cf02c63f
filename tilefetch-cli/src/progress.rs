//! Terminal progress output for a region download.
//!
//! Each zoom level prints its tile rectangle and a completion line. On a
//! TTY a progress bar tracks the level in between.

use std::sync::Arc;

use indicatif::{ProgressBar, ProgressStyle};
use parking_lot::Mutex;

use tilefetch::coord::TileRect;
use tilefetch::fetch::{ProgressCallback, ProgressSnapshot, ZoomLevelReport};
use tilefetch::region::{LevelCallback, LevelEvent};

const BAR_TEMPLATE: &str = "  [{bar:40.cyan/blue}] {pos}/{len} tiles ({per_sec}) {msg}";

/// Prints level headers and drives a per-level progress bar.
pub struct ProgressDisplay {
    interactive: bool,
    bar: Mutex<Option<ProgressBar>>,
}

impl ProgressDisplay {
    pub fn new(interactive: bool) -> Arc<Self> {
        Arc::new(Self {
            interactive,
            bar: Mutex::new(None),
        })
    }

    /// Callback for [`RegionDownloader::with_level_callback`](tilefetch::region::RegionDownloader::with_level_callback).
    pub fn level_callback(self: &Arc<Self>) -> LevelCallback {
        let display = Arc::clone(self);
        Arc::new(move |event: LevelEvent<'_>| display.on_level(event))
    }

    /// Callback for [`TileFetcher::with_progress`](tilefetch::fetch::TileFetcher::with_progress).
    pub fn progress_callback(self: &Arc<Self>) -> ProgressCallback {
        let display = Arc::clone(self);
        Arc::new(move |snapshot: ProgressSnapshot| display.on_progress(snapshot))
    }

    fn on_level(&self, event: LevelEvent<'_>) {
        match event {
            LevelEvent::Started(rect) => {
                println!();
                println!("{}", level_header(rect));
                if !rect.is_empty() {
                    *self.bar.lock() = Some(self.new_bar(rect.tile_count()));
                }
            }
            LevelEvent::Finished(report) => {
                if let Some(bar) = self.bar.lock().take() {
                    bar.finish_and_clear();
                }
                println!("{}", level_footer(report));
            }
        }
    }

    fn on_progress(&self, snapshot: ProgressSnapshot) {
        if let Some(ref bar) = *self.bar.lock() {
            bar.set_position(snapshot.finished() as u64);
            if snapshot.failed > 0 {
                bar.set_message(format!("{} failed", snapshot.failed));
            }
        }
    }

    fn new_bar(&self, len: u64) -> ProgressBar {
        if !self.interactive {
            return ProgressBar::hidden();
        }
        let style = ProgressStyle::with_template(BAR_TEMPLATE)
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=> ");
        ProgressBar::new(len).with_style(style)
    }
}

/// Lines printed before a level starts.
pub fn level_header(rect: &TileRect) -> String {
    format!(
        "Processing zoom level {zoom}\n\
         start x tile: {}, start y tile: {}\n\
         end x tile: {}, end y tile: {}\n\
         Downloading {} tiles for zoom level {zoom}",
        rect.min_x,
        rect.min_y,
        rect.max_x,
        rect.max_y,
        rect.tile_count(),
        zoom = rect.zoom,
    )
}

/// Line printed when a level finishes.
pub fn level_footer(report: &ZoomLevelReport) -> String {
    let mut line = format!(
        "Completed zoom level {}: {}/{} tiles downloaded",
        report.zoom, report.succeeded, report.requested
    );
    if report.failure_count() > 0 {
        line.push_str(&format!(" ({} failed)", report.failure_count()));
    }
    if report.skipped > 0 {
        line.push_str(&format!(" ({} skipped)", report.skipped));
    }
    line
}

/// Human-readable byte count.
pub fn format_bytes(bytes: u64) -> String {
    const KB: f64 = 1024.0;
    const MB: f64 = KB * 1024.0;
    const GB: f64 = MB * 1024.0;

    let b = bytes as f64;
    if b >= GB {
        format!("{:.1} GB", b / GB)
    } else if b >= MB {
        format!("{:.1} MB", b / MB)
    } else if b >= KB {
        format!("{:.1} KB", b / KB)
    } else {
        format!("{} B", bytes)
    }
}
