//! Zoom-level sequencing for a region download.

use std::sync::Arc;
use std::time::Instant;

use tracing::{info, warn};

use crate::coord::{box_to_tile_rect, BoundingBox, CoordError, TileCoord, TileRect, ZoomRange};
use crate::fetch::{TileFetcher, ZoomLevelReport};
use crate::manifest::{write_manifest, RegionManifest};
use crate::provider::{AsyncHttpClient, TileSource};
use crate::sink::TileSink;

use super::error::RegionResult;
use super::summary::RunSummary;

/// What to download.
#[derive(Debug, Clone, PartialEq)]
pub struct RegionRequest {
    pub name: String,
    pub bbox: BoundingBox,
    pub zooms: ZoomRange,
}

impl RegionRequest {
    pub fn new(name: impl Into<String>, bbox: BoundingBox, zooms: ZoomRange) -> Self {
        Self {
            name: name.into(),
            bbox,
            zooms,
        }
    }
}

/// Per-level notifications for display.
#[derive(Debug)]
pub enum LevelEvent<'a> {
    /// A level is about to be downloaded.
    Started(&'a TileRect),
    /// A level finished (or was cut short by cancellation).
    Finished(&'a ZoomLevelReport),
}

/// Callback invoked at the start and end of every zoom level.
pub type LevelCallback = Arc<dyn Fn(LevelEvent<'_>) + Send + Sync>;

/// Projects the box at every zoom level in the range.
///
/// All levels are projected before anything is downloaded so that an
/// invalid coordinate fails the run up front.
pub fn plan_levels(bbox: &BoundingBox, zooms: &ZoomRange) -> Result<Vec<TileRect>, CoordError> {
    zooms
        .levels()
        .map(|zoom| box_to_tile_rect(bbox, zoom))
        .collect()
}

/// Downloads a region one zoom level at a time.
///
/// Levels run sequentially; the tiles of a level run in parallel through
/// the shared [`TileFetcher`], which is reused for every level.
pub struct RegionDownloader<C, P, S>
where
    C: AsyncHttpClient,
    P: TileSource,
    S: TileSink,
{
    fetcher: TileFetcher<C, P>,
    sink: S,
    on_level: Option<LevelCallback>,
}

impl<C, P, S> RegionDownloader<C, P, S>
where
    C: AsyncHttpClient,
    P: TileSource,
    S: TileSink,
{
    pub fn new(fetcher: TileFetcher<C, P>, sink: S) -> Self {
        Self {
            fetcher,
            sink,
            on_level: None,
        }
    }

    /// Register a callback for level start/finish events.
    pub fn with_level_callback(mut self, callback: LevelCallback) -> Self {
        self.on_level = Some(callback);
        self
    }

    pub fn fetcher(&self) -> &TileFetcher<C, P> {
        &self.fetcher
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Downloads every level of the request, then writes the manifest.
    ///
    /// Tile failures never abort the run; the manifest is written even if
    /// every tile failed. A cancelled run stops after the level in progress
    /// and writes no manifest, even when cancellation arrives after the last
    /// level finished.
    pub async fn run(&self, request: &RegionRequest) -> RegionResult<RunSummary> {
        let start = Instant::now();
        let plan = plan_levels(&request.bbox, &request.zooms)?;
        let mut summary = RunSummary::new(request.name.clone());

        info!(
            name = %request.name,
            bbox = %request.bbox,
            min_zoom = request.zooms.min(),
            max_zoom = request.zooms.max(),
            source = self.fetcher.source().name(),
            "Starting region download"
        );

        for rect in &plan {
            if self.fetcher.is_cancelled() {
                summary.was_cancelled = true;
                break;
            }

            self.notify(LevelEvent::Started(rect));
            info!(
                zoom = rect.zoom,
                start_x = rect.min_x,
                start_y = rect.min_y,
                end_x = rect.max_x,
                end_y = rect.max_y,
                tiles = rect.tile_count(),
                "Processing zoom level"
            );

            let report = if rect.is_empty() {
                info!(zoom = rect.zoom, "Zero tiles at this zoom level");
                ZoomLevelReport::new(rect.zoom, 0)
            } else {
                let tiles: Vec<TileCoord> = rect.tiles().collect();
                self.fetcher.fetch_batch(&tiles, &self.sink).await
            };

            info!(
                zoom = report.zoom,
                succeeded = report.succeeded,
                requested = report.requested,
                "Completed zoom level"
            );
            self.notify(LevelEvent::Finished(&report));

            summary.was_cancelled |= report.was_cancelled;
            summary.levels.push(report);
        }

        // Interrupted after the last tile was submitted
        if self.fetcher.is_cancelled() {
            summary.was_cancelled = true;
        }

        if summary.was_cancelled {
            warn!(
                levels_done = summary.levels.len(),
                levels_planned = plan.len(),
                skipped = summary.total_skipped(),
                "Region download cancelled, manifest not written"
            );
        } else {
            let manifest = RegionManifest::new(&request.name, &request.bbox, &request.zooms);
            write_manifest(&self.sink, &manifest).await?;
            summary.manifest = Some(manifest);
        }

        summary.elapsed = start.elapsed();
        info!(
            succeeded = summary.total_succeeded(),
            requested = summary.total_requested(),
            failed = summary.total_failed(),
            elapsed_ms = summary.elapsed.as_millis() as u64,
            "Region download finished"
        );

        Ok(summary)
    }

    fn notify(&self, event: LevelEvent<'_>) {
        if let Some(ref cb) = self.on_level {
            cb(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::FetcherConfig;
    use crate::manifest::{RegionManifest, MANIFEST_FILENAME};
    use crate::provider::{MockAsyncHttpClient, ProviderError, StyleTileSource};
    use crate::region::RegionError;
    use crate::sink::MemorySink;
    use parking_lot::Mutex;
    use tokio_util::sync::CancellationToken;

    fn tel_aviv(min: u8, max: u8) -> RegionRequest {
        RegionRequest::new(
            "Tel Aviv",
            BoundingBox::new(32.10, 32.07, 34.80, 34.76),
            ZoomRange::new(min, max).unwrap(),
        )
    }

    fn downloader(
        response: Result<Vec<u8>, ProviderError>,
    ) -> RegionDownloader<MockAsyncHttpClient, StyleTileSource, MemorySink> {
        let fetcher = TileFetcher::new(
            MockAsyncHttpClient { response },
            StyleTileSource::default(),
            FetcherConfig::new().with_concurrency(4),
        )
        .unwrap();
        RegionDownloader::new(fetcher, MemorySink::new())
    }

    #[test]
    fn test_plan_levels_tel_aviv() {
        let request = tel_aviv(1, 2);
        let plan = plan_levels(&request.bbox, &request.zooms).unwrap();

        assert_eq!(plan.len(), 2);
        assert_eq!(plan[0].tiles().collect::<Vec<_>>(), vec![TileCoord::new(1, 0, 1)]);
        assert_eq!(plan[1].tiles().collect::<Vec<_>>(), vec![TileCoord::new(2, 1, 2)]);
    }

    #[test]
    fn test_plan_levels_rejects_polar_box() {
        let bbox = BoundingBox::new(89.0, 10.0, 20.0, 10.0);
        let result = plan_levels(&bbox, &ZoomRange::new(0, 3).unwrap());
        assert!(matches!(result, Err(CoordError::InvalidLatitude(_))));
    }

    #[tokio::test]
    async fn test_run_tel_aviv() {
        let downloader = downloader(Ok(vec![0u8; 64]));

        let summary = downloader.run(&tel_aviv(1, 2)).await.unwrap();

        assert_eq!(summary.levels.len(), 2);
        assert_eq!(summary.total_requested(), 2);
        assert_eq!(summary.total_succeeded(), 2);
        assert!(summary.is_complete());

        let sink = downloader.sink();
        assert!(sink.contains("tile-1-1-0.png"));
        assert!(sink.contains("tile-2-2-1.png"));

        let manifest = RegionManifest::from_json(&sink.get(MANIFEST_FILENAME).unwrap()).unwrap();
        assert_eq!(manifest.name, "Tel Aviv");
        assert_eq!((manifest.min_zoom, manifest.max_zoom), (1, 2));
        assert_eq!(summary.manifest, Some(manifest));
    }

    #[tokio::test]
    async fn test_run_writes_manifest_when_every_tile_fails() {
        let downloader = downloader(Err(ProviderError::HttpStatus {
            status: 503,
            url: "https://example.com".to_string(),
        }));

        let summary = downloader.run(&tel_aviv(1, 3)).await.unwrap();

        assert_eq!(summary.total_succeeded(), 0);
        assert_eq!(summary.total_failed(), summary.total_requested());
        assert!(summary.manifest.is_some());
        assert_eq!(downloader.sink().names(), vec![MANIFEST_FILENAME.to_string()]);
    }

    #[tokio::test]
    async fn test_run_reversed_box_downloads_nothing() {
        let downloader = downloader(Ok(vec![1]));
        let request = RegionRequest::new(
            "reversed",
            BoundingBox::new(32.07, 32.10, 34.80, 34.76),
            ZoomRange::new(10, 12).unwrap(),
        );

        let summary = downloader.run(&request).await.unwrap();

        assert_eq!(summary.levels.len(), 3);
        assert!(summary.levels.iter().all(|l| l.requested == 0));
        assert_eq!(summary.levels[0].zoom, 10);
        assert_eq!(downloader.sink().len(), 1);
    }

    #[tokio::test]
    async fn test_run_invalid_latitude_fails_before_downloading() {
        let downloader = downloader(Ok(vec![1]));
        let request = RegionRequest::new(
            "polar",
            BoundingBox::new(86.0, 80.0, 10.0, 0.0),
            ZoomRange::new(1, 2).unwrap(),
        );

        let result = downloader.run(&request).await;

        assert!(matches!(
            result,
            Err(RegionError::Coord(CoordError::InvalidLatitude(_)))
        ));
        assert!(downloader.sink().is_empty());
    }

    #[tokio::test]
    async fn test_run_cancelled_writes_no_manifest() {
        let token = CancellationToken::new();
        token.cancel();
        let fetcher = TileFetcher::new(
            MockAsyncHttpClient {
                response: Ok(vec![1]),
            },
            StyleTileSource::default(),
            FetcherConfig::new(),
        )
        .unwrap()
        .with_cancellation(token);
        let downloader = RegionDownloader::new(fetcher, MemorySink::new());

        let summary = downloader.run(&tel_aviv(1, 4)).await.unwrap();

        assert!(summary.was_cancelled);
        assert!(summary.levels.is_empty());
        assert!(summary.manifest.is_none());
        assert!(downloader.sink().is_empty());
    }

    #[tokio::test]
    async fn test_cancel_after_last_level_writes_no_manifest() {
        let token = CancellationToken::new();
        let fetcher = TileFetcher::new(
            MockAsyncHttpClient {
                response: Ok(vec![1]),
            },
            StyleTileSource::default(),
            FetcherConfig::new(),
        )
        .unwrap()
        .with_cancellation(token.clone());
        let downloader = RegionDownloader::new(fetcher, MemorySink::new()).with_level_callback(
            Arc::new(move |event: LevelEvent<'_>| {
                if let LevelEvent::Finished(report) = event {
                    if report.zoom == 2 {
                        token.cancel();
                    }
                }
            }),
        );

        let summary = downloader.run(&tel_aviv(1, 2)).await.unwrap();

        assert!(summary.was_cancelled);
        assert_eq!(summary.levels.len(), 2);
        assert!(summary.levels.iter().all(|l| l.skipped == 0));
        assert!(summary.manifest.is_none());
        assert!(!downloader.sink().contains(MANIFEST_FILENAME));
        assert_eq!(downloader.sink().len(), 2);
    }

    #[tokio::test]
    async fn test_level_events_in_order() {
        let events = Arc::new(Mutex::new(Vec::new()));
        let recorded = Arc::clone(&events);
        let downloader = downloader(Ok(vec![1])).with_level_callback(Arc::new(move |event: LevelEvent<'_>| {
            let entry = match event {
                LevelEvent::Started(rect) => format!("start {}", rect.zoom),
                LevelEvent::Finished(report) => {
                    format!("done {} {}/{}", report.zoom, report.succeeded, report.requested)
                }
            };
            recorded.lock().push(entry);
        }));

        downloader.run(&tel_aviv(1, 2)).await.unwrap();

        assert_eq!(
            *events.lock(),
            vec!["start 1", "done 1 1/1", "start 2", "done 2 1/1"]
        );
    }
}
