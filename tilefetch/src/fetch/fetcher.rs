//! Sliding-window tile fetcher.
//!
//! The fetcher keeps up to `concurrency` tile downloads in flight:
//! 1. Fill the window from the tile list
//! 2. As each download completes, fold its result into the report and
//!    submit the next tile (unless cancelled)
//! 3. Return once every submitted tile reached a terminal state
//!
//! Results are collected by the single controlling task, so report counts
//! are exact regardless of completion order.

use std::sync::Arc;
use std::time::Instant;

use futures::stream::{FuturesUnordered, StreamExt};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::coord::TileCoord;
use crate::provider::{AsyncHttpClient, TileSource};
use crate::sink::TileSink;

use super::config::FetcherConfig;
use super::error::FetchError;
use super::progress::{ProgressCallback, ProgressCounters};
use super::report::{DownloadResult, FailureKind, TileOutcome, ZoomLevelReport};

/// Downloads batches of tiles with bounded parallelism.
///
/// One fetcher (and its HTTP connection pool) is created per run and reused
/// for every zoom level; each call to [`TileFetcher::fetch_batch`] is one
/// level.
pub struct TileFetcher<C, P>
where
    C: AsyncHttpClient,
    P: TileSource,
{
    client: C,
    source: P,
    config: FetcherConfig,
    cancellation: CancellationToken,
    counters: Arc<ProgressCounters>,
    on_progress: Option<ProgressCallback>,
}

impl<C, P> TileFetcher<C, P>
where
    C: AsyncHttpClient,
    P: TileSource,
{
    /// Creates a fetcher.
    ///
    /// Fails if the configured concurrency is 0.
    pub fn new(client: C, source: P, config: FetcherConfig) -> Result<Self, FetchError> {
        if config.concurrency() == 0 {
            return Err(FetchError::InvalidConcurrency(0));
        }

        Ok(Self {
            client,
            source,
            config,
            cancellation: CancellationToken::new(),
            counters: Arc::new(ProgressCounters::new()),
            on_progress: None,
        })
    }

    /// Use an external cancellation token.
    ///
    /// The token is checked before each new request; requests already in
    /// flight are allowed to finish.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = token;
        self
    }

    /// Register a callback invoked after every tile completes.
    pub fn with_progress(mut self, callback: ProgressCallback) -> Self {
        self.on_progress = Some(callback);
        self
    }

    pub fn config(&self) -> &FetcherConfig {
        &self.config
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    pub fn source(&self) -> &P {
        &self.source
    }

    /// Shared counters for the batch in progress.
    pub fn counters(&self) -> Arc<ProgressCounters> {
        Arc::clone(&self.counters)
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancellation.is_cancelled()
    }

    /// Downloads every tile in `tiles` and writes it to `sink`.
    ///
    /// Each tile is attempted once (plus any configured retries). Download
    /// and storage failures are recorded in the returned report; they never
    /// abort the batch.
    pub async fn fetch_batch<S: TileSink>(&self, tiles: &[TileCoord], sink: &S) -> ZoomLevelReport {
        let start = Instant::now();
        let zoom = tiles.first().map_or(0, |t| t.zoom);
        let mut report = ZoomLevelReport::new(zoom, tiles.len());
        self.counters.start_batch(zoom, tiles.len());

        if tiles.is_empty() {
            return report;
        }

        let mut pending = FuturesUnordered::new();
        let mut remaining = tiles.iter().copied();

        loop {
            // Top up the window
            while pending.len() < self.config.concurrency() && !self.cancellation.is_cancelled() {
                match remaining.next() {
                    Some(tile) => pending.push(self.fetch_tile(tile, sink)),
                    None => break,
                }
            }

            match pending.next().await {
                Some(result) => self.record(&mut report, result),
                None => break,
            }
        }

        // The window is drained, so anything unattempted was never submitted
        report.skipped = report.requested - report.attempted();
        report.was_cancelled = report.skipped > 0;
        report.elapsed = start.elapsed();

        if report.was_cancelled {
            info!(
                zoom,
                succeeded = report.succeeded,
                failed = report.failure_count(),
                skipped = report.skipped,
                "Batch cancelled"
            );
        } else {
            debug!(
                zoom,
                succeeded = report.succeeded,
                failed = report.failure_count(),
                elapsed_ms = report.elapsed.as_millis() as u64,
                "Batch complete"
            );
        }

        report
    }

    fn record(&self, report: &mut ZoomLevelReport, result: DownloadResult) {
        match &result.outcome {
            TileOutcome::Success { bytes } => {
                self.counters.record_success(*bytes as u64);
            }
            TileOutcome::Failure { .. } => {
                self.counters.record_failure();
            }
        }
        report.record(result);

        if let Some(ref cb) = self.on_progress {
            cb(self.counters.snapshot());
        }
    }

    /// Downloads and stores a single tile.
    async fn fetch_tile<S: TileSink>(&self, tile: TileCoord, sink: &S) -> DownloadResult {
        let url = self.source.tile_url(&tile);
        let filename = tile.filename();
        let mut attempt = 0u32;

        let bytes = loop {
            match self.client.get(&url).await {
                Ok(bytes) => break bytes,
                Err(e) if attempt < self.config.max_retries() => {
                    attempt += 1;
                    let delay = self.config.backoff_for(attempt);
                    debug!(
                        tile = %tile,
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        error = %e,
                        "Retrying tile download"
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(e) => {
                    warn!(file = %filename, error = %e, "Failed to download tile");
                    return DownloadResult::failure(tile, FailureKind::Download, e.to_string());
                }
            }
        };

        match sink.write_file(&filename, &bytes).await {
            Ok(()) => {
                debug!(file = %filename, bytes = bytes.len(), "Downloaded tile");
                DownloadResult::success(tile, bytes.len())
            }
            Err(e) => {
                warn!(file = %filename, error = %e, "Failed to store tile");
                DownloadResult::failure(tile, FailureKind::Storage, e.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::ProgressSnapshot;
    use crate::provider::{MockAsyncHttpClient, ProviderError, StyleTileSource};
    use crate::sink::{MemorySink, SinkError};
    use parking_lot::Mutex;
    use std::collections::{HashMap, HashSet};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    /// Deterministic transport: fails a fixed set of URLs, tracks concurrency.
    struct ScriptedClient {
        failing: HashSet<String>,
        delay: Duration,
        calls: AtomicUsize,
        in_flight: AtomicUsize,
        max_in_flight: AtomicUsize,
    }

    impl ScriptedClient {
        fn new(failing: HashSet<String>, delay: Duration) -> Self {
            Self {
                failing,
                delay,
                calls: AtomicUsize::new(0),
                in_flight: AtomicUsize::new(0),
                max_in_flight: AtomicUsize::new(0),
            }
        }
    }

    impl AsyncHttpClient for ScriptedClient {
        async fn get(&self, url: &str) -> Result<Vec<u8>, ProviderError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_in_flight.fetch_max(now, Ordering::SeqCst);

            tokio::time::sleep(self.delay).await;

            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            if self.failing.contains(url) {
                Err(ProviderError::HttpStatus {
                    status: 404,
                    url: url.to_string(),
                })
            } else {
                Ok(url.as_bytes().to_vec())
            }
        }
    }

    /// Fails the first `failures` requests for every URL.
    struct FlakyClient {
        failures: u32,
        seen: Mutex<HashMap<String, u32>>,
        calls: AtomicUsize,
    }

    impl AsyncHttpClient for FlakyClient {
        async fn get(&self, url: &str) -> Result<Vec<u8>, ProviderError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let attempt = {
                let mut seen = self.seen.lock();
                let count = seen.entry(url.to_string()).or_insert(0);
                *count += 1;
                *count
            };
            if attempt <= self.failures {
                Err(ProviderError::HttpError("connection reset".to_string()))
            } else {
                Ok(vec![1, 2, 3])
            }
        }
    }

    /// Sink that refuses every write.
    struct FullDiskSink;

    impl TileSink for FullDiskSink {
        async fn write_file(&self, name: &str, _bytes: &[u8]) -> Result<(), SinkError> {
            Err(SinkError::WriteFailed {
                path: name.into(),
                source: std::io::Error::new(std::io::ErrorKind::Other, "No space left on device"),
            })
        }
    }

    fn grid(zoom: u8, size: u32) -> Vec<TileCoord> {
        (0..size)
            .flat_map(|x| (0..size).map(move |y| TileCoord::new(x, y, zoom)))
            .collect()
    }

    fn ok_client() -> MockAsyncHttpClient {
        MockAsyncHttpClient {
            response: Ok(vec![0u8; 16]),
        }
    }

    #[test]
    fn test_zero_concurrency_rejected() {
        let result = TileFetcher::new(
            ok_client(),
            StyleTileSource::default(),
            FetcherConfig::new().with_concurrency(0),
        );
        assert!(matches!(result, Err(FetchError::InvalidConcurrency(0))));
    }

    #[tokio::test]
    async fn test_single_tile_success() {
        let fetcher =
            TileFetcher::new(ok_client(), StyleTileSource::default(), FetcherConfig::new())
                .unwrap();
        let sink = MemorySink::new();

        let report = fetcher
            .fetch_batch(&[TileCoord::new(1, 0, 1)], &sink)
            .await;

        assert_eq!(report.zoom, 1);
        assert_eq!(report.requested, 1);
        assert_eq!(report.succeeded, 1);
        assert!(report.failed.is_empty());
        assert_eq!(report.bytes_downloaded, 16);
        assert!(sink.contains("tile-1-1-0.png"));
    }

    #[tokio::test]
    async fn test_empty_batch() {
        let fetcher =
            TileFetcher::new(ok_client(), StyleTileSource::default(), FetcherConfig::new())
                .unwrap();
        let sink = MemorySink::new();

        let report = fetcher.fetch_batch(&[], &sink).await;

        assert_eq!(report.requested, 0);
        assert_eq!(report.attempted(), 0);
        assert!(sink.is_empty());
    }

    #[tokio::test]
    async fn test_all_failures_do_not_abort_batch() {
        let client = MockAsyncHttpClient {
            response: Err(ProviderError::Timeout("http://x".to_string())),
        };
        let fetcher =
            TileFetcher::new(client, StyleTileSource::default(), FetcherConfig::new()).unwrap();
        let sink = MemorySink::new();
        let tiles = grid(4, 3);

        let report = fetcher.fetch_batch(&tiles, &sink).await;

        assert_eq!(report.succeeded, 0);
        assert_eq!(report.failure_count(), 9);
        assert!(report
            .failed
            .iter()
            .all(|f| f.kind == FailureKind::Download && f.reason.contains("timed out")));
        assert!(sink.is_empty());
    }

    #[tokio::test]
    async fn test_counts_sum_to_requested_with_mixed_outcomes() {
        let source = StyleTileSource::default();
        let tiles = grid(6, 5);
        let failing: HashSet<String> = tiles
            .iter()
            .filter(|t| (t.x + 2 * t.y) % 3 == 0)
            .map(|t| source.tile_url(t))
            .collect();
        let expected_failures = failing.len();

        let client = ScriptedClient::new(failing, Duration::from_millis(1));
        let fetcher =
            TileFetcher::new(client, source, FetcherConfig::new().with_concurrency(4)).unwrap();
        let sink = MemorySink::new();

        let report = fetcher.fetch_batch(&tiles, &sink).await;

        assert_eq!(report.succeeded + report.failed.len(), tiles.len());
        assert_eq!(report.failure_count(), expected_failures);
        assert_eq!(sink.len(), report.succeeded);
        assert_eq!(report.skipped, 0);
        assert!(!report.was_cancelled);
    }

    #[tokio::test]
    async fn test_concurrency_limit_respected() {
        let client = ScriptedClient::new(HashSet::new(), Duration::from_millis(5));
        let fetcher = TileFetcher::new(
            client,
            StyleTileSource::default(),
            FetcherConfig::new().with_concurrency(3),
        )
        .unwrap();
        let sink = MemorySink::new();

        let report = fetcher.fetch_batch(&grid(5, 4), &sink).await;

        assert_eq!(report.succeeded, 16);
        let max = fetcher.client.max_in_flight.load(Ordering::SeqCst);
        assert!(max <= 3, "max in flight {} exceeds limit", max);
        assert!(max >= 2, "downloads should overlap, max in flight {}", max);
    }

    #[tokio::test]
    async fn test_concurrency_one_and_n_agree() {
        let source = StyleTileSource::default();
        let tiles = grid(7, 6);
        let failing: HashSet<String> = tiles
            .iter()
            .filter(|t| t.x == t.y || t.x == 5)
            .map(|t| source.tile_url(t))
            .collect();

        let mut outcomes = Vec::new();
        for concurrency in [1, 8] {
            let client = ScriptedClient::new(failing.clone(), Duration::from_millis(1));
            let fetcher = TileFetcher::new(
                client,
                source.clone(),
                FetcherConfig::new().with_concurrency(concurrency),
            )
            .unwrap();
            let sink = MemorySink::new();
            let report = fetcher.fetch_batch(&tiles, &sink).await;

            let mut failed: Vec<TileCoord> = report.failed.iter().map(|f| f.tile).collect();
            failed.sort();
            outcomes.push((sink.names(), failed));
        }

        assert_eq!(outcomes[0], outcomes[1]);
    }

    #[tokio::test]
    async fn test_storage_failure_is_per_tile_and_not_retried() {
        let client = FlakyClient {
            failures: 0,
            seen: Mutex::new(HashMap::new()),
            calls: AtomicUsize::new(0),
        };
        let fetcher = TileFetcher::new(
            client,
            StyleTileSource::default(),
            FetcherConfig::new()
                .with_max_retries(3)
                .with_retry_backoff(Duration::ZERO),
        )
        .unwrap();

        let report = fetcher.fetch_batch(&grid(2, 2), &FullDiskSink).await;

        assert_eq!(report.failure_count(), 4);
        assert!(report
            .failed
            .iter()
            .all(|f| f.kind == FailureKind::Storage));
        assert_eq!(fetcher.client.calls.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn test_no_retry_by_default() {
        let client = FlakyClient {
            failures: 1,
            seen: Mutex::new(HashMap::new()),
            calls: AtomicUsize::new(0),
        };
        let fetcher =
            TileFetcher::new(client, StyleTileSource::default(), FetcherConfig::new()).unwrap();
        let sink = MemorySink::new();

        let report = fetcher.fetch_batch(&grid(3, 2), &sink).await;

        assert_eq!(report.failure_count(), 4);
        assert_eq!(fetcher.client.calls.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn test_opt_in_retry_recovers() {
        let client = FlakyClient {
            failures: 2,
            seen: Mutex::new(HashMap::new()),
            calls: AtomicUsize::new(0),
        };
        let fetcher = TileFetcher::new(
            client,
            StyleTileSource::default(),
            FetcherConfig::new()
                .with_max_retries(2)
                .with_retry_backoff(Duration::ZERO),
        )
        .unwrap();
        let sink = MemorySink::new();

        let report = fetcher.fetch_batch(&grid(3, 2), &sink).await;

        assert_eq!(report.succeeded, 4);
        assert_eq!(fetcher.client.calls.load(Ordering::SeqCst), 12);
    }

    #[tokio::test]
    async fn test_cancelled_before_start() {
        let token = CancellationToken::new();
        token.cancel();
        let client = ScriptedClient::new(HashSet::new(), Duration::ZERO);
        let fetcher = TileFetcher::new(client, StyleTileSource::default(), FetcherConfig::new())
            .unwrap()
            .with_cancellation(token);
        let sink = MemorySink::new();

        let report = fetcher.fetch_batch(&grid(2, 3), &sink).await;

        assert_eq!(fetcher.client.calls.load(Ordering::SeqCst), 0);
        assert_eq!(report.attempted(), 0);
        assert_eq!(report.skipped, 9);
        assert!(report.was_cancelled);
    }

    #[tokio::test]
    async fn test_cancel_mid_batch_lets_in_flight_finish() {
        let token = CancellationToken::new();
        let cancel = token.clone();
        let client = ScriptedClient::new(HashSet::new(), Duration::from_millis(1));
        let fetcher = TileFetcher::new(
            client,
            StyleTileSource::default(),
            FetcherConfig::new().with_concurrency(1),
        )
        .unwrap()
        .with_cancellation(token)
        .with_progress(Arc::new(move |_: ProgressSnapshot| cancel.cancel()));
        let sink = MemorySink::new();

        let report = fetcher.fetch_batch(&grid(2, 3), &sink).await;

        assert_eq!(report.succeeded, 1);
        assert_eq!(report.skipped, 8);
        assert!(report.was_cancelled);
        assert_eq!(report.attempted() + report.skipped, report.requested);
    }

    #[tokio::test]
    async fn test_progress_callback_sees_every_tile() {
        let seen = Arc::new(AtomicUsize::new(0));
        let seen_clone = Arc::clone(&seen);
        let last = Arc::new(Mutex::new(None));
        let last_clone = Arc::clone(&last);

        let fetcher =
            TileFetcher::new(ok_client(), StyleTileSource::default(), FetcherConfig::new())
                .unwrap()
                .with_progress(Arc::new(move |snap: ProgressSnapshot| {
                    seen_clone.fetch_add(1, Ordering::SeqCst);
                    *last_clone.lock() = Some(snap);
                }));
        let sink = MemorySink::new();

        fetcher.fetch_batch(&grid(9, 3), &sink).await;

        assert_eq!(seen.load(Ordering::SeqCst), 9);
        let snap = (*last.lock()).expect("callback never ran");
        assert_eq!(snap.zoom, 9);
        assert_eq!(snap.finished(), 9);
        assert_eq!(snap.total, 9);
        assert_eq!(fetcher.counters().snapshot(), snap);
    }
}
