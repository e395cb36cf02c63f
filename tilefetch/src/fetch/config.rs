//! Fetcher configuration.

use std::time::Duration;

/// Default number of concurrent downloads.
pub const DEFAULT_CONCURRENCY: usize = 8;

/// Default number of retries per tile (a single attempt).
pub const DEFAULT_MAX_RETRIES: u32 = 0;

/// Default delay before the first retry, in milliseconds.
pub const DEFAULT_RETRY_BACKOFF_MS: u64 = 1000;

/// Default HTTP request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Configuration for the tile fetcher.
///
/// # Example
///
/// ```
/// use tilefetch::fetch::FetcherConfig;
///
/// // Using defaults
/// let config = FetcherConfig::default();
/// assert_eq!(config.concurrency(), 8);
/// assert_eq!(config.max_retries(), 0);
///
/// // Custom configuration
/// let config = FetcherConfig::new()
///     .with_concurrency(16)
///     .with_max_retries(2)
///     .with_timeout_secs(10);
/// assert_eq!(config.concurrency(), 16);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetcherConfig {
    /// Maximum number of simultaneous in-flight downloads
    concurrency: usize,
    /// Extra attempts after a failed download (0 = exactly one attempt)
    max_retries: u32,
    /// Base delay between attempts, multiplied by the attempt number
    retry_backoff: Duration,
    /// Per-request timeout in seconds
    timeout_secs: u64,
}

impl FetcherConfig {
    /// Create a new fetcher configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the maximum number of concurrent downloads.
    ///
    /// Must be at least 1; [`TileFetcher::new`](super::TileFetcher::new)
    /// rejects 0.
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency;
        self
    }

    /// Set the number of retries after a failed download.
    ///
    /// Storage failures are never retried.
    pub fn with_max_retries(mut self, retries: u32) -> Self {
        self.max_retries = retries;
        self
    }

    /// Set the base retry delay.
    pub fn with_retry_backoff(mut self, backoff: Duration) -> Self {
        self.retry_backoff = backoff;
        self
    }

    /// Set the per-request timeout in seconds.
    pub fn with_timeout_secs(mut self, timeout: u64) -> Self {
        self.timeout_secs = timeout;
        self
    }

    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    pub fn retry_backoff(&self) -> Duration {
        self.retry_backoff
    }

    pub fn timeout_secs(&self) -> u64 {
        self.timeout_secs
    }

    /// Delay before the given retry attempt (1-based).
    pub fn backoff_for(&self, attempt: u32) -> Duration {
        self.retry_backoff.saturating_mul(attempt)
    }
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            concurrency: DEFAULT_CONCURRENCY,
            max_retries: DEFAULT_MAX_RETRIES,
            retry_backoff: Duration::from_millis(DEFAULT_RETRY_BACKOFF_MS),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}
