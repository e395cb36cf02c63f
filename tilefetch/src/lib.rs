//! tilefetch - Offline map tile downloader
//!
//! This library converts a geographic bounding box into the Web Mercator
//! tiles covering it across a range of zoom levels, downloads them with
//! bounded parallelism, and writes the `config.json` manifest read by the
//! DJI RC offline-map viewer.
//!
//! # Example
//!
//! ```no_run
//! use tilefetch::coord::{BoundingBox, ZoomRange};
//! use tilefetch::fetch::{FetcherConfig, TileFetcher};
//! use tilefetch::provider::{AsyncReqwestClient, StyleTileSource};
//! use tilefetch::region::{RegionDownloader, RegionRequest};
//! use tilefetch::sink::DirectorySink;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let fetcher = TileFetcher::new(
//!     AsyncReqwestClient::new()?,
//!     StyleTileSource::default(),
//!     FetcherConfig::default(),
//! )?;
//! let sink = DirectorySink::prepare("tiles").await?;
//!
//! let request = RegionRequest::new(
//!     "Tel Aviv",
//!     BoundingBox::new(32.10, 32.07, 34.80, 34.76),
//!     ZoomRange::new(1, 17)?,
//! );
//! let summary = RegionDownloader::new(fetcher, sink).run(&request).await?;
//! println!("{}/{} tiles", summary.total_succeeded(), summary.total_requested());
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod coord;
pub mod fetch;
pub mod logging;
pub mod manifest;
pub mod provider;
pub mod region;
pub mod sink;

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
