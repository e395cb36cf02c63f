//! Tile server abstraction
//!
//! This module separates *where* a tile comes from ([`TileSource`]) from
//! *how* it is fetched ([`AsyncHttpClient`]), so the fetcher can be driven
//! by a mock transport in tests.
//!
//! ```ignore
//! use tilefetch::provider::{AsyncReqwestClient, StyleTileSource};
//!
//! let client = AsyncReqwestClient::with_timeout(30)?;
//! let source = StyleTileSource::default();
//! let url = source.tile_url(&TileCoord::new(1, 0, 1));
//! let bytes = client.get(&url).await?;
//! ```

mod http;
mod style;
mod types;

pub use http::{AsyncHttpClient, AsyncReqwestClient};
pub use style::{StyleTileSource, DEFAULT_HOST, DEFAULT_STYLE, DEFAULT_TEMPLATE};
pub use types::{ProviderError, TileSource};

#[cfg(test)]
pub use http::tests::MockAsyncHttpClient;
