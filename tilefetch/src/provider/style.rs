//! Vector-style raster tile server.
//!
//! Serves pre-rendered raster tiles for a named map style at
//! `https://{host}/styles/{style}/{z}/{x}/{y}@2x.png`. The `@2x` suffix
//! requests high-DPI (512×512) tiles, which is what the offline map reader
//! expects.

use crate::coord::TileCoord;

use super::types::{ProviderError, TileSource};

/// Default tile server host.
pub const DEFAULT_HOST: &str = "us.djiservice.org";

/// Default map style.
pub const DEFAULT_STYLE: &str = "osm-bright";

/// Default URL template.
pub const DEFAULT_TEMPLATE: &str = "https://{host}/styles/{style}/{z}/{x}/{y}@2x.png";

/// Placeholders every template must contain.
const REQUIRED_PLACEHOLDERS: [&str; 3] = ["{z}", "{x}", "{y}"];

/// Tile source for a style server.
///
/// # Example
///
/// ```
/// use tilefetch::coord::TileCoord;
/// use tilefetch::provider::{StyleTileSource, TileSource};
///
/// let source = StyleTileSource::default();
/// assert_eq!(
///     source.tile_url(&TileCoord::new(1, 0, 1)),
///     "https://us.djiservice.org/styles/osm-bright/1/1/0@2x.png"
/// );
/// ```
#[derive(Debug, Clone)]
pub struct StyleTileSource {
    /// Template with `{host}` and `{style}` already substituted
    resolved: String,
    name: String,
}

impl StyleTileSource {
    /// Creates a source for the given host and style using the default template.
    pub fn new(host: impl Into<String>, style: impl Into<String>) -> Self {
        Self::resolve(DEFAULT_TEMPLATE, &host.into(), &style.into())
    }

    /// Creates a source from a custom template.
    ///
    /// The template may use `{host}` and `{style}` and must contain `{z}`,
    /// `{x}` and `{y}`.
    pub fn with_template(
        template: &str,
        host: impl Into<String>,
        style: impl Into<String>,
    ) -> Result<Self, ProviderError> {
        let missing: Vec<&str> = REQUIRED_PLACEHOLDERS
            .iter()
            .copied()
            .filter(|p| !template.contains(p))
            .collect();
        if !missing.is_empty() {
            return Err(ProviderError::InvalidTemplate(format!(
                "'{}' is missing {}",
                template,
                missing.join(", ")
            )));
        }
        if !template.starts_with("http://") && !template.starts_with("https://") {
            return Err(ProviderError::InvalidTemplate(format!(
                "'{}' must start with http:// or https://",
                template
            )));
        }

        Ok(Self::resolve(template, &host.into(), &style.into()))
    }

    fn resolve(template: &str, host: &str, style: &str) -> Self {
        Self {
            resolved: template.replace("{host}", host).replace("{style}", style),
            name: format!("{} ({})", host, style),
        }
    }
}

impl Default for StyleTileSource {
    fn default() -> Self {
        Self::new(DEFAULT_HOST, DEFAULT_STYLE)
    }
}

impl TileSource for StyleTileSource {
    fn tile_url(&self, tile: &TileCoord) -> String {
        self.resolved
            .replace("{z}", &tile.zoom.to_string())
            .replace("{x}", &tile.x.to_string())
            .replace("{y}", &tile.y.to_string())
    }

    fn name(&self) -> &str {
        &self.name
    }
}
