//! Coordinate types for the Web Mercator tiling scheme.

use std::fmt;

use thiserror::Error;

/// Maximum latitude representable in Web Mercator (degrees).
pub const MAX_LAT: f64 = 85.05112878;

/// Minimum latitude representable in Web Mercator (degrees).
pub const MIN_LAT: f64 = -85.05112878;

/// Minimum longitude accepted by the projector (degrees).
pub const MIN_LON: f64 = -180.0;

/// Maximum longitude of the standard range (degrees).
pub const MAX_LON: f64 = 180.0;

/// Lowest zoom level.
pub const MIN_ZOOM: u8 = 0;

/// Highest zoom level served by practical tile servers.
pub const MAX_ZOOM: u8 = 22;

/// Errors raised by coordinate conversion and validation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CoordError {
    /// Latitude is outside the Mercator-valid range or not finite.
    #[error("Invalid latitude {0}: must be within [-85.05112878, 85.05112878]")]
    InvalidLatitude(f64),

    /// Longitude is not finite or lies west of the antimeridian.
    #[error("Invalid longitude {0}: must be a finite value >= -180")]
    InvalidLongitude(f64),

    /// Zoom level exceeds the supported maximum.
    #[error("Invalid zoom level {0}: must be within [0, 22]")]
    InvalidZoom(u8),

    /// Zoom range has min greater than max or a bound outside the valid range.
    #[error("Invalid zoom range {min}..={max}")]
    InvalidZoomRange { min: u8, max: u8 },

    /// Bounding box violates north > south or has an out-of-range corner.
    #[error("Invalid bounding box: {0}")]
    InvalidBoundingBox(String),
}

/// Address of a single map tile.
///
/// `x` grows eastward and `y` grows southward, both in `[0, 2^zoom)` for
/// points inside the standard longitude range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TileCoord {
    /// Column index (west to east)
    pub x: u32,
    /// Row index (north to south)
    pub y: u32,
    /// Zoom level
    pub zoom: u8,
}

impl TileCoord {
    /// Creates a new tile coordinate.
    pub fn new(x: u32, y: u32, zoom: u8) -> Self {
        Self { x, y, zoom }
    }

    /// Filename the tile is stored under: `tile-{zoom}-{x}-{y}.png`.
    pub fn filename(&self) -> String {
        format!("tile-{}-{}-{}.png", self.zoom, self.x, self.y)
    }
}

impl fmt::Display for TileCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.zoom, self.x, self.y)
    }
}

/// Geographic rectangle in degrees.
///
/// The box is not normalized across the antimeridian; callers supply a
/// non-wrapping box. Use [`BoundingBox::validate`] at input boundaries.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    north: f64,
    south: f64,
    east: f64,
    west: f64,
}

impl BoundingBox {
    /// Creates a bounding box without validation.
    pub fn new(north: f64, south: f64, east: f64, west: f64) -> Self {
        Self {
            north,
            south,
            east,
            west,
        }
    }

    pub fn north(&self) -> f64 {
        self.north
    }

    pub fn south(&self) -> f64 {
        self.south
    }

    pub fn east(&self) -> f64 {
        self.east
    }

    pub fn west(&self) -> f64 {
        self.west
    }

    /// Checks that the box can be downloaded.
    ///
    /// Requires `north > south`, both latitudes inside the Mercator range and
    /// both longitudes inside `[-180, 180]`.
    pub fn validate(&self) -> Result<(), CoordError> {
        for lat in [self.north, self.south] {
            if !lat.is_finite() || !(MIN_LAT..=MAX_LAT).contains(&lat) {
                return Err(CoordError::InvalidLatitude(lat));
            }
        }
        for lon in [self.east, self.west] {
            if !lon.is_finite() || !(MIN_LON..=MAX_LON).contains(&lon) {
                return Err(CoordError::InvalidLongitude(lon));
            }
        }
        if self.north <= self.south {
            return Err(CoordError::InvalidBoundingBox(format!(
                "north ({}) must be greater than south ({})",
                self.north, self.south
            )));
        }
        Ok(())
    }
}

impl fmt::Display for BoundingBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "N {} S {} E {} W {}",
            self.north, self.south, self.east, self.west
        )
    }
}

/// Inclusive range of zoom levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ZoomRange {
    min: u8,
    max: u8,
}

impl ZoomRange {
    /// Creates a zoom range, checking `min <= max <= MAX_ZOOM`.
    pub fn new(min: u8, max: u8) -> Result<Self, CoordError> {
        if min > max || max > MAX_ZOOM {
            return Err(CoordError::InvalidZoomRange { min, max });
        }
        Ok(Self { min, max })
    }

    pub fn min(&self) -> u8 {
        self.min
    }

    pub fn max(&self) -> u8 {
        self.max
    }

    /// Number of levels in the range.
    pub fn len(&self) -> usize {
        (self.max - self.min) as usize + 1
    }

    /// A valid range always holds at least one level.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Iterates the levels from `min` to `max` inclusive.
    pub fn levels(&self) -> std::ops::RangeInclusive<u8> {
        self.min..=self.max
    }
}

/// Inclusive rectangle of tile indices at one zoom level.
///
/// A rectangle with `min_x > max_x` or `min_y > max_y` is empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileRect {
    pub min_x: u32,
    pub min_y: u32,
    pub max_x: u32,
    pub max_y: u32,
    pub zoom: u8,
}

impl TileRect {
    /// Returns true if the rectangle covers no tiles.
    pub fn is_empty(&self) -> bool {
        self.min_x > self.max_x || self.min_y > self.max_y
    }

    /// Number of tiles covered by the rectangle.
    pub fn tile_count(&self) -> u64 {
        if self.is_empty() {
            return 0;
        }
        let cols = (self.max_x - self.min_x) as u64 + 1;
        let rows = (self.max_y - self.min_y) as u64 + 1;
        cols * rows
    }

    /// Returns an iterator over every tile in the rectangle.
    ///
    /// Tiles are yielded column by column: `x` outer, `y` inner.
    pub fn tiles(&self) -> TileRectIterator {
        TileRectIterator::new(*self)
    }
}

impl fmt::Display for TileRect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "z{} x {}..={} y {}..={}",
            self.zoom, self.min_x, self.max_x, self.min_y, self.max_y
        )
    }
}

/// Iterator over the tiles of a [`TileRect`].
#[derive(Debug, Clone)]
pub struct TileRectIterator {
    rect: TileRect,
    next_x: u64,
    next_y: u64,
    done: bool,
}

impl TileRectIterator {
    fn new(rect: TileRect) -> Self {
        Self {
            rect,
            next_x: rect.min_x as u64,
            next_y: rect.min_y as u64,
            done: rect.is_empty(),
        }
    }
}

impl Iterator for TileRectIterator {
    type Item = TileCoord;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let tile = TileCoord {
            x: self.next_x as u32,
            y: self.next_y as u32,
            zoom: self.rect.zoom,
        };

        // u64 cursors so a rectangle ending at u32::MAX still terminates
        self.next_y += 1;
        if self.next_y > self.rect.max_y as u64 {
            self.next_y = self.rect.min_y as u64;
            self.next_x += 1;
            if self.next_x > self.rect.max_x as u64 {
                self.done = true;
            }
        }

        Some(tile)
    }
}
