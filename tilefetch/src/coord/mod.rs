//! Coordinate conversion module
//!
//! Provides conversions between geographic coordinates (latitude/longitude)
//! and Web Mercator slippy-map tile indices, and derives the rectangle of
//! tiles covering a bounding box.

mod types;

pub use types::{
    BoundingBox, CoordError, TileCoord, TileRect, TileRectIterator, ZoomRange, MAX_LAT, MAX_LON,
    MAX_ZOOM, MIN_LAT, MIN_LON, MIN_ZOOM,
};

use std::f64::consts::PI;

/// Converts geographic coordinates to tile coordinates.
///
/// # Arguments
///
/// * `lat` - Latitude in degrees (-85.05112878 to 85.05112878)
/// * `lon` - Longitude in degrees, at least -180.0
/// * `zoom` - Zoom level (0 to 22)
///
/// Longitudes east of 180° are not clamped: they project to a column at or
/// beyond `2^zoom`, which the tile server rejects like any other missing tile.
///
/// # Returns
///
/// A `Result` containing the tile coordinates or an error if inputs are invalid.
#[inline]
pub fn to_tile_coords(lat: f64, lon: f64, zoom: u8) -> Result<TileCoord, CoordError> {
    // NaN fails the range check too
    if !(MIN_LAT..=MAX_LAT).contains(&lat) {
        return Err(CoordError::InvalidLatitude(lat));
    }
    if !lon.is_finite() || lon < MIN_LON {
        return Err(CoordError::InvalidLongitude(lon));
    }
    if zoom > MAX_ZOOM {
        return Err(CoordError::InvalidZoom(zoom));
    }

    // Calculate number of tiles at this zoom level
    let n = 2.0_f64.powi(zoom as i32);

    // Convert longitude to tile X coordinate
    let x = ((lon + 180.0) / 360.0 * n).floor() as u32;

    // Convert latitude to tile Y coordinate using Web Mercator projection.
    // At the latitude limit the value can dip a hair below zero; the cast
    // saturates it to row 0.
    let lat_rad = lat.to_radians();
    let y = ((1.0 - lat_rad.tan().asinh() / PI) / 2.0 * n).floor().max(0.0) as u32;

    Ok(TileCoord { x, y, zoom })
}

/// Computes the inclusive rectangle of tiles covering a bounding box.
///
/// The north-west corner gives `(min_x, min_y)` and the south-east corner
/// gives `(max_x, max_y)`. Each corner is floored independently and no
/// clamping to `[0, 2^zoom - 1]` is applied. A reversed or degenerate box
/// yields an empty rectangle rather than an error.
pub fn box_to_tile_rect(bbox: &BoundingBox, zoom: u8) -> Result<TileRect, CoordError> {
    let north_west = to_tile_coords(bbox.north(), bbox.west(), zoom)?;
    let south_east = to_tile_coords(bbox.south(), bbox.east(), zoom)?;

    // Both latitudes of a reversed box can floor into the same row.
    if bbox.north() < bbox.south() {
        return Ok(TileRect {
            min_x: north_west.x,
            min_y: north_west.y.max(south_east.y.saturating_add(1)),
            max_x: south_east.x,
            max_y: south_east.y,
            zoom,
        });
    }

    Ok(TileRect {
        min_x: north_west.x,
        min_y: north_west.y,
        max_x: south_east.x,
        max_y: south_east.y,
        zoom,
    })
}

/// Converts tile coordinates back to geographic coordinates.
///
/// Returns the latitude/longitude of the tile's northwest corner.
#[inline]
pub fn tile_to_lat_lon(tile: &TileCoord) -> (f64, f64) {
    let n = 2.0_f64.powi(tile.zoom as i32);

    let lon = tile.x as f64 / n * 360.0 - 180.0;

    // Inverse Web Mercator
    let y = tile.y as f64 / n;
    let lat_rad = (PI * (1.0 - 2.0 * y)).sinh().atan();
    let lat = lat_rad.to_degrees();

    (lat, lon)
}
