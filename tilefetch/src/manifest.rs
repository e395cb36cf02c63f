//! Region manifest (`config.json`).
//!
//! The offline-map reader expects a JSON array holding exactly one object:
//!
//! ```json
//! [{"latitudeNorth":32.1,"latitudeSouth":32.07,"longitudeEast":34.8,
//!   "longitudeWest":34.76,"maxZoom":17,"minZoom":1,"name":"offline_map",
//!   "timestamp":1700000000000}]
//! ```
//!
//! Field names and the single-element array are a compatibility contract.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use crate::coord::{BoundingBox, CoordError, ZoomRange};
use crate::sink::{SinkError, TileSink};

/// Filename of the manifest inside the output directory.
pub const MANIFEST_FILENAME: &str = "config.json";

/// Errors raised while writing or reading a manifest.
#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("Failed to serialize manifest: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Failed to write manifest: {0}")]
    Sink(#[from] SinkError),

    #[error("Failed to read manifest {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file parsed but is not a single-element array.
    #[error("Manifest must contain exactly one entry, found {0}")]
    EntryCount(usize),
}

/// Metadata describing a downloaded region.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegionManifest {
    pub latitude_north: f64,
    pub latitude_south: f64,
    pub longitude_east: f64,
    pub longitude_west: f64,
    pub max_zoom: u8,
    pub min_zoom: u8,
    pub name: String,
    /// Creation time in milliseconds since the Unix epoch.
    pub timestamp: i64,
}

impl RegionManifest {
    /// Creates a manifest stamped with the current time.
    pub fn new(name: impl Into<String>, bbox: &BoundingBox, zooms: &ZoomRange) -> Self {
        Self::with_timestamp(name, bbox, zooms, chrono::Utc::now().timestamp_millis())
    }

    pub fn with_timestamp(
        name: impl Into<String>,
        bbox: &BoundingBox,
        zooms: &ZoomRange,
        timestamp: i64,
    ) -> Self {
        Self {
            latitude_north: bbox.north(),
            latitude_south: bbox.south(),
            longitude_east: bbox.east(),
            longitude_west: bbox.west(),
            max_zoom: zooms.max(),
            min_zoom: zooms.min(),
            name: name.into(),
            timestamp,
        }
    }

    pub fn bounding_box(&self) -> BoundingBox {
        BoundingBox::new(
            self.latitude_north,
            self.latitude_south,
            self.longitude_east,
            self.longitude_west,
        )
    }

    pub fn zoom_range(&self) -> Result<ZoomRange, CoordError> {
        ZoomRange::new(self.min_zoom, self.max_zoom)
    }

    /// Serializes the manifest in its on-disk form.
    pub fn to_json(&self) -> Result<Vec<u8>, ManifestError> {
        Ok(serde_json::to_vec(&[self])?)
    }

    /// Parses the on-disk form, which must hold exactly one entry.
    pub fn from_json(bytes: &[u8]) -> Result<Self, ManifestError> {
        let mut entries: Vec<RegionManifest> = serde_json::from_slice(bytes)?;
        if entries.len() != 1 {
            return Err(ManifestError::EntryCount(entries.len()));
        }
        Ok(entries.remove(0))
    }
}

/// Writes the manifest as [`MANIFEST_FILENAME`] through the sink.
pub async fn write_manifest<S: TileSink>(
    sink: &S,
    manifest: &RegionManifest,
) -> Result<(), ManifestError> {
    let json = manifest.to_json()?;
    sink.write_file(MANIFEST_FILENAME, &json).await?;
    info!(
        name = %manifest.name,
        min_zoom = manifest.min_zoom,
        max_zoom = manifest.max_zoom,
        "Wrote region manifest"
    );
    Ok(())
}

/// Reads a manifest file from disk.
pub fn read_manifest(path: &Path) -> Result<RegionManifest, ManifestError> {
    let bytes = std::fs::read(path).map_err(|source| ManifestError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    RegionManifest::from_json(&bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::{DirectorySink, MemorySink};
    use tempfile::TempDir;

    fn tel_aviv() -> RegionManifest {
        RegionManifest::with_timestamp(
            "Tel Aviv",
            &BoundingBox::new(32.10, 32.07, 34.80, 34.76),
            &ZoomRange::new(1, 2).unwrap(),
            1_700_000_000_000,
        )
    }

    #[test]
    fn test_manifest_is_single_element_array() {
        let json = tel_aviv().to_json().unwrap();
        let value: serde_json::Value = serde_json::from_slice(&json).unwrap();

        let entries = value.as_array().expect("top level should be an array");
        assert_eq!(entries.len(), 1);

        let entry = &entries[0];
        assert_eq!(entry["minZoom"], 1);
        assert_eq!(entry["maxZoom"], 2);
        assert_eq!(entry["name"], "Tel Aviv");
        assert!(entry["timestamp"].is_i64());
        assert_eq!(entry["latitudeNorth"], 32.10);
        assert_eq!(entry["longitudeWest"], 34.76);
    }

    #[test]
    fn test_manifest_field_names() {
        let json = tel_aviv().to_json().unwrap();
        let value: serde_json::Value = serde_json::from_slice(&json).unwrap();
        let mut keys: Vec<_> = value[0].as_object().unwrap().keys().cloned().collect();
        keys.sort();

        assert_eq!(
            keys,
            vec![
                "latitudeNorth",
                "latitudeSouth",
                "longitudeEast",
                "longitudeWest",
                "maxZoom",
                "minZoom",
                "name",
                "timestamp",
            ]
        );
    }

    #[test]
    fn test_new_uses_current_time() {
        let before = chrono::Utc::now().timestamp_millis();
        let manifest = RegionManifest::new(
            "now",
            &BoundingBox::new(1.0, 0.0, 1.0, 0.0),
            &ZoomRange::new(0, 0).unwrap(),
        );
        let after = chrono::Utc::now().timestamp_millis();

        assert!(manifest.timestamp >= before && manifest.timestamp <= after);
    }

    #[test]
    fn test_from_json_rejects_wrong_entry_count() {
        let result = RegionManifest::from_json(b"[]");
        assert!(matches!(result, Err(ManifestError::EntryCount(0))));

        let result = RegionManifest::from_json(b"{\"name\": \"x\"}");
        assert!(matches!(result, Err(ManifestError::Serialize(_))));
    }

    #[tokio::test]
    async fn test_write_manifest_to_memory_sink() {
        let sink = MemorySink::new();
        write_manifest(&sink, &tel_aviv()).await.unwrap();

        let bytes = sink.get(MANIFEST_FILENAME).unwrap();
        assert_eq!(RegionManifest::from_json(&bytes).unwrap(), tel_aviv());
    }

    #[tokio::test]
    async fn test_write_and_read_manifest_on_disk() {
        let temp = TempDir::new().unwrap();
        let sink = DirectorySink::new(temp.path());

        write_manifest(&sink, &tel_aviv()).await.unwrap();
        let manifest = read_manifest(&temp.path().join(MANIFEST_FILENAME)).unwrap();

        assert_eq!(manifest.name, "Tel Aviv");
        assert_eq!(manifest.zoom_range().unwrap(), ZoomRange::new(1, 2).unwrap());
        assert_eq!(manifest.bounding_box().north(), 32.10);
    }

    #[test]
    fn test_read_missing_manifest() {
        let temp = TempDir::new().unwrap();
        let result = read_manifest(&temp.path().join("missing.json"));
        assert!(matches!(result, Err(ManifestError::Read { .. })));
    }
}
