//! In-memory sink.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;

use super::{check_name, SinkError, TileSink};

/// Keeps written files in memory, keyed by filename.
///
/// Clones share the same storage.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    files: Arc<Mutex<HashMap<String, Vec<u8>>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of the named file, if written.
    pub fn get(&self, name: &str) -> Option<Vec<u8>> {
        self.files.lock().get(name).cloned()
    }

    /// Returns true if the named file was written.
    pub fn contains(&self, name: &str) -> bool {
        self.files.lock().contains_key(name)
    }

    /// Number of files written.
    pub fn len(&self) -> usize {
        self.files.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.lock().is_empty()
    }

    /// Sorted list of written filenames.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.files.lock().keys().cloned().collect();
        names.sort();
        names
    }
}

impl TileSink for MemorySink {
    async fn write_file(&self, name: &str, bytes: &[u8]) -> Result<(), SinkError> {
        check_name(name)?;
        self.files.lock().insert(name.to_string(), bytes.to_vec());
        Ok(())
    }
}
