//! Filesystem sink rooted at an explicit output directory.

use std::path::{Path, PathBuf};

use tracing::{debug, info};

use super::{check_name, SinkError, TileSink};

/// Writes files into a single output directory.
///
/// Paths are always joined onto the configured root; the process working
/// directory is never changed.
#[derive(Debug, Clone)]
pub struct DirectorySink {
    root: PathBuf,
}

impl DirectorySink {
    /// Creates a sink for an existing directory.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Recreates `root` as an empty directory and returns a sink for it.
    ///
    /// An existing directory and all its contents are removed first. A
    /// regular file at `root` is an error rather than being deleted.
    pub async fn prepare(root: impl Into<PathBuf>) -> Result<Self, SinkError> {
        let root = root.into();

        match tokio::fs::metadata(&root).await {
            Ok(meta) if meta.is_dir() => {
                info!(path = %root.display(), "Clearing existing output directory");
                tokio::fs::remove_dir_all(&root)
                    .await
                    .map_err(|e| SinkError::PrepareFailed {
                        path: root.clone(),
                        source: e,
                    })?;
            }
            Ok(_) => return Err(SinkError::NotADirectory(root)),
            Err(_) => {}
        }

        tokio::fs::create_dir_all(&root)
            .await
            .map_err(|e| SinkError::PrepareFailed {
                path: root.clone(),
                source: e,
            })?;

        Ok(Self { root })
    }

    /// Returns the output directory.
    pub fn path(&self) -> &Path {
        &self.root
    }
}

impl TileSink for DirectorySink {
    async fn write_file(&self, name: &str, bytes: &[u8]) -> Result<(), SinkError> {
        check_name(name)?;
        let path = self.root.join(name);

        tokio::fs::write(&path, bytes)
            .await
            .map_err(|e| SinkError::WriteFailed {
                path: path.clone(),
                source: e,
            })?;

        debug!(path = %path.display(), bytes = bytes.len(), "File written");
        Ok(())
    }
}
