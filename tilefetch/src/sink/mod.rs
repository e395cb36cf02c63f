//! Output storage for downloaded tiles and the region manifest.
//!
//! The fetcher never touches the filesystem directly; it hands each tile's
//! bytes and filename to a [`TileSink`]. [`DirectorySink`] writes into an
//! explicit output directory and [`MemorySink`] keeps everything in memory.

mod directory;
mod memory;

pub use directory::DirectorySink;
pub use memory::MemorySink;

use std::future::Future;
use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while persisting output files.
#[derive(Debug, Error)]
pub enum SinkError {
    /// Failed to write a file.
    #[error("Failed to write {path}: {source}")]
    WriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to create or clear the output directory.
    #[error("Failed to prepare output directory {path}: {source}")]
    PrepareFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Output path exists but is not a directory.
    #[error("Output path {0} is not a directory")]
    NotADirectory(PathBuf),

    /// Filename would escape the output directory.
    #[error("Invalid output filename '{0}'")]
    InvalidName(String),
}

/// Destination for downloaded files.
///
/// Concurrent workers call [`TileSink::write_file`] with disjoint names, so
/// implementations need no cross-file locking.
pub trait TileSink: Send + Sync {
    /// Persists `bytes` under `name`, replacing any existing file.
    fn write_file(
        &self,
        name: &str,
        bytes: &[u8],
    ) -> impl Future<Output = Result<(), SinkError>> + Send;
}

/// Rejects names that could write outside the sink's root.
pub(crate) fn check_name(name: &str) -> Result<(), SinkError> {
    if name.is_empty() || name.contains('/') || name.contains('\\') || name == ".." {
        return Err(SinkError::InvalidName(name.to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_name() {
        assert!(check_name("tile-1-1-0.png").is_ok());
        assert!(check_name("config.json").is_ok());
        assert!(check_name("").is_err());
        assert!(check_name("..").is_err());
        assert!(check_name("../etc/passwd").is_err());
        assert!(check_name("a\\b").is_err());
    }
}
