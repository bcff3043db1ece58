use std::io;
use std::path::PathBuf;

/// Errors that can occur while persisting the meal store.
///
/// Reading never produces one of these: an unreadable store file falls back
/// to an empty store.
#[derive(Debug)]
pub enum StoreError {
    /// I/O error writing the store file.
    IoError(PathBuf, io::Error),
    /// The store could not be encoded as JSON.
    EncodeError(serde_json::Error),
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreError::IoError(path, e) => {
                write!(f, "I/O error for {}: {}", path.display(), e)
            }
            StoreError::EncodeError(e) => write!(f, "Failed to encode meal store: {}", e),
        }
    }
}

impl std::error::Error for StoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StoreError::IoError(_, e) => Some(e),
            StoreError::EncodeError(e) => Some(e),
        }
    }
}

impl From<(PathBuf, io::Error)> for StoreError {
    fn from((path, e): (PathBuf, io::Error)) -> Self {
        StoreError::IoError(path, e)
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(e: serde_json::Error) -> Self {
        StoreError::EncodeError(e)
    }
}
