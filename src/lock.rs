//! Exclusive ownership of a data directory across processes.
//!
//! The server and the CLI both open the same cursor and store files. Whoever
//! holds the lock is the only writer; everyone else must not advance the
//! cursor or rewrite the store.

use fd_lock::{RwLock, RwLockWriteGuard};
use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};

/// File name of the lock inside the data directory.
pub const LOCK_FILE: &str = "mealcache.lock";

/// Lock file for one data directory.
pub struct DataLock {
    path: PathBuf,
    lock: RwLock<File>,
}

/// Held while the data directory is owned; released on drop.
pub struct DataLockGuard<'a> {
    _guard: RwLockWriteGuard<'a, File>,
}

impl DataLock {
    /// Opens (creating if needed) the lock file in `data_dir`. Does not lock.
    pub fn open(data_dir: &Path) -> Result<Self, LockError> {
        fs::create_dir_all(data_dir)
            .map_err(|e| LockError::IoError(data_dir.to_path_buf(), e))?;
        let path = data_dir.join(LOCK_FILE);
        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(&path)
            .map_err(|e| LockError::IoError(path.clone(), e))?;
        Ok(Self {
            path,
            lock: RwLock::new(file),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Takes the lock without waiting.
    pub fn try_acquire(&mut self) -> Result<DataLockGuard<'_>, LockError> {
        match self.lock.try_write() {
            Ok(guard) => {
                tracing::debug!("Acquired {}", self.path.display());
                Ok(DataLockGuard { _guard: guard })
            }
            Err(e) => Err(LockError::Held(self.path.clone(), e)),
        }
    }
}

#[derive(Debug)]
pub enum LockError {
    /// The lock file could not be created.
    IoError(PathBuf, io::Error),
    /// Another process (or handle) holds the lock.
    Held(PathBuf, io::Error),
}

impl std::fmt::Display for LockError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LockError::IoError(path, e) => {
                write!(f, "Failed to open lock file '{}': {}", path.display(), e)
            }
            LockError::Held(path, _) => write!(
                f,
                "Data directory is in use by another mealcache process (lock '{}')",
                path.display()
            ),
        }
    }
}

impl std::error::Error for LockError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            LockError::IoError(_, e) | LockError::Held(_, e) => Some(e),
        }
    }
}
