//! Persisted pagination pointer into the upstream weekly pages.
//!
//! The file holds the page number as a big-endian unsigned integer in as few
//! bytes as it takes (at least one), with no framing.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::fallback::Fallback;
use crate::persist::write_atomic;

/// Page number used when no cursor file exists yet.
pub const DEFAULT_PAGE: u64 = 219;

/// The last upstream page that has been consumed.
#[derive(Debug)]
pub struct Cursor {
    path: PathBuf,
    value: u64,
}

impl Cursor {
    /// Reads the cursor file; on any failure uses `default` and writes it.
    pub fn load(path: impl Into<PathBuf>, default: u64) -> Result<Fallback<Self>, CursorError> {
        let path = path.into();
        match read_value(&path) {
            Ok(value) => {
                tracing::info!("Cursor loaded from {}: {}", path.display(), value);
                Ok(Fallback::Loaded(Self { path, value }))
            }
            Err(reason) => {
                tracing::warn!("Cursor reset to {}: {}", default, reason);
                let mut cursor = Self { path, value: default };
                cursor.store(default)?;
                Ok(Fallback::defaulted(cursor, reason))
            }
        }
    }

    pub fn value(&self) -> u64 {
        self.value
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Moves forward by `delta`, persists, and returns the new value.
    pub fn advance(&mut self, delta: u64) -> Result<u64, CursorError> {
        let next = self
            .value
            .checked_add(delta)
            .ok_or(CursorError::Overflow(self.value, delta))?;
        self.store(next)?;
        tracing::debug!("Cursor advanced to {}", next);
        Ok(next)
    }

    /// Moves back by `delta`, persists, and returns the new value.
    pub fn rollback(&mut self, delta: u64) -> Result<u64, CursorError> {
        let next = self
            .value
            .checked_sub(delta)
            .ok_or(CursorError::Underflow(self.value, delta))?;
        self.store(next)?;
        tracing::debug!("Cursor rolled back to {}", next);
        Ok(next)
    }

    /// Overwrites the cursor with an explicit page number.
    pub fn set(&mut self, value: u64) -> Result<u64, CursorError> {
        self.store(value)?;
        tracing::info!("Cursor set to {}", value);
        Ok(value)
    }

    /// Writes `value` to disk; the in-memory value changes only on success.
    fn store(&mut self, value: u64) -> Result<(), CursorError> {
        write_atomic(&self.path, &encode(value)).map_err(|(p, e)| CursorError::IoError(p, e))?;
        self.value = value;
        Ok(())
    }
}

fn read_value(path: &Path) -> Result<u64, String> {
    let bytes = fs::read(path).map_err(|e| format!("cannot read {}: {}", path.display(), e))?;
    decode(&bytes).ok_or_else(|| {
        format!(
            "{} holds {} byte(s), expected 1 to 8",
            path.display(),
            bytes.len()
        )
    })
}

/// Minimal-width big-endian bytes, at least one byte.
fn encode(value: u64) -> Vec<u8> {
    let bytes = value.to_be_bytes();
    let skip = (value.leading_zeros() / 8).min(7) as usize;
    bytes[skip..].to_vec()
}

fn decode(bytes: &[u8]) -> Option<u64> {
    if bytes.is_empty() || bytes.len() > 8 {
        return None;
    }
    Some(bytes.iter().fold(0u64, |acc, b| (acc << 8) | u64::from(*b)))
}

/// Errors that can occur while moving or persisting the cursor.
#[derive(Debug)]
pub enum CursorError {
    /// I/O error writing the cursor file.
    IoError(PathBuf, io::Error),
    /// Rolling back would go below zero.
    Underflow(u64, u64),
    /// Advancing would exceed `u64::MAX`.
    Overflow(u64, u64),
}

impl std::fmt::Display for CursorError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CursorError::IoError(path, e) => {
                write!(f, "I/O error for {}: {}", path.display(), e)
            }
            CursorError::Underflow(value, delta) => {
                write!(f, "Cannot roll cursor {} back by {}", value, delta)
            }
            CursorError::Overflow(value, delta) => {
                write!(f, "Cannot advance cursor {} by {}", value, delta)
            }
        }
    }
}

impl std::error::Error for CursorError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CursorError::IoError(_, e) => Some(e),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn setup() -> (PathBuf, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        (temp_dir.path().join("WEEK_NO"), temp_dir)
    }

    #[test]
    fn test_encode_minimal_width() {
        assert_eq!(encode(0), vec![0x00]);
        assert_eq!(encode(219), vec![0xdb]);
        assert_eq!(encode(255), vec![0xff]);
        assert_eq!(encode(256), vec![0x01, 0x00]);
        assert_eq!(encode(u64::MAX), vec![0xff; 8]);
    }

    #[test]
    fn test_decode() {
        assert_eq!(decode(&[0xdb]), Some(219));
        assert_eq!(decode(&[0x01, 0x00]), Some(256));
        assert_eq!(decode(&[0x00, 0x00, 0xdc]), Some(220));
        assert_eq!(decode(&[]), None);
        assert_eq!(decode(&[0; 9]), None);
    }

    #[test]
    fn test_load_missing_uses_default_and_persists() {
        let (path, _temp) = setup();
        let loaded = Cursor::load(&path, DEFAULT_PAGE).unwrap();

        assert!(loaded.is_defaulted());
        assert_eq!(loaded.value().value(), 219);
        assert_eq!(fs::read(&path).unwrap(), vec![219u8]);
    }

    #[test]
    fn test_load_empty_file_uses_default() {
        let (path, _temp) = setup();
        // Deliberate: an empty file is treated as unreadable and reset to
        // the default rather than decoded as page 0, which would refetch
        // the whole archive from the first page.
        fs::write(&path, b"").unwrap();

        let loaded = Cursor::load(&path, 7).unwrap();
        assert!(loaded.is_defaulted());
        assert_eq!(loaded.into_inner().value(), 7);
        assert_eq!(fs::read(&path).unwrap(), vec![7u8]);
    }

    #[test]
    fn test_load_existing() {
        let (path, _temp) = setup();
        fs::write(&path, [0x01, 0x2c]).unwrap();

        let loaded = Cursor::load(&path, DEFAULT_PAGE).unwrap();
        assert!(!loaded.is_defaulted());
        assert_eq!(loaded.into_inner().value(), 300);
    }

    #[test]
    fn test_advance_then_rollback_restores_file() {
        let (path, _temp) = setup();
        let mut cursor = Cursor::load(&path, DEFAULT_PAGE).unwrap().into_inner();
        let before = fs::read(&path).unwrap();

        assert_eq!(cursor.advance(1).unwrap(), 220);
        assert_eq!(fs::read(&path).unwrap(), vec![220u8]);

        assert_eq!(cursor.rollback(1).unwrap(), 219);
        assert_eq!(fs::read(&path).unwrap(), before);
    }

    #[test]
    fn test_advance_is_durable_across_reload() {
        let (path, _temp) = setup();
        let mut cursor = Cursor::load(&path, 255).unwrap().into_inner();
        cursor.advance(1).unwrap();

        let reloaded = Cursor::load(&path, DEFAULT_PAGE).unwrap();
        assert!(!reloaded.is_defaulted());
        assert_eq!(reloaded.into_inner().value(), 256);
    }

    #[test]
    fn test_rollback_below_zero_fails_without_write() {
        let (path, _temp) = setup();
        let mut cursor = Cursor::load(&path, 0).unwrap().into_inner();

        assert!(matches!(cursor.rollback(1), Err(CursorError::Underflow(0, 1))));
        assert_eq!(cursor.value(), 0);
        assert_eq!(fs::read(&path).unwrap(), vec![0u8]);
    }

    #[test]
    fn test_set() {
        let (path, _temp) = setup();
        let mut cursor = Cursor::load(&path, DEFAULT_PAGE).unwrap().into_inner();
        cursor.set(300).unwrap();
        assert_eq!(cursor.value(), 300);
        assert_eq!(fs::read(&path).unwrap(), vec![0x01, 0x2c]);
    }
}
