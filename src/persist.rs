//! Crash-safe file replacement shared by the store and the cursor.

use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Replaces `path` with `bytes` via a temp file and a rename.
///
/// Creates the parent directory if needed. Readers see either the old file
/// or the new one, never a partial write.
pub(crate) fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), (PathBuf, io::Error)> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| (parent.to_path_buf(), e))?;
    }

    let temp_path = temp_path_for(path);

    let mut file = File::create(&temp_path).map_err(|e| (temp_path.clone(), e))?;
    file.write_all(bytes).map_err(|e| (temp_path.clone(), e))?;
    file.sync_all().map_err(|e| (temp_path.clone(), e))?;

    fs::rename(&temp_path, path).map_err(|e| (path.to_path_buf(), e))?;

    Ok(())
}

fn temp_path_for(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_write_creates_parent_and_replaces() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("nested").join("WEEK_NO");

        write_atomic(&path, b"one").unwrap();
        assert_eq!(fs::read(&path).unwrap(), b"one");

        write_atomic(&path, b"two").unwrap();
        assert_eq!(fs::read(&path).unwrap(), b"two");
        assert!(!temp_path_for(&path).exists());
    }

    #[test]
    fn test_temp_path_keeps_extension() {
        let path = Path::new("/data/meals.json");
        assert_eq!(temp_path_for(path), PathBuf::from("/data/meals.json.tmp"));
    }
}
