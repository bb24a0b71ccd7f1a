//! Atomic file replacement

use std::io::Write;
use std::path::Path;

use tracing::debug;

use crate::error::{Result, StorageError};

/// Write `contents` to `path` without ever exposing a partial file.
///
/// The data goes to a temporary file in the destination directory, is
/// flushed to disk, and is then renamed over `path`. If any step fails the
/// previous file is left untouched.
pub fn atomic_write(path: &Path, contents: &[u8]) -> Result<()> {
    let failed = |reason: String| StorageError::WriteFailed {
        path: path.to_path_buf(),
        reason,
    };

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => std::path::PathBuf::from("."),
    };
    std::fs::create_dir_all(&dir).map_err(|e| failed(e.to_string()))?;

    let mut temp = tempfile::NamedTempFile::new_in(&dir).map_err(|e| failed(e.to_string()))?;
    temp.write_all(contents).map_err(|e| failed(e.to_string()))?;
    temp.as_file()
        .sync_all()
        .map_err(|e| failed(e.to_string()))?;
    temp.persist(path).map_err(|e| failed(e.error.to_string()))?;

    debug!(path = %path.display(), bytes = contents.len(), "wrote file");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_atomic_write_replaces_content() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("apps.json");
        std::fs::write(&path, "old").unwrap();

        atomic_write(&path, b"new").unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "new");
        let leftovers = std::fs::read_dir(temp.path()).unwrap().count();
        assert_eq!(leftovers, 1);
    }

    #[test]
    fn test_atomic_write_creates_parent_dirs() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("icons").join("Demo.png");

        atomic_write(&path, b"png").unwrap();

        assert_eq!(std::fs::read(&path).unwrap(), b"png");
    }

    #[test]
    fn test_failed_write_keeps_previous_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("apps.json");
        std::fs::write(&path, "old").unwrap();

        // A directory cannot be replaced by a file rename
        let target = temp.path().join("occupied");
        std::fs::create_dir(&target).unwrap();
        std::fs::write(target.join("child"), "x").unwrap();
        assert!(atomic_write(&target, b"new").is_err());

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "old");
    }
}
