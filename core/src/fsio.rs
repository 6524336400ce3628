//! Atomic file writes for registry, config, and snapshot files.
//!
//! Uses the temp-file + fsync + rename pattern so a crash mid-write
//! never leaves a half-written file at the target path.

use std::io::Write;
use std::path::Path;

use crate::error::{Result, StatdeskError};

/// Write `data` to `path` atomically via a dot-prefixed `.tmp` sibling.
///
/// The parent directory must already exist; rename is atomic on POSIX
/// for paths on the same filesystem.
pub(crate) fn write_atomic(path: &Path, data: &[u8]) -> Result<()> {
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "file".to_string());
    let temp_path = path.with_file_name(format!(".{file_name}.tmp"));

    let mut file =
        std::fs::File::create(&temp_path).map_err(|e| StatdeskError::io(&temp_path, e))?;
    file.write_all(data)
        .map_err(|e| StatdeskError::io(&temp_path, e))?;
    // fsync for durability before the rename makes the write visible
    file.sync_all()
        .map_err(|e| StatdeskError::io(&temp_path, e))?;

    std::fs::rename(&temp_path, path).map_err(|e| StatdeskError::io(path, e))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_atomic_leaves_no_temp_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let target = dir.path().join("out.json");

        write_atomic(&target, b"{}").unwrap();

        assert_eq!(std::fs::read(&target).unwrap(), b"{}");
        let entries: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .collect();
        assert_eq!(entries.len(), 1);
    }

    #[test]
    fn write_atomic_replaces_existing_content() {
        let dir = tempfile::TempDir::new().unwrap();
        let target = dir.path().join("out.json");
        std::fs::write(&target, b"old").unwrap();

        write_atomic(&target, b"new").unwrap();

        assert_eq!(std::fs::read_to_string(&target).unwrap(), "new");
    }
}
