//! Per-user storage-root configuration.
//!
//! One small JSON file records where the center's shared storage root
//! lives on this machine: `{ "box_root": ..., "updated_at": ...,
//! "user": ... }`. The file sits outside the storage root itself
//! (default `~/.config/statdesk/config.json`, overridable via
//! `STATDESK_CONFIG`) so the root can move without the registry
//! carrying machine-local paths.
//!
//! The resolved root is an explicit value handed to
//! [`crate::registry::RegistryStore`] and
//! [`crate::registry::RegistryCompiler`] at construction; nothing in
//! this crate reads it from ambient process state.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Result, StatdeskError};
use crate::fsio::write_atomic;

/// Environment variable that overrides the config file path.
pub const CONFIG_ENV_VAR: &str = "STATDESK_CONFIG";

/// Config filename under the per-user config directory.
pub const CONFIG_FILENAME: &str = "config.json";

/// On-disk config shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct RootConfig {
    /// Absolute path of the storage root on this machine.
    box_root: String,
    /// RFC3339 UTC timestamp of the last `set_root`.
    updated_at: String,
    /// Login of the user who configured it.
    user: String,
}

/// Reads and writes the per-user storage-root config file.
pub struct ConfigStore {
    config_path: PathBuf,
}

impl ConfigStore {
    /// Create a store at the default per-user location, honoring
    /// `STATDESK_CONFIG` when set.
    pub fn new() -> Result<Self> {
        if let Some(path) = std::env::var_os(CONFIG_ENV_VAR) {
            return Ok(Self {
                config_path: PathBuf::from(path),
            });
        }
        let dir = dirs::config_dir().ok_or_else(|| {
            StatdeskError::io(
                "config",
                std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    "could not determine the user config directory",
                ),
            )
        })?;
        Ok(Self {
            config_path: dir.join("statdesk").join(CONFIG_FILENAME),
        })
    }

    /// Create a store with an explicit config file path (for testing).
    pub fn with_config_path(config_path: PathBuf) -> Self {
        Self { config_path }
    }

    /// Path of the config file this store reads and writes.
    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    /// Record `path` as the storage root.
    ///
    /// The path must exist and be a directory; it is canonicalized
    /// before being written so later containment checks see one
    /// spelling of the root. Returns the canonical root.
    pub fn set_root(&self, path: &Path) -> Result<PathBuf> {
        if !path.exists() {
            return Err(StatdeskError::InvalidPath {
                path: path.to_path_buf(),
                reason: "path does not exist".to_string(),
            });
        }
        if !path.is_dir() {
            return Err(StatdeskError::InvalidPath {
                path: path.to_path_buf(),
                reason: "path is not a directory".to_string(),
            });
        }
        let root = path
            .canonicalize()
            .map_err(|e| StatdeskError::io(path, e))?;

        let config = RootConfig {
            box_root: root.to_string_lossy().into_owned(),
            updated_at: chrono::Utc::now().to_rfc3339(),
            user: std::env::var("USER").unwrap_or_else(|_| "unknown".to_string()),
        };

        if let Some(parent) = self.config_path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| StatdeskError::io(parent, e))?;
        }
        let json = serde_json::to_string_pretty(&config)?;
        write_atomic(&self.config_path, json.as_bytes())?;

        tracing::info!(root = %root.display(), "storage root configured");
        Ok(root)
    }

    /// Return the configured storage root, verifying it still exists.
    pub fn get_root(&self) -> Result<PathBuf> {
        let content = match std::fs::read_to_string(&self.config_path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(StatdeskError::NotConfigured);
            }
            Err(e) => return Err(StatdeskError::io(&self.config_path, e)),
        };

        let config: RootConfig =
            serde_json::from_str(&content).map_err(|e| StatdeskError::Corrupted {
                path: self.config_path.clone(),
                reason: e.to_string(),
            })?;

        if config.box_root.trim().is_empty() {
            return Err(StatdeskError::NotConfigured);
        }

        let root = PathBuf::from(&config.box_root);
        if !root.exists() {
            return Err(StatdeskError::PathMissing { path: root });
        }
        Ok(root)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_in(dir: &tempfile::TempDir) -> ConfigStore {
        ConfigStore::with_config_path(dir.path().join("config.json"))
    }

    #[test]
    fn set_then_get_roundtrips_the_root() {
        let dir = tempfile::TempDir::new().unwrap();
        let root = dir.path().join("box");
        std::fs::create_dir_all(&root).unwrap();

        let store = store_in(&dir);
        let written = store.set_root(&root).unwrap();
        let read_back = store.get_root().unwrap();
        assert_eq!(written, read_back);
    }

    #[test]
    fn get_root_before_set_is_not_configured() {
        let dir = tempfile::TempDir::new().unwrap();
        let store = store_in(&dir);
        assert!(matches!(
            store.get_root(),
            Err(StatdeskError::NotConfigured)
        ));
    }

    #[test]
    fn set_root_rejects_missing_path() {
        let dir = tempfile::TempDir::new().unwrap();
        let store = store_in(&dir);
        let err = store.set_root(&dir.path().join("nope")).unwrap_err();
        assert!(matches!(err, StatdeskError::InvalidPath { .. }));
    }

    #[test]
    fn set_root_rejects_plain_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let file = dir.path().join("file.txt");
        std::fs::write(&file, "x").unwrap();

        let store = store_in(&dir);
        let err = store.set_root(&file).unwrap_err();
        assert!(matches!(err, StatdeskError::InvalidPath { .. }));
    }

    #[test]
    fn get_root_reports_vanished_root() {
        let dir = tempfile::TempDir::new().unwrap();
        let root = dir.path().join("box");
        std::fs::create_dir_all(&root).unwrap();

        let store = store_in(&dir);
        store.set_root(&root).unwrap();
        std::fs::remove_dir_all(&root).unwrap();

        assert!(matches!(
            store.get_root(),
            Err(StatdeskError::PathMissing { .. })
        ));
    }

    #[test]
    fn config_file_records_user_and_timestamp() {
        let dir = tempfile::TempDir::new().unwrap();
        let root = dir.path().join("box");
        std::fs::create_dir_all(&root).unwrap();

        let store = store_in(&dir);
        store.set_root(&root).unwrap();

        let raw = std::fs::read_to_string(store.config_path()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert!(value.get("box_root").is_some());
        assert!(value.get("updated_at").is_some());
        assert!(value.get("user").is_some());
    }

    #[test]
    fn corrupt_config_is_reported_as_corrupted() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "not json {{{").unwrap();

        let store = ConfigStore::with_config_path(path);
        assert!(matches!(
            store.get_root(),
            Err(StatdeskError::Corrupted { .. })
        ));
    }
}
