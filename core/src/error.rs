//! Error taxonomy for statdesk operations.
//!
//! Every failure is terminal for the current call: nothing is retried
//! internally and no operation leaves a partial write behind. Callers
//! surface the error; for [`StatdeskError::ConcurrentModification`]
//! they re-read and retry, or force with an overwrite flag.

use std::path::PathBuf;
use thiserror::Error;

/// Statdesk result type alias.
pub type Result<T> = std::result::Result<T, StatdeskError>;

/// Statdesk error taxonomy.
#[derive(Debug, Error)]
pub enum StatdeskError {
    /// No storage root has been configured yet.
    #[error("no storage root configured; run `statdesk root set <path>` first")]
    NotConfigured,

    /// The configured storage root no longer exists on disk.
    #[error("configured storage root {path} does not exist")]
    PathMissing { path: PathBuf },

    /// A path supplied as the storage root is unusable.
    #[error("invalid storage root {path}: {reason}")]
    InvalidPath { path: PathBuf, reason: String },

    /// Required input was missing or unusable.
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    /// A record with the derived id already exists.
    #[error("record {id} already exists at {path}")]
    DuplicateRecord { id: String, path: PathBuf },

    /// No record file for the given id.
    #[error("no registry record for {id}")]
    NotFound { id: String },

    /// An update request with no fields to change.
    #[error("update carries no fields to change")]
    NoOp,

    /// Completion requires methods on the record or in the call.
    #[error("cannot complete {id}: no methods recorded and none supplied")]
    MissingMethods { id: String },

    /// A supplied date string is not a calendar date.
    #[error("invalid date {value:?}: expected YYYY-MM-DD")]
    InvalidDate { value: String },

    /// The record changed on disk between read and write.
    #[error("record {id} changed on disk since it was read (use overwrite to force)")]
    ConcurrentModification { id: String },

    /// A project path escapes the storage root.
    #[error("path {path} is outside the storage root {root}")]
    PathOutsideRoot { path: PathBuf, root: PathBuf },

    /// The registry directory holds no records to compile.
    #[error("no records found under {dir}")]
    EmptyRegistry { dir: PathBuf },

    /// A destination file exists and overwrite was not requested.
    #[error("{path} already exists (use overwrite to replace it)")]
    AlreadyExists { path: PathBuf },

    /// A record or config file exists but does not parse.
    #[error("file corrupted at {path}: {reason}")]
    Corrupted { path: PathBuf, reason: String },

    /// Filesystem I/O error.
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

impl StatdeskError {
    /// Wrap an I/O error with the path it occurred on.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Build a validation error for a named input field.
    pub fn validation(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            reason: reason.into(),
        }
    }
}
