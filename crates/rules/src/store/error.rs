//! Error types and load result structures for rule-set stores.

use std::path::PathBuf;

use crate::codec::CodecError;

/// Errors that can occur while persisting or loading rule sets.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Filesystem I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Rule-set decode or encode error.
    #[error("codec error: {0}")]
    Codec(#[from] CodecError),

    /// Name that cannot be used as a storage key.
    #[error("invalid rule set name '{0}'")]
    InvalidName(String),
}

/// Result alias for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;

/// Outcome of loading a single rule-set file.
#[derive(Debug)]
pub struct LoadResult {
    /// Path to the file that was loaded.
    pub path: PathBuf,
    /// Status of the load attempt.
    pub status: LoadStatus,
}

/// Status of a single file load attempt.
#[derive(Debug)]
pub enum LoadStatus {
    /// Rule set was successfully loaded.
    Loaded { name: String },
    /// File was skipped (dotfile, unsupported extension).
    Skipped { reason: String },
    /// Parse or validation error occurred.
    Failed { error: String },
}

/// Reject names that are empty, hidden or would escape the store directory.
pub(crate) fn check_name(name: &str) -> Result<()> {
    let invalid = name.trim().is_empty()
        || name.starts_with('.')
        || name.contains(['/', '\\'])
        || name.contains('\0');
    if invalid {
        return Err(StoreError::InvalidName(name.to_string()));
    }
    Ok(())
}
