use murmur_shared::RelayError;
use thiserror::Error;

/// Errors produced by the store layer.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Failed to determine a platform data directory.
    #[error("Could not determine application data directory")]
    NoDataDir,

    /// Generic I/O error (e.g. creating the snapshot directory).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Snapshot could not be encoded.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The snapshot on disk exists but cannot be parsed. It is left untouched.
    #[error("Snapshot at {path} is corrupt: {reason}")]
    Corrupt { path: String, reason: String },

    /// Replacing the snapshot with the freshly written temp file failed.
    #[error("Failed to replace snapshot: {0}")]
    Persist(#[from] tempfile::PersistError),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, StoreError>;

impl From<StoreError> for RelayError {
    fn from(err: StoreError) -> Self {
        Self::Persistence(err.to_string())
    }
}
