use std::io;

use bytes::Bytes;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("object {bucket}/{path} not found")]
    NotFound { bucket: String, path: String },
    #[error("invalid object path `{0}`")]
    InvalidPath(String),
    #[error("io error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: io::Error,
    },
    #[error("storage backend error: {0}")]
    Backend(String),
}

impl StorageError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, StorageError::NotFound { .. })
    }
}

/// Object storage holding encoded snapshots.
///
/// Writes replace the whole object at `path`; readers never observe a
/// partially written object.
#[async_trait::async_trait]
pub trait SnapshotStore: Send + Sync {
    async fn read(&self, bucket: &str, path: &str) -> Result<Bytes, StorageError>;

    async fn write(&self, bucket: &str, path: &str, payload: Bytes) -> Result<(), StorageError>;
}

/// Rejects paths that could escape the bucket.
pub(crate) fn validate_object_path(path: &str) -> Result<(), StorageError> {
    let invalid = path.is_empty()
        || path.starts_with('/')
        || path
            .split('/')
            .any(|segment| segment.is_empty() || segment == "." || segment == "..");
    if invalid {
        return Err(StorageError::InvalidPath(path.to_string()));
    }
    Ok(())
}
