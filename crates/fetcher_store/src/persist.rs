use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use bytes::Bytes;
use tempfile::NamedTempFile;

use crate::storage::{validate_object_path, SnapshotStore, StorageError};

/// Filesystem-backed object store: `{root}/{bucket}/{path}`.
#[derive(Debug, Clone)]
pub struct FsSnapshotStore {
    root: PathBuf,
}

impl FsSnapshotStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn object_path(&self, bucket: &str, path: &str) -> Result<PathBuf, StorageError> {
        validate_object_path(bucket)?;
        validate_object_path(path)?;
        Ok(self.root.join(bucket).join(path))
    }
}

#[async_trait::async_trait]
impl SnapshotStore for FsSnapshotStore {
    async fn read(&self, bucket: &str, path: &str) -> Result<Bytes, StorageError> {
        let target = self.object_path(bucket, path)?;
        let (bucket, path) = (bucket.to_string(), path.to_string());
        run_blocking(move || match fs::read(&target) {
            Ok(data) => Ok(Bytes::from(data)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                Err(StorageError::NotFound { bucket, path })
            }
            Err(err) => Err(io_error(&target, err)),
        })
        .await
    }

    async fn write(&self, bucket: &str, path: &str, payload: Bytes) -> Result<(), StorageError> {
        let target = self.object_path(bucket, path)?;
        run_blocking(move || write_atomic(&target, &payload)).await
    }
}

/// Writes to a temp file next to `target`, then renames it over `target`.
fn write_atomic(target: &Path, payload: &[u8]) -> Result<(), StorageError> {
    let dir = target
        .parent()
        .ok_or_else(|| StorageError::InvalidPath(target.display().to_string()))?;
    ensure_dir(dir)?;

    let mut tmp = NamedTempFile::new_in(dir).map_err(|e| io_error(dir, e))?;
    tmp.write_all(payload).map_err(|e| io_error(target, e))?;
    tmp.flush().map_err(|e| io_error(target, e))?;
    tmp.as_file_mut()
        .sync_all()
        .map_err(|e| io_error(target, e))?;

    tmp.persist(target).map_err(|e| io_error(target, e.error))?;
    Ok(())
}

/// Ensure `dir` exists as a directory; create it if missing.
fn ensure_dir(dir: &Path) -> Result<(), StorageError> {
    if dir.exists() {
        let meta = fs::metadata(dir).map_err(|e| io_error(dir, e))?;
        if !meta.is_dir() {
            return Err(io_error(dir, io::Error::other("path is not a directory")));
        }
        return Ok(());
    }
    fs::create_dir_all(dir).map_err(|e| io_error(dir, e))
}

fn io_error(path: &Path, source: io::Error) -> StorageError {
    StorageError::Io {
        path: path.display().to_string(),
        source,
    }
}

async fn run_blocking<T, F>(job: F) -> Result<T, StorageError>
where
    F: FnOnce() -> Result<T, StorageError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(job)
        .await
        .map_err(|err| StorageError::Backend(format!("storage task failed: {err}")))?
}
