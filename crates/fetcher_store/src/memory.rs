use std::collections::HashMap;
use std::sync::Mutex;

use bytes::Bytes;

use crate::storage::{SnapshotStore, StorageError};

/// In-process object store, for tests and dry runs.
#[derive(Debug, Default)]
pub struct MemorySnapshotStore {
    objects: Mutex<HashMap<(String, String), Bytes>>,
}

impl MemorySnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, bucket: &str, path: &str, payload: impl Into<Bytes>) {
        self.lock()
            .insert((bucket.to_string(), path.to_string()), payload.into());
    }

    pub fn get(&self, bucket: &str, path: &str) -> Option<Bytes> {
        self.lock()
            .get(&(bucket.to_string(), path.to_string()))
            .cloned()
    }

    /// Number of stored objects across all buckets.
    pub fn object_count(&self) -> usize {
        self.lock().len()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<(String, String), Bytes>> {
        // The map stays consistent even if a holder panicked.
        self.objects
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait::async_trait]
impl SnapshotStore for MemorySnapshotStore {
    async fn read(&self, bucket: &str, path: &str) -> Result<Bytes, StorageError> {
        self.get(bucket, path).ok_or_else(|| StorageError::NotFound {
            bucket: bucket.to_string(),
            path: path.to_string(),
        })
    }

    async fn write(&self, bucket: &str, path: &str, payload: Bytes) -> Result<(), StorageError> {
        self.insert(bucket, path, payload);
        Ok(())
    }
}
