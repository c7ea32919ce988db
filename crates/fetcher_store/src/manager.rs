use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use fetcher_core::{most_recent_or, FetcherState, SnapshotKind};
use fetcher_logging::{fetcher_debug, fetcher_info, fetcher_warn};
use futures_util::future::join_all;
use tokio::sync::Mutex;

use crate::codec;
use crate::error::{ExportError, ImportError};
use crate::layout::StorageLayout;
use crate::storage::{SnapshotStore, StorageError};

#[derive(Debug, Clone)]
pub struct ExportSettings {
    /// Upper bound for a single snapshot write.
    pub write_timeout: Duration,
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self {
            write_timeout: Duration::from_secs(30),
        }
    }
}

/// Reads and writes the durable snapshots of the fetcher state.
///
/// The manager never owns the live state: callers pass it in for every export
/// and receive the restored value from [`StateStore::restore_state`].
pub struct StateStore {
    storage: Arc<dyn SnapshotStore>,
    layout: StorageLayout,
    settings: ExportSettings,
    periodic_in_flight: Arc<Mutex<()>>,
    shutdown_in_flight: Arc<Mutex<()>>,
}

impl StateStore {
    pub fn new(
        storage: Arc<dyn SnapshotStore>,
        layout: StorageLayout,
        settings: ExportSettings,
    ) -> Self {
        Self {
            storage,
            layout,
            settings,
            periodic_in_flight: Arc::new(Mutex::new(())),
            shutdown_in_flight: Arc::new(Mutex::new(())),
        }
    }

    /// Reads and decodes the snapshot of `kind`.
    pub async fn import(&self, kind: SnapshotKind) -> Result<FetcherState, ImportError> {
        let path = self.layout.path(kind);
        let payload = self.storage.read(self.layout.bucket(), &path).await?;
        let state = codec::decode(&payload)?;
        fetcher_debug!(
            "Imported {} snapshot from {} ({} bytes, last tick {})",
            kind,
            path,
            payload.len(),
            state.last_tick_sec
        );
        Ok(state)
    }

    /// Restores the most recent of the periodic and shutdown snapshots.
    ///
    /// Returns `fallback` unchanged when neither can be read.
    pub async fn restore_state(&self, fallback: FetcherState) -> FetcherState {
        self.restore_from(&SnapshotKind::ALL, fallback).await
    }

    /// Restores the candidate with the greatest `last_tick_sec` among `kinds`.
    ///
    /// Candidates are read concurrently. A candidate that fails to read or
    /// decode is logged and skipped. Ties go to the earliest kind in `kinds`.
    pub async fn restore_from(
        &self,
        kinds: &[SnapshotKind],
        fallback: FetcherState,
    ) -> FetcherState {
        let results = join_all(kinds.iter().map(|&kind| self.import(kind))).await;

        let mut candidates = Vec::with_capacity(kinds.len());
        for (kind, result) in kinds.iter().zip(results) {
            match result {
                Ok(state) => candidates.push(state),
                Err(err) if err.is_missing() => {
                    fetcher_info!("No {} snapshot to restore: {}", kind, err);
                }
                Err(err) => {
                    fetcher_warn!("Can not restore {} snapshot: {}", kind, err);
                }
            }
        }

        if candidates.is_empty() {
            fetcher_info!("No snapshot restored, starting from a fresh state");
        }
        let state = most_recent_or(candidates, fallback);
        fetcher_info!(
            "Using state with last tick {} ({} ticks, {} pilots)",
            state.last_tick_sec,
            state.num_ticks,
            state.pilots.len()
        );
        state
    }

    /// Encodes `state` and overwrites the snapshot of `kind`.
    ///
    /// Fails fast with [`ExportError::InFlight`] while another export of the
    /// same kind is running. A write that outlives the timeout keeps the kind
    /// locked until it lands or fails. Returns the object path written.
    pub async fn export(
        &self,
        kind: SnapshotKind,
        state: &FetcherState,
    ) -> Result<String, ExportError> {
        let guard = match kind {
            SnapshotKind::Periodic => &self.periodic_in_flight,
            SnapshotKind::Shutdown => &self.shutdown_in_flight,
        };
        let in_flight = guard
            .clone()
            .try_lock_owned()
            .map_err(|_| ExportError::InFlight(kind))?;

        let payload =
            codec::encode(state).map_err(|source| ExportError::Codec { kind, source })?;
        let size = payload.len();
        let path = self.layout.path(kind);
        let timeout = self.settings.write_timeout;

        let storage = self.storage.clone();
        let bucket = self.layout.bucket().to_string();
        let object_path = path.clone();
        let mut write = tokio::spawn(async move {
            let result = storage
                .write(&bucket, &object_path, Bytes::from(payload))
                .await;
            drop(in_flight);
            result
        });

        match tokio::time::timeout(timeout, &mut write).await {
            Ok(Ok(Ok(()))) => {
                fetcher_info!(
                    "Exported {} snapshot to {} ({} bytes, tick {})",
                    kind,
                    path,
                    size,
                    state.num_ticks
                );
                Ok(path)
            }
            Ok(Ok(Err(source))) => Err(ExportError::Storage { kind, source }),
            Ok(Err(err)) => Err(ExportError::Storage {
                kind,
                source: StorageError::Backend(format!("write task failed: {err}")),
            }),
            Err(_) => Err(ExportError::Timeout { kind, timeout }),
        }
    }
}
