use std::time::Duration;

use fetcher_core::SnapshotKind;
use thiserror::Error;

use crate::codec::CodecError;
use crate::storage::StorageError;

/// Reading one snapshot failed.
#[derive(Debug, Error)]
pub enum ImportError {
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Codec(#[from] CodecError),
}

impl ImportError {
    /// True when the snapshot simply does not exist yet.
    pub fn is_missing(&self) -> bool {
        matches!(self, ImportError::Storage(err) if err.is_not_found())
    }
}

/// A snapshot write did not land. Always reported to the caller.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("an export of the {0} snapshot is already in flight")]
    InFlight(SnapshotKind),
    #[error("failed to encode the {kind} snapshot: {source}")]
    Codec {
        kind: SnapshotKind,
        #[source]
        source: CodecError,
    },
    #[error("failed to write the {kind} snapshot: {source}")]
    Storage {
        kind: SnapshotKind,
        #[source]
        source: StorageError,
    },
    #[error("writing the {kind} snapshot timed out after {timeout:?}")]
    Timeout { kind: SnapshotKind, timeout: Duration },
}

impl ExportError {
    pub fn kind(&self) -> SnapshotKind {
        match self {
            ExportError::InFlight(kind) => *kind,
            ExportError::Codec { kind, .. }
            | ExportError::Storage { kind, .. }
            | ExportError::Timeout { kind, .. } => *kind,
        }
    }
}
