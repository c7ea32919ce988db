//! Fetcher store: snapshot codec, storage backends and the restore/export manager.
mod codec;
mod error;
mod layout;
mod manager;
mod memory;
mod persist;
mod storage;

pub use codec::{decode, encode, CodecError, CODEC_EXTENSION, MAX_SNAPSHOT_BYTES};
pub use error::{ExportError, ImportError};
pub use layout::{Environment, StorageLayout, DEFAULT_BUCKET};
pub use manager::{ExportSettings, StateStore};
pub use memory::MemorySnapshotStore;
pub use persist::FsSnapshotStore;
pub use storage::{SnapshotStore, StorageError};
