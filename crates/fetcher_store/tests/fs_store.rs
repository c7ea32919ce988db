use std::fs;
use std::sync::Arc;

use bytes::Bytes;
use fetcher_core::{create_init_state, SnapshotKind};
use fetcher_store::{
    Environment, ExportSettings, FsSnapshotStore, SnapshotStore, StateStore, StorageLayout,
};
use pretty_assertions::assert_eq;
use tempfile::TempDir;

#[tokio::test]
async fn write_creates_missing_folders_and_reads_back() {
    let temp = TempDir::new().unwrap();
    let store = FsSnapshotStore::new(temp.path());

    store
        .write("bucket", "fetcher/state_v1.brotli", Bytes::from_static(b"hello"))
        .await
        .unwrap();
    assert!(temp.path().join("bucket/fetcher").is_dir());

    let data = store.read("bucket", "fetcher/state_v1.brotli").await.unwrap();
    assert_eq!(&data[..], b"hello");
}

#[tokio::test]
async fn write_replaces_existing_object() {
    let temp = TempDir::new().unwrap();
    let store = FsSnapshotStore::new(temp.path());

    store
        .write("bucket", "a/state", Bytes::from_static(b"first"))
        .await
        .unwrap();
    store
        .write("bucket", "a/state", Bytes::from_static(b"second"))
        .await
        .unwrap();

    let on_disk = fs::read(temp.path().join("bucket/a/state")).unwrap();
    assert_eq!(on_disk, b"second");
    // No temp files are left behind.
    let entries = fs::read_dir(temp.path().join("bucket/a")).unwrap().count();
    assert_eq!(entries, 1);
}

#[tokio::test]
async fn missing_object_is_not_found() {
    let temp = TempDir::new().unwrap();
    let store = FsSnapshotStore::new(temp.path());

    let err = store.read("bucket", "fetcher/none").await.unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn paths_escaping_the_bucket_are_rejected() {
    let temp = TempDir::new().unwrap();
    let store = FsSnapshotStore::new(temp.path().join("root"));

    let err = store
        .write("bucket", "../outside", Bytes::from_static(b"x"))
        .await
        .unwrap_err();
    assert!(!err.is_not_found());
    assert!(!temp.path().join("root/outside").exists());
}

#[tokio::test]
async fn write_fails_when_folder_is_a_file() {
    let temp = TempDir::new().unwrap();
    fs::create_dir_all(temp.path().join("bucket")).unwrap();
    fs::write(temp.path().join("bucket/fetcher"), "x").unwrap();
    let store = FsSnapshotStore::new(temp.path());

    let result = store
        .write("bucket", "fetcher/state", Bytes::from_static(b"data"))
        .await;
    assert!(result.is_err());
}

#[tokio::test]
async fn state_survives_a_restart_on_disk() {
    fetcher_logging::initialize_for_tests();
    let temp = TempDir::new().unwrap();
    let layout = StorageLayout::new("fly-xc", Environment::Development);

    let mut state = create_init_state(1_000);
    state.last_tick_sec = 4_000;
    state.stopped_sec = 4_010;
    {
        let storage = Arc::new(FsSnapshotStore::new(temp.path()));
        let store = StateStore::new(storage, layout.clone(), ExportSettings::default());
        store.export(SnapshotKind::Shutdown, &state).await.unwrap();
    }
    assert!(temp
        .path()
        .join("fly-xc/fetcher.dev/state_v1.shutdown.brotli")
        .is_file());

    let storage = Arc::new(FsSnapshotStore::new(temp.path()));
    let store = StateStore::new(storage, layout, ExportSettings::default());
    let restored = store.restore_state(create_init_state(9_000)).await;
    assert_eq!(restored, state);
}
