//! Session boundary behavior against the pending-selection store.

use std::sync::Arc;
use std::time::Duration;

use subsgen_core::VideoPayload;
use subsgen_storage::{
    FileSessionScope, LoadKind, LocalStorage, ManualClock, MemorySessionScope, MemoryStorage,
    PendingSelectionStore, SelectionStorage, SessionState, SessionTracker,
};

fn video() -> VideoPayload {
    VideoPayload::new("talk.mp4", "video/mp4", b"frames".to_vec())
}

fn memory_store() -> (PendingSelectionStore, Arc<MemoryStorage>) {
    let storage = Arc::new(MemoryStorage::new());
    let store = PendingSelectionStore::new(
        storage.clone(),
        Arc::new(ManualClock::new(0)),
        Duration::from_secs(30 * 60),
    );
    (store, storage)
}

#[tokio::test]
async fn new_session_clears_existing_selection() {
    let (store, storage) = memory_store();
    store.save(video(), "neon").await;
    assert_eq!(storage.len(), 1);

    let mut tracker = SessionTracker::new(Arc::new(MemorySessionScope::new()), store.clone());
    assert_eq!(tracker.state(), SessionState::NoMarker);

    assert_eq!(tracker.on_load().await, LoadKind::NewSession);
    assert_eq!(tracker.state(), SessionState::MarkerSet);
    assert!(store.get().await.is_none());
    assert!(storage.is_empty());
}

#[tokio::test]
async fn reload_preserves_selection() {
    let (store, _) = memory_store();
    store.save(video(), "fire").await;

    let mut tracker = SessionTracker::new(Arc::new(MemorySessionScope::active()), store.clone());
    assert_eq!(tracker.on_load().await, LoadKind::Reload);

    let restored = store.get().await.unwrap();
    assert_eq!(restored.payload, video());
    assert_eq!(restored.style_id, "fire");
}

#[tokio::test]
async fn new_session_with_nothing_pending_is_a_no_op() {
    let (store, storage) = memory_store();
    let mut tracker = SessionTracker::new(Arc::new(MemorySessionScope::new()), store);

    assert_eq!(tracker.on_load().await, LoadKind::NewSession);
    assert!(storage.is_empty());
}

#[tokio::test]
async fn load_sequence_within_and_across_sessions() {
    let (store, _) = memory_store();
    let scope = Arc::new(MemorySessionScope::new());

    // First load of the session, then the user picks a file.
    let mut tracker = SessionTracker::new(scope.clone(), store.clone());
    assert_eq!(tracker.on_load().await, LoadKind::NewSession);
    store.save(video(), "karaoke").await;
    tracker.on_teardown().await;

    // Reload in the same session.
    let mut tracker = SessionTracker::new(scope.clone(), store.clone());
    assert_eq!(tracker.on_load().await, LoadKind::Reload);
    assert_eq!(store.get().await.unwrap().style_id, "karaoke");
    tracker.on_teardown().await;

    // The session ends and a new one begins.
    scope.end_session();
    let mut tracker = SessionTracker::new(scope, store.clone());
    assert_eq!(tracker.on_load().await, LoadKind::NewSession);
    assert!(store.get().await.is_none());
}

#[tokio::test]
async fn unreadable_marker_counts_as_new_session() {
    let (store, storage) = memory_store();
    store.save(video(), "neon").await;

    let mut tracker = SessionTracker::new(Arc::new(MemorySessionScope::unavailable()), store);
    assert_eq!(tracker.on_load().await, LoadKind::NewSession);
    tracker.on_teardown().await;
    assert!(storage.is_empty());
}

#[tokio::test]
async fn unavailable_storage_never_fails_the_load() {
    let storage = Arc::new(MemoryStorage::unavailable());
    let store = PendingSelectionStore::with_defaults(storage);

    let mut tracker =
        SessionTracker::new(Arc::new(MemorySessionScope::unavailable()), store.clone());
    assert_eq!(tracker.on_load().await, LoadKind::NewSession);

    store.save(video(), "neon").await;
    assert!(store.get().await.is_none());
    store.clear().await;
}

#[tokio::test]
async fn on_disk_selection_survives_reload_only() {
    let dir = tempfile::tempdir().unwrap();
    let storage = Arc::new(LocalStorage::new(dir.path().join("data")));
    let store = PendingSelectionStore::with_defaults(storage.clone());
    let run_dir = dir.path().join("run");

    let mut tracker = SessionTracker::new(
        Arc::new(FileSessionScope::new(&run_dir, "shell-1")),
        store.clone(),
    );
    assert_eq!(tracker.on_load().await, LoadKind::NewSession);
    store.save(video(), "purple").await;
    tracker.on_teardown().await;

    let mut reload = SessionTracker::new(
        Arc::new(FileSessionScope::new(&run_dir, "shell-1")),
        store.clone(),
    );
    assert_eq!(reload.on_load().await, LoadKind::Reload);
    assert_eq!(store.get().await.unwrap().style_id, "purple");

    let mut other_session = SessionTracker::new(
        Arc::new(FileSessionScope::new(&run_dir, "shell-2")),
        store.clone(),
    );
    assert_eq!(other_session.on_load().await, LoadKind::NewSession);
    assert!(store.get().await.is_none());
    assert!(storage.get("current_video").await.unwrap().is_none());
}
