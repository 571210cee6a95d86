#[cfg(feature = "storage-local")]
use crate::{FileSessionScope, LocalStorage};
use crate::{
    MemorySessionScope, MemoryStorage, PendingSelectionStore, SelectionStorage, SessionScope,
    StorageBackend, SystemClock,
};
use std::sync::Arc;
use subsgen_core::Config;

/// Create the record backend selected by configuration
pub fn create_storage(config: &Config) -> Arc<dyn SelectionStorage> {
    match config.storage_backend {
        #[cfg(feature = "storage-local")]
        StorageBackend::Local => Arc::new(LocalStorage::new(config.data_dir.join("pending_video"))),

        #[cfg(not(feature = "storage-local"))]
        StorageBackend::Local => {
            tracing::warn!(
                "Local storage backend not available (storage-local feature not enabled), using memory"
            );
            Arc::new(MemoryStorage::new())
        }

        StorageBackend::Memory => Arc::new(MemoryStorage::new()),
    }
}

/// Create the session marker scope matching the configured backend
pub fn create_session_scope(config: &Config) -> Arc<dyn SessionScope> {
    match config.storage_backend {
        #[cfg(feature = "storage-local")]
        StorageBackend::Local => Arc::new(FileSessionScope::new(
            &config.session_dir,
            &config.session_id,
        )),

        #[cfg(not(feature = "storage-local"))]
        StorageBackend::Local => Arc::new(MemorySessionScope::new()),

        StorageBackend::Memory => Arc::new(MemorySessionScope::new()),
    }
}

/// Create the pending-selection store with the system clock
pub fn create_store(config: &Config) -> PendingSelectionStore {
    PendingSelectionStore::new(
        create_storage(config),
        Arc::new(SystemClock),
        config.expiry_window,
    )
}
