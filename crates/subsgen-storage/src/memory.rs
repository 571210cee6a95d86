//! In-memory backends.
//!
//! Used by the `memory` storage backend and by tests. Both can be switched
//! into an unavailable mode where every call fails, which stands in for
//! disabled or exhausted persistent storage.

use crate::keys::validate_key;
use crate::traits::{SelectionStorage, SessionScope, StorageError, StorageResult};
use crate::StorageBackend;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use subsgen_core::PendingSelection;

#[derive(Debug, Default)]
pub struct MemoryStorage {
    records: Mutex<HashMap<String, PendingSelection>>,
    unavailable: AtomicBool,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// A backend that fails every call, as if storage could not be opened.
    pub fn unavailable() -> Self {
        let storage = Self::default();
        storage.set_available(false);
        storage
    }

    pub fn set_available(&self, available: bool) {
        self.unavailable.store(!available, Ordering::SeqCst);
    }

    pub fn len(&self) -> usize {
        self.records.lock().map(|r| r.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn open(&self) -> StorageResult<std::sync::MutexGuard<'_, HashMap<String, PendingSelection>>> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(StorageError::Unavailable(
                "In-memory storage is disabled".to_string(),
            ));
        }
        self.records
            .lock()
            .map_err(|_| StorageError::Unavailable("In-memory storage lock poisoned".to_string()))
    }
}

#[async_trait]
impl SelectionStorage for MemoryStorage {
    async fn put(&self, record: &PendingSelection) -> StorageResult<()> {
        validate_key(&record.id)?;
        self.open()?.insert(record.id.clone(), record.clone());
        Ok(())
    }

    async fn get(&self, key: &str) -> StorageResult<Option<PendingSelection>> {
        validate_key(key)?;
        Ok(self.open()?.get(key).cloned())
    }

    async fn delete(&self, key: &str) -> StorageResult<()> {
        validate_key(key)?;
        self.open()?.remove(key);
        Ok(())
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::Memory
    }
}

#[derive(Debug, Default)]
pub struct MemorySessionScope {
    active: AtomicBool,
    unavailable: AtomicBool,
}

impl MemorySessionScope {
    pub fn new() -> Self {
        Self::default()
    }

    /// Scope whose marker is already set, as after an earlier load in the same session.
    pub fn active() -> Self {
        let scope = Self::default();
        scope.active.store(true, Ordering::SeqCst);
        scope
    }

    pub fn unavailable() -> Self {
        let scope = Self::default();
        scope.unavailable.store(true, Ordering::SeqCst);
        scope
    }

    /// Drop the marker, as happens when the session ends.
    pub fn end_session(&self) {
        self.active.store(false, Ordering::SeqCst);
    }

    fn check_available(&self) -> StorageResult<()> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(StorageError::Unavailable(
                "Session storage is disabled".to_string(),
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl SessionScope for MemorySessionScope {
    async fn is_session_active(&self) -> StorageResult<bool> {
        self.check_available()?;
        Ok(self.active.load(Ordering::SeqCst))
    }

    async fn mark_session_active(&self) -> StorageResult<()> {
        self.check_available()?;
        self.active.store(true, Ordering::SeqCst);
        Ok(())
    }
}
