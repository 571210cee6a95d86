//! Storage port traits
//!
//! Backends implement these; [`crate::PendingSelectionStore`] and
//! [`crate::SessionTracker`] only ever talk to the traits, so tests can swap
//! in the in-memory implementations.

use crate::StorageBackend;
use async_trait::async_trait;
use subsgen_core::PendingSelection;
use thiserror::Error;

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Write failed: {0}")]
    WriteFailed(String),

    #[error("Read failed: {0}")]
    ReadFailed(String),

    #[error("Delete failed: {0}")]
    DeleteFailed(String),

    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    #[error("Corrupt record: {0}")]
    Corrupt(String),

    #[error("Storage unavailable: {0}")]
    Unavailable(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Durable record storage for the pending selection.
///
/// Each call is self-contained: it opens whatever the backend needs, runs one
/// transaction, and releases it before returning. Nothing is shared between
/// calls, so a failed call cannot poison the next one.
#[async_trait]
pub trait SelectionStorage: Send + Sync {
    /// Write `record` under `record.id`, replacing anything already there.
    /// Creates the backing structure on first use.
    async fn put(&self, record: &PendingSelection) -> StorageResult<()>;

    /// Fetch the record stored under `key`, if any.
    async fn get(&self, key: &str) -> StorageResult<Option<PendingSelection>>;

    /// Remove the record under `key`. Removing a missing record succeeds.
    async fn delete(&self, key: &str) -> StorageResult<()>;

    /// Get the storage backend type
    fn backend_type(&self) -> StorageBackend;
}

/// Marker storage whose lifetime is one session (a browser tab, a terminal).
#[async_trait]
pub trait SessionScope: Send + Sync {
    async fn is_session_active(&self) -> StorageResult<bool>;

    async fn mark_session_active(&self) -> StorageResult<()>;
}
