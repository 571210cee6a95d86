//! Pending-selection store
//!
//! Holds at most one unsent video plus its caption style. Every operation is
//! total from the caller's point of view: failures are logged and the store
//! behaves as if it were empty. This is best-effort caching, not guaranteed
//! durability.

use crate::clock::{Clock, SystemClock};
use crate::traits::SelectionStorage;
use std::sync::Arc;
use std::time::Duration;
use subsgen_core::constants::{DEFAULT_EXPIRY_WINDOW, PENDING_SELECTION_KEY};
use subsgen_core::{PendingSelection, RestoredSelection, VideoPayload};

#[derive(Clone)]
pub struct PendingSelectionStore {
    storage: Arc<dyn SelectionStorage>,
    clock: Arc<dyn Clock>,
    expiry_ms: i64,
}

impl PendingSelectionStore {
    pub fn new(
        storage: Arc<dyn SelectionStorage>,
        clock: Arc<dyn Clock>,
        expiry_window: Duration,
    ) -> Self {
        Self {
            storage,
            clock,
            expiry_ms: i64::try_from(expiry_window.as_millis()).unwrap_or(i64::MAX),
        }
    }

    /// Store backed by `storage` with the system clock and the 30-minute window.
    pub fn with_defaults(storage: Arc<dyn SelectionStorage>) -> Self {
        Self::new(storage, Arc::new(SystemClock), DEFAULT_EXPIRY_WINDOW)
    }

    /// Replace the pending selection with `payload` and `style_id`.
    ///
    /// The style is not checked against the catalog here. Failures are
    /// logged and swallowed.
    pub async fn save(&self, payload: VideoPayload, style_id: &str) {
        let record = PendingSelection::new(payload, style_id, self.clock.now_ms());
        let start = std::time::Instant::now();

        match self.storage.put(&record).await {
            Ok(()) => tracing::debug!(
                key = %record.id,
                filename = %record.payload.filename,
                style_id = %record.style_id,
                size_bytes = record.payload.size_bytes(),
                duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                "Saved pending selection"
            ),
            Err(e) => tracing::error!(
                error = %e,
                key = %record.id,
                backend = %self.storage.backend_type(),
                "Failed to save pending selection"
            ),
        }
    }

    /// Restore the pending selection if one exists and has not expired.
    ///
    /// An expired record is reported as absent and a purge is scheduled in the
    /// background; the caller does not wait for it. Failures read as absent.
    pub async fn get(&self) -> Option<RestoredSelection> {
        let record = match self.storage.get(PENDING_SELECTION_KEY).await {
            Ok(Some(record)) => record,
            Ok(None) => return None,
            Err(e) => {
                tracing::error!(
                    error = %e,
                    key = PENDING_SELECTION_KEY,
                    backend = %self.storage.backend_type(),
                    "Failed to read pending selection"
                );
                return None;
            }
        };

        if record.payload.is_empty() {
            tracing::debug!(key = %record.id, "Pending selection has no file, ignoring");
            return None;
        }

        let now = self.clock.now_ms();
        if record.is_expired(now, self.expiry_ms) {
            tracing::info!(
                key = %record.id,
                age_ms = record.age_ms(now),
                expiry_ms = self.expiry_ms,
                "Pending selection expired"
            );
            self.schedule_purge().await;
            return None;
        }

        Some(record.into_restored())
    }

    /// Remove the pending selection. Safe to call when nothing is stored.
    pub async fn clear(&self) {
        match self.storage.delete(PENDING_SELECTION_KEY).await {
            Ok(()) => tracing::debug!(key = PENDING_SELECTION_KEY, "Cleared pending selection"),
            Err(e) => tracing::error!(
                error = %e,
                key = PENDING_SELECTION_KEY,
                backend = %self.storage.backend_type(),
                "Failed to clear pending selection"
            ),
        }
    }

    /// Delete the record only if it is still expired when the purge runs.
    ///
    /// The re-read and the delete are separate port calls, so a save landing
    /// between them can still be removed. Saves issued before the re-read are
    /// kept.
    async fn purge_expired(&self) {
        match self.storage.get(PENDING_SELECTION_KEY).await {
            Ok(Some(record)) if record.is_expired(self.clock.now_ms(), self.expiry_ms) => {
                self.clear().await;
            }
            Ok(_) => {}
            Err(e) => tracing::warn!(
                error = %e,
                key = PENDING_SELECTION_KEY,
                "Failed to re-read pending selection before purge"
            ),
        }
    }

    async fn schedule_purge(&self) {
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                let store = self.clone();
                handle.spawn(async move {
                    store.purge_expired().await;
                });
            }
            Err(_) => {
                // Not on a tokio runtime: nothing to hand the purge to.
                self.purge_expired().await;
            }
        }
    }
}
