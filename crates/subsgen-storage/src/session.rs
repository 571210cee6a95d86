//! Session boundary tracking
//!
//! Tells a reload apart from a fresh session by a marker kept in
//! session-scoped storage. A fresh session clears the pending selection; a
//! reload leaves it alone. The marker is (re)asserted on every load and again
//! on teardown.

use crate::store::PendingSelectionStore;
use crate::traits::SessionScope;
use std::sync::Arc;

/// Marker state observed at load time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    NoMarker,
    MarkerSet,
}

/// How the current load relates to the previous one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadKind {
    NewSession,
    Reload,
}

impl SessionState {
    /// Classify a load given the state found. Every load ends in `MarkerSet`.
    pub fn on_load(self) -> (SessionState, LoadKind) {
        match self {
            SessionState::NoMarker => (SessionState::MarkerSet, LoadKind::NewSession),
            SessionState::MarkerSet => (SessionState::MarkerSet, LoadKind::Reload),
        }
    }
}

pub struct SessionTracker {
    scope: Arc<dyn SessionScope>,
    store: PendingSelectionStore,
    state: SessionState,
}

impl SessionTracker {
    pub fn new(scope: Arc<dyn SessionScope>, store: PendingSelectionStore) -> Self {
        Self {
            scope,
            store,
            state: SessionState::NoMarker,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Run once per load, before anything restores the pending selection.
    ///
    /// An unreadable marker counts as a new session: clearing too much is
    /// preferred over leaking a selection into another session. Never fails.
    pub async fn on_load(&mut self) -> LoadKind {
        let found = match self.scope.is_session_active().await {
            Ok(true) => SessionState::MarkerSet,
            Ok(false) => SessionState::NoMarker,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to read session marker, treating as new session");
                SessionState::NoMarker
            }
        };

        let (next, kind) = found.on_load();

        if kind == LoadKind::NewSession {
            tracing::info!("New session detected, clearing pending selection");
            self.store.clear().await;
        } else {
            tracing::debug!("Reload within existing session");
        }

        self.mark_active().await;
        self.state = next;
        kind
    }

    /// Run before the process or page goes away.
    pub async fn on_teardown(&mut self) {
        self.mark_active().await;
        self.state = SessionState::MarkerSet;
    }

    async fn mark_active(&self) {
        if let Err(e) = self.scope.mark_session_active().await {
            tracing::warn!(error = %e, "Failed to set session marker");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn state_machine_transitions() {
        assert_eq!(
            SessionState::NoMarker.on_load(),
            (SessionState::MarkerSet, LoadKind::NewSession)
        );
        assert_eq!(
            SessionState::MarkerSet.on_load(),
            (SessionState::MarkerSet, LoadKind::Reload)
        );
    }
}
