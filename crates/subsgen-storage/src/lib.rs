//! SubsGen Storage Library
//!
//! This crate keeps the user's in-flight video selection alive across
//! reloads. It provides:
//!
//! - the storage port traits ([`SelectionStorage`], [`SessionScope`]),
//! - a local filesystem backend and an in-memory backend,
//! - [`PendingSelectionStore`], the single-slot store with expiry and
//!   error-absorbing save/get/clear,
//! - [`SessionTracker`], which clears the store when a new session starts.
//!
//! # Record layout
//!
//! There is at most one record, stored under the fixed key `current_video`.
//! Every save replaces it. Keys must not contain `..`, `/` or `\`; key checks
//! live in the `keys` module so all backends agree.

pub mod clock;
pub mod factory;
pub(crate) mod keys;
#[cfg(feature = "storage-local")]
pub mod local;
pub mod memory;
pub mod session;
pub mod store;
pub mod traits;

// Re-export commonly used types
pub use clock::{Clock, ManualClock, SystemClock};
pub use factory::{create_session_scope, create_storage, create_store};
#[cfg(feature = "storage-local")]
pub use local::{FileSessionScope, LocalStorage};
pub use memory::{MemorySessionScope, MemoryStorage};
pub use session::{LoadKind, SessionState, SessionTracker};
pub use store::PendingSelectionStore;
pub use subsgen_core::StorageBackend;
pub use traits::{SelectionStorage, SessionScope, StorageError, StorageResult};
