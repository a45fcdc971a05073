//! Live-sync core for a per-user notes collection.
//!
//! This crate owns the authoritative in-memory view of one authenticated
//! user's notes, keeps it in sync with a remote document collection through
//! a live-query subscription, and mediates all mutation intents. Document
//! backends and identity sources are pluggable through the [`DocumentStore`]
//! and [`IdentityProvider`] traits; in-process implementations of both ship
//! with the crate so the core can run and be tested without a network.

pub mod identity;
pub mod logging;
pub mod model;
pub mod remote;
pub mod sync;

pub use identity::{
    IdentityEvent, IdentityListener, IdentityProvider, MemoryIdentityProvider, Principal,
    SessionBinding,
};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::note::{Note, NoteId};
pub use remote::{
    CollectionEvent, CollectionListener, CollectionPath, CollectionQuery, DocumentPath,
    DocumentStore, MemoryDocumentStore, OrderDirection, RemoteError, RemoteResult,
    SubscriptionHandle,
};
pub use sync::{NotesStore, SubscriptionSlot, SyncError, SyncPhase, SyncResult};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
