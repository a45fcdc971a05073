//! Notes synchronization core.
//!
//! # Responsibility
//! - Own the live, per-user view of the notes collection.
//! - Manage the subscription lifecycle across sign-in/sign-out.
//!
//! # Invariants
//! - One store instance holds at most one active subscription.
//! - All state is instance-owned; no process-wide mutable state.

pub mod notes_store;
pub mod subscription;

pub use notes_store::{NotesStore, SyncError, SyncPhase, SyncResult};
pub use subscription::SubscriptionSlot;
