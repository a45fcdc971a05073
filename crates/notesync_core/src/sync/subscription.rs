//! Single-owner slot for the active live-query handle.
//!
//! # Responsibility
//! - Own at most one [`SubscriptionHandle`] at a time.
//! - Make acquire/release ordering a type-level property instead of a
//!   caller obligation.
//!
//! # Invariants
//! - `replace` releases the previous handle before storing the next one.
//! - `release` is idempotent.

use crate::remote::SubscriptionHandle;

/// Holds the one active subscription handle of a sync store.
#[derive(Debug, Default)]
pub struct SubscriptionSlot {
    active: Option<SubscriptionHandle>,
}

impl SubscriptionSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns whether a handle is currently held.
    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    /// Stores `handle` as the active registration.
    ///
    /// Any previously held handle is released first, so a slot can never
    /// leak a registration.
    pub fn replace(&mut self, handle: SubscriptionHandle) {
        self.release();
        self.active = Some(handle);
    }

    /// Releases the active handle if present. Safe to call repeatedly.
    pub fn release(&mut self) {
        if let Some(handle) = self.active.take() {
            handle.release();
        }
    }
}
