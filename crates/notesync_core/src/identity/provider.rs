//! Identity provider contract and in-process implementation.
//!
//! # Responsibility
//! - Expose the current authenticated principal reactively.
//! - Notify watchers on sign-in and sign-out transitions.
//!
//! # Invariants
//! - Redundant transitions (the current user signing in again, sign-out
//!   while already signed out) do not notify watchers.
//! - Releasing a watch handle stops delivery for good.

use crate::remote::SubscriptionHandle;
use log::debug;
use serde::{Deserialize, Serialize};
use std::sync::atomic::AtomicU64;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Current authenticated principal; `user_id = None` means signed out.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Principal {
    pub user_id: Option<String>,
}

impl Principal {
    pub fn signed_in(user_id: impl Into<String>) -> Self {
        Self {
            user_id: Some(user_id.into()),
        }
    }

    pub fn signed_out() -> Self {
        Self::default()
    }

    pub fn is_signed_in(&self) -> bool {
        self.user_id.is_some()
    }
}

/// Principal transition pushed to watchers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdentityEvent {
    SignedIn(String),
    SignedOut,
}

/// Boxed watcher invoked on every principal transition.
pub type IdentityListener = Box<dyn Fn(IdentityEvent) + Send + Sync>;

/// Reactive source of the current authenticated principal.
pub trait IdentityProvider: Send + Sync {
    /// Returns the current principal.
    fn principal(&self) -> Principal;

    /// Registers a watcher for principal transitions.
    ///
    /// The watcher is not called for the already-current principal; apply
    /// that yourself before watching (see `SessionBinding::attach`).
    fn watch(&self, listener: IdentityListener) -> SubscriptionHandle;
}

type SharedListener = Arc<dyn Fn(IdentityEvent) + Send + Sync>;

struct Watcher {
    id: u64,
    listener: SharedListener,
}

#[derive(Default)]
struct IdentityState {
    principal: Principal,
    watchers: Vec<Watcher>,
}

/// In-process identity provider driven by explicit sign-in/out calls.
#[derive(Default)]
pub struct MemoryIdentityProvider {
    state: Arc<Mutex<IdentityState>>,
    next_watcher_id: AtomicU64,
}

impl MemoryIdentityProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Signs `user_id` in; notifies watchers on an actual transition.
    pub fn sign_in(&self, user_id: impl Into<String>) {
        let user_id = user_id.into();
        let watchers = {
            let mut state = self.lock_state();
            if state.principal.user_id.as_deref() == Some(user_id.as_str()) {
                return;
            }
            state.principal = Principal::signed_in(user_id.clone());
            collect_watchers(&state)
        };
        debug!("event=identity_sign_in module=identity status=ok user={user_id}");
        for watcher in watchers {
            watcher(IdentityEvent::SignedIn(user_id.clone()));
        }
    }

    /// Signs out; notifies watchers only when someone was signed in.
    pub fn sign_out(&self) {
        let watchers = {
            let mut state = self.lock_state();
            if !state.principal.is_signed_in() {
                return;
            }
            state.principal = Principal::signed_out();
            collect_watchers(&state)
        };
        debug!("event=identity_sign_out module=identity status=ok");
        for watcher in watchers {
            watcher(IdentityEvent::SignedOut);
        }
    }

    fn lock_state(&self) -> MutexGuard<'_, IdentityState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl IdentityProvider for MemoryIdentityProvider {
    fn principal(&self) -> Principal {
        self.lock_state().principal.clone()
    }

    fn watch(&self, listener: IdentityListener) -> SubscriptionHandle {
        let listener: SharedListener = Arc::from(listener);
        let id = self
            .next_watcher_id
            .fetch_add(1, std::sync::atomic::Ordering::Relaxed);
        self.lock_state().watchers.push(Watcher { id, listener });

        let state = Arc::clone(&self.state);
        SubscriptionHandle::new(move || {
            let mut state = state.lock().unwrap_or_else(PoisonError::into_inner);
            state.watchers.retain(|watcher| watcher.id != id);
        })
    }
}

fn collect_watchers(state: &IdentityState) -> Vec<SharedListener> {
    // Callbacks run outside the lock so a watcher may query the provider.
    state
        .watchers
        .iter()
        .map(|watcher| Arc::clone(&watcher.listener))
        .collect()
}
