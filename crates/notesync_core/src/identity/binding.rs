//! Session wiring between identity transitions and the sync store.
//!
//! # Responsibility
//! - Drive `NotesStore::init`/`unsubscribe` from identity events.
//! - Apply the already-current principal at attach time.
//!
//! # Invariants
//! - Dropping the binding detaches it; later transitions no longer touch
//!   the store.
//! - `init` failures inside a provider callback are logged, never panic.

use super::provider::{IdentityEvent, IdentityProvider};
use crate::remote::SubscriptionHandle;
use crate::sync::NotesStore;
use log::error;
use std::sync::{Arc, Mutex, PoisonError};

/// Keeps one [`NotesStore`] in sync with one identity provider.
///
/// Holds the watch registration for its whole lifetime.
pub struct SessionBinding {
    _watch: SubscriptionHandle,
}

impl SessionBinding {
    /// Attaches `store` to `provider`.
    ///
    /// The current principal is applied immediately: a signed-in user
    /// triggers `init`, a signed-out principal triggers `unsubscribe`.
    /// Later transitions are applied as they arrive. Failures from `init`
    /// are logged rather than propagated; a provider callback has no
    /// caller to fail into.
    pub fn attach(provider: &dyn IdentityProvider, store: Arc<Mutex<NotesStore>>) -> Self {
        let initial = match provider.principal().user_id {
            Some(user_id) => IdentityEvent::SignedIn(user_id),
            None => IdentityEvent::SignedOut,
        };
        apply(&store, initial);

        let watched = Arc::clone(&store);
        let watch = provider.watch(Box::new(move |event| apply(&watched, event)));
        Self { _watch: watch }
    }
}

fn apply(store: &Arc<Mutex<NotesStore>>, event: IdentityEvent) {
    let mut store = store.lock().unwrap_or_else(PoisonError::into_inner);
    match event {
        IdentityEvent::SignedIn(user_id) => {
            if let Err(err) = store.init(&user_id) {
                error!(
                    "event=session_init module=identity status=error user={user_id} error={err}"
                );
            }
        }
        IdentityEvent::SignedOut => store.unsubscribe(),
    }
}
