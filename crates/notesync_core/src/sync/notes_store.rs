//! Notes synchronization store.
//!
//! # Responsibility
//! - Own the authoritative in-memory view of one user's notes.
//! - Manage the live-query subscription lifecycle across sessions.
//! - Mediate create/update/delete intents against the remote store.
//!
//! # Invariants
//! - Each snapshot replaces the whole view; snapshots are never merged.
//! - A snapshot from a superseded subscription epoch is discarded, so the
//!   view never mixes notes of two users or two sessions.
//! - The local view changes only through snapshots; mutations are not
//!   applied optimistically.

use crate::model::note::{Note, NoteId};
use crate::remote::{
    CollectionEvent, CollectionPath, CollectionQuery, DocumentStore, OrderDirection, RemoteError,
};
use crate::sync::subscription::SubscriptionSlot;
use log::{debug, error, info};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{SystemTime, UNIX_EPOCH};

const USERS_SEGMENT: &str = "users";
const NOTES_SEGMENT: &str = "notes";
const ORDER_FIELD: &str = "date";

pub type SyncResult<T> = Result<T, SyncError>;

/// Errors surfaced by the notes synchronization store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncError {
    /// `init` was called with an unusable user identifier.
    InvalidUserId(String),
    /// A namespace-dependent operation ran before `init`.
    NotBound,
    /// The remote store rejected the operation.
    Remote(RemoteError),
}

impl Display for SyncError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidUserId(value) => write!(f, "invalid user id: `{value}`"),
            Self::NotBound => write!(f, "store is not bound to a user"),
            Self::Remote(err) => write!(f, "{err}"),
        }
    }
}

impl Error for SyncError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Remote(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RemoteError> for SyncError {
    fn from(value: RemoteError) -> Self {
        Self::Remote(value)
    }
}

/// Lifecycle phase of one store instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncPhase {
    /// No user bound, no subscription.
    Unbound,
    /// Subscription requested, no snapshot applied yet.
    Subscribing,
    /// At least one snapshot applied; the view is live.
    Synced,
}

/// View state shared between the store and its snapshot listener.
struct ViewState {
    notes: Vec<Note>,
    loaded: bool,
    /// Bumped on every subscribe/teardown; events tagged with an older
    /// epoch are stale and must not touch the view.
    epoch: u64,
}

struct UserBinding {
    user_id: String,
    collection: CollectionPath,
}

/// Live view of one authenticated user's notes collection.
///
/// The store is reusable across sessions: `init` binds a user and starts
/// the live query, `unsubscribe` returns it to `Unbound`. All state is
/// owned by the instance, so independent stores never interfere.
pub struct NotesStore {
    remote: Arc<dyn DocumentStore>,
    view: Arc<Mutex<ViewState>>,
    binding: Option<UserBinding>,
    slot: SubscriptionSlot,
}

impl NotesStore {
    /// Creates an unbound store on top of a remote document backend.
    pub fn new(remote: Arc<dyn DocumentStore>) -> Self {
        Self {
            remote,
            view: Arc::new(Mutex::new(ViewState {
                notes: Vec::new(),
                loaded: false,
                epoch: 0,
            })),
            binding: None,
            slot: SubscriptionSlot::new(),
        }
    }

    /// Binds the store to `user_id`'s namespace and starts the live query.
    ///
    /// Any previous binding is torn down first, so switching users is
    /// leak-free without an explicit `unsubscribe`.
    ///
    /// # Errors
    /// - `SyncError::InvalidUserId` for a blank id or one containing `/`.
    /// - `SyncError::Remote` when the live query fails to attach.
    pub fn init(&mut self, user_id: &str) -> SyncResult<()> {
        let trimmed = user_id.trim();
        if trimmed.is_empty() || trimmed.contains('/') {
            return Err(SyncError::InvalidUserId(user_id.to_string()));
        }

        if self.binding.is_some() {
            self.unsubscribe();
        }

        let collection =
            CollectionPath::new(format!("{USERS_SEGMENT}/{trimmed}/{NOTES_SEGMENT}"))?;
        info!("event=notes_init module=sync status=ok user={trimmed}");
        self.binding = Some(UserBinding {
            user_id: trimmed.to_string(),
            collection,
        });
        self.subscribe()
    }

    /// Registers the live query for the bound namespace, ordered by
    /// creation timestamp descending.
    ///
    /// Replaces any previous registration (the old handle is released
    /// first and its in-flight deliveries are discarded by epoch). Each
    /// snapshot replaces the whole view and sets the loaded flag; a
    /// subscription error event is logged and clears the loaded flag
    /// without crashing the store.
    ///
    /// # Errors
    /// - `SyncError::NotBound` when no user is bound.
    /// - `SyncError::Remote` when the backend rejects the registration.
    pub fn subscribe(&mut self) -> SyncResult<()> {
        let binding = self.binding.as_ref().ok_or(SyncError::NotBound)?;

        let epoch = {
            let mut view = lock_view(&self.view);
            view.epoch += 1;
            view.loaded = false;
            view.epoch
        };
        self.slot.release();

        let query = CollectionQuery::new(
            binding.collection.clone(),
            ORDER_FIELD,
            OrderDirection::Descending,
        );
        let view = Arc::clone(&self.view);
        let user_id = binding.user_id.clone();
        let listener = Box::new(move |event: CollectionEvent| {
            apply_event(&view, epoch, &user_id, event);
        });

        let handle = match self.remote.subscribe(query, listener) {
            Ok(handle) => handle,
            Err(err) => {
                error!(
                    "event=notes_subscribe module=sync status=error user={} error={err}",
                    binding.user_id
                );
                return Err(err.into());
            }
        };
        self.slot.replace(handle);
        info!(
            "event=notes_subscribe module=sync status=ok user={} epoch={epoch}",
            binding.user_id
        );
        Ok(())
    }

    /// Releases the live query (if any) and clears the local view and the
    /// user binding.
    ///
    /// Idempotent and safe in any phase; returns the store to `Unbound`.
    pub fn unsubscribe(&mut self) {
        self.slot.release();
        let user = self.binding.take().map(|binding| binding.user_id);
        {
            let mut view = lock_view(&self.view);
            view.epoch += 1;
            view.notes.clear();
            view.loaded = false;
        }
        if let Some(user) = user {
            info!("event=notes_unsubscribe module=sync status=ok user={user}");
        }
    }

    /// Creates a note with the given content in the bound namespace.
    ///
    /// The creation timestamp is derived from the current system time.
    /// Returns the remote-assigned id. The local view is not touched here;
    /// the new note lands with the next snapshot. A remote failure is
    /// returned to the caller and simply never appears in the view.
    pub fn create_note(&self, content: &str) -> SyncResult<NoteId> {
        let binding = self.require_binding()?;
        let date = epoch_ms_string();
        let id = self
            .remote
            .create_document(&binding.collection, content, &date)?;
        debug!(
            "event=note_create module=sync status=ok user={} id={id}",
            binding.user_id
        );
        Ok(id)
    }

    /// Replaces the content of one remote note.
    ///
    /// No local existence check is performed; an unknown id surfaces the
    /// remote store's own not-found error.
    pub fn update_note(&self, id: &str, content: &str) -> SyncResult<()> {
        let binding = self.require_binding()?;
        self.remote
            .update_document(&binding.collection.document(id), content)?;
        debug!(
            "event=note_update module=sync status=ok user={} id={id}",
            binding.user_id
        );
        Ok(())
    }

    /// Deletes one remote note; same error contract as `update_note`.
    pub fn delete_note(&self, id: &str) -> SyncResult<()> {
        let binding = self.require_binding()?;
        self.remote
            .delete_document(&binding.collection.document(id))?;
        debug!(
            "event=note_delete module=sync status=ok user={} id={id}",
            binding.user_id
        );
        Ok(())
    }

    /// Returns the content of the note with `id` from the current view,
    /// or `None` when no such note is present.
    pub fn note_content(&self, id: &str) -> Option<String> {
        lock_view(&self.view)
            .notes
            .iter()
            .find(|note| note.id == id)
            .map(|note| note.content.clone())
    }

    /// Number of notes in the current view.
    pub fn notes_len(&self) -> usize {
        lock_view(&self.view).notes.len()
    }

    /// Sum of content character counts across the current view.
    pub fn notes_characters(&self) -> usize {
        lock_view(&self.view)
            .notes
            .iter()
            .map(Note::content_characters)
            .sum()
    }

    /// Current view, newest first.
    pub fn notes(&self) -> Vec<Note> {
        lock_view(&self.view).notes.clone()
    }

    /// Whether at least one snapshot has been applied since the last
    /// subscribe.
    pub fn is_loaded(&self) -> bool {
        lock_view(&self.view).loaded
    }

    /// Bound user id, when any.
    pub fn user_id(&self) -> Option<&str> {
        self.binding.as_ref().map(|binding| binding.user_id.as_str())
    }

    /// Current lifecycle phase.
    pub fn phase(&self) -> SyncPhase {
        if self.binding.is_none() {
            return SyncPhase::Unbound;
        }
        if lock_view(&self.view).loaded {
            SyncPhase::Synced
        } else {
            SyncPhase::Subscribing
        }
    }

    fn require_binding(&self) -> SyncResult<&UserBinding> {
        self.binding.as_ref().ok_or(SyncError::NotBound)
    }
}

fn apply_event(view: &Arc<Mutex<ViewState>>, epoch: u64, user_id: &str, event: CollectionEvent) {
    match event {
        CollectionEvent::Snapshot(notes) => {
            let mut state = lock_view(view);
            if state.epoch != epoch {
                debug!(
                    "event=notes_snapshot module=sync status=stale user={user_id} epoch={epoch} current={}",
                    state.epoch
                );
                return;
            }
            debug!(
                "event=notes_snapshot module=sync status=ok user={user_id} count={}",
                notes.len()
            );
            state.notes = notes;
            state.loaded = true;
        }
        CollectionEvent::Error(err) => {
            let mut state = lock_view(view);
            if state.epoch != epoch {
                return;
            }
            // The view may now be stale; keep the notes for rendering but
            // drop the loaded flag. Re-attaching is an explicit subscribe().
            state.loaded = false;
            error!("event=notes_subscription module=sync status=error user={user_id} error={err}");
        }
    }
}

fn lock_view(view: &Arc<Mutex<ViewState>>) -> MutexGuard<'_, ViewState> {
    // A poisoned lock only means a delivery thread panicked; view state is
    // replaced wholesale and stays value-consistent.
    view.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Current time as epoch milliseconds, matching the note `date` shape.
fn epoch_ms_string() -> String {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis())
        .unwrap_or_default()
        .to_string()
}
