//! In-process document backend with live snapshot fan-out.
//!
//! # Responsibility
//! - Implement [`DocumentStore`] entirely in memory, for tests and for
//!   embedders that want a local backend.
//! - Emit a full ordered snapshot to collection listeners on every change.
//!
//! # Invariants
//! - Listener callbacks run outside the internal lock; a listener may call
//!   back into the store without deadlocking.
//! - `subscribe` delivers the current snapshot immediately on registration.
//! - Order keys compare numerically when both parse as integers, so
//!   epoch-millisecond strings of different lengths order correctly.

use super::document_store::{
    CollectionEvent, CollectionListener, CollectionPath, CollectionQuery, DocumentPath,
    DocumentStore, OrderDirection, SubscriptionHandle,
};
use super::{RemoteError, RemoteResult};
use crate::model::note::Note;
use log::debug;
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::sync::atomic::AtomicU64;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use uuid::Uuid;

const ORDER_FIELD_DATE: &str = "date";
const ORDER_FIELD_ID: &str = "id";

type SharedListener = Arc<dyn Fn(CollectionEvent) + Send + Sync>;

struct Registration {
    id: u64,
    query: CollectionQuery,
    listener: SharedListener,
}

#[derive(Default)]
struct Shared {
    collections: BTreeMap<CollectionPath, BTreeMap<String, Note>>,
    listeners: Vec<Registration>,
}

/// Thread-safe in-memory implementation of [`DocumentStore`].
///
/// Collections are keyed by path, documents by store-assigned UUIDv4 ids.
/// Every successful mutation recomputes the ordered snapshot of the touched
/// collection and fans it out to that collection's listeners.
#[derive(Default)]
pub struct MemoryDocumentStore {
    shared: Arc<Mutex<Shared>>,
    next_listener_id: AtomicU64,
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live listener registrations across all collections.
    pub fn listener_count(&self) -> usize {
        self.lock_shared().listeners.len()
    }

    /// Number of documents currently stored in `collection`.
    pub fn document_count(&self, collection: &CollectionPath) -> usize {
        self.lock_shared()
            .collections
            .get(collection)
            .map(BTreeMap::len)
            .unwrap_or(0)
    }

    fn lock_shared(&self) -> MutexGuard<'_, Shared> {
        // A poisoned lock only means a listener panicked mid-delivery; the
        // document maps themselves are never left half-written.
        self.shared.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn snapshot_for(shared: &Shared, query: &CollectionQuery) -> Vec<Note> {
        let mut notes: Vec<Note> = shared
            .collections
            .get(&query.collection)
            .map(|documents| documents.values().cloned().collect())
            .unwrap_or_default();
        sort_snapshot(&mut notes, query);
        notes
    }

    fn notify_collection(&self, collection: &CollectionPath) {
        let pending: Vec<(SharedListener, Vec<Note>)> = {
            let shared = self.lock_shared();
            shared
                .listeners
                .iter()
                .filter(|registration| &registration.query.collection == collection)
                .map(|registration| {
                    (
                        Arc::clone(&registration.listener),
                        Self::snapshot_for(&shared, &registration.query),
                    )
                })
                .collect()
        };

        for (listener, notes) in pending {
            listener(CollectionEvent::Snapshot(notes));
        }
    }
}

impl DocumentStore for MemoryDocumentStore {
    fn subscribe(
        &self,
        query: CollectionQuery,
        listener: CollectionListener,
    ) -> RemoteResult<SubscriptionHandle> {
        match query.order_field.as_str() {
            ORDER_FIELD_DATE | ORDER_FIELD_ID => {}
            other => return Err(RemoteError::UnsupportedOrderField(other.to_string())),
        }

        let listener: SharedListener = Arc::from(listener);
        let id = self
            .next_listener_id
            .fetch_add(1, std::sync::atomic::Ordering::Relaxed);

        let initial = {
            let mut shared = self.lock_shared();
            shared.listeners.push(Registration {
                id,
                query: query.clone(),
                listener: Arc::clone(&listener),
            });
            Self::snapshot_for(&shared, &query)
        };
        debug!(
            "event=memory_subscribe module=remote status=ok collection={} listener={id}",
            query.collection
        );
        listener(CollectionEvent::Snapshot(initial));

        let shared = Arc::clone(&self.shared);
        Ok(SubscriptionHandle::new(move || {
            let mut shared = shared.lock().unwrap_or_else(PoisonError::into_inner);
            shared.listeners.retain(|registration| registration.id != id);
        }))
    }

    fn create_document(
        &self,
        collection: &CollectionPath,
        content: &str,
        date: &str,
    ) -> RemoteResult<String> {
        let id = Uuid::new_v4().to_string();
        {
            let mut shared = self.lock_shared();
            shared
                .collections
                .entry(collection.clone())
                .or_default()
                .insert(id.clone(), Note::new(id.clone(), content, date));
        }
        debug!("event=memory_create module=remote status=ok collection={collection} id={id}");
        self.notify_collection(collection);
        Ok(id)
    }

    fn update_document(&self, document: &DocumentPath, content: &str) -> RemoteResult<()> {
        {
            let mut shared = self.lock_shared();
            let note = shared
                .collections
                .get_mut(&document.collection)
                .and_then(|documents| documents.get_mut(&document.id))
                .ok_or_else(|| RemoteError::NotFound {
                    collection: document.collection.as_str().to_string(),
                    id: document.id.clone(),
                })?;
            note.content = content.to_string();
        }
        debug!("event=memory_update module=remote status=ok document={document}");
        self.notify_collection(&document.collection);
        Ok(())
    }

    fn delete_document(&self, document: &DocumentPath) -> RemoteResult<()> {
        {
            let mut shared = self.lock_shared();
            let removed = shared
                .collections
                .get_mut(&document.collection)
                .and_then(|documents| documents.remove(&document.id));
            if removed.is_none() {
                return Err(RemoteError::NotFound {
                    collection: document.collection.as_str().to_string(),
                    id: document.id.clone(),
                });
            }
        }
        debug!("event=memory_delete module=remote status=ok document={document}");
        self.notify_collection(&document.collection);
        Ok(())
    }
}

fn sort_snapshot(notes: &mut [Note], query: &CollectionQuery) {
    notes.sort_by(|a, b| {
        let (key_a, key_b) = match query.order_field.as_str() {
            ORDER_FIELD_ID => (a.id.as_str(), b.id.as_str()),
            _ => (a.date.as_str(), b.date.as_str()),
        };
        // Ties fall back to id so snapshot order stays deterministic.
        let ordering = compare_order_keys(key_a, key_b).then_with(|| a.id.cmp(&b.id));
        match query.direction {
            OrderDirection::Ascending => ordering,
            OrderDirection::Descending => ordering.reverse(),
        }
    });
}

/// Compares order keys numerically when both parse as integers,
/// lexicographically otherwise.
fn compare_order_keys(a: &str, b: &str) -> Ordering {
    match (a.parse::<i128>(), b.parse::<i128>()) {
        (Ok(a), Ok(b)) => a.cmp(&b),
        _ => a.cmp(b),
    }
}
