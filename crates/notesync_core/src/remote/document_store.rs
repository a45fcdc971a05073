//! Document store contract consumed by the sync core.
//!
//! # Responsibility
//! - Define the live-query and point-mutation operations a backend must
//!   provide.
//! - Define the path, query, and event types shared with backends.
//!
//! # Invariants
//! - A listener receives full snapshots; each snapshot supersedes every
//!   earlier one (no incremental merge on the consumer side).
//! - A released subscription handle never delivers again.

use super::{RemoteError, RemoteResult};
use crate::model::note::Note;
use std::fmt::{self, Display, Formatter};

/// Slash-delimited path of one remote collection, e.g. `users/u1/notes`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CollectionPath(String);

impl CollectionPath {
    /// Builds a validated collection path.
    ///
    /// # Errors
    /// - `RemoteError::InvalidPath` when the path is blank or any
    ///   slash-delimited segment is blank.
    pub fn new(path: impl Into<String>) -> RemoteResult<Self> {
        let path = path.into();
        if path.trim().is_empty() || path.split('/').any(|segment| segment.trim().is_empty()) {
            return Err(RemoteError::InvalidPath(path));
        }
        Ok(Self(path))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the address of one document inside this collection.
    pub fn document(&self, id: &str) -> DocumentPath {
        DocumentPath {
            collection: self.clone(),
            id: id.to_string(),
        }
    }
}

impl Display for CollectionPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Fully qualified document address: collection plus document id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentPath {
    pub collection: CollectionPath,
    pub id: String,
}

impl Display for DocumentPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.collection, self.id)
    }
}

/// Sort direction of a live query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderDirection {
    Ascending,
    Descending,
}

/// Live query over one collection, ordered by one document field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectionQuery {
    pub collection: CollectionPath,
    pub order_field: String,
    pub direction: OrderDirection,
}

impl CollectionQuery {
    pub fn new(
        collection: CollectionPath,
        order_field: impl Into<String>,
        direction: OrderDirection,
    ) -> Self {
        Self {
            collection,
            order_field: order_field.into(),
            direction,
        }
    }
}

/// Push event delivered to a live-query listener.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CollectionEvent {
    /// Full ordered result set; supersedes every previous snapshot.
    Snapshot(Vec<Note>),
    /// The live query failed; further snapshots are not guaranteed.
    Error(RemoteError),
}

/// Boxed listener invoked on every pushed event.
pub type CollectionListener = Box<dyn Fn(CollectionEvent) + Send + Sync>;

/// Release token for one live-query registration.
///
/// Releasing stops delivery and spends the token; dropping the handle
/// releases it as well, so a handle can never outlive its owner silently.
pub struct SubscriptionHandle {
    on_release: Option<Box<dyn FnOnce() + Send>>,
}

impl SubscriptionHandle {
    /// Wraps the backend-provided release action.
    pub fn new(on_release: impl FnOnce() + Send + 'static) -> Self {
        Self {
            on_release: Some(Box::new(on_release)),
        }
    }

    /// Releases the registration now.
    pub fn release(mut self) {
        self.run_release();
    }

    fn run_release(&mut self) {
        if let Some(release) = self.on_release.take() {
            release();
        }
    }
}

impl Drop for SubscriptionHandle {
    fn drop(&mut self) {
        self.run_release();
    }
}

impl fmt::Debug for SubscriptionHandle {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("SubscriptionHandle")
            .field("released", &self.on_release.is_none())
            .finish()
    }
}

/// Contract between the sync core and any document backend.
pub trait DocumentStore: Send + Sync {
    /// Registers a live query.
    ///
    /// The listener receives the current snapshot and every subsequent
    /// change until the returned handle is released.
    fn subscribe(
        &self,
        query: CollectionQuery,
        listener: CollectionListener,
    ) -> RemoteResult<SubscriptionHandle>;

    /// Inserts a new document; the backend assigns and returns its id.
    fn create_document(
        &self,
        collection: &CollectionPath,
        content: &str,
        date: &str,
    ) -> RemoteResult<String>;

    /// Replaces the content field of one existing document.
    fn update_document(&self, document: &DocumentPath, content: &str) -> RemoteResult<()>;

    /// Removes one document.
    fn delete_document(&self, document: &DocumentPath) -> RemoteResult<()>;
}
