//! Remote document store boundary.
//!
//! # Responsibility
//! - Define the contract the sync core consumes for document persistence
//!   and live collection queries.
//! - Ship an in-process backend for tests and embedders without a network.
//!
//! # Invariants
//! - The core talks to backends only through the [`DocumentStore`] trait.
//! - Releasing a [`SubscriptionHandle`] stops event delivery for good.

use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod document_store;
pub mod memory_store;

pub use document_store::{
    CollectionEvent, CollectionListener, CollectionPath, CollectionQuery, DocumentPath,
    DocumentStore, OrderDirection, SubscriptionHandle,
};
pub use memory_store::MemoryDocumentStore;

pub type RemoteResult<T> = Result<T, RemoteError>;

/// Contract and transport errors surfaced by document store backends.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteError {
    /// Collection or document path is structurally invalid.
    InvalidPath(String),
    /// Backend cannot order a live query by the requested field.
    UnsupportedOrderField(String),
    /// A point operation targeted a document id the backend does not know.
    NotFound { collection: String, id: String },
    /// Backend-specific failure (network, provider outage, quota, ...).
    Backend(String),
}

impl Display for RemoteError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidPath(path) => write!(f, "invalid collection path: `{path}`"),
            Self::UnsupportedOrderField(field) => {
                write!(f, "unsupported order field: `{field}`")
            }
            Self::NotFound { collection, id } => {
                write!(f, "document not found: {collection}/{id}")
            }
            Self::Backend(message) => write!(f, "backend failure: {message}"),
        }
    }
}

impl Error for RemoteError {}
