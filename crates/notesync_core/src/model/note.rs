//! Note domain model.
//!
//! # Responsibility
//! - Define the canonical note record delivered by collection snapshots.
//! - Provide the content metrics backing the store's aggregate views.
//!
//! # Invariants
//! - `id` is assigned by the remote store on creation and never changes.
//! - `date` is the creation timestamp in epoch milliseconds rendered as a
//!   decimal string; it is both payload and the collection sort key.

use serde::{Deserialize, Serialize};

/// Remote-assigned note identifier, opaque to the core.
///
/// Kept as a type alias to make semantic intent explicit in signatures.
pub type NoteId = String;

/// Canonical note record.
///
/// The serialized shape is exactly the remote document shape
/// (`id`/`content`/`date`), so snapshots deserialize into this type with no
/// intermediate wire struct.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    /// Stable id, unique within one user's namespace.
    pub id: NoteId,
    /// Free-form note text; may be empty.
    pub content: String,
    /// Creation timestamp in epoch milliseconds, as a decimal string.
    pub date: String,
}

impl Note {
    /// Creates a note record with a known id, as delivered by a snapshot.
    pub fn new(
        id: impl Into<NoteId>,
        content: impl Into<String>,
        date: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            content: content.into(),
            date: date.into(),
        }
    }

    /// Returns the number of characters in the note content.
    ///
    /// Counts Unicode scalar values, not bytes.
    pub fn content_characters(&self) -> usize {
        self.content.chars().count()
    }
}
