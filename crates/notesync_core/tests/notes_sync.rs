use notesync_core::{
    CollectionPath, DocumentStore, MemoryDocumentStore, NotesStore, RemoteError, SyncError,
    SyncPhase,
};
use std::sync::Arc;

fn user_collection(user: &str) -> CollectionPath {
    CollectionPath::new(format!("users/{user}/notes")).expect("test path should be valid")
}

#[test]
fn init_loads_an_empty_namespace_and_create_round_trips() {
    let remote = Arc::new(MemoryDocumentStore::new());
    let mut store = NotesStore::new(remote);

    store.init("u1").unwrap();
    assert_eq!(store.phase(), SyncPhase::Synced);
    assert!(store.is_loaded());
    assert_eq!(store.notes_len(), 0);
    assert_eq!(store.user_id(), Some("u1"));

    let id = store.create_note("hi").unwrap();
    assert_eq!(store.notes_len(), 1);
    assert_eq!(store.note_content(&id).as_deref(), Some("hi"));
    assert_eq!(store.note_content("missing"), None);
}

#[test]
fn two_sessions_of_the_same_user_stay_in_sync() {
    let remote: Arc<dyn DocumentStore> = Arc::new(MemoryDocumentStore::new());
    let mut first = NotesStore::new(Arc::clone(&remote));
    let mut second = NotesStore::new(Arc::clone(&remote));

    first.init("u1").unwrap();
    second.init("u1").unwrap();

    let id = first.create_note("shared").unwrap();
    assert_eq!(second.notes_len(), 1);
    assert_eq!(second.note_content(&id).as_deref(), Some("shared"));

    second.delete_note(&id).unwrap();
    assert_eq!(first.notes_len(), 0);
}

#[test]
fn view_is_ordered_by_creation_timestamp_descending() {
    let remote = Arc::new(MemoryDocumentStore::new());
    let collection = user_collection("u1");
    remote.create_document(&collection, "oldest", "1").unwrap();
    remote.create_document(&collection, "newest", "3").unwrap();
    remote.create_document(&collection, "middle", "2").unwrap();

    let mut store = NotesStore::new(remote);
    store.init("u1").unwrap();

    assert_eq!(
        store
            .notes()
            .iter()
            .map(|note| note.date.clone())
            .collect::<Vec<_>>(),
        vec!["3", "2", "1"]
    );
}

#[test]
fn timestamps_of_different_length_order_numerically() {
    let remote = Arc::new(MemoryDocumentStore::new());
    let collection = user_collection("u1");
    remote.create_document(&collection, "nine", "9").unwrap();
    remote.create_document(&collection, "ten", "10").unwrap();

    let mut store = NotesStore::new(remote);
    store.init("u1").unwrap();

    assert_eq!(
        store
            .notes()
            .iter()
            .map(|note| note.content.clone())
            .collect::<Vec<_>>(),
        vec!["ten", "nine"]
    );
}

#[test]
fn aggregates_track_the_current_view() {
    let remote = Arc::new(MemoryDocumentStore::new());
    let mut store = NotesStore::new(remote);
    store.init("u1").unwrap();

    store.create_note("hello").unwrap();
    store.create_note("héllo").unwrap();
    let id = store.create_note("").unwrap();

    assert_eq!(store.notes_len(), 3);
    assert_eq!(store.notes_characters(), 10);

    store.delete_note(&id).unwrap();
    assert_eq!(store.notes_len(), 2);
    assert_eq!(store.notes_characters(), 10);
}

#[test]
fn update_is_visible_through_the_next_snapshot() {
    let remote = Arc::new(MemoryDocumentStore::new());
    let mut store = NotesStore::new(remote);
    store.init("u1").unwrap();

    let id = store.create_note("draft").unwrap();
    store.update_note(&id, "final").unwrap();

    assert_eq!(store.note_content(&id).as_deref(), Some("final"));
    assert_eq!(store.notes_len(), 1);
}

#[test]
fn mutations_on_unknown_ids_surface_the_remote_not_found() {
    let remote = Arc::new(MemoryDocumentStore::new());
    let mut store = NotesStore::new(remote);
    store.init("u1").unwrap();

    let err = store.update_note("ghost", "x").unwrap_err();
    assert!(matches!(
        err,
        SyncError::Remote(RemoteError::NotFound { ref id, .. }) if id == "ghost"
    ));

    let err = store.delete_note("ghost").unwrap_err();
    assert!(matches!(err, SyncError::Remote(RemoteError::NotFound { .. })));
}

#[test]
fn newly_created_note_sorts_before_seeded_history() {
    let remote = Arc::new(MemoryDocumentStore::new());
    let collection = user_collection("u1");
    // Seeded note with a tiny epoch-ms stamp; anything created now is newer.
    remote.create_document(&collection, "hi", "2").unwrap();

    let mut store = NotesStore::new(remote);
    store.init("u1").unwrap();
    assert_eq!(store.notes_len(), 1);

    let id = store.create_note("bye").unwrap();
    assert_eq!(store.notes_len(), 2);
    assert_eq!(store.notes()[0].id, id);
    assert_eq!(store.notes()[0].content, "bye");
    assert_eq!(store.notes()[1].content, "hi");
}
