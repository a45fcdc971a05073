use notesync_core::{
    CollectionPath, MemoryDocumentStore, MemoryIdentityProvider, NotesStore, SessionBinding,
    SyncPhase,
};
use std::sync::{Arc, Mutex};

fn shared_store(remote: &Arc<MemoryDocumentStore>) -> Arc<Mutex<NotesStore>> {
    let remote = Arc::clone(remote);
    let remote: Arc<dyn notesync_core::DocumentStore> = remote;
    Arc::new(Mutex::new(NotesStore::new(remote)))
}

#[test]
fn attach_applies_an_already_signed_in_principal() {
    let remote = Arc::new(MemoryDocumentStore::new());
    let provider = MemoryIdentityProvider::new();
    provider.sign_in("u1");

    let store = shared_store(&remote);
    let _binding = SessionBinding::attach(&provider, Arc::clone(&store));

    let store = store.lock().unwrap();
    assert_eq!(store.user_id(), Some("u1"));
    assert_eq!(store.phase(), SyncPhase::Synced);
}

#[test]
fn sign_in_initializes_and_sign_out_tears_down() {
    let remote = Arc::new(MemoryDocumentStore::new());
    let provider = MemoryIdentityProvider::new();
    let store = shared_store(&remote);
    let _binding = SessionBinding::attach(&provider, Arc::clone(&store));

    assert_eq!(store.lock().unwrap().phase(), SyncPhase::Unbound);

    provider.sign_in("u1");
    {
        let store = store.lock().unwrap();
        assert_eq!(store.user_id(), Some("u1"));
        assert_eq!(store.phase(), SyncPhase::Synced);
        store.create_note("while signed in").unwrap();
        assert_eq!(store.notes_len(), 1);
    }

    provider.sign_out();
    {
        let store = store.lock().unwrap();
        assert_eq!(store.phase(), SyncPhase::Unbound);
        assert_eq!(store.notes_len(), 0);
        assert_eq!(store.user_id(), None);
    }
    assert_eq!(remote.listener_count(), 0);
}

#[test]
fn switching_users_rebinds_without_leaking_the_old_namespace() {
    let remote = Arc::new(MemoryDocumentStore::new());
    let provider = MemoryIdentityProvider::new();
    let store = shared_store(&remote);
    let _binding = SessionBinding::attach(&provider, Arc::clone(&store));

    provider.sign_in("alice");
    store.lock().unwrap().create_note("alice's note").unwrap();

    provider.sign_in("bob");
    {
        let store = store.lock().unwrap();
        assert_eq!(store.user_id(), Some("bob"));
        assert_eq!(store.notes_len(), 0);
    }
    assert_eq!(remote.listener_count(), 1);

    // Alice's data stays put remotely; only the local binding moved on.
    let alice_collection = CollectionPath::new("users/alice/notes").unwrap();
    assert_eq!(remote.document_count(&alice_collection), 1);
}

#[test]
fn a_dropped_binding_stops_driving_the_store() {
    let remote = Arc::new(MemoryDocumentStore::new());
    let provider = MemoryIdentityProvider::new();
    let store = shared_store(&remote);

    let binding = SessionBinding::attach(&provider, Arc::clone(&store));
    drop(binding);

    provider.sign_in("u1");
    assert_eq!(store.lock().unwrap().phase(), SyncPhase::Unbound);
}
