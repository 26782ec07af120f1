use quillpad_core::{
    Block, DbTarget, Document, InMemoryNoteStore, NewNote, Note, NoteStore, NoteValidationError,
    SqliteNoteStore, StoreError,
};

fn new_note(title: &str, text: &str) -> NewNote {
    NewNote {
        title: title.to_string(),
        content: Document::from_blocks(vec![Block::paragraph(text)]),
        tags: vec!["inbox".to_string()],
    }
}

fn imported(id: &str, updated_at: i64) -> Note {
    Note {
        id: id.to_string(),
        title: format!("note {id}"),
        content: Document::from_blocks(vec![Block::header(id, 1)]),
        tags: Vec::new(),
        created_at: 1,
        updated_at,
    }
}

fn memory_store() -> SqliteNoteStore {
    SqliteNoteStore::open(&DbTarget::Memory).unwrap()
}

#[tokio::test]
async fn create_assigns_uuid_and_equal_times() {
    let store = memory_store();

    let note = store.create(new_note("First", "hello")).await.unwrap();

    assert!(uuid::Uuid::parse_str(&note.id).is_ok());
    assert_eq!(note.created_at, note.updated_at);
    assert_eq!(store.get(&note.id).await.unwrap(), Some(note));
}

#[tokio::test]
async fn update_keeps_created_at_and_never_moves_backwards() {
    let store = memory_store();
    store.import_all(&[imported("n1", i64::MAX / 2)]).await.unwrap();

    let mut edited = store.get("n1").await.unwrap().unwrap();
    edited.title = "renamed".to_string();
    edited.created_at = 999;
    edited.tags = vec!["a".to_string()];
    let saved = store.update(&edited).await.unwrap();

    assert_eq!(saved.title, "renamed");
    assert_eq!(saved.created_at, 1);
    assert_eq!(saved.updated_at, i64::MAX / 2);
    assert_eq!(store.get("n1").await.unwrap(), Some(saved));
}

#[tokio::test]
async fn update_and_delete_of_unknown_ids_are_not_found() {
    let store = memory_store();

    let err = store.update(&imported("ghost", 5)).await.unwrap_err();
    assert!(matches!(err, StoreError::NotFound(id) if id == "ghost"));
    let err = store.delete("ghost").await.unwrap_err();
    assert!(matches!(err, StoreError::NotFound(_)));
    assert_eq!(store.get("ghost").await.unwrap(), None);
}

#[tokio::test]
async fn list_all_orders_by_recency_then_id() {
    let store = memory_store();
    store
        .import_all(&[imported("b", 50), imported("c", 90), imported("a", 50)])
        .await
        .unwrap();

    let ids: Vec<_> = store
        .list_all()
        .await
        .unwrap()
        .into_iter()
        .map(|note| note.id)
        .collect();
    assert_eq!(ids, vec!["c", "a", "b"]);
}

#[tokio::test]
async fn import_all_is_all_or_nothing() {
    let store = memory_store();
    let mut bad = imported("bad", 10);
    bad.created_at = 20;

    let err = store
        .import_all(&[imported("good", 10), bad])
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        StoreError::Validation(NoteValidationError::TimestampOrder { .. })
    ));
    assert!(store.list_all().await.unwrap().is_empty());
}

#[tokio::test]
async fn import_all_upserts_existing_ids() {
    let store = memory_store();
    store.import_all(&[imported("n1", 10)]).await.unwrap();

    let mut replacement = imported("n1", 30);
    replacement.title = "from file".to_string();
    assert_eq!(store.import_all(&[replacement.clone()]).await.unwrap(), 1);

    assert_eq!(store.get("n1").await.unwrap(), Some(replacement));
    assert_eq!(store.list_all().await.unwrap().len(), 1);
}

#[tokio::test]
async fn file_store_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let target = DbTarget::file(dir.path().join("notes.db"));

    let created = {
        let store = SqliteNoteStore::open(&target).unwrap();
        store.create(new_note("Keep", "me")).await.unwrap()
    };

    let reopened = SqliteNoteStore::open(&target).unwrap();
    assert_eq!(reopened.get(&created.id).await.unwrap(), Some(created));
}

#[tokio::test]
async fn memory_backend_matches_sqlite_semantics() {
    let store = InMemoryNoteStore::new();
    let note = store.create(new_note("x", "y")).await.unwrap();

    let mut bad = note.clone();
    bad.tags = vec!["dup".to_string(), "DUP".to_string()];
    assert!(matches!(
        store.update(&bad).await,
        Err(StoreError::Validation(NoteValidationError::InvalidTags(_)))
    ));

    store.delete(&note.id).await.unwrap();
    assert!(store.is_empty());
    assert!(matches!(
        store.delete(&note.id).await,
        Err(StoreError::NotFound(_))
    ));
}
