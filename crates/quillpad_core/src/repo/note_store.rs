//! Note store contract shared by every persistence backend.
//!
//! # Responsibility
//! - Define the async CRUD surface the autosave reconciler and services use.
//! - Provide one error type that maps backend failures to semantic ones.
//!
//! # Invariants
//! - `create` assigns a fresh UUID v4 id and equal create/update times.
//! - `update` never moves `updated_at` backwards nor below `created_at`.
//! - `import_all` is atomic: either every note is upserted or none is.

use crate::db::DbError;
use crate::model::note::{NewNote, Note, NoteValidationError};
use async_trait::async_trait;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type StoreResult<T> = Result<T, StoreError>;

/// Persistence failure surfaced to callers of [`NoteStore`].
#[derive(Debug)]
pub enum StoreError {
    NotFound(String),
    Validation(NoteValidationError),
    Db(DbError),
    /// Stored row could not be decoded.
    InvalidData(String),
    /// Non-database backend failure (lock poisoning, remote errors).
    Backend(String),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound(id) => write!(f, "note not found: {id}"),
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::InvalidData(message) => write!(f, "invalid persisted note data: {message}"),
            Self::Backend(message) => write!(f, "note store failure: {message}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::NotFound(_) | Self::InvalidData(_) | Self::Backend(_) => None,
        }
    }
}

impl From<NoteValidationError> for StoreError {
    fn from(value: NoteValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for StoreError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Async persistence boundary for notes.
#[async_trait]
pub trait NoteStore: Send + Sync {
    /// Loads one note, `None` when the id is unknown.
    async fn get(&self, id: &str) -> StoreResult<Option<Note>>;
    /// Persists a new note and returns it with its assigned id and times.
    async fn create(&self, note: NewNote) -> StoreResult<Note>;
    /// Replaces title, content and tags of an existing note.
    async fn update(&self, note: &Note) -> StoreResult<Note>;
    /// Removes one note; unknown ids are `NotFound`.
    async fn delete(&self, id: &str) -> StoreResult<()>;
    /// All notes, most recently updated first, ties broken by id.
    async fn list_all(&self) -> StoreResult<Vec<Note>>;
    /// Upserts every note by id in one atomic step. Returns the count written.
    async fn import_all(&self, notes: &[Note]) -> StoreResult<usize>;
}

/// Builds the record a backend stores for a fresh note.
pub(crate) fn new_note_record(id: String, note: NewNote, now_ms: i64) -> StoreResult<Note> {
    let record = Note {
        id,
        title: note.title,
        content: note.content,
        tags: note.tags,
        created_at: now_ms,
        updated_at: now_ms,
    };
    record.validate()?;
    Ok(record)
}

/// Applies an update on top of the stored record, keeping times monotonic.
pub(crate) fn updated_record(stored: &Note, incoming: &Note, now_ms: i64) -> StoreResult<Note> {
    let record = Note {
        id: stored.id.clone(),
        title: incoming.title.clone(),
        content: incoming.content.clone(),
        tags: incoming.tags.clone(),
        created_at: stored.created_at,
        updated_at: now_ms.max(stored.updated_at).max(stored.created_at),
    };
    record.validate()?;
    Ok(record)
}

/// Ordering used by `list_all` implementations.
pub(crate) fn sort_recent_first(notes: &mut [Note]) {
    notes.sort_by(|left, right| {
        right
            .updated_at
            .cmp(&left.updated_at)
            .then_with(|| left.id.cmp(&right.id))
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::document::Document;

    fn stored() -> Note {
        Note {
            id: "n1".into(),
            title: "old".into(),
            content: Document::empty(),
            tags: Vec::new(),
            created_at: 100,
            updated_at: 500,
        }
    }

    #[test]
    fn update_never_moves_time_backwards() {
        let mut incoming = stored();
        incoming.title = "new".into();
        incoming.created_at = 0;

        let record = updated_record(&stored(), &incoming, 200).unwrap();
        assert_eq!(record.title, "new");
        assert_eq!(record.created_at, 100);
        assert_eq!(record.updated_at, 500);

        let record = updated_record(&stored(), &incoming, 900).unwrap();
        assert_eq!(record.updated_at, 900);
    }

    #[test]
    fn new_record_rejects_invalid_tags() {
        let err = new_note_record(
            "n2".into(),
            NewNote {
                title: String::new(),
                content: Document::empty(),
                tags: vec!["a".into(), "A".into()],
            },
            10,
        )
        .unwrap_err();
        assert!(matches!(err, StoreError::Validation(_)));
    }
}
