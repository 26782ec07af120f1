//! In-process note store.
//!
//! Used by tests and by hosts that keep notes only for one session.

use crate::model::note::{now_epoch_ms, NewNote, Note};
use crate::repo::note_store::{
    new_note_record, sort_recent_first, updated_record, NoteStore, StoreError, StoreResult,
};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};
use uuid::Uuid;

/// `BTreeMap`-backed [`NoteStore`].
#[derive(Debug, Default)]
pub struct InMemoryNoteStore {
    notes: Mutex<BTreeMap<String, Note>>,
}

impl InMemoryNoteStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-populated with existing records, taken as-is.
    pub fn with_notes(notes: impl IntoIterator<Item = Note>) -> Self {
        let notes = notes.into_iter().map(|note| (note.id.clone(), note)).collect();
        Self {
            notes: Mutex::new(notes),
        }
    }

    pub fn len(&self) -> usize {
        self.lock().map(|notes| notes.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> StoreResult<MutexGuard<'_, BTreeMap<String, Note>>> {
        self.notes
            .lock()
            .map_err(|_| StoreError::Backend("in-memory store lock poisoned".to_string()))
    }
}

#[async_trait]
impl NoteStore for InMemoryNoteStore {
    async fn get(&self, id: &str) -> StoreResult<Option<Note>> {
        Ok(self.lock()?.get(id).cloned())
    }

    async fn create(&self, note: NewNote) -> StoreResult<Note> {
        let record = new_note_record(Uuid::new_v4().to_string(), note, now_epoch_ms())?;
        self.lock()?.insert(record.id.clone(), record.clone());
        Ok(record)
    }

    async fn update(&self, note: &Note) -> StoreResult<Note> {
        let mut notes = self.lock()?;
        let stored = notes
            .get(&note.id)
            .ok_or_else(|| StoreError::NotFound(note.id.clone()))?;
        let record = updated_record(stored, note, now_epoch_ms())?;
        notes.insert(record.id.clone(), record.clone());
        Ok(record)
    }

    async fn delete(&self, id: &str) -> StoreResult<()> {
        match self.lock()?.remove(id) {
            Some(_) => Ok(()),
            None => Err(StoreError::NotFound(id.to_string())),
        }
    }

    async fn list_all(&self) -> StoreResult<Vec<Note>> {
        let mut notes: Vec<Note> = self.lock()?.values().cloned().collect();
        sort_recent_first(&mut notes);
        Ok(notes)
    }

    async fn import_all(&self, notes: &[Note]) -> StoreResult<usize> {
        for note in notes {
            note.validate()?;
        }
        let mut stored = self.lock()?;
        for note in notes {
            stored.insert(note.id.clone(), note.clone());
        }
        Ok(notes.len())
    }
}
