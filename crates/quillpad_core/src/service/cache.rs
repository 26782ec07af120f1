//! Write-through note cache.
//!
//! Wraps any [`NoteStore`] so the editor can open recently seen notes
//! without a store round trip.
//!
//! # Invariants
//! - The cache only holds records the inner store acknowledged.
//! - `delete` evicts before reporting success.

use crate::model::note::{NewNote, Note};
use crate::repo::{NoteStore, StoreError, StoreResult};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

pub struct CachingNoteStore {
    inner: Arc<dyn NoteStore>,
    notes: Mutex<HashMap<String, Note>>,
}

impl CachingNoteStore {
    pub fn new(inner: Arc<dyn NoteStore>) -> Self {
        Self {
            inner,
            notes: Mutex::new(HashMap::new()),
        }
    }

    /// Cached record, if the note has been seen.
    pub fn cached(&self, id: &str) -> Option<Note> {
        self.notes.lock().ok()?.get(id).cloned()
    }

    fn remember<'a>(&self, notes: impl IntoIterator<Item = &'a Note>) {
        if let Ok(mut cache) = self.notes.lock() {
            for note in notes {
                cache.insert(note.id.clone(), note.clone());
            }
        }
    }

    fn forget(&self, id: &str) -> StoreResult<()> {
        self.notes
            .lock()
            .map_err(|_| StoreError::Backend("note cache lock poisoned".to_string()))?
            .remove(id);
        Ok(())
    }
}

#[async_trait]
impl NoteStore for CachingNoteStore {
    async fn get(&self, id: &str) -> StoreResult<Option<Note>> {
        if let Some(note) = self.cached(id) {
            return Ok(Some(note));
        }
        let found = self.inner.get(id).await?;
        self.remember(found.iter());
        Ok(found)
    }

    async fn create(&self, note: NewNote) -> StoreResult<Note> {
        let created = self.inner.create(note).await?;
        self.remember([&created]);
        Ok(created)
    }

    async fn update(&self, note: &Note) -> StoreResult<Note> {
        let updated = self.inner.update(note).await?;
        self.remember([&updated]);
        Ok(updated)
    }

    async fn delete(&self, id: &str) -> StoreResult<()> {
        self.forget(id)?;
        self.inner.delete(id).await
    }

    async fn list_all(&self) -> StoreResult<Vec<Note>> {
        let notes = self.inner.list_all().await?;
        self.remember(notes.iter());
        Ok(notes)
    }

    async fn import_all(&self, notes: &[Note]) -> StoreResult<usize> {
        let written = self.inner.import_all(notes).await?;
        self.remember(notes.iter());
        Ok(written)
    }
}
