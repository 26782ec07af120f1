//! SQLite-backed note store.
//!
//! # Responsibility
//! - Persist one row per note with JSON-encoded content and tags.
//! - Keep SQL details inside the persistence boundary.
//!
//! # Invariants
//! - Write paths validate the note before any SQL mutation.
//! - Read paths reject rows that fail to decode instead of masking them.
//! - `import_all` runs inside one immediate transaction.

use crate::db::{open_db, DbTarget};
use crate::model::document::Document;
use crate::model::note::{now_epoch_ms, NewNote, Note};
use crate::repo::note_store::{
    new_note_record, updated_record, NoteStore, StoreError, StoreResult,
};
use async_trait::async_trait;
use log::{error, info};
use rusqlite::{params, Connection, OptionalExtension, Row, TransactionBehavior};
use std::sync::{Mutex, MutexGuard};
use uuid::Uuid;

const NOTE_SELECT_SQL: &str = "SELECT
    id,
    title,
    content_json,
    tags_json,
    created_at,
    updated_at
FROM notes";

/// [`NoteStore`] over a migrated SQLite connection.
pub struct SqliteNoteStore {
    conn: Mutex<Connection>,
}

impl SqliteNoteStore {
    /// Opens (and migrates) the database at `target`.
    pub fn open(target: &DbTarget) -> StoreResult<Self> {
        Ok(Self::from_connection(open_db(target)?))
    }

    /// Wraps a connection that has already been through `open_db`.
    pub fn from_connection(conn: Connection) -> Self {
        Self {
            conn: Mutex::new(conn),
        }
    }

    fn lock(&self) -> StoreResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| StoreError::Backend("sqlite connection lock poisoned".to_string()))
    }
}

#[async_trait]
impl NoteStore for SqliteNoteStore {
    async fn get(&self, id: &str) -> StoreResult<Option<Note>> {
        let conn = self.lock()?;
        load_note(&conn, id)
    }

    async fn create(&self, note: NewNote) -> StoreResult<Note> {
        let record = new_note_record(Uuid::new_v4().to_string(), note, now_epoch_ms())?;
        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO notes (id, title, content_json, tags_json, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6);",
            params![
                record.id.as_str(),
                record.title.as_str(),
                encode_content(&record)?,
                encode_tags(&record)?,
                record.created_at,
                record.updated_at,
            ],
        )?;
        info!("event=note_create module=store status=ok backend=sqlite");
        Ok(record)
    }

    async fn update(&self, note: &Note) -> StoreResult<Note> {
        let conn = self.lock()?;
        let stored = load_note(&conn, &note.id)?
            .ok_or_else(|| StoreError::NotFound(note.id.clone()))?;
        let record = updated_record(&stored, note, now_epoch_ms())?;
        conn.execute(
            "UPDATE notes
             SET title = ?2, content_json = ?3, tags_json = ?4, updated_at = ?5
             WHERE id = ?1;",
            params![
                record.id.as_str(),
                record.title.as_str(),
                encode_content(&record)?,
                encode_tags(&record)?,
                record.updated_at,
            ],
        )?;
        Ok(record)
    }

    async fn delete(&self, id: &str) -> StoreResult<()> {
        let changed = self
            .lock()?
            .execute("DELETE FROM notes WHERE id = ?1;", [id])?;
        if changed == 0 {
            return Err(StoreError::NotFound(id.to_string()));
        }
        Ok(())
    }

    async fn list_all(&self) -> StoreResult<Vec<Note>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(&format!(
            "{NOTE_SELECT_SQL} ORDER BY updated_at DESC, id ASC;"
        ))?;
        let mut rows = stmt.query([])?;
        let mut notes = Vec::new();
        while let Some(row) = rows.next()? {
            notes.push(parse_note_row(row)?);
        }
        Ok(notes)
    }

    async fn import_all(&self, notes: &[Note]) -> StoreResult<usize> {
        for note in notes {
            note.validate()?;
        }

        let mut conn = self.lock()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        for note in notes {
            tx.execute(
                "INSERT INTO notes (id, title, content_json, tags_json, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                 ON CONFLICT(id) DO UPDATE SET
                    title = excluded.title,
                    content_json = excluded.content_json,
                    tags_json = excluded.tags_json,
                    created_at = excluded.created_at,
                    updated_at = excluded.updated_at;",
                params![
                    note.id.as_str(),
                    note.title.as_str(),
                    encode_content(note)?,
                    encode_tags(note)?,
                    note.created_at,
                    note.updated_at,
                ],
            )?;
        }
        match tx.commit() {
            Ok(()) => {
                info!(
                    "event=note_import module=store status=ok backend=sqlite count={}",
                    notes.len()
                );
                Ok(notes.len())
            }
            Err(err) => {
                error!("event=note_import module=store status=error backend=sqlite error={err}");
                Err(err.into())
            }
        }
    }
}

fn load_note(conn: &Connection, id: &str) -> StoreResult<Option<Note>> {
    let mut stmt = conn.prepare(&format!("{NOTE_SELECT_SQL} WHERE id = ?1;"))?;
    stmt.query_row([id], RawNoteRow::read)
        .optional()?
        .map(RawNoteRow::decode)
        .transpose()
}

fn parse_note_row(row: &Row<'_>) -> StoreResult<Note> {
    RawNoteRow::read(row)?.decode()
}

struct RawNoteRow {
    id: String,
    title: String,
    content_json: String,
    tags_json: String,
    created_at: i64,
    updated_at: i64,
}

impl RawNoteRow {
    fn read(row: &Row<'_>) -> Result<Self, rusqlite::Error> {
        Ok(Self {
            id: row.get("id")?,
            title: row.get("title")?,
            content_json: row.get("content_json")?,
            tags_json: row.get("tags_json")?,
            created_at: row.get("created_at")?,
            updated_at: row.get("updated_at")?,
        })
    }

    fn decode(self) -> StoreResult<Note> {
        let content: Document = serde_json::from_str(&self.content_json).map_err(|err| {
            StoreError::InvalidData(format!("content of note `{}`: {err}", self.id))
        })?;
        let tags: Vec<String> = serde_json::from_str(&self.tags_json).map_err(|err| {
            StoreError::InvalidData(format!("tags of note `{}`: {err}", self.id))
        })?;
        Ok(Note {
            id: self.id,
            title: self.title,
            content,
            tags,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

fn encode_content(note: &Note) -> StoreResult<String> {
    serde_json::to_string(&note.content)
        .map_err(|err| StoreError::InvalidData(format!("content of note `{}`: {err}", note.id)))
}

fn encode_tags(note: &Note) -> StoreResult<String> {
    serde_json::to_string(&note.tags)
        .map_err(|err| StoreError::InvalidData(format!("tags of note `{}`: {err}", note.id)))
}
