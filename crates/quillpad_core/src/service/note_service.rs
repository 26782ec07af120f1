//! Note use-case service.
//!
//! # Responsibility
//! - List, open, delete and search notes through one cached store.
//! - Produce export envelopes and single-note artifacts.
//! - Commit parsed imports atomically.
//!
//! # Invariants
//! - Note lists are sorted by `updated_at DESC, id ASC`.
//! - An import either lands completely or not at all.
//! - Imported settings are returned as a validated patch, never applied here.

use crate::config::CoreConfig;
use crate::model::note::Note;
use crate::projection::summary;
use crate::repo::{NoteStore, StoreError};
use crate::search::{search_notes, SearchHit, SearchQuery};
use crate::service::cache::CachingNoteStore;
use crate::settings::{Settings, SettingsPatch};
use crate::transfer::export::{
    envelope_artifact, note_artifact, ExportArtifact, ExportEnvelope, ExportError, ExportFormat,
};
use crate::transfer::import::{import_str, ImportError, ImportFormat};
use log::{error, info};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::Arc;

const FULL_EXPORT_STEM: &str = "quillpad-export";

/// Service error for note use-cases.
#[derive(Debug)]
pub enum NoteServiceError {
    NoteNotFound(String),
    Store(StoreError),
    Import(ImportError),
    Export(ExportError),
}

impl Display for NoteServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoteNotFound(id) => write!(f, "note not found: {id}"),
            Self::Store(err) => write!(f, "{err}"),
            Self::Import(err) => write!(f, "{err}"),
            Self::Export(err) => write!(f, "{err}"),
        }
    }
}

impl Error for NoteServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::NoteNotFound(_) => None,
            Self::Store(err) => Some(err),
            Self::Import(err) => Some(err),
            Self::Export(err) => Some(err),
        }
    }
}

impl From<StoreError> for NoteServiceError {
    fn from(value: StoreError) -> Self {
        match value {
            StoreError::NotFound(id) => Self::NoteNotFound(id),
            other => Self::Store(other),
        }
    }
}

impl From<ImportError> for NoteServiceError {
    fn from(value: ImportError) -> Self {
        Self::Import(value)
    }
}

impl From<ExportError> for NoteServiceError {
    fn from(value: ExportError) -> Self {
        Self::Export(value)
    }
}

pub type NoteServiceResult<T> = Result<T, NoteServiceError>;

/// List row for note pickers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteSummary {
    pub id: String,
    pub title: String,
    pub tags: Vec<String>,
    pub summary: String,
    pub updated_at: i64,
}

/// Result of a committed import.
#[derive(Debug, Clone, PartialEq)]
pub struct ImportReport {
    pub format: ImportFormat,
    pub imported: usize,
    /// Validated settings from a full export, pending user confirmation.
    pub settings: Option<SettingsPatch>,
}

/// Use-case facade over a [`NoteStore`].
pub struct NoteService {
    store: Arc<CachingNoteStore>,
    config: CoreConfig,
}

impl NoteService {
    pub fn new(store: Arc<dyn NoteStore>, config: CoreConfig) -> Self {
        Self {
            store: Arc::new(CachingNoteStore::new(store)),
            config,
        }
    }

    pub fn config(&self) -> &CoreConfig {
        &self.config
    }

    /// Cached store handle; writes through it keep the cache current.
    pub fn store(&self) -> Arc<dyn NoteStore> {
        self.store.clone()
    }

    pub fn cached(&self, id: &str) -> Option<Note> {
        self.store.cached(id)
    }

    pub async fn get_note(&self, id: &str) -> NoteServiceResult<Note> {
        self.store
            .get(id)
            .await?
            .ok_or_else(|| NoteServiceError::NoteNotFound(id.to_string()))
    }

    /// Summaries of every note, newest first.
    pub async fn list_summaries(&self) -> NoteServiceResult<Vec<NoteSummary>> {
        let notes = self.store.list_all().await?;
        Ok(notes
            .into_iter()
            .map(|note| NoteSummary {
                summary: summary(&note.content, self.config.summary_max_chars),
                id: note.id,
                title: note.title,
                tags: note.tags,
                updated_at: note.updated_at,
            })
            .collect())
    }

    pub async fn delete_note(&self, id: &str) -> NoteServiceResult<()> {
        self.store.delete(id).await?;
        info!("event=note_delete module=service status=ok");
        Ok(())
    }

    /// Searches every note; a query without a limit uses `config.search_limit`.
    pub async fn search(&self, query: &SearchQuery) -> NoteServiceResult<Vec<SearchHit>> {
        let notes = self.store.list_all().await?;
        let query = SearchQuery {
            limit: query.limit.or(Some(self.config.search_limit)),
            ..query.clone()
        };
        Ok(search_notes(&notes, &query, self.config.summary_max_chars))
    }

    /// Envelope holding every note and, optionally, the settings snapshot.
    pub async fn export_all(&self, settings: Option<&Settings>) -> NoteServiceResult<ExportEnvelope> {
        let notes = self.store.list_all().await?;
        info!(
            "event=export module=service status=ok notes={} settings={}",
            notes.len(),
            settings.is_some()
        );
        Ok(ExportEnvelope::new(notes, settings.cloned()))
    }

    /// Downloadable `.json` artifact of [`Self::export_all`].
    pub async fn export_all_artifact(
        &self,
        settings: Option<&Settings>,
    ) -> NoteServiceResult<ExportArtifact> {
        let envelope = self.export_all(settings).await?;
        Ok(envelope_artifact(&envelope, FULL_EXPORT_STEM)?)
    }

    pub async fn export_note(&self, id: &str, format: ExportFormat) -> NoteServiceResult<ExportArtifact> {
        let note = self.get_note(id).await?;
        Ok(note_artifact(&note, format)?)
    }

    /// Parses `raw` and upserts every note in one atomic store call.
    pub async fn import_json(&self, raw: &str) -> NoteServiceResult<ImportReport> {
        let outcome = match import_str(raw) {
            Ok(outcome) => outcome,
            Err(err) => {
                error!("event=import module=service status=error error={err}");
                return Err(err.into());
            }
        };
        let imported = self.store.import_all(&outcome.notes).await?;
        info!(
            "event=import module=service status=ok format={:?} notes={imported}",
            outcome.format
        );
        Ok(ImportReport {
            format: outcome.format,
            imported,
            settings: outcome.settings_patch(),
        })
    }
}
