//! Debounced persistence of the note being edited.
//!
//! # Responsibility
//! - Decide whether an observed state is worth writing.
//! - Schedule, coalesce and perform writes through a [`NoteStore`].
//!
//! # Invariants
//! - A truly empty draft is never persisted.
//! - A persisted note is only rewritten when its title, tag set or block
//!   sequence differs from the last persisted state. The document `time`
//!   alone is not a change.
//! - At most one write is in flight per reconciler.
//!
//! # See also
//! - [`reconciler`] for the actor that owns the debounce timer.
//!
//! [`NoteStore`]: crate::repo::NoteStore

use crate::model::document::Document;
use crate::model::note::Note;
use crate::model::tags::same_tag_set;
use crate::projection::flat_text;
use crate::repo::StoreError;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::Arc;

pub mod reconciler;

pub use reconciler::{AutosaveHandle, AutosaveReconciler};

/// Observed editing state.
#[derive(Debug, Clone, PartialEq)]
pub struct AutosaveState {
    pub title: String,
    pub document: Arc<Document>,
    /// Live tag order; this is the order that gets persisted.
    pub tags: Vec<String>,
}

/// What a write attempt did.
#[derive(Debug, Clone, PartialEq)]
pub enum SaveOutcome {
    /// A draft was persisted for the first time.
    Created(Note),
    Updated(Note),
    /// Nothing changed since the last persisted state.
    Unchanged,
    /// Empty new drafts are not persisted.
    EmptyDraftRejected,
}

impl SaveOutcome {
    /// Persisted record, when a write happened.
    pub fn note(&self) -> Option<&Note> {
        match self {
            Self::Created(note) | Self::Updated(note) => Some(note),
            Self::Unchanged | Self::EmptyDraftRejected => None,
        }
    }
}

/// Write failure; the caller's local state is left untouched.
#[derive(Debug)]
pub enum SaveError {
    Store(StoreError),
    /// The reconciler task is no longer running.
    ReconcilerStopped,
}

impl Display for SaveError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Store(err) => write!(f, "save failed: {err}"),
            Self::ReconcilerStopped => write!(f, "autosave is not running"),
        }
    }
}

impl Error for SaveError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Store(err) => Some(err),
            Self::ReconcilerStopped => None,
        }
    }
}

impl From<StoreError> for SaveError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}

/// Published progress of the reconciler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AutosaveStatus {
    Idle,
    /// A debounced write is scheduled.
    Pending,
    Saving,
    Saved,
    /// Last write was skipped (empty draft or no change).
    Skipped,
    Failed(String),
}

/// Blank title and a document with zero blocks or one empty paragraph.
pub fn is_truly_empty_draft(state: &AutosaveState) -> bool {
    state.title.trim().is_empty() && state.document.is_blank()
}

/// Whether `state` differs from the persisted note in a way worth writing.
///
/// Flat text is compared first as the cheap signal; structural edits it
/// cannot see (checked state, image urls, header levels, inline markup)
/// are caught by the block comparison.
pub fn differs_from_persisted(persisted: &Note, state: &AutosaveState) -> bool {
    persisted.title != state.title
        || !same_tag_set(&persisted.tags, &state.tags)
        || flat_text(&persisted.content) != flat_text(&state.document)
        || persisted.content.blocks != state.document.blocks
}
