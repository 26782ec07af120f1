//! Note entity and note identity.
//!
//! # Responsibility
//! - Define the persisted note record and its wire names.
//! - Keep draft identities and durable identities apart at the type level.
//!
//! # Invariants
//! - `id` is non-empty and never reused once assigned by the store.
//! - `updated_at >= created_at`.
//! - Tags follow the rules in [`crate::model::tags`].

use crate::model::document::Document;
use crate::model::tags::{validate_tags, TagError};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::{SystemTime, UNIX_EPOCH};
use uuid::Uuid;

/// Persisted note record.
///
/// Serialized in camelCase (`createdAt`, `updatedAt`) to match export files.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    pub id: String,
    pub title: String,
    pub content: Document,
    #[serde(default)]
    pub tags: Vec<String>,
    /// Epoch milliseconds.
    pub created_at: i64,
    /// Epoch milliseconds; never earlier than `created_at`.
    pub updated_at: i64,
}

/// Fields supplied when asking the store to create a note.
#[derive(Debug, Clone, PartialEq)]
pub struct NewNote {
    pub title: String,
    pub content: Document,
    pub tags: Vec<String>,
}

/// Note invariant violation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NoteValidationError {
    EmptyId,
    InvalidTags(TagError),
    TimestampOrder { created_at: i64, updated_at: i64 },
}

impl Display for NoteValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyId => write!(f, "note id cannot be empty"),
            Self::InvalidTags(err) => write!(f, "invalid tags: {err}"),
            Self::TimestampOrder {
                created_at,
                updated_at,
            } => write!(
                f,
                "updated_at ({updated_at}) must not be earlier than created_at ({created_at})"
            ),
        }
    }
}

impl Error for NoteValidationError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidTags(err) => Some(err),
            _ => None,
        }
    }
}

impl Note {
    /// Checks the note invariants.
    pub fn validate(&self) -> Result<(), NoteValidationError> {
        if self.id.trim().is_empty() {
            return Err(NoteValidationError::EmptyId);
        }
        validate_tags(&self.tags).map_err(NoteValidationError::InvalidTags)?;
        if self.updated_at < self.created_at {
            return Err(NoteValidationError::TimestampOrder {
                created_at: self.created_at,
                updated_at: self.updated_at,
            });
        }
        Ok(())
    }
}

/// Temporary identity of a note that has not been persisted yet.
///
/// Rendered as `draft-<uuid>`, a form the store never hands out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DraftId(Uuid);

impl DraftId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for DraftId {
    fn default() -> Self {
        Self::new()
    }
}

impl Display for DraftId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "draft-{}", self.0)
    }
}

/// Identity of the note being edited.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum NoteIdentity {
    Draft(DraftId),
    Persisted(String),
}

impl NoteIdentity {
    /// Fresh draft identity.
    pub fn new_draft() -> Self {
        Self::Draft(DraftId::new())
    }

    pub fn is_draft(&self) -> bool {
        matches!(self, Self::Draft(_))
    }

    /// Durable id, if the note has been persisted.
    pub fn persisted_id(&self) -> Option<&str> {
        match self {
            Self::Persisted(id) => Some(id.as_str()),
            Self::Draft(_) => None,
        }
    }
}

impl Display for NoteIdentity {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Draft(draft) => write!(f, "{draft}"),
            Self::Persisted(id) => write!(f, "{id}"),
        }
    }
}

/// What the caller asked to edit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NoteSelection {
    New,
    Existing(String),
}

/// Current wall-clock time in epoch milliseconds.
pub fn now_epoch_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis() as i64)
        .unwrap_or(0)
}
