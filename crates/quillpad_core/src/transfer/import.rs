//! Import of export files, including legacy shapes.
//!
//! # Invariants
//! - Import is all-or-nothing: any malformed entry fails the whole call and
//!   no notes are returned.
//! - Block sequences are taken as-is; repair happens when a note is first
//!   loaded into the editor.

use crate::model::document::Document;
use crate::model::note::{now_epoch_ms, Note};
use crate::model::tags::clean_tags;
use crate::projection::single_paragraph_document;
use crate::settings::{validate_settings, SettingsPatch};
use crate::transfer::export::EXPORT_FORMAT_VERSION;
use log::{info, warn};
use serde_json::{Map, Value};
use std::collections::HashSet;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Detected shape of an import file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportFormat {
    /// Version 1: a bare array of notes.
    LegacyArray,
    /// Version 2 envelope with notes and settings.
    Full,
    /// Object with a `notes` array that is not a full export.
    NotesOnly,
}

/// Parsed import, not yet committed anywhere.
#[derive(Debug, Clone, PartialEq)]
pub struct ImportOutcome {
    pub format: ImportFormat,
    pub notes: Vec<Note>,
    /// Raw settings object of a full export; validate before applying.
    pub settings: Option<Value>,
}

impl ImportOutcome {
    /// Field-validated settings, present only for full exports.
    pub fn settings_patch(&self) -> Option<SettingsPatch> {
        self.settings.as_ref().map(validate_settings)
    }
}

/// Import failure.
#[derive(Debug)]
pub enum ImportError {
    Json(serde_json::Error),
    InvalidFormat(String),
    /// Entry `index` of the notes list is malformed.
    Validation { index: usize, reason: String },
}

impl Display for ImportError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Json(err) => write!(f, "import file is not valid JSON: {err}"),
            Self::InvalidFormat(details) => write!(f, "invalid import format: {details}"),
            Self::Validation { index, reason } => {
                write!(f, "invalid note at index {index}: {reason}")
            }
        }
    }
}

impl Error for ImportError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Json(err) => Some(err),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for ImportError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}

/// Parses and imports JSON text.
pub fn import_str(raw: &str) -> Result<ImportOutcome, ImportError> {
    let value: Value = serde_json::from_str(raw)?;
    import_value(&value)
}

/// Imports an already-parsed JSON value, stamping missing times with now.
pub fn import_value(raw: &Value) -> Result<ImportOutcome, ImportError> {
    import_value_at(raw, now_epoch_ms())
}

/// Imports with an explicit clock value for missing timestamps.
pub fn import_value_at(raw: &Value, now_ms: i64) -> Result<ImportOutcome, ImportError> {
    let (format, raw_notes, settings) = detect_format(raw)?;

    let mut notes = Vec::with_capacity(raw_notes.len());
    let mut seen_ids = HashSet::new();
    for (index, raw_note) in raw_notes.iter().enumerate() {
        let note = parse_note(index, raw_note, now_ms)?;
        if !seen_ids.insert(note.id.clone()) {
            return Err(ImportError::Validation {
                index,
                reason: format!("duplicate id `{}`", note.id),
            });
        }
        notes.push(note);
    }

    info!(
        "event=import_parse module=transfer status=ok format={:?} notes={} settings={}",
        format,
        notes.len(),
        settings.is_some()
    );

    Ok(ImportOutcome {
        format,
        notes,
        settings,
    })
}

fn detect_format(raw: &Value) -> Result<(ImportFormat, &[Value], Option<Value>), ImportError> {
    match raw {
        Value::Array(notes) => Ok((ImportFormat::LegacyArray, notes.as_slice(), None)),
        Value::Object(object) => {
            let Some(notes) = object.get("notes").and_then(Value::as_array) else {
                return Err(ImportError::InvalidFormat(
                    "expected a notes array or a legacy note list".to_string(),
                ));
            };
            // `as_f64` also accepts float-encoded versions such as `2.0`.
            let is_current_version = object.get("version").and_then(Value::as_f64)
                == Some(f64::from(EXPORT_FORMAT_VERSION));
            match object.get("settings") {
                Some(settings) if settings.is_object() && is_current_version => {
                    Ok((ImportFormat::Full, notes.as_slice(), Some(settings.clone())))
                }
                _ => {
                    warn!(
                        "event=import_parse module=transfer status=format_mismatch detail=notes_only"
                    );
                    Ok((ImportFormat::NotesOnly, notes.as_slice(), None))
                }
            }
        }
        _ => Err(ImportError::InvalidFormat(
            "top-level value must be an array or an object".to_string(),
        )),
    }
}

fn parse_note(index: usize, raw: &Value, now_ms: i64) -> Result<Note, ImportError> {
    let invalid = |reason: &str| ImportError::Validation {
        index,
        reason: reason.to_string(),
    };

    let object = raw.as_object().ok_or_else(|| invalid("entry is not an object"))?;
    let id = match object.get("id") {
        Some(Value::String(id)) if !id.trim().is_empty() => id.clone(),
        Some(Value::Number(id)) => id.to_string(),
        _ => return Err(invalid("missing or empty id")),
    };
    let title = match object.get("title") {
        Some(Value::String(title)) => title.clone(),
        _ => return Err(invalid("title must be a string")),
    };

    let created_at = timestamp(object, "createdAt").unwrap_or(now_ms);
    let updated_at = timestamp(object, "updatedAt").unwrap_or(now_ms).max(created_at);

    let tags = match object.get("tags") {
        Some(Value::Array(raw_tags)) => clean_tags(raw_tags.iter().filter_map(Value::as_str)),
        _ => Vec::new(),
    };

    Ok(Note {
        id,
        title,
        content: import_content(object.get("content")),
        tags,
        created_at,
        updated_at,
    })
}

fn import_content(raw: Option<&Value>) -> Document {
    match raw {
        Some(Value::String(text)) => single_paragraph_document(text),
        Some(value) if value.is_object() => Document::from_value(value).unwrap_or_default(),
        _ => Document::empty(),
    }
}

fn timestamp(object: &Map<String, Value>, field: &str) -> Option<i64> {
    let value = object.get(field)?;
    value
        .as_i64()
        .or_else(|| value.as_f64().filter(|ms| ms.is_finite()).map(|ms| ms as i64))
        .filter(|ms| *ms >= 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::block::Block;
    use serde_json::json;

    #[test]
    fn numeric_ids_are_accepted_as_text() {
        let outcome = import_value_at(&json!([{ "id": 7, "title": "" }]), 100).unwrap();
        assert_eq!(outcome.notes[0].id, "7");
        assert_eq!(outcome.notes[0].content, Document::empty());
    }

    #[test]
    fn timestamps_default_to_now_and_stay_ordered() {
        let outcome = import_value_at(
            &json!([{ "id": "a", "title": "t", "createdAt": 500, "updatedAt": "soon" }]),
            100,
        )
        .unwrap();
        let note = &outcome.notes[0];
        assert_eq!(note.created_at, 500);
        assert_eq!(note.updated_at, 500);
    }

    #[test]
    fn tags_drop_non_strings() {
        let outcome = import_value_at(
            &json!([{ "id": "a", "title": "t", "tags": ["x", 3, null, "y"] }]),
            0,
        )
        .unwrap();
        assert_eq!(outcome.notes[0].tags, vec!["x".to_string(), "y".to_string()]);
    }

    #[test]
    fn object_content_is_kept_without_repair() {
        let outcome = import_value_at(
            &json!([{
                "id": "a",
                "title": "t",
                "content": { "blocks": [{ "type": "header", "data": { "text": "H" } }] }
            }]),
            0,
        )
        .unwrap();
        assert!(matches!(outcome.notes[0].content.blocks[0], Block::Malformed(_)));
    }

    #[test]
    fn duplicate_ids_fail_with_index() {
        let err = import_value_at(
            &json!([{ "id": "a", "title": "" }, { "id": "a", "title": "" }]),
            0,
        )
        .unwrap_err();
        assert!(matches!(err, ImportError::Validation { index: 1, .. }));
    }
}
