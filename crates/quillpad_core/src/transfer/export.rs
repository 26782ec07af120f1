//! Export envelope and single-note text artifacts.

use crate::model::note::Note;
use crate::projection::{markdown, plain_text};
use crate::settings::Settings;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Envelope version written by this crate.
pub const EXPORT_FORMAT_VERSION: u32 = 2;

/// Top-level JSON structure of a `.json` export file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportEnvelope {
    pub version: u32,
    pub notes: Vec<Note>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub settings: Option<Settings>,
}

impl ExportEnvelope {
    pub fn new(notes: Vec<Note>, settings: Option<Settings>) -> Self {
        Self {
            version: EXPORT_FORMAT_VERSION,
            notes,
            settings,
        }
    }

    /// Pretty-printed JSON text of the envelope.
    pub fn to_json(&self) -> Result<String, ExportError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Errors specific to export operations.
#[derive(Debug)]
pub enum ExportError {
    Json(serde_json::Error),
}

impl Display for ExportError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Json(err) => write!(f, "failed to encode export: {err}"),
        }
    }
}

impl Error for ExportError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Json(err) => Some(err),
        }
    }
}

impl From<serde_json::Error> for ExportError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}

/// Downloadable artifact kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Json,
    Markdown,
    PlainText,
}

impl ExportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Markdown => "md",
            Self::PlainText => "txt",
        }
    }

    pub fn mime_type(self) -> &'static str {
        match self {
            Self::Json => "application/json",
            Self::Markdown => "text/markdown",
            Self::PlainText => "text/plain",
        }
    }
}

/// File ready to hand to the download boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportArtifact {
    pub file_name: String,
    pub mime_type: &'static str,
    pub contents: String,
}

const UNTITLED: &str = "Untitled";

/// Markdown export of one note: title line, optional tags line, body.
pub fn note_markdown(note: &Note) -> String {
    let mut out = format!("# {}\n\n", display_title(note));
    if !note.tags.is_empty() {
        out.push_str(&format!("Tags: {}\n\n", note.tags.join(", ")));
    }
    out.push_str(&markdown(&note.content));
    out
}

/// Plain text export of one note: title line, optional tags line, body.
pub fn note_plain_text(note: &Note) -> String {
    let mut out = format!("{}\n\n", display_title(note));
    if !note.tags.is_empty() {
        out.push_str(&format!("Tags: {}\n\n", note.tags.join(", ")));
    }
    out.push_str(&plain_text(&note.content));
    out
}

/// Builds the `.md` or `.txt` artifact for one note.
///
/// `ExportFormat::Json` wraps the single note in a notes-only envelope.
pub fn note_artifact(note: &Note, format: ExportFormat) -> Result<ExportArtifact, ExportError> {
    let contents = match format {
        ExportFormat::Json => ExportEnvelope::new(vec![note.clone()], None).to_json()?,
        ExportFormat::Markdown => note_markdown(note),
        ExportFormat::PlainText => note_plain_text(note),
    };
    Ok(ExportArtifact {
        file_name: export_file_name(&note.title, format),
        mime_type: format.mime_type(),
        contents,
    })
}

/// Builds the `.json` artifact for a full export.
pub fn envelope_artifact(envelope: &ExportEnvelope, stem: &str) -> Result<ExportArtifact, ExportError> {
    Ok(ExportArtifact {
        file_name: export_file_name(stem, ExportFormat::Json),
        mime_type: ExportFormat::Json.mime_type(),
        contents: envelope.to_json()?,
    })
}

/// Slugified file name with the format's extension.
pub fn export_file_name(stem: &str, format: ExportFormat) -> String {
    format!("{}.{}", slugify(stem), format.extension())
}

fn display_title(note: &Note) -> &str {
    let title = note.title.trim();
    if title.is_empty() {
        UNTITLED
    } else {
        title
    }
}

fn slugify(name: &str) -> String {
    let slug: String = name
        .to_lowercase()
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { '-' })
        .collect();
    let slug = slug
        .split('-')
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("-");
    if slug.is_empty() {
        "untitled".to_string()
    } else {
        slug
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::block::Block;
    use crate::model::document::Document;

    fn note(title: &str, tags: &[&str]) -> Note {
        Note {
            id: "n1".into(),
            title: title.into(),
            content: Document::from_blocks(vec![Block::paragraph("Body")]),
            tags: tags.iter().map(|tag| tag.to_string()).collect(),
            created_at: 1,
            updated_at: 2,
        }
    }

    #[test]
    fn envelope_omits_absent_settings() {
        let json = ExportEnvelope::new(vec![], None).to_json().unwrap();
        assert!(json.contains("\"version\": 2"));
        assert!(!json.contains("settings"));
    }

    #[test]
    fn markdown_export_prepends_title_and_tags() {
        assert_eq!(
            note_markdown(&note("Trip", &["travel", "2024"])),
            "# Trip\n\nTags: travel, 2024\n\nBody"
        );
        assert_eq!(note_plain_text(&note("", &[])), "Untitled\n\nBody");
    }

    #[test]
    fn file_names_are_slugified() {
        assert_eq!(export_file_name("My Trip!", ExportFormat::Markdown), "my-trip.md");
        assert_eq!(export_file_name("  ", ExportFormat::PlainText), "untitled.txt");
        let artifact = note_artifact(&note("A b", &[]), ExportFormat::PlainText).unwrap();
        assert_eq!(artifact.file_name, "a-b.txt");
        assert_eq!(artifact.mime_type, "text/plain");
    }
}
