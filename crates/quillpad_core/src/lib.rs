//! Core of the Quillpad note editor.
//! This crate owns the document model, its text projections, import/export,
//! the editor lifecycle and autosave.

pub mod ai;
pub mod autosave;
pub mod config;
pub mod db;
pub mod editor;
pub mod logging;
pub mod model;
pub mod projection;
pub mod repo;
pub mod search;
pub mod service;
pub mod settings;
pub mod transfer;

pub use ai::{AiError, AiRequestConfig, AiTextService};
pub use autosave::{
    is_truly_empty_draft, AutosaveHandle, AutosaveReconciler, AutosaveState, AutosaveStatus,
    SaveError, SaveOutcome,
};
pub use config::CoreConfig;
pub use db::{open_db, DbError, DbTarget};
pub use editor::{
    BlockEditor, ChangeSink, EditorError, EditorFactory, EditorLifecycle, EditorOptions,
    EditorPhase, LifecycleError, MountOutcome, SurfaceHandle, SurfaceHost,
};
pub use logging::{default_log_level, init_logging, logging_status, LogLevel, LoggingConfig};
pub use model::block::{Block, ChecklistItem, ListStyle};
pub use model::document::Document;
pub use model::note::{DraftId, NewNote, Note, NoteIdentity, NoteSelection, NoteValidationError};
pub use model::sanitize::{sanitize, sanitize_document, Repair, Sanitized};
pub use model::tags::TagError;
pub use projection::{
    document_from_plain_text, flat_text, flat_text_from_raw, markdown, markdown_from_raw,
    plain_text, plain_text_from_raw, summary, summary_from_raw,
};
pub use repo::{InMemoryNoteStore, NoteStore, SqliteNoteStore, StoreError, StoreResult};
pub use search::{search_notes, SearchHit, SearchQuery};
pub use service::{
    NoteEditingSession, NoteService, NoteServiceError, NoteSummary, SessionError,
};
pub use settings::{validate_settings, Settings, SettingsPatch};
pub use transfer::export::{ExportArtifact, ExportEnvelope, ExportError, ExportFormat};
pub use transfer::import::{import_str, import_value, ImportError, ImportFormat, ImportOutcome};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
