//! Editing session for one hosting surface.
//!
//! # Responsibility
//! - Wire the editor lifecycle, the autosave reconciler and the AI
//!   collaborator around the note currently open.
//! - Translate failures into user-facing messages.
//!
//! # Invariants
//! - Every accepted change, title edit and tag edit is observed by autosave.
//! - Draft promotion updates the identity without remounting the editor.
//! - Closing or switching notes discards the pending debounce.

use crate::ai::{check_request, AiError, AiRequestConfig, AiTextService};
use crate::autosave::{
    AutosaveHandle, AutosaveReconciler, AutosaveState, AutosaveStatus, SaveError, SaveOutcome,
};
use crate::editor::{
    EditorFactory, EditorLifecycle, EditorPhase, LifecycleError, MountOutcome, SurfaceHandle,
};
use crate::model::document::Document;
use crate::model::note::{now_epoch_ms, NoteIdentity, NoteSelection};
use crate::model::tags::{add_tag, remove_tag, TagError};
use crate::projection::{document_from_plain_text, flat_text};
use crate::repo::StoreError;
use crate::service::note_service::NoteService;
use crate::settings::Settings;
use log::{info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::Arc;

#[derive(Debug)]
pub enum SessionError {
    Lifecycle(LifecycleError),
    Save(SaveError),
    Tag(TagError),
    Ai(AiError),
    /// No AI collaborator is configured.
    AiUnavailable,
    NoNoteOpen,
}

impl SessionError {
    /// Message suitable for a toast or inline banner.
    pub fn user_message(&self) -> String {
        match self {
            Self::Lifecycle(LifecycleError::NotFound(_)) => "This note no longer exists.".into(),
            Self::Lifecycle(LifecycleError::EditorConstruction(_)) => {
                "The editor could not be loaded. Reload to try again.".into()
            }
            Self::Lifecycle(LifecycleError::Store(_)) => {
                "The note could not be loaded. Try again.".into()
            }
            Self::Lifecycle(LifecycleError::NotReady(_)) => "The editor is not ready yet.".into(),
            Self::Save(SaveError::Store(StoreError::NotFound(_))) => {
                "This note was deleted elsewhere. Your changes are kept here.".into()
            }
            Self::Save(SaveError::Store(_)) => {
                "Saving failed. Your changes are kept; try again.".into()
            }
            Self::Save(SaveError::ReconcilerStopped) => {
                "Autosave stopped. Reopen the note to keep editing.".into()
            }
            Self::Tag(err) => format!("{err}."),
            Self::Ai(AiError::MissingApiKey) => {
                "Add an API key in settings to use AI features.".into()
            }
            Self::Ai(AiError::EmptyInput) => "Write something first.".into(),
            Self::Ai(err) => format!("{err}."),
            Self::AiUnavailable => "AI features are not available.".into(),
            Self::NoNoteOpen => "No note is open.".into(),
        }
    }
}

impl Display for SessionError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Lifecycle(err) => write!(f, "{err}"),
            Self::Save(err) => write!(f, "{err}"),
            Self::Tag(err) => write!(f, "{err}"),
            Self::Ai(err) => write!(f, "{err}"),
            Self::AiUnavailable => write!(f, "no AI service configured"),
            Self::NoNoteOpen => write!(f, "no note is open"),
        }
    }
}

impl Error for SessionError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Lifecycle(err) => Some(err),
            Self::Save(err) => Some(err),
            Self::Tag(err) => Some(err),
            Self::Ai(err) => Some(err),
            Self::AiUnavailable | Self::NoNoteOpen => None,
        }
    }
}

impl From<LifecycleError> for SessionError {
    fn from(value: LifecycleError) -> Self {
        Self::Lifecycle(value)
    }
}

impl From<SaveError> for SessionError {
    fn from(value: SaveError) -> Self {
        Self::Save(value)
    }
}

impl From<TagError> for SessionError {
    fn from(value: TagError) -> Self {
        Self::Tag(value)
    }
}

impl From<AiError> for SessionError {
    fn from(value: AiError) -> Self {
        Self::Ai(value)
    }
}

/// Feedback line for a completed save.
pub fn save_feedback(outcome: &SaveOutcome) -> &'static str {
    match outcome {
        SaveOutcome::Created(_) | SaveOutcome::Updated(_) => "Saved.",
        SaveOutcome::Unchanged => "No changes to save.",
        SaveOutcome::EmptyDraftRejected => "Nothing to save yet. Add a title or some text.",
    }
}

/// One note open in one editor.
pub struct NoteEditingSession<F: EditorFactory> {
    service: Arc<NoteService>,
    lifecycle: EditorLifecycle<F>,
    autosave: Option<AutosaveHandle>,
    ai: Option<Arc<dyn AiTextService>>,
    ai_config: AiRequestConfig,
    title: String,
    tags: Vec<String>,
}

impl<F: EditorFactory> NoteEditingSession<F> {
    pub fn new(
        factory: F,
        service: Arc<NoteService>,
        settings: &Settings,
        ai: Option<Arc<dyn AiTextService>>,
    ) -> Self {
        let lifecycle = EditorLifecycle::new(factory, service.config());
        Self {
            service,
            lifecycle,
            autosave: None,
            ai,
            ai_config: AiRequestConfig::from_settings(settings),
            title: String::new(),
            tags: Vec::new(),
        }
    }

    /// Loads `selection`, starts autosave for it and mounts the editor.
    ///
    /// A previously open note has its pending debounce discarded first.
    pub async fn open(
        &mut self,
        selection: NoteSelection,
        surface: SurfaceHandle,
    ) -> Result<MountOutcome, SessionError> {
        self.stop_autosave().await;
        self.lifecycle.attach_surface(surface);

        let cached = match &selection {
            NoteSelection::Existing(id) => self.service.cached(id),
            NoteSelection::New => None,
        };
        let store = self.service.store();
        let loaded = self.lifecycle.load(&selection, cached, store.as_ref()).await?;

        self.title = loaded
            .note
            .as_ref()
            .map(|note| note.title.clone())
            .unwrap_or_default();
        self.tags = loaded
            .note
            .as_ref()
            .map(|note| note.tags.clone())
            .unwrap_or_default();
        self.autosave = Some(AutosaveReconciler::spawn(
            store,
            loaded.identity,
            loaded.note,
            self.service.config().autosave_delay(),
        ));

        Ok(self.lifecycle.mount().await?)
    }

    /// Retries mounting after a construction failure or a late surface.
    pub async fn retry_mount(&mut self) -> Result<MountOutcome, SessionError> {
        Ok(self.lifecycle.mount().await?)
    }

    /// Waits for the next valid editor change and schedules autosave.
    pub async fn next_change(&mut self) -> Result<(), SessionError> {
        self.lifecycle.next_change().await;
        self.observe()
    }

    /// Applies queued editor changes. Returns whether any was accepted.
    pub fn pump_changes(&mut self) -> Result<bool, SessionError> {
        if self.lifecycle.drain_changes().is_none() {
            return Ok(false);
        }
        self.observe()?;
        Ok(true)
    }

    pub fn set_title(&mut self, title: impl Into<String>) -> Result<(), SessionError> {
        self.title = title.into();
        self.observe()
    }

    pub fn add_tag(&mut self, tag: &str) -> Result<(), SessionError> {
        add_tag(&mut self.tags, tag)?;
        self.observe()
    }

    pub fn remove_tag(&mut self, tag: &str) -> Result<bool, SessionError> {
        let removed = remove_tag(&mut self.tags, tag);
        if removed {
            self.observe()?;
        }
        Ok(removed)
    }

    /// Manual save: queries the editor and writes without waiting for the
    /// debounce window.
    pub async fn save(&mut self) -> Result<SaveOutcome, SessionError> {
        let document = self
            .lifecycle
            .latest_content()
            .await
            .ok_or(SessionError::NoNoteOpen)?;
        let state = AutosaveState {
            title: self.title.clone(),
            document,
            tags: self.tags.clone(),
        };
        let outcome = self.autosave()?.save_now(state).await?;
        self.sync_identity();
        Ok(outcome)
    }

    /// Replaces the body with an AI rewrite of its flat text and remounts.
    pub async fn apply_ai_rewrite(&mut self) -> Result<MountOutcome, SessionError> {
        let ai = self.ai.clone().ok_or(SessionError::AiUnavailable)?;
        let current = self.lifecycle.snapshot().ok_or(SessionError::NoNoteOpen)?;
        let text = flat_text(&current);
        check_request(&text, &self.ai_config)?;

        let rewritten = ai.rewrite(&text, &self.ai_config).await?;
        let replacement = current.revised(document_from_plain_text(&rewritten).blocks, now_epoch_ms());
        let outcome = self.lifecycle.rerender(replacement).await?;
        info!("event=ai_rewrite module=session status=ok");
        self.observe()?;
        Ok(outcome)
    }

    /// Adds AI-suggested tags within the tag limit. Returns the tags added.
    pub async fn suggest_tags(&mut self) -> Result<Vec<String>, SessionError> {
        let ai = self.ai.clone().ok_or(SessionError::AiUnavailable)?;
        let current = self.lifecycle.snapshot().ok_or(SessionError::NoNoteOpen)?;
        let text = format!("{}\n{}", self.title, flat_text(&current));
        check_request(&text, &self.ai_config)?;

        let suggestions = ai.suggest_tags(&text, &self.ai_config).await?;
        let mut added = Vec::new();
        for suggestion in suggestions {
            match add_tag(&mut self.tags, &suggestion) {
                Ok(()) => added.push(suggestion.trim().to_string()),
                Err(TagError::LimitReached) => break,
                Err(TagError::Empty | TagError::Duplicate(_)) => {}
            }
        }
        if !added.is_empty() {
            self.observe()?;
        }
        Ok(added)
    }

    /// Stops autosave (dropping any pending write) and destroys the editor.
    pub async fn close(&mut self) {
        self.stop_autosave().await;
        self.lifecycle.destroy().await;
    }

    /// Current identity, reflecting draft promotion.
    pub fn identity(&self) -> Option<NoteIdentity> {
        match &self.autosave {
            Some(handle) => Some(handle.identity()),
            None => self.lifecycle.identity().cloned(),
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    pub fn document(&self) -> Option<Arc<Document>> {
        self.lifecycle.snapshot()
    }

    pub fn phase(&self) -> EditorPhase {
        self.lifecycle.phase()
    }

    pub fn editor_error(&self) -> Option<&str> {
        self.lifecycle.last_error()
    }

    pub fn autosave_status(&self) -> Option<AutosaveStatus> {
        self.autosave.as_ref().map(AutosaveHandle::status)
    }

    fn observe(&mut self) -> Result<(), SessionError> {
        self.sync_identity();
        let document = self.lifecycle.snapshot().ok_or(SessionError::NoNoteOpen)?;
        let state = AutosaveState {
            title: self.title.clone(),
            document,
            tags: self.tags.clone(),
        };
        self.autosave()?.observe(state)?;
        Ok(())
    }

    fn sync_identity(&mut self) {
        let promoted = self
            .autosave
            .as_ref()
            .and_then(|handle| handle.identity().persisted_id().map(str::to_string));
        if let Some(id) = promoted {
            self.lifecycle.promote(id);
        }
    }

    fn autosave(&self) -> Result<&AutosaveHandle, SessionError> {
        self.autosave.as_ref().ok_or(SessionError::NoNoteOpen)
    }

    async fn stop_autosave(&mut self) {
        if let Some(handle) = self.autosave.take() {
            if handle.status() == AutosaveStatus::Pending {
                warn!("event=session_close module=session status=discarding_pending");
            }
            handle.shutdown().await;
        }
    }
}
