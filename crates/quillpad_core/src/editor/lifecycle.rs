//! Editor lifecycle state machine.
//!
//! # Responsibility
//! - Resolve the selected note, sanitize it and mount one editor instance on
//!   the hosting surface.
//! - Accept content-changed notifications only after validation.
//! - Tear editors down on remount and on destroy.
//!
//! # Invariants
//! - At most one editor instance is alive; the previous one is destroyed
//!   before a new one is constructed.
//! - Notifications from an older mount generation are never applied.
//! - A construction whose surface disappeared during the mount delay or
//!   during construction is discarded.
//! - Construction failures leave the controller in `ReadyForMount`.
//!
//! # See also
//! - [`crate::autosave`] for persistence of accepted snapshots.

use crate::config::CoreConfig;
use crate::editor::{
    BlockEditor, ChangeSink, ContentChange, EditorError, EditorFactory, EditorOptions,
    SurfaceHandle,
};
use crate::model::document::Document;
use crate::model::note::{Note, NoteIdentity, NoteSelection};
use crate::model::sanitize::{sanitize, sanitize_document};
use crate::repo::{NoteStore, StoreError};
use log::{debug, error, info, warn};
use serde_json::Value;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

/// Controller phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorPhase {
    Idle,
    LoadingInitialData,
    ReadyForMount,
    Mounted,
    Remounting,
    Destroyed,
}

/// Result of a mount attempt that did not fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MountOutcome {
    Mounted,
    /// No document has been loaded yet.
    WaitingForDocument,
    /// No attached surface is available.
    WaitingForSurface,
    /// The surface went away while the editor was being prepared.
    Cancelled,
}

/// Lifecycle failure.
#[derive(Debug)]
pub enum LifecycleError {
    /// The selected note does not exist; the caller should navigate back.
    NotFound(String),
    Store(StoreError),
    EditorConstruction(EditorError),
    /// The operation is not valid in the current phase.
    NotReady(EditorPhase),
}

impl LifecycleError {
    /// Whether the hosting view should leave the editor route.
    pub fn navigates_back(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

impl Display for LifecycleError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound(id) => write!(f, "note not found: {id}"),
            Self::Store(err) => write!(f, "{err}"),
            Self::EditorConstruction(err) => write!(f, "{err}"),
            Self::NotReady(phase) => write!(f, "editor is not ready (phase {phase:?})"),
        }
    }
}

impl Error for LifecycleError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Store(err) => Some(err),
            Self::EditorConstruction(err) => Some(err),
            Self::NotFound(_) | Self::NotReady(_) => None,
        }
    }
}

impl From<StoreError> for LifecycleError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}

/// Note resolved by [`EditorLifecycle::load`].
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedNote {
    pub identity: NoteIdentity,
    /// Persisted record, `None` for a fresh draft.
    pub note: Option<Note>,
    pub document: Arc<Document>,
    pub repairs: usize,
}

/// Drives one editor instance through its phases.
pub struct EditorLifecycle<F: EditorFactory> {
    factory: F,
    mount_delay: Duration,
    placeholder: String,
    phase: EditorPhase,
    identity: Option<NoteIdentity>,
    snapshot: Option<Arc<Document>>,
    editor: Option<F::Editor>,
    surface: Option<SurfaceHandle>,
    generation: u64,
    change_tx: mpsc::UnboundedSender<ContentChange>,
    change_rx: mpsc::UnboundedReceiver<ContentChange>,
    last_error: Option<String>,
}

impl<F: EditorFactory> EditorLifecycle<F> {
    pub fn new(factory: F, config: &CoreConfig) -> Self {
        let (change_tx, change_rx) = mpsc::unbounded_channel();
        Self {
            factory,
            mount_delay: config.editor_mount_delay(),
            placeholder: config.placeholder_text.clone(),
            phase: EditorPhase::Idle,
            identity: None,
            snapshot: None,
            editor: None,
            surface: None,
            generation: 0,
            change_tx,
            change_rx,
            last_error: None,
        }
    }

    pub fn phase(&self) -> EditorPhase {
        self.phase
    }

    pub fn identity(&self) -> Option<&NoteIdentity> {
        self.identity.as_ref()
    }

    /// Latest accepted document snapshot.
    pub fn snapshot(&self) -> Option<Arc<Document>> {
        self.snapshot.clone()
    }

    /// User-visible message of the last construction failure.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn attach_surface(&mut self, surface: SurfaceHandle) {
        self.surface = Some(surface);
    }

    pub fn detach_surface(&mut self) {
        self.surface = None;
    }

    /// Resolves the selection and prepares its sanitized document.
    ///
    /// A mounted editor is torn down first. `cached` is used instead of the
    /// store when present and matching.
    pub async fn load(
        &mut self,
        selection: &NoteSelection,
        cached: Option<Note>,
        store: &dyn NoteStore,
    ) -> Result<LoadedNote, LifecycleError> {
        if self.phase == EditorPhase::Destroyed {
            return Err(LifecycleError::NotReady(self.phase));
        }
        if self.editor.is_some() {
            self.phase = EditorPhase::Remounting;
            self.teardown_editor().await;
        }
        self.phase = EditorPhase::LoadingInitialData;
        self.snapshot = None;
        self.last_error = None;

        let (identity, note) = match selection {
            NoteSelection::New => (NoteIdentity::new_draft(), None),
            NoteSelection::Existing(id) => {
                let resolved = match cached.filter(|note| &note.id == id) {
                    Some(note) => Some(note),
                    None => match store.get(id).await {
                        Ok(found) => found,
                        Err(err) => {
                            error!("event=editor_load module=editor status=error error={err}");
                            self.reset_to_idle();
                            return Err(err.into());
                        }
                    },
                };
                match resolved {
                    Some(note) => (NoteIdentity::Persisted(note.id.clone()), Some(note)),
                    None => {
                        warn!("event=editor_load module=editor status=not_found");
                        self.reset_to_idle();
                        return Err(LifecycleError::NotFound(id.clone()));
                    }
                }
            }
        };

        let sanitized = match &note {
            Some(note) => sanitize_document(&note.content),
            None => sanitize_document(&Document::empty()),
        };
        let repairs = sanitized.repairs.len();
        if sanitized.was_repaired() {
            warn!("event=editor_load module=editor status=repaired repairs={repairs}");
        }

        let document = Arc::new(sanitized.document);
        self.identity = Some(identity.clone());
        self.snapshot = Some(Arc::clone(&document));
        self.phase = EditorPhase::ReadyForMount;
        info!(
            "event=editor_load module=editor status=ok draft={}",
            identity.is_draft()
        );

        Ok(LoadedNote {
            identity,
            note,
            document,
            repairs,
        })
    }

    /// Constructs an editor once both a document and a surface are present.
    ///
    /// Waits the configured mount delay first; detaching the surface during
    /// the delay or the construction cancels the mount.
    pub async fn mount(&mut self) -> Result<MountOutcome, LifecycleError> {
        match self.phase {
            EditorPhase::ReadyForMount | EditorPhase::Remounting | EditorPhase::Mounted => {}
            EditorPhase::Idle | EditorPhase::LoadingInitialData => {
                return Ok(MountOutcome::WaitingForDocument)
            }
            EditorPhase::Destroyed => return Err(LifecycleError::NotReady(self.phase)),
        }
        let Some(document) = self.snapshot.clone() else {
            self.phase = EditorPhase::ReadyForMount;
            return Ok(MountOutcome::WaitingForDocument);
        };
        let surface = match &self.surface {
            Some(surface) if surface.is_attached() => surface.clone(),
            _ => {
                self.teardown_editor().await;
                self.phase = EditorPhase::ReadyForMount;
                return Ok(MountOutcome::WaitingForSurface);
            }
        };

        self.teardown_editor().await;
        self.phase = EditorPhase::ReadyForMount;

        tokio::select! {
            _ = tokio::time::sleep(self.mount_delay) => {}
            _ = surface.detached() => {
                debug!("event=editor_mount module=editor status=cancelled stage=delay");
                return Ok(MountOutcome::Cancelled);
            }
        }

        self.generation += 1;
        let options = EditorOptions {
            initial_document: document,
            placeholder: self.placeholder.clone(),
            on_change: ChangeSink::new(self.generation, self.change_tx.clone()),
        };

        let constructed = tokio::select! {
            result = self.factory.construct(&surface, options) => result,
            _ = surface.detached() => {
                debug!("event=editor_mount module=editor status=cancelled stage=construct");
                return Ok(MountOutcome::Cancelled);
            }
        };

        match constructed {
            Ok(mut editor) => {
                if !surface.is_attached() {
                    destroy_quietly(&mut editor).await;
                    return Ok(MountOutcome::Cancelled);
                }
                self.editor = Some(editor);
                self.phase = EditorPhase::Mounted;
                self.last_error = None;
                info!(
                    "event=editor_mount module=editor status=ok generation={}",
                    self.generation
                );
                Ok(MountOutcome::Mounted)
            }
            Err(err) => {
                error!("event=editor_mount module=editor status=error error={err}");
                self.last_error = Some(err.to_string());
                self.phase = EditorPhase::ReadyForMount;
                Err(LifecycleError::EditorConstruction(err))
            }
        }
    }

    /// Waits for the next accepted content change.
    ///
    /// Stale and invalid notifications are skipped. Cancel-safe.
    pub async fn next_change(&mut self) -> Arc<Document> {
        while let Some(change) = self.change_rx.recv().await {
            if let Some(document) = self.accept_change(change) {
                return document;
            }
        }
        // The controller holds a sender, so the channel never closes.
        std::future::pending().await
    }

    /// Applies every queued notification; returns the newest accepted one.
    pub fn drain_changes(&mut self) -> Option<Arc<Document>> {
        let mut latest = None;
        while let Ok(change) = self.change_rx.try_recv() {
            if let Some(document) = self.accept_change(change) {
                latest = Some(document);
            }
        }
        latest
    }

    /// Current content straight from the editor, falling back to the last
    /// accepted snapshot when the editor is absent or fails.
    pub async fn latest_content(&mut self) -> Option<Arc<Document>> {
        self.drain_changes();
        if let Some(editor) = self.editor.as_mut() {
            match editor.save().await {
                Ok(raw) => match validated_document(&raw) {
                    Some(document) => {
                        let document = Arc::new(document);
                        self.snapshot = Some(Arc::clone(&document));
                        return Some(document);
                    }
                    None => warn!("event=editor_save module=editor status=invalid_payload"),
                },
                Err(err) => warn!("event=editor_save module=editor status=error error={err}"),
            }
        }
        self.snapshot.clone()
    }

    /// Replaces the content by tearing down and rebuilding the editor.
    pub async fn rerender(&mut self, document: Document) -> Result<MountOutcome, LifecycleError> {
        if matches!(self.phase, EditorPhase::Idle | EditorPhase::Destroyed) {
            return Err(LifecycleError::NotReady(self.phase));
        }
        let sanitized = sanitize_document(&document);
        self.snapshot = Some(Arc::new(sanitized.document));
        self.phase = EditorPhase::Remounting;
        self.teardown_editor().await;
        self.mount().await
    }

    /// Swaps a draft identity for its durable id without remounting.
    pub fn promote(&mut self, id: String) {
        if matches!(self.identity, Some(NoteIdentity::Draft(_))) {
            debug!("event=editor_promote module=editor status=ok");
            self.identity = Some(NoteIdentity::Persisted(id));
        }
    }

    /// Releases the editor and all pending state.
    pub async fn destroy(&mut self) {
        if self.phase == EditorPhase::Destroyed {
            return;
        }
        self.teardown_editor().await;
        while self.change_rx.try_recv().is_ok() {}
        self.surface = None;
        self.snapshot = None;
        self.phase = EditorPhase::Destroyed;
        info!("event=editor_destroy module=editor status=ok");
    }

    fn accept_change(&mut self, change: ContentChange) -> Option<Arc<Document>> {
        if change.generation != self.generation || self.phase != EditorPhase::Mounted {
            debug!(
                "event=editor_change module=editor status=stale generation={}",
                change.generation
            );
            return None;
        }
        match validated_document(&change.payload) {
            Some(document) => {
                let document = Arc::new(document);
                self.snapshot = Some(Arc::clone(&document));
                Some(document)
            }
            None => {
                warn!("event=editor_change module=editor status=rejected reason=blocks_not_array");
                None
            }
        }
    }

    async fn teardown_editor(&mut self) {
        if let Some(mut editor) = self.editor.take() {
            destroy_quietly(&mut editor).await;
        }
        self.generation += 1;
    }

    fn reset_to_idle(&mut self) {
        self.phase = EditorPhase::Idle;
        self.identity = None;
        self.snapshot = None;
    }
}

async fn destroy_quietly<E: BlockEditor>(editor: &mut E) {
    if let Err(err) = editor.destroy().await {
        warn!("event=editor_destroy module=editor status=error error={err}");
    }
}

/// Validates editor output and returns its sanitized document.
fn validated_document(raw: &Value) -> Option<Document> {
    let blocks_are_array = raw
        .get("blocks")
        .map(Value::is_array)
        .unwrap_or(false);
    if !blocks_are_array {
        return None;
    }
    Some(sanitize(raw).document)
}
