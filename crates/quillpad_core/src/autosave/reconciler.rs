//! Autosave actor.
//!
//! # Responsibility
//! - Own the debounce timer and the last persisted state of one note.
//! - Serialize every write (debounced or manual) through one task.
//!
//! # Invariants
//! - Every observed change restarts the debounce window; only the latest
//!   pending state is written when it fires.
//! - A manual save replaces any pending debounced state, so the two never
//!   produce separate writes for the same edits.
//! - Dropping or shutting down the handle discards the pending debounce.

use crate::autosave::{
    differs_from_persisted, is_truly_empty_draft, AutosaveState, AutosaveStatus, SaveError,
    SaveOutcome,
};
use crate::model::document::Document;
use crate::model::note::{NewNote, Note, NoteIdentity};
use crate::repo::{NoteStore, StoreError};
use log::{debug, error, info};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tokio::time::{sleep_until, Instant};

enum Command {
    Observe(AutosaveState),
    SaveNow(AutosaveState, oneshot::Sender<Result<SaveOutcome, SaveError>>),
    Cancel,
    Shutdown,
}

/// Client side of a running reconciler.
#[derive(Debug)]
pub struct AutosaveHandle {
    commands: mpsc::UnboundedSender<Command>,
    identity: watch::Receiver<NoteIdentity>,
    status: watch::Receiver<AutosaveStatus>,
    task: JoinHandle<()>,
}

impl std::fmt::Debug for Command {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Observe(_) => "Observe",
            Self::SaveNow(..) => "SaveNow",
            Self::Cancel => "Cancel",
            Self::Shutdown => "Shutdown",
        };
        f.write_str(name)
    }
}

impl AutosaveHandle {
    /// Records a new state and restarts the debounce window.
    pub fn observe(&self, state: AutosaveState) -> Result<(), SaveError> {
        self.send(Command::Observe(state))
    }

    /// Writes `state` now, bypassing the debounce window.
    pub async fn save_now(&self, state: AutosaveState) -> Result<SaveOutcome, SaveError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.send(Command::SaveNow(state, reply_tx))?;
        reply_rx.await.map_err(|_| SaveError::ReconcilerStopped)?
    }

    /// Drops the pending debounced write, if any.
    pub fn cancel(&self) {
        let _ = self.send(Command::Cancel);
    }

    /// Identity of the note; changes once when a draft is promoted.
    pub fn identity(&self) -> NoteIdentity {
        self.identity.borrow().clone()
    }

    pub fn subscribe_identity(&self) -> watch::Receiver<NoteIdentity> {
        self.identity.clone()
    }

    pub fn status(&self) -> AutosaveStatus {
        self.status.borrow().clone()
    }

    pub fn subscribe_status(&self) -> watch::Receiver<AutosaveStatus> {
        self.status.clone()
    }

    /// Stops the actor after any in-flight write; the pending debounce is
    /// discarded.
    pub async fn shutdown(self) {
        let _ = self.commands.send(Command::Shutdown);
        if let Err(err) = self.task.await {
            error!("event=autosave_shutdown module=autosave status=error error={err}");
        }
    }

    fn send(&self, command: Command) -> Result<(), SaveError> {
        self.commands
            .send(command)
            .map_err(|_| SaveError::ReconcilerStopped)
    }
}

/// Actor state; lives inside the spawned task.
pub struct AutosaveReconciler {
    store: Arc<dyn NoteStore>,
    delay: Duration,
    identity: NoteIdentity,
    persisted: Option<Note>,
    identity_tx: watch::Sender<NoteIdentity>,
    status_tx: watch::Sender<AutosaveStatus>,
}

impl AutosaveReconciler {
    /// Spawns the actor on the current tokio runtime.
    ///
    /// `persisted` is the last known stored record for a persisted identity;
    /// when absent it is fetched on the first write.
    pub fn spawn(
        store: Arc<dyn NoteStore>,
        identity: NoteIdentity,
        persisted: Option<Note>,
        delay: Duration,
    ) -> AutosaveHandle {
        let (commands_tx, commands_rx) = mpsc::unbounded_channel();
        let (identity_tx, identity_rx) = watch::channel(identity.clone());
        let (status_tx, status_rx) = watch::channel(AutosaveStatus::Idle);

        let reconciler = Self {
            store,
            delay,
            identity,
            persisted,
            identity_tx,
            status_tx,
        };
        let task = tokio::spawn(reconciler.run(commands_rx));

        AutosaveHandle {
            commands: commands_tx,
            identity: identity_rx,
            status: status_rx,
            task,
        }
    }

    async fn run(mut self, mut commands: mpsc::UnboundedReceiver<Command>) {
        let mut pending: Option<(AutosaveState, Instant)> = None;
        loop {
            let command = match pending.as_ref().map(|(_, deadline)| *deadline) {
                Some(deadline) => tokio::select! {
                    _ = sleep_until(deadline) => {
                        if let Some((state, _)) = pending.take() {
                            if let Err(err) = self.write(state).await {
                                error!("event=autosave module=autosave status=error trigger=debounce error={err}");
                            }
                        }
                        continue;
                    }
                    command = commands.recv() => command,
                },
                None => commands.recv().await,
            };

            match command {
                Some(Command::Observe(state)) => {
                    pending = Some((state, Instant::now() + self.delay));
                    self.status_tx.send_replace(AutosaveStatus::Pending);
                }
                Some(Command::SaveNow(state, reply)) => {
                    pending = None;
                    let result = self.write(state).await;
                    if let Err(err) = &result {
                        error!("event=autosave module=autosave status=error trigger=manual error={err}");
                    }
                    let _ = reply.send(result);
                }
                Some(Command::Cancel) => {
                    if pending.take().is_some() {
                        debug!("event=autosave module=autosave status=cancelled");
                        self.status_tx.send_replace(AutosaveStatus::Idle);
                    }
                }
                Some(Command::Shutdown) | None => break,
            }
        }
        debug!(
            "event=autosave module=autosave status=stopped dropped_pending={}",
            pending.is_some()
        );
    }

    async fn write(&mut self, state: AutosaveState) -> Result<SaveOutcome, SaveError> {
        self.status_tx.send_replace(AutosaveStatus::Saving);
        let result = self.persist(state).await;
        let status = match &result {
            Ok(SaveOutcome::Created(_) | SaveOutcome::Updated(_)) => AutosaveStatus::Saved,
            Ok(SaveOutcome::Unchanged | SaveOutcome::EmptyDraftRejected) => AutosaveStatus::Skipped,
            Err(err) => AutosaveStatus::Failed(err.to_string()),
        };
        self.status_tx.send_replace(status);
        result
    }

    async fn persist(&mut self, state: AutosaveState) -> Result<SaveOutcome, SaveError> {
        let id = match &self.identity {
            NoteIdentity::Draft(_) => return self.persist_draft(state).await,
            NoteIdentity::Persisted(id) => id.clone(),
        };

        let base = match self.persisted.as_ref().filter(|note| note.id == id) {
            Some(note) => note.clone(),
            None => self
                .store
                .get(&id)
                .await?
                .ok_or_else(|| StoreError::NotFound(id.clone()))?,
        };
        if !differs_from_persisted(&base, &state) {
            debug!("event=autosave module=autosave status=skipped reason=unchanged");
            self.persisted = Some(base);
            return Ok(SaveOutcome::Unchanged);
        }

        let candidate = Note {
            title: state.title,
            content: Document::clone(&state.document),
            tags: state.tags,
            ..base
        };
        let saved = self.store.update(&candidate).await?;
        info!("event=autosave module=autosave status=ok action=update");
        self.persisted = Some(saved.clone());
        Ok(SaveOutcome::Updated(saved))
    }

    async fn persist_draft(&mut self, state: AutosaveState) -> Result<SaveOutcome, SaveError> {
        if is_truly_empty_draft(&state) {
            info!("event=autosave module=autosave status=skipped reason=empty_draft");
            return Ok(SaveOutcome::EmptyDraftRejected);
        }
        let created = self
            .store
            .create(NewNote {
                title: state.title,
                content: Document::clone(&state.document),
                tags: state.tags,
            })
            .await?;

        self.identity = NoteIdentity::Persisted(created.id.clone());
        self.identity_tx.send_replace(self.identity.clone());
        self.persisted = Some(created.clone());
        info!("event=autosave module=autosave status=ok action=create");
        Ok(SaveOutcome::Created(created))
    }
}
