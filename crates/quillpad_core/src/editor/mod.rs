//! External block-editor boundary.
//!
//! # Responsibility
//! - Describe the capability surface (`construct`, `save`, `render`,
//!   `clear`, `destroy`) any block editor must offer.
//! - Carry content-changed notifications back to the lifecycle controller.
//! - Model the hosting surface as an attach/detach signal.
//!
//! # Invariants
//! - Editors report raw JSON; nothing they emit becomes a `Document` without
//!   validation and sanitization by [`lifecycle::EditorLifecycle`].
//! - `BlockEditor::destroy` tolerates repeated calls.
//!
//! # See also
//! - [`lifecycle`] for the state machine driving these traits.

use crate::model::document::Document;
use async_trait::async_trait;
use serde_json::Value;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::Arc;
use tokio::sync::{mpsc, watch};

pub mod lifecycle;

pub use lifecycle::{EditorLifecycle, EditorPhase, LifecycleError, LoadedNote, MountOutcome};

pub type EditorResult<T> = Result<T, EditorError>;

/// Failure reported by an editor implementation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditorError {
    /// The editor could not be built on the surface.
    Construction(String),
    /// A call on a live editor failed.
    Call(String),
    /// The editor has already been torn down.
    Destroyed,
}

impl Display for EditorError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Construction(message) => write!(f, "editor construction failed: {message}"),
            Self::Call(message) => write!(f, "editor call failed: {message}"),
            Self::Destroyed => write!(f, "editor already destroyed"),
        }
    }
}

impl Error for EditorError {}

/// One content-changed notification, tagged with the mount that produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct ContentChange {
    pub generation: u64,
    pub payload: Value,
}

/// Callback handed to an editor at construction time.
#[derive(Debug, Clone)]
pub struct ChangeSink {
    generation: u64,
    tx: mpsc::UnboundedSender<ContentChange>,
}

impl ChangeSink {
    pub(crate) fn new(generation: u64, tx: mpsc::UnboundedSender<ContentChange>) -> Self {
        Self { generation, tx }
    }

    /// Reports the editor's current output. Returns `false` once the
    /// controller is gone.
    pub fn notify(&self, payload: Value) -> bool {
        self.tx
            .send(ContentChange {
                generation: self.generation,
                payload,
            })
            .is_ok()
    }

    /// Convenience for editors that already hold a typed document.
    pub fn notify_document(&self, document: &Document) -> bool {
        self.notify(document.to_value())
    }
}

/// Construction parameters for one editor instance.
#[derive(Debug, Clone)]
pub struct EditorOptions {
    pub initial_document: Arc<Document>,
    pub placeholder: String,
    pub on_change: ChangeSink,
}

/// A live editor instance.
#[async_trait]
pub trait BlockEditor: Send {
    /// Current content as the editor's raw JSON output.
    async fn save(&mut self) -> EditorResult<Value>;
    /// Replaces the editor content.
    async fn render(&mut self, document: &Document) -> EditorResult<()>;
    async fn clear(&mut self) -> EditorResult<()>;
    /// Releases the instance; calling it again must be harmless.
    async fn destroy(&mut self) -> EditorResult<()>;
}

/// Builds editors on a hosting surface.
#[async_trait]
pub trait EditorFactory: Send + Sync {
    type Editor: BlockEditor;

    async fn construct(
        &self,
        surface: &SurfaceHandle,
        options: EditorOptions,
    ) -> EditorResult<Self::Editor>;
}

/// Host-side switch for the rendering surface.
#[derive(Debug)]
pub struct SurfaceHost {
    tx: watch::Sender<bool>,
}

/// Editor-side view of the rendering surface.
#[derive(Debug, Clone)]
pub struct SurfaceHandle {
    rx: watch::Receiver<bool>,
}

impl SurfaceHost {
    /// New attached surface and its handle.
    pub fn new() -> (Self, SurfaceHandle) {
        let (tx, rx) = watch::channel(true);
        (Self { tx }, SurfaceHandle { rx })
    }

    pub fn detach(&self) {
        self.tx.send_replace(false);
    }

    pub fn attach(&self) {
        self.tx.send_replace(true);
    }

    pub fn handle(&self) -> SurfaceHandle {
        SurfaceHandle {
            rx: self.tx.subscribe(),
        }
    }
}

impl SurfaceHandle {
    pub fn is_attached(&self) -> bool {
        *self.rx.borrow()
    }

    /// Resolves once the surface is detached or its host is dropped.
    pub async fn detached(&self) {
        let mut rx = self.rx.clone();
        loop {
            if !*rx.borrow_and_update() {
                return;
            }
            // Err means the host is gone, which counts as detached.
            if rx.changed().await.is_err() {
                return;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn dropping_host_counts_as_detached() {
        let (host, handle) = SurfaceHost::new();
        assert!(handle.is_attached());
        drop(host);
        handle.detached().await;
    }

    #[tokio::test]
    async fn sink_reports_closed_controller() {
        let (tx, rx) = mpsc::unbounded_channel();
        let sink = ChangeSink::new(3, tx);
        assert!(sink.notify_document(&Document::empty()));
        drop(rx);
        assert!(!sink.notify(Value::Null));
    }
}
