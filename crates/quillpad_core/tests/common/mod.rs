//! Scriptable block editor used by lifecycle and session tests.

#![allow(dead_code)]

use async_trait::async_trait;
use quillpad_core::editor::EditorResult;
use quillpad_core::{
    BlockEditor, ChangeSink, Document, EditorError, EditorFactory, EditorOptions, SurfaceHandle,
};
use serde_json::Value;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Shared view into every editor a [`FakeFactory`] built.
#[derive(Clone, Default)]
pub struct Probe {
    inner: Arc<Mutex<ProbeState>>,
}

#[derive(Default)]
struct ProbeState {
    constructed: usize,
    destroyed: usize,
    fail_construction: bool,
    construct_delay: Option<Duration>,
    save_payload: Option<Value>,
    sinks: Vec<ChangeSink>,
    initial_documents: Vec<Arc<Document>>,
}

impl Probe {
    pub fn constructed(&self) -> usize {
        self.inner.lock().unwrap().constructed
    }

    pub fn destroyed(&self) -> usize {
        self.inner.lock().unwrap().destroyed
    }

    pub fn fail_construction(&self, fail: bool) {
        self.inner.lock().unwrap().fail_construction = fail;
    }

    pub fn delay_construction(&self, delay: Duration) {
        self.inner.lock().unwrap().construct_delay = Some(delay);
    }

    /// Raw value the next `save()` calls return.
    pub fn set_save_payload(&self, payload: Value) {
        self.inner.lock().unwrap().save_payload = Some(payload);
    }

    /// Sink handed to the most recently constructed editor.
    pub fn latest_sink(&self) -> ChangeSink {
        self.inner
            .lock()
            .unwrap()
            .sinks
            .last()
            .cloned()
            .expect("no editor constructed yet")
    }

    /// Sink handed to the `index`-th constructed editor.
    pub fn sink(&self, index: usize) -> ChangeSink {
        self.inner.lock().unwrap().sinks[index].clone()
    }

    pub fn latest_initial_document(&self) -> Arc<Document> {
        self.inner
            .lock()
            .unwrap()
            .initial_documents
            .last()
            .cloned()
            .expect("no editor constructed yet")
    }
}

pub struct FakeFactory {
    probe: Probe,
}

impl FakeFactory {
    pub fn new() -> (Self, Probe) {
        let probe = Probe::default();
        (
            Self {
                probe: probe.clone(),
            },
            probe,
        )
    }
}

#[async_trait]
impl EditorFactory for FakeFactory {
    type Editor = FakeEditor;

    async fn construct(
        &self,
        _surface: &SurfaceHandle,
        options: EditorOptions,
    ) -> EditorResult<FakeEditor> {
        let delay = self.probe.inner.lock().unwrap().construct_delay;
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let mut state = self.probe.inner.lock().unwrap();
        if state.fail_construction {
            return Err(EditorError::Construction("editor script failed to load".into()));
        }
        state.constructed += 1;
        state.sinks.push(options.on_change);
        state.initial_documents.push(options.initial_document.clone());
        Ok(FakeEditor {
            probe: self.probe.clone(),
            document: options.initial_document.to_value(),
            destroyed: false,
        })
    }
}

pub struct FakeEditor {
    probe: Probe,
    document: Value,
    destroyed: bool,
}

#[async_trait]
impl BlockEditor for FakeEditor {
    async fn save(&mut self) -> EditorResult<Value> {
        if self.destroyed {
            return Err(EditorError::Destroyed);
        }
        let scripted = self.probe.inner.lock().unwrap().save_payload.clone();
        Ok(scripted.unwrap_or_else(|| self.document.clone()))
    }

    async fn render(&mut self, document: &Document) -> EditorResult<()> {
        self.document = document.to_value();
        Ok(())
    }

    async fn clear(&mut self) -> EditorResult<()> {
        self.document = Document::empty().to_value();
        Ok(())
    }

    async fn destroy(&mut self) -> EditorResult<()> {
        if !self.destroyed {
            self.destroyed = true;
            self.probe.inner.lock().unwrap().destroyed += 1;
        }
        Ok(())
    }
}
