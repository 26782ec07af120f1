//! Persistence contracts and backends.
//!
//! # Responsibility
//! - Define the async `NoteStore` contract used by autosave and services.
//! - Isolate SQLite query details from orchestration code.
//!
//! # Invariants
//! - Every backend validates notes before writing them.
//! - Backends return semantic errors (`NotFound`) in addition to transport
//!   errors.

pub mod memory;
pub mod note_store;
pub mod sqlite;

pub use memory::InMemoryNoteStore;
pub use note_store::{NoteStore, StoreError, StoreResult};
pub use sqlite::SqliteNoteStore;
