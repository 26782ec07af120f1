//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate store calls into use-case level APIs.
//! - Drive one editing session per hosting surface.
//! - Keep host layers decoupled from storage details.

pub mod cache;
pub mod note_service;
pub mod note_session;

pub use note_service::{ImportReport, NoteService, NoteServiceError, NoteSummary};
pub use note_session::{save_feedback, NoteEditingSession, SessionError};
