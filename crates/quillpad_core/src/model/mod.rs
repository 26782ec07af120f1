//! Document and note domain model.
//!
//! # Responsibility
//! - Define canonical data structures used by core business logic.
//! - Own the repair rules that turn stored or emitted data into valid
//!   documents.
//!
//! # Invariants
//! - Every sanitized document has a non-empty block sequence.
//! - Draft and persisted note identities are distinct types of value.

pub mod block;
pub mod document;
pub mod note;
pub mod sanitize;
pub mod tags;
