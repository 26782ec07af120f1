//! Import/export pipeline.
//!
//! # Responsibility
//! - Produce the versioned JSON envelope and single-note text artifacts.
//! - Accept current, notes-only and legacy (bare array) import files.
//!
//! # Invariants
//! - Exports are always written as envelope version 2.
//! - Imports never return a partial note list.

pub mod export;
pub mod import;
