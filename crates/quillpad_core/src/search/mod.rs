//! Note search entry points.
//!
//! # Responsibility
//! - Rank notes against a keyword query over title, tags and flat text.
//! - Keep result shaping (ordering, snippets, limits) inside core.

pub mod notes;

pub use notes::{search_notes, SearchHit, SearchQuery};
