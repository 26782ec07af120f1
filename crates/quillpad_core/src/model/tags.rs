//! Note tag rules.
//!
//! # Invariants
//! - A note carries at most [`MAX_TAGS`] tags.
//! - Tags are trimmed, non-empty and unique case-insensitively.
//! - Stored order is insertion order; comparisons use the normalized set.

use std::collections::BTreeSet;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Maximum number of tags one note may carry.
pub const MAX_TAGS: usize = 10;

/// Rejected tag edit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TagError {
    Empty,
    Duplicate(String),
    LimitReached,
}

impl Display for TagError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Empty => write!(f, "tag cannot be empty"),
            Self::Duplicate(tag) => write!(f, "tag already present: `{tag}`"),
            Self::LimitReached => write!(f, "a note can have at most {MAX_TAGS} tags"),
        }
    }
}

impl Error for TagError {}

/// Normalized comparison key for one tag, `None` when blank.
pub fn normalize_tag(tag: &str) -> Option<String> {
    let trimmed = tag.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_lowercase())
    }
}

/// Order- and duplicate-insensitive view of a tag list.
pub fn tag_set(tags: &[String]) -> BTreeSet<String> {
    tags.iter().filter_map(|tag| normalize_tag(tag)).collect()
}

/// Whether two tag lists describe the same set.
pub fn same_tag_set(left: &[String], right: &[String]) -> bool {
    tag_set(left) == tag_set(right)
}

/// Appends one tag, keeping the list valid.
pub fn add_tag(tags: &mut Vec<String>, tag: &str) -> Result<(), TagError> {
    let Some(key) = normalize_tag(tag) else {
        return Err(TagError::Empty);
    };
    if tags.iter().any(|existing| normalize_tag(existing).as_deref() == Some(&key)) {
        return Err(TagError::Duplicate(tag.trim().to_string()));
    }
    if tags.len() >= MAX_TAGS {
        return Err(TagError::LimitReached);
    }
    tags.push(tag.trim().to_string());
    Ok(())
}

/// Removes a tag by normalized match. Returns whether anything was removed.
pub fn remove_tag(tags: &mut Vec<String>, tag: &str) -> bool {
    let Some(key) = normalize_tag(tag) else {
        return false;
    };
    let before = tags.len();
    tags.retain(|existing| normalize_tag(existing).as_deref() != Some(&key));
    tags.len() != before
}

/// Coerces an arbitrary list into a valid tag list.
///
/// Blank and duplicate entries are dropped and the list is capped at
/// [`MAX_TAGS`]; the first occurrence wins and order is preserved.
pub fn clean_tags<I, S>(tags: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut seen = BTreeSet::new();
    let mut cleaned = Vec::new();
    for tag in tags {
        let tag = tag.as_ref();
        let Some(key) = normalize_tag(tag) else {
            continue;
        };
        if cleaned.len() == MAX_TAGS {
            break;
        }
        if seen.insert(key) {
            cleaned.push(tag.trim().to_string());
        }
    }
    cleaned
}

/// Checks the tag invariants without modifying the list.
pub fn validate_tags(tags: &[String]) -> Result<(), TagError> {
    if tags.len() > MAX_TAGS {
        return Err(TagError::LimitReached);
    }
    let mut seen = BTreeSet::new();
    for tag in tags {
        let Some(key) = normalize_tag(tag) else {
            return Err(TagError::Empty);
        };
        if !seen.insert(key) {
            return Err(TagError::Duplicate(tag.clone()));
        }
    }
    Ok(())
}
