//! Keyword search over loaded notes.
//!
//! # Invariants
//! - Every query term must match somewhere in the note (title, tag or body).
//! - Matching is case-insensitive and uses the flat-text projection, so
//!   inline markup never matches.
//! - Ordering is deterministic: score desc, `updated_at` desc, id asc.

use crate::config::normalize_search_limit;
use crate::model::note::Note;
use crate::model::tags::normalize_tag;
use crate::projection::{flat_text, summary};

const TITLE_WEIGHT: u32 = 3;
const TAG_WEIGHT: u32 = 2;
const BODY_WEIGHT: u32 = 1;

/// Search options.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchQuery {
    /// Whitespace-separated terms.
    pub text: String,
    /// Optional exact tag filter (normalized before comparison).
    pub tag: Option<String>,
    /// Maximum hits; defaults to 20 and clamps to 100.
    pub limit: Option<u32>,
}

impl SearchQuery {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = Some(tag.into());
        self
    }

    pub fn with_limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }
}

/// One ranked note.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchHit {
    pub note_id: String,
    pub title: String,
    pub score: u32,
    pub updated_at: i64,
    /// Summary projection of the note body.
    pub snippet: String,
}

/// Ranks `notes` against `query`; snippets are summaries capped at
/// `snippet_max_chars`.
///
/// A blank query without a tag filter returns nothing; a blank query with a
/// tag filter lists every note carrying that tag.
pub fn search_notes(
    notes: &[Note],
    query: &SearchQuery,
    snippet_max_chars: usize,
) -> Vec<SearchHit> {
    let terms: Vec<String> = query
        .text
        .split_whitespace()
        .map(str::to_lowercase)
        .collect();
    let tag_filter = query.tag.as_deref().and_then(normalize_tag);
    if terms.is_empty() && tag_filter.is_none() {
        return Vec::new();
    }

    let mut hits: Vec<SearchHit> = notes
        .iter()
        .filter(|note| match &tag_filter {
            Some(tag) => note
                .tags
                .iter()
                .any(|candidate| normalize_tag(candidate).as_ref() == Some(tag)),
            None => true,
        })
        .filter_map(|note| {
            score_note(note, &terms).map(|score| SearchHit {
                note_id: note.id.clone(),
                title: note.title.clone(),
                score,
                updated_at: note.updated_at,
                snippet: summary(&note.content, snippet_max_chars),
            })
        })
        .collect();

    hits.sort_by(|left, right| {
        right
            .score
            .cmp(&left.score)
            .then_with(|| right.updated_at.cmp(&left.updated_at))
            .then_with(|| left.note_id.cmp(&right.note_id))
    });
    hits.truncate(normalize_search_limit(query.limit) as usize);
    hits
}

fn score_note(note: &Note, terms: &[String]) -> Option<u32> {
    let title = note.title.to_lowercase();
    let tags: Vec<String> = note.tags.iter().map(|tag| tag.to_lowercase()).collect();
    let body = flat_text(&note.content).to_lowercase();

    let mut score = 0;
    for term in terms {
        let mut term_score = 0;
        if title.contains(term.as_str()) {
            term_score += TITLE_WEIGHT;
        }
        if tags.iter().any(|tag| tag.contains(term.as_str())) {
            term_score += TAG_WEIGHT;
        }
        if body.contains(term.as_str()) {
            term_score += BODY_WEIGHT;
        }
        if term_score == 0 {
            return None;
        }
        score += term_score;
    }
    Some(score)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::block::Block;
    use crate::model::document::Document;

    const SNIPPET: usize = 120;

    fn note(id: &str, title: &str, body: &str, tags: &[&str], updated_at: i64) -> Note {
        Note {
            id: id.into(),
            title: title.into(),
            content: Document::from_blocks(vec![Block::paragraph(body)]),
            tags: tags.iter().map(|tag| tag.to_string()).collect(),
            created_at: 0,
            updated_at,
        }
    }

    #[test]
    fn all_terms_must_match() {
        let notes = vec![
            note("a", "Rust notes", "ownership rules", &[], 1),
            note("b", "Rust", "nothing else", &[], 2),
        ];
        let hits = search_notes(&notes, &SearchQuery::new("rust OWNERSHIP"), SNIPPET);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].note_id, "a");
    }

    #[test]
    fn title_hits_outrank_body_hits_then_recency() {
        let notes = vec![
            note("a", "other", "mentions trip", &[], 9),
            note("b", "Trip plan", "", &[], 1),
            note("c", "Trip list", "", &[], 5),
        ];
        let ids: Vec<_> = search_notes(&notes, &SearchQuery::new("trip"), SNIPPET)
            .into_iter()
            .map(|hit| hit.note_id)
            .collect();
        assert_eq!(ids, vec!["c", "b", "a"]);
    }

    #[test]
    fn markup_is_not_searchable() {
        let notes = vec![note("a", "", "<b>bold</b>", &[], 1)];
        assert!(search_notes(&notes, &SearchQuery::new("b>"), SNIPPET).is_empty());
        assert_eq!(search_notes(&notes, &SearchQuery::new("bold"), SNIPPET).len(), 1);
    }

    #[test]
    fn tag_filter_alone_lists_tagged_notes() {
        let notes = vec![
            note("a", "x", "", &["Work"], 1),
            note("b", "y", "", &["home"], 2),
        ];
        let hits = search_notes(&notes, &SearchQuery::new("  ").with_tag("work"), SNIPPET);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].note_id, "a");
        assert!(search_notes(&notes, &SearchQuery::new(""), SNIPPET).is_empty());
    }

    #[test]
    fn limit_is_applied_after_ordering() {
        let notes: Vec<Note> = (0..5)
            .map(|i| note(&format!("n{i}"), "same", "", &[], i))
            .collect();
        let hits = search_notes(&notes, &SearchQuery::new("same").with_limit(2), SNIPPET);
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].note_id, "n4");
    }
}
