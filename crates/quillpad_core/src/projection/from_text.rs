//! Plain text back into a minimal document.

use crate::model::block::Block;
use crate::model::document::Document;
use once_cell::sync::Lazy;
use regex::Regex;

static BLANK_LINE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\r?\n[ \t]*\r?\n").expect("valid blank line regex"));

/// Builds one paragraph per blank-line separated group of text.
///
/// Empty groups are dropped; no remaining groups yields the canonical empty
/// document.
pub fn document_from_plain_text(text: &str) -> Document {
    let blocks: Vec<Block> = BLANK_LINE_RE
        .split(text)
        .map(str::trim)
        .filter(|group| !group.is_empty())
        .map(Block::paragraph)
        .collect();

    if blocks.is_empty() {
        Document::empty()
    } else {
        Document::from_blocks(blocks)
    }
}

/// Wraps text in exactly one paragraph, whatever it contains.
pub fn single_paragraph_document(text: &str) -> Document {
    Document::from_blocks(vec![Block::paragraph(text)])
}
