//! Short preview text for note lists.

use crate::model::block::Block;
use crate::model::document::Document;
use crate::projection::inline::strip_markup;

/// Number of leading blocks considered for a summary.
const SUMMARY_BLOCK_WINDOW: usize = 3;
const ELLIPSIS: &str = "...";

/// Builds a preview from the first three blocks, capped at `max_chars`.
///
/// Only headers, paragraphs and lists contribute. When the text is longer
/// than `max_chars` characters it is cut and suffixed with `...`.
pub fn summary(document: &Document, max_chars: usize) -> String {
    let joined = document
        .blocks
        .iter()
        .take(SUMMARY_BLOCK_WINDOW)
        .filter_map(|block| match block {
            Block::Paragraph { text } | Block::Header { text, .. } => Some(strip_markup(text)),
            Block::List { items, .. } => Some(strip_markup(&items.join(" "))),
            _ => None,
        })
        .map(|text| text.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|text| !text.is_empty())
        .collect::<Vec<_>>()
        .join(" ");

    truncate_chars(&joined, max_chars)
}

fn truncate_chars(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let mut cut: String = text.chars().take(max_chars).collect();
    let trimmed_len = cut.trim_end().len();
    cut.truncate(trimmed_len);
    cut.push_str(ELLIPSIS);
    cut
}
