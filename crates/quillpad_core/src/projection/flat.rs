//! Flat text projection used for search indexing and AI context.

use crate::model::block::Block;
use crate::model::document::Document;
use crate::projection::inline::strip_markup;

/// Renders the document as newline-joined plain text without markup.
///
/// Blocks with no textual rendering (delimiters, empty paragraphs) are
/// skipped rather than producing blank lines. Angle-bracket sequences are
/// stripped from every block, code included.
pub fn flat_text(document: &Document) -> String {
    document
        .blocks
        .iter()
        .map(block_flat_text)
        .filter(|text| !text.trim().is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

fn block_flat_text(block: &Block) -> String {
    let raw = match block {
        Block::Paragraph { text } | Block::Header { text, .. } => text.clone(),
        Block::List { items, .. } => items.join(" "),
        Block::Checklist { items } => items
            .iter()
            .map(|item| item.text.as_str())
            .collect::<Vec<_>>()
            .join(" "),
        Block::Quote { text, caption } => match caption {
            Some(caption) => format!("{text} {caption}"),
            None => text.clone(),
        },
        Block::Code { code, .. } => code.clone(),
        Block::Delimiter => String::new(),
        Block::Image { caption, .. } => caption.clone().unwrap_or_default(),
        Block::Table { rows, .. } => rows
            .iter()
            .map(|row| row.join(" "))
            .collect::<Vec<_>>()
            .join(" "),
        Block::Warning { title, message } => format!("{title} {message}"),
        Block::Foreign { .. } | Block::Malformed(_) => {
            block.fallback_text().unwrap_or_default().to_string()
        }
    };
    strip_markup(&raw)
}
