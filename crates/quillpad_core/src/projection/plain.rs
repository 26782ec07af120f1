//! Human-readable plain text export projection.

use crate::model::block::{Block, ListStyle};
use crate::model::document::Document;
use crate::projection::inline::strip_markup;

/// Renders the document as plain text, blocks separated by a blank line.
pub fn plain_text(document: &Document) -> String {
    document
        .blocks
        .iter()
        .map(block_plain_text)
        .filter(|rendered| !rendered.trim().is_empty())
        .collect::<Vec<_>>()
        .join("\n\n")
}

fn block_plain_text(block: &Block) -> String {
    match block {
        Block::Paragraph { text } | Block::Header { text, .. } => strip_markup(text),
        Block::List { style, items } => items
            .iter()
            .enumerate()
            .map(|(idx, item)| match style {
                ListStyle::Ordered => format!("{}. {}", idx + 1, strip_markup(item)),
                ListStyle::Unordered => format!("- {}", strip_markup(item)),
            })
            .collect::<Vec<_>>()
            .join("\n"),
        Block::Quote { text, caption } => {
            let mut rendered = format!("\"{}\"", strip_markup(text));
            if let Some(caption) = caption {
                rendered.push_str(&format!("\n  - {}", strip_markup(caption)));
            }
            rendered
        }
        Block::Code { code, .. } => code.clone(),
        Block::Delimiter => "* * *".to_string(),
        Block::Image { url, caption, .. } => match caption {
            Some(caption) => format!("[Image: {url} - {}]", strip_markup(caption)),
            None => format!("[Image: {url}]"),
        },
        Block::Checklist { items } => items
            .iter()
            .map(|item| {
                let mark = if item.checked { "[x]" } else { "[ ]" };
                format!("{mark} {}", strip_markup(&item.text))
            })
            .collect::<Vec<_>>()
            .join("\n"),
        Block::Table { rows, .. } => rows
            .iter()
            .map(|row| {
                row.iter()
                    .map(|cell| strip_markup(cell))
                    .collect::<Vec<_>>()
                    .join("\t")
            })
            .collect::<Vec<_>>()
            .join("\n"),
        Block::Warning { title, message } => format!(
            "WARNING: {}\n{}",
            strip_markup(title),
            strip_markup(message)
        ),
        Block::Foreign { .. } | Block::Malformed(_) => block
            .fallback_text()
            .map(strip_markup)
            .unwrap_or_default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quotes_are_wrapped_and_images_become_placeholders() {
        let document = Document::from_blocks(vec![
            Block::header("<b>Title</b>", 1),
            Block::Quote {
                text: "to be".into(),
                caption: Some("Hamlet".into()),
            },
            Block::Image {
                url: "https://img/x.png".into(),
                caption: Some("Sunset".into()),
                alt: None,
            },
        ]);
        assert_eq!(
            plain_text(&document),
            "Title\n\n\"to be\"\n  - Hamlet\n\n[Image: https://img/x.png - Sunset]"
        );
    }

    #[test]
    fn lists_number_ordered_items() {
        let document = Document::from_blocks(vec![Block::List {
            style: ListStyle::Ordered,
            items: vec!["a".into(), "b".into()],
        }]);
        assert_eq!(plain_text(&document), "1. a\n2. b");
    }
}
