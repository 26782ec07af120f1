//! Markdown export projection.

use crate::model::block::{Block, ListStyle};
use crate::model::document::Document;
use crate::projection::inline::{markup_to_markdown, strip_markup};

/// Renders the document as Markdown, one blank line between blocks.
pub fn markdown(document: &Document) -> String {
    document
        .blocks
        .iter()
        .map(block_markdown)
        .filter(|rendered| !rendered.is_empty())
        .collect::<Vec<_>>()
        .join("\n\n")
}

fn block_markdown(block: &Block) -> String {
    match block {
        Block::Paragraph { text } => markup_to_markdown(text),
        Block::Header { text, level } => format!(
            "{} {}",
            "#".repeat(usize::from(*level)),
            markup_to_markdown(text)
        ),
        Block::List { style, items } => {
            let marker = match style {
                ListStyle::Ordered => "1. ",
                ListStyle::Unordered => "* ",
            };
            items
                .iter()
                .map(|item| format!("{marker}{}", markup_to_markdown(item)))
                .collect::<Vec<_>>()
                .join("\n")
        }
        Block::Quote { text, caption } => {
            let mut rendered = format!("> {}", markup_to_markdown(text));
            if let Some(caption) = caption {
                rendered.push_str(&format!("\n> -- {}", markup_to_markdown(caption)));
            }
            rendered
        }
        Block::Code { code, language } => format!(
            "```{}\n{}\n```",
            language.as_deref().unwrap_or_default(),
            code
        ),
        Block::Delimiter => "---".to_string(),
        Block::Image { url, caption, alt } => {
            let alt_text = alt
                .as_deref()
                .or(caption.as_deref())
                .map(strip_markup)
                .unwrap_or_default();
            let mut rendered = format!("![{alt_text}]({url})");
            if let Some(caption) = caption {
                rendered.push_str(&format!("\n*{}*", markup_to_markdown(caption)));
            }
            rendered
        }
        Block::Checklist { items } => items
            .iter()
            .map(|item| {
                let mark = if item.checked { "[x]" } else { "[ ]" };
                format!("{mark} {}", markup_to_markdown(&item.text))
            })
            .collect::<Vec<_>>()
            .join("\n"),
        Block::Table {
            rows,
            with_headings,
        } => table_markdown(rows, *with_headings),
        Block::Warning { title, message } => format!(
            "**{}**\n{}",
            markup_to_markdown(title),
            markup_to_markdown(message)
        ),
        Block::Foreign { .. } | Block::Malformed(_) => block
            .fallback_text()
            .map(markup_to_markdown)
            .unwrap_or_default(),
    }
}

fn table_markdown(rows: &[Vec<String>], with_headings: bool) -> String {
    let render_row = |row: &Vec<String>, separator: &str| {
        row.iter()
            .map(|cell| markup_to_markdown(cell))
            .collect::<Vec<_>>()
            .join(separator)
    };

    if !with_headings {
        return rows
            .iter()
            .map(|row| render_row(row, "\t"))
            .collect::<Vec<_>>()
            .join("\n");
    }

    let Some((header, body)) = rows.split_first() else {
        return String::new();
    };
    let mut lines = Vec::with_capacity(rows.len() + 1);
    lines.push(render_row(header, " | "));
    lines.push(vec!["---"; header.len().max(1)].join(" | "));
    lines.extend(body.iter().map(|row| render_row(row, " | ")));
    lines.join("\n")
}
