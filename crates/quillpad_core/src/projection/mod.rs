//! Text projections of documents.
//!
//! # Responsibility
//! - Map documents to flat text (search/AI), Markdown, plain text and list
//!   summaries.
//! - Map plain text back into a minimal document.
//!
//! # Invariants
//! - Projections are pure and never fail.
//! - The `*_from_raw` variants return an empty string for absent or
//!   malformed input (missing or non-array block sequence).

pub mod flat;
pub mod from_text;
pub mod inline;
pub mod markdown;
pub mod plain;
pub mod summary;

use crate::model::document::Document;
use serde_json::Value;

pub use flat::flat_text;
pub use from_text::{document_from_plain_text, single_paragraph_document};
pub use markdown::markdown;
pub use plain::plain_text;
pub use summary::summary;

/// Flat text of an untrusted JSON document.
pub fn flat_text_from_raw(raw: &Value) -> String {
    Document::from_value(raw)
        .map(|document| flat_text(&document))
        .unwrap_or_default()
}

/// Markdown of an untrusted JSON document.
pub fn markdown_from_raw(raw: &Value) -> String {
    Document::from_value(raw)
        .map(|document| markdown(&document))
        .unwrap_or_default()
}

/// Plain text of an untrusted JSON document.
pub fn plain_text_from_raw(raw: &Value) -> String {
    Document::from_value(raw)
        .map(|document| plain_text(&document))
        .unwrap_or_default()
}

/// Summary of an untrusted JSON document.
pub fn summary_from_raw(raw: &Value, max_chars: usize) -> String {
    Document::from_value(raw)
        .map(|document| summary(&document, max_chars))
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn raw_projections_tolerate_malformed_documents() {
        for raw in [Value::Null, json!({}), json!({ "blocks": 3 }), json!("text")] {
            assert_eq!(flat_text_from_raw(&raw), "");
            assert_eq!(markdown_from_raw(&raw), "");
            assert_eq!(plain_text_from_raw(&raw), "");
            assert_eq!(summary_from_raw(&raw, 10), "");
        }
    }

    #[test]
    fn raw_flat_text_reads_text_of_bad_blocks() {
        let raw = json!({
            "blocks": [
                { "type": "paragraph", "data": { "text": "A" } },
                { "type": "list", "data": { "items": ["x", "y"] } },
                { "type": "header", "data": { "text": "kept", "level": 42 } },
                17
            ]
        });
        assert_eq!(flat_text_from_raw(&raw), "A\nx y\nkept");
    }
}
