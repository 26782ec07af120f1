//! Repair of raw or legacy document data into a valid [`Document`].
//!
//! # Responsibility
//! - Accept whatever was stored or emitted (`null`, legacy string, object
//!   with blocks) and return a structurally valid document.
//! - Describe every repair so callers can log it.
//!
//! # Invariants
//! - Never fails and never performs I/O.
//! - Output has at least one block and no [`Block::Malformed`] entries.
//! - `sanitize(sanitize(x).document) == sanitize(x)` for every input.

use crate::model::block::{decode_payload, Block};
use crate::model::document::{Document, DOCUMENT_FORMAT_VERSION};
use crate::projection::from_text::document_from_plain_text;
use serde_json::Value;
use std::fmt::{Display, Formatter};

/// One repair applied during sanitization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Repair {
    /// Block position in the input sequence, when the repair is block-local.
    pub index: Option<usize>,
    pub message: String,
}

impl Repair {
    fn document(message: impl Into<String>) -> Self {
        Self {
            index: None,
            message: message.into(),
        }
    }

    fn block(index: usize, message: impl Into<String>) -> Self {
        Self {
            index: Some(index),
            message: message.into(),
        }
    }
}

impl Display for Repair {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self.index {
            Some(index) => write!(f, "block {index}: {}", self.message),
            None => write!(f, "document: {}", self.message),
        }
    }
}

/// Sanitization result.
#[derive(Debug, Clone, PartialEq)]
pub struct Sanitized {
    pub document: Document,
    pub repairs: Vec<Repair>,
}

impl Sanitized {
    fn clean(document: Document) -> Self {
        Self {
            document,
            repairs: Vec::new(),
        }
    }

    pub fn was_repaired(&self) -> bool {
        !self.repairs.is_empty()
    }
}

/// Sanitizes a raw JSON document. `Value::Null` stands for "absent".
pub fn sanitize(raw: &Value) -> Sanitized {
    match raw {
        Value::Null => Sanitized::clean(Document::empty()),
        Value::String(text) => Sanitized::clean(document_from_plain_text(text)),
        Value::Object(object) => match object.get("blocks") {
            Some(Value::Array(elements)) => {
                let time = object.get("time").and_then(Value::as_i64).unwrap_or(0);
                let version = object
                    .get("version")
                    .and_then(Value::as_str)
                    .unwrap_or(DOCUMENT_FORMAT_VERSION)
                    .to_string();
                sanitize_elements(elements, time, version)
            }
            _ => Sanitized {
                document: Document::empty(),
                repairs: vec![Repair::document(
                    "block sequence missing or not an array; using empty document",
                )],
            },
        },
        other => Sanitized {
            document: Document::empty(),
            repairs: vec![Repair::document(format!(
                "unsupported document value of type {}; using empty document",
                json_type_name(other)
            ))],
        },
    }
}

/// Sanitizes an already-decoded document (e.g. imported content).
pub fn sanitize_document(document: &Document) -> Sanitized {
    if !document.has_malformed_blocks() && !document.blocks.is_empty() {
        // Typed blocks are valid by construction.
        return Sanitized::clean(document.clone());
    }
    sanitize(&document.to_value())
}

fn sanitize_elements(elements: &[Value], time: i64, version: String) -> Sanitized {
    let mut repairs = Vec::new();
    let mut blocks = Vec::with_capacity(elements.len());

    for (index, element) in elements.iter().enumerate() {
        let Some(object) = element.as_object() else {
            repairs.push(Repair::block(
                index,
                "element is not an object; replaced with empty paragraph",
            ));
            blocks.push(Block::paragraph(""));
            continue;
        };
        let Some(data) = object.get("data").and_then(Value::as_object) else {
            repairs.push(Repair::block(
                index,
                "payload is not an object; replaced with empty paragraph",
            ));
            blocks.push(Block::paragraph(""));
            continue;
        };
        let Some(kind) = object.get("type").and_then(Value::as_str) else {
            repairs.push(Repair::block(
                index,
                "block type missing; replaced with empty paragraph",
            ));
            blocks.push(Block::paragraph(""));
            continue;
        };

        let (block, notes) = decode_payload(kind, data);
        repairs.extend(notes.into_iter().map(|note| Repair::block(index, note)));
        blocks.push(block);
    }

    if blocks.is_empty() {
        repairs.push(Repair::document(
            "block sequence empty; using empty document",
        ));
        return Sanitized {
            document: Document::empty(),
            repairs,
        };
    }

    Sanitized {
        document: Document {
            time,
            blocks,
            version,
        },
        repairs,
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn null_and_non_objects_become_empty_document() {
        assert_eq!(sanitize(&Value::Null).document, Document::empty());
        assert_eq!(sanitize(&json!(42)).document, Document::empty());
        assert!(sanitize(&json!(42)).was_repaired());
        assert_eq!(sanitize(&json!([1, 2])).document, Document::empty());
    }

    #[test]
    fn legacy_string_splits_on_blank_lines() {
        let sanitized = sanitize(&json!("first\nline\n\n\n  \nsecond"));
        assert_eq!(
            sanitized.document.blocks,
            vec![Block::paragraph("first\nline"), Block::paragraph("second")]
        );
    }

    #[test]
    fn non_object_payload_is_replaced_with_empty_paragraph() {
        let sanitized = sanitize(&json!({
            "blocks": [
                { "type": "paragraph", "data": "oops" },
                "garbage",
                { "type": "paragraph", "data": { "text": "ok" } }
            ]
        }));
        assert_eq!(
            sanitized.document.blocks,
            vec![
                Block::paragraph(""),
                Block::paragraph(""),
                Block::paragraph("ok")
            ]
        );
        assert_eq!(sanitized.repairs.len(), 2);
        assert_eq!(sanitized.repairs[0].index, Some(0));
        assert_eq!(sanitized.repairs[1].index, Some(1));
    }

    #[test]
    fn header_without_level_gets_default_level() {
        let sanitized = sanitize(&json!({
            "blocks": [{ "type": "header", "data": { "text": "Hi" } }]
        }));
        assert_eq!(sanitized.document.blocks, vec![Block::header("Hi", 2)]);
        assert!(sanitized.was_repaired());
    }

    #[test]
    fn empty_block_sequence_becomes_canonical_empty() {
        let sanitized = sanitize(&json!({ "time": 5, "blocks": [] }));
        assert_eq!(sanitized.document, Document::empty());
    }

    #[test]
    fn sanitize_document_repairs_malformed_blocks() {
        let imported = Document::from_value(&json!({
            "blocks": [{ "type": "header", "data": { "text": 7, "level": 9 } }]
        }))
        .unwrap();
        assert!(imported.has_malformed_blocks());
        let sanitized = sanitize_document(&imported);
        assert_eq!(sanitized.document.blocks, vec![Block::header("", 2)]);
        assert_eq!(sanitized.repairs.len(), 2);
    }
}
