//! Structured note body.
//!
//! # Responsibility
//! - Hold the ordered block sequence plus its format tag and revision time.
//! - Provide the canonical empty document and blank-draft detection.
//!
//! # Invariants
//! - A sanitized document always has at least one block.
//! - Documents are shared as immutable snapshots (`Arc<Document>`); edits
//!   produce a new value instead of mutating a shared one.

use crate::model::block::Block;
use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Format tag written into every document produced by this crate.
pub const DOCUMENT_FORMAT_VERSION: &str = "1";

/// Ordered sequence of blocks forming one note body.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Document {
    /// Logical timestamp (epoch ms) of the last structural change.
    pub time: i64,
    pub blocks: Vec<Block>,
    pub version: String,
}

impl Document {
    /// Canonical empty document: one empty paragraph.
    pub fn empty() -> Self {
        Self::from_blocks(vec![Block::paragraph("")])
    }

    /// Builds a document from blocks with a zero revision time.
    pub fn from_blocks(blocks: Vec<Block>) -> Self {
        Self {
            time: 0,
            blocks,
            version: DOCUMENT_FORMAT_VERSION.to_string(),
        }
    }

    /// Returns a new snapshot with replaced blocks and revision time.
    pub fn revised(&self, blocks: Vec<Block>, time: i64) -> Self {
        Self {
            time,
            blocks,
            version: self.version.clone(),
        }
    }

    /// Whether the document holds no user-visible content.
    ///
    /// True for zero blocks or exactly one empty paragraph.
    pub fn is_blank(&self) -> bool {
        match self.blocks.as_slice() {
            [] => true,
            [only] => only.is_empty_paragraph(),
            _ => false,
        }
    }

    /// Whether any block still needs sanitization.
    pub fn has_malformed_blocks(&self) -> bool {
        self.blocks
            .iter()
            .any(|block| matches!(block, Block::Malformed(_)))
    }

    /// Encodes the document as its JSON wire object.
    pub fn to_value(&self) -> Value {
        serde_json::json!({
            "time": self.time,
            "blocks": self.blocks.iter().map(Block::to_wire).collect::<Vec<_>>(),
            "version": self.version,
        })
    }

    /// Decodes a wire object whose `blocks` field is an array.
    ///
    /// Elements are decoded without repair (bad ones become
    /// [`Block::Malformed`]). Returns `None` when the block sequence is
    /// missing or not an array.
    pub fn from_value(raw: &Value) -> Option<Self> {
        let object = raw.as_object()?;
        let blocks = object.get("blocks")?.as_array()?;
        Some(Self {
            time: object.get("time").and_then(Value::as_i64).unwrap_or(0),
            blocks: blocks.iter().map(Block::from_wire).collect(),
            version: object
                .get("version")
                .and_then(Value::as_str)
                .unwrap_or(DOCUMENT_FORMAT_VERSION)
                .to_string(),
        })
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::empty()
    }
}

impl<'de> Deserialize<'de> for Document {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Value::deserialize(deserializer)?;
        Self::from_value(&raw)
            .ok_or_else(|| de::Error::custom("document `blocks` must be an array"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn empty_document_is_blank() {
        assert!(Document::empty().is_blank());
        assert!(Document::from_blocks(Vec::new()).is_blank());
        assert!(!Document::from_blocks(vec![Block::paragraph("x")]).is_blank());
    }

    #[test]
    fn paragraph_with_only_markup_is_blank() {
        let document = Document::from_blocks(vec![Block::paragraph("<br> ")]);
        assert!(document.is_blank());
    }

    #[test]
    fn from_value_requires_block_array() {
        assert!(Document::from_value(&json!({ "blocks": "nope" })).is_none());
        assert!(Document::from_value(&json!({})).is_none());
        let parsed = Document::from_value(&json!({ "blocks": [] })).unwrap();
        assert!(parsed.blocks.is_empty());
        assert_eq!(parsed.version, DOCUMENT_FORMAT_VERSION);
    }

    #[test]
    fn serde_uses_wire_shape() {
        let document = Document::from_blocks(vec![Block::header("Hi", 1)]);
        let value = serde_json::to_value(&document).unwrap();
        assert_eq!(value, document.to_value());
        assert_eq!(value["blocks"][0]["type"], "header");
        let decoded: Document = serde_json::from_value(value).unwrap();
        assert_eq!(decoded, document);
    }
}
