//! Block variants and their JSON wire shape.
//!
//! # Responsibility
//! - Define the closed set of block kinds the core understands.
//! - Decode `{ "type": ..., "data": {...} }` wire objects into typed blocks,
//!   reporting every field that had to be coerced.
//!
//! # Invariants
//! - Decoding never fails: undecodable input is kept verbatim as
//!   [`Block::Malformed`] so nothing is lost before sanitization.
//! - Encoding a non-malformed block and decoding it again yields the same
//!   block with zero repairs.

use serde::de::Deserializer;
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

/// Header level used when the stored level is missing or out of range.
pub const DEFAULT_HEADER_LEVEL: u8 = 2;

/// Ordered vs unordered list rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ListStyle {
    Ordered,
    Unordered,
}

impl ListStyle {
    fn as_wire(self) -> &'static str {
        match self {
            Self::Ordered => "ordered",
            Self::Unordered => "unordered",
        }
    }
}

/// One entry of a checklist block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChecklistItem {
    pub text: String,
    #[serde(default)]
    pub checked: bool,
}

/// One typed unit of document content.
#[derive(Debug, Clone, PartialEq)]
pub enum Block {
    Paragraph {
        text: String,
    },
    Header {
        text: String,
        /// Always within `1..=6` for blocks produced by decoding.
        level: u8,
    },
    List {
        style: ListStyle,
        items: Vec<String>,
    },
    Quote {
        text: String,
        caption: Option<String>,
    },
    Code {
        code: String,
        language: Option<String>,
    },
    Delimiter,
    Image {
        url: String,
        caption: Option<String>,
        alt: Option<String>,
    },
    Checklist {
        items: Vec<ChecklistItem>,
    },
    Table {
        rows: Vec<Vec<String>>,
        with_headings: bool,
    },
    Warning {
        title: String,
        message: String,
    },
    /// Block kind contributed by a foreign editor plugin; payload kept as-is.
    Foreign {
        kind: String,
        data: Map<String, Value>,
    },
    /// Wire value that did not match any valid block shape.
    ///
    /// Only exists between import/decoding and the next sanitization pass.
    Malformed(Value),
}

impl Block {
    /// Creates a paragraph block.
    pub fn paragraph(text: impl Into<String>) -> Self {
        Self::Paragraph { text: text.into() }
    }

    /// Creates a header block, clamping invalid levels to the default.
    pub fn header(text: impl Into<String>, level: u8) -> Self {
        let level = if (1..=6).contains(&level) {
            level
        } else {
            DEFAULT_HEADER_LEVEL
        };
        Self::Header {
            text: text.into(),
            level,
        }
    }

    /// Wire name of this block's kind.
    pub fn kind(&self) -> &str {
        match self {
            Self::Paragraph { .. } => "paragraph",
            Self::Header { .. } => "header",
            Self::List { .. } => "list",
            Self::Quote { .. } => "quote",
            Self::Code { .. } => "code",
            Self::Delimiter => "delimiter",
            Self::Image { .. } => "image",
            Self::Checklist { .. } => "checklist",
            Self::Table { .. } => "table",
            Self::Warning { .. } => "warning",
            Self::Foreign { kind, .. } => kind.as_str(),
            Self::Malformed(_) => "malformed",
        }
    }

    /// Text-like field exposed by foreign or malformed payloads.
    pub fn fallback_text(&self) -> Option<&str> {
        match self {
            Self::Foreign { data, .. } => data.get("text").and_then(Value::as_str),
            Self::Malformed(raw) => raw
                .get("data")
                .and_then(|data| data.get("text"))
                .and_then(Value::as_str),
            _ => None,
        }
    }

    /// Whether this is a paragraph with no visible text.
    pub fn is_empty_paragraph(&self) -> bool {
        match self {
            Self::Paragraph { text } => crate::projection::inline::strip_markup(text)
                .trim()
                .is_empty(),
            _ => false,
        }
    }

    /// Encodes the block into its `{ type, data }` wire object.
    pub fn to_wire(&self) -> Value {
        let (kind, data) = match self {
            Self::Paragraph { text } => ("paragraph", json!({ "text": text })),
            Self::Header { text, level } => ("header", json!({ "text": text, "level": level })),
            Self::List { style, items } => (
                "list",
                json!({ "style": style.as_wire(), "items": items }),
            ),
            Self::Quote { text, caption } => {
                let mut data = Map::new();
                data.insert("text".into(), Value::from(text.as_str()));
                insert_optional(&mut data, "caption", caption);
                ("quote", Value::Object(data))
            }
            Self::Code { code, language } => {
                let mut data = Map::new();
                data.insert("code".into(), Value::from(code.as_str()));
                insert_optional(&mut data, "language", language);
                ("code", Value::Object(data))
            }
            Self::Delimiter => ("delimiter", json!({})),
            Self::Image { url, caption, alt } => {
                let mut data = Map::new();
                data.insert("url".into(), Value::from(url.as_str()));
                insert_optional(&mut data, "caption", caption);
                insert_optional(&mut data, "alt", alt);
                ("image", Value::Object(data))
            }
            Self::Checklist { items } => ("checklist", json!({ "items": items })),
            Self::Table {
                rows,
                with_headings,
            } => (
                "table",
                json!({ "withHeadings": with_headings, "content": rows }),
            ),
            Self::Warning { title, message } => {
                ("warning", json!({ "title": title, "message": message }))
            }
            Self::Foreign { kind, data } => {
                return json!({ "type": kind, "data": Value::Object(data.clone()) });
            }
            Self::Malformed(raw) => return raw.clone(),
        };
        json!({ "type": kind, "data": data })
    }

    /// Decodes one wire element without repairing it.
    ///
    /// Anything that would need a repair is kept verbatim as
    /// [`Block::Malformed`].
    pub fn from_wire(raw: &Value) -> Self {
        let Some(object) = raw.as_object() else {
            return Self::Malformed(raw.clone());
        };
        let Some(kind) = object.get("type").and_then(Value::as_str) else {
            return Self::Malformed(raw.clone());
        };
        let Some(data) = object.get("data").and_then(Value::as_object) else {
            return Self::Malformed(raw.clone());
        };

        let (block, repairs) = decode_payload(kind, data);
        if repairs.is_empty() {
            block
        } else {
            Self::Malformed(raw.clone())
        }
    }
}

impl Serialize for Block {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_wire().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Block {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Value::deserialize(deserializer)?;
        Ok(Self::from_wire(&raw))
    }
}

/// Decodes a block payload of the given kind, coercing bad fields.
///
/// Returns the decoded block plus one description per coerced field. Unknown
/// kinds are preserved as [`Block::Foreign`] without repairs.
pub(crate) fn decode_payload(kind: &str, data: &Map<String, Value>) -> (Block, Vec<String>) {
    let mut repairs = Vec::new();
    let block = match kind {
        "paragraph" => Block::Paragraph {
            text: required_string(data, "text", kind, &mut repairs),
        },
        "header" => {
            let text = required_string(data, "text", kind, &mut repairs);
            let level = match data.get("level").and_then(Value::as_i64) {
                Some(level) if (1..=6).contains(&level) => level as u8,
                Some(level) => {
                    repairs.push(format!(
                        "header level {level} out of range; using {DEFAULT_HEADER_LEVEL}"
                    ));
                    DEFAULT_HEADER_LEVEL
                }
                None => {
                    repairs.push(format!(
                        "header level missing or not an integer; using {DEFAULT_HEADER_LEVEL}"
                    ));
                    DEFAULT_HEADER_LEVEL
                }
            };
            Block::Header { text, level }
        }
        "list" => {
            let style = match data.get("style") {
                None => ListStyle::Unordered,
                Some(Value::String(style)) if style == "ordered" => ListStyle::Ordered,
                Some(Value::String(style)) if style == "unordered" => ListStyle::Unordered,
                Some(_) => {
                    repairs.push("list style invalid; using unordered".to_string());
                    ListStyle::Unordered
                }
            };
            let items = match data.get("items").and_then(Value::as_array) {
                Some(raw_items) => {
                    let mut items = Vec::with_capacity(raw_items.len());
                    for raw_item in raw_items {
                        match list_item_text(raw_item) {
                            Some(text) => items.push(text),
                            None => repairs.push("dropped non-text list item".to_string()),
                        }
                    }
                    items
                }
                None => {
                    repairs.push("list items missing; using empty list".to_string());
                    Vec::new()
                }
            };
            Block::List { style, items }
        }
        "quote" => Block::Quote {
            text: required_string(data, "text", kind, &mut repairs),
            caption: optional_string(data, "caption", kind, &mut repairs),
        },
        "code" => Block::Code {
            code: required_string(data, "code", kind, &mut repairs),
            language: optional_string(data, "language", kind, &mut repairs),
        },
        "delimiter" => Block::Delimiter,
        "image" => {
            let url = data
                .get("url")
                .and_then(Value::as_str)
                .or_else(|| {
                    data.get("file")
                        .and_then(|file| file.get("url"))
                        .and_then(Value::as_str)
                })
                .map(str::to_string);
            let url = match url {
                Some(url) => url,
                None => {
                    repairs.push("image url missing; using empty url".to_string());
                    String::new()
                }
            };
            Block::Image {
                url,
                caption: optional_string(data, "caption", kind, &mut repairs),
                alt: optional_string(data, "alt", kind, &mut repairs),
            }
        }
        "checklist" => {
            let items = match data.get("items").and_then(Value::as_array) {
                Some(raw_items) => raw_items
                    .iter()
                    .filter_map(|raw_item| checklist_item(raw_item, &mut repairs))
                    .collect(),
                None => {
                    repairs.push("checklist items missing; using empty checklist".to_string());
                    Vec::new()
                }
            };
            Block::Checklist { items }
        }
        "table" => {
            let with_headings = match data.get("withHeadings") {
                None => false,
                Some(Value::Bool(flag)) => *flag,
                Some(_) => {
                    repairs.push("table withHeadings not a boolean; using false".to_string());
                    false
                }
            };
            let rows = match data.get("content").and_then(Value::as_array) {
                Some(raw_rows) => raw_rows
                    .iter()
                    .filter_map(|raw_row| table_row(raw_row, &mut repairs))
                    .collect(),
                None => {
                    repairs.push("table content missing; using empty table".to_string());
                    Vec::new()
                }
            };
            Block::Table {
                rows,
                with_headings,
            }
        }
        "warning" => Block::Warning {
            title: required_string(data, "title", kind, &mut repairs),
            message: required_string(data, "message", kind, &mut repairs),
        },
        other => Block::Foreign {
            kind: other.to_string(),
            data: data.clone(),
        },
    };
    (block, repairs)
}

fn required_string(
    data: &Map<String, Value>,
    field: &str,
    kind: &str,
    repairs: &mut Vec<String>,
) -> String {
    match data.get(field) {
        Some(Value::String(value)) => value.clone(),
        Some(_) => {
            repairs.push(format!("{kind} {field} not a string; using empty text"));
            String::new()
        }
        None => {
            repairs.push(format!("{kind} {field} missing; using empty text"));
            String::new()
        }
    }
}

fn optional_string(
    data: &Map<String, Value>,
    field: &str,
    kind: &str,
    repairs: &mut Vec<String>,
) -> Option<String> {
    match data.get(field) {
        None | Some(Value::Null) => None,
        Some(Value::String(value)) if value.is_empty() => None,
        Some(Value::String(value)) => Some(value.clone()),
        Some(_) => {
            repairs.push(format!("{kind} {field} not a string; dropped"));
            None
        }
    }
}

fn insert_optional(data: &mut Map<String, Value>, field: &str, value: &Option<String>) {
    if let Some(value) = value {
        data.insert(field.to_string(), Value::from(value.as_str()));
    }
}

// Nested-list editors emit `{ "content": "...", "items": [...] }` objects.
fn list_item_text(raw: &Value) -> Option<String> {
    match raw {
        Value::String(text) => Some(text.clone()),
        Value::Object(object) => object
            .get("content")
            .and_then(Value::as_str)
            .map(str::to_string),
        _ => None,
    }
}

fn checklist_item(raw: &Value, repairs: &mut Vec<String>) -> Option<ChecklistItem> {
    let Some(object) = raw.as_object() else {
        repairs.push("dropped non-object checklist item".to_string());
        return None;
    };
    let text = match object.get("text") {
        Some(Value::String(text)) => text.clone(),
        _ => {
            repairs.push("checklist item text not a string; using empty text".to_string());
            String::new()
        }
    };
    let checked = match object.get("checked") {
        None => false,
        Some(Value::Bool(flag)) => *flag,
        Some(_) => {
            repairs.push("checklist item checked flag not a boolean; using false".to_string());
            false
        }
    };
    Some(ChecklistItem { text, checked })
}

fn table_row(raw: &Value, repairs: &mut Vec<String>) -> Option<Vec<String>> {
    let Some(cells) = raw.as_array() else {
        repairs.push("dropped non-array table row".to_string());
        return None;
    };
    let row = cells
        .iter()
        .map(|cell| match cell {
            Value::String(text) => text.clone(),
            Value::Number(number) => {
                repairs.push("table cell number converted to text".to_string());
                number.to_string()
            }
            _ => {
                repairs.push("table cell not text; using empty cell".to_string());
                String::new()
            }
        })
        .collect();
    Some(row)
}
