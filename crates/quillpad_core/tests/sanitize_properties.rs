use quillpad_core::{sanitize, sanitize_document, Block, Document};
use serde_json::{json, Value};

fn header_of(document: &Document) -> (String, u8) {
    match &document.blocks[0] {
        Block::Header { text, level } => (text.clone(), *level),
        other => panic!("expected header, got {other:?}"),
    }
}

#[test]
fn header_without_level_gets_default_level() {
    let sanitized = sanitize(&json!({ "blocks": [{ "type": "header", "data": { "text": "Hi" } }] }));

    assert_eq!(header_of(&sanitized.document), ("Hi".to_string(), 2));
    assert!(sanitized.was_repaired());
}

#[test]
fn malformed_headers_always_yield_string_text_and_valid_level() {
    let inputs = [
        json!({ "text": 42, "level": 3 }),
        json!({ "text": "x", "level": 0 }),
        json!({ "text": "x", "level": 9 }),
        json!({ "text": null, "level": "big" }),
        json!({}),
    ];
    for data in inputs {
        let sanitized = sanitize(&json!({ "blocks": [{ "type": "header", "data": data }] }));
        let (_, level) = header_of(&sanitized.document);
        assert!((1..=6).contains(&level), "level {level} out of range");
    }
}

#[test]
fn empty_and_absent_inputs_become_the_canonical_empty_document() {
    for raw in [
        Value::Null,
        json!({ "blocks": [] }),
        json!({ "blocks": "nope" }),
        json!({}),
        json!(17),
    ] {
        assert_eq!(sanitize(&raw).document, Document::empty(), "input {raw}");
    }
}

#[test]
fn sanitize_is_idempotent() {
    let inputs = [
        json!({
            "time": 5,
            "blocks": [
                { "type": "header", "data": { "text": 1 } },
                "garbage",
                { "type": "list", "data": { "style": "ordered", "items": ["a", 2, { "content": "c" }] } },
                { "type": "table", "data": { "content": [["a", "b"], "oops"] } },
                { "type": "mystery", "data": { "text": "kept" } },
                { "type": "image", "data": { "file": { "url": "http://x/y.png" }, "caption": "" } }
            ],
            "version": "1"
        }),
        json!({ "blocks": [{ "type": "paragraph", "data": { "text": "ok" } }] }),
        json!("two\n\nparagraphs"),
    ];
    for raw in inputs {
        let once = sanitize(&raw).document;
        let twice = sanitize(&once.to_value());
        assert_eq!(twice.document, once);
        assert!(!twice.was_repaired(), "second pass repaired {raw}");
    }
}

#[test]
fn non_object_elements_become_empty_paragraphs_with_indexed_repairs() {
    let sanitized = sanitize(&json!({
        "blocks": [
            { "type": "paragraph", "data": { "text": "keep" } },
            7,
            { "type": "paragraph", "data": "not an object" }
        ]
    }));

    assert_eq!(
        sanitized.document.blocks,
        vec![Block::paragraph("keep"), Block::paragraph(""), Block::paragraph("")]
    );
    let indexes: Vec<_> = sanitized.repairs.iter().map(|repair| repair.index).collect();
    assert_eq!(indexes, vec![Some(1), Some(2)]);
}

#[test]
fn unknown_kinds_survive_sanitization() {
    let sanitized = sanitize(&json!({
        "blocks": [{ "type": "embed", "data": { "service": "video", "text": "clip" } }]
    }));

    assert!(!sanitized.was_repaired());
    assert_eq!(sanitized.document.blocks[0].kind(), "embed");
    assert_eq!(sanitized.document.blocks[0].fallback_text(), Some("clip"));
}

#[test]
fn typed_documents_skip_repair() {
    let document = Document::from_blocks(vec![Block::header("Title", 1), Block::paragraph("x")]);
    let sanitized = sanitize_document(&document);

    assert_eq!(sanitized.document, document);
    assert!(!sanitized.was_repaired());
}
