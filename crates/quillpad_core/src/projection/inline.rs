//! Inline markup handling for block text fields.
//!
//! Editor text fields may carry a small subset of inline HTML (`<b>`, `<i>`,
//! `<code>`, `<a href>`, `<br>`) plus character entities.

use once_cell::sync::Lazy;
use regex::Regex;

static BREAK_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)<br\s*/?>").expect("valid break regex"));
static TAG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]*>").expect("valid tag regex"));
static BOLD_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?is)<(?:b|strong)(?:\s[^>]*)?>(.*?)</(?:b|strong)>").expect("valid bold regex")
});
static ITALIC_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?is)<(?:i|em)(?:\s[^>]*)?>(.*?)</(?:i|em)>").expect("valid italic regex")
});
static CODE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?is)<code(?:\s[^>]*)?>(.*?)</code>").expect("valid inline code regex")
});
static LINK_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?is)<a\s[^>]*href\s*=\s*"([^"]*)"[^>]*>(.*?)</a>"#).expect("valid link regex")
});

/// Decodes common entities and removes all angle-bracket sequences.
///
/// Entities are decoded first so encoded tags (`&lt;b&gt;`) are stripped too.
/// `<br>` becomes a newline so line structure survives.
pub fn strip_markup(text: &str) -> String {
    if !text.contains('<') && !text.contains('&') {
        return text.to_string();
    }
    let decoded = decode_entities(text);
    let with_breaks = BREAK_RE.replace_all(&decoded, "\n");
    TAG_RE.replace_all(&with_breaks, "").into_owned()
}

/// Converts supported inline markup to Markdown, stripping the rest.
pub fn markup_to_markdown(text: &str) -> String {
    if !text.contains('<') && !text.contains('&') {
        return text.to_string();
    }
    let converted = BREAK_RE.replace_all(text, "\n");
    let converted = LINK_RE.replace_all(&converted, "[$2]($1)");
    let converted = BOLD_RE.replace_all(&converted, "**$1**");
    let converted = ITALIC_RE.replace_all(&converted, "*$1*");
    let converted = CODE_RE.replace_all(&converted, "`$1`");
    let stripped = TAG_RE.replace_all(&converted, "");
    decode_entities(&stripped)
}

fn decode_entities(text: &str) -> String {
    text.replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
}
