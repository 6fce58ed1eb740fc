//! Stray inline HTML: index-term spans, intra-document anchors and Pandoc
//! `{#id}` reference tags.

use once_cell::sync::Lazy;
use regex::Regex;

// Empty chapter anchors, e.g. `<span id="ch01.html"></span>`.
static RE_EMPTY_CHAPTER_SPAN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?i)<span\s+id="ch[0-9]+\.html"[^>]*>\s*</span>"#).unwrap());

static RE_INDEXTERM_SPAN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?is)<span\s+[^>]*?data-type="indexterm"[^>]*>(.*?)</span>"#).unwrap()
});

static RE_INTERNAL_LINK: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r##"(?i)<a\s+(?:[^>]*?\s+)?href="#[^"]*"[^>]*>(.*?)</a>"##).unwrap()
});

static RE_REFERENCE_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"\{#[A-Za-z0-9_-]+\}").unwrap());

/// Drop empty `ch<N>.html` anchor spans and unwrap index-term spans.
pub fn remove_unwanted_spans(input: &str) -> String {
    let s = RE_EMPTY_CHAPTER_SPAN.replace_all(input, "");
    RE_INDEXTERM_SPAN.replace_all(&s, "${1}").into_owned()
}

/// `<a href="#x">text</a>` → `text`. External links are kept.
pub fn flatten_internal_links(input: &str) -> String {
    RE_INTERNAL_LINK.replace_all(input, "${1}").into_owned()
}

/// Remove every `{#identifier}` left by Pandoc.
pub fn remove_reference_tags(input: &str) -> String {
    RE_REFERENCE_TAG.replace_all(input, "").into_owned()
}
