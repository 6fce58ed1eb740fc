//! Header rewrites: admonitions, level demotion and blockquoted headers.
//!
//! The converted books use `#` for chapter titles and `#####` for example
//! captions. Demoting everything by one level (with a few exceptions) makes
//! room for a single document title above the chapters.

use once_cell::sync::Lazy;
use regex::Regex;
use std::borrow::Cow;

static RE_ADMONITION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^######[ \t]*(Tip|Note|Caution|Warning)[ \t]*(\r?)$").unwrap());

static RE_EXAMPLE_HEADER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^#####\s*(Example\s+[0-9]+(?:-[0-9]+)?\..*)$").unwrap());

static RE_CHAPTER_TITLE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^#\s+Chapter\s+[0-9.]+.*$").unwrap());

static RE_DEMOTABLE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^#{1,5}\s+.*$").unwrap());

static RE_BLOCKQUOTE_HEADER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^(>[ \t]*)#{1,6}([ \t]+.*)$").unwrap());

/// `###### Note` → `[!Note]` (also `Tip`, `Caution`, `Warning`).
pub fn convert_admonitions(input: &str) -> String {
    RE_ADMONITION.replace_all(input, "[!${1}]${2}").into_owned()
}

/// Demote headers by one level, with the exceptions below.
///
/// Per line, first match wins:
/// 1. `##### Example 1-2. Title` → `*Example 1-2. Title*`
/// 2. `# Chapter Goals` → `### Chapter Goals`
/// 3. `# Chapter 3` (any dotted number) → unchanged
/// 4. `#`–`#####` → one more `#`; `######` is the ceiling
///
/// Line endings are preserved, so a document without headers comes back
/// byte-identical.
pub fn adjust_headers(input: &str) -> String {
    let mut out = String::with_capacity(input.len() + 64);
    for line in input.split_inclusive('\n') {
        let (body, ending) = split_line_ending(line);
        out.push_str(&adjust_header_line(body));
        out.push_str(ending);
    }
    out
}

fn adjust_header_line(line: &str) -> Cow<'_, str> {
    if let Some(caps) = RE_EXAMPLE_HEADER.captures(line) {
        return Cow::Owned(format!("*{}*", caps[1].trim()));
    }

    let trimmed = line.trim();
    if trimmed == "# Chapter Goals" {
        return Cow::Borrowed("### Chapter Goals");
    }
    if RE_CHAPTER_TITLE.is_match(trimmed) {
        return Cow::Borrowed(line);
    }

    if RE_DEMOTABLE.is_match(line) {
        return Cow::Owned(format!("#{line}"));
    }

    Cow::Borrowed(line)
}

/// Split `"text\r\n"` into `("text", "\r\n")`.
fn split_line_ending(line: &str) -> (&str, &str) {
    let body = match line.strip_suffix('\n') {
        Some(rest) => rest.strip_suffix('\r').unwrap_or(rest),
        None => line,
    };
    line.split_at(body.len())
}

/// `> ## Title` (any level) → `> ### Title`.
pub fn normalise_blockquote_headers(input: &str) -> String {
    RE_BLOCKQUOTE_HEADER
        .replace_all(input, "${1}###${2}")
        .into_owned()
}
