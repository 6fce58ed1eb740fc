//! Footnote definitions left behind by the HTML-to-Markdown step.
//!
//! Two shapes show up at the start of a line and both become GFM footnote
//! definitions (`[^N]: text`):
//!
//! - `^([3](#fn3)) Some text`
//! - `<sup>[3](#fn3)</sup> Some text`
//!
//! Only single-line bodies are handled; continuation lines stay as they are.

use once_cell::sync::Lazy;
use regex::Regex;

static RE_CARET_FOOTNOTE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^\^\(\[([0-9]+)\]\(#[^)]+\)\)[ \t]*(.*)").unwrap());

static RE_SUP_FOOTNOTE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^<sup>\[([0-9]+)\]\(#[^)]+\)</sup>[ \t]+(.*)").unwrap());

/// `^([N](#anchor)) text` → `[^N]: text`.
pub fn fix_footnote_definitions(input: &str) -> String {
    RE_CARET_FOOTNOTE
        .replace_all(input, "[^${1}]: ${2}")
        .into_owned()
}

/// `<sup>[N](#anchor)</sup> text` → `[^N]: text`.
pub fn convert_superscript_footnotes(input: &str) -> String {
    RE_SUP_FOOTNOTE
        .replace_all(input, "[^${1}]: ${2}")
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn caret_definition() {
        assert_eq!(
            fix_footnote_definitions("^([3](#fn3)) Some text"),
            "[^3]: Some text"
        );
    }

    #[test]
    fn caret_definition_without_space() {
        assert_eq!(
            fix_footnote_definitions("^([12](#ch01fn12))See chapter 4."),
            "[^12]: See chapter 4."
        );
    }

    #[test]
    fn caret_only_at_line_start() {
        let input = "inline ^([3](#fn3)) stays\n^([4](#fn4)) moves";
        assert_eq!(
            fix_footnote_definitions(input),
            "inline ^([3](#fn3)) stays\n[^4]: moves"
        );
    }

    #[test]
    fn caret_empty_body_does_not_swallow_next_line() {
        let input = "^([1](#fn1))\nNext paragraph";
        assert_eq!(fix_footnote_definitions(input), "[^1]: \nNext paragraph");
    }

    #[test]
    fn superscript_definition() {
        assert_eq!(
            convert_superscript_footnotes("<sup>[7](#idm123)</sup> Caption text\n"),
            "[^7]: Caption text\n"
        );
    }

    #[test]
    fn superscript_requires_whitespace() {
        let input = "<sup>[7](#idm123)</sup>Glued";
        assert_eq!(convert_superscript_footnotes(input), input);
    }

    #[test]
    fn inline_superscript_reference_untouched() {
        let input = "Text with a marker<sup>[2](#fn2)</sup> inline.";
        assert_eq!(convert_superscript_footnotes(input), input);
    }

    #[test]
    fn idempotent() {
        let once = fix_footnote_definitions("^([3](#fn3)) A\n^([4](#fn4)) B");
        assert_eq!(fix_footnote_definitions(&once), once);
        let once = convert_superscript_footnotes("<sup>[1](#a)</sup> X");
        assert_eq!(convert_superscript_footnotes(&once), once);
    }
}
