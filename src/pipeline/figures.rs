//! Figures and images.
//!
//! - [`compose_figures`] merges a Markdown image and the `######` caption
//!   under it into one HTML `<figure>`.
//! - [`normalise_figures`] tidies `<figure>` blocks that were already HTML.
//! - [`numbered_images_to_text`] replaces decorative `1.png`, `2.png` …
//!   bullet images with literal `1. `, `2. ` prefixes.
//!
//! Composed figures use exactly the layout [`normalise_figures`] produces,
//! so running the normaliser after the composer is a no-op on them. The
//! numbered-image rewrite skips anything inside a `<figure>` block, so a
//! composed `1.png` figure keeps its `<img>`.
//!
//! Media folder names are matched ASCII case-insensitively in both the
//! composer and the numbered-image rewrite; the folder is written back as
//! found.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use std::ops::Range;

// Image line, optional blank lines, then a level-6 caption line.
static RE_IMAGE_WITH_CAPTION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(concat!(
        r"(?m)^!\[(?P<alt>[^\]]*)\]",
        r"\((?P<prefix>\.?/)(?P<folder>[^/)\s]+)/(?P<file>[^)]+)\)[ \t]*\r?\n",
        r"(?:[ \t]*\r?\n)*",
        r"######[ \t]*(?P<caption>.*?)[ \t]*(?P<cr>\r?)$",
    ))
    .unwrap()
});

static RE_MD_LINK: Lazy<Regex> = Lazy::new(|| Regex::new(r"\[([^\]]+)\]\(([^)]+)\)").unwrap());

static RE_HTML_FIGURE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<figure\b[^>]*>(.*?)</figure>").unwrap());

static RE_H6_OPEN: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)<h6([^>]*)>").unwrap());

static RE_H6_CLOSE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)</h6>").unwrap());

static RE_NUMBERED_IMG_SRC_FIRST: Lazy<Regex> = Lazy::new(|| {
    Regex::new(concat!(
        r#"(?i)<img\s+(?:[^>]*?\s+)?"#,
        r#"src="\./(?P<folder>[^"/]+)/(?P<src>[0-9]+)\.png""#,
        r#"(?:[^>]*?\s+)?alt="(?P<alt>[0-9]+)""#,
        r#"[^>]*?/?>[ \t]*\r?\n"#,
    ))
    .unwrap()
});

static RE_NUMBERED_IMG_ALT_FIRST: Lazy<Regex> = Lazy::new(|| {
    Regex::new(concat!(
        r#"(?i)<img\s+(?:[^>]*?\s+)?"#,
        r#"alt="(?P<alt>[0-9]+)""#,
        r#"(?:[^>]*?\s+)?src="\./(?P<folder>[^"/]+)/(?P<src>[0-9]+)\.png""#,
        r#"[^>]*?/?>[ \t]*\r?\n"#,
    ))
    .unwrap()
});

/// Merge `![alt](./<media>/file)` + `###### caption` into an HTML figure.
///
/// The image path may start with `./` or `/`. Blank lines between the image
/// and the caption are dropped, Markdown links in the caption become
/// `<a>` tags, and `"` in the alt text is escaped. The figure uses `\r\n`
/// line breaks when the matched lines did.
pub fn compose_figures(input: &str, media_folder: &str) -> String {
    RE_IMAGE_WITH_CAPTION
        .replace_all(input, |caps: &Captures<'_>| {
            if !caps["folder"].eq_ignore_ascii_case(media_folder) {
                return caps[0].to_string();
            }
            let nl = line_break_of(&caps[0]);
            let src = format!("{}{}/{}", &caps["prefix"], &caps["folder"], &caps["file"]);
            let alt = caps["alt"].replace('"', "&quot;");
            let caption = RE_MD_LINK.replace_all(&caps["caption"], r#"<a href="${2}">${1}</a>"#);
            format!(
                "<figure>{nl}<img src=\"{src}\" alt=\"{alt}\" />{nl}<figcaption>{caption}</figcaption>{nl}</figure>{}",
                &caps["cr"]
            )
        })
        .into_owned()
}

fn line_break_of(text: &str) -> &'static str {
    if text.contains("\r\n") {
        "\r\n"
    } else {
        "\n"
    }
}

/// Strip attributes from `<figure>` and turn its `<h6>` into `<figcaption>`.
///
/// Attributes on the `<h6>` are carried over to the `<figcaption>`. Each
/// block is re-emitted as opening tag, trimmed content, closing tag on
/// separate lines.
pub fn normalise_figures(input: &str) -> String {
    RE_HTML_FIGURE
        .replace_all(input, |caps: &Captures<'_>| {
            let content = RE_H6_OPEN.replace_all(&caps[1], "<figcaption${1}>");
            let content = RE_H6_CLOSE.replace_all(&content, "</figcaption>");
            let nl = line_break_of(&content);
            format!("<figure>{nl}{}{nl}</figure>", content.trim())
        })
        .into_owned()
}

/// `<img src="./<media>/4.png" alt="4" />` + line break → `4. `.
///
/// The number in the file name must equal the alt text; attributes may
/// appear in either order. Images inside `<figure>` blocks are left alone.
pub fn numbered_images_to_text(input: &str, media_folder: &str) -> String {
    let s = replace_outside_figures(&RE_NUMBERED_IMG_SRC_FIRST, input, media_folder);
    replace_outside_figures(&RE_NUMBERED_IMG_ALT_FIRST, &s, media_folder)
}

fn replace_outside_figures(re: &Regex, input: &str, media_folder: &str) -> String {
    let figures: Vec<Range<usize>> = RE_HTML_FIGURE
        .find_iter(input)
        .map(|m| m.range())
        .collect();
    re.replace_all(input, |caps: &Captures<'_>| {
        let start = caps.get(0).map_or(0, |m| m.start());
        if figures.iter().any(|r| r.contains(&start)) {
            caps[0].to_string()
        } else {
            numbered_replacement(caps, media_folder)
        }
    })
    .into_owned()
}

fn numbered_replacement(caps: &Captures<'_>, media_folder: &str) -> String {
    if caps["folder"].eq_ignore_ascii_case(media_folder) && caps["src"] == caps["alt"] {
        format!("{}. ", &caps["alt"])
    } else {
        caps[0].to_string()
    }
}
