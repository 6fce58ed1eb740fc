//! HTML tables → Markdown through the external converter.
//!
//! Every `<table>…</table>` block is converted on its own, in document
//! order. A table the converter cannot handle keeps its original HTML so a
//! missing or broken `pandoc` degrades the output instead of aborting.

use crate::config::TidyConfig;
use crate::output::{TableFailure, TidyStats};
use crate::pipeline::snippet::SnippetConverter;
use crate::progress::TidyProgressCallback;
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use tracing::{debug, warn};

static RE_HTML_TABLE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<table\b[^>]*>.*?</table>").unwrap());

static RE_PARAGRAPH_WRAPPER: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)<p>(.*?)</p>").unwrap());

// Pandoc attribute block at the end of a line, e.g. `Table 1-1 {#tbl-1}`.
static RE_TRAILING_ATTRIBUTES: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)\s*\{#[A-Za-z0-9_.-]+\}\s*$").unwrap());

/// The table stage bound to a config, converter and optional callback.
pub struct TableStage<'a> {
    converter: &'a dyn SnippetConverter,
    from_format: &'a str,
    to_format: &'a str,
    enabled: bool,
    progress: Option<&'a dyn TidyProgressCallback>,
}

impl<'a> TableStage<'a> {
    pub fn new(config: &'a TidyConfig, converter: &'a dyn SnippetConverter) -> Self {
        Self {
            converter,
            from_format: &config.from_format,
            to_format: &config.to_format,
            enabled: config.convert_tables,
            progress: None,
        }
    }

    pub fn with_progress(mut self, progress: Option<&'a dyn TidyProgressCallback>) -> Self {
        self.progress = progress;
        self
    }

    /// Replace every HTML table in `input`, recording counts in `stats`.
    pub fn run(&self, input: &str, stats: &mut TidyStats) -> String {
        let mut index = 0usize;
        RE_HTML_TABLE
            .replace_all(input, |caps: &Captures<'_>| {
                index += 1;
                stats.tables_found += 1;
                let original = &caps[0];

                if !self.enabled {
                    debug!("Table {} left as HTML: table conversion disabled", index);
                    return original.to_string();
                }

                if let Some(cb) = self.progress {
                    cb.on_table_start(index);
                }

                let snippet = strip_paragraph_wrappers(original);
                match self
                    .converter
                    .convert(&snippet, self.from_format, self.to_format)
                {
                    Ok(converted) => {
                        let markdown = clean_converted_table(&converted);
                        debug!(
                            "Table {} converted: {} bytes HTML -> {} bytes {}",
                            index,
                            original.len(),
                            markdown.len(),
                            self.to_format
                        );
                        stats.tables_converted += 1;
                        if let Some(cb) = self.progress {
                            cb.on_table_converted(index, original, &markdown);
                        }
                        markdown
                    }
                    Err(e) => {
                        warn!("Table {} left as HTML ({}): {}", index, e.kind(), e);
                        if let Some(cb) = self.progress {
                            cb.on_table_failed(index, original, &e);
                        }
                        stats.tables_failed += 1;
                        stats.table_failures.push(TableFailure { index, error: e });
                        original.to_string()
                    }
                }
            })
            .into_owned()
    }
}

/// `<p>text</p>` → `text` inside a table snippet.
pub fn strip_paragraph_wrappers(snippet: &str) -> String {
    RE_PARAGRAPH_WRAPPER.replace_all(snippet, "${1}").into_owned()
}

/// Trim converter output and drop `{#id}` blocks at line ends.
pub fn clean_converted_table(converted: &str) -> String {
    RE_TRAILING_ATTRIBUTES
        .replace_all(converted.trim(), "")
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SnippetError;
    use std::cell::RefCell;

    const TABLE: &str = "<table class=\"t\">\n<tr><td><p>a</p></td><td>b</td></tr>\n</table>";

    fn run_with(
        converter: &dyn SnippetConverter,
        config: &TidyConfig,
        input: &str,
    ) -> (String, TidyStats) {
        let mut stats = TidyStats::default();
        let out = TableStage::new(config, converter).run(input, &mut stats);
        (out, stats)
    }

    #[test]
    fn converted_table_replaces_html() {
        let seen = RefCell::new(Vec::new());
        let converter = |html: &str, from: &str, to: &str| -> Result<String, SnippetError> {
            seen.borrow_mut().push((html.to_string(), from.to_string(), to.to_string()));
            Ok("\n| a | b |\n|---|---|\n\n".to_string())
        };
        let config = TidyConfig::default();
        let input = format!("Before\n\n{TABLE}\n\nAfter");
        let (out, stats) = run_with(&converter, &config, &input);

        assert_eq!(out, "Before\n\n| a | b |\n|---|---|\n\nAfter");
        assert_eq!(stats.tables_found, 1);
        assert_eq!(stats.tables_converted, 1);

        let calls = seen.borrow();
        assert_eq!(calls.len(), 1);
        assert!(!calls[0].0.contains("<p>"), "paragraph wrappers stripped");
        assert!(calls[0].0.contains("<td>a</td>"));
        assert_eq!(calls[0].1, "html");
        assert_eq!(calls[0].2, "gfm");
    }

    #[test]
    fn failed_table_is_verbatim() {
        let converter = |_: &str, _: &str, _: &str| -> Result<String, SnippetError> {
            Err(SnippetError::NonZeroExit {
                program: "pandoc".into(),
                code: 2,
                to_format: "gfm".into(),
                stderr: "boom".into(),
            })
        };
        let config = TidyConfig::default();
        let input = format!("x\n{TABLE}\ny");
        let (out, stats) = run_with(&converter, &config, &input);
        assert_eq!(out, input);
        assert_eq!(stats.tables_failed, 1);
        assert_eq!(stats.table_failures[0].index, 1);
        assert_eq!(stats.table_failures[0].error.kind(), "non-zero-exit");
    }

    #[test]
    fn tables_processed_in_order() {
        let count = RefCell::new(0);
        let converter = |_: &str, _: &str, _: &str| -> Result<String, SnippetError> {
            *count.borrow_mut() += 1;
            Ok(format!("| table {} |", count.borrow()))
        };
        let config = TidyConfig::default();
        let input = "<TABLE><tr><td>1</td></tr></TABLE>\n\n<table>\n<tr><td>2</td></tr></table>";
        let (out, stats) = run_with(&converter, &config, input);
        assert_eq!(out, "| table 1 |\n\n| table 2 |");
        assert_eq!(stats.tables_found, 2);
    }

    #[test]
    fn disabled_conversion_leaves_tables() {
        let converter = |_: &str, _: &str, _: &str| -> Result<String, SnippetError> {
            panic!("converter must not run when tables are disabled")
        };
        let config = TidyConfig::builder().convert_tables(false).build().unwrap();
        let (out, stats) = run_with(&converter, &config, TABLE);
        assert_eq!(out, TABLE);
        assert_eq!(stats.tables_found, 1);
        assert_eq!(stats.tables_converted, 0);
    }

    #[test]
    fn no_tables_no_calls() {
        let converter = |_: &str, _: &str, _: &str| -> Result<String, SnippetError> {
            panic!("no tables, no conversion")
        };
        let config = TidyConfig::default();
        let (out, stats) = run_with(&converter, &config, "plain <tab> text");
        assert_eq!(out, "plain <tab> text");
        assert_eq!(stats.tables_found, 0);
    }

    #[test]
    fn trailing_attribute_blocks_removed() {
        let converted = "  | a |\n|---|\n\n: Table 1 {#tbl-1.a}  \n";
        assert_eq!(clean_converted_table(converted), "| a |\n|---|\n\n: Table 1");
    }

    #[test]
    fn attribute_block_mid_line_kept() {
        assert_eq!(
            clean_converted_table("| {#x} | b |"),
            "| {#x} | b |"
        );
    }

    #[test]
    fn paragraph_wrappers_span_lines() {
        assert_eq!(
            strip_paragraph_wrappers("<td><p>one\ntwo</p><p>three</p></td>"),
            "<td>one\ntwothree</td>"
        );
    }
}
