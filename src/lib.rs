//! # edgequake-mdtidy
//!
//! Normalise HTML-derived Markdown into a cleaner Markdown dialect.
//!
//! ## Why this crate?
//!
//! Converting an HTML e-book to Markdown (for example with
//! `pandoc -f html -t gfm`) leaves a trail of artefacts: curly quotes,
//! `^([1](#fn1))` footnotes, index-term `<span>`s, `<figure>` blocks with
//! `<h6>` captions, raw HTML tables, `{#id}` tags. This crate rewrites them
//! with a fixed sequence of small, independent regex passes.
//!
//! ## Pipeline Overview
//!
//! ```text
//! Markdown
//!  │
//!  ├─ 1. Text     smart quotes, footnote definitions, admonitions
//!  ├─ 2. Headers  demote one level (chapter titles and examples excepted)
//!  ├─ 3. Markup   strip spans, unwrap intra-document links
//!  ├─ 4. Figures  compose image + caption, normalise <figure>, numbered bullets
//!  ├─ 5. Tables   HTML tables → GFM through pandoc (HTML kept on failure)
//!  └─ 6. Tags     remove leftover {#id} reference tags
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use edgequake_mdtidy::{tidy_markdown, TidyConfig};
//!
//! let config = TidyConfig::default();
//! let output = tidy_markdown("## Setup\n\u{201C}Quoted\u{201D}\n", &config);
//! assert_eq!(output.markdown, "### Setup\n\"Quoted\"\n");
//! assert!(output.changed);
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `mdtidy` binary (clap + anyhow + tracing-subscriber + indicatif) |
//!
//! Disable `cli` when using only the library:
//! ```toml
//! edgequake-mdtidy = { version = "0.1", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod progress;
pub mod tidy;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{default_lua_filter_path, TidyConfig, TidyConfigBuilder};
pub use error::{SnippetError, TidyError};
pub use output::{TableFailure, TidyOutput, TidyStats};
pub use pipeline::snippet::{PandocConverter, SnippetConverter};
pub use pipeline::{Pipeline, Stage};
pub use progress::{NoopProgressCallback, ProgressCallback, TidyProgressCallback};
pub use tidy::{
    read_document, tidy_file, tidy_file_in_place, tidy_file_in_place_with, tidy_file_with,
    tidy_markdown, tidy_markdown_with,
};
