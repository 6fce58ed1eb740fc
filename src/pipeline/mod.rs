//! Rewrite stages for HTML-derived Markdown.
//!
//! Each submodule holds pure `&str → String` rewrites for one family of
//! artefacts. [`Pipeline`] applies them in the fixed order given by
//! [`Stage::ALL`]; no stage keeps state between runs.
//!
//! ## Data Flow
//!
//! ```text
//! quotes ─▶ footnote defs ─▶ admonitions ─▶ header levels ─▶ spans
//!   ─▶ sup footnotes ─▶ figure captions ─▶ html figures ─▶ internal links
//!   ─▶ blockquote headers ─▶ numbered images ─▶ tables ─▶ reference tags
//! ```
//!
//! ## Ordering constraints
//!
//! - Admonitions run before header levels so `###### Note` becomes
//!   `[!Note]` instead of being read as a figure caption later.
//! - Header levels run before figure captions: a `##### Figure 1-1` caption
//!   is demoted to level 6, which is what the caption composer looks for.
//! - Spans are stripped before superscript footnotes and tables, both of
//!   which may contain index-term spans.
//! - Figure captions run before HTML figures. Composed figures are already
//!   in the normaliser's canonical shape, so the normaliser leaves them
//!   untouched.
//! - Numbered images run after figure captions and skip `<figure>` blocks,
//!   so a composed figure of `1.png` keeps its `<img>`.
//! - Tables run before reference tags so `{#id}` blocks emitted by the
//!   converter are removed.
//!
//! 1. [`typography`] — smart quotes to ASCII
//! 2. [`footnotes`]  — `^([1](#a))` and `<sup>[1](#a)</sup>` definitions
//! 3. [`headers`]    — admonitions, level demotion, blockquote headers
//! 4. [`markup`]     — stray spans, intra-document links, `{#id}` tags
//! 5. [`figures`]    — figure composition/normalisation, numbered bullets
//! 6. [`tables`]     — HTML tables through the external converter
//! 7. [`snippet`]    — the external converter seam itself

pub mod figures;
pub mod footnotes;
pub mod headers;
pub mod markup;
pub mod snippet;
pub mod tables;
pub mod typography;

use crate::config::TidyConfig;
use crate::output::{TidyOutput, TidyStats};
use crate::progress::TidyProgressCallback;
use serde::{Deserialize, Serialize};
use snippet::SnippetConverter;
use std::fmt;
use std::time::Instant;
use tracing::{debug, info};

/// One rewrite pass of the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    SmartQuotes,
    FootnoteDefinitions,
    Admonitions,
    HeaderLevels,
    Spans,
    SuperscriptFootnotes,
    FigureCaptions,
    HtmlFigures,
    InternalLinks,
    BlockquoteHeaders,
    NumberedImages,
    Tables,
    ReferenceTags,
}

impl Stage {
    /// Every stage, in the order the pipeline applies them.
    pub const ALL: [Stage; 13] = [
        Stage::SmartQuotes,
        Stage::FootnoteDefinitions,
        Stage::Admonitions,
        Stage::HeaderLevels,
        Stage::Spans,
        Stage::SuperscriptFootnotes,
        Stage::FigureCaptions,
        Stage::HtmlFigures,
        Stage::InternalLinks,
        Stage::BlockquoteHeaders,
        Stage::NumberedImages,
        Stage::Tables,
        Stage::ReferenceTags,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Stage::SmartQuotes => "smart_quotes",
            Stage::FootnoteDefinitions => "footnote_definitions",
            Stage::Admonitions => "admonitions",
            Stage::HeaderLevels => "header_levels",
            Stage::Spans => "spans",
            Stage::SuperscriptFootnotes => "superscript_footnotes",
            Stage::FigureCaptions => "figure_captions",
            Stage::HtmlFigures => "html_figures",
            Stage::InternalLinks => "internal_links",
            Stage::BlockquoteHeaders => "blockquote_headers",
            Stage::NumberedImages => "numbered_images",
            Stage::Tables => "tables",
            Stage::ReferenceTags => "reference_tags",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The ordered stage list bound to a config and a snippet converter.
pub struct Pipeline<'a> {
    config: &'a TidyConfig,
    converter: &'a dyn SnippetConverter,
}

impl<'a> Pipeline<'a> {
    pub fn new(config: &'a TidyConfig, converter: &'a dyn SnippetConverter) -> Self {
        Self { config, converter }
    }

    /// Run every stage over `input` and report what changed.
    pub fn run(&self, input: &str) -> TidyOutput {
        let start = Instant::now();
        let progress = self.config.progress_callback.as_deref();
        let mut stats = TidyStats::default();

        if let Some(cb) = progress {
            cb.on_run_start(input.len());
        }

        let mut doc = input.to_string();
        for stage in Stage::ALL {
            let next = self.apply(stage, &doc, &mut stats, progress);
            let changed = next != doc;
            if changed {
                debug!("Stage {} changed the document", stage);
                stats.stages_changed.push(stage);
            }
            if let Some(cb) = progress {
                cb.on_stage_complete(stage, changed);
            }
            doc = next;
        }

        stats.duration_ms = start.elapsed().as_millis() as u64;
        info!(
            "Tidy complete: {} of {} stages changed the document, {}/{} tables converted, {}ms",
            stats.stages_changed.len(),
            Stage::ALL.len(),
            stats.tables_converted,
            stats.tables_found,
            stats.duration_ms
        );

        if let Some(cb) = progress {
            cb.on_run_complete(&stats);
        }

        TidyOutput {
            changed: doc != input,
            markdown: doc,
            stats,
        }
    }

    /// Apply a single stage.
    pub fn apply(
        &self,
        stage: Stage,
        doc: &str,
        stats: &mut TidyStats,
        progress: Option<&dyn TidyProgressCallback>,
    ) -> String {
        let media = self.config.media_folder.as_str();
        match stage {
            Stage::SmartQuotes => typography::convert_smart_quotes(doc),
            Stage::FootnoteDefinitions => footnotes::fix_footnote_definitions(doc),
            Stage::Admonitions => headers::convert_admonitions(doc),
            Stage::HeaderLevels => headers::adjust_headers(doc),
            Stage::Spans => markup::remove_unwanted_spans(doc),
            Stage::SuperscriptFootnotes => footnotes::convert_superscript_footnotes(doc),
            Stage::FigureCaptions => figures::compose_figures(doc, media),
            Stage::HtmlFigures => figures::normalise_figures(doc),
            Stage::InternalLinks => markup::flatten_internal_links(doc),
            Stage::BlockquoteHeaders => headers::normalise_blockquote_headers(doc),
            Stage::NumberedImages => figures::numbered_images_to_text(doc, media),
            Stage::Tables => tables::TableStage::new(self.config, self.converter)
                .with_progress(progress)
                .run(doc, stats),
            Stage::ReferenceTags => markup::remove_reference_tags(doc),
        }
    }
}
