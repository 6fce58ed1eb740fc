//! Result types returned by a tidy run.

use crate::error::SnippetError;
use crate::pipeline::Stage;
use serde::{Deserialize, Serialize};

/// The rewritten document plus what happened to it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TidyOutput {
    /// The document after every stage has run.
    pub markdown: String,
    /// `true` when `markdown` differs from the input.
    pub changed: bool,
    pub stats: TidyStats,
}

/// Counters collected while the pipeline runs.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TidyStats {
    /// Stages that altered the document, in pipeline order.
    pub stages_changed: Vec<Stage>,
    /// HTML `<table>` blocks seen by the table stage.
    pub tables_found: usize,
    /// Tables replaced by converter output.
    pub tables_converted: usize,
    /// Tables left as HTML because the converter failed.
    pub tables_failed: usize,
    pub table_failures: Vec<TableFailure>,
    /// Wall-clock time of the whole run.
    pub duration_ms: u64,
}

/// A table that kept its HTML because conversion failed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableFailure {
    /// 1-indexed position of the table in the document.
    pub index: usize,
    pub error: SnippetError,
}
