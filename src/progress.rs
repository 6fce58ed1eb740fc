//! Progress-callback trait for pipeline and per-table events.
//!
//! Inject an [`Arc<dyn TidyProgressCallback>`] via
//! [`crate::config::TidyConfigBuilder::progress_callback`] to receive events
//! as the pipeline runs each stage and converts each HTML table.
//!
//! # Why callbacks instead of printing?
//!
//! Table conversion used to dump every original/converted pair to stdout.
//! Routing that through a callback lets the host decide: the CLI prints the
//! pairs only with `--show-tables` and otherwise drives a spinner, while
//! library callers can collect them or ignore them entirely.
//!
//! # Example
//!
//! ```rust
//! use edgequake_mdtidy::{TidyConfig, TidyProgressCallback};
//! use std::sync::{Arc, atomic::{AtomicUsize, Ordering}};
//!
//! struct CountingCallback {
//!     tables: AtomicUsize,
//! }
//!
//! impl TidyProgressCallback for CountingCallback {
//!     fn on_table_converted(&self, index: usize, _original: &str, converted: &str) {
//!         self.tables.fetch_add(1, Ordering::SeqCst);
//!         eprintln!("table {} -> {} bytes", index, converted.len());
//!     }
//! }
//!
//! let counter = Arc::new(CountingCallback { tables: AtomicUsize::new(0) });
//!
//! let config = TidyConfig::builder()
//!     .progress_callback(counter as Arc<dyn TidyProgressCallback>)
//!     .build()
//!     .unwrap();
//! ```

use crate::error::SnippetError;
use crate::output::TidyStats;
use crate::pipeline::Stage;
use std::sync::Arc;

/// Called by the pipeline as it processes a document.
///
/// All methods have default no-op implementations so callers only override
/// what they care about. The pipeline is single-threaded, but the trait is
/// `Send + Sync` so a config carrying a callback can be shared freely.
pub trait TidyProgressCallback: Send + Sync {
    /// Called once before the first stage runs.
    ///
    /// # Arguments
    /// * `input_len` — byte length of the input document
    fn on_run_start(&self, input_len: usize) {
        let _ = input_len;
    }

    /// Called after each stage.
    ///
    /// # Arguments
    /// * `stage`   — the stage that just ran
    /// * `changed` — whether the stage altered the document
    fn on_stage_complete(&self, stage: Stage, changed: bool) {
        let _ = (stage, changed);
    }

    /// Called just before an HTML table is handed to the converter.
    ///
    /// # Arguments
    /// * `index` — 1-indexed position of the table in the document
    fn on_table_start(&self, index: usize) {
        let _ = index;
    }

    /// Called when a table converted successfully.
    ///
    /// # Arguments
    /// * `index`     — 1-indexed table position
    /// * `original`  — the HTML block as found in the document
    /// * `converted` — the Markdown that replaces it
    fn on_table_converted(&self, index: usize, original: &str, converted: &str) {
        let _ = (index, original, converted);
    }

    /// Called when a table could not be converted; its HTML is kept.
    fn on_table_failed(&self, index: usize, original: &str, error: &SnippetError) {
        let _ = (index, original, error);
    }

    /// Called once after the last stage.
    fn on_run_complete(&self, stats: &TidyStats) {
        let _ = stats;
    }
}

/// A no-op implementation for callers that don't need progress events.
///
/// This is the default when no callback is configured.
pub struct NoopProgressCallback;

impl TidyProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::TidyConfig`].
pub type ProgressCallback = Arc<dyn TidyProgressCallback>;
