//! Error types for the edgequake-mdtidy library.
//!
//! Two distinct error types reflect two distinct failure modes:
//!
//! * [`TidyError`] — **Fatal**: the document cannot be processed at all
//!   (missing input file, unreadable bytes, output write failure, bad
//!   configuration). Returned as `Err(TidyError)` from the file-level
//!   entry points in [`crate::tidy`].
//!
//! * [`SnippetError`] — **Non-fatal**: converting one HTML table through the
//!   external converter failed, but the rest of the document is fine. The
//!   table keeps its original HTML and the error is stored in
//!   [`crate::output::TidyStats::table_failures`].

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the edgequake-mdtidy library.
#[derive(Debug, Error)]
pub enum TidyError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// Input file was not found at the given path.
    #[error("Error: File not found {path:?}")]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading {path:?}\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    /// The file exists but could not be read.
    #[error("Error reading file {path:?}: {source}")]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file was read but is not valid UTF-8.
    #[error("Error reading file {path:?}: not valid UTF-8 (invalid byte at offset {offset})")]
    InvalidUtf8 { path: PathBuf, offset: usize },

    // ── Output errors ─────────────────────────────────────────────────────
    /// Could not write the rewritten Markdown back to disk.
    #[error("Error writing file {path:?}: {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// A non-fatal failure while converting a single HTML snippet.
///
/// The variants are structured so callers can pick a fallback without
/// inspecting error text.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum SnippetError {
    /// The converter program is not installed or not on `PATH`.
    #[error("{program} command not found. Cannot convert HTML snippet to Markdown.")]
    ToolMissing { program: String },

    /// The converter ran but exited unsuccessfully.
    #[error("{program} failed to convert snippet (code {code}). Target format: {to_format}\nStderr: {stderr}")]
    NonZeroExit {
        program: String,
        /// Exit code, or `-1` when the process was killed by a signal.
        code: i32,
        to_format: String,
        /// First 500 bytes of the converter's stderr.
        stderr: String,
    },

    /// Spawning, piping to, or reading from the converter failed.
    #[error("Error during {program} snippet conversion: {detail}")]
    Io { program: String, detail: String },
}

impl SnippetError {
    /// Short machine-friendly label, used in logs and JSON reports.
    pub fn kind(&self) -> &'static str {
        match self {
            SnippetError::ToolMissing { .. } => "tool-missing",
            SnippetError::NonZeroExit { .. } => "non-zero-exit",
            SnippetError::Io { .. } => "exception",
        }
    }
}
