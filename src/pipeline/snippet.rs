//! The external snippet converter.
//!
//! [`SnippetConverter`] is the seam between the table stage and whatever
//! turns an HTML fragment into Markdown. [`PandocConverter`] shells out to
//! `pandoc`; tests and library callers can pass any closure with the same
//! signature instead.
//!
//! Failures come back as a typed [`SnippetError`] so the caller can fall
//! back (keep the HTML) without looking at error text.

use crate::config::TidyConfig;
use crate::error::SnippetError;
use once_cell::unsync::OnceCell;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use tracing::{debug, warn};

/// Bytes of converter stderr kept in [`SnippetError::NonZeroExit`].
const STDERR_EXCERPT_LEN: usize = 500;

/// Converts an HTML (or other) snippet into another markup format.
pub trait SnippetConverter {
    /// Convert `snippet` from `from_format` to `to_format`.
    fn convert(&self, snippet: &str, from_format: &str, to_format: &str)
        -> Result<String, SnippetError>;
}

impl<F> SnippetConverter for F
where
    F: Fn(&str, &str, &str) -> Result<String, SnippetError>,
{
    fn convert(
        &self,
        snippet: &str,
        from_format: &str,
        to_format: &str,
    ) -> Result<String, SnippetError> {
        self(snippet, from_format, to_format)
    }
}

/// Runs `pandoc --from <fmt> --to <fmt> [--lua-filter <path>]` with the
/// snippet on stdin.
///
/// No timeout is applied: a hanging converter blocks the run.
#[derive(Debug)]
pub struct PandocConverter {
    program: PathBuf,
    lua_filter: Option<PathBuf>,
    // Existence of the filter is checked on first use, so a missing filter
    // is reported once per converter and only if a table is converted.
    active_filter: OnceCell<Option<PathBuf>>,
}

impl PandocConverter {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            lua_filter: None,
            active_filter: OnceCell::new(),
        }
    }

    pub fn with_lua_filter(mut self, path: impl Into<PathBuf>) -> Self {
        self.lua_filter = Some(path.into());
        self.active_filter = OnceCell::new();
        self
    }

    /// Build the converter described by `config`.
    pub fn from_config(config: &TidyConfig) -> Self {
        let converter = Self::new(&config.pandoc_program);
        match &config.lua_filter {
            Some(path) => converter.with_lua_filter(path),
            None => converter,
        }
    }

    fn program_name(&self) -> String {
        self.program.display().to_string()
    }

    /// The Lua filter to pass, if one is configured and present on disk.
    fn active_filter(&self) -> Option<&Path> {
        self.active_filter
            .get_or_init(|| match &self.lua_filter {
                Some(path) if path.is_file() => Some(path.clone()),
                Some(path) => {
                    warn!(
                        "Table flattener Lua filter not found at {}. Lists inside tables might not be flattened as intended.",
                        path.display()
                    );
                    None
                }
                None => None,
            })
            .as_deref()
    }
}

impl SnippetConverter for PandocConverter {
    fn convert(
        &self,
        snippet: &str,
        from_format: &str,
        to_format: &str,
    ) -> Result<String, SnippetError> {
        let program = self.program_name();
        let mut cmd = Command::new(&self.program);
        cmd.args(["--from", from_format, "--to", to_format]);
        if let Some(filter) = self.active_filter() {
            cmd.arg("--lua-filter").arg(filter);
        }
        cmd.stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        debug!("Running {:?}", cmd);

        let mut child = cmd.spawn().map_err(|e| {
            if e.kind() == ErrorKind::NotFound {
                SnippetError::ToolMissing {
                    program: program.clone(),
                }
            } else {
                SnippetError::Io {
                    program: program.clone(),
                    detail: format!("failed to spawn: {e}"),
                }
            }
        })?;

        // Dropping stdin after the write closes the pipe so the converter
        // sees EOF. A broken pipe means the converter already exited; its
        // exit status below is the more useful error.
        if let Some(mut stdin) = child.stdin.take() {
            if let Err(e) = stdin.write_all(snippet.as_bytes()) {
                if e.kind() != ErrorKind::BrokenPipe {
                    let _ = child.kill();
                    let _ = child.wait();
                    return Err(SnippetError::Io {
                        program,
                        detail: format!("failed to write stdin: {e}"),
                    });
                }
            }
        }

        let output = child.wait_with_output().map_err(|e| SnippetError::Io {
            program: program.clone(),
            detail: format!("failed to wait: {e}"),
        })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(SnippetError::NonZeroExit {
                program,
                code: output.status.code().unwrap_or(-1),
                to_format: to_format.to_string(),
                stderr: excerpt(&stderr, STDERR_EXCERPT_LEN),
            });
        }

        String::from_utf8(output.stdout).map_err(|e| SnippetError::Io {
            program,
            detail: format!("output is not valid UTF-8: {e}"),
        })
    }
}

/// At most `max` bytes of `s`, cut on a char boundary, with `...` appended
/// when shortened.
fn excerpt(s: &str, max: usize) -> String {
    if s.len() <= max {
        return s.to_string();
    }
    let mut end = max;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &s[..end])
}
