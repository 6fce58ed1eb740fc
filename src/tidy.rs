//! Document-level entry points.
//!
//! [`tidy_markdown`] runs the pipeline over a string. The `tidy_file*`
//! functions add the storage side: read a UTF-8 file, run the pipeline,
//! and (for the in-place variants) write the result back only when it
//! differs from what was read.

use crate::config::TidyConfig;
use crate::error::TidyError;
use crate::output::TidyOutput;
use crate::pipeline::snippet::{PandocConverter, SnippetConverter};
use crate::pipeline::Pipeline;
use std::ffi::OsString;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Tidy a Markdown string, converting tables with the configured `pandoc`.
///
/// Never fails: table conversion errors are recorded in
/// [`crate::output::TidyStats::table_failures`] and the HTML is kept.
pub fn tidy_markdown(input: &str, config: &TidyConfig) -> TidyOutput {
    let converter = PandocConverter::from_config(config);
    tidy_markdown_with(input, config, &converter)
}

/// Like [`tidy_markdown`] but with a caller-supplied snippet converter.
pub fn tidy_markdown_with(
    input: &str,
    config: &TidyConfig,
    converter: &dyn SnippetConverter,
) -> TidyOutput {
    Pipeline::new(config, converter).run(input)
}

/// Read and tidy a file without writing anything back.
pub fn tidy_file(path: impl AsRef<Path>, config: &TidyConfig) -> Result<TidyOutput, TidyError> {
    let converter = PandocConverter::from_config(config);
    tidy_file_with(path, config, &converter)
}

/// Like [`tidy_file`] but with a caller-supplied snippet converter.
pub fn tidy_file_with(
    path: impl AsRef<Path>,
    config: &TidyConfig,
    converter: &dyn SnippetConverter,
) -> Result<TidyOutput, TidyError> {
    let path = path.as_ref();
    let content = read_document(path)?;
    info!("Tidying {} ({} bytes)", path.display(), content.len());
    Ok(tidy_markdown_with(&content, config, converter))
}

/// Tidy a file and overwrite it when the content changed.
///
/// Uses atomic write (temp file + rename) to prevent partial files.
pub fn tidy_file_in_place(
    path: impl AsRef<Path>,
    config: &TidyConfig,
) -> Result<TidyOutput, TidyError> {
    let converter = PandocConverter::from_config(config);
    tidy_file_in_place_with(path, config, &converter)
}

/// Like [`tidy_file_in_place`] but with a caller-supplied snippet converter.
pub fn tidy_file_in_place_with(
    path: impl AsRef<Path>,
    config: &TidyConfig,
    converter: &dyn SnippetConverter,
) -> Result<TidyOutput, TidyError> {
    let path = path.as_ref();
    let output = tidy_file_with(path, config, converter)?;
    if output.changed {
        write_atomic(path, &output.markdown)?;
        info!("Updated {}", path.display());
    } else {
        debug!("No changes for {}; file left untouched", path.display());
    }
    Ok(output)
}

/// Read a UTF-8 document, mapping failures to [`TidyError`].
pub fn read_document(path: &Path) -> Result<String, TidyError> {
    if !path.exists() {
        return Err(TidyError::FileNotFound {
            path: path.to_path_buf(),
        });
    }

    let bytes = std::fs::read(path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => TidyError::FileNotFound {
            path: path.to_path_buf(),
        },
        ErrorKind::PermissionDenied => TidyError::PermissionDenied {
            path: path.to_path_buf(),
        },
        _ => TidyError::ReadFailed {
            path: path.to_path_buf(),
            source: e,
        },
    })?;

    String::from_utf8(bytes).map_err(|e| TidyError::InvalidUtf8 {
        path: path.to_path_buf(),
        offset: e.utf8_error().valid_up_to(),
    })
}

/// Write `contents` to `path` via a sibling temp file, keeping the
/// original file's permissions.
fn write_atomic(path: &Path, contents: &str) -> Result<(), TidyError> {
    let write_err = |source| TidyError::OutputWriteFailed {
        path: path.to_path_buf(),
        source,
    };

    let tmp_path = temp_sibling(path);
    std::fs::write(&tmp_path, contents).map_err(write_err)?;

    if let Ok(meta) = std::fs::metadata(path) {
        if let Err(e) = std::fs::set_permissions(&tmp_path, meta.permissions()) {
            let _ = std::fs::remove_file(&tmp_path);
            return Err(write_err(e));
        }
    }

    if let Err(e) = std::fs::rename(&tmp_path, path) {
        let _ = std::fs::remove_file(&tmp_path);
        return Err(write_err(e));
    }
    Ok(())
}

/// `dir/ch01.md` → `dir/ch01.md.mdtidy.tmp`.
fn temp_sibling(path: &Path) -> PathBuf {
    let mut name: OsString = path.file_name().map(OsString::from).unwrap_or_default();
    name.push(".mdtidy.tmp");
    path.with_file_name(name)
}
