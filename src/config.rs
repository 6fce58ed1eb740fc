//! Configuration types for Markdown tidying.
//!
//! All pipeline behaviour is controlled through [`TidyConfig`], built via
//! its [`TidyConfigBuilder`]. Everything that used to be ambient state
//! (the media folder, the converter program, the location of the Lua
//! table-flattening filter) is an explicit field here, resolved once by
//! the caller and threaded into the stages that need it.

use crate::error::TidyError;
use crate::progress::ProgressCallback;
use std::fmt;
use std::path::{Path, PathBuf};

/// Default media folder name used to match image paths.
pub const DEFAULT_MEDIA_FOLDER: &str = "assets";

/// Default external converter program.
pub const DEFAULT_PANDOC: &str = "pandoc";

/// File name of the table-flattening Lua filter shipped next to the binary.
pub const LUA_FILTER_FILE_NAME: &str = "table_flattener.lua";

/// Configuration for a tidy run.
///
/// Built via [`TidyConfig::builder()`] or using [`TidyConfig::default()`].
///
/// # Example
/// ```rust
/// use edgequake_mdtidy::TidyConfig;
///
/// let config = TidyConfig::builder()
///     .media_folder("images")
///     .pandoc_program("/usr/local/bin/pandoc")
///     .build()
///     .unwrap();
/// assert_eq!(config.media_folder, "images");
/// ```
#[derive(Clone)]
pub struct TidyConfig {
    /// Folder name that image paths are matched against. Default: `assets`.
    ///
    /// Used by the figure-caption composer (`![alt](./assets/x.png)`) and the
    /// numbered-image converter (`<img src="./assets/3.png" alt="3">`).
    pub media_folder: String,

    /// Converter program used for HTML table snippets. Default: `pandoc`.
    ///
    /// Looked up on `PATH` when it is a bare name.
    pub pandoc_program: PathBuf,

    /// Lua filter that flattens lists inside table cells.
    ///
    /// Passed to the converter only when the file exists; otherwise tables
    /// are converted without it and a warning is logged. `None` disables the
    /// filter silently.
    pub lua_filter: Option<PathBuf>,

    /// Source format handed to the converter. Default: `html`.
    pub from_format: String,

    /// Target format requested from the converter. Default: `gfm`.
    pub to_format: String,

    /// When `false`, HTML tables are counted but left untouched and the
    /// converter is never invoked. Default: `true`.
    pub convert_tables: bool,

    /// Optional progress callback for stage and table events.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for TidyConfig {
    fn default() -> Self {
        Self {
            media_folder: DEFAULT_MEDIA_FOLDER.to_string(),
            pandoc_program: PathBuf::from(DEFAULT_PANDOC),
            lua_filter: None,
            from_format: "html".to_string(),
            to_format: "gfm".to_string(),
            convert_tables: true,
            progress_callback: None,
        }
    }
}

impl fmt::Debug for TidyConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TidyConfig")
            .field("media_folder", &self.media_folder)
            .field("pandoc_program", &self.pandoc_program)
            .field("lua_filter", &self.lua_filter)
            .field("from_format", &self.from_format)
            .field("to_format", &self.to_format)
            .field("convert_tables", &self.convert_tables)
            .field(
                "progress_callback",
                &self
                    .progress_callback
                    .as_ref()
                    .map(|_| "<dyn TidyProgressCallback>"),
            )
            .finish()
    }
}

impl TidyConfig {
    /// Start building a config from the defaults.
    pub fn builder() -> TidyConfigBuilder {
        TidyConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`TidyConfig`].
#[derive(Debug)]
pub struct TidyConfigBuilder {
    config: TidyConfig,
}

impl TidyConfigBuilder {
    pub fn media_folder(mut self, name: impl Into<String>) -> Self {
        self.config.media_folder = name.into();
        self
    }

    pub fn pandoc_program(mut self, program: impl Into<PathBuf>) -> Self {
        self.config.pandoc_program = program.into();
        self
    }

    pub fn lua_filter(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.lua_filter = Some(path.into());
        self
    }

    pub fn no_lua_filter(mut self) -> Self {
        self.config.lua_filter = None;
        self
    }

    pub fn from_format(mut self, fmt: impl Into<String>) -> Self {
        self.config.from_format = fmt.into();
        self
    }

    pub fn to_format(mut self, fmt: impl Into<String>) -> Self {
        self.config.to_format = fmt.into();
        self
    }

    pub fn convert_tables(mut self, v: bool) -> Self {
        self.config.convert_tables = v;
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Validate and return the config.
    ///
    /// Surrounding whitespace is trimmed from the media folder name.
    pub fn build(mut self) -> Result<TidyConfig, TidyError> {
        self.config.media_folder = self.config.media_folder.trim().to_string();
        let c = &self.config;
        let media = c.media_folder.as_str();
        if media.is_empty() {
            return Err(TidyError::InvalidConfig(
                "Media folder name must not be empty".into(),
            ));
        }
        if media.contains('/') || media.contains('\\') {
            return Err(TidyError::InvalidConfig(format!(
                "Media folder must be a single folder name, got '{}'",
                c.media_folder
            )));
        }
        if c.pandoc_program.as_os_str().is_empty() {
            return Err(TidyError::InvalidConfig(
                "Converter program must not be empty".into(),
            ));
        }
        if c.from_format.trim().is_empty() || c.to_format.trim().is_empty() {
            return Err(TidyError::InvalidConfig(
                "Converter formats must not be empty".into(),
            ));
        }
        Ok(self.config)
    }
}

/// Location of the Lua filter that ships beside the running executable.
///
/// Resolved once at startup by the CLI; returns `None` if the executable
/// path cannot be determined.
pub fn default_lua_filter_path() -> Option<PathBuf> {
    let exe = std::env::current_exe().ok()?;
    lua_filter_beside(&exe)
}

fn lua_filter_beside(exe: &Path) -> Option<PathBuf> {
    exe.parent().map(|dir| dir.join(LUA_FILTER_FILE_NAME))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let c = TidyConfig::default();
        assert_eq!(c.media_folder, "assets");
        assert_eq!(c.pandoc_program, PathBuf::from("pandoc"));
        assert_eq!(c.to_format, "gfm");
        assert!(c.convert_tables);
        assert!(c.lua_filter.is_none());
    }

    #[test]
    fn builder_sets_fields() {
        let c = TidyConfig::builder()
            .media_folder("media")
            .lua_filter("/opt/filters/flatten.lua")
            .to_format("commonmark")
            .convert_tables(false)
            .build()
            .unwrap();
        assert_eq!(c.media_folder, "media");
        assert_eq!(
            c.lua_filter.as_deref(),
            Some(Path::new("/opt/filters/flatten.lua"))
        );
        assert_eq!(c.to_format, "commonmark");
        assert!(!c.convert_tables);
    }

    #[test]
    fn empty_media_folder_rejected() {
        let err = TidyConfig::builder().media_folder("  ").build().unwrap_err();
        assert!(matches!(err, TidyError::InvalidConfig(_)));
    }

    #[test]
    fn media_folder_is_trimmed() {
        let c = TidyConfig::builder().media_folder(" assets\t").build().unwrap();
        assert_eq!(c.media_folder, "assets");
    }

    #[test]
    fn nested_media_folder_rejected() {
        let err = TidyConfig::builder()
            .media_folder("book/assets")
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("single folder name"));
    }

    #[test]
    fn lua_filter_sits_next_to_exe() {
        let p = lua_filter_beside(Path::new("/usr/local/bin/mdtidy")).unwrap();
        assert_eq!(p, PathBuf::from("/usr/local/bin/table_flattener.lua"));
    }

    #[test]
    fn debug_hides_callback() {
        let c = TidyConfig::builder()
            .progress_callback(std::sync::Arc::new(crate::progress::NoopProgressCallback))
            .build()
            .unwrap();
        let dbg = format!("{c:?}");
        assert!(dbg.contains("<dyn TidyProgressCallback>"));
    }
}
