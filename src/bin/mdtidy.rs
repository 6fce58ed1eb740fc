//! CLI binary for edgequake-mdtidy.
//!
//! A thin shim over the library crate that maps CLI flags
//! to `TidyConfig` and prints results.

use anyhow::{Context, Result};
use clap::Parser;
use edgequake_mdtidy::{
    default_lua_filter_path, tidy_file, tidy_file_in_place, ProgressCallback, SnippetError, Stage,
    TidyConfig, TidyOutput, TidyProgressCallback, TidyStats,
};
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Terminal callback: a spinner while stages run and tables convert, plus
/// the optional original/converted table dump on stdout.
struct CliProgressCallback {
    /// `None` when the spinner is disabled.
    bar: Option<ProgressBar>,
    /// Print every table pair to stdout.
    show_tables: bool,
}

impl CliProgressCallback {
    fn new(show_spinner: bool, show_tables: bool) -> Arc<Self> {
        let bar = show_spinner.then(|| {
            let bar = ProgressBar::new_spinner();
            let style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner())
                .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);
            bar.set_style(style);
            bar.set_prefix("Tidying");
            bar
        });
        Arc::new(Self { bar, show_tables })
    }

    fn println(&self, line: String) {
        match &self.bar {
            Some(bar) => bar.println(line),
            None => eprintln!("{line}"),
        }
    }

    fn print_table(&self, label: &str, text: &str) {
        let dump = || {
            let stdout = io::stdout();
            let mut handle = stdout.lock();
            let _ = writeln!(handle, "{label}:\n{text}\n\n");
        };
        match &self.bar {
            Some(bar) => bar.suspend(dump),
            None => dump(),
        }
    }
}

impl TidyProgressCallback for CliProgressCallback {
    fn on_run_start(&self, _input_len: usize) {
        if let Some(bar) = &self.bar {
            bar.enable_steady_tick(Duration::from_millis(80));
        }
    }

    fn on_stage_complete(&self, stage: Stage, _changed: bool) {
        if let Some(bar) = &self.bar {
            bar.set_message(stage.to_string());
        }
    }

    fn on_table_start(&self, index: usize) {
        if let Some(bar) = &self.bar {
            bar.set_message(format!("table {index}"));
        }
    }

    fn on_table_converted(&self, _index: usize, original: &str, converted: &str) {
        if self.show_tables {
            self.print_table("Original table", original);
            self.print_table("Markdown table", converted);
        }
    }

    fn on_table_failed(&self, index: usize, original: &str, error: &SnippetError) {
        self.println(format!(
            "  {} Table {:>3}  kept as HTML  {}",
            red("✗"),
            index,
            dim(error.kind()),
        ));
        if self.show_tables {
            self.print_table("Original table", original);
        }
    }

    fn on_run_complete(&self, _stats: &TidyStats) {
        if let Some(bar) = &self.bar {
            bar.finish_and_clear();
        }
    }
}

const AFTER_HELP: &str = r##"EXAMPLES:
  # Tidy a chapter in place (media folder defaults to "assets")
  mdtidy book/ch01.md

  # Images live under ./images instead
  mdtidy book/ch01.md images

  # Preview the result without touching the file
  mdtidy --stdout book/ch01.md | less

  # Print every HTML table next to its Markdown conversion
  mdtidy --show-tables book/ch02.md

  # Machine-readable report
  mdtidy --json book/ch03.md > report.json

  # Skip table conversion entirely (no pandoc needed)
  mdtidy --no-tables book/ch04.md

WHAT GETS REWRITTEN (in order):
  smart quotes         “ ” ‘ ’  →  " '
  footnotes            ^([1](#fn1)) text / <sup>[1](#fn1)</sup> text  →  [^1]: text
  admonitions          ###### Note  →  [!Note]
  header levels        # → ##, … ##### → ######  (# Chapter N kept, # Chapter Goals → ###,
                       ##### Example 1-2. x → *Example 1-2. x*)
  spans                <span id="chN.html"></span> removed, index-term spans unwrapped
  figure captions      ![alt](./assets/x.png) + ###### caption  →  <figure>
  html figures         <figure …><h6 …>  →  <figure><figcaption …>
  internal links       <a href="#x">text</a>  →  text
  blockquote headers   > ## x  →  > ### x
  numbered images      <img src="./assets/3.png" alt="3">  →  3.
  tables               <table>…</table>  →  GFM via pandoc (HTML kept on failure)
  reference tags       {#id} removed

ENVIRONMENT VARIABLES:
  MDTIDY_MEDIA_FOLDER     Default media folder name
  MDTIDY_PANDOC           Converter program (default: pandoc)
  MDTIDY_LUA_FILTER       Table flattener Lua filter
  RUST_LOG                Override log filter (e.g. edgequake_mdtidy=debug)

SETUP:
  Install pandoc (https://pandoc.org/installing.html) for table conversion.
  Place table_flattener.lua next to the mdtidy binary, or pass --lua-filter.
"##;

/// Normalise HTML-derived Markdown in place.
#[derive(Parser, Debug)]
#[command(
    name = "mdtidy",
    version,
    about = "Normalise HTML-derived Markdown (footnotes, headers, figures, tables) in place",
    long_about = "Rewrite a Markdown file produced by an HTML-to-Markdown conversion into a \
cleaner dialect: GFM footnotes, demoted headers, HTML figures with captions, Markdown tables \
(via pandoc) and no leftover spans, anchors or {#id} tags. The file is only written when \
something changed.",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Markdown file to tidy in place.
    input: PathBuf,

    /// Media folder name used to match image paths.
    #[arg(env = "MDTIDY_MEDIA_FOLDER", default_value = "assets")]
    media_folder: String,

    /// Converter program used for HTML tables.
    #[arg(long, env = "MDTIDY_PANDOC", default_value = "pandoc")]
    pandoc: PathBuf,

    /// Lua filter that flattens lists inside table cells.
    /// Default: table_flattener.lua next to this executable.
    #[arg(long, env = "MDTIDY_LUA_FILTER")]
    lua_filter: Option<PathBuf>,

    /// Target format for converted tables.
    #[arg(long = "to", env = "MDTIDY_TABLE_FORMAT", default_value = "gfm")]
    to_format: String,

    /// Leave HTML tables untouched (pandoc is never run).
    #[arg(long)]
    no_tables: bool,

    /// Print the tidied Markdown to stdout instead of writing the file.
    #[arg(long)]
    stdout: bool,

    /// Print a JSON report (TidyOutput) to stdout.
    #[arg(long, conflicts_with = "show_tables")]
    json: bool,

    /// Print each original HTML table and its conversion to stdout.
    #[arg(long)]
    show_tables: bool,

    /// Disable the progress spinner.
    #[arg(long, env = "MDTIDY_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "MDTIDY_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "MDTIDY_QUIET")]
    quiet: bool,
}

/// JSON report printed with `--json`.
#[derive(Serialize)]
struct Report<'a> {
    path: &'a std::path::Path,
    written: bool,
    #[serde(flatten)]
    output: &'a TidyOutput,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    let show_progress = !cli.quiet && !cli.no_progress && !cli.json;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "error"
    } else if show_progress {
        "warn"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    // ── Build config ─────────────────────────────────────────────────────
    let progress_cb: Option<ProgressCallback> = if show_progress || cli.show_tables {
        let cb = CliProgressCallback::new(show_progress, cli.show_tables);
        Some(cb as Arc<dyn TidyProgressCallback>)
    } else {
        None
    };

    let config = build_config(&cli, progress_cb)?;

    // ── Run ──────────────────────────────────────────────────────────────
    let write_back = !cli.stdout;
    let output = if write_back {
        tidy_file_in_place(&cli.input, &config)
    } else {
        tidy_file(&cli.input, &config)
    }
    .with_context(|| format!("Failed to tidy {}", cli.input.display()))?;

    if cli.json {
        let report = Report {
            path: &cli.input,
            written: write_back && output.changed,
            output: &output,
        };
        let json = serde_json::to_string_pretty(&report).context("Failed to serialise report")?;
        println!("{json}");
    } else if cli.stdout {
        let stdout = io::stdout();
        let mut handle = stdout.lock();
        handle
            .write_all(output.markdown.as_bytes())
            .context("Failed to write to stdout")?;
    }

    if !cli.quiet && !cli.json {
        print_summary(&cli, &output, write_back);
    }

    Ok(())
}

/// Map CLI args to `TidyConfig`.
fn build_config(cli: &Cli, progress: Option<ProgressCallback>) -> Result<TidyConfig> {
    let mut builder = TidyConfig::builder()
        .media_folder(cli.media_folder.clone())
        .pandoc_program(cli.pandoc.clone())
        .to_format(cli.to_format.clone())
        .convert_tables(!cli.no_tables);

    // Resolved once here; the pipeline only ever sees the explicit path.
    if let Some(filter) = cli.lua_filter.clone().or_else(default_lua_filter_path) {
        builder = builder.lua_filter(filter);
    }

    if let Some(cb) = progress {
        builder = builder.progress_callback(cb);
    }

    builder.build().context("Invalid configuration")
}

fn print_summary(cli: &Cli, output: &TidyOutput, write_back: bool) {
    let stats = &output.stats;
    let action = match (output.changed, write_back) {
        (true, true) => "updated",
        (true, false) => "would change",
        (false, _) => "unchanged",
    };
    eprintln!(
        "{}  {}  {}  {}",
        if stats.tables_failed == 0 {
            green("✔")
        } else {
            red("⚠")
        },
        bold(&cli.input.display().to_string()),
        action,
        dim(&format!("{}ms", stats.duration_ms)),
    );
    if !stats.stages_changed.is_empty() {
        let names: Vec<&str> = stats.stages_changed.iter().map(|s| s.name()).collect();
        eprintln!("   stages: {}", dim(&names.join(", ")));
    }
    if stats.tables_found > 0 {
        eprintln!(
            "   tables: {} found  /  {} converted  /  {} kept as HTML",
            stats.tables_found,
            stats.tables_converted,
            stats.tables_found.saturating_sub(stats.tables_converted),
        );
    }
}
