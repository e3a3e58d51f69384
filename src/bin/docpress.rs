//! CLI binary for docpress.
//!
//! A thin shim over the library crate that maps CLI flags to `ReportConfig`,
//! prints the numbered stage lines, and reports the result.

use anyhow::{Context, Result};
use clap::Parser;
use docpress::{
    generate, generate_html, CoverPage, ProgressCallback, ReportConfig, ReportError,
    ReportOutput, ReportProgressCallback, Stage,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn yellow(s: &str) -> String {
    format!("\x1b[33m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}
fn cyan(s: &str) -> String {
    format!("\x1b[36m{s}\x1b[0m")
}

// ── CLI progress callback ────────────────────────────────────────────────────

/// Prints `[n/7] …` lines to stdout and shows a spinner while the browser
/// runs, since that stage can take tens of seconds with no other output.
struct CliProgressCallback {
    spinner: Mutex<Option<ProgressBar>>,
}

impl CliProgressCallback {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            spinner: Mutex::new(None),
        })
    }

    fn start_spinner(&self) {
        let bar = ProgressBar::new_spinner();
        bar.set_style(
            ProgressStyle::with_template("  {spinner:.cyan} {msg}  {elapsed:.dim}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner())
                .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]),
        );
        bar.set_message("waiting for browser…");
        bar.enable_steady_tick(Duration::from_millis(80));
        if let Ok(mut slot) = self.spinner.lock() {
            *slot = Some(bar);
        }
    }

    fn stop_spinner(&self) {
        if let Some(bar) = self.spinner.lock().ok().and_then(|mut s| s.take()) {
            bar.finish_and_clear();
        }
    }
}

impl ReportProgressCallback for CliProgressCallback {
    fn on_stage_start(&self, stage: Stage) {
        println!(
            "{} {}",
            cyan(&format!("[{}/{}]", stage.number(), Stage::COUNT)),
            stage.label()
        );
        if stage == Stage::RenderPdf {
            self.start_spinner();
        }
    }

    fn on_transform(&self, name: &str) {
        println!("  {} {}", dim("·"), dim(name));
    }

    fn on_stage_complete(&self, stage: Stage, summary: &str) {
        if stage == Stage::RenderPdf {
            self.stop_spinner();
        }
        println!("  {} {}", green("✓"), summary);
    }
}

impl Drop for CliProgressCallback {
    fn drop(&mut self) {
        self.stop_spinner();
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # PDF next to the source (docs/SYSTEM.pdf + docs/SYSTEM.html)
  docpress docs/SYSTEM.md

  # Explicit output and cover text
  docpress guide.md -o out/guide.pdf --org "ACME" --subtitle "Operations Guide" \
      --meta "Version=1.2" --meta "Updated=2026-10"

  # HTML only, no browser needed
  docpress guide.md --html-only --html out/guide.html

  # Specific browser, machine-readable stats
  docpress guide.md --browser /usr/bin/chromium --json > stats.json

MARKDOWN CONVENTIONS:
  ## 1. Title            numbered section: page break, number badge, accent rule
  **Important:** text    callout box (also Note:, Decision:, Warning:, Tip:)
  - [ ] / - [x]          styled checkboxes
  ```python              code block with a language badge
  ```mermaid graph …     first one replaced by the architecture diagram

ENVIRONMENT VARIABLES:
  DOCPRESS_BROWSER        Headless browser executable (Chrome, Chromium, Edge)
  DOCPRESS_TIMEOUT        Browser timeout in seconds
  RUST_LOG                Log filter, e.g. RUST_LOG=docpress=debug

If the browser runs but no PDF appears, open the intermediate HTML file in
Chrome and use Print → Save as PDF.
"#;

/// Turn a Markdown document into a styled PDF report.
#[derive(Parser, Debug)]
#[command(
    name = "docpress",
    version,
    about = "Turn a Markdown document into a styled PDF report via a headless browser",
    long_about = "Convert one Markdown file into a print-ready PDF report with a cover page, \
table of contents, numbered sections, callout boxes, styled checklists and labelled code \
blocks. The intermediate HTML is kept next to the PDF.",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Markdown source file.
    input: PathBuf,

    /// PDF output path. Default: the input path with a .pdf extension.
    #[arg(short, long, env = "DOCPRESS_OUTPUT")]
    output: Option<PathBuf>,

    /// Intermediate HTML path. Default: the PDF path with a .html extension.
    #[arg(long, env = "DOCPRESS_HTML")]
    html: Option<PathBuf>,

    /// Headless browser executable. Discovered automatically when unset.
    #[arg(long, env = "DOCPRESS_BROWSER")]
    browser: Option<PathBuf>,

    /// Extra browser argument (repeatable), placed before the print flags.
    #[arg(long = "browser-arg", value_name = "ARG", allow_hyphen_values = true)]
    browser_args: Vec<String>,

    /// Browser timeout in seconds.
    #[arg(long, env = "DOCPRESS_TIMEOUT", default_value_t = 120,
          value_parser = clap::value_parser!(u64).range(1..))]
    timeout: u64,

    /// Small upper-case line above the cover title.
    #[arg(long, env = "DOCPRESS_ORG")]
    org: Option<String>,

    /// Cover title. Default: the document's first H1, then the file name.
    #[arg(long)]
    title: Option<String>,

    /// Cover subtitle.
    #[arg(long)]
    subtitle: Option<String>,

    /// Cover tagline.
    #[arg(long)]
    tagline: Option<String>,

    /// Cover metadata row as LABEL=VALUE (repeatable).
    #[arg(long, value_name = "LABEL=VALUE", value_parser = parse_meta)]
    meta: Vec<(String, String)>,

    /// CSS file replacing the embedded stylesheet.
    #[arg(long, env = "DOCPRESS_STYLESHEET")]
    stylesheet: Option<PathBuf>,

    /// Omit the table-of-contents page.
    #[arg(long)]
    no_toc: bool,

    /// Heading of the table-of-contents page.
    #[arg(long, default_value = "Table of Contents")]
    toc_title: String,

    /// Do not inject any diagram.
    #[arg(long)]
    no_diagrams: bool,

    /// Fail when a diagram anchor is missing instead of skipping it.
    #[arg(long, env = "DOCPRESS_STRICT_ANCHORS")]
    strict_anchors: bool,

    /// Stop after writing the HTML; no browser is started.
    #[arg(long)]
    html_only: bool,

    /// Print run statistics as JSON on stdout instead of progress lines.
    #[arg(long)]
    json: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "DOCPRESS_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "DOCPRESS_QUIET")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // Stage lines already say what is happening; library INFO logs would
    // only duplicate them.
    let show_progress = !cli.quiet && !cli.json;
    let filter = log_filter(cli.verbose, cli.quiet, show_progress);

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    // ── Build config ─────────────────────────────────────────────────────
    let progress_cb: Option<ProgressCallback> = if show_progress {
        Some(CliProgressCallback::new() as Arc<dyn ReportProgressCallback>)
    } else {
        None
    };
    let config = build_config(&cli, progress_cb).await?;

    let pdf_path = cli
        .output
        .clone()
        .unwrap_or_else(|| cli.input.with_extension("pdf"));
    let html_path = config.html_path_for(&pdf_path);

    if show_progress {
        println!("{}", bold("docpress"));
        println!("  {} {}", dim("Input: "), cli.input.display());
        if cli.html_only {
            println!("  {} {}", dim("HTML:  "), html_path.display());
        } else {
            println!("  {} {}", dim("Output:"), pdf_path.display());
        }
        println!();
    }

    // ── Run ──────────────────────────────────────────────────────────────
    let result = if cli.html_only {
        generate_html(&cli.input, &html_path, &config).await
    } else {
        generate(&cli.input, &pdf_path, &config).await
    };
    drop(config);

    let output = match result {
        Ok(output) => output,
        Err(ReportError::PdfNotCreated { pdf, html }) => {
            print_manual_fallback(&pdf, &html);
            std::process::exit(1);
        }
        Err(e) => return Err(e).context("Report generation failed"),
    };

    if cli.json {
        let json =
            serde_json::to_string_pretty(&output.stats).context("Failed to serialise stats")?;
        println!("{json}");
    } else if !cli.quiet {
        print_summary(&output, &html_path);
    }

    Ok(())
}

/// Default tracing filter when `RUST_LOG` is unset.
fn log_filter(verbose: bool, quiet: bool, show_progress: bool) -> &'static str {
    if verbose {
        "debug"
    } else if quiet {
        "error"
    } else if show_progress {
        "warn"
    } else {
        "info"
    }
}

/// Map CLI args to `ReportConfig`.
async fn build_config(cli: &Cli, progress: Option<ProgressCallback>) -> Result<ReportConfig> {
    let mut cover = CoverPage::new();
    cover.org = cli.org.clone();
    cover.title = cli.title.clone();
    cover.subtitle = cli.subtitle.clone();
    cover.tagline = cli.tagline.clone();
    cover.meta = cli.meta.clone();

    let mut builder = ReportConfig::builder()
        .cover(cover)
        .include_toc(!cli.no_toc)
        .toc_title(cli.toc_title.clone())
        .strict_anchors(cli.strict_anchors)
        .render_timeout_secs(cli.timeout);

    if cli.no_diagrams {
        builder = builder.without_diagrams();
    }
    if let Some(ref path) = cli.stylesheet {
        let css = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read stylesheet from {:?}", path))?;
        builder = builder.stylesheet(css);
    }
    if let Some(ref path) = cli.html {
        builder = builder.html_output(path.clone());
    }
    if let Some(ref path) = cli.browser {
        builder = builder.browser_path(path.clone());
    }
    for arg in &cli.browser_args {
        builder = builder.browser_arg(arg.clone());
    }
    if let Some(cb) = progress {
        builder = builder.progress_callback(cb);
    }

    builder.build().context("Invalid configuration")
}

/// Parse `--meta LABEL=VALUE`.
fn parse_meta(s: &str) -> std::result::Result<(String, String), String> {
    let (label, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected LABEL=VALUE, got '{s}'"))?;
    let label = label.trim();
    if label.is_empty() {
        return Err(format!("empty label in '{s}'"));
    }
    Ok((label.to_string(), value.trim().to_string()))
}

fn print_summary(output: &ReportOutput, html_path: &Path) {
    let stats = &output.stats;
    println!();
    if !stats.enhance.diagrams_skipped.is_empty() {
        println!(
            "{} diagrams skipped (anchor not found): {}",
            yellow("⚠"),
            stats.enhance.diagrams_skipped.join(", ")
        );
    }
    if !stats.duplicate_slugs.is_empty() {
        println!(
            "{} duplicate heading anchors: {}",
            yellow("⚠"),
            stats.duplicate_slugs.join(", ")
        );
    }

    match &stats.render {
        Some(render) => {
            println!("{}", green(&"=".repeat(60)));
            println!(
                "{} {}",
                green("✔"),
                bold(&format!("PDF generated: {}", render.pdf_path.display()))
            );
            println!(
                "  {} {:.1} MB  {}",
                dim("Size:"),
                render.pdf_megabytes(),
                dim(&format!("({}ms total)", stats.total_duration_ms))
            );
            println!("{}", green(&"=".repeat(60)));
        }
        None => {
            println!(
                "{} {}",
                green("✔"),
                bold(&format!("HTML written: {}", html_path.display()))
            );
        }
    }
    if stats.render.is_some() {
        println!("{} {}", dim("Intermediate HTML kept at:"), html_path.display());
    }
}

fn print_manual_fallback(pdf: &Path, html: &Path) {
    eprintln!("{} PDF was not created at {}", red("✘"), pdf.display());
    eprintln!();
    eprintln!("Try opening the HTML file directly in Chrome and printing to PDF:");
    eprintln!("  {}", bold(&html.display().to_string()));
    eprintln!();
    eprintln!("  1. Open the file in Chrome");
    eprintln!("  2. Print (Ctrl+P / Cmd+P)");
    eprintln!("  3. Destination: Save as PDF, Margins: None, Background graphics: on");
}
