//! Report generation entry points.
//!
//! [`build_html`] is the pure core: Markdown text in, assembled HTML out, no
//! I/O. [`generate_html`] adds reading the source and writing the HTML file;
//! [`generate`] additionally prints that file to PDF. Stages are reported to
//! the configured [`crate::progress::ReportProgressCallback`] in order.

use crate::config::ReportConfig;
use crate::error::ReportError;
use crate::output::{ReportOutput, ReportStats};
use crate::pipeline::assemble::{self, DocumentParts};
use crate::pipeline::{headings, input, markdown, postprocess, render};
use crate::progress::Stage;
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info};

/// Build the complete HTML report from Markdown text.
///
/// Runs stages 2–6 (TOC, conversion, enhancement, cover, assembly). The cover
/// title falls back to the stripped first H1, then to `"Document"`.
///
/// # Errors
/// Only [`ReportError::AnchorNotFound`], when strict anchors are enabled.
pub fn build_html(markdown_text: &str, config: &ReportConfig) -> Result<ReportOutput, ReportError> {
    build_report(markdown_text, None, config)
}

/// Read a Markdown file and write the assembled HTML to `html_path`.
///
/// Runs stages 1–6. `stats.html_path` is set on success.
pub async fn generate_html(
    input_path: impl AsRef<Path>,
    html_path: impl AsRef<Path>,
    config: &ReportConfig,
) -> Result<ReportOutput, ReportError> {
    let total_start = Instant::now();
    let input_path = input_path.as_ref();
    let html_path = html_path.as_ref();
    info!("Starting report: {}", input_path.display());

    // ── Step 1: Read source ──────────────────────────────────────────────
    stage_start(config, Stage::ReadMarkdown);
    let text = input::read_markdown(input_path).await?;
    stage_complete(
        config,
        Stage::ReadMarkdown,
        &format!("Read {} characters", text.chars().count()),
    );

    // ── Steps 2–6: Build the document ────────────────────────────────────
    let fallback = input::title_from_path(input_path);
    let mut output = build_report(&text, Some(fallback), config)?;

    // ── Write intermediate HTML ──────────────────────────────────────────
    write_atomic(html_path, &output.html).await?;
    info!("HTML written: {}", html_path.display());

    output.stats.html_path = Some(html_path.to_path_buf());
    output.stats.total_duration_ms = total_start.elapsed().as_millis() as u64;
    Ok(output)
}

/// Full run: Markdown file → HTML file → PDF.
///
/// The HTML goes to [`ReportConfig::html_path_for`] and is kept after the
/// run, so it can be printed by hand if the browser step fails.
///
/// # Errors
/// Everything [`generate_html`] returns, plus the browser errors:
/// [`ReportError::BrowserNotFound`], [`ReportError::BrowserLaunchFailed`],
/// [`ReportError::BrowserTimeout`] and [`ReportError::PdfNotCreated`].
pub async fn generate(
    input_path: impl AsRef<Path>,
    pdf_path: impl AsRef<Path>,
    config: &ReportConfig,
) -> Result<ReportOutput, ReportError> {
    let total_start = Instant::now();
    let pdf_path = pdf_path.as_ref();
    let html_path = config.html_path_for(pdf_path);
    if html_path.as_path() == pdf_path {
        return Err(ReportError::InvalidConfig(format!(
            "Intermediate HTML and PDF would both be written to {}; \
             use a .pdf output path or set a separate HTML path",
            pdf_path.display()
        )));
    }

    let mut output = generate_html(input_path, &html_path, config).await?;

    // ── Step 7: Print to PDF ─────────────────────────────────────────────
    stage_start(config, Stage::RenderPdf);
    let render_start = Instant::now();
    let outcome = render::print_to_pdf(&html_path, pdf_path, config).await?;
    output.stats.render_duration_ms = render_start.elapsed().as_millis() as u64;
    stage_complete(
        config,
        Stage::RenderPdf,
        &format!("PDF created ({:.1} MB)", outcome.pdf_megabytes()),
    );

    output.stats.render = Some(outcome);
    output.stats.total_duration_ms = total_start.elapsed().as_millis() as u64;
    info!(
        "Report complete in {}ms (render {}ms)",
        output.stats.total_duration_ms, output.stats.render_duration_ms
    );
    Ok(output)
}

/// Synchronous wrapper around [`generate`].
///
/// Creates a temporary tokio runtime internally.
pub fn generate_sync(
    input_path: impl AsRef<Path>,
    pdf_path: impl AsRef<Path>,
    config: &ReportConfig,
) -> Result<ReportOutput, ReportError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| ReportError::Internal(format!("Failed to create tokio runtime: {}", e)))?
        .block_on(generate(input_path, pdf_path, config))
}

// ── Internal helpers ─────────────────────────────────────────────────────

fn build_report(
    markdown_text: &str,
    fallback_title: Option<String>,
    config: &ReportConfig,
) -> Result<ReportOutput, ReportError> {
    // ── Step 2: Table of contents ────────────────────────────────────────
    stage_start(config, Stage::BuildToc);
    let records = headings::extract_headings(markdown_text);
    let duplicate_slugs = headings::duplicate_slugs(&records);
    let toc_html = if config.include_toc {
        headings::render_toc(&records, &config.toc_title)
    } else {
        String::new()
    };
    stage_complete(
        config,
        Stage::BuildToc,
        &format!("Found {} sections", records.len()),
    );

    // ── Step 3: Convert ──────────────────────────────────────────────────
    stage_start(config, Stage::ConvertMarkdown);
    let events = markdown::parse(markdown_text);
    stage_complete(
        config,
        Stage::ConvertMarkdown,
        &format!("Parsed {} document events", events.len()),
    );

    // ── Step 4: Enhance ──────────────────────────────────────────────────
    stage_start(config, Stage::EnhanceHtml);
    let (events, enhance) = postprocess::enhance(events, config)?;
    let content_html = markdown::to_html(events);
    stage_complete(
        config,
        Stage::EnhanceHtml,
        &format!(
            "{} sections numbered, {} callouts, {} diagrams",
            enhance.numbered_sections,
            enhance.callouts,
            enhance.diagrams_injected.len() + usize::from(enhance.architecture_diagram)
        ),
    );

    // ── Step 5: Cover ────────────────────────────────────────────────────
    stage_start(config, Stage::BuildCover);
    let title = config
        .cover
        .title
        .clone()
        .or_else(|| enhance.removed_h1.clone().filter(|t| !t.is_empty()))
        .or(fallback_title)
        .unwrap_or_else(|| "Document".to_string());
    let cover_html = assemble::render_cover(&config.cover, &title);
    stage_complete(config, Stage::BuildCover, &format!("Title: {title}"));

    // ── Step 6: Assemble ─────────────────────────────────────────────────
    stage_start(config, Stage::AssembleHtml);
    let html = assemble::assemble_document(DocumentParts {
        title: &title,
        stylesheet: config.stylesheet(),
        cover: &cover_html,
        toc: &toc_html,
        content: &content_html,
    });
    stage_complete(
        config,
        Stage::AssembleHtml,
        &format!("{} characters of HTML", html.chars().count()),
    );
    debug!("Assembled document for '{}'", title);

    let stats = ReportStats {
        markdown_chars: markdown_text.chars().count(),
        html_chars: html.chars().count(),
        title,
        toc_entries: records.len(),
        duplicate_slugs,
        enhance,
        ..Default::default()
    };
    Ok(ReportOutput { html, stats })
}

fn stage_start(config: &ReportConfig, stage: Stage) {
    info!("{}", stage);
    if let Some(ref cb) = config.progress_callback {
        cb.on_stage_start(stage);
    }
}

fn stage_complete(config: &ReportConfig, stage: Stage, summary: &str) {
    debug!("{} done: {}", stage.label(), summary);
    if let Some(ref cb) = config.progress_callback {
        cb.on_stage_complete(stage, summary);
    }
}

/// Write via a temp file and rename so readers never see a partial file.
async fn write_atomic(path: &Path, contents: &str) -> Result<(), ReportError> {
    let write_err = |e| ReportError::OutputWriteFailed {
        path: path.to_path_buf(),
        source: e,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await.map_err(write_err)?;
    }
    let tmp_path = path.with_extension("html.tmp");
    tokio::fs::write(&tmp_path, contents)
        .await
        .map_err(write_err)?;
    tokio::fs::rename(&tmp_path, path).await.map_err(write_err)
}
