//! End-to-end integration tests for docpress.
//!
//! Most tests run the whole pipeline up to the HTML file and need nothing but
//! a temp directory. Browser behaviour is exercised with small `/bin/sh`
//! scripts standing in for Chromium (unix only). The one test that drives a
//! real browser is gated behind `E2E_ENABLED`.
//!
//! Run with:
//!   cargo test --test e2e -- --nocapture
//!
//! Including the real browser:
//!   E2E_ENABLED=1 DOCPRESS_BROWSER=/usr/bin/chromium cargo test --test e2e

use docpress::{
    build_html, generate, generate_html, CoverPage, ReportConfig, ReportError,
    ReportProgressCallback, Stage,
};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

// ── Test helpers ─────────────────────────────────────────────────────────────

const MINIMAL_DOC: &str = "# Doc\n\n## 1. Intro\n\n- [ ] item\n\n```python\nprint(1)\n```\n";

const FULL_DOC: &str = r#"# Platform Handbook

---

## 1. Overview

The platform serves a static site backed by a headless CMS.

```mermaid
graph TD
    CMS --> Site
```

**Important:** Never edit production content directly.

## 2. Flows

### C. Content Flow

Editors publish in the CMS and the site rebuilds, typically within seconds.

### D. Payment Flow

Donations go through the payment provider.

### E. Newsletter Flow

Signups are forwarded to the mailing list.

### F. Local vs Production Behavior

- [x] Webhooks configured
- [ ] Staging mirror

**Tip:** Use `npm run dev` locally.

## Appendix

```groq
*[_type == "post"]
```
"#;

fn write_doc(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, contents).unwrap();
    path
}

#[derive(Default)]
struct StageRecorder {
    started: Mutex<Vec<Stage>>,
    completed: Mutex<Vec<Stage>>,
    transforms: Mutex<Vec<String>>,
}

impl ReportProgressCallback for StageRecorder {
    fn on_stage_start(&self, stage: Stage) {
        self.started.lock().unwrap().push(stage);
    }

    fn on_transform(&self, name: &str) {
        self.transforms.lock().unwrap().push(name.to_string());
    }

    fn on_stage_complete(&self, stage: Stage, _summary: &str) {
        self.completed.lock().unwrap().push(stage);
    }
}

// ── HTML pipeline ────────────────────────────────────────────────────────────

#[test]
fn test_minimal_document() {
    let config = ReportConfig::default();
    let out = build_html(MINIMAL_DOC, &config).unwrap();
    let html = &out.html;

    assert!(html.contains(r#"<div class="cover-page">"#));
    assert!(html.contains(r##"<a href="#1-intro">1. Intro</a>"##));
    assert!(html.contains(r#"id="1-intro""#));
    assert!(html.contains(r#"<span class="section-number">1.</span> Intro"#));
    assert!(html.contains(r#"<span class="checkbox-box"></span> item"#));
    assert!(html.contains(r#"<span class="code-lang">Python</span>"#));
    assert!(!html.contains("<h1"), "first H1 must be stripped");
    assert_eq!(out.stats.title, "Doc");
}

/// Assert every TOC link has a matching heading id; returns the link count.
fn assert_toc_links_resolve(html: &str) -> usize {
    let toc_start = html.find(r#"<div class="toc-page">"#).unwrap();
    let content_start = html.find(r#"<div class="doc-content">"#).unwrap();
    let toc = &html[toc_start..content_start];
    let content = &html[content_start..];

    let mut links = 0;
    for chunk in toc.split(r##"href="#"##).skip(1) {
        let slug = chunk.split('"').next().unwrap();
        assert!(
            content.contains(&format!(r#"id="{slug}""#)),
            "TOC link #{slug} has no target"
        );
        links += 1;
    }
    links
}

#[test]
fn test_every_toc_link_resolves() {
    let out = build_html(FULL_DOC, &ReportConfig::default()).unwrap();
    let links = assert_toc_links_resolve(&out.html);
    assert_eq!(links, out.stats.toc_entries);
    assert_eq!(links, 7);
}

#[test]
fn test_toc_links_resolve_with_inline_markup() {
    let md = "## See [the docs](https://example.com/x)\n\n### Q&amp;A\n\n\
              ## Using *fast* `cargo`\n\n### Setup {#custom-setup}\n";
    let config = ReportConfig::builder().without_diagrams().build().unwrap();
    let out = build_html(md, &config).unwrap();
    assert_eq!(assert_toc_links_resolve(&out.html), 4);
    assert!(out.html.contains(r##"<a href="#see-the-docs">See the docs</a>"##));
    assert!(out.html.contains(r##"<a href="#q-a">Q&amp;A</a>"##));
    assert!(out.html.contains(r##"<a href="#using-fast-cargo">Using fast cargo</a>"##));
}

#[test]
fn test_default_diagrams_all_land() {
    let out = build_html(FULL_DOC, &ReportConfig::default()).unwrap();
    let enhance = &out.stats.enhance;

    assert!(enhance.architecture_diagram);
    assert_eq!(
        enhance.diagrams_injected,
        vec!["content-flow", "payment-flow", "newsletter-flow"]
    );
    assert!(enhance.diagrams_skipped.is_empty());
    assert!(!out.html.contains("graph TD"));

    let payment = out.html.find("Donation Payment Flow").unwrap_or(usize::MAX);
    let newsletter_heading = out.html.find(r#"id="e-newsletter-flow""#).unwrap();
    assert!(payment < newsletter_heading, "payment flow must precede section E");
}

#[test]
fn test_callouts_checkboxes_and_labels() {
    let config = ReportConfig::builder().without_diagrams().build().unwrap();
    let out = build_html(FULL_DOC, &config).unwrap();
    let e = &out.stats.enhance;

    assert_eq!(e.callouts, 2);
    assert_eq!(e.checkboxes, 2);
    assert_eq!(e.numbered_sections, 2);
    assert_eq!(e.section_headings, 3);
    // mermaid block stays as code when the replacement is disabled
    assert_eq!(e.labeled_code_blocks, 2);
    assert!(out.html.contains(r#"<span class="code-lang">GROQ</span>"#));
    assert!(out.html.contains(r#"<span class="code-lang">MERMAID</span>"#));
    assert!(out.html.contains("callout callout-tip"));
    assert!(out.html.contains(r#"<span class="checkbox-box checked"></span> Webhooks configured"#));
}

#[test]
fn test_missing_anchors_do_not_fail() {
    let out = build_html("## Only Section\n\nNothing to anchor.\n", &ReportConfig::default()).unwrap();
    assert_eq!(out.stats.enhance.diagrams_skipped.len(), 3);
    assert!(!out.stats.enhance.architecture_diagram);
}

#[test]
fn test_strict_anchors_fail() {
    let config = ReportConfig::builder().strict_anchors(true).build().unwrap();
    let err = build_html("## Only Section\n", &config).unwrap_err();
    assert!(matches!(err, ReportError::AnchorNotFound { .. }));
}

#[test]
fn test_cover_text_escaped() {
    let config = ReportConfig::builder()
        .cover(
            CoverPage::new()
                .org("R&D")
                .title("<Handbook>")
                .meta("Version", "1.0"),
        )
        .without_diagrams()
        .build()
        .unwrap();
    let out = build_html(MINIMAL_DOC, &config).unwrap();
    assert!(out.html.contains(r#"<div class="cover-org">R&amp;D</div>"#));
    assert!(out.html.contains(r#"<div class="cover-title">&lt;Handbook&gt;</div>"#));
    assert!(out.html.contains("<strong>Version:</strong> 1.0<br>"));
}

#[tokio::test]
async fn test_generate_html_reports_stages_one_to_six() {
    let dir = tempfile::tempdir().unwrap();
    let md = write_doc(dir.path(), "guide.md", MINIMAL_DOC);
    let html_path = dir.path().join("guide.html");
    let recorder = Arc::new(StageRecorder::default());
    let config = ReportConfig::builder()
        .progress_callback(recorder.clone())
        .build()
        .unwrap();

    let out = generate_html(&md, &html_path, &config).await.unwrap();
    assert_eq!(std::fs::read_to_string(&html_path).unwrap(), out.html);
    assert_eq!(recorder.started.lock().unwrap().as_slice(), &Stage::ALL[..6]);
    assert_eq!(recorder.completed.lock().unwrap().as_slice(), &Stage::ALL[..6]);
    assert_eq!(recorder.transforms.lock().unwrap().len(), 7);
}

#[tokio::test]
async fn test_missing_input() {
    let dir = tempfile::tempdir().unwrap();
    let err = generate(dir.path().join("absent.md"), dir.path().join("absent.pdf"), &ReportConfig::default())
        .await
        .unwrap_err();
    assert!(matches!(err, ReportError::FileNotFound { .. }));
    assert!(err.to_string().contains("absent.md"));
}

// ── Browser stage (fake browser) ─────────────────────────────────────────────

#[cfg(unix)]
mod fake_browser {
    use super::*;

    /// A config that runs `/bin/sh <script>` as the "browser".
    fn config_with_script(dir: &Path, body: &str, timeout: u64) -> ReportConfig {
        let script = dir.join("browser.sh");
        std::fs::write(&script, body).unwrap();
        ReportConfig::builder()
            .browser_path("/bin/sh")
            .browser_arg(script.to_string_lossy().to_string())
            .render_timeout_secs(timeout)
            .without_diagrams()
            .build()
            .unwrap()
    }

    const PRINTS_PDF_EXITS_3: &str = r#"
for arg in "$@"; do
  case "$arg" in
    --print-to-pdf=*) out="${arg#--print-to-pdf=}" ;;
  esac
done
printf '%%PDF-1.4\n' > "$out"
echo "gpu process crashed" >&2
exit 3
"#;

    #[tokio::test]
    async fn test_success_despite_nonzero_exit() {
        let dir = tempfile::tempdir().unwrap();
        let md = write_doc(dir.path(), "report.md", MINIMAL_DOC);
        let pdf = dir.path().join("out").join("report.pdf");
        let config = config_with_script(dir.path(), PRINTS_PDF_EXITS_3, 30);

        let out = generate(&md, &pdf, &config).await.unwrap();
        let render = out.stats.render.expect("render outcome");
        assert_eq!(render.exit_code, Some(3));
        assert_eq!(render.pdf_bytes, 9);
        assert!(std::fs::read(&pdf).unwrap().starts_with(b"%PDF"));
        // intermediate HTML is kept next to the PDF
        assert!(dir.path().join("out").join("report.html").exists());
        assert_eq!(
            out.stats.html_path,
            Some(dir.path().join("out").join("report.html"))
        );
    }

    #[tokio::test]
    async fn test_stale_pdf_is_not_success() {
        let dir = tempfile::tempdir().unwrap();
        let md = write_doc(dir.path(), "report.md", MINIMAL_DOC);
        let pdf = dir.path().join("report.pdf");
        std::fs::write(&pdf, b"%PDF-old").unwrap();
        let config = config_with_script(dir.path(), "exit 0\n", 30);

        let err = generate(&md, &pdf, &config).await.unwrap_err();
        match err {
            ReportError::PdfNotCreated { pdf: missing, html } => {
                assert!(missing.ends_with("report.pdf"));
                assert!(html.ends_with("report.html"));
                assert!(html.exists(), "HTML must survive for manual printing");
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(!pdf.exists());
    }

    #[tokio::test]
    async fn test_browser_timeout() {
        let dir = tempfile::tempdir().unwrap();
        let md = write_doc(dir.path(), "slow.md", MINIMAL_DOC);
        let config = config_with_script(dir.path(), "sleep 5\n", 1);

        let started = std::time::Instant::now();
        let err = generate(&md, dir.path().join("slow.pdf"), &config)
            .await
            .unwrap_err();
        assert!(matches!(err, ReportError::BrowserTimeout { secs: 1 }), "got: {err}");
        assert!(started.elapsed() < std::time::Duration::from_secs(4));
    }

    #[tokio::test]
    async fn test_browser_receives_extra_args_first() {
        let dir = tempfile::tempdir().unwrap();
        let md = write_doc(dir.path(), "args.md", MINIMAL_DOC);
        let log = dir.path().join("args.log");
        let body = format!(
            "printf '%s\\n' \"$@\" > '{}'\n{}",
            log.display(),
            PRINTS_PDF_EXITS_3
        );
        let config = config_with_script(dir.path(), &body, 30);

        generate(&md, dir.path().join("args.pdf"), &config).await.unwrap();
        let args: Vec<String> = std::fs::read_to_string(&log)
            .unwrap()
            .lines()
            .map(String::from)
            .collect();
        assert_eq!(args.first().map(String::as_str), Some("--headless"));
        assert!(args.iter().any(|a| a.starts_with("--print-to-pdf=")));
        assert!(args.last().unwrap().starts_with("file:///"));
        assert!(args.last().unwrap().ends_with("args.html"));
    }

    #[cfg(feature = "cli")]
    #[test]
    fn test_cli_exits_nonzero_with_manual_instructions() {
        let dir = tempfile::tempdir().unwrap();
        let md = write_doc(dir.path(), "guide.md", MINIMAL_DOC);
        let script = dir.path().join("browser.sh");
        std::fs::write(&script, "exit 0\n").unwrap();

        let out = std::process::Command::new(env!("CARGO_BIN_EXE_docpress"))
            .arg(&md)
            .args(["--no-diagrams", "--quiet", "--browser", "/bin/sh", "--browser-arg"])
            .arg(&script)
            .env_remove("DOCPRESS_OUTPUT")
            .env_remove("DOCPRESS_HTML")
            .env_remove("DOCPRESS_BROWSER")
            .env_remove("RUST_LOG")
            .output()
            .unwrap();

        assert_eq!(out.status.code(), Some(1));
        let stderr = String::from_utf8_lossy(&out.stderr);
        let html = dir.path().join("guide.html");
        assert!(stderr.contains("printing to PDF"), "stderr: {stderr}");
        assert!(stderr.contains(&html.display().to_string()), "stderr: {stderr}");
        assert!(html.exists());
        assert!(!dir.path().join("guide.pdf").exists());
    }
}

// ── Real browser (opt-in) ────────────────────────────────────────────────────

#[tokio::test]
async fn test_real_browser_prints_pdf() {
    if std::env::var("E2E_ENABLED").is_err() {
        println!("SKIP — set E2E_ENABLED=1 to run browser e2e tests");
        return;
    }
    let dir = tempfile::tempdir().unwrap();
    let md = write_doc(dir.path(), "handbook.md", FULL_DOC);
    let pdf = dir.path().join("handbook.pdf");

    let mut builder = ReportConfig::builder();
    if let Ok(browser) = std::env::var("DOCPRESS_BROWSER") {
        builder = builder.browser_path(browser);
    }
    let config = builder.build().unwrap();

    let out = generate(&md, &pdf, &config).await.unwrap();
    let render = out.stats.render.unwrap();
    assert!(render.pdf_bytes > 1000, "suspiciously small PDF");
    println!("PDF: {} ({:.2} MB)", render.pdf_path.display(), render.pdf_megabytes());
}
