//! Configuration types for Markdown-to-PDF report generation.
//!
//! Everything that used to be a hard-coded constant (paths, browser location,
//! cover text, diagram anchors) lives in [`ReportConfig`], built via its
//! [`ReportConfigBuilder`] and passed by reference into every pipeline stage.
//! The same pipeline can therefore run against arbitrary input/output
//! locations and any Chromium-family browser.

use crate::error::ReportError;
use crate::progress::ProgressCallback;
use crate::templates;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Configuration for one report run.
///
/// Built via [`ReportConfig::builder()`] or using [`ReportConfig::default()`].
///
/// # Example
/// ```rust
/// use docpress::{CoverPage, ReportConfig};
///
/// let config = ReportConfig::builder()
///     .cover(CoverPage::new().org("ACME").title("Platform Handbook"))
///     .render_timeout_secs(60)
///     .build()
///     .unwrap();
/// ```
#[derive(Clone)]
pub struct ReportConfig {
    /// Text shown on the cover page.
    pub cover: CoverPage,

    /// Emit the two-column table-of-contents page. Default: true.
    pub include_toc: bool,

    /// Heading of the table-of-contents page. Default: "Table of Contents".
    pub toc_title: String,

    /// Fragment that replaces the first `mermaid` block whose body starts with
    /// `graph`. `None` leaves such blocks as labelled code.
    pub architecture_diagram: Option<String>,

    /// Fragments spliced in next to anchors in the converted document.
    ///
    /// Injections are applied in list order; each is attempted once.
    pub flow_diagrams: Vec<DiagramInjection>,

    /// Fail with [`ReportError::AnchorNotFound`] instead of logging a warning
    /// when a flow-diagram anchor is missing. Default: false.
    pub strict_anchors: bool,

    /// Replacement stylesheet. `None` uses the embedded one.
    pub stylesheet: Option<String>,

    /// Path of the intermediate HTML file. Default: the PDF path with an
    /// `html` extension.
    pub html_output: Option<PathBuf>,

    /// Headless browser executable. `None` triggers discovery.
    pub browser_path: Option<PathBuf>,

    /// Extra browser arguments, placed before the fixed print flags.
    pub browser_args: Vec<String>,

    /// Upper bound for the browser subprocess in seconds. Default: 120.
    ///
    /// Exceeding it aborts the run; there is no retry.
    pub render_timeout_secs: u64,

    /// Optional per-stage progress events.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            cover: CoverPage::default(),
            include_toc: true,
            toc_title: "Table of Contents".to_string(),
            architecture_diagram: Some(templates::ARCHITECTURE_DIAGRAM.to_string()),
            flow_diagrams: DiagramInjection::defaults(),
            strict_anchors: false,
            stylesheet: None,
            html_output: None,
            browser_path: None,
            browser_args: Vec::new(),
            render_timeout_secs: 120,
            progress_callback: None,
        }
    }
}

impl fmt::Debug for ReportConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReportConfig")
            .field("cover", &self.cover)
            .field("include_toc", &self.include_toc)
            .field("toc_title", &self.toc_title)
            .field(
                "architecture_diagram",
                &self.architecture_diagram.as_ref().map(|d| d.len()),
            )
            .field(
                "flow_diagrams",
                &self.flow_diagrams.iter().map(|d| &d.name).collect::<Vec<_>>(),
            )
            .field("strict_anchors", &self.strict_anchors)
            .field("stylesheet", &self.stylesheet.as_ref().map(|s| s.len()))
            .field("html_output", &self.html_output)
            .field("browser_path", &self.browser_path)
            .field("browser_args", &self.browser_args)
            .field("render_timeout_secs", &self.render_timeout_secs)
            .field(
                "progress_callback",
                &self
                    .progress_callback
                    .as_ref()
                    .map(|_| "<dyn ReportProgressCallback>"),
            )
            .finish()
    }
}

impl ReportConfig {
    /// Create a new builder for `ReportConfig`.
    pub fn builder() -> ReportConfigBuilder {
        ReportConfigBuilder {
            config: Self::default(),
        }
    }

    /// The stylesheet embedded into the assembled document.
    pub fn stylesheet(&self) -> &str {
        self.stylesheet.as_deref().unwrap_or(templates::REPORT_CSS)
    }

    /// Where the intermediate HTML goes for a given PDF target.
    pub fn html_path_for(&self, pdf_path: &std::path::Path) -> PathBuf {
        self.html_output
            .clone()
            .unwrap_or_else(|| pdf_path.with_extension("html"))
    }
}

/// Builder for [`ReportConfig`].
#[derive(Debug)]
pub struct ReportConfigBuilder {
    config: ReportConfig,
}

impl ReportConfigBuilder {
    pub fn cover(mut self, cover: CoverPage) -> Self {
        self.config.cover = cover;
        self
    }

    pub fn include_toc(mut self, v: bool) -> Self {
        self.config.include_toc = v;
        self
    }

    pub fn toc_title(mut self, title: impl Into<String>) -> Self {
        self.config.toc_title = title.into();
        self
    }

    pub fn architecture_diagram(mut self, fragment: Option<String>) -> Self {
        self.config.architecture_diagram = fragment;
        self
    }

    pub fn flow_diagrams(mut self, diagrams: Vec<DiagramInjection>) -> Self {
        self.config.flow_diagrams = diagrams;
        self
    }

    /// Disable the architecture replacement and every flow diagram.
    pub fn without_diagrams(mut self) -> Self {
        self.config.architecture_diagram = None;
        self.config.flow_diagrams.clear();
        self
    }

    pub fn strict_anchors(mut self, v: bool) -> Self {
        self.config.strict_anchors = v;
        self
    }

    pub fn stylesheet(mut self, css: impl Into<String>) -> Self {
        self.config.stylesheet = Some(css.into());
        self
    }

    pub fn html_output(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.html_output = Some(path.into());
        self
    }

    pub fn browser_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.browser_path = Some(path.into());
        self
    }

    pub fn browser_arg(mut self, arg: impl Into<String>) -> Self {
        self.config.browser_args.push(arg.into());
        self
    }

    pub fn render_timeout_secs(mut self, secs: u64) -> Self {
        self.config.render_timeout_secs = secs;
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ReportConfig, ReportError> {
        let c = &self.config;
        if c.render_timeout_secs == 0 {
            return Err(ReportError::InvalidConfig(
                "Render timeout must be ≥ 1 second".into(),
            ));
        }
        if c.toc_title.trim().is_empty() {
            return Err(ReportError::InvalidConfig(
                "TOC title must not be empty".into(),
            ));
        }
        if let Some(d) = c.flow_diagrams.iter().find(|d| d.anchor.is_empty()) {
            return Err(ReportError::InvalidConfig(format!(
                "Diagram '{}' has an empty anchor",
                d.name
            )));
        }
        Ok(self.config)
    }
}

// ── Cover page ───────────────────────────────────────────────────────────

/// Text for the full-bleed cover page. Empty parts are omitted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CoverPage {
    /// Small upper-case line above the title (organisation or product).
    pub org: Option<String>,
    /// Main title. Falls back to the stripped first H1, then the file stem.
    pub title: Option<String>,
    pub subtitle: Option<String>,
    pub tagline: Option<String>,
    /// `(label, value)` rows at the bottom, e.g. `("Version", "1.0")`.
    pub meta: Vec<(String, String)>,
}

impl CoverPage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn org(mut self, org: impl Into<String>) -> Self {
        self.org = Some(org.into());
        self
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn subtitle(mut self, subtitle: impl Into<String>) -> Self {
        self.subtitle = Some(subtitle.into());
        self
    }

    pub fn tagline(mut self, tagline: impl Into<String>) -> Self {
        self.tagline = Some(tagline.into());
        self
    }

    pub fn meta(mut self, label: impl Into<String>, value: impl Into<String>) -> Self {
        self.meta.push((label.into(), value.into()));
        self
    }
}

// ── Diagrams ─────────────────────────────────────────────────────────────

/// Where a flow diagram is spliced into the converted document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Anchor {
    /// Right after the first paragraph whose plain text ends with this string.
    AfterParagraphEndingWith(String),
    /// Right before the heading carrying this id.
    BeforeHeading(String),
}

impl Anchor {
    fn is_empty(&self) -> bool {
        match self {
            Anchor::AfterParagraphEndingWith(s) | Anchor::BeforeHeading(s) => s.trim().is_empty(),
        }
    }
}

impl fmt::Display for Anchor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Anchor::AfterParagraphEndingWith(s) => write!(f, "after paragraph ending with {s:?}"),
            Anchor::BeforeHeading(id) => write!(f, "before heading #{id}"),
        }
    }
}

/// A static HTML fragment and the anchor it attaches to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiagramInjection {
    /// Short name used in logs and stats.
    pub name: String,
    pub anchor: Anchor,
    /// Raw HTML inserted verbatim.
    pub fragment: String,
}

impl DiagramInjection {
    pub fn new(name: impl Into<String>, anchor: Anchor, fragment: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            anchor,
            fragment: fragment.into(),
        }
    }

    /// The three built-in flow diagrams and their anchors.
    pub fn defaults() -> Vec<Self> {
        vec![
            Self::new(
                "content-flow",
                Anchor::AfterParagraphEndingWith("typically within seconds.".into()),
                templates::CONTENT_FLOW_DIAGRAM,
            ),
            Self::new(
                "payment-flow",
                Anchor::BeforeHeading("e-newsletter-flow".into()),
                templates::PAYMENT_FLOW_DIAGRAM,
            ),
            Self::new(
                "newsletter-flow",
                Anchor::BeforeHeading("f-local-vs-production-behavior".into()),
                templates::NEWSLETTER_FLOW_DIAGRAM,
            ),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn defaults_match_documented_values() {
        let c = ReportConfig::default();
        assert!(c.include_toc);
        assert_eq!(c.toc_title, "Table of Contents");
        assert_eq!(c.render_timeout_secs, 120);
        assert_eq!(c.flow_diagrams.len(), 3);
        assert!(c.architecture_diagram.is_some());
        assert!(!c.strict_anchors);
    }

    #[test]
    fn zero_timeout_rejected() {
        let err = ReportConfig::builder()
            .render_timeout_secs(0)
            .build()
            .unwrap_err();
        assert!(matches!(err, ReportError::InvalidConfig(_)));
    }

    #[test]
    fn empty_anchor_rejected() {
        let err = ReportConfig::builder()
            .flow_diagrams(vec![DiagramInjection::new(
                "x",
                Anchor::BeforeHeading("  ".into()),
                "<div></div>",
            )])
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("'x'"));
    }

    #[test]
    fn without_diagrams_clears_everything() {
        let c = ReportConfig::builder().without_diagrams().build().unwrap();
        assert!(c.architecture_diagram.is_none());
        assert!(c.flow_diagrams.is_empty());
    }

    #[test]
    fn html_path_defaults_next_to_pdf() {
        let c = ReportConfig::default();
        assert_eq!(
            c.html_path_for(Path::new("out/report.pdf")),
            PathBuf::from("out/report.html")
        );
        let c = ReportConfig::builder()
            .html_output("/tmp/keep.html")
            .build()
            .unwrap();
        assert_eq!(
            c.html_path_for(Path::new("out/report.pdf")),
            PathBuf::from("/tmp/keep.html")
        );
    }

    #[test]
    fn custom_stylesheet_overrides_embedded() {
        let c = ReportConfig::builder().stylesheet("body{}").build().unwrap();
        assert_eq!(c.stylesheet(), "body{}");
        assert!(ReportConfig::default().stylesheet().contains(".cover-page"));
    }

    #[test]
    fn anchor_display() {
        assert_eq!(
            Anchor::BeforeHeading("intro".into()).to_string(),
            "before heading #intro"
        );
        assert!(Anchor::AfterParagraphEndingWith("done.".into())
            .to_string()
            .contains("\"done.\""));
    }
}
