//! Progress-callback trait for per-stage report events.
//!
//! Inject an [`Arc<dyn ReportProgressCallback>`] via
//! [`crate::config::ReportConfigBuilder::progress_callback`] to receive an
//! event as each of the seven pipeline stages starts and finishes. The CLI
//! uses this to print its numbered `[n/7]` lines; library callers can forward
//! the events anywhere without the library knowing about terminals.
//!
//! # Example
//!
//! ```rust
//! use docpress::{ReportConfig, ReportProgressCallback, Stage};
//! use std::sync::Arc;
//!
//! struct Printer;
//!
//! impl ReportProgressCallback for Printer {
//!     fn on_stage_start(&self, stage: Stage) {
//!         println!("[{}/{}] {}", stage.number(), Stage::COUNT, stage.label());
//!     }
//! }
//!
//! let config = ReportConfig::builder()
//!     .progress_callback(Arc::new(Printer))
//!     .build()
//!     .unwrap();
//! ```

use serde::Serialize;
use std::fmt;
use std::sync::Arc;

/// The numbered stages of a report run, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Stage {
    ReadMarkdown,
    BuildToc,
    ConvertMarkdown,
    EnhanceHtml,
    BuildCover,
    AssembleHtml,
    RenderPdf,
}

impl Stage {
    /// Number of stages in a full run.
    pub const COUNT: usize = 7;

    /// All stages in execution order.
    pub const ALL: [Stage; Stage::COUNT] = [
        Stage::ReadMarkdown,
        Stage::BuildToc,
        Stage::ConvertMarkdown,
        Stage::EnhanceHtml,
        Stage::BuildCover,
        Stage::AssembleHtml,
        Stage::RenderPdf,
    ];

    /// 1-indexed position of the stage.
    pub fn number(self) -> usize {
        Stage::ALL
            .iter()
            .position(|s| *s == self)
            .map_or(0, |i| i + 1)
    }

    /// Human-readable description printed next to the stage number.
    pub fn label(self) -> &'static str {
        match self {
            Stage::ReadMarkdown => "Reading markdown file...",
            Stage::BuildToc => "Building table of contents...",
            Stage::ConvertMarkdown => "Converting markdown to HTML...",
            Stage::EnhanceHtml => "Enhancing HTML with report styling...",
            Stage::BuildCover => "Building cover page...",
            Stage::AssembleHtml => "Assembling final HTML document...",
            Stage::RenderPdf => "Converting to PDF via headless browser...",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}/{}] {}", self.number(), Stage::COUNT, self.label())
    }
}

/// Called by the pipeline as it moves through each [`Stage`].
///
/// All methods have default no-op implementations so callers only override
/// what they care about.
pub trait ReportProgressCallback: Send + Sync {
    /// Called when a stage begins.
    fn on_stage_start(&self, stage: Stage) {
        let _ = stage;
    }

    /// Called for each post-processing transform inside
    /// [`Stage::EnhanceHtml`], just before it runs.
    fn on_transform(&self, name: &str) {
        let _ = name;
    }

    /// Called when a stage finishes.
    ///
    /// # Arguments
    /// * `stage`   — the stage that just completed
    /// * `summary` — short result line, e.g. `"Found 12 sections"`
    fn on_stage_complete(&self, stage: Stage, summary: &str) {
        let _ = (stage, summary);
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl ReportProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::ReportConfig`].
pub type ProgressCallback = Arc<dyn ReportProgressCallback>;
