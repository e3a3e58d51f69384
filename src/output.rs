//! Result types returned by the report entry points.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// The assembled report plus statistics about how it was built.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportOutput {
    /// Complete HTML document (cover, TOC, content, embedded CSS).
    pub html: String,
    pub stats: ReportStats,
}

/// Per-run statistics. Serialised by the CLI's `--json` flag.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReportStats {
    /// Characters read from the Markdown source.
    pub markdown_chars: usize,
    /// Characters in the final HTML document.
    pub html_chars: usize,
    /// Title shown on the cover page.
    pub title: String,
    /// Level-2/3 headings listed in the table of contents.
    pub toc_entries: usize,
    /// Slugs produced by more than one TOC heading.
    pub duplicate_slugs: Vec<String>,
    /// What the post-processing passes changed.
    pub enhance: EnhanceReport,
    /// Where the intermediate HTML was written, if it was.
    pub html_path: Option<PathBuf>,
    /// Browser run details, if the PDF stage ran.
    pub render: Option<RenderOutcome>,
    pub render_duration_ms: u64,
    pub total_duration_ms: u64,
}

/// Counters filled in by the post-processing passes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnhanceReport {
    /// Text of the stripped first H1, if there was one.
    pub removed_h1: Option<String>,
    pub architecture_diagram: bool,
    pub diagrams_injected: Vec<String>,
    pub diagrams_skipped: Vec<String>,
    pub callouts: usize,
    pub checkboxes: usize,
    /// H2 headings that received a section number span.
    pub numbered_sections: usize,
    /// H2 headings that received a section rule (numbered or not).
    pub section_headings: usize,
    pub labeled_code_blocks: usize,
}

/// Outcome of a successful browser run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderOutcome {
    /// Browser executable that was invoked.
    pub browser: PathBuf,
    /// Exit code reported by the browser. Informational only: success is
    /// decided by the PDF existing on disk.
    pub exit_code: Option<i32>,
    pub pdf_path: PathBuf,
    pub pdf_bytes: u64,
}

impl RenderOutcome {
    /// PDF size in mebibytes, for display.
    pub fn pdf_megabytes(&self) -> f64 {
        self.pdf_bytes as f64 / (1024.0 * 1024.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn megabytes_rounding() {
        let r = RenderOutcome {
            browser: PathBuf::from("chromium"),
            exit_code: Some(0),
            pdf_path: PathBuf::from("a.pdf"),
            pdf_bytes: 3 * 1024 * 1024 / 2,
        };
        assert!((r.pdf_megabytes() - 1.5).abs() < f64::EPSILON);
    }

    #[test]
    fn stats_serialise_to_json() {
        let stats = ReportStats {
            toc_entries: 4,
            enhance: EnhanceReport {
                diagrams_skipped: vec!["payment-flow".into()],
                ..Default::default()
            },
            ..Default::default()
        };
        let json = serde_json::to_string(&stats).unwrap();
        assert!(json.contains("\"toc_entries\":4"));
        assert!(json.contains("payment-flow"));
    }
}
