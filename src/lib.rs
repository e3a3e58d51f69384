//! # docpress
//!
//! Turn one Markdown document into a print-ready PDF report: cover page,
//! two-column table of contents, numbered sections, callout boxes, styled
//! checklists, labelled code blocks and static diagrams.
//!
//! ## Pipeline Overview
//!
//! ```text
//! Markdown
//!  │
//!  ├─ 1. Read      UTF-8 source from disk
//!  ├─ 2. TOC       ##/### headings → slugs → two-column contents page
//!  ├─ 3. Convert   pulldown-cmark events, heading ids assigned
//!  ├─ 4. Enhance   ordered passes over the events (callouts, numbering, …)
//!  ├─ 5. Cover     title, subtitle, meta rows
//!  ├─ 6. Assemble  standalone HTML with the embedded stylesheet
//!  └─ 7. Print     headless Chromium --print-to-pdf
//! ```
//!
//! The intermediate HTML is always written next to the PDF and kept, so a
//! failed browser step can be finished by hand.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use docpress::{generate, CoverPage, ReportConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ReportConfig::builder()
//!         .cover(CoverPage::new().org("ACME").subtitle("System Documentation"))
//!         .build()?;
//!     let output = generate("docs/SYSTEM.md", "docs/SYSTEM.pdf", &config).await?;
//!     eprintln!("{} sections, {} callouts",
//!         output.stats.toc_entries,
//!         output.stats.enhance.callouts);
//!     Ok(())
//! }
//! ```
//!
//! Without a browser, [`build_html`] returns the assembled document as a
//! string:
//!
//! ```rust
//! let config = docpress::ReportConfig::default();
//! let out = docpress::build_html("# Guide\n\n## 1. Setup\n", &config).unwrap();
//! assert!(out.html.contains("section-number"));
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `docpress` binary (clap + anyhow + tracing-subscriber + indicatif) |
//!
//! Disable `cli` when using only the library:
//! ```toml
//! docpress = { version = "0.1", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod error;
pub mod generate;
pub mod output;
pub mod pipeline;
pub mod progress;
pub mod templates;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{Anchor, CoverPage, DiagramInjection, ReportConfig, ReportConfigBuilder};
pub use error::ReportError;
pub use generate::{build_html, generate, generate_html, generate_sync};
pub use output::{EnhanceReport, RenderOutcome, ReportOutput, ReportStats};
pub use progress::{NoopProgressCallback, ProgressCallback, ReportProgressCallback, Stage};
