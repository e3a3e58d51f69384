//! Error types for the docpress library.
//!
//! Only one error type exists: [`ReportError`] covers every condition that
//! stops a run (unreadable input, a browser that cannot be launched or hangs,
//! a PDF that never appeared). Conditions that merely degrade the report are
//! not errors:
//!
//! * a browser that exits non-zero but still wrote the PDF,
//! * a diagram anchor that is missing from the document (unless
//!   [`crate::config::ReportConfig::strict_anchors`] is set),
//! * two headings that produce the same anchor slug.
//!
//! Those are logged with `tracing::warn!` and recorded in
//! [`crate::output::ReportStats`] so callers can still inspect them.

use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the docpress library.
#[derive(Debug, Error)]
pub enum ReportError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// Input file was not found at the given path.
    #[error("Markdown file not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    /// The file exists but reading it failed part-way.
    #[error("Failed to read '{path}': {source}")]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file is not UTF-8 encoded text.
    #[error("'{path}' is not valid UTF-8 text")]
    InvalidUtf8 { path: PathBuf },

    // ── Assembly errors ───────────────────────────────────────────────────
    /// A diagram anchor was not found and strict anchors are enabled.
    #[error("Anchor for diagram '{diagram}' not found: {anchor}\nThe source document may have changed; drop --strict-anchors to skip it.")]
    AnchorNotFound { diagram: String, anchor: String },

    // ── I/O errors ────────────────────────────────────────────────────────
    /// Could not create or write an output file.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Browser errors ────────────────────────────────────────────────────
    /// No headless browser was configured and none could be discovered.
    #[error("No headless browser found.\n{hint}")]
    BrowserNotFound { hint: String },

    /// The browser binary exists but could not be started.
    #[error("Failed to launch browser '{binary}': {source}")]
    BrowserLaunchFailed {
        binary: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The browser did not finish within the configured timeout.
    #[error("Browser did not finish printing within {secs}s\nIncrease --timeout or check that the browser runs headless.")]
    BrowserTimeout { secs: u64 },

    /// The browser returned but the PDF is not on disk.
    #[error(
        "PDF was not created at '{pdf}'\n\
Try opening the HTML file directly in Chrome and printing to PDF:\n  {html}"
    )]
    PdfNotCreated { pdf: PathBuf, html: PathBuf },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}
