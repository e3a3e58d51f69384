//! Pipeline stages for Markdown-to-PDF report generation.
//!
//! Each submodule implements exactly one transformation step, so each can be
//! tested on its own and swapped without touching the others (for example a
//! different PDF backend behind [`render`]).
//!
//! ## Data Flow
//!
//! ```text
//! input ──▶ headings ──▶ markdown ──▶ postprocess ──▶ assemble ──▶ render
//! (read)     (TOC)        (events)     (passes)       (document)   (browser)
//! ```
//!
//! 1. [`input`]       — read the UTF-8 Markdown source
//! 2. [`headings`]    — extract `##`/`###` headings, slugify, render the TOC
//! 3. [`markdown`]    — parse to a pulldown-cmark event document with
//!    heading ids, and serialise it back to HTML
//! 4. [`postprocess`] — ordered rewrite passes over the event document
//!    (H1 removal, diagrams, callouts, checkboxes, section numbers, code labels)
//! 5. [`assemble`]    — cover page and the final standalone HTML document
//! 6. [`render`]      — drive a headless Chromium-family browser to print
//!    the HTML to PDF; the only stage that spawns a process

pub mod assemble;
pub mod headings;
pub mod input;
pub mod markdown;
pub mod postprocess;
pub mod render;

/// Escape text for use in HTML element content or a double-quoted attribute.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}
