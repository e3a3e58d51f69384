//! Document assembly: cover page plus the final standalone HTML file.
//!
//! The assembled document is self-contained (stylesheet embedded in a
//! `<style>` block, no external resources), so a browser can print it from a
//! `file://` URL without network access.

use crate::config::CoverPage;
use crate::pipeline::escape_html;

/// Render the full-bleed cover page. Parts that are `None` are omitted; the
/// title is always present.
pub fn render_cover(cover: &CoverPage, title: &str) -> String {
    let mut html = String::with_capacity(512);
    html.push_str("<div class=\"cover-page\">\n");
    html.push_str("    <div class=\"cover-accent-line\"></div>\n");
    if let Some(org) = &cover.org {
        html.push_str(&format!("    <div class=\"cover-org\">{}</div>\n", escape_html(org)));
    }
    html.push_str(&format!(
        "    <div class=\"cover-title\">{}</div>\n",
        escape_html(title)
    ));
    if let Some(subtitle) = &cover.subtitle {
        html.push_str(&format!(
            "    <div class=\"cover-subtitle\">{}</div>\n",
            escape_html(subtitle)
        ));
    }
    if let Some(tagline) = &cover.tagline {
        html.push_str(&format!(
            "    <div class=\"cover-tagline\">{}</div>\n",
            escape_html(tagline)
        ));
    }
    if !cover.meta.is_empty() {
        html.push_str("    <div class=\"cover-meta\">\n");
        for (label, value) in &cover.meta {
            html.push_str(&format!(
                "        <strong>{}:</strong> {}<br>\n",
                escape_html(label),
                escape_html(value)
            ));
        }
        html.push_str("    </div>\n");
    }
    html.push_str("</div>\n");
    html
}

/// The pieces of the final document, in page order.
#[derive(Debug, Clone, Copy)]
pub struct DocumentParts<'a> {
    pub title: &'a str,
    pub stylesheet: &'a str,
    pub cover: &'a str,
    /// Empty when the TOC is disabled.
    pub toc: &'a str,
    pub content: &'a str,
}

/// Wrap cover, TOC and content in a complete HTML5 document.
///
/// Content is placed inside `<div class="doc-content">`, which the
/// stylesheet uses to scope body typography away from the cover and TOC.
pub fn assemble_document(parts: DocumentParts<'_>) -> String {
    let mut html = String::with_capacity(
        parts.stylesheet.len() + parts.cover.len() + parts.toc.len() + parts.content.len() + 512,
    );
    html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n");
    html.push_str("<meta charset=\"UTF-8\">\n");
    html.push_str("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\">\n");
    html.push_str(&format!("<title>{}</title>\n", escape_html(parts.title)));
    html.push_str("<style>\n");
    html.push_str(parts.stylesheet);
    html.push_str("\n</style>\n</head>\n<body>\n\n");
    html.push_str(parts.cover);
    html.push('\n');
    if !parts.toc.is_empty() {
        html.push_str(parts.toc);
        html.push('\n');
    }
    html.push_str("<div class=\"doc-content\">\n");
    html.push_str(parts.content);
    html.push_str("</div>\n\n</body>\n</html>\n");
    html
}
