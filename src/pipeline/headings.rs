//! Heading extraction and table-of-contents rendering.
//!
//! Every top-level `##` / `###` heading becomes one [`HeadingRecord`] in
//! document order. Records are read off the same event document the
//! converter produces ([`crate::pipeline::markdown::parse`]), so the title is
//! the heading's visible text (links, emphasis and entities resolved) and the
//! slug is exactly the id stamped onto the heading. Every TOC link resolves.

use crate::pipeline::escape_html;
use crate::pipeline::markdown::{closing_index, parse, plain_text};
use once_cell::sync::Lazy;
use pulldown_cmark::{Event, HeadingLevel, Tag};
use regex::Regex;
use std::collections::HashSet;
use tracing::warn;

/// One table-of-contents entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeadingRecord {
    /// 2 or 3.
    pub level: u8,
    /// Visible heading text (inline markup removed).
    pub title: String,
    /// Anchor id the entry links to.
    pub slug: String,
}

static RE_SLUG_SEPARATORS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^a-z0-9]+").unwrap());

/// Derive an anchor id: lower-case, every run of non-alphanumerics becomes a
/// single hyphen, leading/trailing hyphens trimmed.
///
/// ```
/// assert_eq!(docpress::pipeline::headings::slugify("1. Foo Bar"), "1-foo-bar");
/// ```
pub fn slugify(text: &str) -> String {
    let lower = text.to_lowercase();
    RE_SLUG_SEPARATORS
        .replace_all(&lower, "-")
        .trim_matches('-')
        .to_string()
}

/// Scan Markdown for level-2 and level-3 headings.
///
/// Headings inside code blocks, block quotes and lists are ignored. Repeated
/// slugs are kept (both entries link to the first matching anchor) and
/// reported by [`duplicate_slugs`].
pub fn extract_headings(markdown: &str) -> Vec<HeadingRecord> {
    let records = heading_records(&parse(markdown));

    let dups = duplicate_slugs(&records);
    if !dups.is_empty() {
        warn!(
            "{} heading slug(s) repeat; TOC links for them point at the first occurrence: {}",
            dups.len(),
            dups.join(", ")
        );
    }
    records
}

/// Top-level H2/H3 headings of an event document with ids already assigned.
fn heading_records(events: &[Event<'_>]) -> Vec<HeadingRecord> {
    let mut records = Vec::new();
    let mut depth = 0usize;
    let mut i = 0;

    while i < events.len() {
        match &events[i] {
            Event::Start(Tag::Heading { level, id, .. })
                if depth == 0 && matches!(level, HeadingLevel::H2 | HeadingLevel::H3) =>
            {
                let end = closing_index(events, i);
                let title = plain_text(&events[i + 1..end]).trim().to_string();
                let slug = match id {
                    Some(id) => id.to_string(),
                    None => slugify(&title),
                };
                records.push(HeadingRecord {
                    level: if *level == HeadingLevel::H2 { 2 } else { 3 },
                    title,
                    slug,
                });
                i = end + 1;
                continue;
            }
            Event::Start(_) => depth += 1,
            Event::End(_) => depth = depth.saturating_sub(1),
            _ => {}
        }
        i += 1;
    }
    records
}

/// Slugs that appear more than once, in first-repeat order.
pub fn duplicate_slugs(records: &[HeadingRecord]) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut dups = Vec::new();
    for r in records {
        if !seen.insert(r.slug.as_str()) && !dups.contains(&r.slug) {
            dups.push(r.slug.clone());
        }
    }
    dups
}

/// Render the table-of-contents page.
///
/// Level-2 headings become bold top-level entries (`level-1`), level-3
/// headings indented sub-entries (`level-2`). Pagination is left to the
/// stylesheet's two-column layout.
pub fn render_toc(records: &[HeadingRecord], toc_title: &str) -> String {
    let mut html = String::with_capacity(128 + records.len() * 96);
    html.push_str("<div class=\"toc-page\">\n");
    html.push_str(&format!("  <h2>{}</h2>\n", escape_html(toc_title)));
    html.push_str("  <div class=\"toc-underline\"></div>\n");
    html.push_str("  <div class=\"toc-columns\">\n");

    for r in records {
        html.push_str(&format!(
            "    <div class=\"toc-section level-{}\"><a href=\"#{}\">{}</a></div>\n",
            r.level.saturating_sub(1),
            escape_html(&r.slug),
            escape_html(&r.title)
        ));
    }

    html.push_str("  </div>\n");
    html.push_str("</div>\n");
    html
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(level: u8, title: &str, slug: &str) -> HeadingRecord {
        HeadingRecord {
            level,
            title: title.into(),
            slug: slug.into(),
        }
    }

    #[test]
    fn numbered_heading_record() {
        let recs = extract_headings("## 1. Foo Bar\n");
        assert_eq!(recs, vec![record(2, "1. Foo Bar", "1-foo-bar")]);
    }

    #[test]
    fn only_levels_two_and_three() {
        let md = "# Title\n## A\n### B\n#### C\n##NoSpace\n\n> ## Quoted\n";
        let recs = extract_headings(md);
        let levels: Vec<u8> = recs.iter().map(|r| r.level).collect();
        assert_eq!(levels, vec![2, 3]);
        assert_eq!(recs[1].slug, "b");
    }

    #[test]
    fn slug_collapses_and_trims() {
        assert_eq!(slugify("  E. Newsletter Flow!! "), "e-newsletter-flow");
        assert_eq!(slugify("F. Local vs Production Behavior"), "f-local-vs-production-behavior");
        assert_eq!(slugify("C++ / Rust"), "c-rust");
        assert_eq!(slugify("---"), "");
    }

    #[test]
    fn fenced_code_is_skipped() {
        let md = "## Real\n```bash\n## not a heading\n```\n~~~\n### also not\n~~~\n### After\n";
        let titles: Vec<String> = extract_headings(md).into_iter().map(|r| r.title).collect();
        assert_eq!(titles, vec!["Real", "After"]);
    }

    #[test]
    fn explicit_id_and_closing_hashes() {
        let recs = extract_headings("## Setup Guide {#setup}\n### Notes ###\n");
        assert_eq!(recs[0], record(2, "Setup Guide", "setup"));
        assert_eq!(recs[1], record(3, "Notes", "notes"));
    }

    #[test]
    fn title_and_slug_follow_rendered_text() {
        let recs = extract_headings(
            "## See [the docs](https://example.com/x)\n### Q&amp;A\n## Using *fast* `cargo`\n",
        );
        assert_eq!(recs[0], record(2, "See the docs", "see-the-docs"));
        assert_eq!(recs[1], record(3, "Q&A", "q-a"));
        assert_eq!(recs[2], record(2, "Using fast cargo", "using-fast-cargo"));
    }

    #[test]
    fn slugs_match_converter_ids() {
        use crate::pipeline::markdown::to_html;
        let md = "## See [docs](url)\n### Q&amp;A\n## Setup {#custom}\n## **Bold** _em_\n";
        let html = to_html(parse(md));
        for r in extract_headings(md) {
            assert!(html.contains(&format!("id=\"{}\"", r.slug)), "{} missing in {html}", r.slug);
        }
    }

    #[test]
    fn duplicates_are_kept_and_reported() {
        let recs = extract_headings("## Intro\n### Intro\n## Other\n");
        assert_eq!(recs.len(), 3);
        assert_eq!(duplicate_slugs(&recs), vec!["intro".to_string()]);
    }

    #[test]
    fn toc_levels_and_links() {
        let html = render_toc(
            &[record(2, "1. Intro", "1-intro"), record(3, "Setup & Run", "setup-run")],
            "Table of Contents",
        );
        assert!(html.contains(r##"<div class="toc-section level-1"><a href="#1-intro">1. Intro</a></div>"##));
        assert!(html.contains(r##"<div class="toc-section level-2"><a href="#setup-run">Setup &amp; Run</a></div>"##));
        assert!(html.contains("<h2>Table of Contents</h2>"));
    }

    #[test]
    fn empty_toc_still_renders_page() {
        let html = render_toc(&[], "Contents");
        assert!(html.starts_with("<div class=\"toc-page\">"));
        assert!(!html.contains("toc-section"));
    }
}
