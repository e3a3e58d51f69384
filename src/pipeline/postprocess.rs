//! Post-processing: report styling applied to the converted document.
//!
//! Every rule is a pass over the pulldown-cmark event document
//! (`Vec<Event> → Vec<Event>`) and matches on what a node *is* (a level-2
//! heading, a fenced block tagged `mermaid`, a paragraph opening with a
//! bold `Note:`), never on how a particular converter happens to print it.
//! New markup is spliced in as raw `Html`/`InlineHtml` events, which later
//! passes treat as opaque.
//!
//! ## Rule Order
//!
//! 1. Strip the first H1 (and a thematic break right after it); the cover
//!    page carries the title instead
//! 2. Replace the first `mermaid` `graph` block with the architecture diagram
//! 3. Splice flow diagrams in at their anchors
//! 4. Wrap `**Important:**`-style paragraphs in callout boxes
//! 5. Turn `[ ]` / `[x]` markers into styled checkbox spans
//! 6. Section numbers, page breaks and rules for level-2 headings
//! 7. Language badges on fenced code blocks
//!
//! Diagram anchors are located before callouts and section numbering
//! rewrite the events around them. Numbering is guarded by the
//! `section-heading` class, so running the chain twice does not number a
//! heading twice.

use crate::config::{Anchor, DiagramInjection, ReportConfig};
use crate::error::ReportError;
use crate::output::EnhanceReport;
use crate::pipeline::escape_html;
use crate::pipeline::markdown::{closing_index, plain_text};
use crate::templates::{CHECKBOX_CHECKED, CHECKBOX_UNCHECKED, SECTION_BREAK, SECTION_RULE};
use once_cell::sync::Lazy;
use pulldown_cmark::{CodeBlockKind, CowStr, Event, HeadingLevel, Tag, TagEnd};
use regex::Regex;
use tracing::{debug, warn};

/// Class added to every processed level-2 heading.
pub const SECTION_HEADING_CLASS: &str = "section-heading";

/// Run all passes in order.
///
/// Fails only when a flow-diagram anchor is missing and
/// [`ReportConfig::strict_anchors`] is set; otherwise a missing anchor is
/// logged and listed in [`EnhanceReport::diagrams_skipped`].
pub fn enhance<'a>(
    events: Vec<Event<'a>>,
    config: &ReportConfig,
) -> Result<(Vec<Event<'a>>, EnhanceReport), ReportError> {
    let mut report = EnhanceReport::default();
    let transform = |name: &str| {
        debug!("Transform: {}", name);
        if let Some(cb) = &config.progress_callback {
            cb.on_transform(name);
        }
    };

    transform("Removing redundant H1 heading");
    let (events, removed) = strip_first_h1(events);
    report.removed_h1 = removed;

    transform("Injecting architecture diagram");
    let events = match &config.architecture_diagram {
        Some(fragment) => {
            let (events, replaced) = replace_architecture_diagram(events, fragment);
            report.architecture_diagram = replaced;
            events
        }
        None => events,
    };

    transform("Injecting flow diagrams");
    let mut events = events;
    for diagram in &config.flow_diagrams {
        match inject_diagram(events, diagram) {
            (next, true) => {
                events = next;
                report.diagrams_injected.push(diagram.name.clone());
            }
            (next, false) => {
                if config.strict_anchors {
                    return Err(ReportError::AnchorNotFound {
                        diagram: diagram.name.clone(),
                        anchor: diagram.anchor.to_string(),
                    });
                }
                warn!(
                    "Diagram '{}' skipped: anchor not found ({})",
                    diagram.name, diagram.anchor
                );
                events = next;
                report.diagrams_skipped.push(diagram.name.clone());
            }
        }
    }

    transform("Adding callout boxes");
    let (events, callouts) = add_callouts(events);
    report.callouts = callouts;

    transform("Converting checkbox lists");
    let (events, checkboxes) = style_checkboxes(events);
    report.checkboxes = checkboxes;

    transform("Adding section numbers and rules");
    let (events, numbered, headings) = number_sections(events);
    report.numbered_sections = numbered;
    report.section_headings = headings;

    transform("Adding code language labels");
    let (events, labeled) = label_code_blocks(events);
    report.labeled_code_blocks = labeled;

    debug!("Enhance report: {:?}", report);
    Ok((events, report))
}

fn block_html(fragment: &str) -> Event<'static> {
    let mut html = fragment.to_string();
    if !html.ends_with('\n') {
        html.push('\n');
    }
    Event::Html(html.into())
}

/// First word of a fenced block's info string.
fn fence_language(info: &str) -> Option<&str> {
    info.split_whitespace().next().filter(|l| !l.is_empty())
}

// ── Rule 1: Strip the first H1 ───────────────────────────────────────────────

fn strip_first_h1(mut events: Vec<Event<'_>>) -> (Vec<Event<'_>>, Option<String>) {
    let Some(start) = events.iter().position(|e| {
        matches!(
            e,
            Event::Start(Tag::Heading {
                level: HeadingLevel::H1,
                ..
            })
        )
    }) else {
        return (events, None);
    };

    let end = closing_index(&events, start);
    let title = plain_text(&events[start + 1..end]).trim().to_string();
    let mut drain_end = end;
    if matches!(events.get(end + 1), Some(Event::Rule)) {
        drain_end += 1;
    }
    events.drain(start..=drain_end);
    (events, Some(title))
}

// ── Rule 2: Architecture diagram ─────────────────────────────────────────────

fn replace_architecture_diagram<'a>(
    mut events: Vec<Event<'a>>,
    fragment: &str,
) -> (Vec<Event<'a>>, bool) {
    let found = events.iter().enumerate().find_map(|(i, e)| match e {
        Event::Start(Tag::CodeBlock(CodeBlockKind::Fenced(info)))
            if fence_language(info) == Some("mermaid") =>
        {
            let end = closing_index(&events, i);
            plain_text(&events[i + 1..end])
                .trim_start()
                .starts_with("graph")
                .then_some((i, end))
        }
        _ => None,
    });

    match found {
        Some((start, end)) => {
            events.drain(start..=end);
            events.insert(start, block_html(fragment));
            (events, true)
        }
        None => (events, false),
    }
}

// ── Rule 3: Flow diagrams ────────────────────────────────────────────────────

/// Insert one diagram at its anchor. Returns `false` (and the events
/// unchanged) when the anchor is absent.
fn inject_diagram<'a>(
    mut events: Vec<Event<'a>>,
    diagram: &DiagramInjection,
) -> (Vec<Event<'a>>, bool) {
    match find_anchor(&events, &diagram.anchor) {
        Some(at) => {
            debug!("Injecting '{}' at event {}", diagram.name, at);
            events.insert(at, block_html(&diagram.fragment));
            (events, true)
        }
        None => (events, false),
    }
}

/// Event index the fragment is inserted at.
fn find_anchor(events: &[Event<'_>], anchor: &Anchor) -> Option<usize> {
    match anchor {
        Anchor::AfterParagraphEndingWith(suffix) => {
            let mut i = 0;
            while i < events.len() {
                if matches!(events[i], Event::Start(Tag::Paragraph)) {
                    let end = closing_index(events, i);
                    if plain_text(&events[i + 1..end])
                        .trim_end()
                        .ends_with(suffix.as_str())
                    {
                        return Some(end + 1);
                    }
                    i = end;
                }
                i += 1;
            }
            None
        }
        Anchor::BeforeHeading(target) => events.iter().position(|e| {
            matches!(e, Event::Start(Tag::Heading { id: Some(id), .. }) if &**id == target.as_str())
        }),
    }
}

// ── Rule 4: Callout boxes ────────────────────────────────────────────────────

struct CalloutKind {
    marker: &'static str,
    label: &'static str,
    class: &'static str,
}

const CALLOUT_KINDS: &[CalloutKind] = &[
    CalloutKind { marker: "Important:", label: "Important", class: "important" },
    CalloutKind { marker: "Note:", label: "Note", class: "note" },
    CalloutKind { marker: "Decision:", label: "Decision", class: "note" },
    CalloutKind { marker: "Warning:", label: "Warning", class: "warning" },
    CalloutKind { marker: "Tip:", label: "Tip", class: "tip" },
];

/// Callout kind for a paragraph starting at `i`, if it opens with a bold
/// keyword.
fn callout_kind(events: &[Event<'_>], i: usize) -> Option<&'static CalloutKind> {
    match (events.get(i + 1), events.get(i + 2), events.get(i + 3)) {
        (
            Some(Event::Start(Tag::Strong)),
            Some(Event::Text(keyword)),
            Some(Event::End(TagEnd::Strong)),
        ) => CALLOUT_KINDS.iter().find(|k| k.marker == &**keyword),
        _ => None,
    }
}

fn add_callouts(events: Vec<Event<'_>>) -> (Vec<Event<'_>>, usize) {
    let mut out = Vec::with_capacity(events.len());
    let mut count = 0;
    let mut i = 0;

    while i < events.len() {
        let kind = match events[i] {
            Event::Start(Tag::Paragraph) => callout_kind(&events, i),
            _ => None,
        };
        let Some(kind) = kind else {
            out.push(events[i].clone());
            i += 1;
            continue;
        };

        let end = closing_index(&events, i);
        out.push(Event::Html(
            format!(
                r#"<div class="callout callout-{}"><div class="callout-label">{}</div>"#,
                kind.class, kind.label
            )
            .into(),
        ));
        out.push(Event::Start(Tag::Paragraph));

        // Skip the bold keyword and the whitespace that follows it.
        let mut body = i + 4;
        match events.get(body) {
            Some(Event::SoftBreak) if body < end => body += 1,
            Some(Event::Text(t)) if body < end => {
                let rest = t.trim_start();
                if !rest.is_empty() {
                    out.push(Event::Text(rest.to_string().into()));
                }
                body += 1;
            }
            _ => {}
        }
        out.extend(events[body..=end].iter().cloned());
        out.push(Event::Html("</div>\n".into()));

        count += 1;
        i = end + 1;
    }
    (out, count)
}

// ── Rule 5: Checkboxes ───────────────────────────────────────────────────────

/// Earliest checkbox marker in `text`: byte offset and whether it is ticked.
fn next_marker(text: &str) -> Option<(usize, bool)> {
    ["[ ]", "[x]", "[X]"]
        .iter()
        .filter_map(|m| text.find(m).map(|pos| (pos, *m != "[ ]")))
        .min_by_key(|(pos, _)| *pos)
}

fn split_checkboxes<'a>(text: &str, out: &mut Vec<Event<'a>>) -> usize {
    let mut count = 0;
    let mut rest = text;
    while let Some((pos, checked)) = next_marker(rest) {
        if pos > 0 {
            out.push(Event::Text(rest[..pos].to_string().into()));
        }
        let markup = if checked {
            CHECKBOX_CHECKED
        } else {
            CHECKBOX_UNCHECKED
        };
        out.push(Event::InlineHtml(CowStr::Borrowed(markup)));
        rest = &rest[pos + 3..];
        count += 1;
    }
    if !rest.is_empty() {
        out.push(Event::Text(rest.to_string().into()));
    }
    count
}

/// Replace markers in text nodes. Code blocks and inline code are left alone.
fn style_checkboxes(events: Vec<Event<'_>>) -> (Vec<Event<'_>>, usize) {
    let mut out = Vec::with_capacity(events.len());
    let mut in_code_block = false;
    let mut count = 0;

    for event in events {
        match &event {
            Event::Start(Tag::CodeBlock(_)) => in_code_block = true,
            Event::End(TagEnd::CodeBlock) => in_code_block = false,
            Event::Text(t) if !in_code_block && next_marker(t).is_some() => {
                count += split_checkboxes(t, &mut out);
                continue;
            }
            _ => {}
        }
        out.push(event);
    }
    (out, count)
}

// ── Rule 6: Section numbers and rules ────────────────────────────────────────

static RE_SECTION_NUMBER: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(\d+)\.\s*").unwrap());

/// `"2. Setup"` → `("2", "Setup")`; `"2.5 Limits"` → `("2", "5 Limits")`.
fn split_section_number(text: &str) -> Option<(&str, &str)> {
    let caps = RE_SECTION_NUMBER.captures(text)?;
    let whole = caps.get(0)?;
    let number = caps.get(1)?;
    Some((number.as_str(), &text[whole.end()..]))
}

/// Returns the events, the number of numbered headings, and the number of
/// headings processed.
fn number_sections(events: Vec<Event<'_>>) -> (Vec<Event<'_>>, usize, usize) {
    let mut out = Vec::with_capacity(events.len() + 16);
    let mut numbered = 0;
    let mut processed = 0;
    let mut i = 0;

    while i < events.len() {
        let Event::Start(Tag::Heading {
            level: HeadingLevel::H2,
            id,
            classes,
            attrs,
        }) = &events[i]
        else {
            out.push(events[i].clone());
            i += 1;
            continue;
        };
        if classes.iter().any(|c| &**c == SECTION_HEADING_CLASS) {
            out.push(events[i].clone());
            i += 1;
            continue;
        }

        let end = closing_index(&events, i);
        let mut classes = classes.clone();
        classes.push(CowStr::Borrowed(SECTION_HEADING_CLASS));
        let start = Event::Start(Tag::Heading {
            level: HeadingLevel::H2,
            id: id.clone(),
            classes,
            attrs: attrs.clone(),
        });

        let section = match events.get(i + 1) {
            Some(Event::Text(t)) if i + 1 < end => split_section_number(t),
            _ => None,
        };
        match section {
            Some((number, rest)) => {
                out.push(Event::Html(CowStr::Borrowed(SECTION_BREAK)));
                out.push(start);
                out.push(Event::InlineHtml(
                    format!(r#"<span class="section-number">{number}.</span> "#).into(),
                ));
                if !rest.is_empty() {
                    out.push(Event::Text(rest.to_string().into()));
                }
                out.extend(events[i + 2..=end].iter().cloned());
                numbered += 1;
            }
            None => {
                out.push(start);
                out.extend(events[i + 1..=end].iter().cloned());
            }
        }
        out.push(Event::Html(CowStr::Borrowed(SECTION_RULE)));

        processed += 1;
        i = end + 1;
    }
    (out, numbered, processed)
}

// ── Rule 7: Code language badges ─────────────────────────────────────────────

/// Display name for a fence language. Unknown languages are upper-cased.
pub fn code_label(lang: &str) -> String {
    let known = match lang.to_ascii_lowercase().as_str() {
        "jsx" => "JSX",
        "javascript" | "js" => "JavaScript",
        "json" => "JSON",
        "bash" => "Bash",
        "shell" => "Shell",
        "groq" => "GROQ",
        "typescript" | "ts" => "TypeScript",
        "python" => "Python",
        "html" => "HTML",
        "css" => "CSS",
        _ => return lang.to_uppercase(),
    };
    known.to_string()
}

fn label_code_blocks(events: Vec<Event<'_>>) -> (Vec<Event<'_>>, usize) {
    let mut out = Vec::with_capacity(events.len());
    let mut in_labeled = false;
    let mut count = 0;

    for event in events {
        match &event {
            Event::Start(Tag::CodeBlock(CodeBlockKind::Fenced(info))) => {
                if let Some(lang) = fence_language(info) {
                    out.push(Event::Html(
                        format!(
                            r#"<pre><span class="code-lang">{}</span><code class="language-{}">"#,
                            escape_html(&code_label(lang)),
                            escape_html(lang)
                        )
                        .into(),
                    ));
                    in_labeled = true;
                    count += 1;
                    continue;
                }
            }
            Event::End(TagEnd::CodeBlock) if in_labeled => {
                in_labeled = false;
                out.push(Event::Html(CowStr::Borrowed("</code></pre>\n")));
                continue;
            }
            _ => {}
        }
        out.push(event);
    }
    (out, count)
}
