//! Markdown conversion: source text → event document → HTML.
//!
//! The converter does not hand back an HTML string straight away. It returns
//! the pulldown-cmark event stream (balanced `Start`/`End` tags, adjacent
//! text merged), which is the structured document every post-processing pass
//! rewrites. HTML is produced once, by [`to_html`], after the last pass.
//!
//! Headings without an explicit `{#id}` get an id from
//! [`crate::pipeline::headings::slugify`] so the TOC links resolve.

use crate::pipeline::headings::slugify;
use pulldown_cmark::{html, Event, Options, Parser, Tag, TextMergeStream};

/// Extensions enabled for every document: tables, footnotes, strikethrough
/// and `{#id .class}` heading attributes.
///
/// Task lists are deliberately off: `[ ]` / `[x]` markers stay in the text and
/// are styled by the checkbox pass wherever they appear.
pub fn markdown_options() -> Options {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_FOOTNOTES);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_HEADING_ATTRIBUTES);
    options
}

/// Parse Markdown into the event document with heading ids assigned.
pub fn parse(markdown: &str) -> Vec<Event<'_>> {
    let parser = Parser::new_ext(markdown, markdown_options());
    let events: Vec<Event<'_>> = TextMergeStream::new(parser).collect();
    assign_heading_ids(events)
}

/// Serialise an event document to an HTML fragment.
pub fn to_html<'a>(events: impl IntoIterator<Item = Event<'a>>) -> String {
    let mut out = String::new();
    html::push_html(&mut out, events.into_iter());
    out
}

/// Index of the `End` event closing the `Start` event at `start`.
///
/// Falls back to the last index for a truncated document.
pub fn closing_index(events: &[Event<'_>], start: usize) -> usize {
    let mut depth = 0usize;
    for (offset, event) in events[start..].iter().enumerate() {
        match event {
            Event::Start(_) => depth += 1,
            Event::End(_) => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return start + offset;
                }
            }
            _ => {}
        }
    }
    events.len().saturating_sub(1)
}

/// Visible text of a run of events: text and inline code, breaks as spaces.
pub fn plain_text(events: &[Event<'_>]) -> String {
    let mut text = String::new();
    for event in events {
        match event {
            Event::Text(t) | Event::Code(t) => text.push_str(t),
            Event::SoftBreak | Event::HardBreak => text.push(' '),
            _ => {}
        }
    }
    text
}

fn assign_heading_ids(mut events: Vec<Event<'_>>) -> Vec<Event<'_>> {
    let mut i = 0;
    while i < events.len() {
        if matches!(&events[i], Event::Start(Tag::Heading { id: None, .. })) {
            let end = closing_index(&events, i);
            let slug = slugify(&plain_text(&events[i + 1..end]));
            if !slug.is_empty() {
                if let Event::Start(Tag::Heading { id, .. }) = &mut events[i] {
                    *id = Some(slug.into());
                }
            }
            i = end;
        }
        i += 1;
    }
    events
}
