//! Static assets embedded into every report.
//!
//! The stylesheet and the diagram fragments are authored as plain files under
//! `assets/` and compiled in with `include_str!`, so they can be edited with
//! normal CSS/HTML tooling and diffed like source code. Callers override them
//! through [`crate::config::ReportConfig`]; the constants here are used only
//! when no override is provided.

/// Default stylesheet for the assembled document (cover, TOC, content).
pub const REPORT_CSS: &str = include_str!("../assets/report.css");

/// Box-and-arrow architecture overview that replaces the first
/// `mermaid` `graph` block.
pub const ARCHITECTURE_DIAGRAM: &str = include_str!("../assets/diagrams/architecture.html");

/// Donation payment flow.
pub const PAYMENT_FLOW_DIAGRAM: &str = include_str!("../assets/diagrams/payment_flow.html");

/// Newsletter signup flow.
pub const NEWSLETTER_FLOW_DIAGRAM: &str = include_str!("../assets/diagrams/newsletter_flow.html");

/// CMS content publishing flow.
pub const CONTENT_FLOW_DIAGRAM: &str = include_str!("../assets/diagrams/content_flow.html");

/// Markup for an empty checkbox marker.
pub const CHECKBOX_UNCHECKED: &str = r#"<span class="checkbox-box"></span>"#;

/// Markup for a ticked checkbox marker.
pub const CHECKBOX_CHECKED: &str = r#"<span class="checkbox-box checked"></span>"#;

/// Forced page break emitted before a numbered section heading.
pub const SECTION_BREAK: &str = "<div class=\"section-break\"></div>\n";

/// Accent rule emitted after every section heading.
pub const SECTION_RULE: &str = "<hr class=\"section-rule\">\n";
