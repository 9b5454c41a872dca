//! Display layer: turn a [`RenderOutcome`] into terminal text or HTML.
//!
//! Both renderers are pure string builders. Text inside nodes is emitted
//! verbatim (terminal) or entity-escaped (HTML); inline Markdown such as
//! `**bold**` is not interpreted in either.

use crate::report::{DocumentNode, RenderOutcome};
use std::fmt::Write as _;

// ── Terminal ─────────────────────────────────────────────────────────────

struct Palette {
    colored: bool,
}

impl Palette {
    fn paint(&self, code: &str, s: &str) -> String {
        if self.colored {
            format!("\x1b[{code}m{s}\x1b[0m")
        } else {
            s.to_string()
        }
    }
    fn bold(&self, s: &str) -> String {
        self.paint("1", s)
    }
    fn green(&self, s: &str) -> String {
        self.paint("1;32", s)
    }
    fn dim(&self, s: &str) -> String {
        self.paint("2", s)
    }
}

/// Render for a terminal.
///
/// With `colored = false` the output is plain text, suitable for pipes and
/// files. The Empty outcome renders as the empty string.
pub fn to_terminal(outcome: &RenderOutcome, colored: bool) -> String {
    let p = Palette { colored };
    let mut out = String::new();

    match outcome {
        RenderOutcome::Empty => {}
        RenderOutcome::Loading { message, detail } => {
            let _ = writeln!(out, "{}", p.bold(message));
            let _ = writeln!(out, "{}", p.dim(detail));
        }
        RenderOutcome::Report { title, document } => {
            let _ = writeln!(out, "{}", p.green(title));
            let _ = writeln!(out, "{}", p.dim(&"═".repeat(title.chars().count())));
            for node in document {
                match node {
                    DocumentNode::Heading { level: 1, text } => {
                        let _ = writeln!(out, "{}", p.bold(&text.to_uppercase()));
                    }
                    DocumentNode::Heading { level: 2, text } => {
                        let _ = writeln!(out, "{}", p.bold(text));
                    }
                    DocumentNode::Heading { text, .. } => {
                        let _ = writeln!(out, "{}", p.paint("4", text));
                    }
                    DocumentNode::List { items } => {
                        for item in items {
                            let _ = writeln!(out, "  • {}", item.text);
                        }
                    }
                    DocumentNode::ListItem(item) => {
                        let _ = writeln!(out, "  • {}", item.text);
                    }
                    DocumentNode::Paragraph { text } => {
                        let _ = writeln!(out, "{text}");
                    }
                    DocumentNode::Spacer => out.push('\n'),
                }
            }
        }
    }

    out
}

// ── HTML ─────────────────────────────────────────────────────────────────

/// Escape text for HTML element content and attribute values.
pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

/// Render an HTML fragment.
///
/// Lists become `<ul>` with nested `<li>`; blank lines become `<br>`.
pub fn to_html(outcome: &RenderOutcome) -> String {
    let mut out = String::new();

    match outcome {
        RenderOutcome::Empty => {}
        RenderOutcome::Loading { message, detail } => {
            out.push_str("<div class=\"analysis-loading\" role=\"status\">\n");
            let _ = writeln!(out, "  <p>{}</p>", escape_html(message));
            let _ = writeln!(out, "  <p class=\"detail\">{}</p>", escape_html(detail));
            out.push_str("</div>\n");
        }
        RenderOutcome::Report { title, document } => {
            out.push_str("<div class=\"analysis-report\">\n");
            let _ = writeln!(out, "  <h2 class=\"report-title\">{}</h2>", escape_html(title));
            out.push_str("  <div class=\"report-body\">\n");
            for node in document {
                match node {
                    DocumentNode::Heading { level, text } => {
                        let _ = writeln!(out, "    <h{level}>{}</h{level}>", escape_html(text));
                    }
                    DocumentNode::List { items } => {
                        out.push_str("    <ul>\n");
                        for item in items {
                            let _ = writeln!(out, "      <li>{}</li>", escape_html(&item.text));
                        }
                        out.push_str("    </ul>\n");
                    }
                    DocumentNode::ListItem(item) => {
                        let _ = writeln!(out, "    <ul><li>{}</li></ul>", escape_html(&item.text));
                    }
                    DocumentNode::Paragraph { text } => {
                        let _ = writeln!(out, "    <p>{}</p>", escape_html(text));
                    }
                    DocumentNode::Spacer => out.push_str("    <br>\n"),
                }
            }
            out.push_str("  </div>\n</div>\n");
        }
    }

    out
}
