//! Report rendering: raw model text → structured [`Document`].
//!
//! The model answers in loosely formatted Markdown. Rather than pull in a full
//! CommonMark parser we recognise exactly the constructs the system prompt asks
//! for and treat everything else as a paragraph:
//!
//! ```text
//! "### " → Heading3      "* " / "- " → ListItem
//! "## "  → Heading2      ""          → Blank (Spacer)
//! "# "   → Heading1      anything    → Paragraph
//! ```
//!
//! Rendering is two steps. Each trimmed line is classified on its own
//! ([`parse_line`]); then a single left fold ([`group_lists`]) collapses runs
//! of list items into one [`DocumentNode::List`]. Inline markup such as
//! `**bold**` is passed through untouched.
//!
//! [`render`] is pure and never fails, so it is safe to call on every redraw.

use serde::Serialize;

/// Title shown above every rendered report.
pub const REPORT_TITLE: &str = "Analysis Report";

/// Primary text of the in-progress view.
pub const LOADING_MESSAGE: &str = "Analyzing your plant...";

/// Secondary text of the in-progress view.
pub const LOADING_DETAIL: &str = "This may take a few moments.";

/// Classification of one trimmed line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum LineKind {
    Heading1,
    Heading2,
    Heading3,
    ListItem,
    Blank,
    Paragraph,
}

impl LineKind {
    /// Classify a line by its leading marker.
    ///
    /// Longer heading markers are tested first: `"### x"` also starts with
    /// `"#"`, and must not be read as a lower-level heading.
    pub fn classify(line: &str) -> Self {
        if line.starts_with("### ") {
            LineKind::Heading3
        } else if line.starts_with("## ") {
            LineKind::Heading2
        } else if line.starts_with("# ") {
            LineKind::Heading1
        } else if line.starts_with("* ") || line.starts_with("- ") {
            LineKind::ListItem
        } else if line.is_empty() {
            LineKind::Blank
        } else {
            LineKind::Paragraph
        }
    }

    /// Byte length of the marker stripped before the text is kept.
    fn marker_len(self) -> usize {
        match self {
            LineKind::Heading1 | LineKind::ListItem => 2,
            LineKind::Heading2 => 3,
            LineKind::Heading3 => 4,
            LineKind::Blank | LineKind::Paragraph => 0,
        }
    }
}

/// One bullet of a list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ListItem {
    pub text: String,
}

impl ListItem {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

/// A rendered unit of the report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DocumentNode {
    /// Heading of level 1–3.
    Heading { level: u8, text: String },
    /// A single bullet before grouping. Never present in a [`Document`].
    ListItem(ListItem),
    /// One or more consecutive bullets, in source order.
    List { items: Vec<ListItem> },
    Paragraph { text: String },
    /// A blank source line.
    Spacer,
}

/// Turn one line into its ungrouped node.
pub fn parse_line(line: &str) -> DocumentNode {
    let line = line.trim();
    let kind = LineKind::classify(line);
    // Every marker is ASCII, so slicing at `marker_len` is on a char boundary.
    let rest = &line[kind.marker_len()..];

    match kind {
        LineKind::Heading1 => DocumentNode::Heading {
            level: 1,
            text: rest.to_string(),
        },
        LineKind::Heading2 => DocumentNode::Heading {
            level: 2,
            text: rest.to_string(),
        },
        LineKind::Heading3 => DocumentNode::Heading {
            level: 3,
            text: rest.to_string(),
        },
        LineKind::ListItem => DocumentNode::ListItem(ListItem::new(rest.trim())),
        LineKind::Blank => DocumentNode::Spacer,
        LineKind::Paragraph => DocumentNode::Paragraph {
            text: rest.to_string(),
        },
    }
}

/// Collapse runs of [`DocumentNode::ListItem`] into [`DocumentNode::List`].
///
/// A list item joins the list immediately before it in the output; any other
/// node (including a [`DocumentNode::Spacer`]) ends the run.
pub fn group_lists<I>(nodes: I) -> Vec<DocumentNode>
where
    I: IntoIterator<Item = DocumentNode>,
{
    nodes.into_iter().fold(Vec::new(), |mut out, node| {
        match node {
            DocumentNode::ListItem(item) => match out.last_mut() {
                Some(DocumentNode::List { items }) => items.push(item),
                _ => out.push(DocumentNode::List { items: vec![item] }),
            },
            other => out.push(other),
        }
        out
    })
}

/// A rendered report: an ordered sequence of grouped nodes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Document {
    nodes: Vec<DocumentNode>,
}

impl Document {
    /// Parse a raw report.
    ///
    /// Empty input yields a single [`DocumentNode::Spacer`], the same as one
    /// blank line.
    pub fn parse(raw: &str) -> Self {
        Self {
            nodes: group_lists(raw.split('\n').map(parse_line)),
        }
    }

    pub fn nodes(&self) -> &[DocumentNode] {
        &self.nodes
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, DocumentNode> {
        self.nodes.iter()
    }
}

impl<'a> IntoIterator for &'a Document {
    type Item = &'a DocumentNode;
    type IntoIter = std::slice::Iter<'a, DocumentNode>;

    fn into_iter(self) -> Self::IntoIter {
        self.nodes.iter()
    }
}

/// What the display layer should show.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "view", rename_all = "snake_case")]
pub enum RenderOutcome {
    /// A request is in flight.
    Loading {
        message: &'static str,
        detail: &'static str,
    },
    /// No report yet and nothing loading: show nothing.
    Empty,
    /// A finished report.
    Report {
        title: &'static str,
        document: Document,
    },
}

/// Render the current state of an analysis.
///
/// `is_loading` wins over everything, including a completed report.
pub fn render(raw: Option<&str>, is_loading: bool) -> RenderOutcome {
    if is_loading {
        return RenderOutcome::Loading {
            message: LOADING_MESSAGE,
            detail: LOADING_DETAIL,
        };
    }

    match raw {
        None => RenderOutcome::Empty,
        Some(raw) => RenderOutcome::Report {
            title: REPORT_TITLE,
            document: Document::parse(raw),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn list(items: &[&str]) -> DocumentNode {
        DocumentNode::List {
            items: items.iter().map(|t| ListItem::new(*t)).collect(),
        }
    }

    fn para(text: &str) -> DocumentNode {
        DocumentNode::Paragraph { text: text.into() }
    }

    fn heading(level: u8, text: &str) -> DocumentNode {
        DocumentNode::Heading {
            level,
            text: text.into(),
        }
    }

    #[test]
    fn classify_table() {
        assert_eq!(LineKind::classify("# A"), LineKind::Heading1);
        assert_eq!(LineKind::classify("## A"), LineKind::Heading2);
        assert_eq!(LineKind::classify("### A"), LineKind::Heading3);
        assert_eq!(LineKind::classify("* A"), LineKind::ListItem);
        assert_eq!(LineKind::classify("- A"), LineKind::ListItem);
        assert_eq!(LineKind::classify(""), LineKind::Blank);
        assert_eq!(LineKind::classify("plain"), LineKind::Paragraph);
    }

    #[test]
    fn markers_need_trailing_space() {
        assert_eq!(LineKind::classify("#Title"), LineKind::Paragraph);
        assert_eq!(LineKind::classify("####  deep"), LineKind::Paragraph);
        assert_eq!(LineKind::classify("*emphasis*"), LineKind::Paragraph);
        assert_eq!(LineKind::classify("-5 degrees"), LineKind::Paragraph);
        assert_eq!(LineKind::classify("**Name:** Rust"), LineKind::Paragraph);
    }

    #[test]
    fn heading3_precedence() {
        assert_eq!(parse_line("### Minor"), heading(3, "Minor"));
        assert_eq!(parse_line("## Major"), heading(2, "Major"));
        assert_eq!(parse_line("# Title"), heading(1, "Title"));
    }

    #[test]
    fn parse_line_trims_and_strips() {
        assert_eq!(parse_line("   - padded   "), list_item("padded"));
        assert_eq!(parse_line("*    spaced"), list_item("spaced"));
        assert_eq!(parse_line("  text  "), para("text"));
        assert_eq!(parse_line("   "), DocumentNode::Spacer);
        assert_eq!(parse_line("\t\r"), DocumentNode::Spacer);
    }

    fn list_item(text: &str) -> DocumentNode {
        DocumentNode::ListItem(ListItem::new(text))
    }

    #[test]
    fn bare_marker_after_trim_is_paragraph() {
        // "- " trims to "-", which has no trailing space left.
        assert_eq!(parse_line("- "), para("-"));
        assert_eq!(parse_line("# "), para("#"));
    }

    #[test]
    fn heading_text_keeps_extra_spaces() {
        assert_eq!(parse_line("##  Spaced"), heading(2, " Spaced"));
    }

    #[test]
    fn mixed_markers_group_in_order() {
        let doc = Document::parse("* a\n* b\n- c");
        assert_eq!(doc.nodes(), &[list(&["a", "b", "c"])]);
    }

    #[test]
    fn blank_line_splits_lists() {
        let doc = Document::parse("* a\n\n* b");
        assert_eq!(
            doc.nodes(),
            &[list(&["a"]), DocumentNode::Spacer, list(&["b"])]
        );
    }

    #[test]
    fn paragraph_splits_lists() {
        let doc = Document::parse("- a\nbetween\n- b");
        assert_eq!(doc.nodes(), &[list(&["a"]), para("between"), list(&["b"])]);
    }

    #[test]
    fn empty_input_is_one_spacer() {
        assert_eq!(Document::parse("").nodes(), &[DocumentNode::Spacer]);
    }

    #[test]
    fn trailing_newline_adds_spacer() {
        let doc = Document::parse("# Heading\n## Subheading\n### Minor\n* List item\n- Another item\n");
        assert_eq!(
            doc.nodes(),
            &[
                heading(1, "Heading"),
                heading(2, "Subheading"),
                heading(3, "Minor"),
                list(&["List item", "Another item"]),
                DocumentNode::Spacer,
            ]
        );
    }

    #[test]
    fn inline_markup_is_literal() {
        let doc = Document::parse("* **Name:** Powdery mildew\n`code` and [link](x)");
        assert_eq!(
            doc.nodes(),
            &[
                list(&["**Name:** Powdery mildew"]),
                para("`code` and [link](x)"),
            ]
        );
    }

    #[test]
    fn no_adjacent_lists_and_no_bare_items() {
        let inputs = [
            "",
            "* a",
            "* a\n- b\n\n- c\n# h\n* d\n* e",
            "- \n- x\n-y\n* z",
            "\n\n\n* a\n\n\n",
            "para\n* a\npara\n* b\n* c\n",
        ];
        for raw in inputs {
            let doc = Document::parse(raw);
            for pair in doc.nodes().windows(2) {
                let both_lists = matches!(pair[0], DocumentNode::List { .. })
                    && matches!(pair[1], DocumentNode::List { .. });
                assert!(!both_lists, "adjacent lists for {raw:?}: {doc:?}");
            }
            assert!(
                !doc.iter().any(|n| matches!(n, DocumentNode::ListItem(_))),
                "bare list item for {raw:?}"
            );
        }
    }

    #[test]
    fn node_count_matches_lines_minus_merges() {
        let raw = "# A\n* 1\n* 2\n* 3\n\ntext";
        let doc = Document::parse(raw);
        // 6 lines, three items merged into one list.
        assert_eq!(doc.len(), 4);
    }

    #[test]
    fn render_loading_wins() {
        let expected = RenderOutcome::Loading {
            message: LOADING_MESSAGE,
            detail: LOADING_DETAIL,
        };
        assert_eq!(render(None, true), expected);
        assert_eq!(render(Some(""), true), expected);
        assert_eq!(render(Some("# Done\n* healthy"), true), expected);
    }

    #[test]
    fn render_none_is_empty() {
        assert_eq!(render(None, false), RenderOutcome::Empty);
    }

    #[test]
    fn render_empty_string_is_report_with_spacer() {
        match render(Some(""), false) {
            RenderOutcome::Report { title, document } => {
                assert_eq!(title, REPORT_TITLE);
                assert_eq!(document.nodes(), &[DocumentNode::Spacer]);
            }
            other => panic!("expected report, got {other:?}"),
        }
    }

    #[test]
    fn serializes_with_type_tags() {
        let doc = Document::parse("## Assessment\n* ok");
        let json = serde_json::to_value(&doc).unwrap();
        assert_eq!(json[0]["type"], "heading");
        assert_eq!(json[0]["level"], 2);
        assert_eq!(json[1]["type"], "list");
        assert_eq!(json[1]["items"][0]["text"], "ok");
    }
}
