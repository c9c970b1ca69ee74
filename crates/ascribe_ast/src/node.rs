//! Block and inline node definitions.
//!
//! Nodes are plain owned values so a parsed [`Document`](crate::Document)
//! can be shared between threads behind an `Arc` and cached independently
//! of the source it was parsed from.

use serde::Serialize;

use crate::Span;

/// An inline element inside a paragraph, title or list item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Inline {
    /// Literal text. Not yet escaped for any output format.
    Text { value: String },
    /// `*strong*`
    Strong { children: Vec<Inline> },
    /// `_emphasis_`
    Emphasis { children: Vec<Inline> },
    /// `` `monospace` ``
    Monospace { children: Vec<Inline> },
    /// A URL or `link:` macro. Empty children render the URL itself.
    Link { url: String, children: Vec<Inline> },
    /// `<<target>>`, `<<target,text>>` or `xref:target[text]`.
    ///
    /// Empty children mean the text is taken from the referenced section.
    CrossReference {
        target: String,
        children: Vec<Inline>,
    },
    /// Hard line break (` +` at the end of a line).
    LineBreak,
}

impl Inline {
    /// Creates a text inline.
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text {
            value: value.into(),
        }
    }

    /// Returns the child inlines of a formatting node.
    pub fn children(&self) -> &[Inline] {
        match self {
            Inline::Strong { children }
            | Inline::Emphasis { children }
            | Inline::Monospace { children }
            | Inline::Link { children, .. }
            | Inline::CrossReference { children, .. } => children,
            Inline::Text { .. } | Inline::LineBreak => &[],
        }
    }
}

/// Collects the plain text of a run of inlines, dropping all formatting.
///
/// Links without text contribute their URL, cross references without text
/// contribute their target.
pub fn plain_text(inlines: &[Inline]) -> String {
    let mut out = String::new();
    push_plain_text(inlines, &mut out);
    out
}

fn push_plain_text(inlines: &[Inline], out: &mut String) {
    for inline in inlines {
        match inline {
            Inline::Text { value } => out.push_str(value),
            Inline::LineBreak => out.push('\n'),
            Inline::Link { url, children } if children.is_empty() => out.push_str(url),
            Inline::CrossReference { target, children } if children.is_empty() => {
                out.push_str(target)
            }
            other => push_plain_text(other.children(), out),
        }
    }
}

/// A block-level node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Block {
    Section(Section),
    Paragraph(Paragraph),
    Listing(Listing),
    List(List),
    Admonition(Admonition),
    Image(Image),
    ThematicBreak { span: Span },
}

impl Block {
    /// Returns the source span of this block.
    pub fn span(&self) -> Span {
        match self {
            Block::Section(section) => section.span,
            Block::Paragraph(paragraph) => paragraph.span,
            Block::Listing(listing) => listing.span,
            Block::List(list) => list.span,
            Block::Admonition(admonition) => admonition.span,
            Block::Image(image) => image.span,
            Block::ThematicBreak { span } => *span,
        }
    }

    /// Returns the explicit or generated id of this block, if any.
    pub fn id(&self) -> Option<&str> {
        match self {
            Block::Section(section) => section.id.as_deref(),
            Block::Paragraph(paragraph) => paragraph.id.as_deref(),
            Block::Listing(listing) => listing.id.as_deref(),
            Block::Admonition(admonition) => admonition.id.as_deref(),
            Block::Image(image) => image.id.as_deref(),
            Block::List(_) | Block::ThematicBreak { .. } => None,
        }
    }
}

/// A section with a title and nested blocks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Section {
    /// Anchor id. `None` when section ids are disabled.
    pub id: Option<String>,
    /// Section level: `==` is 1, `===` is 2, and so on.
    pub level: u8,
    pub title: Vec<Inline>,
    pub blocks: Vec<Block>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Paragraph {
    pub id: Option<String>,
    /// Block title (`.Title` line above the paragraph).
    pub title: Option<Vec<Inline>>,
    pub content: Vec<Inline>,
    pub span: Span,
}

/// Which delimiter a verbatim block used.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ListingKind {
    /// `----` delimited, optionally with a `[source,lang]` style.
    Listing,
    /// `....` delimited.
    Literal,
}

/// A verbatim block. Its content is never parsed for inline markup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Listing {
    pub id: Option<String>,
    pub kind: ListingKind,
    pub title: Option<Vec<Inline>>,
    pub language: Option<String>,
    pub value: String,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct List {
    pub ordered: bool,
    pub items: Vec<ListItem>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ListItem {
    pub content: Vec<Inline>,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum AdmonitionKind {
    Note,
    Tip,
    Important,
    Caution,
    Warning,
}

impl AdmonitionKind {
    /// Parses an admonition label such as `NOTE`.
    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            "NOTE" => Some(Self::Note),
            "TIP" => Some(Self::Tip),
            "IMPORTANT" => Some(Self::Important),
            "CAUTION" => Some(Self::Caution),
            "WARNING" => Some(Self::Warning),
            _ => None,
        }
    }

    /// Lower-case name used as a CSS class.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Note => "note",
            Self::Tip => "tip",
            Self::Important => "important",
            Self::Caution => "caution",
            Self::Warning => "warning",
        }
    }

    /// Human-readable caption.
    pub fn caption(&self) -> &'static str {
        match self {
            Self::Note => "Note",
            Self::Tip => "Tip",
            Self::Important => "Important",
            Self::Caution => "Caution",
            Self::Warning => "Warning",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Admonition {
    pub id: Option<String>,
    pub kind: AdmonitionKind,
    pub content: Vec<Inline>,
    pub span: Span,
}

/// `image::target[alt]` block macro.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Image {
    pub id: Option<String>,
    pub target: String,
    pub alt: String,
    pub span: Span,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[test]
    fn test_plain_text_drops_formatting() {
        let inlines = vec![
            Inline::text("Using "),
            Inline::Strong {
                children: vec![Inline::text("bold")],
            },
            Inline::text(" and "),
            Inline::Monospace {
                children: vec![Inline::text("code")],
            },
        ];
        assert_eq!(plain_text(&inlines), "Using bold and code");
    }

    #[test]
    fn test_plain_text_link_without_text_uses_url() {
        let inlines = vec![Inline::Link {
            url: "https://example.org".to_string(),
            children: vec![],
        }];
        assert_eq!(plain_text(&inlines), "https://example.org");
    }

    #[rstest]
    #[case::note("NOTE", AdmonitionKind::Note, "note", "Note")]
    #[case::tip("TIP", AdmonitionKind::Tip, "tip", "Tip")]
    #[case::important("IMPORTANT", AdmonitionKind::Important, "important", "Important")]
    #[case::caution("CAUTION", AdmonitionKind::Caution, "caution", "Caution")]
    #[case::warning("WARNING", AdmonitionKind::Warning, "warning", "Warning")]
    fn test_admonition_kind_labels(
        #[case] label: &str,
        #[case] kind: AdmonitionKind,
        #[case] name: &str,
        #[case] caption: &str,
    ) {
        assert_eq!(AdmonitionKind::from_label(label), Some(kind));
        assert_eq!(kind.name(), name);
        assert_eq!(kind.caption(), caption);
    }

    #[rstest]
    #[case::lower_case("tip")]
    #[case::unknown("DANGER")]
    #[case::empty("")]
    fn test_admonition_kind_rejects_label(#[case] label: &str) {
        assert_eq!(AdmonitionKind::from_label(label), None);
    }

    #[test]
    fn test_inline_serializes_with_type_tag() {
        let json = serde_json::to_value(Inline::text("hi")).unwrap();
        assert_eq!(json["type"], "text");
        assert_eq!(json["value"], "hi");
    }
}
