//! HTML5 converter.
//!
//! Produces embeddable HTML (no `<html>`/`<body>` wrapper) using the class
//! names of the standard AsciiDoc stylesheet, so existing themes apply.

use std::fmt::Write as _;

use ascribe_ast::{
    Admonition, Block, Document, Image, Inline, List, Listing, ListingKind, Paragraph, Section,
};
use tracing::warn;

use crate::{Converter, ParseError, ParseOptions};

/// Converter for the `html5` backend.
pub struct HtmlConverter;

impl HtmlConverter {
    pub const BACKEND: &'static str = "html5";

    pub fn new() -> Self {
        Self
    }
}

impl Default for HtmlConverter {
    fn default() -> Self {
        Self::new()
    }
}

impl Converter for HtmlConverter {
    fn backend(&self) -> &str {
        Self::BACKEND
    }

    fn convert(&self, document: &Document, _options: &ParseOptions) -> Result<String, ParseError> {
        let mut writer = HtmlWriter::new(document);
        if document.has_attribute("showtitle")
            && !document.has_attribute("notitle")
            && let Some(title) = &document.title
        {
            writer.out.push_str("<h1>");
            writer.inlines(title);
            writer.out.push_str("</h1>\n");
        }
        writer.blocks(&document.blocks);
        Ok(writer.finish())
    }

    fn convert_inlines(&self, document: &Document, inlines: &[Inline]) -> String {
        let mut writer = HtmlWriter::new(document);
        writer.inlines(inlines);
        writer.out
    }
}

struct HtmlWriter<'d> {
    document: &'d Document,
    out: String,
}

impl<'d> HtmlWriter<'d> {
    fn new(document: &'d Document) -> Self {
        Self {
            document,
            out: String::new(),
        }
    }

    fn finish(mut self) -> String {
        while self.out.ends_with('\n') {
            self.out.pop();
        }
        self.out
    }

    fn blocks(&mut self, blocks: &[Block]) {
        for block in blocks {
            self.block(block);
        }
    }

    fn block(&mut self, block: &Block) {
        match block {
            Block::Section(section) => self.section(section),
            Block::Paragraph(paragraph) => self.paragraph(paragraph),
            Block::Listing(listing) => self.listing(listing),
            Block::List(list) => self.list(list),
            Block::Admonition(admonition) => self.admonition(admonition),
            Block::Image(image) => self.image(image),
            Block::ThematicBreak { .. } => self.out.push_str("<hr>\n"),
        }
    }

    fn open_div(&mut self, class: &str, id: Option<&str>) {
        match id {
            Some(id) => {
                let _ = writeln!(self.out, "<div id=\"{}\" class=\"{}\">", escape(id), class);
            }
            None => {
                let _ = writeln!(self.out, "<div class=\"{class}\">");
            }
        }
    }

    fn block_title(&mut self, title: Option<&[Inline]>) {
        if let Some(title) = title {
            self.out.push_str("<div class=\"title\">");
            self.inlines(title);
            self.out.push_str("</div>\n");
        }
    }

    fn section(&mut self, section: &Section) {
        let heading = (section.level + 1).min(6);
        let _ = writeln!(self.out, "<div class=\"sect{}\">", section.level);
        match &section.id {
            Some(id) => {
                let _ = write!(self.out, "<h{heading} id=\"{}\">", escape(id));
            }
            None => {
                let _ = write!(self.out, "<h{heading}>");
            }
        }
        self.inlines(&section.title);
        let _ = writeln!(self.out, "</h{heading}>");

        if section.level == 1 {
            self.out.push_str("<div class=\"sectionbody\">\n");
            self.blocks(&section.blocks);
            self.out.push_str("</div>\n");
        } else {
            self.blocks(&section.blocks);
        }
        self.out.push_str("</div>\n");
    }

    fn paragraph(&mut self, paragraph: &Paragraph) {
        self.open_div("paragraph", paragraph.id.as_deref());
        self.block_title(paragraph.title.as_deref());
        self.out.push_str("<p>");
        self.inlines(&paragraph.content);
        self.out.push_str("</p>\n</div>\n");
    }

    fn listing(&mut self, listing: &Listing) {
        let class = match listing.kind {
            ListingKind::Listing => "listingblock",
            ListingKind::Literal => "literalblock",
        };
        self.open_div(class, listing.id.as_deref());
        self.block_title(listing.title.as_deref());
        self.out.push_str("<div class=\"content\">\n");
        match &listing.language {
            Some(lang) => {
                let lang = escape(lang);
                let _ = write!(
                    self.out,
                    "<pre class=\"highlight\"><code class=\"language-{lang}\" data-lang=\"{lang}\">{}</code></pre>",
                    escape(&listing.value)
                );
            }
            None => {
                let _ = write!(self.out, "<pre>{}</pre>", escape(&listing.value));
            }
        }
        self.out.push_str("\n</div>\n</div>\n");
    }

    fn list(&mut self, list: &List) {
        let (wrapper, open, close) = if list.ordered {
            ("olist arabic", "<ol class=\"arabic\">", "</ol>")
        } else {
            ("ulist", "<ul>", "</ul>")
        };
        self.open_div(wrapper, None);
        self.out.push_str(open);
        self.out.push('\n');
        for item in &list.items {
            self.out.push_str("<li>\n<p>");
            self.inlines(&item.content);
            self.out.push_str("</p>\n</li>\n");
        }
        self.out.push_str(close);
        self.out.push_str("\n</div>\n");
    }

    fn admonition(&mut self, admonition: &Admonition) {
        let class = format!("admonitionblock {}", admonition.kind.name());
        self.open_div(&class, admonition.id.as_deref());
        let _ = write!(
            self.out,
            "<table>\n<tr>\n<td class=\"icon\">\n<div class=\"title\">{}</div>\n</td>\n<td class=\"content\">\n",
            admonition.kind.caption()
        );
        self.inlines(&admonition.content);
        self.out.push_str("\n</td>\n</tr>\n</table>\n</div>\n");
    }

    fn image(&mut self, image: &Image) {
        let src = image_src(self.document.attribute("imagesdir"), &image.target);
        self.open_div("imageblock", image.id.as_deref());
        let _ = write!(
            self.out,
            "<div class=\"content\">\n<img src=\"{}\" alt=\"{}\">\n</div>\n</div>\n",
            escape(&src),
            escape(&image.alt)
        );
    }

    fn inlines(&mut self, inlines: &[Inline]) {
        for inline in inlines {
            self.inline(inline);
        }
    }

    fn inline(&mut self, inline: &Inline) {
        match inline {
            Inline::Text { value } => self.out.push_str(&escape(value)),
            Inline::Strong { children } => self.wrap("strong", children),
            Inline::Emphasis { children } => self.wrap("em", children),
            Inline::Monospace { children } => self.wrap("code", children),
            Inline::LineBreak => self.out.push_str("<br>\n"),
            Inline::Link { url, children } if children.is_empty() => {
                let url = escape(url);
                let _ = write!(self.out, "<a href=\"{url}\" class=\"bare\">{url}</a>");
            }
            Inline::Link { url, children } => {
                let _ = write!(self.out, "<a href=\"{}\">", escape(url));
                self.inlines(children);
                self.out.push_str("</a>");
            }
            Inline::CrossReference { target, children } => self.cross_reference(target, children),
        }
    }

    fn wrap(&mut self, tag: &str, children: &[Inline]) {
        let _ = write!(self.out, "<{tag}>");
        self.inlines(children);
        let _ = write!(self.out, "</{tag}>");
    }

    fn cross_reference(&mut self, target: &str, children: &[Inline]) {
        let reference = self.document.reference(target);
        if reference.is_none() {
            warn!("possible invalid reference: {}", target);
        }

        let _ = write!(self.out, "<a href=\"#{}\">", escape(target));
        if !children.is_empty() {
            self.inlines(children);
        } else if let Some(reference) = reference {
            self.inlines(&reference.title);
        } else {
            let _ = write!(self.out, "[{}]", escape(target));
        }
        self.out.push_str("</a>");
    }
}

/// Joins `imagesdir` and an image target unless the target is absolute.
fn image_src(images_dir: Option<&str>, target: &str) -> String {
    let absolute = target.starts_with('/') || target.contains("://");
    match images_dir {
        Some(dir) if !dir.is_empty() && !absolute => {
            format!("{}/{}", dir.trim_end_matches('/'), target)
        }
        _ => target.to_string(),
    }
}

/// Escapes text for use in HTML content and attribute values.
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            other => out.push(other),
        }
    }
    out
}
