//! AsciiDoc parser.
//!
//! Supports the subset of AsciiDoc needed for articles and documentation
//! pages:
//! - Document header (title, author line, revision line, attribute entries)
//! - Sections (`==` through `======`) with generated or explicit ids
//! - Paragraphs, admonitions, block titles and anchors
//! - Listing (`----`) and literal (`....`) blocks, comment blocks
//! - Ordered and unordered lists, block images, thematic breaks
//! - `include::` directives, subject to the safe mode

mod attributes;
mod header;
mod id;
mod inline;
mod preprocess;

use ascribe_ast::{
    Admonition, AdmonitionKind, Block, Document, Image, Inline, List, ListItem, Listing,
    ListingKind, Paragraph, Reference, Section, Span, plain_text,
};
use tracing::{debug, warn};

use crate::{ParseError, ParseOptions, Parser};

use attributes::{AttributeEntry, AttributeStore};
use id::{IdRegistry, generate_id};
use inline::parse_inlines;
use preprocess::SourceLine;

/// AsciiDoc parser implementation.
pub struct AsciidocParser;

impl AsciidocParser {
    /// Creates a new AsciiDoc parser.
    pub fn new() -> Self {
        Self
    }
}

impl Default for AsciidocParser {
    fn default() -> Self {
        Self::new()
    }
}

impl Parser for AsciidocParser {
    fn name(&self) -> &str {
        "asciidoc"
    }

    fn extensions(&self) -> &[&str] {
        &["adoc", "asciidoc", "asc", "ad"]
    }

    fn parse(&self, source: &str, options: &ParseOptions) -> Result<Document, ParseError> {
        let lines = preprocess::expand(source, options)?;
        debug!("Parsing {} lines", lines.len());
        BlockParser::new(&lines, options).parse()
    }
}

/// Block attributes collected from `[...]`, `[[id]]` and `.Title` lines
/// that apply to the next block.
#[derive(Debug, Default)]
struct PendingAttributes {
    id: Option<String>,
    title: Option<String>,
    style: Option<String>,
    positional: Vec<String>,
}

impl PendingAttributes {
    fn take(&mut self) -> Self {
        std::mem::take(self)
    }
}

/// A top-level item before sections are nested.
enum Item {
    Section(Section),
    Block(Block),
}

struct BlockParser<'l> {
    lines: &'l [SourceLine],
    pos: usize,
    attrs: AttributeStore,
    ids: IdRegistry,
    references: Vec<Reference>,
}

impl<'l> BlockParser<'l> {
    fn new(lines: &'l [SourceLine], options: &ParseOptions) -> Self {
        Self {
            lines,
            pos: 0,
            attrs: AttributeStore::new(&options.attributes),
            ids: IdRegistry::default(),
            references: Vec::new(),
        }
    }

    fn parse(mut self) -> Result<Document, ParseError> {
        let title = self.parse_header();
        let items = self.parse_body()?;

        Ok(Document {
            title,
            attributes: self.attrs.into_map(),
            blocks: nest_sections(items),
            references: self.references,
        })
    }

    fn peek(&self) -> Option<&'l SourceLine> {
        self.lines.get(self.pos)
    }

    fn advance(&mut self) {
        self.pos += 1;
    }

    /// 1-indexed number of the current line.
    fn line_number(&self) -> usize {
        self.pos + 1
    }

    fn span_of(&self, start: usize, end: usize) -> Span {
        let start_offset = self.lines.get(start).map_or(0, |l| l.offset);
        let end_offset = end
            .checked_sub(1)
            .and_then(|last| self.lines.get(last))
            .map_or(start_offset, |l| l.end);
        Span::new(start_offset, end_offset.max(start_offset))
    }

    fn section_ids_enabled(&self) -> bool {
        self.attrs.is_set("sectids")
    }

    fn separator(&self) -> String {
        self.attrs.get("idseparator").unwrap_or("_").to_string()
    }

    /// Allocates an id for a title, honouring an explicit anchor.
    fn assign_id(&mut self, explicit: Option<String>, title: &[Inline]) -> Option<String> {
        if let Some(id) = explicit {
            if !self.ids.register(&id) {
                warn!("id assigned to block already in use: {}", id);
            }
            return Some(id);
        }
        if !self.section_ids_enabled() {
            return None;
        }
        let prefix = self.attrs.get("idprefix").unwrap_or("_").to_string();
        let separator = self.separator();
        let base = generate_id(&plain_text(title), &prefix, &separator);
        Some(self.ids.unique(base, &separator))
    }

    fn inlines(&self, text: &str) -> Vec<Inline> {
        parse_inlines(&self.attrs.substitute(text))
    }

    /// Parses the header and returns the document title.
    fn parse_header(&mut self) -> Option<Vec<Inline>> {
        let mut title = None;

        while let Some(line) = self.peek() {
            let text = line.text.trim_end();
            if text.is_empty() || is_comment_line(text) {
                self.advance();
                continue;
            }
            if let Some(entry) = AttributeEntry::parse(text) {
                self.attrs.apply(entry);
                self.advance();
                continue;
            }
            if let Some((0, raw_title)) = section_title(text) {
                let raw_title = self.attrs.substitute(raw_title);
                self.attrs.set("doctitle", raw_title.clone());
                title = Some(parse_inlines(&raw_title));
                self.advance();
            }
            break;
        }

        let Some(title) = title else {
            header::derive_author_from_attribute(&mut self.attrs);
            return None;
        };

        let mut header_lines = 0;
        while let Some(line) = self.peek() {
            let text = line.text.trim_end();
            if text.is_empty() {
                break;
            }
            if is_comment_line(text) {
                self.advance();
                continue;
            }
            if let Some(entry) = AttributeEntry::parse(text) {
                self.attrs.apply(entry);
                self.advance();
                continue;
            }
            match header_lines {
                0 => header::apply_author_line(&self.attrs.substitute(text), &mut self.attrs),
                1 => header::apply_revision_line(&self.attrs.substitute(text), &mut self.attrs),
                _ => break,
            }
            header_lines += 1;
            self.advance();
        }

        header::derive_author_from_attribute(&mut self.attrs);

        let id = self.assign_id(None, &title);
        self.references.push(Reference {
            id,
            level: 0,
            title: title.clone(),
        });
        Some(title)
    }

    fn parse_body(&mut self) -> Result<Vec<Item>, ParseError> {
        let mut items = Vec::new();
        let mut pending = PendingAttributes::default();

        while let Some(line) = self.peek() {
            let text = line.text.trim_end();

            if text.is_empty() {
                self.advance();
                continue;
            }
            if text == "////" {
                self.skip_delimited("////")?;
                continue;
            }
            if is_comment_line(text) {
                self.advance();
                continue;
            }
            if let Some(entry) = AttributeEntry::parse(text) {
                self.attrs.apply(entry);
                self.advance();
                continue;
            }
            if let Some(id) = block_anchor(text) {
                pending.id = Some(id.to_string());
                self.advance();
                continue;
            }
            if let Some(list) = block_attribute_list(text) {
                apply_attribute_list(list, &mut pending);
                self.advance();
                continue;
            }
            if let Some(title) = block_title(text) {
                pending.title = Some(title.to_string());
                self.advance();
                continue;
            }
            if let Some((level, raw_title)) = section_title(text) {
                let start = self.pos;
                let title = self.inlines(raw_title);
                let id = self.assign_id(pending.take().id, &title);
                self.references.push(Reference {
                    id: id.clone(),
                    level,
                    title: title.clone(),
                });
                self.advance();
                items.push(Item::Section(Section {
                    id,
                    level,
                    title,
                    blocks: Vec::new(),
                    span: self.span_of(start, self.pos),
                }));
                continue;
            }

            let block = if text == "----" || text == "...." {
                self.parse_listing(text, pending.take())?
            } else if text == "'''" {
                let span = self.span_of(self.pos, self.pos + 1);
                self.advance();
                pending.take();
                Block::ThematicBreak { span }
            } else if let Some((target, alt)) = block_image(text) {
                let span = self.span_of(self.pos, self.pos + 1);
                self.advance();
                let alt = alt
                    .map(str::to_string)
                    .unwrap_or_else(|| default_alt(target));
                Block::Image(Image {
                    id: pending.take().id,
                    target: self.attrs.substitute(target),
                    alt,
                    span,
                })
            } else if let Some((ordered, _)) = list_marker(text) {
                pending.take();
                self.parse_list(ordered)
            } else {
                self.parse_paragraph(pending.take())
            };
            items.push(Item::Block(block));
        }

        Ok(items)
    }

    /// Skips a delimited block up to and including its closing delimiter.
    fn skip_delimited(&mut self, delimiter: &str) -> Result<(), ParseError> {
        let open_line = self.line_number();
        self.advance();
        while let Some(line) = self.peek() {
            self.advance();
            if line.text.trim_end() == delimiter {
                return Ok(());
            }
        }
        Err(ParseError::invalid_source_at(
            format!("unterminated block, expected closing '{delimiter}'"),
            open_line,
        ))
    }

    fn parse_listing(
        &mut self,
        delimiter: &str,
        pending: PendingAttributes,
    ) -> Result<Block, ParseError> {
        let start = self.pos;
        let open_line = self.line_number();
        self.advance();

        let mut body = Vec::new();
        loop {
            let Some(line) = self.peek() else {
                return Err(ParseError::invalid_source_at(
                    format!("unterminated block, expected closing '{delimiter}'"),
                    open_line,
                ));
            };
            self.advance();
            if line.text.trim_end() == delimiter {
                break;
            }
            body.push(line.text.as_str());
        }

        let kind = if delimiter == "...." {
            ListingKind::Literal
        } else {
            ListingKind::Listing
        };
        let language = match pending.style.as_deref() {
            Some("source") => pending
                .positional
                .first()
                .cloned()
                .or_else(|| self.attrs.get("source-language").map(str::to_string)),
            _ => None,
        };

        Ok(Block::Listing(Listing {
            id: pending.id,
            kind,
            title: pending.title.map(|t| self.inlines(&t)),
            language,
            value: body.join("\n"),
            span: self.span_of(start, self.pos),
        }))
    }

    fn parse_list(&mut self, ordered: bool) -> Block {
        let list_start = self.pos;
        let mut items: Vec<(usize, Vec<&'l str>)> = Vec::new();

        while let Some(line) = self.peek() {
            let text = line.text.trim_end();

            if text.is_empty() {
                // A blank line only continues the list if another item follows.
                let next_is_item = self.lines[self.pos + 1..]
                    .iter()
                    .find(|l| !l.text.trim().is_empty())
                    .and_then(|l| list_marker(l.text.trim_end()))
                    .is_some_and(|(next_ordered, _)| next_ordered == ordered);
                if !next_is_item {
                    break;
                }
                self.advance();
                continue;
            }

            match list_marker(text) {
                Some((item_ordered, content)) if item_ordered == ordered => {
                    items.push((self.pos, vec![content]));
                }
                Some(_) => break,
                None if is_block_delimiter(text) || block_attribute_list(text).is_some() => break,
                None => match items.last_mut() {
                    Some((_, lines)) => lines.push(text.trim_start()),
                    None => break,
                },
            }
            self.advance();
        }

        let end = self.pos;
        let mut list_items = Vec::with_capacity(items.len());
        for (index, (start, lines)) in items.iter().enumerate() {
            let item_end = items.get(index + 1).map_or(end, |(next, _)| *next);
            list_items.push(ListItem {
                content: self.inlines(&lines.join("\n")),
                span: self.span_of(*start, item_end),
            });
        }

        Block::List(List {
            ordered,
            items: list_items,
            span: self.span_of(list_start, end),
        })
    }

    fn parse_paragraph(&mut self, pending: PendingAttributes) -> Block {
        let start = self.pos;
        let mut lines = Vec::new();

        while let Some(line) = self.peek() {
            let text = line.text.trim_end();
            if text.is_empty() || (!lines.is_empty() && is_block_delimiter(text)) {
                break;
            }
            lines.push(text);
            self.advance();
        }

        let span = self.span_of(start, self.pos);
        let raw = lines.join("\n");

        let styled = pending
            .style
            .as_deref()
            .and_then(AdmonitionKind::from_label);
        let labelled = admonition_label(&raw).map(|(kind, rest)| (kind, rest.to_string()));
        let (admonition, raw) = match (styled, labelled) {
            (Some(kind), _) => (Some(kind), raw),
            (None, Some((kind, rest))) => (Some(kind), rest),
            (None, None) => (None, raw),
        };

        let content = self.inlines(&raw);
        match admonition {
            Some(kind) => Block::Admonition(Admonition {
                id: pending.id,
                kind,
                content,
                span,
            }),
            None => Block::Paragraph(Paragraph {
                id: pending.id,
                title: pending.title.map(|t| self.inlines(&t)),
                content,
                span,
            }),
        }
    }
}

/// Nests flat items under their sections by level.
fn nest_sections(items: Vec<Item>) -> Vec<Block> {
    fn attach(section: Section, stack: &mut [Section], root: &mut Vec<Block>) {
        match stack.last_mut() {
            Some(parent) => {
                parent.span = parent.span.merge(&section.span);
                parent.blocks.push(Block::Section(section));
            }
            None => root.push(Block::Section(section)),
        }
    }

    let mut root = Vec::new();
    let mut stack: Vec<Section> = Vec::new();

    for item in items {
        match item {
            Item::Block(block) => match stack.last_mut() {
                Some(section) => {
                    section.span = section.span.merge(&block.span());
                    section.blocks.push(block);
                }
                None => root.push(block),
            },
            Item::Section(section) => {
                while stack.last().is_some_and(|top| top.level >= section.level) {
                    if let Some(done) = stack.pop() {
                        attach(done, &mut stack, &mut root);
                    }
                }
                stack.push(section);
            }
        }
    }

    while let Some(done) = stack.pop() {
        attach(done, &mut stack, &mut root);
    }

    root
}

fn is_comment_line(text: &str) -> bool {
    text.starts_with("//") && !text.starts_with("///")
}

fn is_block_delimiter(text: &str) -> bool {
    matches!(text, "----" | "...." | "////")
}

/// `= Title` is level 0, `== Section` level 1, up to `======` (level 5).
fn section_title(text: &str) -> Option<(u8, &str)> {
    let marks = text.bytes().take_while(|b| *b == b'=').count();
    if !(1..=6).contains(&marks) {
        return None;
    }
    let title = text[marks..].strip_prefix(' ')?.trim();
    if title.is_empty() {
        return None;
    }
    Some(((marks - 1) as u8, title))
}

/// `[[id]]` or `[[id,reftext]]`.
fn block_anchor(text: &str) -> Option<&str> {
    let inner = text.strip_prefix("[[")?.strip_suffix("]]")?;
    let id = inner.split(',').next()?.trim();
    (!id.is_empty() && !id.contains(char::is_whitespace)).then_some(id)
}

/// `[style,positional...]`, excluding anchors.
fn block_attribute_list(text: &str) -> Option<&str> {
    if text.starts_with("[[") {
        return None;
    }
    text.strip_prefix('[')?.strip_suffix(']')
}

fn apply_attribute_list(list: &str, pending: &mut PendingAttributes) {
    let mut entries = list.split(',').map(str::trim);
    if let Some(first) = entries.next() {
        let (style, id) = match first.split_once('#') {
            Some((style, id)) => (style, Some(id)),
            None => (first, None),
        };
        if let Some(id) = id.filter(|id| !id.is_empty()) {
            pending.id = Some(id.to_string());
        }
        if !style.is_empty() && !style.contains('=') {
            pending.style = Some(style.to_string());
        }
    }
    for entry in entries {
        if let Some(id) = entry.strip_prefix("id=") {
            pending.id = Some(id.trim_matches('"').to_string());
        } else if !entry.contains('=') && !entry.is_empty() {
            pending.positional.push(entry.to_string());
        }
    }
}

/// `.Title` but not `. item` or `...`.
fn block_title(text: &str) -> Option<&str> {
    let title = text.strip_prefix('.')?;
    let first = title.chars().next()?;
    (!first.is_whitespace() && first != '.').then_some(title)
}

/// Returns whether the line is an ordered item and its content.
fn list_marker(text: &str) -> Option<(bool, &str)> {
    let trimmed = text.trim_start();
    let marker_len = trimmed
        .bytes()
        .take_while(|b| matches!(b, b'*' | b'-' | b'.'))
        .count();

    if marker_len > 0 {
        let marker = &trimmed[..marker_len];
        let content = trimmed[marker_len..].strip_prefix(' ')?.trim_start();
        if content.is_empty() {
            return None;
        }
        return match marker.as_bytes()[0] {
            b'.' if marker.bytes().all(|b| b == b'.') => Some((true, content)),
            b'*' if marker.bytes().all(|b| b == b'*') => Some((false, content)),
            b'-' if marker == "-" => Some((false, content)),
            _ => None,
        };
    }

    let digits = trimmed.bytes().take_while(u8::is_ascii_digit).count();
    if digits > 0 {
        let content = trimmed[digits..].strip_prefix(". ")?.trim_start();
        return (!content.is_empty()).then_some((true, content));
    }
    None
}

/// `image::target[alt]`.
fn block_image(text: &str) -> Option<(&str, Option<&str>)> {
    let rest = text.strip_prefix("image::")?.strip_suffix(']')?;
    let (target, attrs) = rest.split_once('[')?;
    if target.is_empty() {
        return None;
    }
    let alt = attrs
        .split(',')
        .next()
        .map(|alt| alt.trim().trim_matches('"'))
        .filter(|alt| !alt.is_empty() && !alt.contains('='));
    Some((target, alt))
}

/// Alt text derived from the image file name, e.g. `sunset-beach.jpg`
/// becomes `sunset beach`.
fn default_alt(target: &str) -> String {
    let file = target.rsplit('/').next().unwrap_or(target);
    let stem = file.rsplit_once('.').map_or(file, |(stem, _)| stem);
    stem.replace(['-', '_'], " ")
}

/// `NOTE: text` style admonition paragraphs.
fn admonition_label(raw: &str) -> Option<(AdmonitionKind, &str)> {
    let (label, rest) = raw.split_once(": ")?;
    AdmonitionKind::from_label(label).map(|kind| (kind, rest))
}
