//! Visitor pattern for block traversal.
//!
//! # Overview
//!
//! - [`Visitor`] - Read-only traversal trait
//! - [`walk_block`] - Dispatch function for type-specific visitors
//! - [`walk_document`] - Traverse every top-level block of a document
//!
//! # Example
//!
//! ```rust
//! use std::ops::ControlFlow;
//!
//! use ascribe_ast::visitor::{VisitResult, Visitor, walk_document};
//! use ascribe_ast::{Block, Document, Inline, Paragraph, Span};
//!
//! struct FirstParagraph(Option<Vec<Inline>>);
//!
//! impl Visitor for FirstParagraph {
//!     fn visit_paragraph(&mut self, paragraph: &Paragraph) -> VisitResult {
//!         self.0 = Some(paragraph.content.clone());
//!         ControlFlow::Break(())
//!     }
//! }
//!
//! let mut doc = Document::new();
//! doc.blocks.push(Block::Paragraph(Paragraph {
//!     id: None,
//!     title: None,
//!     content: vec![Inline::text("hello")],
//!     span: Span::new(0, 5),
//! }));
//!
//! let mut finder = FirstParagraph(None);
//! let _ = walk_document(&mut finder, &doc);
//! assert_eq!(finder.0, Some(vec![Inline::text("hello")]));
//! ```

use std::ops::ControlFlow;

use crate::{Admonition, Block, Document, Image, List, Listing, Paragraph, Section, Span};

/// Result type for visitor methods to control traversal.
///
/// - `ControlFlow::Continue(())` - continue visiting
/// - `ControlFlow::Break(())` - stop traversal early
pub type VisitResult = ControlFlow<()>;

/// Visitor trait for traversing blocks without modification.
///
/// `visit_section` walks nested blocks by default; every other method is a
/// no-op. Override only what you need.
pub trait Visitor: Sized {
    fn visit_section(&mut self, section: &Section) -> VisitResult {
        walk_blocks(self, &section.blocks)
    }

    fn visit_paragraph(&mut self, _paragraph: &Paragraph) -> VisitResult {
        ControlFlow::Continue(())
    }

    fn visit_listing(&mut self, _listing: &Listing) -> VisitResult {
        ControlFlow::Continue(())
    }

    fn visit_list(&mut self, _list: &List) -> VisitResult {
        ControlFlow::Continue(())
    }

    fn visit_admonition(&mut self, _admonition: &Admonition) -> VisitResult {
        ControlFlow::Continue(())
    }

    fn visit_image(&mut self, _image: &Image) -> VisitResult {
        ControlFlow::Continue(())
    }

    fn visit_thematic_break(&mut self, _span: Span) -> VisitResult {
        ControlFlow::Continue(())
    }
}

/// Dispatches a block to the matching `visit_*` method.
pub fn walk_block<V: Visitor>(visitor: &mut V, block: &Block) -> VisitResult {
    match block {
        Block::Section(section) => visitor.visit_section(section),
        Block::Paragraph(paragraph) => visitor.visit_paragraph(paragraph),
        Block::Listing(listing) => visitor.visit_listing(listing),
        Block::List(list) => visitor.visit_list(list),
        Block::Admonition(admonition) => visitor.visit_admonition(admonition),
        Block::Image(image) => visitor.visit_image(image),
        Block::ThematicBreak { span } => visitor.visit_thematic_break(*span),
    }
}

/// Walks a slice of blocks in order, stopping at the first `Break`.
pub fn walk_blocks<V: Visitor>(visitor: &mut V, blocks: &[Block]) -> VisitResult {
    for block in blocks {
        walk_block(visitor, block)?;
    }
    ControlFlow::Continue(())
}

/// Walks all blocks of a document.
pub fn walk_document<V: Visitor>(visitor: &mut V, document: &Document) -> VisitResult {
    walk_blocks(visitor, &document.blocks)
}
