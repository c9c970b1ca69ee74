//! # ascribe_ast
//!
//! Structured document definitions for Ascribe.
//!
//! The parser produces a [`Document`] that every later stage treats as
//! read-only. All nodes are owned values, so a document can be wrapped in an
//! `Arc` and cached independently of the source text and of any artifact
//! derived from it.
//!
//! ## Example
//!
//! ```rust
//! use ascribe_ast::{Block, Document, Inline, Paragraph, Span};
//!
//! let mut doc = Document::new();
//! doc.title = Some(vec![Inline::text("Title")]);
//! doc.blocks.push(Block::Paragraph(Paragraph {
//!     id: None,
//!     title: None,
//!     content: vec![Inline::text("Hello world.")],
//!     span: Span::new(9, 21),
//! }));
//!
//! assert_eq!(doc.title_text().as_deref(), Some("Title"));
//! ```

mod document;
mod node;
mod span;
pub mod visitor;

pub use document::{Document, Reference};
pub use node::{
    Admonition, AdmonitionKind, Block, Image, Inline, List, ListItem, Listing, ListingKind,
    Paragraph, Section, plain_text,
};
pub use span::Span;

pub use visitor::{VisitResult, Visitor};
