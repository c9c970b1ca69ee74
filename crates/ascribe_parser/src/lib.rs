//! # ascribe_parser
//!
//! Parsing and conversion layer for Ascribe.
//!
//! This crate provides:
//! - `Parser` and `Converter` traits for pluggable markup handling
//! - A built-in AsciiDoc parser producing an [`ascribe_ast::Document`]
//! - A built-in `html5` converter
//!
//! ## Example
//!
//! ```rust
//! use ascribe_parser::{AsciidocParser, Converter, HtmlConverter, ParseOptions, Parser};
//!
//! let options = ParseOptions::default();
//! let document = AsciidocParser::new()
//!     .parse("= Hello\n\nThis is a paragraph.", &options)
//!     .unwrap();
//! let html = HtmlConverter::new().convert(&document, &options).unwrap();
//!
//! assert!(html.contains("<p>This is a paragraph.</p>"));
//! ```

mod asciidoc;
mod error;
mod html;
mod options;
mod traits;

pub use asciidoc::AsciidocParser;
pub use error::ParseError;
pub use html::{HtmlConverter, escape};
pub use options::{ParseOptions, SafeMode};
pub use traits::{Converter, Parser};
