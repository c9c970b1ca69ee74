//! Parser and converter trait definitions.

use ascribe_ast::{Document, Inline};

use crate::{ParseError, ParseOptions};

/// Trait for parsing source text into a structured [`Document`].
///
/// Implementations must be pure with respect to `source` and `options`
/// apart from reading included files; the pipeline caches their output.
///
/// # Example
///
/// ```rust,ignore
/// use ascribe_ast::Document;
/// use ascribe_parser::{ParseError, ParseOptions, Parser};
///
/// struct MyParser;
///
/// impl Parser for MyParser {
///     fn name(&self) -> &str {
///         "my-parser"
///     }
///
///     fn extensions(&self) -> &[&str] {
///         &["myext"]
///     }
///
///     fn parse(&self, source: &str, options: &ParseOptions) -> Result<Document, ParseError> {
///         todo!()
///     }
/// }
/// ```
pub trait Parser: Send + Sync {
    /// Returns the name of this parser.
    fn name(&self) -> &str;

    /// Returns the file extensions this parser handles.
    ///
    /// Extensions should not include the leading dot (e.g., `["adoc"]`).
    fn extensions(&self) -> &[&str];

    /// Parses the source text into a document.
    fn parse(&self, source: &str, options: &ParseOptions) -> Result<Document, ParseError>;

    /// Returns true if this parser can handle the given file extension.
    fn can_parse(&self, extension: &str) -> bool {
        self.extensions()
            .iter()
            .any(|ext| ext.eq_ignore_ascii_case(extension))
    }
}

/// Trait for converting a parsed document into an output format.
pub trait Converter: Send + Sync {
    /// Backend name, e.g. `html5`.
    fn backend(&self) -> &str;

    /// Converts the whole document body.
    fn convert(&self, document: &Document, options: &ParseOptions) -> Result<String, ParseError>;

    /// Converts a run of inlines, such as a section title.
    fn convert_inlines(&self, document: &Document, inlines: &[Inline]) -> String;
}
