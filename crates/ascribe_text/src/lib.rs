//! # ascribe_text
//!
//! Plain-text helpers used by the derived views:
//! - [`strip_tags`] turns rendered HTML back into readable text
//! - [`count_words`] counts words using Unicode word boundaries
//! - [`truncate_words`] shortens text on a word boundary for excerpts

mod strip;
mod words;

pub use strip::strip_tags;
pub use words::{ELLIPSIS, count_words, truncate_words};
