//! The parsed document root.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::{Block, Inline, plain_text};

/// A registered anchor for the document title or a section.
///
/// References are recorded in document order while parsing and are what
/// cross references resolve against.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Reference {
    /// Anchor id. `None` when ids are disabled with `:sectids!:`.
    pub id: Option<String>,
    /// 0 for the document title, otherwise the section level.
    pub level: u8,
    pub title: Vec<Inline>,
}

/// A parsed AsciiDoc document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Document {
    /// Document title (`= Title` header line).
    pub title: Option<Vec<Inline>>,
    /// Resolved document attributes, header and body entries included.
    pub attributes: BTreeMap<String, String>,
    pub blocks: Vec<Block>,
    /// Title and section anchors in document order.
    pub references: Vec<Reference>,
}

impl Document {
    /// Creates an empty document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the value of a document attribute.
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    /// Returns true if the attribute is set (to any value, including empty).
    pub fn has_attribute(&self, name: &str) -> bool {
        self.attributes.contains_key(name)
    }

    /// Returns the plain-text document title.
    pub fn title_text(&self) -> Option<String> {
        self.title.as_deref().map(plain_text)
    }

    /// Looks up a reference by anchor id.
    pub fn reference(&self, id: &str) -> Option<&Reference> {
        self.references
            .iter()
            .find(|reference| reference.id.as_deref() == Some(id))
    }
}
