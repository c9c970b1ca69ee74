//! Query surface over a single document node.

use std::sync::Arc;

use crate::{DocumentNode, Heading, TransformError, Transformer};

/// Memoized queries for one node, as exposed to content consumers.
///
/// ```rust,no_run
/// # async fn run() -> Result<(), ascribe_core::TransformError> {
/// use ascribe_core::{DocumentNode, Transformer, TransformerConfig};
///
/// let transformer = Transformer::new(TransformerConfig::default())?;
/// let node = DocumentNode::new("post", "= Title\n\nHello world.").with_extension("adoc");
///
/// let query = transformer.query(&node);
/// assert_eq!(query.time_to_read(None).await?, 1);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Copy)]
pub struct AsciidocQuery<'a> {
    transformer: &'a Transformer,
    node: &'a DocumentNode,
}

impl<'a> AsciidocQuery<'a> {
    pub fn new(transformer: &'a Transformer, node: &'a DocumentNode) -> Self {
        Self { transformer, node }
    }

    pub fn node(&self) -> &'a DocumentNode {
        self.node
    }

    /// Rendered HTML.
    pub async fn content(&self) -> Result<Arc<str>, TransformError> {
        self.transformer.to_rendered_output(self.node).await
    }

    /// Heading outline, optionally limited to one depth.
    pub async fn headings(
        &self,
        depth: Option<u8>,
        strip_tags: bool,
    ) -> Result<Vec<Heading>, TransformError> {
        self.transformer
            .to_headings(self.node, depth, strip_tags)
            .await
    }

    /// Reading time in minutes. `None` uses 230 words per minute.
    pub async fn time_to_read(&self, speed: Option<u32>) -> Result<u32, TransformError> {
        self.transformer.to_reading_time(self.node, speed).await
    }

    /// Excerpt text.
    pub async fn excerpt(&self) -> Result<Arc<str>, TransformError> {
        self.transformer.excerpt(self.node).await
    }
}
