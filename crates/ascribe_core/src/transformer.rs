//! The memoized derivation pipeline.
//!
//! Every stage fingerprints the node with its own derivation key and goes
//! through one shared [`MemoStore`], so each artifact of a given document
//! state is computed at most once at a time and reused until evicted.

use std::future::Future;
use std::sync::Arc;

use ascribe_ast::{Document, plain_text};
use ascribe_cache::{EntryState, MemoStore, fingerprint};
use ascribe_parser::{AsciidocParser, Converter, HtmlConverter, ParseOptions, Parser, SafeMode};
use ascribe_text::truncate_words;
use serde::Serialize;
use tracing::{debug, info};

use crate::metadata::{self, Author, DocumentTitle, Revision};
use crate::views::{self, Heading};
use crate::{AsciidocQuery, DocumentNode, TransformError, TransformerConfig};

/// Derivation keys, one per cached artifact.
pub mod keys {
    pub const AST: &str = "ast";
    pub const HTML: &str = "html";
    pub const HEADINGS: &str = "headings";
    pub const TIME_TO_READ: &str = "timeToRead";
    pub const EXCERPT: &str = "excerpt";
}

/// A cached artifact.
///
/// Views are cached without their call-time parameters: the heading
/// outline unfiltered and with tags, the reading time as a word count.
#[derive(Debug, Clone)]
pub enum Artifact {
    Document(Arc<Document>),
    Html(Arc<str>),
    Headings(Arc<[Heading]>),
    WordCount(usize),
    Excerpt(Arc<str>),
}

impl Artifact {
    fn kind(&self) -> &'static str {
        match self {
            Artifact::Document(_) => "document",
            Artifact::Html(_) => "html",
            Artifact::Headings(_) => "headings",
            Artifact::WordCount(_) => "word count",
            Artifact::Excerpt(_) => "excerpt",
        }
    }
}

/// The node created for a transformed AsciiDoc file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AsciidocNode {
    pub id: String,
    pub parent: String,
    pub html: String,
    pub document: DocumentTitle,
    pub title: Option<String>,
    pub excerpt: String,
    pub authors: Vec<Author>,
    pub revision: Option<Revision>,
    pub page_attributes: std::collections::BTreeMap<String, String>,
    pub internal: AsciidocNodeInternal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AsciidocNodeInternal {
    #[serde(rename = "type")]
    pub kind: String,
    /// BLAKE3 over the serialized node, this field left empty.
    pub content_digest: String,
}

/// Node type of created nodes.
pub const NODE_TYPE: &str = "Asciidoc";

/// Derives the id of the node created for `parent_id`.
pub fn create_node_id(parent_id: &str) -> String {
    blake3::hash(format!("{parent_id} >>> ASCIIDOC").as_bytes())
        .to_hex()
        .to_string()
}

/// Parses, converts and derives views for document nodes, caching every
/// artifact by fingerprint.
///
/// Clones share the same parser, converter and memo store.
#[derive(Clone)]
pub struct Transformer {
    config: Arc<TransformerConfig>,
    parser: Arc<dyn Parser>,
    converter: Arc<dyn Converter>,
    store: Arc<MemoStore<Artifact>>,
}

impl Transformer {
    /// Creates a transformer with the built-in AsciiDoc parser and HTML
    /// converter.
    pub fn new(config: TransformerConfig) -> Result<Self, TransformError> {
        Self::with_components(
            config,
            Arc::new(AsciidocParser::new()),
            Arc::new(HtmlConverter::new()),
        )
    }

    /// Creates a transformer with custom parser and converter.
    pub fn with_components(
        config: TransformerConfig,
        parser: Arc<dyn Parser>,
        converter: Arc<dyn Converter>,
    ) -> Result<Self, TransformError> {
        if converter.backend() != config.backend {
            return Err(TransformError::config(format!(
                "Converter backend '{}' does not match configured backend '{}'",
                converter.backend(),
                config.backend
            )));
        }
        let store = MemoStore::new(config.cache_capacity)?;
        debug!(
            "Transformer ready: parser={}, backend={}, capacity={}",
            parser.name(),
            converter.backend(),
            config.cache_capacity
        );
        Ok(Self {
            config: Arc::new(config),
            parser,
            converter,
            store: Arc::new(store),
        })
    }

    pub fn config(&self) -> &TransformerConfig {
        &self.config
    }

    /// The memo store backing every stage.
    pub fn store(&self) -> &MemoStore<Artifact> {
        &self.store
    }

    /// Reports whether the artifact for `key` is cached for `node`.
    pub fn cache_state(&self, node: &DocumentNode, key: &str) -> EntryState {
        self.store.state(&fingerprint(node, key))
    }

    /// Returns a query handle bound to `node`.
    pub fn query<'a>(&'a self, node: &'a DocumentNode) -> AsciidocQuery<'a> {
        AsciidocQuery::new(self, node)
    }

    /// Parse options for `node` under the configured safe mode.
    pub fn parse_options(&self, node: &DocumentNode) -> ParseOptions {
        let options = ParseOptions::new()
            .with_safe(self.config.safe)
            .with_attributes(self.config.attributes.clone());
        match node.base_dir() {
            Some(dir) => options.with_base_dir(dir),
            None => options,
        }
    }

    /// Looks up the artifact for `key`, running `init` on a miss.
    ///
    /// `init` gets owned copies of the transformer and node, as the
    /// computation runs in its own task and outlives a dropped caller.
    async fn memoize<F, Fut>(
        &self,
        node: &DocumentNode,
        key: &str,
        init: F,
    ) -> Result<Artifact, TransformError>
    where
        F: FnOnce(Transformer, DocumentNode) -> Fut,
        Fut: Future<Output = Result<Artifact, TransformError>> + Send + 'static,
    {
        let fp = fingerprint(node, key);
        debug!("{} for {} ({})", key, node.internal.origin, fp);
        self.store
            .get_or_try_insert_with(fp, || init(self.clone(), node.clone()))
            .await
    }

    async fn parse_blocking(
        &self,
        node: &DocumentNode,
        options: ParseOptions,
    ) -> Result<Document, TransformError> {
        let parser = Arc::clone(&self.parser);
        let source = node.content.clone();
        let document = tokio::task::spawn_blocking(move || parser.parse(&source, &options)).await??;
        Ok(document)
    }

    /// Returns the parsed document, parsing on a cache miss.
    pub async fn to_structured_document(
        &self,
        node: &DocumentNode,
    ) -> Result<Arc<Document>, TransformError> {
        let artifact = self
            .memoize(node, keys::AST, |this, node| async move {
                let options = this.parse_options(&node);
                let document = this.parse_blocking(&node, options).await?;
                Ok::<_, TransformError>(Artifact::Document(Arc::new(document)))
            })
            .await?;
        match artifact {
            Artifact::Document(document) => Ok(document),
            other => Err(unexpected(keys::AST, &other)),
        }
    }

    /// Returns the rendered HTML, converting on a cache miss.
    pub async fn to_rendered_output(&self, node: &DocumentNode) -> Result<Arc<str>, TransformError> {
        let artifact = self
            .memoize(node, keys::HTML, |this, node| async move {
                let document = this.to_structured_document(&node).await?;
                let converter = Arc::clone(&this.converter);
                let options = this.parse_options(&node);
                let html = tokio::task::spawn_blocking(move || {
                    converter.convert(&document, &options)
                })
                .await??;
                Ok::<_, TransformError>(Artifact::Html(Arc::from(html)))
            })
            .await?;
        match artifact {
            Artifact::Html(html) => Ok(html),
            other => Err(unexpected(keys::HTML, &other)),
        }
    }

    /// Returns the heading outline.
    ///
    /// `depth` keeps only headings of exactly that depth. With
    /// `strip_tags` the values are plain text.
    pub async fn to_headings(
        &self,
        node: &DocumentNode,
        depth: Option<u8>,
        strip_tags: bool,
    ) -> Result<Vec<Heading>, TransformError> {
        let artifact = self
            .memoize(node, keys::HEADINGS, |this, node| async move {
                let document = this.to_structured_document(&node).await?;
                let headings = views::collect_headings(&document, this.converter.as_ref());
                Ok::<_, TransformError>(Artifact::Headings(headings.into()))
            })
            .await?;
        match artifact {
            Artifact::Headings(headings) => Ok(views::select_headings(&headings, depth, strip_tags)),
            other => Err(unexpected(keys::HEADINGS, &other)),
        }
    }

    /// Returns the estimated reading time in minutes, at least 1.
    ///
    /// `words_per_minute` of `None` or 0 uses the default speed.
    pub async fn to_reading_time(
        &self,
        node: &DocumentNode,
        words_per_minute: Option<u32>,
    ) -> Result<u32, TransformError> {
        let artifact = self
            .memoize(node, keys::TIME_TO_READ, |this, node| async move {
                let html = this.to_rendered_output(&node).await?;
                Ok::<_, TransformError>(Artifact::WordCount(views::html_word_count(&html)))
            })
            .await?;
        match artifact {
            Artifact::WordCount(words) => Ok(views::reading_minutes(
                words,
                words_per_minute.unwrap_or(views::DEFAULT_WORDS_PER_MINUTE),
            )),
            other => Err(unexpected(keys::TIME_TO_READ, &other)),
        }
    }

    /// Returns the excerpt: the `description` attribute, or the first
    /// paragraph truncated to the configured length.
    ///
    /// The document is always parsed in secure mode for this.
    pub async fn excerpt(&self, node: &DocumentNode) -> Result<Arc<str>, TransformError> {
        let artifact = self
            .memoize(node, keys::EXCERPT, |this, node| async move {
                let document = if this.config.safe == SafeMode::Secure {
                    this.to_structured_document(&node).await?
                } else {
                    let options = this.parse_options(&node).with_safe(SafeMode::Secure);
                    Arc::new(this.parse_blocking(&node, options).await?)
                };
                let excerpt = match document.attribute("description") {
                    Some(description) => description.to_string(),
                    None => views::first_paragraph(&document)
                        .map(|content| {
                            truncate_words(&plain_text(&content), this.config.excerpt_length)
                        })
                        .unwrap_or_default(),
                };
                Ok::<_, TransformError>(Artifact::Excerpt(Arc::from(excerpt)))
            })
            .await?;
        match artifact {
            Artifact::Excerpt(excerpt) => Ok(excerpt),
            other => Err(unexpected(keys::EXCERPT, &other)),
        }
    }

    /// Primes the parsed document when eager parsing is configured.
    pub async fn prepare(&self, node: &DocumentNode) -> Result<(), TransformError> {
        if self.config.parse && self.config.handles_extension(&node.extension) {
            self.to_structured_document(node).await?;
        }
        Ok(())
    }

    /// Creates the AsciiDoc node for `node`, or `None` if its extension is
    /// not handled.
    pub async fn transform(
        &self,
        node: &DocumentNode,
    ) -> Result<Option<AsciidocNode>, TransformError> {
        if !self.config.handles_extension(&node.extension) {
            debug!("Skipping {} with extension '{}'", node.id, node.extension);
            return Ok(None);
        }

        let document = self.to_structured_document(node).await?;
        let html = self.to_rendered_output(node).await?;
        let excerpt = self.excerpt(node).await?;

        let title = document
            .title
            .as_deref()
            .map(|title| self.converter.convert_inlines(&document, title));

        let mut created = AsciidocNode {
            id: create_node_id(&node.id),
            parent: node.id.clone(),
            html: html.to_string(),
            document: DocumentTitle::partition(title.as_deref()),
            title,
            excerpt: excerpt.to_string(),
            authors: metadata::authors(&document),
            revision: metadata::revision(&document),
            page_attributes: metadata::page_attributes(&document),
            internal: AsciidocNodeInternal {
                kind: NODE_TYPE.to_string(),
                content_digest: String::new(),
            },
        };
        let serialized = serde_json::to_string(&created)?;
        created.internal.content_digest = blake3::hash(serialized.as_bytes()).to_hex().to_string();

        info!("Created {} node {} for {}", NODE_TYPE, created.id, node.id);
        Ok(Some(created))
    }
}

fn unexpected(key: &str, artifact: &Artifact) -> TransformError {
    TransformError::internal(format!(
        "Cache entry for '{}' holds a {} artifact",
        key,
        artifact.kind()
    ))
}

impl std::fmt::Debug for Transformer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Transformer")
            .field("config", &self.config)
            .field("parser", &self.parser.name())
            .field("backend", &self.converter.backend())
            .field("store", &self.store)
            .finish()
    }
}
