//! # ascribe_core
//!
//! Memoized AsciiDoc transformation pipeline.
//!
//! This crate provides:
//! - The [`Transformer`] with its cached stages: parsed document, rendered
//!   HTML, heading outline, reading time and excerpt
//! - Node creation ([`Transformer::transform`]) with title, author,
//!   revision and page attribute metadata
//! - Layered, schema-validated configuration
//!
//! ## Example
//!
//! ```rust,no_run
//! # async fn run() -> Result<(), ascribe_core::TransformError> {
//! use ascribe_core::{DocumentNode, PluginOptions, Transformer, TransformerConfig};
//!
//! let options = PluginOptions::from_json(r#"{ "safe": "safe" }"#)?;
//! let transformer = Transformer::new(TransformerConfig::from_options(options)?)?;
//!
//! let node = DocumentNode::from_file("docs/guide.adoc")?;
//! if let Some(created) = transformer.transform(&node).await? {
//!     println!("{}", created.html);
//! }
//! # Ok(())
//! # }
//! ```

mod config;
mod error;
pub mod metadata;
mod node;
mod query;
mod transformer;
mod views;

pub use config::{
    DEFAULT_EXCERPT_LENGTH, DEFAULT_EXTENSIONS, DEFAULT_IMAGESDIR, PluginOptions,
    TransformerConfig, with_path_prefix,
};
pub use error::TransformError;
pub use node::{DocumentNode, FileInfo, NodeInternal};
pub use query::AsciidocQuery;
pub use transformer::{
    Artifact, AsciidocNode, AsciidocNodeInternal, NODE_TYPE, Transformer, create_node_id, keys,
};
pub use views::{DEFAULT_WORDS_PER_MINUTE, Heading, reading_minutes};

pub use ascribe_cache::EntryState;
pub use ascribe_parser::SafeMode;
