//! Command implementations

use std::future::Future;
use std::path::Path;

use ascribe_core::{DocumentNode, PluginOptions, Transformer, TransformerConfig};
use miette::{IntoDiagnostic, Result};
use tracing::{debug, warn};

/// Builds the transformer from an optional options file.
pub fn load_transformer(config: Option<&Path>) -> Result<Transformer> {
    let options = match config {
        Some(path) => {
            debug!("Loading options from {}", path.display());
            PluginOptions::from_file(path).into_diagnostic()?
        }
        None => PluginOptions::default(),
    };
    let config = TransformerConfig::from_options(options).into_diagnostic()?;
    Transformer::new(config).into_diagnostic()
}

fn block_on<F: Future>(future: F) -> Result<F::Output> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .into_diagnostic()?;
    Ok(runtime.block_on(future))
}

/// Reads `file` as a node, or returns `None` if its extension is not
/// handled.
fn load_node(transformer: &Transformer, file: &Path) -> Result<Option<DocumentNode>> {
    let node = DocumentNode::from_file(file).into_diagnostic()?;
    if !transformer.config().handles_extension(&node.extension) {
        warn!(
            "{} is not an AsciiDoc file (handled extensions: {})",
            file.display(),
            transformer.config().file_extensions.join(", ")
        );
        return Ok(None);
    }
    Ok(Some(node))
}

pub fn run_render(transformer: &Transformer, file: &Path) -> Result<bool> {
    let Some(node) = load_node(transformer, file)? else {
        return Ok(false);
    };
    let html = block_on(transformer.to_rendered_output(&node))?.into_diagnostic()?;
    println!("{}", html);
    Ok(true)
}

pub fn run_headings(
    transformer: &Transformer,
    file: &Path,
    depth: Option<u8>,
    strip_tags: bool,
) -> Result<bool> {
    let Some(node) = load_node(transformer, file)? else {
        return Ok(false);
    };
    let headings =
        block_on(transformer.to_headings(&node, depth, strip_tags))?.into_diagnostic()?;
    println!("{}", serde_json::to_string_pretty(&headings).into_diagnostic()?);
    Ok(true)
}

pub fn run_time_to_read(
    transformer: &Transformer,
    file: &Path,
    speed: Option<u32>,
) -> Result<bool> {
    let Some(node) = load_node(transformer, file)? else {
        return Ok(false);
    };
    let minutes = block_on(transformer.to_reading_time(&node, speed))?.into_diagnostic()?;
    println!("{}", minutes);
    Ok(true)
}

pub fn run_transform(transformer: &Transformer, file: &Path) -> Result<bool> {
    let Some(node) = load_node(transformer, file)? else {
        return Ok(false);
    };
    let created = block_on(async {
        transformer.prepare(&node).await?;
        transformer.transform(&node).await
    })?
    .into_diagnostic()?;

    match created {
        Some(created) => {
            println!("{}", serde_json::to_string_pretty(&created).into_diagnostic()?);
            Ok(true)
        }
        None => Ok(false),
    }
}
