//! Input document nodes.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::UNIX_EPOCH;

use ascribe_cache::FingerprintSource;
use serde::{Deserialize, Serialize};

use crate::TransformError;

/// A source document handed to the transformer.
///
/// The transformer only reads nodes. Missing fields deserialize as empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DocumentNode {
    /// Stable node id, used to derive the ids of created nodes.
    pub id: String,
    /// Raw AsciiDoc source.
    pub content: String,
    /// File extension without the dot.
    pub extension: String,
    pub internal: NodeInternal,
    pub file_info: FileInfo,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NodeInternal {
    /// Stable path or identifier of the source.
    pub origin: String,
    /// Last-modified marker, in milliseconds since the Unix epoch.
    pub timestamp: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FileInfo {
    /// Path relative includes and images resolve against.
    pub path: PathBuf,
}

impl DocumentNode {
    pub fn new(id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            content: content.into(),
            ..Default::default()
        }
    }

    /// Builds a node from a file on disk.
    ///
    /// The origin is the canonical path and the timestamp is the file's
    /// modification time.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, TransformError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;
        let canonical = path.canonicalize()?;
        let timestamp = fs::metadata(path)?
            .modified()
            .ok()
            .and_then(|modified| modified.duration_since(UNIX_EPOCH).ok())
            .map_or(0, |elapsed| elapsed.as_millis() as u64);
        let origin = canonical.to_string_lossy().into_owned();

        Ok(Self {
            id: origin.clone(),
            content,
            extension: path
                .extension()
                .map(|ext| ext.to_string_lossy().into_owned())
                .unwrap_or_default(),
            internal: NodeInternal { origin, timestamp },
            file_info: FileInfo { path: canonical },
        })
    }

    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = extension.into();
        self
    }

    pub fn with_origin(mut self, origin: impl Into<String>) -> Self {
        self.internal.origin = origin.into();
        self
    }

    pub fn with_timestamp(mut self, timestamp: u64) -> Self {
        self.internal.timestamp = timestamp;
        self
    }

    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.file_info.path = path.into();
        self
    }

    /// Directory relative references in the document resolve against.
    pub fn base_dir(&self) -> Option<&Path> {
        self.file_info
            .path
            .parent()
            .filter(|dir| !dir.as_os_str().is_empty())
    }
}

impl FingerprintSource for DocumentNode {
    fn content(&self) -> &str {
        &self.content
    }

    fn origin(&self) -> &str {
        &self.internal.origin
    }

    fn timestamp(&self) -> u64 {
        self.internal.timestamp
    }
}
