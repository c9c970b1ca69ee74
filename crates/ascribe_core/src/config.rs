//! Transformer configuration.
//!
//! Options are layered: user options override plugin defaults, which
//! override the built-in defaults. `attributes` are merged key by key.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::sync::OnceLock;

use ascribe_cache::DEFAULT_CAPACITY;
use ascribe_parser::{HtmlConverter, SafeMode};
use jsonschema::Validator;
use serde::{Deserialize, Serialize};

use crate::TransformError;

const SCHEMA_JSON: &str = include_str!("../../../schemas/v1/options.json");
static OPTIONS_SCHEMA: OnceLock<Result<Validator, String>> = OnceLock::new();

/// Default extensions handled by the transformer.
pub const DEFAULT_EXTENSIONS: &[&str] = &["adoc", "asciidoc"];

/// Default `imagesdir`. The trailing `@` lets documents override it.
pub const DEFAULT_IMAGESDIR: &str = "/images@";

/// Default excerpt length in characters.
pub const DEFAULT_EXCERPT_LENGTH: usize = 140;

/// Options as supplied by a user or a plugin. Every field is optional;
/// unset fields fall through to the next layer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PluginOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backend: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub parse: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub safe: Option<SafeMode>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attributes: BTreeMap<String, String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_extensions: Option<Vec<String>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub path_prefix: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub cache_capacity: Option<usize>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub excerpt_length: Option<usize>,
}

impl PluginOptions {
    /// Loads options from a JSON file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, TransformError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            TransformError::config(format!("Failed to read {}: {}", path.display(), e))
        })?;
        Self::from_json(&content)
    }

    /// Parses options from a JSON string with schema validation.
    pub fn from_json(json: &str) -> Result<Self, TransformError> {
        let value: serde_json::Value = serde_json::from_str(json)
            .map_err(|e| TransformError::config(format!("Invalid JSON: {}", e)))?;

        let schema = OPTIONS_SCHEMA
            .get_or_init(|| {
                let schema_json: serde_json::Value = serde_json::from_str(SCHEMA_JSON)
                    .map_err(|e| format!("Invalid embedded options schema: {}", e))?;
                Validator::new(&schema_json)
                    .map_err(|e| format!("Invalid options schema compilation: {}", e))
            })
            .as_ref()
            .map_err(|e| TransformError::config(e.clone()))?;

        if let Err(e) = schema.validate(&value) {
            return Err(TransformError::config(format!(
                "Options validation failed: {} at {}",
                e,
                e.instance_path()
            )));
        }

        serde_json::from_value(value)
            .map_err(|e| TransformError::config(format!("Invalid options: {}", e)))
    }

    /// Fills unset fields of `self` from `lower`. Attributes already in
    /// `self` win over those in `lower`.
    pub fn or(mut self, lower: PluginOptions) -> Self {
        self.backend = self.backend.or(lower.backend);
        self.parse = self.parse.or(lower.parse);
        self.safe = self.safe.or(lower.safe);
        self.file_extensions = self.file_extensions.or(lower.file_extensions);
        self.path_prefix = self.path_prefix.or(lower.path_prefix);
        self.cache_capacity = self.cache_capacity.or(lower.cache_capacity);
        self.excerpt_length = self.excerpt_length.or(lower.excerpt_length);
        for (name, value) in lower.attributes {
            self.attributes.entry(name).or_insert(value);
        }
        self
    }
}

/// Fully resolved configuration for a [`Transformer`](crate::Transformer).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransformerConfig {
    pub backend: String,
    /// Prime the parsed document when a node is prepared.
    pub parse: bool,
    pub safe: SafeMode,
    /// Attributes passed to the parser, `imagesdir` included.
    pub attributes: BTreeMap<String, String>,
    pub file_extensions: Vec<String>,
    pub path_prefix: String,
    pub cache_capacity: usize,
    pub excerpt_length: usize,
}

impl Default for TransformerConfig {
    fn default() -> Self {
        let mut attributes = BTreeMap::new();
        attributes.insert("imagesdir".to_string(), DEFAULT_IMAGESDIR.to_string());
        Self {
            backend: HtmlConverter::BACKEND.to_string(),
            parse: false,
            safe: SafeMode::default(),
            attributes,
            file_extensions: DEFAULT_EXTENSIONS.iter().map(|e| e.to_string()).collect(),
            path_prefix: String::new(),
            cache_capacity: DEFAULT_CAPACITY,
            excerpt_length: DEFAULT_EXCERPT_LENGTH,
        }
    }
}

impl TransformerConfig {
    /// Resolves user options over plugin defaults over built-in defaults.
    pub fn resolve(
        user: PluginOptions,
        plugin_defaults: PluginOptions,
    ) -> Result<Self, TransformError> {
        Self::from_options(user.or(plugin_defaults))
    }

    /// Resolves a single options layer over the built-in defaults.
    pub fn from_options(options: PluginOptions) -> Result<Self, TransformError> {
        let defaults = Self::default();

        let backend = options.backend.unwrap_or(defaults.backend);
        if backend != HtmlConverter::BACKEND {
            return Err(TransformError::config(format!(
                "Unsupported backend '{}', expected '{}'",
                backend,
                HtmlConverter::BACKEND
            )));
        }

        let cache_capacity = options.cache_capacity.unwrap_or(defaults.cache_capacity);
        if cache_capacity == 0 {
            return Err(TransformError::config("cacheCapacity must be at least 1"));
        }

        let excerpt_length = options.excerpt_length.unwrap_or(defaults.excerpt_length);
        if excerpt_length == 0 {
            return Err(TransformError::config("excerptLength must be at least 1"));
        }

        let file_extensions: Vec<String> = options
            .file_extensions
            .unwrap_or(defaults.file_extensions)
            .into_iter()
            .map(|ext| ext.trim_start_matches('.').to_ascii_lowercase())
            .collect();
        if file_extensions.is_empty() {
            return Err(TransformError::config("fileExtensions must not be empty"));
        }

        let path_prefix = options.path_prefix.unwrap_or(defaults.path_prefix);
        let mut attributes = defaults.attributes;
        attributes.extend(options.attributes);
        if let Some(images_dir) = attributes.get_mut("imagesdir") {
            *images_dir = with_path_prefix(&path_prefix, images_dir);
        }

        Ok(Self {
            backend,
            parse: options.parse.unwrap_or(defaults.parse),
            safe: options.safe.unwrap_or(defaults.safe),
            attributes,
            file_extensions,
            path_prefix,
            cache_capacity,
            excerpt_length,
        })
    }

    /// Returns true if files with `extension` are transformed.
    pub fn handles_extension(&self, extension: &str) -> bool {
        let extension = extension.trim_start_matches('.');
        self.file_extensions
            .iter()
            .any(|ext| ext.eq_ignore_ascii_case(extension))
    }
}

/// Prepends `prefix` to `path`, collapsing the first `//` that results.
pub fn with_path_prefix(prefix: &str, path: &str) -> String {
    format!("{prefix}{path}").replacen("//", "/", 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[test]
    fn test_defaults() {
        let config = TransformerConfig::default();
        assert_eq!(config.backend, "html5");
        assert!(!config.parse);
        assert_eq!(config.safe, SafeMode::Secure);
        assert_eq!(config.file_extensions, vec!["adoc", "asciidoc"]);
        assert_eq!(config.cache_capacity, 1000);
        assert_eq!(config.excerpt_length, 140);
        assert_eq!(
            config.attributes.get("imagesdir").map(String::as_str),
            Some("/images@")
        );
    }

    #[test]
    fn test_from_json_full() {
        let json = r#"{
            "backend": "html5",
            "parse": true,
            "safe": "safe",
            "attributes": { "showtitle": "", "imagesdir": "/assets" },
            "fileExtensions": ["adoc", "ad"],
            "pathPrefix": "/blog",
            "cacheCapacity": 50,
            "excerptLength": 80
        }"#;
        let options = PluginOptions::from_json(json).unwrap();
        let config = TransformerConfig::from_options(options).unwrap();

        assert!(config.parse);
        assert_eq!(config.safe, SafeMode::Safe);
        assert_eq!(config.cache_capacity, 50);
        assert_eq!(config.excerpt_length, 80);
        assert_eq!(config.file_extensions, vec!["adoc", "ad"]);
        assert_eq!(
            config.attributes.get("imagesdir").map(String::as_str),
            Some("/blog/assets")
        );
        assert!(config.attributes.contains_key("showtitle"));
    }

    #[rstest]
    #[case::unknown_field(r#"{ "colour": "blue" }"#)]
    #[case::bad_backend(r#"{ "backend": "docbook5" }"#)]
    #[case::bad_safe_mode(r#"{ "safe": "paranoid" }"#)]
    #[case::zero_capacity(r#"{ "cacheCapacity": 0 }"#)]
    #[case::non_string_attribute(r#"{ "attributes": { "toc": 3 } }"#)]
    #[case::empty_extensions(r#"{ "fileExtensions": [] }"#)]
    #[case::not_json("{ backend: ")]
    fn test_from_json_rejects(#[case] json: &str) {
        let err = PluginOptions::from_json(json).unwrap_err();
        assert!(matches!(err, TransformError::Config(_)), "{err:?}");
    }

    #[test]
    fn test_layering_user_over_plugin_over_builtin() {
        let user = PluginOptions {
            safe: Some(SafeMode::Server),
            attributes: BTreeMap::from([("toc".to_string(), "left".to_string())]),
            ..Default::default()
        };
        let plugin = PluginOptions {
            safe: Some(SafeMode::Unsafe),
            excerpt_length: Some(200),
            attributes: BTreeMap::from([
                ("toc".to_string(), "right".to_string()),
                ("icons".to_string(), "font".to_string()),
            ]),
            ..Default::default()
        };

        let config = TransformerConfig::resolve(user, plugin).unwrap();
        assert_eq!(config.safe, SafeMode::Server);
        assert_eq!(config.excerpt_length, 200);
        assert_eq!(config.cache_capacity, 1000);
        assert_eq!(config.attributes.get("toc").map(String::as_str), Some("left"));
        assert_eq!(config.attributes.get("icons").map(String::as_str), Some("font"));
        assert_eq!(
            config.attributes.get("imagesdir").map(String::as_str),
            Some("/images@")
        );
    }

    #[test]
    fn test_unsupported_backend_in_code() {
        let options = PluginOptions {
            backend: Some("docbook5".to_string()),
            ..Default::default()
        };
        assert!(TransformerConfig::from_options(options).is_err());
    }

    #[rstest]
    #[case::empty_prefix("", "/images@", "/images@")]
    #[case::root_prefix("/", "/images@", "/images@")]
    #[case::site_prefix("/blog", "/images@", "/blog/images@")]
    #[case::only_first_collapsed("/", "//cdn/img", "//cdn/img")]
    fn test_with_path_prefix(#[case] prefix: &str, #[case] path: &str, #[case] expected: &str) {
        assert_eq!(with_path_prefix(prefix, path), expected);
    }

    #[test]
    fn test_handles_extension() {
        let config = TransformerConfig::default();
        assert!(config.handles_extension("adoc"));
        assert!(config.handles_extension(".ASCIIDOC"));
        assert!(!config.handles_extension("md"));
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ascribe.json");
        std::fs::write(&path, r#"{ "excerptLength": 20 }"#).unwrap();

        let options = PluginOptions::from_file(&path).unwrap();
        assert_eq!(options.excerpt_length, Some(20));
    }
}
