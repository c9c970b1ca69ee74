//! Options shared by parsing and conversion.

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::ParseError;

/// How much file-system access the parser is granted.
///
/// Levels are ordered from least to most restrictive.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum SafeMode {
    /// Includes may read any file.
    Unsafe,
    /// Includes are confined to the base directory.
    Safe,
    /// Same file-system rules as `Safe`.
    Server,
    /// Includes are never read; they are rendered as links.
    #[default]
    Secure,
}

impl SafeMode {
    /// Returns true if include directives may read files.
    pub fn allows_includes(&self) -> bool {
        *self < SafeMode::Secure
    }

    /// Returns true if included files must stay inside the base directory.
    pub fn jails_includes(&self) -> bool {
        *self >= SafeMode::Safe
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SafeMode::Unsafe => "unsafe",
            SafeMode::Safe => "safe",
            SafeMode::Server => "server",
            SafeMode::Secure => "secure",
        }
    }
}

impl fmt::Display for SafeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SafeMode {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "unsafe" => Ok(SafeMode::Unsafe),
            "safe" => Ok(SafeMode::Safe),
            "server" => Ok(SafeMode::Server),
            "secure" => Ok(SafeMode::Secure),
            other => Err(ParseError::invalid_source(format!(
                "unknown safe mode '{other}'"
            ))),
        }
    }
}

/// Options for a single parse or convert call.
///
/// Attribute values ending in `@` are soft defaults: the document may
/// override them. All other values win over document attribute entries.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParseOptions {
    /// Directory relative includes resolve against.
    pub base_dir: Option<PathBuf>,
    pub safe: SafeMode,
    pub attributes: BTreeMap<String, String>,
}

impl ParseOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the base directory from the path of the source file.
    pub fn with_source_path(mut self, path: impl AsRef<Path>) -> Self {
        self.base_dir = path.as_ref().parent().map(Path::to_path_buf);
        self
    }

    pub fn with_base_dir(mut self, base_dir: impl Into<PathBuf>) -> Self {
        self.base_dir = Some(base_dir.into());
        self
    }

    pub fn with_safe(mut self, safe: SafeMode) -> Self {
        self.safe = safe;
        self
    }

    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    pub fn with_attributes(mut self, attributes: BTreeMap<String, String>) -> Self {
        self.attributes.extend(attributes);
        self
    }
}
