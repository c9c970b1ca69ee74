//! Line splitting and `include::` expansion.

use std::fs;
use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};

use tracing::{debug, warn};

use crate::{ParseError, ParseOptions};

/// Includes nested deeper than this are rejected.
pub(crate) const MAX_INCLUDE_DEPTH: usize = 64;

/// A line of the expanded source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct SourceLine {
    pub text: String,
    /// Byte offset of the line start in the expanded source.
    pub offset: u32,
    /// Byte offset of the line end, excluding the newline.
    pub end: u32,
}

/// Splits `source` into lines, expanding include directives as permitted by
/// the safe mode in `options`.
pub(crate) fn expand(source: &str, options: &ParseOptions) -> Result<Vec<SourceLine>, ParseError> {
    let mut raw = Vec::new();
    let root = options.base_dir.as_deref();
    expand_into(source, root, options, 0, &mut raw)?;
    number_lines(raw, 0)
}

fn too_large() -> ParseError {
    ParseError::invalid_source("expanded source is larger than 4 GiB")
}

/// Attaches byte offsets to `raw`, starting at `start`.
///
/// Fails once an offset no longer fits in a `u32`.
fn number_lines(raw: Vec<String>, start: u32) -> Result<Vec<SourceLine>, ParseError> {
    let mut next = Some(start);
    raw.into_iter()
        .map(|text| {
            let offset = next.ok_or_else(too_large)?;
            let end = u32::try_from(text.len())
                .ok()
                .and_then(|len| offset.checked_add(len))
                .ok_or_else(too_large)?;
            next = end.checked_add(1);
            Ok::<_, ParseError>(SourceLine { offset, end, text })
        })
        .collect()
}

fn expand_into(
    source: &str,
    dir: Option<&Path>,
    options: &ParseOptions,
    depth: usize,
    out: &mut Vec<String>,
) -> Result<(), ParseError> {
    if depth > MAX_INCLUDE_DEPTH {
        return Err(ParseError::IncludeDepth(MAX_INCLUDE_DEPTH));
    }

    for line in source.lines() {
        match include_target(line) {
            Some(target) => expand_include(target, dir, options, depth, out)?,
            None => out.push(line.to_string()),
        }
    }

    Ok(())
}

/// Returns the target of an `include::target[...]` line.
fn include_target(line: &str) -> Option<&str> {
    let rest = line.strip_prefix("include::")?.strip_suffix(']')?;
    let (target, _attrs) = rest.split_once('[')?;
    if target.is_empty() || target.contains(char::is_whitespace) {
        return None;
    }
    Some(target)
}

fn expand_include(
    target: &str,
    dir: Option<&Path>,
    options: &ParseOptions,
    depth: usize,
    out: &mut Vec<String>,
) -> Result<(), ParseError> {
    if !options.safe.allows_includes() {
        out.push(format!("link:{target}[]"));
        return Ok(());
    }

    let path = match dir {
        Some(dir) => dir.join(target),
        None => PathBuf::from(target),
    };

    if options.safe.jails_includes() && !is_jailed(&path, options.base_dir.as_deref()) {
        warn!(
            "include target {} is outside of the base directory, skipping",
            path.display()
        );
        out.push(unresolved(target));
        return Ok(());
    }

    match fs::read_to_string(&path) {
        Ok(content) => {
            debug!("Including {}", path.display());
            expand_into(&content, path.parent(), options, depth + 1, out)
        }
        Err(e) if e.kind() == ErrorKind::NotFound => {
            warn!("include file not found: {}", path.display());
            out.push(unresolved(target));
            Ok(())
        }
        Err(source) => Err(ParseError::Include { path, source }),
    }
}

fn unresolved(target: &str) -> String {
    format!("Unresolved directive - include::{target}[]")
}

/// Returns true if `path` stays inside `root`, both with `.` and `..`
/// resolved lexically and with symlinks followed.
fn is_jailed(path: &Path, root: Option<&Path>) -> bool {
    let Some(normalized) = normalize(path) else {
        return false;
    };
    let lexically_inside = match root {
        Some(root) => normalize(root).is_some_and(|root| normalized.starts_with(root)),
        None => normalized.is_relative(),
    };
    lexically_inside && resolves_inside(path, root)
}

/// Checks the real location of `path` against the real location of `root`
/// (the working directory when there is none).
///
/// A missing target passes here and is reported as missing when read.
fn resolves_inside(path: &Path, root: Option<&Path>) -> bool {
    let resolved = match fs::canonicalize(path) {
        Ok(resolved) => resolved,
        Err(e) => return e.kind() == ErrorKind::NotFound,
    };
    let root = match root {
        Some(root) => fs::canonicalize(root),
        None => std::env::current_dir().and_then(fs::canonicalize),
    };
    root.is_ok_and(|root| resolved.starts_with(root))
}

fn normalize(path: &Path) -> Option<PathBuf> {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() {
                    return None;
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    Some(out)
}
