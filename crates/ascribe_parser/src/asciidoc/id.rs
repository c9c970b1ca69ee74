//! Anchor id generation for titles.

use std::collections::HashSet;

/// Derives an anchor id from plain title text.
///
/// Lower-cases the text, drops characters that are not word characters,
/// and turns runs of spaces, dots and hyphens into a single separator.
pub(crate) fn generate_id(title: &str, prefix: &str, separator: &str) -> String {
    let mut id = String::from(prefix);
    let mut pending_separator = false;

    for c in title.trim().chars().flat_map(char::to_lowercase) {
        if c.is_alphanumeric() || c == '_' {
            if pending_separator {
                id.push_str(separator);
                pending_separator = false;
            }
            id.push(c);
        } else if matches!(c, ' ' | '.' | '-') && id.len() > prefix.len() {
            pending_separator = true;
        }
    }

    id
}

/// Tracks ids already in use so generated ids stay unique.
#[derive(Debug, Default)]
pub(crate) struct IdRegistry {
    used: HashSet<String>,
}

impl IdRegistry {
    /// Registers an explicit id. Returns false if it was already taken.
    pub(crate) fn register(&mut self, id: &str) -> bool {
        self.used.insert(id.to_string())
    }

    /// Registers `base`, or `base{separator}N` for the first free N >= 2.
    pub(crate) fn unique(&mut self, base: String, separator: &str) -> String {
        if self.used.insert(base.clone()) {
            return base;
        }
        let mut counter = 2;
        loop {
            let candidate = format!("{base}{separator}{counter}");
            if self.used.insert(candidate.clone()) {
                return candidate;
            }
            counter += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::single_word("Title", "_title")]
    #[case::spaces("Hello World", "_hello_world")]
    #[case::punctuation("What's new?", "_whats_new")]
    #[case::hyphen_and_dots("v1.2 - Release notes", "_v1_2_release_notes")]
    #[case::trailing_space_run("Ends with dots...", "_ends_with_dots")]
    #[case::unicode("Überblick", "_überblick")]
    fn test_generate_id(#[case] title: &str, #[case] expected: &str) {
        assert_eq!(generate_id(title, "_", "_"), expected);
    }

    #[test]
    fn test_generate_id_custom_prefix_and_separator() {
        assert_eq!(generate_id("Getting Started", "", "-"), "getting-started");
    }

    #[test]
    fn test_unique_appends_counter() {
        let mut registry = IdRegistry::default();
        assert_eq!(registry.unique("_intro".to_string(), "_"), "_intro");
        assert_eq!(registry.unique("_intro".to_string(), "_"), "_intro_2");
        assert_eq!(registry.unique("_intro".to_string(), "_"), "_intro_3");
    }

    #[test]
    fn test_register_reports_duplicates() {
        let mut registry = IdRegistry::default();
        assert!(registry.register("custom"));
        assert!(!registry.register("custom"));
    }
}
