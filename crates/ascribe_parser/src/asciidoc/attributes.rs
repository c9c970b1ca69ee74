//! Document attribute table and `{name}` substitution.

use std::collections::{BTreeMap, BTreeSet};

/// Attributes every document starts with.
const BUILTIN_ATTRIBUTES: &[(&str, &str)] = &[("idprefix", "_"), ("idseparator", "_"), ("sectids", "")];

/// Attribute table for one parse.
///
/// Attributes passed through [`ParseOptions`](crate::ParseOptions) are locked
/// unless their value ends in `@`, in which case the document may override
/// them.
#[derive(Debug, Clone, Default)]
pub(crate) struct AttributeStore {
    values: BTreeMap<String, String>,
    locked: BTreeSet<String>,
}

impl AttributeStore {
    pub(crate) fn new(api_attributes: &BTreeMap<String, String>) -> Self {
        let mut store = Self::default();
        for (name, value) in BUILTIN_ATTRIBUTES {
            store.values.insert(name.to_string(), value.to_string());
        }
        for (name, value) in api_attributes {
            match value.strip_suffix('@') {
                Some(soft) => {
                    store.values.insert(name.clone(), soft.to_string());
                }
                None => {
                    store.values.insert(name.clone(), value.clone());
                    store.locked.insert(name.clone());
                }
            }
        }
        store
    }

    pub(crate) fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    pub(crate) fn is_set(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    /// Sets an attribute from a document entry. Returns false if locked.
    pub(crate) fn set(&mut self, name: &str, value: impl Into<String>) -> bool {
        if self.locked.contains(name) {
            return false;
        }
        self.values.insert(name.to_string(), value.into());
        true
    }

    /// Unsets an attribute from a document entry. Returns false if locked.
    pub(crate) fn unset(&mut self, name: &str) -> bool {
        if self.locked.contains(name) {
            return false;
        }
        self.values.remove(name);
        true
    }

    /// Applies a parsed attribute entry.
    pub(crate) fn apply(&mut self, entry: AttributeEntry) {
        match entry.value {
            Some(value) => {
                let value = self.substitute(&value);
                self.set(&entry.name, value);
            }
            None => {
                self.unset(&entry.name);
            }
        }
    }

    /// Replaces `{name}` references with attribute values.
    ///
    /// Unknown references are left untouched.
    pub(crate) fn substitute(&self, text: &str) -> String {
        let mut out = String::with_capacity(text.len());
        let mut rest = text;

        while let Some(open) = rest.find('{') {
            out.push_str(&rest[..open]);
            let after = &rest[open + 1..];
            let replacement = after
                .find('}')
                .map(|close| &after[..close])
                .filter(|name| is_attribute_name(name))
                .and_then(|name| self.get(name).map(|value| (name.len(), value)));

            match replacement {
                Some((name_len, value)) => {
                    out.push_str(value);
                    rest = &after[name_len + 1..];
                }
                None => {
                    out.push('{');
                    rest = after;
                }
            }
        }
        out.push_str(rest);
        out
    }

    pub(crate) fn into_map(self) -> BTreeMap<String, String> {
        self.values
    }
}

/// A `:name: value` or `:name!:` line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct AttributeEntry {
    pub name: String,
    /// `None` unsets the attribute.
    pub value: Option<String>,
}

impl AttributeEntry {
    pub(crate) fn parse(line: &str) -> Option<Self> {
        let rest = line.strip_prefix(':')?;
        let (name, value) = rest.split_once(':')?;
        let value = value.trim();

        let unset = name.strip_suffix('!').or_else(|| name.strip_prefix('!'));
        if let Some(name) = unset {
            return is_attribute_name(name).then(|| Self {
                name: name.to_string(),
                value: None,
            });
        }

        is_attribute_name(name).then(|| Self {
            name: name.to_string(),
            value: Some(value.to_string()),
        })
    }
}

fn is_attribute_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphanumeric() || first == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn api(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[rstest]
    #[case::set(":author: Jane Doe", Some(("author", Some("Jane Doe"))))]
    #[case::empty_value(":showtitle:", Some(("showtitle", Some(""))))]
    #[case::unset_suffix(":sectids!:", Some(("sectids", None)))]
    #[case::unset_prefix(":!sectids:", Some(("sectids", None)))]
    #[case::not_entry("Just text", None)]
    #[case::empty_name(":: nope", None)]
    #[case::bad_name(":a b: c", None)]
    fn test_attribute_entry_parse(
        #[case] line: &str,
        #[case] expected: Option<(&str, Option<&str>)>,
    ) {
        let parsed = AttributeEntry::parse(line);
        let expected = expected.map(|(name, value)| AttributeEntry {
            name: name.to_string(),
            value: value.map(str::to_string),
        });
        assert_eq!(parsed, expected);
    }

    #[test]
    fn test_locked_attribute_wins_over_document() {
        let mut store = AttributeStore::new(&api(&[("imagesdir", "/static")]));
        assert!(!store.set("imagesdir", "img"));
        assert_eq!(store.get("imagesdir"), Some("/static"));
    }

    #[test]
    fn test_soft_attribute_can_be_overridden() {
        let mut store = AttributeStore::new(&api(&[("imagesdir", "/images@")]));
        assert_eq!(store.get("imagesdir"), Some("/images"));
        assert!(store.set("imagesdir", "img"));
        assert_eq!(store.get("imagesdir"), Some("img"));
    }

    #[test]
    fn test_builtin_attributes_present() {
        let store = AttributeStore::new(&BTreeMap::new());
        assert_eq!(store.get("idprefix"), Some("_"));
        assert!(store.is_set("sectids"));
    }

    #[test]
    fn test_substitute() {
        let mut store = AttributeStore::new(&BTreeMap::new());
        store.set("product", "Ascribe");
        assert_eq!(
            store.substitute("Welcome to {product}, {unknown} {}."),
            "Welcome to Ascribe, {unknown} {}."
        );
    }

    #[test]
    fn test_apply_substitutes_value() {
        let mut store = AttributeStore::new(&BTreeMap::new());
        store.set("base", "https://example.org");
        store.apply(AttributeEntry::parse(":docs: {base}/docs").unwrap());
        assert_eq!(store.get("docs"), Some("https://example.org/docs"));
    }
}
