//! Author and revision lines of the document header.
//!
//! Both lines are folded into the attribute table under the standard
//! names (`author`, `firstname`, `email`, `revnumber`, ...). Authors after
//! the first use an `_N` suffix, so the second author is `author_2`.

use super::attributes::AttributeStore;

/// Applies an author line such as
/// `Jane Q. Doe <jane@example.org>; John Roe`.
pub(crate) fn apply_author_line(line: &str, attrs: &mut AttributeStore) {
    let authors: Vec<&str> = line
        .split(';')
        .map(str::trim)
        .filter(|author| !author.is_empty())
        .collect();

    for (index, author) in authors.iter().enumerate() {
        let suffix = match index {
            0 => String::new(),
            n => format!("_{}", n + 1),
        };
        apply_author(author, &suffix, attrs);
    }

    if !authors.is_empty() {
        attrs.set("authorcount", authors.len().to_string());
    }
}

fn apply_author(author: &str, suffix: &str, attrs: &mut AttributeStore) {
    let (name, email) = match author.split_once('<') {
        Some((name, email)) => (name.trim(), Some(email.trim().trim_end_matches('>').trim())),
        None => (author.trim(), None),
    };

    let parts: Vec<String> = name
        .split_whitespace()
        .map(|part| part.replace('_', " "))
        .collect();
    let Some(first) = parts.first() else {
        return;
    };

    let (middle, last) = match parts.len() {
        1 => (None, None),
        2 => (None, Some(parts[1].clone())),
        _ => (Some(parts[1].clone()), Some(parts[2..].join(" "))),
    };

    let initials: String = [Some(first), middle.as_ref(), last.as_ref()]
        .into_iter()
        .flatten()
        .filter_map(|part| part.chars().next())
        .collect();

    attrs.set(&format!("author{suffix}"), parts.join(" "));
    attrs.set(&format!("firstname{suffix}"), first.clone());
    if let Some(middle) = middle {
        attrs.set(&format!("middlename{suffix}"), middle);
    }
    if let Some(last) = last {
        attrs.set(&format!("lastname{suffix}"), last);
    }
    attrs.set(&format!("authorinitials{suffix}"), initials);
    if let Some(email) = email.filter(|email| !email.is_empty()) {
        attrs.set(&format!("email{suffix}"), email);
    }
}

/// Fills in name parts when the author came from an `:author:` entry
/// rather than an author line.
pub(crate) fn derive_author_from_attribute(attrs: &mut AttributeStore) {
    if attrs.is_set("firstname") {
        return;
    }
    let Some(author) = attrs.get("author").map(str::to_string) else {
        return;
    };
    let email = attrs.get("email").map(str::to_string);
    apply_author(&author, "", attrs);
    if let Some(email) = email {
        attrs.set("email", email);
    }
    attrs.set("authorcount", "1");
}

/// Applies a revision line such as `v1.0, 2024-01-01: First draft`.
pub(crate) fn apply_revision_line(line: &str, attrs: &mut AttributeStore) {
    let (head, remark) = match line.split_once(": ") {
        Some((head, remark)) => (head.trim(), Some(remark.trim())),
        None => (line.trim(), None),
    };

    let (number, date) = match head.split_once(',') {
        Some((number, date)) => (Some(number.trim()), Some(date.trim())),
        None if looks_like_version(head) => (Some(head), None),
        None => (None, Some(head)),
    };

    if let Some(number) = number.filter(|n| !n.is_empty()) {
        let number = number
            .strip_prefix(['v', 'V'])
            .unwrap_or(number);
        attrs.set("revnumber", number);
    }
    if let Some(date) = date.filter(|d| !d.is_empty()) {
        attrs.set("revdate", date);
    }
    if let Some(remark) = remark.filter(|r| !r.is_empty()) {
        attrs.set("revremark", remark);
    }
}

fn looks_like_version(text: &str) -> bool {
    let mut chars = text.chars();
    match chars.next() {
        Some('v' | 'V') => chars.next().is_some_and(|c| c.is_ascii_digit()),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;

    fn store() -> AttributeStore {
        AttributeStore::new(&BTreeMap::new())
    }

    #[test]
    fn test_single_author_with_email() {
        let mut attrs = store();
        apply_author_line("Jane Q. Doe <jane@example.org>", &mut attrs);

        assert_eq!(attrs.get("author"), Some("Jane Q. Doe"));
        assert_eq!(attrs.get("firstname"), Some("Jane"));
        assert_eq!(attrs.get("middlename"), Some("Q."));
        assert_eq!(attrs.get("lastname"), Some("Doe"));
        assert_eq!(attrs.get("authorinitials"), Some("JQD"));
        assert_eq!(attrs.get("email"), Some("jane@example.org"));
        assert_eq!(attrs.get("authorcount"), Some("1"));
    }

    #[test]
    fn test_multiple_authors_use_suffixes() {
        let mut attrs = store();
        apply_author_line("Jane Doe; John Roe <john@example.org>", &mut attrs);

        assert_eq!(attrs.get("author"), Some("Jane Doe"));
        assert_eq!(attrs.get("author_2"), Some("John Roe"));
        assert_eq!(attrs.get("email_2"), Some("john@example.org"));
        assert_eq!(attrs.get("email"), None);
        assert_eq!(attrs.get("authorcount"), Some("2"));
    }

    #[test]
    fn test_underscore_joins_compound_names() {
        let mut attrs = store();
        apply_author_line("Ann Van_Der_Berg", &mut attrs);
        assert_eq!(attrs.get("lastname"), Some("Van Der Berg"));
    }

    #[test]
    fn test_derive_author_from_attribute() {
        let mut attrs = store();
        attrs.set("author", "Kismet Chameleon");
        attrs.set("email", "kismet@asciidoctor.org");
        derive_author_from_attribute(&mut attrs);

        assert_eq!(attrs.get("firstname"), Some("Kismet"));
        assert_eq!(attrs.get("lastname"), Some("Chameleon"));
        assert_eq!(attrs.get("email"), Some("kismet@asciidoctor.org"));
    }

    #[test]
    fn test_full_revision_line() {
        let mut attrs = store();
        apply_revision_line("v1.2, 2024-03-01: Second draft", &mut attrs);

        assert_eq!(attrs.get("revnumber"), Some("1.2"));
        assert_eq!(attrs.get("revdate"), Some("2024-03-01"));
        assert_eq!(attrs.get("revremark"), Some("Second draft"));
    }

    #[test]
    fn test_revision_line_with_only_date() {
        let mut attrs = store();
        apply_revision_line("2024-03-01", &mut attrs);

        assert_eq!(attrs.get("revnumber"), None);
        assert_eq!(attrs.get("revdate"), Some("2024-03-01"));
    }

    #[test]
    fn test_revision_line_with_only_version() {
        let mut attrs = store();
        apply_revision_line("v3.0", &mut attrs);
        assert_eq!(attrs.get("revnumber"), Some("3.0"));
        assert_eq!(attrs.get("revdate"), None);
    }
}
