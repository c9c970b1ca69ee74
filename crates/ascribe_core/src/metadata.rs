//! Typed views over document attributes: title parts, authors, revision
//! and page attributes.

use std::collections::BTreeMap;

use ascribe_ast::Document;
use serde::Serialize;

/// Prefix of attributes exposed as page attributes.
const PAGE_PREFIX: &str = "page-";

/// Separator between main title and subtitle.
const SUBTITLE_SEPARATOR: &str = ": ";

/// The document title split into main title and subtitle.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DocumentTitle {
    /// The combined title.
    pub title: Option<String>,
    pub subtitle: Option<String>,
    pub main: Option<String>,
}

impl DocumentTitle {
    /// Splits on the last `": "`. A title without one is all main title.
    pub fn partition(title: Option<&str>) -> Self {
        let Some(title) = title else {
            return Self::default();
        };
        let (main, subtitle) = match title.rsplit_once(SUBTITLE_SEPARATOR) {
            Some((main, subtitle)) => (main.to_string(), Some(subtitle.to_string())),
            None => (title.to_string(), None),
        };
        Self {
            title: Some(title.to_string()),
            subtitle,
            main: Some(main),
        }
    }
}

/// One document author.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Author {
    pub name: Option<String>,
    pub first_name: Option<String>,
    pub middle_name: Option<String>,
    pub last_name: Option<String>,
    pub initials: Option<String>,
    pub email: Option<String>,
}

/// Document revision information.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Revision {
    pub date: Option<String>,
    pub number: Option<String>,
    pub remark: Option<String>,
}

/// Returns the authors in header order.
///
/// The first author uses the plain attribute names (`author`, `email`,
/// ...), the N-th author (N >= 2) the `_N` suffixed names.
pub fn authors(document: &Document) -> Vec<Author> {
    let declared = document
        .attribute("authorcount")
        .and_then(|count| count.parse::<usize>().ok());

    let mut authors = Vec::new();
    for index in 1.. {
        if declared.is_some_and(|count| index > count) {
            break;
        }
        let suffix = match index {
            1 => String::new(),
            n => format!("_{n}"),
        };
        let get = |name: &str| document.attribute(&format!("{name}{suffix}")).map(str::to_string);

        let author = Author {
            name: get("author"),
            first_name: get("firstname"),
            middle_name: get("middlename"),
            last_name: get("lastname"),
            initials: get("authorinitials"),
            email: get("email"),
        };
        if author == Author::default() {
            break;
        }
        authors.push(author);
    }
    authors
}

/// Returns the revision, or `None` if no revision attribute is set.
pub fn revision(document: &Document) -> Option<Revision> {
    let get = |name: &str| document.attribute(name).map(str::to_string);
    let revision = Revision {
        date: get("revdate"),
        number: get("revnumber"),
        remark: get("revremark"),
    };
    (revision != Revision::default()).then_some(revision)
}

/// Returns attributes prefixed with `page-`, with the prefix removed.
pub fn page_attributes(document: &Document) -> BTreeMap<String, String> {
    document
        .attributes
        .iter()
        .filter_map(|(name, value)| {
            name.strip_prefix(PAGE_PREFIX)
                .filter(|name| !name.is_empty())
                .map(|name| (name.to_string(), value.clone()))
        })
        .collect()
}
