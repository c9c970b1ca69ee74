//! Views derived from a parsed or rendered document.

use std::ops::ControlFlow;

use ascribe_ast::visitor::{VisitResult, Visitor, walk_blocks, walk_document};
use ascribe_ast::{Document, Inline, Paragraph, Section};
use ascribe_parser::Converter;
use ascribe_text::{count_words, strip_tags};
use serde::{Deserialize, Serialize};

/// Reading speed used when none is given.
pub const DEFAULT_WORDS_PER_MINUTE: u32 = 230;

/// One entry of the heading outline.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Heading {
    /// 0 for the document title, otherwise the section level.
    pub depth: u8,
    /// Title converted to inline HTML, or plain text when tags are stripped.
    pub value: String,
    pub anchor: Option<String>,
}

/// Collects the document title followed by every section in document
/// order, with values converted by `converter`.
pub(crate) fn collect_headings(document: &Document, converter: &dyn Converter) -> Vec<Heading> {
    let mut headings = Vec::new();

    if let Some(title) = &document.title {
        let anchor = document
            .references
            .iter()
            .find(|reference| reference.level == 0)
            .and_then(|reference| reference.id.clone());
        headings.push(Heading {
            depth: 0,
            value: converter.convert_inlines(document, title),
            anchor,
        });
    }

    let mut collector = SectionCollector {
        document,
        converter,
        headings,
    };
    let _ = walk_document(&mut collector, document);
    collector.headings
}

struct SectionCollector<'a> {
    document: &'a Document,
    converter: &'a dyn Converter,
    headings: Vec<Heading>,
}

impl Visitor for SectionCollector<'_> {
    fn visit_section(&mut self, section: &Section) -> VisitResult {
        self.headings.push(Heading {
            depth: section.level,
            value: self.converter.convert_inlines(self.document, &section.title),
            anchor: section.id.clone(),
        });
        walk_blocks(self, &section.blocks)
    }
}

/// Applies the call-time parameters to a cached heading outline.
pub(crate) fn select_headings(
    headings: &[Heading],
    depth: Option<u8>,
    strip: bool,
) -> Vec<Heading> {
    headings
        .iter()
        .filter(|heading| depth.is_none_or(|depth| heading.depth == depth))
        .map(|heading| Heading {
            value: if strip {
                strip_tags(&heading.value)
            } else {
                heading.value.clone()
            },
            ..heading.clone()
        })
        .collect()
}

/// Counts the words of rendered HTML.
pub(crate) fn html_word_count(html: &str) -> usize {
    count_words(&strip_tags(html))
}

/// Estimated reading time in whole minutes, never less than one.
///
/// A speed of 0 means [`DEFAULT_WORDS_PER_MINUTE`].
pub fn reading_minutes(words: usize, words_per_minute: u32) -> u32 {
    let speed = match words_per_minute {
        0 => DEFAULT_WORDS_PER_MINUTE,
        speed => speed,
    };
    let minutes = (words as f64 / f64::from(speed)).round() as u32;
    minutes.max(1)
}

/// Returns the content of the first paragraph, searching sections too.
pub(crate) fn first_paragraph(document: &Document) -> Option<Vec<Inline>> {
    struct FirstParagraph(Option<Vec<Inline>>);

    impl Visitor for FirstParagraph {
        fn visit_paragraph(&mut self, paragraph: &Paragraph) -> VisitResult {
            self.0 = Some(paragraph.content.clone());
            ControlFlow::Break(())
        }
    }

    let mut finder = FirstParagraph(None);
    let _ = walk_document(&mut finder, document);
    finder.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use ascribe_parser::{AsciidocParser, HtmlConverter, ParseOptions, Parser};
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn parse(source: &str) -> Document {
        AsciidocParser::new()
            .parse(source, &ParseOptions::default())
            .unwrap()
    }

    fn heading(depth: u8, value: &str, anchor: Option<&str>) -> Heading {
        Heading {
            depth,
            value: value.to_string(),
            anchor: anchor.map(str::to_string),
        }
    }

    #[test]
    fn test_collect_headings_in_document_order() {
        let doc = parse("= Guide\n\n== Install\n\n=== From *source*\n\n== Use");
        let headings = collect_headings(&doc, &HtmlConverter::new());

        assert_eq!(
            headings,
            vec![
                heading(0, "Guide", Some("_guide")),
                heading(1, "Install", Some("_install")),
                heading(2, "From <strong>source</strong>", Some("_from_source")),
                heading(1, "Use", Some("_use")),
            ]
        );
    }

    #[test]
    fn test_collect_headings_without_ids() {
        let doc = parse(":sectids!:\n\n== Plain");
        let headings = collect_headings(&doc, &HtmlConverter::new());
        assert_eq!(headings, vec![heading(1, "Plain", None)]);
    }

    #[test]
    fn test_select_headings() {
        let headings = vec![
            heading(0, "Guide", Some("_guide")),
            heading(1, "Using <em>it</em>", Some("_using_it")),
            heading(2, "Deep", Some("_deep")),
        ];

        assert_eq!(
            select_headings(&headings, Some(1), true),
            vec![heading(1, "Using it", Some("_using_it"))]
        );
        assert_eq!(
            select_headings(&headings, Some(1), false),
            vec![heading(1, "Using <em>it</em>", Some("_using_it"))]
        );
        assert_eq!(select_headings(&headings, None, true).len(), 3);
        assert!(select_headings(&headings, Some(4), true).is_empty());
    }

    #[rstest]
    #[case::empty(0, 230, 1)]
    #[case::short(2, 230, 1)]
    #[case::rounds_down(344, 230, 1)]
    #[case::rounds_up(345, 230, 2)]
    #[case::long(2300, 230, 10)]
    #[case::custom_speed(600, 100, 6)]
    #[case::zero_speed_is_default(460, 0, 2)]
    fn test_reading_minutes(#[case] words: usize, #[case] speed: u32, #[case] expected: u32) {
        assert_eq!(reading_minutes(words, speed), expected);
    }

    #[test]
    fn test_html_word_count() {
        assert_eq!(
            html_word_count("<div class=\"paragraph\"><p>Hello <strong>big</strong> world.</p></div>"),
            3
        );
    }

    #[test]
    fn test_first_paragraph_inside_section() {
        let doc = parse("= Doc\n\n== Intro\n\nFirst words.\n\nSecond.");
        assert_eq!(first_paragraph(&doc), Some(vec![Inline::text("First words.")]));
        assert_eq!(first_paragraph(&parse("----\ncode\n----")), None);
    }
}
