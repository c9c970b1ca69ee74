//! Inline markup: constrained and unconstrained formatting, links and
//! cross references.

use ascribe_ast::Inline;

/// Parses a run of inline text.
///
/// Attribute references must already be substituted.
pub(crate) fn parse_inlines(src: &str) -> Vec<Inline> {
    let mut out = Vec::new();
    let mut text = String::new();
    let mut pos = 0;

    while pos < src.len() {
        if let Some((inline, consumed)) = parse_at(src, pos) {
            flush_text(&mut text, &mut out);
            out.push(inline);
            pos += consumed;
            continue;
        }
        let Some(ch) = src[pos..].chars().next() else {
            break;
        };
        text.push(ch);
        pos += ch.len_utf8();
    }

    flush_text(&mut text, &mut out);
    out
}

fn flush_text(text: &mut String, out: &mut Vec<Inline>) {
    if !text.is_empty() {
        out.push(Inline::text(std::mem::take(text)));
    }
}

/// Tries to parse an inline element starting at `pos`. Returns the element
/// and the number of bytes consumed.
fn parse_at(src: &str, pos: usize) -> Option<(Inline, usize)> {
    let rest = &src[pos..];
    let prev = src[..pos].chars().next_back();

    if rest.starts_with(" +\n") {
        return Some((Inline::LineBreak, 3));
    }
    if rest == " +" {
        return Some((Inline::LineBreak, 2));
    }
    if rest.starts_with("<<") {
        return parse_cross_reference(rest);
    }
    if let Some(macro_rest) = rest.strip_prefix("xref:") {
        let (target, text, consumed) = parse_macro(macro_rest)?;
        return Some((
            Inline::CrossReference {
                target: target.to_string(),
                children: parse_inlines(text),
            },
            consumed + "xref:".len(),
        ));
    }
    if let Some(macro_rest) = rest.strip_prefix("link:") {
        let (target, text, consumed) = parse_macro(macro_rest)?;
        return Some((
            Inline::Link {
                url: target.to_string(),
                children: parse_inlines(text),
            },
            consumed + "link:".len(),
        ));
    }
    if (rest.starts_with("https://") || rest.starts_with("http://"))
        && prev.is_none_or(|c| c.is_whitespace() || matches!(c, '(' | '<' | '['))
    {
        return parse_url(rest);
    }

    let mark = rest.chars().next()?;
    if matches!(mark, '*' | '_' | '`') {
        return parse_unconstrained(rest, mark).or_else(|| parse_constrained(rest, prev, mark));
    }

    None
}

fn formatted(mark: char, children: Vec<Inline>) -> Inline {
    match mark {
        '*' => Inline::Strong { children },
        '_' => Inline::Emphasis { children },
        _ => Inline::Monospace { children },
    }
}

/// `**text**` may appear anywhere, even inside a word.
fn parse_unconstrained(rest: &str, mark: char) -> Option<(Inline, usize)> {
    let delimiter: String = [mark, mark].iter().collect();
    let inner = rest.strip_prefix(delimiter.as_str())?;
    let close = inner.find(delimiter.as_str())?;
    if close == 0 {
        return None;
    }
    let children = parse_inlines(&inner[..close]);
    Some((formatted(mark, children), close + 4))
}

/// `*text*` must be bounded by non-word characters on the outside and by
/// non-space characters on the inside.
fn parse_constrained(rest: &str, prev: Option<char>, mark: char) -> Option<(Inline, usize)> {
    if prev.is_some_and(|c| c.is_alphanumeric() || c == mark) {
        return None;
    }
    let inner = &rest[1..];
    if inner.chars().next().is_none_or(char::is_whitespace) {
        return None;
    }

    for (close, c) in inner.char_indices() {
        if c != mark || close == 0 {
            continue;
        }
        let before = inner[..close].chars().next_back();
        let after = inner[close + 1..].chars().next();
        if before.is_some_and(|b| !b.is_whitespace())
            && after.is_none_or(|a| !a.is_alphanumeric() && a != mark)
        {
            let children = parse_inlines(&inner[..close]);
            return Some((formatted(mark, children), close + 2));
        }
    }
    None
}

/// `<<target>>` or `<<target,text>>`.
fn parse_cross_reference(rest: &str) -> Option<(Inline, usize)> {
    let inner = &rest[2..];
    let close = inner.find(">>")?;
    let body = &inner[..close];
    let (target, text) = match body.split_once(',') {
        Some((target, text)) => (target.trim(), text.trim()),
        None => (body.trim(), ""),
    };
    if target.is_empty() || target.contains(char::is_whitespace) {
        return None;
    }
    Some((
        Inline::CrossReference {
            target: target.to_string(),
            children: parse_inlines(text),
        },
        close + 4,
    ))
}

/// Parses `target[text]` after a macro name. Returns the target, the text
/// and the bytes consumed.
fn parse_macro(rest: &str) -> Option<(&str, &str, usize)> {
    let open = rest.find('[')?;
    let target = &rest[..open];
    if target.is_empty() || target.contains(char::is_whitespace) {
        return None;
    }
    let close = rest[open..].find(']')? + open;
    Some((target, &rest[open + 1..close], close + 1))
}

fn parse_url(rest: &str) -> Option<(Inline, usize)> {
    let end = rest
        .find(|c: char| c.is_whitespace() || c == '[')
        .unwrap_or(rest.len());

    if rest[end..].starts_with('[')
        && let Some((_, text, consumed)) = parse_macro(rest)
    {
        return Some((
            Inline::Link {
                url: rest[..end].to_string(),
                children: parse_inlines(text),
            },
            consumed,
        ));
    }

    let url = rest[..end].trim_end_matches(['.', ',', ';', ':', '!', '?', ')']);
    if url.ends_with("//") {
        return None;
    }
    Some((
        Inline::Link {
            url: url.to_string(),
            children: Vec::new(),
        },
        url.len(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn text(value: &str) -> Inline {
        Inline::text(value)
    }

    #[test]
    fn test_plain_text() {
        assert_eq!(parse_inlines("Hello world."), vec![text("Hello world.")]);
    }

    #[test]
    fn test_constrained_strong_and_emphasis() {
        assert_eq!(
            parse_inlines("A *bold* and _fine_ day"),
            vec![
                text("A "),
                Inline::Strong {
                    children: vec![text("bold")]
                },
                text(" and "),
                Inline::Emphasis {
                    children: vec![text("fine")]
                },
                text(" day"),
            ]
        );
    }

    #[test]
    fn test_constrained_mark_inside_word_is_literal() {
        assert_eq!(parse_inlines("snake_case_name"), vec![text("snake_case_name")]);
        assert_eq!(parse_inlines("2 * 3 * 4"), vec![text("2 * 3 * 4")]);
    }

    #[test]
    fn test_unconstrained_strong_inside_word() {
        assert_eq!(
            parse_inlines("un**believ**able"),
            vec![
                text("un"),
                Inline::Strong {
                    children: vec![text("believ")]
                },
                text("able"),
            ]
        );
    }

    #[test]
    fn test_nested_formatting() {
        assert_eq!(
            parse_inlines("*very _nested_*"),
            vec![Inline::Strong {
                children: vec![
                    text("very "),
                    Inline::Emphasis {
                        children: vec![text("nested")]
                    }
                ]
            }]
        );
    }

    #[test]
    fn test_monospace() {
        assert_eq!(
            parse_inlines("run `cargo doc` now"),
            vec![
                text("run "),
                Inline::Monospace {
                    children: vec![text("cargo doc")]
                },
                text(" now"),
            ]
        );
    }

    #[test]
    fn test_cross_reference_forms() {
        assert_eq!(
            parse_inlines("See <<_intro>> or <<_setup,the setup>>."),
            vec![
                text("See "),
                Inline::CrossReference {
                    target: "_intro".to_string(),
                    children: vec![]
                },
                text(" or "),
                Inline::CrossReference {
                    target: "_setup".to_string(),
                    children: vec![text("the setup")]
                },
                text("."),
            ]
        );
        assert_eq!(
            parse_inlines("xref:_intro[Intro]"),
            vec![Inline::CrossReference {
                target: "_intro".to_string(),
                children: vec![text("Intro")]
            }]
        );
    }

    #[test]
    fn test_bare_url_drops_trailing_punctuation() {
        assert_eq!(
            parse_inlines("Visit https://example.org."),
            vec![
                text("Visit "),
                Inline::Link {
                    url: "https://example.org".to_string(),
                    children: vec![]
                },
                text("."),
            ]
        );
    }

    #[test]
    fn test_url_with_text_and_link_macro() {
        assert_eq!(
            parse_inlines("https://example.org[Example] and link:guide.html[the guide]"),
            vec![
                Inline::Link {
                    url: "https://example.org".to_string(),
                    children: vec![text("Example")]
                },
                text(" and "),
                Inline::Link {
                    url: "guide.html".to_string(),
                    children: vec![text("the guide")]
                },
            ]
        );
    }

    #[test]
    fn test_hard_line_break() {
        assert_eq!(
            parse_inlines("first +\nsecond"),
            vec![text("first"), Inline::LineBreak, text("second")]
        );
    }

    #[test]
    fn test_unclosed_marks_stay_literal() {
        assert_eq!(parse_inlines("*not closed"), vec![text("*not closed")]);
        assert_eq!(parse_inlines("<<no end"), vec![text("<<no end")]);
    }
}
