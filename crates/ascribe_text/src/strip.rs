/// Entities emitted by the HTML converter, decoded back to text.
const ENTITIES: &[(&str, char)] = &[
    ("&amp;", '&'),
    ("&lt;", '<'),
    ("&gt;", '>'),
    ("&quot;", '"'),
    ("&#39;", '\''),
    ("&nbsp;", '\u{a0}'),
];

/// Removes HTML tags and decodes the common entities.
///
/// A tag is anything from `<` to the next `>`. Block-level markup leaves
/// whitespace behind so words on either side of a tag boundary stay apart;
/// inline tags such as `<strong>` are removed without a trace. An unclosed
/// `<` is kept as text.
pub fn strip_tags(html: &str) -> String {
    let mut out = String::with_capacity(html.len());
    let mut rest = html;

    while let Some(open) = rest.find('<') {
        push_decoded(&rest[..open], &mut out);
        let after = &rest[open..];
        let Some(close) = after.find('>') else {
            push_decoded(after, &mut out);
            return out;
        };

        if is_block_tag(&after[1..close]) && !out.ends_with(char::is_whitespace) && !out.is_empty()
        {
            out.push(' ');
        }
        rest = &after[close + 1..];
    }

    push_decoded(rest, &mut out);
    out
}

fn push_decoded(text: &str, out: &mut String) {
    let mut rest = text;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let after = &rest[amp..];
        match ENTITIES
            .iter()
            .find(|(entity, _)| after.starts_with(entity))
        {
            Some((entity, ch)) => {
                out.push(*ch);
                rest = &after[entity.len()..];
            }
            None => {
                out.push('&');
                rest = &after[1..];
            }
        }
    }
    out.push_str(rest);
}

fn is_block_tag(tag: &str) -> bool {
    let name = tag
        .trim_start_matches('/')
        .split(|c: char| c.is_whitespace() || c == '/')
        .next()
        .unwrap_or_default();
    matches!(
        name.to_ascii_lowercase().as_str(),
        "p" | "div" | "br" | "hr" | "li" | "ul" | "ol" | "pre" | "table" | "tr" | "td" | "th"
            | "h1" | "h2" | "h3" | "h4" | "h5" | "h6" | "blockquote"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    #[case::plain("no tags here", "no tags here")]
    #[case::inline("Using <strong>bold</strong> text", "Using bold text")]
    #[case::attributes("<a href=\"#x\" class=\"bare\">link</a>", "link")]
    #[case::entities("a &lt;b&gt; &amp; &quot;c&quot;", "a <b> & \"c\"")]
    #[case::unknown_entity("AT&T &copy;", "AT&T &copy;")]
    #[case::unclosed("1 < 2", "1 < 2")]
    fn test_strip_tags(#[case] html: &str, #[case] expected: &str) {
        assert_eq!(strip_tags(html), expected);
    }

    #[test]
    fn test_block_tags_keep_words_apart() {
        let html = "<div class=\"paragraph\"><p>one</p></div><div><p>two</p></div>";
        assert_eq!(strip_tags(html).split_whitespace().collect::<Vec<_>>(), ["one", "two"]);
    }

    #[test]
    fn test_inline_tag_inside_word() {
        assert_eq!(strip_tags("un<strong>believ</strong>able"), "unbelievable");
    }
}
