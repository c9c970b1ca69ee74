use unicode_segmentation::UnicodeSegmentation;

/// Appended to truncated text.
pub const ELLIPSIS: char = '…';

/// Counts words using Unicode word boundaries (UAX #29).
///
/// Punctuation and whitespace are not words. Scripts without spaces, such
/// as Japanese, count each ideographic segment.
pub fn count_words(text: &str) -> usize {
    text.unicode_words().count()
}

/// Truncates `text` to at most `max_chars` characters, cutting at the last
/// word boundary that fits and appending [`ELLIPSIS`].
///
/// Whitespace runs are collapsed first. Text that already fits is returned
/// unchanged apart from that collapsing. The ellipsis is not counted
/// against `max_chars`.
pub fn truncate_words(text: &str, max_chars: usize) -> String {
    let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.chars().count() <= max_chars {
        return collapsed;
    }

    let mut end = 0;
    for (index, word) in collapsed.split_word_bound_indices() {
        let word_end = index + word.len();
        if collapsed[..word_end].chars().count() > max_chars {
            break;
        }
        end = word_end;
    }

    if end == 0 {
        // First word alone is longer than the limit.
        end = collapsed
            .char_indices()
            .nth(max_chars)
            .map_or(collapsed.len(), |(i, _)| i);
    }

    let mut out = collapsed[..end].trim_end().to_string();
    out.push(ELLIPSIS);
    out
}
