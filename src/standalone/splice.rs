//! Span-based text substitution

use std::ops::Range;

/// Replace byte ranges of `text` in one pass
///
/// Edits are applied in order of their start offset. An edit overlapping an
/// earlier one is dropped, and so is one whose range is out of bounds or not
/// on a character boundary.
#[must_use]
pub fn splice(text: &str, mut edits: Vec<(Range<usize>, String)>) -> String {
    if edits.is_empty() {
        return text.to_string();
    }
    edits.sort_by_key(|(range, _)| range.start);

    let extra: usize = edits.iter().map(|(_, value)| value.len()).sum();
    let mut out = String::with_capacity(text.len() + extra);
    let mut cursor = 0;

    for (range, value) in edits {
        if range.start < cursor
            || range.end < range.start
            || range.end > text.len()
            || !text.is_char_boundary(range.start)
            || !text.is_char_boundary(range.end)
        {
            log::debug!("Dropping overlapping or invalid edit at {range:?}");
            continue;
        }
        out.push_str(&text[cursor..range.start]);
        out.push_str(&value);
        cursor = range.end;
    }

    out.push_str(&text[cursor..]);
    out
}
