//! Quote- and escape-aware clause splitting
//!
//! A clause boundary is any delimiter occurrence outside a double-quoted
//! region. A backslash escapes the character after it, so `\"` never opens or
//! closes a quote and `\&` never splits. Quotes and backslashes are kept in the
//! emitted clauses verbatim; nothing is unescaped here.

use std::ops::Range;

const QUOTE: u8 = b'"';
const ESCAPE: u8 = b'\\';

/// Split `text` into clauses on `delimiter`.
///
/// A leading delimiter yields a leading empty clause, a trailing delimiter
/// does not yield a trailing one, and an unterminated quote swallows the rest
/// of the input into a single final clause.
pub fn split<'a>(text: &'a str, delimiter: &str) -> Vec<&'a str> {
    split_spans(text, delimiter)
        .into_iter()
        .map(|span| &text[span])
        .collect()
}

/// Byte ranges of the clauses [`split`] would return.
pub fn split_spans(text: &str, delimiter: &str) -> Vec<Range<usize>> {
    let mut spans = Vec::new();
    if text.is_empty() {
        return spans;
    }
    if delimiter.is_empty() {
        spans.push(0..text.len());
        return spans;
    }

    let bytes = text.as_bytes();
    let find_from = |pos: usize| text[pos..].find(delimiter).map(|i| pos + i);

    let mut start = 0;
    let mut pos = 0;
    let mut quoted = false;
    let mut next = find_from(0);

    while pos < bytes.len() {
        if !quoted && next == Some(pos) {
            spans.push(start..pos);
            pos += delimiter.len();
            start = pos;
            next = find_from(pos);
            continue;
        }

        match bytes[pos] {
            ESCAPE => {
                // skip the whole escaped char so `pos` stays on a boundary
                let escaped = text[pos + 1..].chars().next().map_or(0, char::len_utf8);
                pos += 1 + escaped;
            }
            QUOTE => {
                quoted = !quoted;
                pos += 1;
                if !quoted {
                    next = find_from(pos);
                }
            }
            _ => pos += 1,
        }

        // an escape jumped over the pending delimiter
        if !quoted && matches!(next, Some(n) if n < pos) {
            next = find_from(pos);
        }
    }

    if start < bytes.len() {
        spans.push(start..bytes.len());
    }

    spans
}
