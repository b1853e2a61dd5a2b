//! Text edits over a span sequence.
//!
//! Same shape as the toggle path: derive the new sequence into a local value
//! and coalesce, leaving installation to the caller.

use std::ops::Range;

use super::partition::{coalesce, partition};
use crate::span::{Span, char_to_byte};

/// Insert `text` at a char offset.
///
/// The text joins the span the offset follows, so it inherits that span's
/// format set. At offset zero it joins the first span; in an empty block it
/// becomes a plain span.
pub fn insert_text(spans: &[Span], offset: usize, text: &str) -> Vec<Span> {
    let mut out = spans.to_vec();
    if text.is_empty() {
        return out;
    }

    let mut start = 0;
    let mut target = None;
    for (i, span) in out.iter().enumerate() {
        let end = start + span.char_len();
        if (offset > start || i == 0) && offset <= end {
            target = Some((i, offset - start));
            break;
        }
        start = end;
    }
    // Past the end: append to the last span.
    let target = target.or_else(|| out.last().map(|s| (out.len() - 1, s.char_len())));

    match target {
        Some((i, at)) => {
            let byte = char_to_byte(&out[i].content, at);
            out[i].content.insert_str(byte, text);
        }
        None => out.push(Span::plain(text)),
    }
    reindexed(coalesce(out))
}

/// Delete a char range.
pub fn delete_range(spans: &[Span], range: Range<usize>) -> Vec<Span> {
    if range.is_empty() {
        return spans.to_vec();
    }
    let parts = partition(spans, range);
    let mut out = parts.left;
    out.extend(parts.right);
    reindexed(coalesce(out))
}

fn reindexed(mut spans: Vec<Span>) -> Vec<Span> {
    for (i, span) in spans.iter_mut().enumerate() {
        span.index = i;
    }
    spans
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{FormatSet, FormatTag};

    fn bold() -> FormatSet {
        FormatSet::from([FormatTag::Strong])
    }

    fn texts(spans: &[Span]) -> Vec<&str> {
        spans.iter().map(|s| s.content.as_str()).collect()
    }

    #[test]
    fn test_insert_into_empty() {
        let out = insert_text(&[], 0, "Hello");
        assert_eq!(texts(&out), vec!["Hello"]);
        assert!(out[0].format.is_empty());
    }

    #[test]
    fn test_insert_inherits_left_span() {
        let spans = vec![Span::new("ab", bold()), Span::plain("cd")];
        let out = insert_text(&spans, 2, "X");
        assert_eq!(texts(&out), vec!["abX", "cd"]);

        let out = insert_text(&spans, 0, "X");
        assert_eq!(texts(&out), vec!["Xab", "cd"]);

        let out = insert_text(&spans, 4, "X");
        assert_eq!(texts(&out), vec!["ab", "cdX"]);
    }

    #[test]
    fn test_insert_multibyte() {
        let spans = vec![Span::plain("héllo")];
        let out = insert_text(&spans, 2, "ü");
        assert_eq!(texts(&out), vec!["héüllo"]);
    }

    #[test]
    fn test_delete_merges_neighbours() {
        let spans = vec![Span::new("ab", bold()), Span::plain("c"), Span::new("de", bold())];
        let out = delete_range(&spans, 2..3);
        assert_eq!(texts(&out), vec!["abde"]);
        assert_eq!(out[0].index, 0);
    }

    #[test]
    fn test_delete_everything() {
        let spans = vec![Span::new("ab", bold()), Span::plain("cd")];
        assert!(delete_range(&spans, 0..4).is_empty());
    }
}
