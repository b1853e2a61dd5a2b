//! Pure span-sequence transforms: partition around a range, uniform toggle,
//! and coalescing.
//!
//! Nothing here touches the substrate. Every function takes the current span
//! sequence by reference and returns a new one.

use std::ops::Range;

use crate::span::Span;
use crate::types::{FormatSet, FormatTag};

/// A span sequence split around a char range.
///
/// Boundary spans are cut at the exact range edges, so `overlapped` covers
/// the range precisely and the three groups concatenate back to the input.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Partition {
    pub left: Vec<Span>,
    pub overlapped: Vec<Span>,
    pub right: Vec<Span>,
}

/// Split `spans` into the parts before, inside and after `range`.
pub fn partition(spans: &[Span], range: Range<usize>) -> Partition {
    let mut out = Partition::default();
    let mut start = 0;
    for span in spans {
        let len = span.char_len();
        let end = start + len;
        if end <= range.start {
            out.left.push(span.clone());
        } else if start >= range.end {
            out.right.push(span.clone());
        } else {
            let mut piece = span.clone();
            if start < range.start {
                let (kept, rest) = piece.split_at(range.start - start);
                out.left.push(kept);
                piece = rest;
            }
            let piece_start = start.max(range.start);
            if end > range.end {
                let (inside, kept) = piece.split_at(range.end - piece_start);
                out.overlapped.push(inside);
                out.right.push(kept);
            } else {
                out.overlapped.push(piece);
            }
        }
        start = end;
    }
    out
}

/// Whether toggling `tag` over `spans` adds it.
///
/// The tag is removed only when every span already carries it; any partial
/// presence resolves to adding it everywhere.
pub fn toggle_adds(spans: &[Span], tag: FormatTag) -> bool {
    !spans.iter().all(|s| s.format.contains(tag))
}

/// Merge adjacent spans with equal format sets and drop empty ones.
pub fn coalesce(spans: Vec<Span>) -> Vec<Span> {
    coalesce_marked(spans.into_iter().map(|s| (s, false)).collect())
        .into_iter()
        .map(|(s, _)| s)
        .collect()
}

/// Coalesce while tracking a per-span mark. A merged span is marked if
/// either input was.
pub(crate) fn coalesce_marked(spans: Vec<(Span, bool)>) -> Vec<(Span, bool)> {
    let mut out: Vec<(Span, bool)> = Vec::with_capacity(spans.len());
    for (span, marked) in spans {
        if span.is_empty() {
            continue;
        }
        match out.last_mut() {
            Some((prev, prev_marked)) if prev.same_format(&span) => {
                prev.absorb(span);
                *prev_marked |= marked;
            }
            _ => out.push((span, marked)),
        }
    }
    out
}

/// Result of toggling a tag over a range.
#[derive(Debug, Clone, PartialEq)]
pub struct ToggleOutcome {
    /// The new span sequence, coalesced and reindexed.
    pub spans: Vec<Span>,
    /// Indices into `spans` covering the originally overlapped text.
    pub affected: Range<usize>,
    /// Whether the tag was added (true) or removed (false).
    pub added: bool,
}

/// Toggle `tag` over the char `range` of a span sequence.
///
/// Returns `None` when the range overlaps no text, which includes every
/// collapsed range.
pub fn toggle_format(spans: &[Span], range: Range<usize>, tag: FormatTag) -> Option<ToggleOutcome> {
    if range.is_empty() {
        return None;
    }
    let Partition {
        left,
        overlapped,
        right,
    } = partition(spans, range.clone());
    if overlapped.is_empty() {
        return None;
    }

    // Decided once, from the untouched formats.
    let added = toggle_adds(&overlapped, tag);

    tracing::trace!(
        target: "weaver::reconcile",
        ?range,
        %tag,
        added,
        left = left.len(),
        overlapped = overlapped.len(),
        right = right.len(),
        "partitioned spans"
    );

    let marked = left
        .into_iter()
        .map(|s| (s, false))
        .chain(overlapped.iter().map(|s| (s.toggled(tag, added), true)))
        .chain(right.into_iter().map(|s| (s, false)))
        .collect();
    let merged = coalesce_marked(marked);

    let first = merged.iter().position(|(_, m)| *m)?;
    let last = merged.iter().rposition(|(_, m)| *m)?;
    let mut spans: Vec<Span> = merged.into_iter().map(|(s, _)| s).collect();
    for (i, span) in spans.iter_mut().enumerate() {
        span.index = i;
    }

    Some(ToggleOutcome {
        spans,
        affected: first..last + 1,
        added,
    })
}

/// The format set shared by every span overlapping `range`.
///
/// A collapsed range reports the span the caret follows (or the first span
/// at offset zero).
pub fn shared_format(spans: &[Span], range: Range<usize>) -> FormatSet {
    if range.is_empty() {
        let mut start = 0;
        for (i, span) in spans.iter().enumerate() {
            let end = start + span.char_len();
            if (range.start > start || i == 0) && range.start <= end {
                return span.format;
            }
            start = end;
        }
        return FormatSet::empty();
    }
    let overlapped = partition(spans, range).overlapped;
    let mut iter = overlapped.iter();
    let Some(first) = iter.next() else {
        return FormatSet::empty();
    };
    iter.fold(first.format, |acc, span| {
        acc.iter().filter(|tag| span.format.contains(*tag)).collect()
    })
}
