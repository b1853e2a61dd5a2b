//! Snapshot tests for span reconciliation.
//!
//! Span sequences are rendered as `[text|tags]` runs (plain runs omit the
//! tag list) so each snapshot reads as the block would.

use super::*;
use crate::types::FormatSet;

fn describe(spans: &[Span]) -> String {
    spans
        .iter()
        .map(|s| {
            if s.format.is_empty() {
                format!("[{}]", s.content)
            } else {
                format!("[{}|{}]", s.content, s.format)
            }
        })
        .collect()
}

fn spans(runs: &[(&str, &[FormatTag])]) -> Vec<Span> {
    runs.iter()
        .map(|(text, tags)| Span::new(*text, tags.iter().copied().collect::<FormatSet>()))
        .collect()
}

fn toggle(input: &[Span], range: Range<usize>, tag: FormatTag) -> Vec<Span> {
    toggle_format(input, range, tag)
        .map(|o| o.spans)
        .unwrap_or_else(|| input.to_vec())
}

fn assert_invariants(before: &[Span], after: &[Span]) {
    let text_before: String = before.iter().map(|s| s.content.as_str()).collect();
    let text_after: String = after.iter().map(|s| s.content.as_str()).collect();
    assert_eq!(text_before, text_after, "coverage changed");
    assert!(after.iter().all(|s| !s.is_empty()), "empty span survived");
    assert!(
        after.windows(2).all(|w| w[0].format != w[1].format),
        "adjacent spans share a format: {}",
        describe(after)
    );
    assert!(after.iter().enumerate().all(|(i, s)| s.index == i));
}

// === Boundary splitting ===

#[test]
fn test_partial_overlap_splits_span() {
    let input = spans(&[("AB", &[FormatTag::Strong])]);
    let out = toggle(&input, 1..2, FormatTag::Strong);
    assert_invariants(&input, &out);
    insta::assert_snapshot!(describe(&out), @"[A|strong][B]");

    let back = toggle(&out, 1..2, FormatTag::Strong);
    assert_invariants(&out, &back);
    insta::assert_snapshot!(describe(&back), @"[AB|strong]");
}

#[test]
fn test_middle_of_span() {
    let input = spans(&[("abcdef", &[])]);
    let out = toggle(&input, 2..4, FormatTag::Italic);
    assert_invariants(&input, &out);
    insta::assert_snapshot!(describe(&out), @"[ab][cd|italic][ef]");
}

#[test]
fn test_exact_span_extent() {
    let input = spans(&[("ab", &[]), ("cd", &[FormatTag::Code]), ("ef", &[])]);
    let out = toggle(&input, 2..4, FormatTag::Code);
    assert_invariants(&input, &out);
    insta::assert_snapshot!(describe(&out), @"[abcdef]");
}

// === Uniform apply ===

#[test]
fn test_mixed_selection_add_wins() {
    let input = spans(&[("A", &[FormatTag::Strong]), ("B", &[])]);
    let outcome = toggle_format(&input, 0..2, FormatTag::Strong).unwrap();
    assert!(outcome.added);
    assert_eq!(outcome.affected, 0..1);
    assert_invariants(&input, &outcome.spans);
    insta::assert_snapshot!(describe(&outcome.spans), @"[AB|strong]");
}

#[test]
fn test_uniform_presence_removes() {
    let input = spans(&[
        ("ab", &[FormatTag::Strong]),
        ("cd", &[FormatTag::Strong, FormatTag::Italic]),
    ]);
    let outcome = toggle_format(&input, 1..3, FormatTag::Strong).unwrap();
    assert!(!outcome.added);
    assert_invariants(&input, &outcome.spans);
    insta::assert_snapshot!(
        describe(&outcome.spans),
        @"[a|strong][b][c|italic][d|strong,italic]"
    );
}

#[test]
fn test_toggle_twice_restores_partition() {
    let input = spans(&[
        ("Hel", &[]),
        ("lo wo", &[FormatTag::Italic]),
        ("rld", &[FormatTag::Strong]),
    ]);
    for tag in FormatTag::ALL {
        for range in [0..11, 2..7, 3..8, 5..6, 9..11] {
            let overlapped = partition(&input, range.clone()).overlapped;
            let uniform = overlapped.iter().all(|s| s.format.contains(tag))
                || overlapped.iter().all(|s| !s.format.contains(tag));

            let once = toggle(&input, range.clone(), tag);
            let twice = toggle(&once, range.clone(), tag);
            assert_invariants(&input, &twice);
            if uniform {
                assert_eq!(
                    describe(&twice),
                    describe(&input),
                    "{tag} over {range:?} did not round trip"
                );
            } else {
                // Mixed presence: add everywhere, then remove everywhere.
                assert!(!shared_format(&once, range.clone()).is_empty());
                assert!(!shared_format(&twice, range.clone()).contains(tag));
            }
        }
    }
}

// === Coalescing across group edges ===

#[test]
fn test_coalesces_into_left_and_right() {
    let input = spans(&[
        ("aa", &[FormatTag::Underline]),
        ("bb", &[]),
        ("cc", &[FormatTag::Underline]),
    ]);
    let outcome = toggle_format(&input, 2..4, FormatTag::Underline).unwrap();
    assert_eq!(outcome.affected, 0..1);
    insta::assert_snapshot!(describe(&outcome.spans), @"[aabbcc|underline]");
}

#[test]
fn test_affected_range_spans_several() {
    let input = spans(&[("one two three", &[])]);
    let out = toggle(&input, 0..3, FormatTag::Strong);
    let outcome = toggle_format(&out, 2..7, FormatTag::Italic).unwrap();
    assert_eq!(outcome.affected, 1..3);
    insta::assert_snapshot!(
        describe(&outcome.spans),
        @"[on|strong][e|strong,italic][ two|italic][ three]"
    );
}

// === No-ops ===

#[test]
fn test_collapsed_selection_is_noop() {
    let input = spans(&[("Hello", &[FormatTag::Strong]), (" world", &[])]);
    assert!(toggle_format(&input, 3..3, FormatTag::Strong).is_none());
    assert!(toggle_format(&input, 5..5, FormatTag::Italic).is_none());
}

#[test]
fn test_range_past_end_overlaps_nothing() {
    let input = spans(&[("abc", &[])]);
    assert!(toggle_format(&input, 3..9, FormatTag::Strong).is_none());
}

// === Typing and formatting together ===

#[test]
fn test_hello_world_scenario() {
    let typed = insert_text(&[], 0, "Hello ");
    let typed = insert_text(&typed, 6, "world");
    insta::assert_snapshot!(describe(&typed), @"[Hello world]");

    let bolded = toggle(&typed, 6..11, FormatTag::Strong);
    insta::assert_snapshot!(describe(&bolded), @"[Hello ][world|strong]");

    let outcome = toggle_format(&bolded, 3..8, FormatTag::Italic).unwrap();
    assert_invariants(&bolded, &outcome.spans);
    assert_eq!(outcome.affected, 1..3);
    insta::assert_snapshot!(
        describe(&outcome.spans),
        @"[Hel][lo |italic][wo|strong,italic][rld|strong]"
    );
}

#[test]
fn test_delete_then_coalesce() {
    let input = spans(&[("ab", &[FormatTag::Strong]), ("X", &[]), ("cd", &[FormatTag::Strong])]);
    let out = delete_range(&input, 2..3);
    insta::assert_snapshot!(describe(&out), @"[abcd|strong]");
}
