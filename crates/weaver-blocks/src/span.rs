//! Fragment model: styled spans and the blocks that own them.
//!
//! A `Block` owns an ordered run of `Span`s whose concatenated content is the
//! block's text. Adjacent spans never share a format set; the reconciliation
//! engine restores that after every edit.

use std::ops::Range;

use crate::style::Presentation;
use crate::types::{BlockId, BlockKind, DomPoint, FormatSet, FormatTag, NodeId};

/// A contiguous run of text sharing one format set.
#[derive(Debug, Clone, PartialEq)]
pub struct Span {
    /// Position within the block, reassigned on every reconciliation pass.
    pub index: usize,
    pub content: String,
    pub format: FormatSet,
    /// Cached fragment presentation. Registry-managed properties are
    /// recomputed on every render; anything else set here survives.
    pub presentation: Presentation,
    /// Rendered fragment node, once the span has been rendered.
    pub node: Option<NodeId>,
}

impl Span {
    pub fn new(content: impl Into<String>, format: FormatSet) -> Self {
        Self {
            index: 0,
            content: content.into(),
            format,
            presentation: Presentation::new(),
            node: None,
        }
    }

    /// A span with no formatting.
    pub fn plain(content: impl Into<String>) -> Self {
        Self::new(content, FormatSet::empty())
    }

    /// Length in chars.
    pub fn char_len(&self) -> usize {
        self.content.chars().count()
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    /// Whether two spans should be merged when adjacent.
    pub fn same_format(&self, other: &Span) -> bool {
        self.format == other.format
    }

    /// A fresh span with `tag` added or removed.
    pub fn toggled(&self, tag: FormatTag, add: bool) -> Span {
        let format = if add {
            self.format.with(tag)
        } else {
            self.format.without(tag)
        };
        Span {
            format,
            ..self.clone()
        }
    }

    /// Split at a char offset. Both halves keep the format set.
    ///
    /// The right half is unrendered until the next render pass.
    pub fn split_at(&self, char_offset: usize) -> (Span, Span) {
        let byte = char_to_byte(&self.content, char_offset);
        let (left, right) = self.content.split_at(byte);
        let left = Span {
            content: left.to_string(),
            ..self.clone()
        };
        let right = Span {
            content: right.to_string(),
            node: None,
            ..self.clone()
        };
        (left, right)
    }

    /// Append another span's text, keeping this span's identity.
    pub fn absorb(&mut self, other: Span) {
        self.content.push_str(&other.content);
    }
}

/// Convert a char offset into a byte offset, clamped to the string length.
pub(crate) fn char_to_byte(s: &str, char_offset: usize) -> usize {
    s.char_indices()
        .nth(char_offset)
        .map(|(byte, _)| byte)
        .unwrap_or(s.len())
}

/// Where a substrate point falls relative to a block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointLocation {
    /// Inside the block, at this char offset.
    Inside(usize),
    /// Not in the block's rendered subtree.
    Outside,
}

/// One paragraph-level editable unit.
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub id: BlockId,
    pub kind: BlockKind,
    /// The rendered container owning this block's presentation.
    pub container: NodeId,
    pub spans: Vec<Span>,
}

impl Block {
    /// A fresh, empty block.
    pub fn new(id: BlockId, container: NodeId) -> Self {
        Self {
            id,
            kind: BlockKind::General,
            container,
            spans: Vec::new(),
        }
    }

    /// The block's full text.
    pub fn text(&self) -> String {
        self.spans.iter().map(|s| s.content.as_str()).collect()
    }

    /// Length in chars.
    pub fn char_len(&self) -> usize {
        self.spans.iter().map(Span::char_len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.spans.iter().all(Span::is_empty)
    }

    /// Char range covered by each span, in order.
    pub fn span_ranges(&self) -> Vec<Range<usize>> {
        let mut start = 0;
        self.spans
            .iter()
            .map(|span| {
                let end = start + span.char_len();
                let range = start..end;
                start = end;
                range
            })
            .collect()
    }

    /// Map a substrate point to a char offset in this block.
    ///
    /// Container points count whole spans before the child index; fragment
    /// points add the in-fragment offset to the fragment's start.
    pub fn locate(&self, point: DomPoint) -> PointLocation {
        if point.node == self.container {
            let offset = self
                .spans
                .iter()
                .take(point.offset)
                .map(Span::char_len)
                .sum();
            return PointLocation::Inside(offset);
        }
        let mut start = 0;
        for span in &self.spans {
            let len = span.char_len();
            if span.node == Some(point.node) {
                return PointLocation::Inside(start + point.offset.min(len));
            }
            start += len;
        }
        PointLocation::Outside
    }

    /// Map a char offset back to a substrate point.
    ///
    /// Offsets on a span boundary resolve to the end of the earlier span, so
    /// a caret sticks to the text it follows.
    pub fn point_at(&self, char_offset: usize) -> DomPoint {
        let mut start = 0;
        for (i, span) in self.spans.iter().enumerate() {
            let len = span.char_len();
            let is_first_at_zero = i == 0 && char_offset == 0;
            if (char_offset > start || is_first_at_zero) && char_offset <= start + len {
                if let Some(node) = span.node {
                    return DomPoint::new(node, char_offset - start);
                }
                return DomPoint::new(self.container, i);
            }
            start += len;
        }
        DomPoint::new(self.container, self.spans.len())
    }

    /// Reassign `index` by position.
    pub fn reindex(&mut self) {
        for (i, span) in self.spans.iter_mut().enumerate() {
            span.index = i;
        }
    }

    /// Whether no two adjacent spans share a format set and none is empty.
    pub fn is_coalesced(&self) -> bool {
        self.spans.iter().all(|s| !s.is_empty())
            && self.spans.windows(2).all(|w| !w[0].same_format(&w[1]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rendered_block(spans: &[(&str, FormatSet)]) -> Block {
        let mut block = Block::new(BlockId(0), NodeId(100));
        for (i, (text, format)) in spans.iter().enumerate() {
            let mut span = Span::new(*text, *format);
            span.node = Some(NodeId(i as u64 + 1));
            block.spans.push(span);
        }
        block.reindex();
        block
    }

    #[test]
    fn test_split_preserves_format() {
        let bold = FormatSet::from([FormatTag::Strong]);
        let span = Span::new("héllo", bold);
        let (l, r) = span.split_at(2);
        assert_eq!(l.content, "hé");
        assert_eq!(r.content, "llo");
        assert_eq!(l.format, bold);
        assert_eq!(r.format, bold);
    }

    #[test]
    fn test_split_at_edges() {
        let span = Span::plain("ab");
        let (l, r) = span.split_at(0);
        assert!(l.is_empty());
        assert_eq!(r.content, "ab");
        let (l, r) = span.split_at(5);
        assert_eq!(l.content, "ab");
        assert!(r.is_empty());
    }

    #[test]
    fn test_toggled_is_fresh() {
        let span = Span::plain("x");
        let bold = span.toggled(FormatTag::Strong, true);
        assert!(bold.format.contains(FormatTag::Strong));
        assert!(span.format.is_empty());
        assert!(bold.toggled(FormatTag::Strong, false).format.is_empty());
    }

    #[test]
    fn test_locate_fragment_and_container_points() {
        let bold = FormatSet::from([FormatTag::Strong]);
        let block = rendered_block(&[("Hello ", FormatSet::empty()), ("world", bold)]);

        assert_eq!(
            block.locate(DomPoint::new(NodeId(2), 3)),
            PointLocation::Inside(9)
        );
        assert_eq!(
            block.locate(DomPoint::new(NodeId(100), 1)),
            PointLocation::Inside(6)
        );
        assert_eq!(
            block.locate(DomPoint::new(NodeId(100), 2)),
            PointLocation::Inside(11)
        );
        assert_eq!(
            block.locate(DomPoint::new(NodeId(77), 0)),
            PointLocation::Outside
        );
    }

    #[test]
    fn test_point_at_prefers_left_span() {
        let bold = FormatSet::from([FormatTag::Strong]);
        let block = rendered_block(&[("ab", FormatSet::empty()), ("cd", bold)]);

        assert_eq!(block.point_at(0), DomPoint::new(NodeId(1), 0));
        assert_eq!(block.point_at(2), DomPoint::new(NodeId(1), 2));
        assert_eq!(block.point_at(3), DomPoint::new(NodeId(2), 1));
        assert_eq!(block.point_at(4), DomPoint::new(NodeId(2), 2));
    }

    #[test]
    fn test_point_at_empty_block() {
        let block = Block::new(BlockId(0), NodeId(9));
        assert_eq!(block.point_at(0), DomPoint::new(NodeId(9), 0));
    }

    #[test]
    fn test_is_coalesced() {
        let bold = FormatSet::from([FormatTag::Strong]);
        assert!(rendered_block(&[("a", bold), ("b", FormatSet::empty())]).is_coalesced());
        assert!(!rendered_block(&[("a", bold), ("b", bold)]).is_coalesced());
        assert!(!rendered_block(&[("", bold)]).is_coalesced());
    }
}
