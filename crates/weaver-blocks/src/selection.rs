//! Selection bridge: snapshots the substrate selection and writes computed
//! selections back after a mutation.
//!
//! The editor works from the cached snapshot for a whole pass and never
//! re-reads the substrate mid-computation.

use std::ops::Range;

use crate::error::EditorError;
use crate::platform::{DocumentTree, MutationSink, SelectionSource};
use crate::span::{Block, PointLocation, Span};
use crate::types::{DomPoint, NodeId, RawSelection, Rect};

/// Point-in-time capture of the user's selection.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectionSnapshot {
    pub anchor: DomPoint,
    pub focus: DomPoint,
    /// Earlier point in document order.
    pub start: DomPoint,
    /// Later point in document order.
    pub end: DomPoint,
    /// Deepest node containing both ends.
    pub common_ancestor: NodeId,
    /// Nodes the range intersects, in document order.
    pub intersected: Vec<NodeId>,
    pub rect: Option<Rect>,
}

impl SelectionSnapshot {
    pub fn is_collapsed(&self) -> bool {
        self.start == self.end
    }

    /// The selection as a char range within `block`.
    ///
    /// Ends that fall outside the block clamp to its edges.
    pub fn range_in(&self, block: &Block) -> Range<usize> {
        let start = match block.locate(self.start) {
            PointLocation::Inside(offset) => offset,
            PointLocation::Outside => 0,
        };
        let end = match block.locate(self.end) {
            PointLocation::Inside(offset) => offset,
            PointLocation::Outside => block.char_len(),
        };
        start..end.max(start)
    }
}

/// Find the deepest common ancestor of two nodes.
pub fn common_ancestor<T: DocumentTree + ?Sized>(tree: &T, a: NodeId, b: NodeId) -> NodeId {
    let mut chain = vec![a];
    let mut node = a;
    while let Some(parent) = tree.parent_of(node) {
        chain.push(parent);
        node = parent;
    }
    let mut node = b;
    loop {
        if chain.contains(&node) {
            return node;
        }
        match tree.parent_of(node) {
            Some(parent) => node = parent,
            None => return tree.root(),
        }
    }
}

/// Caches the latest selection snapshot and restores selections.
#[derive(Debug, Default)]
pub struct SelectionBridge {
    cached: Option<SelectionSnapshot>,
}

impl SelectionBridge {
    pub fn new() -> Self {
        Self::default()
    }

    /// Re-read the substrate selection into the cache.
    ///
    /// Call on every selection-change notification.
    pub fn refresh<S: DocumentTree + SelectionSource + ?Sized>(
        &mut self,
        substrate: &S,
    ) -> Option<&SelectionSnapshot> {
        self.cached = substrate
            .current_selection()
            .map(|raw| Self::capture(substrate, raw));

        if let Some(snapshot) = &self.cached {
            tracing::trace!(
                target: "weaver::selection",
                start = ?snapshot.start,
                end = ?snapshot.end,
                common = %snapshot.common_ancestor,
                intersected = snapshot.intersected.len(),
                "selection snapshot"
            );
        }
        self.cached.as_ref()
    }

    fn capture<S: DocumentTree + SelectionSource + ?Sized>(
        substrate: &S,
        raw: RawSelection,
    ) -> SelectionSnapshot {
        let start = raw.start();
        let end = raw.end();
        SelectionSnapshot {
            anchor: raw.anchor,
            focus: raw.focus,
            start,
            end,
            common_ancestor: common_ancestor(substrate, start.node, end.node),
            intersected: substrate.nodes_intersecting(start, end),
            rect: substrate.bounding_rect(start, end),
        }
    }

    /// The most recent snapshot, if any.
    pub fn snapshot(&self) -> Option<&SelectionSnapshot> {
        self.cached.as_ref()
    }

    /// Rectangle of the cached selection, for toolbar positioning.
    pub fn bounding_rect(&self) -> Option<Rect> {
        self.cached.as_ref().and_then(|s| s.rect)
    }

    /// Select from the start of the first fragment to the end of the last.
    ///
    /// An empty slice clears the substrate selection.
    pub fn restore<S: DocumentTree + SelectionSource + MutationSink + ?Sized>(
        &mut self,
        substrate: &mut S,
        fragments: &[Span],
    ) -> Result<(), EditorError> {
        let ends = fragments
            .first()
            .and_then(|f| f.node)
            .zip(fragments.last().and_then(|l| l.node.map(|n| (n, l.char_len()))));
        match ends {
            Some((first, (last, len))) => {
                substrate.set_selection(DomPoint::new(first, 0), DomPoint::new(last, len))?;
            }
            None => substrate.clear_selection(),
        }
        self.refresh(substrate);
        Ok(())
    }

    /// Place a collapsed caret.
    pub fn place_caret<S: DocumentTree + SelectionSource + MutationSink + ?Sized>(
        &mut self,
        substrate: &mut S,
        point: DomPoint,
    ) -> Result<(), EditorError> {
        substrate.set_selection(point, point)?;
        self.refresh(substrate);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemorySubstrate;
    use crate::platform::RenderedFragment;
    use crate::types::BlockId;

    fn plain(text: &str) -> RenderedFragment {
        RenderedFragment {
            text: text.to_string(),
            presentation: None,
        }
    }

    fn two_blocks() -> (MemorySubstrate, NodeId, NodeId, Vec<NodeId>) {
        let mut sub = MemorySubstrate::new();
        let root = sub.root();
        let a = sub.create_container(BlockId(0)).unwrap();
        let b = sub.create_container(BlockId(1)).unwrap();
        sub.insert_container(root, crate::types::Placement::After, a)
            .unwrap();
        sub.insert_container(root, crate::types::Placement::After, b)
            .unwrap();
        let frags = sub
            .replace_container_content(a, &[plain("Hello "), plain("world")])
            .unwrap();
        sub.replace_container_content(b, &[plain("next")]).unwrap();
        (sub, a, b, frags)
    }

    #[test]
    fn test_no_selection_is_empty() {
        let (sub, ..) = two_blocks();
        let mut bridge = SelectionBridge::new();
        assert!(bridge.refresh(&sub).is_none());
        assert!(bridge.bounding_rect().is_none());
    }

    #[test]
    fn test_snapshot_within_block() {
        let (mut sub, a, _, frags) = two_blocks();
        sub.select(DomPoint::new(frags[0], 3), DomPoint::new(frags[1], 2));

        let mut bridge = SelectionBridge::new();
        let snap = bridge.refresh(&sub).unwrap().clone();
        assert_eq!(snap.common_ancestor, a);
        assert_eq!(snap.intersected, vec![frags[0], frags[1]]);
        assert!(snap.rect.is_some());
        assert!(!snap.is_collapsed());
    }

    #[test]
    fn test_backwards_selection_orders_points() {
        let (mut sub, _, _, frags) = two_blocks();
        sub.select(DomPoint::new(frags[1], 2), DomPoint::new(frags[0], 3));

        let mut bridge = SelectionBridge::new();
        let snap = bridge.refresh(&sub).unwrap();
        assert_eq!(snap.start, DomPoint::new(frags[0], 3));
        assert_eq!(snap.end, DomPoint::new(frags[1], 2));
        assert_eq!(snap.anchor, DomPoint::new(frags[1], 2));
    }

    #[test]
    fn test_cross_block_common_ancestor_is_root() {
        let (mut sub, _, b, frags) = two_blocks();
        sub.select(DomPoint::new(frags[0], 1), DomPoint::new(b, 1));

        let mut bridge = SelectionBridge::new();
        let snap = bridge.refresh(&sub).unwrap();
        assert_eq!(snap.common_ancestor, sub.root());
    }

    #[test]
    fn test_restore_empty_clears() {
        let (mut sub, _, _, frags) = two_blocks();
        sub.select(DomPoint::new(frags[0], 0), DomPoint::new(frags[0], 2));

        let mut bridge = SelectionBridge::new();
        bridge.refresh(&sub);
        bridge.restore(&mut sub, &[]).unwrap();
        assert!(sub.current_selection().is_none());
        assert!(bridge.snapshot().is_none());
    }

    #[test]
    fn test_restore_spans_fragments() {
        let (mut sub, _, _, frags) = two_blocks();
        let mut first = Span::plain("Hello ");
        first.node = Some(frags[0]);
        let mut last = Span::plain("world");
        last.node = Some(frags[1]);

        let mut bridge = SelectionBridge::new();
        bridge.restore(&mut sub, &[first, last]).unwrap();
        let snap = bridge.snapshot().unwrap();
        assert_eq!(snap.start, DomPoint::new(frags[0], 0));
        assert_eq!(snap.end, DomPoint::new(frags[1], 5));
    }
}
