//! Block registry: owns every block and its rendered container.
//!
//! Blocks are keyed by an opaque `BlockId` allocated at creation. The
//! container caches the id so any node can be walked back to its block.

use std::collections::HashMap;

use crate::error::EditorError;
use crate::platform::{DocumentTree, MutationSink};
use crate::reconcile;
use crate::span::Block;
use crate::style::StyleRegistry;
use crate::types::{BlockId, BlockKind, DomPoint, NodeId, Placement};

/// What `remove_block` actually did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Removal {
    /// The block and its container are gone.
    Removed,
    /// It was the last block, so only its content was cleared.
    Cleared,
}

#[derive(Debug, Default)]
pub struct BlockRegistry {
    blocks: HashMap<BlockId, Block>,
    /// Registration order, oldest first.
    order: Vec<BlockId>,
    next_id: u64,
}

impl BlockRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn get(&self, id: BlockId) -> Option<&Block> {
        self.blocks.get(&id)
    }

    pub fn get_mut(&mut self, id: BlockId) -> Option<&mut Block> {
        self.blocks.get_mut(&id)
    }

    /// Registered ids, oldest first.
    pub fn ids(&self) -> &[BlockId] {
        &self.order
    }

    /// The most recently registered block.
    pub fn latest(&self) -> Option<BlockId> {
        self.order.last().copied()
    }

    /// Allocate an empty block and insert its container next to `anchor`.
    ///
    /// An anchor that is the editing root, or that belongs to no block,
    /// appends at the end of the document regardless of `placement`. The new
    /// block is focused.
    pub fn create_block<S: DocumentTree + MutationSink + ?Sized>(
        &mut self,
        substrate: &mut S,
        anchor: NodeId,
        placement: Placement,
    ) -> Result<BlockId, EditorError> {
        let id = BlockId(self.next_id);
        let container = substrate.create_container(id)?;

        let target = self
            .resolve_block_for(&*substrate, anchor)
            .and_then(|b| self.blocks.get(&b))
            .map(|b| b.container);
        match target {
            Some(anchor) => substrate.insert_container(anchor, placement, container)?,
            None => {
                let root = substrate.root();
                substrate.insert_container(root, Placement::After, container)?
            }
        }

        self.next_id += 1;
        self.blocks.insert(id, Block::new(id, container));
        self.order.push(id);
        tracing::debug!(target: "weaver::blocks", block = %id, %container, ?placement, "created block");

        self.focus_block(substrate, Some(id))?;
        Ok(id)
    }

    /// Remove a block, or clear it if it is the only one left.
    pub fn remove_block<S: MutationSink + ?Sized>(
        &mut self,
        substrate: &mut S,
        styles: &StyleRegistry,
        id: BlockId,
    ) -> Result<Removal, EditorError> {
        if !self.blocks.contains_key(&id) {
            return Err(EditorError::MissingBlock(id));
        }
        if self.blocks.len() == 1 {
            tracing::warn!(target: "weaver::blocks", block = %id, "refusing to remove the last block, clearing it");
            let block = self
                .blocks
                .get_mut(&id)
                .ok_or(EditorError::MissingBlock(id))?;
            reconcile::install(substrate, styles, block, Vec::new())?;
            return Ok(Removal::Cleared);
        }

        let container = self
            .blocks
            .get(&id)
            .map(|b| b.container)
            .ok_or(EditorError::MissingBlock(id))?;
        substrate.remove_node(container)?;
        self.blocks.remove(&id);
        self.order.retain(|b| *b != id);
        tracing::debug!(target: "weaver::blocks", block = %id, "removed block");
        Ok(Removal::Removed)
    }

    /// Place a caret at the start of a block, or of the latest one.
    pub fn focus_block<S: MutationSink + ?Sized>(
        &self,
        substrate: &mut S,
        id: Option<BlockId>,
    ) -> Result<(), EditorError> {
        let Some(id) = id.or_else(|| self.latest()) else {
            return Ok(());
        };
        let block = self.blocks.get(&id).ok_or(EditorError::MissingBlock(id))?;
        let start = block.point_at(0);
        substrate.set_selection(start, start)?;
        Ok(())
    }

    /// Walk up from `node` to the registered block enclosing it.
    pub fn resolve_block_for<T: DocumentTree + ?Sized>(
        &self,
        tree: &T,
        node: NodeId,
    ) -> Option<BlockId> {
        let mut current = Some(node);
        while let Some(node) = current {
            if let Some(id) = tree.block_id_of(node) {
                return self.blocks.contains_key(&id).then_some(id);
            }
            current = tree.parent_of(node);
        }
        None
    }

    /// Change a block's kind and its container presentation. Spans are left
    /// alone.
    pub fn change_kind<S: MutationSink + ?Sized>(
        &mut self,
        substrate: &mut S,
        styles: &StyleRegistry,
        id: BlockId,
        kind: BlockKind,
    ) -> Result<(), EditorError> {
        let block = self
            .blocks
            .get_mut(&id)
            .ok_or(EditorError::MissingBlock(id))?;
        substrate.set_container_presentation(block.container, &styles.block_presentation(kind))?;
        block.kind = kind;
        tracing::debug!(target: "weaver::blocks", block = %id, kind = kind.as_str(), "changed block kind");
        Ok(())
    }

    /// Caret point at the start of a block.
    pub fn start_of(&self, id: BlockId) -> Option<DomPoint> {
        self.blocks.get(&id).map(|b| b.point_at(0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemorySubstrate;
    use crate::platform::SelectionSource;
    use crate::span::Span;
    use crate::style::StyleProperty;

    fn setup() -> (MemorySubstrate, BlockRegistry, BlockId) {
        let mut sub = MemorySubstrate::new();
        let mut reg = BlockRegistry::new();
        let root = sub.root();
        let first = reg.create_block(&mut sub, root, Placement::After).unwrap();
        (sub, reg, first)
    }

    #[test]
    fn test_create_focuses_new_block() {
        let (sub, reg, first) = setup();
        let container = reg.get(first).unwrap().container;
        let sel = sub.current_selection().unwrap();
        assert_eq!(sel.start(), DomPoint::new(container, 0));
        assert!(sel.is_collapsed());
    }

    #[test]
    fn test_create_relative_to_anchor() {
        let (mut sub, mut reg, first) = setup();
        let anchor = reg.get(first).unwrap().container;
        let after = reg.create_block(&mut sub, anchor, Placement::After).unwrap();
        let before = reg.create_block(&mut sub, anchor, Placement::Before).unwrap();

        let order: Vec<_> = sub
            .containers()
            .into_iter()
            .filter_map(|c| sub.block_id_of(c))
            .collect();
        assert_eq!(order, vec![before, first, after]);
        assert_eq!(reg.latest(), Some(before));
    }

    #[test]
    fn test_root_anchor_appends() {
        let (mut sub, mut reg, first) = setup();
        let root = sub.root();
        let second = reg.create_block(&mut sub, root, Placement::Before).unwrap();
        let order: Vec<_> = sub
            .containers()
            .into_iter()
            .filter_map(|c| sub.block_id_of(c))
            .collect();
        assert_eq!(order, vec![first, second]);
    }

    #[test]
    fn test_remove_last_block_clears() {
        let (mut sub, mut reg, first) = setup();
        let styles = StyleRegistry::default();
        {
            let block = reg.get_mut(first).unwrap();
            reconcile::install(&mut sub, &styles, block, vec![Span::plain("text")]).unwrap();
        }
        let outcome = reg.remove_block(&mut sub, &styles, first).unwrap();
        assert_eq!(outcome, Removal::Cleared);
        assert_eq!(reg.len(), 1);
        let block = reg.get(first).unwrap();
        assert!(block.spans.is_empty());
        assert_eq!(sub.container_text(block.container), "");
    }

    #[test]
    fn test_remove_unregisters() {
        let (mut sub, mut reg, first) = setup();
        let root = sub.root();
        let second = reg.create_block(&mut sub, root, Placement::After).unwrap();
        let container = reg.get(second).unwrap().container;

        let styles = StyleRegistry::default();
        let outcome = reg.remove_block(&mut sub, &styles, second).unwrap();
        assert_eq!(outcome, Removal::Removed);
        assert!(reg.get(second).is_none());
        assert!(!sub.contains(container));
        assert_eq!(reg.ids(), &[first]);
        assert!(matches!(
            reg.remove_block(&mut sub, &styles, second),
            Err(EditorError::MissingBlock(_))
        ));
    }

    #[test]
    fn test_resolve_from_fragment() {
        let (mut sub, mut reg, first) = setup();
        let styles = StyleRegistry::default();
        let block = reg.get_mut(first).unwrap();
        reconcile::install(&mut sub, &styles, block, vec![Span::plain("abc")]).unwrap();
        let fragment = reg.get(first).unwrap().spans[0].node.unwrap();

        assert_eq!(reg.resolve_block_for(&sub, fragment), Some(first));
        assert_eq!(reg.resolve_block_for(&sub, sub.root()), None);
        assert_eq!(reg.resolve_block_for(&sub, NodeId(999)), None);
    }

    #[test]
    fn test_change_kind_sets_container_presentation() {
        let (mut sub, mut reg, first) = setup();
        let styles = StyleRegistry::default();
        reg.change_kind(&mut sub, &styles, first, BlockKind::Heading2)
            .unwrap();
        let container = reg.get(first).unwrap().container;
        let presentation = sub.container_presentation(container).unwrap();
        assert_eq!(presentation[&StyleProperty::FontSize].as_str(), "2em");
        assert_eq!(reg.get(first).unwrap().kind, BlockKind::Heading2);

        reg.change_kind(&mut sub, &styles, first, BlockKind::General)
            .unwrap();
        assert!(sub.container_presentation(container).unwrap().is_empty());
    }
}
