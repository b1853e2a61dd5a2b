//! In-memory document substrate.
//!
//! A small node tree (root, block containers, text fragments) implementing
//! every platform trait. Used by the test suite and for headless editing.
//! Geometry is a fixed monospace grid: 8px per char, one 20px line per block.

use std::cmp::Ordering;
use std::collections::HashMap;

use crate::platform::{
    DocumentTree, MutationSink, PlatformError, RenderedFragment, SelectionSource,
};
use crate::style::Presentation;
use crate::types::{BlockId, DomPoint, NodeId, Placement, RawSelection, Rect};

const CHAR_WIDTH: f64 = 8.0;
const LINE_HEIGHT: f64 = 20.0;

#[derive(Debug, Clone)]
enum NodeKind {
    Root,
    Container {
        block: BlockId,
        presentation: Presentation,
    },
    Fragment {
        text: String,
        presentation: Option<Presentation>,
    },
}

#[derive(Debug, Clone)]
struct Node {
    kind: NodeKind,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

/// In-memory implementation of the substrate traits.
#[derive(Debug, Clone)]
pub struct MemorySubstrate {
    nodes: HashMap<NodeId, Node>,
    root: NodeId,
    next_id: u64,
    selection: Option<RawSelection>,
    fail_renders: bool,
}

impl Default for MemorySubstrate {
    fn default() -> Self {
        Self::new()
    }
}

impl MemorySubstrate {
    pub fn new() -> Self {
        let root = NodeId(0);
        let mut nodes = HashMap::new();
        nodes.insert(
            root,
            Node {
                kind: NodeKind::Root,
                parent: None,
                children: Vec::new(),
            },
        );
        Self {
            nodes,
            root,
            next_id: 1,
            selection: None,
            fail_renders: false,
        }
    }

    fn alloc(&mut self, kind: NodeKind) -> NodeId {
        let id = NodeId(self.next_id);
        self.next_id += 1;
        self.nodes.insert(
            id,
            Node {
                kind,
                parent: None,
                children: Vec::new(),
            },
        );
        id
    }

    fn node(&self, id: NodeId) -> Result<&Node, PlatformError> {
        self.nodes
            .get(&id)
            .ok_or_else(|| PlatformError(format!("no such node {id}")))
    }

    fn is_container(&self, id: NodeId) -> bool {
        matches!(
            self.nodes.get(&id).map(|n| &n.kind),
            Some(NodeKind::Container { .. })
        )
    }

    /// Make every subsequent content swap fail.
    pub fn set_fail_renders(&mut self, fail: bool) {
        self.fail_renders = fail;
    }

    /// Set the selection as a user would, from anchor to focus.
    pub fn select(&mut self, anchor: DomPoint, focus: DomPoint) {
        let backwards = self.compare_points(focus, anchor) == Ordering::Less;
        self.selection = Some(RawSelection {
            anchor,
            focus,
            backwards,
        });
    }

    /// Select a char range of a container's text.
    ///
    /// The start resolves into the fragment that begins at or contains it,
    /// the end into the fragment that ends at or contains it.
    pub fn select_text(&mut self, container: NodeId, start: usize, end: usize) {
        let start = self.point_in(container, start, true);
        let end = self.point_in(container, end, false);
        self.select(start, end);
    }

    /// Place a caret at a char offset of a container's text.
    pub fn place_caret(&mut self, container: NodeId, offset: usize) {
        let point = self.point_in(container, offset, false);
        self.select(point, point);
    }

    fn point_in(&self, container: NodeId, offset: usize, prefer_next: bool) -> DomPoint {
        let children = self
            .nodes
            .get(&container)
            .map(|n| n.children.clone())
            .unwrap_or_default();
        let mut start = 0;
        for (i, child) in children.iter().enumerate() {
            let len = self.text_len(*child);
            let end = start + len;
            let hit = if prefer_next {
                offset >= start && offset < end
            } else {
                (offset > start || i == 0) && offset <= end
            };
            if hit {
                return DomPoint::new(*child, offset - start);
            }
            start = end;
        }
        match children.last() {
            Some(last) if !prefer_next || offset < start => {
                DomPoint::new(*last, self.text_len(*last))
            }
            _ => DomPoint::new(container, children.len()),
        }
    }

    fn text_len(&self, node: NodeId) -> usize {
        match self.nodes.get(&node).map(|n| &n.kind) {
            Some(NodeKind::Fragment { text, .. }) => text.chars().count(),
            _ => 0,
        }
    }

    /// Containers in document order.
    pub fn containers(&self) -> Vec<NodeId> {
        self.nodes
            .get(&self.root)
            .map(|n| n.children.clone())
            .unwrap_or_default()
    }

    /// Fragment nodes of a container, in order.
    pub fn fragments(&self, container: NodeId) -> Vec<NodeId> {
        self.nodes
            .get(&container)
            .map(|n| n.children.clone())
            .unwrap_or_default()
    }

    /// Concatenated fragment text of a container.
    pub fn container_text(&self, container: NodeId) -> String {
        self.fragments(container)
            .into_iter()
            .filter_map(|f| match self.nodes.get(&f).map(|n| &n.kind) {
                Some(NodeKind::Fragment { text, .. }) => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Text of a single fragment node.
    pub fn fragment_text(&self, fragment: NodeId) -> Option<&str> {
        match self.nodes.get(&fragment).map(|n| &n.kind) {
            Some(NodeKind::Fragment { text, .. }) => Some(text),
            _ => None,
        }
    }

    /// Presentation of a single fragment node, `None` when rendered plain.
    pub fn fragment_presentation(&self, fragment: NodeId) -> Option<&Presentation> {
        match self.nodes.get(&fragment).map(|n| &n.kind) {
            Some(NodeKind::Fragment { presentation, .. }) => presentation.as_ref(),
            _ => None,
        }
    }

    /// Block-level presentation of a container.
    pub fn container_presentation(&self, container: NodeId) -> Option<&Presentation> {
        match self.nodes.get(&container).map(|n| &n.kind) {
            Some(NodeKind::Container { presentation, .. }) => Some(presentation),
            _ => None,
        }
    }

    /// Whether a node is still attached to the document.
    pub fn contains(&self, node: NodeId) -> bool {
        let mut current = node;
        loop {
            if current == self.root {
                return true;
            }
            match self.nodes.get(&current).and_then(|n| n.parent) {
                Some(parent) => current = parent,
                None => return false,
            }
        }
    }

    /// Child indices from the root down to `node`.
    fn path(&self, node: NodeId) -> Vec<usize> {
        let mut path = Vec::new();
        let mut current = node;
        while let Some(parent) = self.nodes.get(&current).and_then(|n| n.parent) {
            let index = self
                .nodes
                .get(&parent)
                .and_then(|p| p.children.iter().position(|c| *c == current))
                .unwrap_or(0);
            path.push(index);
            current = parent;
        }
        path.reverse();
        path
    }

    /// Sort key of a point in document order.
    fn point_key(&self, point: DomPoint) -> (Vec<usize>, usize) {
        match self.nodes.get(&point.node).map(|n| &n.kind) {
            Some(NodeKind::Fragment { .. }) | None => (self.path(point.node), point.offset),
            Some(_) => {
                let children = self.fragments(point.node);
                match children.get(point.offset) {
                    Some(child) => (self.path(*child), 0),
                    None => {
                        let mut path = self.path(point.node);
                        path.push(point.offset);
                        (path, 0)
                    }
                }
            }
        }
    }

    fn compare_points(&self, a: DomPoint, b: DomPoint) -> Ordering {
        self.point_key(a).cmp(&self.point_key(b))
    }

    /// Container holding a point, and the point's char offset within it.
    fn line_position(&self, point: DomPoint) -> Option<(NodeId, usize)> {
        if self.is_container(point.node) {
            let offset = self
                .fragments(point.node)
                .iter()
                .take(point.offset)
                .map(|f| self.text_len(*f))
                .sum();
            return Some((point.node, offset));
        }
        let container = self.nodes.get(&point.node)?.parent?;
        if !self.is_container(container) {
            return None;
        }
        let before: usize = self
            .fragments(container)
            .iter()
            .take_while(|f| **f != point.node)
            .map(|f| self.text_len(*f))
            .sum();
        Some((container, before + point.offset))
    }

    fn detach(&mut self, node: NodeId) {
        let parent = self.nodes.get(&node).and_then(|n| n.parent);
        if let Some(parent) = parent {
            if let Some(p) = self.nodes.get_mut(&parent) {
                p.children.retain(|c| *c != node);
            }
        }
        if let Some(n) = self.nodes.get_mut(&node) {
            n.parent = None;
        }
    }

    fn drop_subtree(&mut self, node: NodeId) {
        if let Some(removed) = self.nodes.remove(&node) {
            for child in removed.children {
                self.drop_subtree(child);
            }
        }
    }

    /// Drop the selection if either end no longer exists.
    fn prune_selection(&mut self) {
        if let Some(sel) = self.selection {
            if !self.contains(sel.anchor.node) || !self.contains(sel.focus.node) {
                self.selection = None;
            }
        }
    }
}

impl DocumentTree for MemorySubstrate {
    fn root(&self) -> NodeId {
        self.root
    }

    fn parent_of(&self, node: NodeId) -> Option<NodeId> {
        self.nodes.get(&node).and_then(|n| n.parent)
    }

    fn previous_sibling(&self, node: NodeId) -> Option<NodeId> {
        let parent = self.parent_of(node)?;
        let siblings = &self.nodes.get(&parent)?.children;
        let index = siblings.iter().position(|c| *c == node)?;
        index.checked_sub(1).map(|i| siblings[i])
    }

    fn block_id_of(&self, node: NodeId) -> Option<BlockId> {
        match self.nodes.get(&node).map(|n| &n.kind) {
            Some(NodeKind::Container { block, .. }) => Some(*block),
            _ => None,
        }
    }
}

impl SelectionSource for MemorySubstrate {
    fn current_selection(&self) -> Option<RawSelection> {
        self.selection
    }

    fn nodes_intersecting(&self, start: DomPoint, end: DomPoint) -> Vec<NodeId> {
        let start = self.point_key(start);
        let end = self.point_key(end);
        self.containers()
            .into_iter()
            .flat_map(|c| self.fragments(c))
            .filter(|f| {
                let path = self.path(*f);
                let first = (path.clone(), 0);
                let last = (path, self.text_len(*f));
                last >= start && first <= end
            })
            .collect()
    }

    fn bounding_rect(&self, start: DomPoint, end: DomPoint) -> Option<Rect> {
        let (first, from) = self.line_position(start)?;
        let (last, to) = self.line_position(end)?;
        let containers = self.containers();
        let a = containers.iter().position(|c| *c == first)?;
        let b = containers.iter().position(|c| *c == last)?;
        let (first_line, last_line) = (a.min(b), a.max(b));

        if first_line == last_line {
            return Some(Rect::new(
                from as f64 * CHAR_WIDTH,
                first_line as f64 * LINE_HEIGHT,
                to.saturating_sub(from) as f64 * CHAR_WIDTH,
                LINE_HEIGHT,
            ));
        }
        let widest = containers[first_line..=last_line]
            .iter()
            .map(|c| self.container_text(*c).chars().count())
            .max()
            .unwrap_or(0);
        Some(Rect::new(
            0.0,
            first_line as f64 * LINE_HEIGHT,
            widest as f64 * CHAR_WIDTH,
            (last_line - first_line + 1) as f64 * LINE_HEIGHT,
        ))
    }
}

impl MutationSink for MemorySubstrate {
    fn create_container(&mut self, block: BlockId) -> Result<NodeId, PlatformError> {
        Ok(self.alloc(NodeKind::Container {
            block,
            presentation: Presentation::new(),
        }))
    }

    fn insert_container(
        &mut self,
        anchor: NodeId,
        placement: Placement,
        container: NodeId,
    ) -> Result<(), PlatformError> {
        if !self.is_container(container) {
            return Err(PlatformError(format!("{container} is not a container")));
        }
        self.detach(container);

        let (parent, index) = if anchor == self.root {
            (self.root, self.node(self.root)?.children.len())
        } else {
            let parent = self
                .parent_of(anchor)
                .ok_or_else(|| PlatformError(format!("anchor {anchor} is detached")))?;
            let at = self
                .node(parent)?
                .children
                .iter()
                .position(|c| *c == anchor)
                .ok_or_else(|| PlatformError(format!("anchor {anchor} not under {parent}")))?;
            match placement {
                Placement::Before => (parent, at),
                Placement::After => (parent, at + 1),
            }
        };

        if let Some(p) = self.nodes.get_mut(&parent) {
            p.children.insert(index, container);
        }
        if let Some(c) = self.nodes.get_mut(&container) {
            c.parent = Some(parent);
        }
        Ok(())
    }

    fn remove_node(&mut self, node: NodeId) -> Result<(), PlatformError> {
        if node == self.root {
            return Err("cannot remove the editing root".into());
        }
        self.node(node)?;
        self.detach(node);
        self.drop_subtree(node);
        self.prune_selection();
        Ok(())
    }

    fn replace_container_content(
        &mut self,
        container: NodeId,
        fragments: &[RenderedFragment],
    ) -> Result<Vec<NodeId>, PlatformError> {
        if self.fail_renders {
            return Err("render refused".into());
        }
        if !self.is_container(container) {
            return Err(PlatformError(format!("{container} is not a container")));
        }

        let old = self.fragments(container);
        for child in old {
            self.detach(child);
            self.drop_subtree(child);
        }

        let mut nodes = Vec::with_capacity(fragments.len());
        for fragment in fragments {
            let id = self.alloc(NodeKind::Fragment {
                text: fragment.text.clone(),
                presentation: fragment.presentation.clone(),
            });
            if let Some(n) = self.nodes.get_mut(&id) {
                n.parent = Some(container);
            }
            nodes.push(id);
        }
        if let Some(c) = self.nodes.get_mut(&container) {
            c.children = nodes.clone();
        }
        self.prune_selection();
        Ok(nodes)
    }

    fn set_container_presentation(
        &mut self,
        container: NodeId,
        presentation: &Presentation,
    ) -> Result<(), PlatformError> {
        match self.nodes.get_mut(&container).map(|n| &mut n.kind) {
            Some(NodeKind::Container {
                presentation: current,
                ..
            }) => {
                *current = presentation.clone();
                Ok(())
            }
            _ => Err(PlatformError(format!("{container} is not a container"))),
        }
    }

    fn set_selection(&mut self, start: DomPoint, end: DomPoint) -> Result<(), PlatformError> {
        for point in [start, end] {
            if !self.contains(point.node) {
                return Err(PlatformError(format!("{} is not in the document", point.node)));
            }
        }
        self.select(start, end);
        Ok(())
    }

    fn clear_selection(&mut self) {
        self.selection = None;
    }
}
