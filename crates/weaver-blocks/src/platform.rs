//! Platform abstraction traits for the host document substrate.
//!
//! These traits define the interface between the editor logic and whatever
//! owns the rendered document (browser DOM, native UI, or the in-memory
//! `MemorySubstrate`). The editor reads structure and selection through them
//! and writes content, presentation and selection back through them.

use crate::style::Presentation;
use crate::types::{BlockId, DomPoint, NodeId, Placement, RawSelection, Rect};

/// Error type for platform operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlatformError(pub String);

impl std::fmt::Display for PlatformError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for PlatformError {}

impl From<&str> for PlatformError {
    fn from(s: &str) -> Self {
        PlatformError(s.to_string())
    }
}

impl From<String> for PlatformError {
    fn from(s: String) -> Self {
        PlatformError(s)
    }
}

/// One rendered run of text, handed to the substrate on re-render.
///
/// `presentation` is `None` for plain spans, which the substrate may render
/// as bare text.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedFragment {
    pub text: String,
    pub presentation: Option<Presentation>,
}

/// Structural queries over the substrate's node tree.
pub trait DocumentTree {
    /// The top-level editing root that contains every block container.
    fn root(&self) -> NodeId;

    /// Parent of a node, or `None` for the root and detached nodes.
    fn parent_of(&self, node: NodeId) -> Option<NodeId>;

    /// Previous sibling of a node in document order.
    fn previous_sibling(&self, node: NodeId) -> Option<NodeId>;

    /// The block id cached on a container node, if `node` is one.
    fn block_id_of(&self, node: NodeId) -> Option<BlockId>;
}

/// Read access to the substrate's active selection.
pub trait SelectionSource {
    /// The current selection, or `None` if nothing is selected.
    fn current_selection(&self) -> Option<RawSelection>;

    /// Nodes intersected by the range between two points, in document order.
    fn nodes_intersecting(&self, start: DomPoint, end: DomPoint) -> Vec<NodeId>;

    /// Screen rectangle of the range, if the substrate can measure it.
    fn bounding_rect(&self, start: DomPoint, end: DomPoint) -> Option<Rect>;
}

/// Write access to the substrate.
pub trait MutationSink {
    /// Create a detached, empty container caching `block`'s id.
    fn create_container(&mut self, block: BlockId) -> Result<NodeId, PlatformError>;

    /// Insert a detached container relative to `anchor`.
    ///
    /// When `anchor` is the root, the container is appended as its last child.
    fn insert_container(
        &mut self,
        anchor: NodeId,
        placement: Placement,
        container: NodeId,
    ) -> Result<(), PlatformError>;

    /// Remove a node and everything below it.
    fn remove_node(&mut self, node: NodeId) -> Result<(), PlatformError>;

    /// Replace all children of `container` in one swap.
    ///
    /// Returns the ids of the new fragment nodes, one per fragment, in order.
    fn replace_container_content(
        &mut self,
        container: NodeId,
        fragments: &[RenderedFragment],
    ) -> Result<Vec<NodeId>, PlatformError>;

    /// Replace the block-level presentation of a container.
    fn set_container_presentation(
        &mut self,
        container: NodeId,
        presentation: &Presentation,
    ) -> Result<(), PlatformError>;

    /// Make the substrate adopt a selection.
    fn set_selection(&mut self, start: DomPoint, end: DomPoint) -> Result<(), PlatformError>;

    /// Drop the substrate's selection.
    fn clear_selection(&mut self);
}

/// Everything the editor needs from its host.
pub trait Substrate: DocumentTree + SelectionSource + MutationSink {}

impl<T: DocumentTree + SelectionSource + MutationSink> Substrate for T {}
