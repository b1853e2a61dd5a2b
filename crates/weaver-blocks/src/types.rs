//! Core editor types: format tags, block kinds, identities, and substrate points.
//!
//! These types are substrate-agnostic and shared by every layer of the editor.

use std::fmt;
use std::str::FromStr;

use crate::error::EditorError;

/// A character-level format tag.
///
/// The variant order is the canonical tag order. Style resolution and
/// `FormatSet` iteration always follow it, regardless of how a set was built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FormatTag {
    Strong,
    Italic,
    Through,
    Color,
    Background,
    Code,
    Underline,
}

impl FormatTag {
    /// Every tag, in canonical order.
    pub const ALL: [FormatTag; 7] = [
        FormatTag::Strong,
        FormatTag::Italic,
        FormatTag::Through,
        FormatTag::Color,
        FormatTag::Background,
        FormatTag::Code,
        FormatTag::Underline,
    ];

    /// The tag's name as used by hosts and toolbars.
    pub fn as_str(self) -> &'static str {
        match self {
            FormatTag::Strong => "strong",
            FormatTag::Italic => "italic",
            FormatTag::Through => "through",
            FormatTag::Color => "color",
            FormatTag::Background => "background",
            FormatTag::Code => "code",
            FormatTag::Underline => "underline",
        }
    }

    fn bit(self) -> u8 {
        1 << (self as u8)
    }
}

impl fmt::Display for FormatTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FormatTag {
    type Err = EditorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FormatTag::ALL
            .into_iter()
            .find(|tag| tag.as_str() == s)
            .ok_or_else(|| EditorError::UnknownTag(s.to_string()))
    }
}

/// A set of format tags.
///
/// Stored as a bitset, so equality is order-independent and iteration
/// yields tags in canonical order. The empty set is a plain-text span.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct FormatSet(u8);

impl FormatSet {
    /// The empty (plain text) set.
    pub const fn empty() -> Self {
        Self(0)
    }

    pub fn contains(&self, tag: FormatTag) -> bool {
        self.0 & tag.bit() != 0
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub fn len(&self) -> usize {
        self.0.count_ones() as usize
    }

    /// Copy of this set with `tag` added.
    #[must_use]
    pub fn with(self, tag: FormatTag) -> Self {
        Self(self.0 | tag.bit())
    }

    /// Copy of this set with `tag` removed.
    #[must_use]
    pub fn without(self, tag: FormatTag) -> Self {
        Self(self.0 & !tag.bit())
    }

    pub fn insert(&mut self, tag: FormatTag) {
        *self = self.with(tag);
    }

    pub fn remove(&mut self, tag: FormatTag) {
        *self = self.without(tag);
    }

    /// Iterate the tags in canonical order.
    pub fn iter(&self) -> impl Iterator<Item = FormatTag> + '_ {
        FormatTag::ALL.into_iter().filter(|tag| self.contains(*tag))
    }
}

impl FromIterator<FormatTag> for FormatSet {
    fn from_iter<I: IntoIterator<Item = FormatTag>>(iter: I) -> Self {
        iter.into_iter().fold(Self::empty(), FormatSet::with)
    }
}

impl<const N: usize> From<[FormatTag; N]> for FormatSet {
    fn from(tags: [FormatTag; N]) -> Self {
        tags.into_iter().collect()
    }
}

impl fmt::Debug for FormatSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl fmt::Display for FormatSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, tag) in self.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            f.write_str(tag.as_str())?;
        }
        Ok(())
    }
}

/// Block-level presentation kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BlockKind {
    #[default]
    General,
    Heading1,
    Heading2,
    Heading3,
}

impl BlockKind {
    pub fn as_str(self) -> &'static str {
        match self {
            BlockKind::General => "general",
            BlockKind::Heading1 => "h1",
            BlockKind::Heading2 => "h2",
            BlockKind::Heading3 => "h3",
        }
    }
}

impl FromStr for BlockKind {
    type Err = EditorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "general" => Ok(BlockKind::General),
            "h1" => Ok(BlockKind::Heading1),
            "h2" => Ok(BlockKind::Heading2),
            "h3" => Ok(BlockKind::Heading3),
            other => Err(EditorError::UnknownBlockKind(other.to_string())),
        }
    }
}

/// Stable identity of a block, assigned at creation.
///
/// The rendered container only caches this id; registries are keyed by it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BlockId(pub u64);

impl fmt::Display for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "b-{}", self.0)
    }
}

/// Opaque handle to a node in the host substrate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u64);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "n-{}", self.0)
    }
}

/// A position in the substrate.
///
/// On a fragment node `offset` is a char offset into the fragment's text.
/// On a container (or the root) it is a child index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DomPoint {
    pub node: NodeId,
    pub offset: usize,
}

impl DomPoint {
    pub fn new(node: NodeId, offset: usize) -> Self {
        Self { node, offset }
    }
}

/// Selection as reported by the substrate.
///
/// The anchor is where the selection started, the focus is where it is now.
/// `backwards` is set when the focus precedes the anchor in document order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawSelection {
    pub anchor: DomPoint,
    pub focus: DomPoint,
    pub backwards: bool,
}

impl RawSelection {
    /// A forward selection from `anchor` to `focus`.
    pub fn new(anchor: DomPoint, focus: DomPoint) -> Self {
        Self {
            anchor,
            focus,
            backwards: false,
        }
    }

    /// A collapsed selection (caret).
    pub fn collapsed(point: DomPoint) -> Self {
        Self::new(point, point)
    }

    /// The earlier point in document order.
    pub fn start(&self) -> DomPoint {
        if self.backwards {
            self.focus
        } else {
            self.anchor
        }
    }

    /// The later point in document order.
    pub fn end(&self) -> DomPoint {
        if self.backwards {
            self.anchor
        } else {
            self.focus
        }
    }

    pub fn is_collapsed(&self) -> bool {
        self.anchor == self.focus
    }
}

/// Screen rectangle of a selection, for toolbar positioning.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }
}

/// Where a new block goes relative to an anchor block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Placement {
    Before,
    #[default]
    After,
}
