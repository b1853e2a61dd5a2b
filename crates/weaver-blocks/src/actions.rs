//! Editor actions and input events.
//!
//! `EditorAction` is the closed command surface a toolbar or keymap drives.
//! `EditorEvent` carries the host notifications the editor reacts to.

use smol_str::SmolStr;

use crate::types::{BlockKind, FormatTag, NodeId};

/// All operations that can be performed on the editor.
#[derive(Debug, Clone, PartialEq)]
pub enum EditorAction {
    // === Formatting ===
    /// Toggle bold on selection.
    ToggleBold,

    /// Toggle italic on selection.
    ToggleItalic,

    /// Toggle underline on selection.
    ToggleUnderline,

    /// Toggle strikethrough on selection.
    ToggleStrikethrough,

    /// Toggle inline code on selection.
    ToggleCode,

    /// Toggle the accent text colour on selection.
    ToggleColor,

    /// Toggle the highlight background on selection.
    ToggleBackground,

    // === Blocks ===
    /// Change the kind of the block holding the selection.
    SetBlockKind(BlockKind),

    /// Insert an empty block after the block containing `node`.
    InsertBlockAfter(NodeId),

    /// Insert an empty block before the block containing `node`.
    InsertBlockBefore(NodeId),

    /// Remove the block containing `node`.
    RemoveBlock(NodeId),

    // === Text ===
    /// Replace the selection with text, or insert it at the caret.
    InsertText(String),

    /// Delete the selection, or the char before the caret (Backspace).
    DeleteBackward,
}

impl EditorAction {
    /// The format tag a toggle action applies, if it is one.
    pub fn format_tag(&self) -> Option<FormatTag> {
        match self {
            Self::ToggleBold => Some(FormatTag::Strong),
            Self::ToggleItalic => Some(FormatTag::Italic),
            Self::ToggleUnderline => Some(FormatTag::Underline),
            Self::ToggleStrikethrough => Some(FormatTag::Through),
            Self::ToggleCode => Some(FormatTag::Code),
            Self::ToggleColor => Some(FormatTag::Color),
            Self::ToggleBackground => Some(FormatTag::Background),
            _ => None,
        }
    }
}

/// Key values the editor cares about.
///
/// Platform code converts native key events into this.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Key {
    /// A character key.
    Character(SmolStr),
    Enter,
    Backspace,
    /// Any other named key.
    Other(SmolStr),
}

impl Key {
    /// Create a character key.
    pub fn character(s: impl Into<SmolStr>) -> Self {
        Self::Character(s.into())
    }
}

/// Notifications from the host substrate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditorEvent {
    /// The substrate's selection moved.
    SelectionChanged,
    /// A key was pressed.
    KeyDown(Key),
}

/// Result of handling an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventResult {
    /// Event was handled, prevent default.
    Handled,
    /// Event was not ours, let the platform handle it.
    NotHandled,
}
