//! The editor context: one editing surface and everything it owns.
//!
//! Every public operation goes through an explicit `EditorContext`, so
//! independent surfaces (and tests) never share state. Commands never return
//! errors; failures are logged at the dispatch boundary in `execute` and the
//! command reports itself unhandled.

use std::time::Duration;

use crate::actions::{EditorAction, EditorEvent, EventResult};
use crate::click::{Click, ClickDisambiguator};
use crate::config::EditorConfig;
use crate::error::EditorError;
use crate::execute::{execute_action, handle_event};
use crate::platform::{DocumentTree, Substrate};
use crate::reconcile;
use crate::registry::BlockRegistry;
use crate::selection::{SelectionBridge, SelectionSnapshot};
use crate::span::Block;
use crate::style::StyleRegistry;
use crate::types::{BlockId, BlockKind, FormatSet, FormatTag, NodeId, Placement, Rect};

type SelectionObserver = Box<dyn FnMut(Option<Rect>)>;

/// An editing surface over a host substrate.
pub struct EditorContext<S: Substrate> {
    pub(crate) substrate: S,
    pub(crate) registry: BlockRegistry,
    pub(crate) bridge: SelectionBridge,
    pub(crate) styles: StyleRegistry,
    pub(crate) config: EditorConfig,
    observers: Vec<SelectionObserver>,
    clicks: ClickDisambiguator,
}

impl<S: Substrate> EditorContext<S> {
    /// Build a context over `substrate` and create its first block.
    pub fn new(mut substrate: S, config: EditorConfig) -> Result<Self, EditorError> {
        let styles = StyleRegistry::new(&config);
        let mut registry = BlockRegistry::new();
        let root = substrate.root();
        registry.create_block(&mut substrate, root, Placement::After)?;

        let mut bridge = SelectionBridge::new();
        bridge.refresh(&substrate);
        let clicks = ClickDisambiguator::new(Duration::from_millis(config.click_window_ms));

        Ok(Self {
            substrate,
            registry,
            bridge,
            styles,
            config,
            observers: Vec::new(),
            clicks,
        })
    }

    pub fn substrate(&self) -> &S {
        &self.substrate
    }

    /// Direct substrate access, for hosts driving user selection.
    ///
    /// Call `selection_changed` after moving the selection.
    pub fn substrate_mut(&mut self) -> &mut S {
        &mut self.substrate
    }

    pub fn registry(&self) -> &BlockRegistry {
        &self.registry
    }

    pub fn styles(&self) -> &StyleRegistry {
        &self.styles
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn block(&self, id: BlockId) -> Option<&Block> {
        self.registry.get(id)
    }

    /// The block whose rendered subtree contains `node`.
    pub fn block_for_node(&self, node: NodeId) -> Option<&Block> {
        self.registry
            .resolve_block_for(&self.substrate, node)
            .and_then(|id| self.registry.get(id))
    }

    /// The cached selection snapshot.
    pub fn snapshot(&self) -> Option<&SelectionSnapshot> {
        self.bridge.snapshot()
    }

    /// Rectangle of the current selection, for toolbar positioning.
    pub fn bounding_rect(&self) -> Option<Rect> {
        self.bridge.bounding_rect()
    }

    /// Register a callback run with the new selection rectangle after every
    /// snapshot refresh.
    pub fn on_selection_change(&mut self, observer: impl FnMut(Option<Rect>) + 'static) {
        self.observers.push(Box::new(observer));
    }

    /// Re-snapshot the substrate selection and notify observers.
    pub fn selection_changed(&mut self) {
        self.bridge.refresh(&self.substrate);
        self.notify_observers();
    }

    pub(crate) fn notify_observers(&mut self) {
        let rect = self.bridge.bounding_rect();
        for observer in &mut self.observers {
            observer(rect);
        }
    }

    /// The block the cached selection lives in.
    ///
    /// Resolved from the selection's common ancestor, so a selection
    /// spanning several blocks resolves to none.
    pub fn active_block(&self) -> Option<BlockId> {
        let snapshot = self.bridge.snapshot()?;
        let id = self
            .registry
            .resolve_block_for(&self.substrate, snapshot.common_ancestor);
        if id.is_none() {
            tracing::warn!(
                target: "weaver::editor",
                common = %snapshot.common_ancestor,
                "selection resolves to no block"
            );
        }
        id
    }

    /// Formats shared by all text the selection covers.
    ///
    /// A caret reports the span it follows. Empty when nothing is selected.
    pub fn active_formats(&self) -> FormatSet {
        let Some(snapshot) = self.bridge.snapshot() else {
            return FormatSet::empty();
        };
        let Some(block) = self.active_block().and_then(|id| self.registry.get(id)) else {
            return FormatSet::empty();
        };
        reconcile::shared_format(&block.spans, snapshot.range_in(block))
    }

    /// Run an action. Returns whether it changed anything.
    pub fn execute(&mut self, action: &EditorAction) -> bool {
        execute_action(self, action)
    }

    /// React to a host notification.
    pub fn handle_event(&mut self, event: &EditorEvent) -> EventResult {
        handle_event(self, event)
    }

    pub fn toggle_bold(&mut self) -> bool {
        self.execute(&EditorAction::ToggleBold)
    }

    pub fn toggle_italic(&mut self) -> bool {
        self.execute(&EditorAction::ToggleItalic)
    }

    pub fn toggle_underline(&mut self) -> bool {
        self.execute(&EditorAction::ToggleUnderline)
    }

    pub fn toggle_strikethrough(&mut self) -> bool {
        self.execute(&EditorAction::ToggleStrikethrough)
    }

    /// Toggle any tag over the selection.
    pub fn toggle_format(&mut self, tag: FormatTag) -> bool {
        let action = match tag {
            FormatTag::Strong => EditorAction::ToggleBold,
            FormatTag::Italic => EditorAction::ToggleItalic,
            FormatTag::Through => EditorAction::ToggleStrikethrough,
            FormatTag::Color => EditorAction::ToggleColor,
            FormatTag::Background => EditorAction::ToggleBackground,
            FormatTag::Code => EditorAction::ToggleCode,
            FormatTag::Underline => EditorAction::ToggleUnderline,
        };
        self.execute(&action)
    }

    pub fn set_block_kind(&mut self, kind: BlockKind) -> bool {
        self.execute(&EditorAction::SetBlockKind(kind))
    }

    pub fn insert_block_after(&mut self, node: NodeId) -> bool {
        self.execute(&EditorAction::InsertBlockAfter(node))
    }

    pub fn insert_block_before(&mut self, node: NodeId) -> bool {
        self.execute(&EditorAction::InsertBlockBefore(node))
    }

    pub fn remove_block(&mut self, node: NodeId) -> bool {
        self.execute(&EditorAction::RemoveBlock(node))
    }

    pub fn insert_text(&mut self, text: impl Into<String>) -> bool {
        self.execute(&EditorAction::InsertText(text.into()))
    }

    pub fn delete_backward(&mut self) -> bool {
        self.execute(&EditorAction::DeleteBackward)
    }

    /// Record a click; `Some(Double)` when it completes a double click.
    pub fn click(&mut self) -> Option<Click> {
        self.clicks.click()
    }

    /// Resolve a pending single click once its window has passed.
    pub fn poll_click(&mut self) -> Option<Click> {
        self.clicks.poll()
    }
}
