//! Action execution for an editor context.
//!
//! `execute_action` is the central dispatch point and the recovery boundary:
//! each executor returns `Result<bool, EditorError>`, and failures are
//! logged here and reported as unhandled. Nothing propagates into the host's
//! event loop.

use crate::actions::{EditorAction, EditorEvent, EventResult, Key};
use crate::editor::EditorContext;
use crate::error::EditorError;
use crate::platform::{DocumentTree, Substrate};
use crate::reconcile;
use crate::registry::Removal;
use crate::selection::SelectionSnapshot;
use crate::types::{BlockId, BlockKind, FormatTag, NodeId, Placement};

/// Execute an editor action.
///
/// Returns true if the action was handled and the document or selection
/// changed.
pub fn execute_action<S: Substrate>(ctx: &mut EditorContext<S>, action: &EditorAction) -> bool {
    let result = match action {
        EditorAction::SetBlockKind(kind) => execute_set_block_kind(ctx, *kind),
        EditorAction::InsertBlockAfter(node) => {
            execute_insert_block(ctx, *node, Placement::After)
        }
        EditorAction::InsertBlockBefore(node) => {
            execute_insert_block(ctx, *node, Placement::Before)
        }
        EditorAction::RemoveBlock(node) => execute_remove_block(ctx, *node),
        EditorAction::InsertText(text) => execute_insert_text(ctx, text),
        EditorAction::DeleteBackward => execute_delete_backward(ctx),
        toggle => match toggle.format_tag() {
            Some(tag) => execute_toggle_format(ctx, tag),
            None => Ok(false),
        },
    };

    match result {
        Ok(handled) => handled,
        Err(error) => {
            tracing::warn!(target: "weaver::editor", ?action, %error, "action failed");
            // Whatever the substrate did before failing, re-read it.
            ctx.selection_changed();
            false
        }
    }
}

/// React to a host notification.
pub fn handle_event<S: Substrate>(ctx: &mut EditorContext<S>, event: &EditorEvent) -> EventResult {
    let handled = match event {
        EditorEvent::SelectionChanged => {
            ctx.selection_changed();
            true
        }
        EditorEvent::KeyDown(Key::Enter) => match enter_action(ctx) {
            Some(action) => execute_action(ctx, &action),
            None => false,
        },
        EditorEvent::KeyDown(Key::Backspace) => execute_action(ctx, &EditorAction::DeleteBackward),
        // Text input arrives as `InsertText` from the host's input handling.
        EditorEvent::KeyDown(Key::Character(_) | Key::Other(_)) => false,
    };
    if handled {
        EventResult::Handled
    } else {
        EventResult::NotHandled
    }
}

/// Enter inserts an empty block next to the focused one.
///
/// A caret at the very start of a non-empty block inserts above it when the
/// config allows, so the current line moves down.
fn enter_action<S: Substrate>(ctx: &EditorContext<S>) -> Option<EditorAction> {
    let snapshot = ctx.bridge.snapshot()?;
    let id = ctx
        .registry
        .resolve_block_for(&ctx.substrate, snapshot.focus.node)?;
    let block = ctx.registry.get(id)?;

    let at_start = snapshot.is_collapsed() && snapshot.range_in(block).start == 0;
    if at_start && !block.is_empty() && ctx.config.enter_at_start_inserts_before {
        Some(EditorAction::InsertBlockBefore(block.container))
    } else {
        Some(EditorAction::InsertBlockAfter(block.container))
    }
}

/// The cached snapshot and the block it resolves to.
fn selection_target<S: Substrate>(
    ctx: &EditorContext<S>,
) -> Option<(SelectionSnapshot, BlockId)> {
    let Some(snapshot) = ctx.bridge.snapshot() else {
        tracing::trace!(target: "weaver::editor", "no active selection");
        return None;
    };
    let id = ctx.active_block()?;
    Some((snapshot.clone(), id))
}

fn execute_toggle_format<S: Substrate>(
    ctx: &mut EditorContext<S>,
    tag: FormatTag,
) -> Result<bool, EditorError> {
    let Some((snapshot, id)) = selection_target(ctx) else {
        return Ok(false);
    };
    if snapshot.is_collapsed() {
        return Ok(false);
    }

    let block = ctx
        .registry
        .get_mut(id)
        .ok_or(EditorError::MissingBlock(id))?;
    let range = snapshot.range_in(block);
    let Some(affected) =
        reconcile::apply_toggle(&mut ctx.substrate, &ctx.styles, block, range, tag)?
    else {
        return Ok(false);
    };

    ctx.bridge
        .restore(&mut ctx.substrate, &block.spans[affected])?;
    ctx.notify_observers();
    Ok(true)
}

fn execute_set_block_kind<S: Substrate>(
    ctx: &mut EditorContext<S>,
    kind: BlockKind,
) -> Result<bool, EditorError> {
    let Some(snapshot) = ctx.bridge.snapshot() else {
        return Ok(false);
    };
    let Some(id) = ctx
        .registry
        .resolve_block_for(&ctx.substrate, snapshot.focus.node)
    else {
        return Ok(false);
    };
    if ctx.registry.get(id).map(|b| b.kind) == Some(kind) {
        return Ok(false);
    }
    ctx.registry
        .change_kind(&mut ctx.substrate, &ctx.styles, id, kind)?;
    Ok(true)
}

fn execute_insert_block<S: Substrate>(
    ctx: &mut EditorContext<S>,
    anchor: NodeId,
    placement: Placement,
) -> Result<bool, EditorError> {
    ctx.registry
        .create_block(&mut ctx.substrate, anchor, placement)?;
    ctx.selection_changed();
    Ok(true)
}

fn execute_remove_block<S: Substrate>(
    ctx: &mut EditorContext<S>,
    node: NodeId,
) -> Result<bool, EditorError> {
    let Some(id) = ctx.registry.resolve_block_for(&ctx.substrate, node) else {
        tracing::warn!(target: "weaver::editor", %node, "remove requested outside any block");
        return Ok(false);
    };
    let container = ctx
        .registry
        .get(id)
        .map(|b| b.container)
        .ok_or(EditorError::MissingBlock(id))?;
    let previous = ctx
        .substrate
        .previous_sibling(container)
        .and_then(|sibling| ctx.registry.resolve_block_for(&ctx.substrate, sibling));

    let focus = match ctx
        .registry
        .remove_block(&mut ctx.substrate, &ctx.styles, id)?
    {
        Removal::Removed => previous,
        Removal::Cleared => Some(id),
    };
    ctx.registry.focus_block(&mut ctx.substrate, focus)?;
    ctx.selection_changed();
    Ok(true)
}

fn execute_insert_text<S: Substrate>(
    ctx: &mut EditorContext<S>,
    text: &str,
) -> Result<bool, EditorError> {
    let Some((snapshot, id)) = selection_target(ctx) else {
        return Ok(false);
    };
    let block = ctx
        .registry
        .get_mut(id)
        .ok_or(EditorError::MissingBlock(id))?;
    let range = snapshot.range_in(block);
    if text.is_empty() && range.is_empty() {
        return Ok(false);
    }

    let spans = reconcile::delete_range(&block.spans, range.clone());
    let spans = reconcile::insert_text(&spans, range.start, text);
    reconcile::install(&mut ctx.substrate, &ctx.styles, block, spans)?;
    tracing::debug!(
        target: "weaver::editor",
        block = %id,
        replaced = ?range,
        inserted = text.chars().count(),
        "inserted text"
    );

    let caret = block.point_at(range.start + text.chars().count());
    ctx.bridge.place_caret(&mut ctx.substrate, caret)?;
    ctx.notify_observers();
    Ok(true)
}

fn execute_delete_backward<S: Substrate>(
    ctx: &mut EditorContext<S>,
) -> Result<bool, EditorError> {
    let Some((snapshot, id)) = selection_target(ctx) else {
        return Ok(false);
    };
    let sole_block = ctx.registry.len() == 1;
    let block = ctx
        .registry
        .get_mut(id)
        .ok_or(EditorError::MissingBlock(id))?;

    if block.is_empty() {
        if sole_block {
            return Ok(false);
        }
        let container = block.container;
        return execute_remove_block(ctx, container);
    }

    let range = snapshot.range_in(block);
    let range = if range.is_empty() {
        // Joining with the previous block is not supported.
        if range.start == 0 {
            return Ok(false);
        }
        range.start - 1..range.start
    } else {
        range
    };

    let spans = reconcile::delete_range(&block.spans, range.clone());
    reconcile::install(&mut ctx.substrate, &ctx.styles, block, spans)?;
    tracing::debug!(target: "weaver::editor", block = %id, deleted = ?range, "deleted text");

    let caret = block.point_at(range.start);
    ctx.bridge.place_caret(&mut ctx.substrate, caret)?;
    ctx.notify_observers();
    Ok(true)
}
