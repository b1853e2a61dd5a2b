//! Span reconciliation: recompute a block's span sequence after an edit and
//! install it in the substrate.
//!
//! The pure transforms live in `partition` and `edit`. This module owns the
//! install step: restyle, one atomic content swap on the container, then
//! adopt the new sequence. If the substrate refuses the swap, the block keeps
//! its previous spans.

mod edit;
mod partition;

#[cfg(test)]
mod tests;

use std::ops::Range;

pub use edit::{delete_range, insert_text};
pub use partition::{
    Partition, ToggleOutcome, coalesce, partition, shared_format, toggle_adds, toggle_format,
};

use crate::error::EditorError;
use crate::platform::{MutationSink, PlatformError, RenderedFragment};
use crate::span::{Block, Span};
use crate::style::StyleRegistry;
use crate::types::{FormatTag, NodeId};

/// Render `spans` into `container`, replacing whatever was there.
///
/// On success every span carries its new fragment node and final index.
pub fn render_spans<S: MutationSink + ?Sized>(
    substrate: &mut S,
    styles: &StyleRegistry,
    container: NodeId,
    spans: &mut [Span],
) -> Result<(), EditorError> {
    for span in spans.iter_mut() {
        styles.restyle(&mut span.presentation, span.format);
    }
    let fragments: Vec<RenderedFragment> = spans
        .iter()
        .map(|span| RenderedFragment {
            text: span.content.clone(),
            presentation: (!span.presentation.is_empty()).then(|| span.presentation.clone()),
        })
        .collect();

    let nodes = substrate.replace_container_content(container, &fragments)?;
    if nodes.len() != spans.len() {
        return Err(PlatformError(format!(
            "substrate returned {} fragment nodes for {} spans",
            nodes.len(),
            spans.len()
        ))
        .into());
    }
    for (i, (span, node)) in spans.iter_mut().zip(nodes).enumerate() {
        span.node = Some(node);
        span.index = i;
    }
    Ok(())
}

/// Render a new span sequence and make it the block's own.
pub fn install<S: MutationSink + ?Sized>(
    substrate: &mut S,
    styles: &StyleRegistry,
    block: &mut Block,
    mut spans: Vec<Span>,
) -> Result<(), EditorError> {
    render_spans(substrate, styles, block.container, &mut spans)?;
    block.spans = spans;
    debug_assert!(block.is_coalesced(), "adjacent spans share a format set");
    Ok(())
}

/// Toggle `tag` over a char range of `block`.
///
/// Returns the indices of the spans now covering the selected text, or
/// `None` when the range overlaps nothing and the block is untouched.
pub fn apply_toggle<S: MutationSink + ?Sized>(
    substrate: &mut S,
    styles: &StyleRegistry,
    block: &mut Block,
    range: Range<usize>,
    tag: FormatTag,
) -> Result<Option<Range<usize>>, EditorError> {
    let Some(outcome) = toggle_format(&block.spans, range.clone(), tag) else {
        tracing::trace!(target: "weaver::reconcile", block = %block.id, ?range, "nothing to toggle");
        return Ok(None);
    };
    install(substrate, styles, block, outcome.spans)?;

    tracing::debug!(
        target: "weaver::reconcile",
        block = %block.id,
        %tag,
        added = outcome.added,
        spans = block.spans.len(),
        "reconciled block"
    );
    Ok(Some(outcome.affected))
}
