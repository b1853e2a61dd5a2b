//! weaver-blocks: block-based rich text editing over a host document.
//!
//! This crate provides:
//! - `Span` / `Block` - styled text runs and the paragraph blocks owning them
//! - `reconcile` - format toggling with boundary splitting and coalescing
//! - `StyleRegistry` - format tags to presentation properties
//! - `SelectionBridge` / `BlockRegistry` - selection snapshots and block lifecycle
//! - `EditorContext` - the command surface, generic over a `Substrate`
//! - `MemorySubstrate` - an in-memory host for tests and headless use

pub mod actions;
pub mod click;
pub mod config;
pub mod editor;
pub mod error;
pub mod execute;
pub mod memory;
pub mod platform;
pub mod reconcile;
pub mod registry;
pub mod selection;
pub mod span;
pub mod style;
pub mod types;

pub use actions::{EditorAction, EditorEvent, EventResult, Key};
pub use click::{Click, ClickDisambiguator};
pub use config::EditorConfig;
pub use editor::EditorContext;
pub use error::EditorError;
pub use execute::{execute_action, handle_event};
pub use memory::MemorySubstrate;
pub use platform::{
    DocumentTree, MutationSink, PlatformError, RenderedFragment, SelectionSource, Substrate,
};
pub use registry::{BlockRegistry, Removal};
pub use selection::{SelectionBridge, SelectionSnapshot};
pub use smol_str::SmolStr;
pub use span::{Block, PointLocation, Span};
pub use style::{Presentation, StyleProperty, StyleRegistry};
pub use types::{
    BlockId, BlockKind, DomPoint, FormatSet, FormatTag, NodeId, Placement, RawSelection, Rect,
};
