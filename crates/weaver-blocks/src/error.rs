//! Error types for editor operations.

use thiserror::Error;

use crate::platform::PlatformError;
use crate::types::BlockId;

/// Errors that can occur inside editor operations.
///
/// These never escape the command surface: `EditorContext` logs them and
/// reports the command as unhandled.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum EditorError {
    /// Format tag name outside the fixed vocabulary.
    #[error("unknown format tag: {0}")]
    UnknownTag(String),

    /// Block kind name outside the fixed vocabulary.
    #[error("unknown block kind: {0}")]
    UnknownBlockKind(String),

    /// A block id that the registry does not know.
    #[error("block {0} is not registered")]
    MissingBlock(BlockId),

    /// The host substrate refused an operation.
    #[error("substrate error: {0}")]
    Platform(#[from] PlatformError),

    /// Configuration could not be parsed.
    #[error("invalid editor config: {0}")]
    Config(#[from] serde_json::Error),
}
