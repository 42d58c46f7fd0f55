//! Error types for editing operations.

use thiserror::Error;

use pagecraft_types::{BlockId, BlockType};

/// Errors from mutations, history navigation, and document loading.
///
/// All are local, synchronous failures of one call. A call that returns an
/// error has left the live page, selection, and history untouched.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EditorError {
    /// Block not found in the page.
    #[error("block not found: {0:?}")]
    BlockNotFound(BlockId),

    /// An op tried to introduce an id the page already has.
    #[error("block already exists: {0:?}")]
    DuplicateBlockId(BlockId),

    /// The registry has no defaults for this block type.
    #[error("unknown block type: {0}")]
    UnknownBlockType(BlockType),

    /// Index outside `[0, len)`.
    #[error("index {index} out of range for length {len}")]
    IndexOutOfRange { index: usize, len: usize },

    /// History navigation on an uninitialized history, or while another
    /// time travel is still being applied.
    #[error("invalid history state: {0}")]
    InvalidHistoryState(&'static str),

    /// Persisted document could not be parsed or violates page invariants.
    #[error("malformed document: {0}")]
    MalformedDocument(String),
}
