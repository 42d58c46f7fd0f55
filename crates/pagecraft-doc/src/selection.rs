//! Selection reconciliation.
//!
//! The selected block is held as a lookup key, never a reference into the
//! page, so it can go stale whenever blocks disappear, through a delete or
//! through time travel to a state before the block existed.

use pagecraft_types::{Block, BlockId};

/// Effective selection for `blocks`: `candidate` if a block still has that
/// id, otherwise no selection.
pub fn reconcile(blocks: &[Block], candidate: Option<BlockId>) -> Option<BlockId> {
    candidate.filter(|id| blocks.iter().any(|b| b.id == *id))
}
