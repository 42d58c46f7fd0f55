//! Page operations.
//!
//! Every change to a page is expressed as a [`PageOp`]. Operations are:
//! - Serializable, so a UI layer can send them over any transport
//! - Applied copy-on-write: [`apply`] reads the current page and returns a
//!   wholly new one, leaving the input untouched
//! - All-or-nothing: a failing op returns an error and no page at all
//!
//! Any op that changes the block list leaves `order` contiguous.

use serde::{Deserialize, Serialize};

use pagecraft_types::{Block, BlockId, BlockType, Content, Page, Settings};

use crate::action::{ActionKind, HistoryAction};
use crate::registry::BlockRegistry;
use crate::{EditorError, Result};

/// Top-level block fields to replace.
///
/// Merging is shallow: a present `settings` or `content` replaces the whole
/// map. Callers build the merged nested value themselves.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BlockPatch {
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub block_type: Option<BlockType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub settings: Option<Settings>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<Content>,
}

impl BlockPatch {
    pub fn settings(settings: Settings) -> Self {
        Self {
            settings: Some(settings),
            ..Self::default()
        }
    }

    pub fn content(content: Content) -> Self {
        Self {
            content: Some(content),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.block_type.is_none() && self.settings.is_none() && self.content.is_none()
    }

    /// Names of the fields this patch replaces.
    pub fn fields(&self) -> Vec<&'static str> {
        let mut fields = Vec::new();
        if self.block_type.is_some() {
            fields.push("type");
        }
        if self.settings.is_some() {
            fields.push("settings");
        }
        if self.content.is_some() {
            fields.push("content");
        }
        fields
    }

    fn apply_to(&self, block: &mut Block) {
        if let Some(t) = &self.block_type {
            block.block_type = t.clone();
        }
        if let Some(s) = &self.settings {
            block.settings = s.clone();
        }
        if let Some(c) = &self.content {
            block.content = c.clone();
        }
    }
}

/// A single page mutation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum PageOp {
    /// Insert a block of `block_type` with registry defaults.
    ///
    /// `position` past the end (or absent) appends.
    AddBlock {
        /// Id of the new block.
        id: BlockId,
        block_type: BlockType,
        position: Option<usize>,
    },

    /// Shallow-merge top-level fields into one block.
    UpdateBlock { id: BlockId, patch: BlockPatch },

    /// Remove a block and renumber the rest.
    RemoveBlock { id: BlockId },

    /// Copy a block directly after the source.
    DuplicateBlock {
        id: BlockId,
        /// Id of the copy.
        copy_id: BlockId,
    },

    /// Splice-move: remove at `from`, reinsert at `to`.
    ReorderBlocks { from: usize, to: usize },

    /// Shallow-merge keys into the page's global settings.
    UpdatePageSettings { settings: Settings },

    /// Rename the page.
    SetTitle { title: String },

    /// Several block updates as one step. Fails whole if any id is missing.
    BulkUpdate { updates: Vec<(BlockId, BlockPatch)> },

    /// Replace a block's settings and content with registry defaults.
    ResetBlock { id: BlockId },
}

impl PageOp {
    /// `AddBlock` with a freshly minted id.
    pub fn add_block(block_type: impl Into<BlockType>, position: Option<usize>) -> Self {
        PageOp::AddBlock {
            id: BlockId::new(),
            block_type: block_type.into(),
            position,
        }
    }

    /// `DuplicateBlock` with a freshly minted copy id.
    pub fn duplicate_block(id: BlockId) -> Self {
        PageOp::DuplicateBlock {
            id,
            copy_id: BlockId::new(),
        }
    }
}

/// Result of applying an op.
#[derive(Clone, Debug)]
pub struct Applied {
    /// The new page.
    pub page: Page,
    /// What to record in history.
    pub action: HistoryAction,
    /// Block created by the op (add or duplicate), which becomes selected.
    pub created: Option<BlockId>,
}

/// Apply `op` to a copy of `page`.
pub fn apply(page: &Page, op: &PageOp, registry: &dyn BlockRegistry) -> Result<Applied> {
    let mut next = page.clone();
    let mut created = None;

    let action = match op {
        PageOp::AddBlock {
            id,
            block_type,
            position,
        } => {
            if next.contains(id) {
                return Err(EditorError::DuplicateBlockId(id.clone()));
            }
            let defaults = registry.require(block_type)?;
            let mut block = Block::new(block_type.clone(), 0);
            block.id = id.clone();
            block.settings = defaults.settings.clone();
            block.content = defaults.content_for(&next.languages);

            let index = match position {
                Some(p) if *p < next.blocks.len() => *p,
                _ => next.blocks.len(),
            };
            created = Some(id.clone());
            next.blocks.insert(index, block);
            next.renumber();
            HistoryAction::new(ActionKind::AddBlock).with_block_type(block_type)
        }

        PageOp::UpdateBlock { id, patch } => {
            let block = next
                .block_mut(id)
                .ok_or_else(|| EditorError::BlockNotFound(id.clone()))?;
            let original_type = block.block_type.clone();
            patch.apply_to(block);
            HistoryAction::new(ActionKind::UpdateBlock)
                .with_block_type(&original_type)
                .with_fields(patch.fields())
        }

        PageOp::RemoveBlock { id } => {
            let index = next
                .position(id)
                .ok_or_else(|| EditorError::BlockNotFound(id.clone()))?;
            let removed = next.blocks.remove(index);
            next.renumber();
            HistoryAction::new(ActionKind::DeleteBlock).with_block_type(&removed.block_type)
        }

        PageOp::DuplicateBlock { id, copy_id } => {
            let index = next
                .position(id)
                .ok_or_else(|| EditorError::BlockNotFound(id.clone()))?;
            if next.contains(copy_id) {
                return Err(EditorError::DuplicateBlockId(copy_id.clone()));
            }
            let mut copy = next.blocks[index].duplicate();
            copy.id = copy_id.clone();
            let block_type = copy.block_type.clone();
            created = Some(copy_id.clone());
            next.blocks.insert(index + 1, copy);
            next.renumber();
            HistoryAction::new(ActionKind::DuplicateBlock).with_block_type(&block_type)
        }

        PageOp::ReorderBlocks { from, to } => {
            let len = next.blocks.len();
            for &index in [from, to] {
                if index >= len {
                    return Err(EditorError::IndexOutOfRange { index, len });
                }
            }
            let block = next.blocks.remove(*from);
            let block_type = block.block_type.clone();
            next.blocks.insert(*to, block);
            next.renumber();
            HistoryAction::new(ActionKind::ReorderBlocks)
                .with_block_type(&block_type)
                .with_move(*from, *to)
        }

        PageOp::UpdatePageSettings { settings } => {
            for (key, value) in settings {
                next.global_settings.insert(key.clone(), value.clone());
            }
            HistoryAction::new(ActionKind::UpdatePageSettings).with_fields(settings.keys().cloned())
        }

        PageOp::SetTitle { title } => {
            next.title = title.clone();
            HistoryAction::new(ActionKind::UpdatePageSettings).with_field("title")
        }

        PageOp::BulkUpdate { updates } => {
            for (id, patch) in updates {
                let block = next
                    .block_mut(id)
                    .ok_or_else(|| EditorError::BlockNotFound(id.clone()))?;
                patch.apply_to(block);
            }
            HistoryAction::new(ActionKind::BulkUpdate).with_count(updates.len())
        }

        PageOp::ResetBlock { id } => {
            let languages = next.languages.clone();
            let block = next
                .block_mut(id)
                .ok_or_else(|| EditorError::BlockNotFound(id.clone()))?;
            let defaults = registry.require(&block.block_type)?;
            block.settings = defaults.settings.clone();
            block.content = defaults.content_for(&languages);
            HistoryAction::new(ActionKind::UpdateBlock)
                .with_block_type(&block.block_type)
                .with_field("reset")
        }
    };

    debug_assert!(next.validate().is_ok(), "{op:?} broke page invariants");
    Ok(Applied {
        page: next,
        action,
        created,
    })
}

// ============================================================================
// Tests
// ============================================================================
