//! Editing session: the live page plus its history and selection.
//!
//! An [`EditorSession`] is the one owner of a page while it is being edited.
//! It is constructed explicitly (`open`, `create`), handed to whatever runs
//! the UI loop, and torn down with [`EditorSession::close`], which drops the
//! history with it.
//!
//! # Apply path
//!
//! Ordinary mutations and time travel share one commit step:
//!
//! ```text
//! mutation ─► ops::apply ─┐
//!                         ├─► commit: history.record ─► live page ─► reconcile selection
//! undo/redo/jump ─────────┘           (no-op while replaying)
//! ```
//!
//! Time travel raises the history's replay state before the snapshot comes
//! back and lowers it only after the page and selection have settled.
//!
//! Calls are serialized by `&mut self`; nothing here suspends, so a
//! persistence write can only happen after a call has fully returned.

use std::sync::Arc;

use pagecraft_types::{Block, BlockId, BlockType, Page, Settings};

use crate::action::HistoryAction;
use crate::config::EditorConfig;
use crate::history::{History, TimeTravel};
use crate::ops::{self, BlockPatch, PageOp};
use crate::registry::BlockRegistry;
use crate::selection;
use crate::{EditorError, Result, persist};

/// Read-only view for a rendering layer.
#[derive(Clone, Copy, Debug)]
pub struct EditorView<'a> {
    pub page: &'a Page,
    pub selected: Option<&'a Block>,
    pub can_undo: bool,
    pub can_redo: bool,
    pub dirty: bool,
}

/// One page being edited.
pub struct EditorSession {
    page: Page,
    history: History,
    /// Lookup key only; re-validated against `page.blocks` after every change.
    selection: Option<BlockId>,
    /// Changed since the last `mark_saved`.
    dirty: bool,
    registry: Arc<dyn BlockRegistry>,
}

impl std::fmt::Debug for EditorSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EditorSession")
            .field("page", &self.page.id)
            .field("blocks", &self.page.len())
            .field("history", &self.history.len())
            .field("cursor", &self.history.cursor())
            .field("selection", &self.selection)
            .field("dirty", &self.dirty)
            .finish()
    }
}

impl EditorSession {
    /// Start editing an existing page.
    ///
    /// Fails with `MalformedDocument` if the page breaks its invariants.
    pub fn open(
        page: Page,
        registry: Arc<dyn BlockRegistry>,
        config: &EditorConfig,
    ) -> Result<Self> {
        let mut session = Self {
            page: Page::new("", config.default_language.clone(), Vec::new()),
            history: History::new(config.history_limit),
            selection: None,
            dirty: false,
            registry,
        };
        session.load(page)?;
        Ok(session)
    }

    /// Start editing a brand-new empty page.
    pub fn create(
        title: impl Into<String>,
        registry: Arc<dyn BlockRegistry>,
        config: &EditorConfig,
    ) -> Self {
        let page = config.new_page(title);
        let mut history = History::new(config.history_limit);
        history.initialize(&page);
        tracing::debug!(page = %page.id, "session created");
        Self {
            page,
            history,
            selection: None,
            dirty: true,
            registry,
        }
    }

    /// Parse a persisted page and start editing it.
    pub fn open_serialized(
        text: &str,
        registry: Arc<dyn BlockRegistry>,
        config: &EditorConfig,
    ) -> Result<Self> {
        Self::open(persist::deserialize(text)?, registry, config)
    }

    /// Replace the live page and reset history to it.
    ///
    /// Blocks are put in `order` sequence first; a page whose orders are not
    /// a permutation of `0..n-1` is rejected.
    pub fn load(&mut self, mut page: Page) -> Result<()> {
        page.adopt()
            .map_err(|e| EditorError::MalformedDocument(e.to_string()))?;
        self.history.initialize(&page);
        tracing::debug!(page = %page.id, blocks = page.len(), "page loaded");
        self.page = page;
        self.selection = None;
        self.dirty = false;
        Ok(())
    }

    /// End the session, returning the final page. History is discarded.
    pub fn close(self) -> Page {
        tracing::debug!(
            page = %self.page.id,
            entries = self.history.len(),
            dirty = self.dirty,
            "session closed"
        );
        self.page
    }

    // =========================================================================
    // Read-only surface
    // =========================================================================

    pub fn page(&self) -> &Page {
        &self.page
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn selected(&self) -> Option<BlockId> {
        selection::reconcile(&self.page.blocks, self.selection.clone())
    }

    pub fn selected_block(&self) -> Option<&Block> {
        self.selected().and_then(|id| self.page.block(&id))
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Call after the page has been persisted.
    pub fn mark_saved(&mut self) {
        self.dirty = false;
    }

    pub fn view(&self) -> EditorView<'_> {
        EditorView {
            page: &self.page,
            selected: self.selected_block(),
            can_undo: self.can_undo(),
            can_redo: self.can_redo(),
            dirty: self.dirty,
        }
    }

    pub fn serialize(&self) -> Result<String> {
        persist::serialize(&self.page)
    }

    // =========================================================================
    // Selection
    // =========================================================================

    /// Select a block, or clear the selection with `None`.
    pub fn select(&mut self, id: Option<BlockId>) -> Result<()> {
        if let Some(id) = &id
            && !self.page.contains(id)
        {
            return Err(EditorError::BlockNotFound(id.clone()));
        }
        self.selection = id;
        Ok(())
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    /// Apply any op. A block the op creates becomes the selection.
    pub fn execute(&mut self, op: &PageOp) -> Result<()> {
        let applied = ops::apply(&self.page, op, self.registry.as_ref())?;
        let candidate = applied.created.or_else(|| self.selection.clone());
        self.commit(applied.page, applied.action, candidate)
    }

    /// Insert a block with registry defaults and select it.
    pub fn add_block(
        &mut self,
        block_type: impl Into<BlockType>,
        position: Option<usize>,
    ) -> Result<BlockId> {
        let id = BlockId::new();
        self.execute(&PageOp::AddBlock {
            id: id.clone(),
            block_type: block_type.into(),
            position,
        })?;
        Ok(id)
    }

    pub fn update_block(&mut self, id: BlockId, patch: BlockPatch) -> Result<()> {
        self.execute(&PageOp::UpdateBlock { id, patch })
    }

    pub fn remove_block(&mut self, id: BlockId) -> Result<()> {
        self.execute(&PageOp::RemoveBlock { id })
    }

    /// Copy a block directly after itself and select the copy.
    pub fn duplicate_block(&mut self, id: BlockId) -> Result<BlockId> {
        let copy_id = BlockId::new();
        self.execute(&PageOp::DuplicateBlock {
            id,
            copy_id: copy_id.clone(),
        })?;
        Ok(copy_id)
    }

    pub fn reorder_blocks(&mut self, from: usize, to: usize) -> Result<()> {
        self.execute(&PageOp::ReorderBlocks { from, to })
    }

    pub fn update_page_settings(&mut self, settings: Settings) -> Result<()> {
        self.execute(&PageOp::UpdatePageSettings { settings })
    }

    pub fn set_title(&mut self, title: impl Into<String>) -> Result<()> {
        self.execute(&PageOp::SetTitle {
            title: title.into(),
        })
    }

    pub fn bulk_update(&mut self, updates: Vec<(BlockId, BlockPatch)>) -> Result<()> {
        self.execute(&PageOp::BulkUpdate { updates })
    }

    pub fn reset_block(&mut self, id: BlockId) -> Result<()> {
        self.execute(&PageOp::ResetBlock { id })
    }

    // =========================================================================
    // Time travel
    // =========================================================================

    /// Returns `false` when there is nothing to undo.
    pub fn undo(&mut self) -> Result<bool> {
        match self.history.undo()? {
            Some(travel) => self.apply_travel(travel).map(|_| true),
            None => Ok(false),
        }
    }

    /// Returns `false` when there is nothing to redo.
    pub fn redo(&mut self) -> Result<bool> {
        match self.history.redo()? {
            Some(travel) => self.apply_travel(travel).map(|_| true),
            None => Ok(false),
        }
    }

    pub fn jump_to(&mut self, index: usize) -> Result<()> {
        let travel = self.history.jump_to(index)?;
        self.apply_travel(travel)
    }

    fn apply_travel(&mut self, travel: TimeTravel) -> Result<()> {
        let TimeTravel {
            page,
            index,
            action,
            guard,
        } = travel;
        tracing::debug!(index, action = %action.kind, "time travel");
        let candidate = self.selection.clone();
        self.commit(page, action, candidate)?;
        guard.complete();
        Ok(())
    }

    // =========================================================================
    // Commit
    // =========================================================================

    fn commit(
        &mut self,
        next: Page,
        action: HistoryAction,
        candidate: Option<BlockId>,
    ) -> Result<()> {
        let kind = action.kind;
        let recorded = self.history.record(&next, action)?;
        self.page = next;
        self.dirty = true;
        self.selection = selection::reconcile(&self.page.blocks, candidate);
        tracing::debug!(
            page = %self.page.id,
            action = %kind,
            recorded,
            blocks = self.page.len(),
            cursor = ?self.history.cursor(),
            "page updated"
        );
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::BlockCatalog;
    use serde_json::json;

    fn session() -> EditorSession {
        EditorSession::create(
            "Landing",
            Arc::new(BlockCatalog::builtin()),
            &EditorConfig::default(),
        )
    }

    #[test]
    fn test_create_starts_with_one_history_entry() {
        let s = session();
        assert!(s.page().is_empty());
        assert_eq!(s.history().len(), 1);
        assert!(!s.can_undo());
        assert!(!s.can_redo());
        assert_eq!(s.selected(), None);
    }

    #[test]
    fn test_add_selects_new_block() {
        let mut s = session();
        let id = s.add_block("hero", None).unwrap();
        assert_eq!(s.selected(), Some(id));
        assert_eq!(s.selected_block().unwrap().block_type.as_str(), "hero");
        assert!(s.is_dirty());
    }

    #[test]
    fn test_failed_mutation_changes_nothing() {
        let mut s = session();
        s.add_block("hero", None).unwrap();
        let before = s.page().clone();
        let entries = s.history().len();

        assert!(s.add_block("nope", None).is_err());
        assert!(s.reorder_blocks(0, 3).is_err());
        assert!(s.remove_block(BlockId::new()).is_err());

        assert_eq!(s.page(), &before);
        assert_eq!(s.history().len(), entries);
    }

    #[test]
    fn test_remove_clears_selection() {
        let mut s = session();
        let id = s.add_block("hero", None).unwrap();
        s.remove_block(id).unwrap();
        assert_eq!(s.selected(), None);
    }

    #[test]
    fn test_selection_survives_unrelated_changes() {
        let mut s = session();
        let hero = s.add_block("hero", None).unwrap();
        let text = s.add_block("text", None).unwrap();
        s.select(Some(hero.clone())).unwrap();
        s.remove_block(text).unwrap();
        assert_eq!(s.selected(), Some(hero));
    }

    #[test]
    fn test_select_missing_block_fails() {
        let mut s = session();
        let ghost = BlockId::new();
        assert_eq!(
            s.select(Some(ghost.clone())),
            Err(EditorError::BlockNotFound(ghost))
        );
        s.select(None).unwrap();
    }

    #[test]
    fn test_undo_past_creation_clears_selection() {
        let mut s = session();
        let id = s.add_block("hero", None).unwrap();
        assert_eq!(s.selected(), Some(id));
        assert!(s.undo().unwrap());
        assert_eq!(s.selected(), None);
        assert!(s.page().is_empty());
    }

    #[test]
    fn test_undo_does_not_record() {
        let mut s = session();
        s.add_block("hero", None).unwrap();
        s.add_block("text", None).unwrap();
        assert_eq!(s.history().len(), 3);

        s.undo().unwrap();
        assert_eq!(s.history().len(), 3);
        assert!(s.can_redo());
        assert!(!s.history().is_replaying());
    }

    #[test]
    fn test_duplicate_selects_copy() {
        let mut s = session();
        let id = s.add_block("gallery", None).unwrap();
        let copy = s.duplicate_block(id.clone()).unwrap();
        assert_ne!(copy, id);
        assert_eq!(s.page().position(&copy), Some(1));
        assert_eq!(s.selected(), Some(copy));
    }

    #[test]
    fn test_title_and_settings_are_recorded() {
        let mut s = session();
        s.set_title("Spring launch").unwrap();
        let mut settings = Settings::new();
        settings.insert("primaryColor".into(), json!("#e91e63"));
        s.update_page_settings(settings).unwrap();

        let descriptions: Vec<_> = s
            .history()
            .summary()
            .into_iter()
            .map(|i| i.description)
            .collect();
        assert_eq!(
            descriptions,
            vec!["Open page", "Update page title", "Update page primaryColor"]
        );

        s.undo().unwrap();
        assert!(s.page().global_settings.is_empty());
        assert_eq!(s.page().title, "Spring launch");
    }

    #[test]
    fn test_load_resets_history_and_selection() {
        let mut s = session();
        let id = s.add_block("hero", None).unwrap();
        let page = s.page().clone();
        s.add_block("text", None).unwrap();

        s.load(page.clone()).unwrap();
        assert_eq!(s.page(), &page);
        assert_eq!(s.history().len(), 1);
        assert_eq!(s.selected(), None);
        assert!(!s.is_dirty());
        assert!(page.contains(&id));
    }

    #[test]
    fn test_open_rejects_invalid_page() {
        let mut page = EditorConfig::default().new_page("Broken");
        page.blocks.push(Block::new("hero", 3));
        let err = EditorSession::open(
            page,
            Arc::new(BlockCatalog::builtin()),
            &EditorConfig::default(),
        )
        .unwrap_err();
        assert!(matches!(err, EditorError::MalformedDocument(_)));
    }

    #[test]
    fn test_open_sorts_blocks_by_order() {
        let mut page = EditorConfig::default().new_page("Shuffled");
        page.blocks.push(Block::new("features", 1));
        page.blocks.push(Block::new("hero", 0));
        let s = EditorSession::open(
            page,
            Arc::new(BlockCatalog::builtin()),
            &EditorConfig::default(),
        )
        .unwrap();

        let types: Vec<_> = s.page().blocks.iter().map(|b| b.block_type.as_str()).collect();
        assert_eq!(types, vec!["hero", "features"]);
        assert_eq!(s.history().current().unwrap().snapshot(), s.page());
    }

    #[test]
    fn test_dirty_tracking() {
        let mut s = session();
        s.mark_saved();
        assert!(!s.is_dirty());
        s.add_block("cta", None).unwrap();
        assert!(s.is_dirty());
        s.mark_saved();
        s.undo().unwrap();
        assert!(s.is_dirty());
    }

    #[test]
    fn test_view_reflects_state() {
        let mut s = session();
        let id = s.add_block("hero", None).unwrap();
        let view = s.view();
        assert_eq!(view.page.len(), 1);
        assert_eq!(view.selected.map(|b| &b.id), Some(&id));
        assert!(view.can_undo);
        assert!(!view.can_redo);
    }

    #[test]
    fn test_close_returns_page() {
        let mut s = session();
        s.add_block("footer", None).unwrap();
        let page = s.close();
        assert_eq!(page.len(), 1);
    }
}
