//! Snapshot history with a movable cursor.
//!
//! [`History`] keeps an index-addressable sequence of whole-page snapshots.
//! Each entry is the page *after* the action it names; entry 0 is the page
//! as it was loaded. Undo, redo and jump only move the cursor and hand back
//! a copy of the snapshot under it.
//!
//! ```text
//! record ×3
//!   [init, A, B, C]          cursor = 3
//!                     ^
//! undo ×2
//!   [init, A, B, C]          cursor = 1   (B, C are the redo branch)
//!           ^
//! record D: redo branch dropped
//!   [init, A, D]             cursor = 2
//!               ^
//! ```
//!
//! # Replay suppression
//!
//! Applying a snapshot goes through the same path as an ordinary mutation,
//! and that path calls [`History::record`]. While a time travel is being
//! applied the history is in a replay state and `record` is a no-op, so an
//! undo never re-records itself as a new forward action.
//!
//! The replay state is raised before the snapshot is returned and lowered
//! by the [`ReplayGuard`] travelling with it, exactly once: through
//! [`ReplayGuard::complete`] or when the guard is dropped.
//!
//! # Memory
//!
//! Every entry owns an independent deep copy of the page. The entry count
//! is bounded by `limit`; the oldest entries are evicted first.

use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicU8, Ordering};

use pagecraft_types::{Page, now_millis};

use crate::action::HistoryAction;
use crate::{EditorError, Result};

/// Default number of retained snapshots.
pub const DEFAULT_HISTORY_LIMIT: usize = 50;

/// One retained page state.
///
/// Immutable once appended. Entries are shared as `Arc<HistoryEntry>` so a
/// history list can be read without copying snapshots.
#[derive(Debug)]
pub struct HistoryEntry {
    seq: u64,
    timestamp: u64,
    snapshot: Page,
    action: HistoryAction,
}

impl HistoryEntry {
    /// Monotonic sequence id. For ordering and debugging, not addressing.
    pub fn seq(&self) -> u64 {
        self.seq
    }

    /// When the entry was recorded (Unix millis).
    pub fn timestamp(&self) -> u64 {
        self.timestamp
    }

    /// The page after `action` was applied.
    pub fn snapshot(&self) -> &Page {
        &self.snapshot
    }

    pub fn action(&self) -> &HistoryAction {
        &self.action
    }

    pub fn describe(&self) -> String {
        self.action.describe()
    }
}

/// Row of a history listing.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HistoryItem {
    pub index: usize,
    pub seq: u64,
    pub timestamp: u64,
    pub description: String,
    pub is_current: bool,
}

/// What the history is doing right now.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum ReplayState {
    /// Recording normally.
    Idle = 0,
    /// An undo is being applied.
    Undo = 1,
    /// A redo is being applied.
    Redo = 2,
    /// A jump is being applied.
    Jump = 3,
}

impl ReplayState {
    fn from_u8(v: u8) -> Self {
        match v {
            1 => ReplayState::Undo,
            2 => ReplayState::Redo,
            3 => ReplayState::Jump,
            _ => ReplayState::Idle,
        }
    }
}

/// Lowers the replay state when the caller is done applying a snapshot.
///
/// Single-shot: `complete()` consumes the guard, and dropping it without
/// calling `complete()` lowers the state too.
#[must_use = "the history stops recording until this guard is completed or dropped"]
#[derive(Debug)]
pub struct ReplayGuard {
    state: Option<Arc<AtomicU8>>,
}

impl ReplayGuard {
    /// Mark the snapshot as applied and resume recording.
    pub fn complete(mut self) {
        self.release();
    }

    fn release(&mut self) {
        if let Some(state) = self.state.take() {
            state.store(ReplayState::Idle as u8, Ordering::Release);
        }
    }
}

impl Drop for ReplayGuard {
    fn drop(&mut self) {
        self.release();
    }
}

/// A snapshot handed out by undo, redo or jump.
#[derive(Debug)]
pub struct TimeTravel {
    /// Deep copy of the snapshot; the caller may mutate it freely.
    pub page: Page,
    /// Cursor position the snapshot came from.
    pub index: usize,
    /// Action of the entry now under the cursor.
    pub action: HistoryAction,
    pub guard: ReplayGuard,
}

/// Bounded snapshot history.
#[derive(Debug)]
pub struct History {
    entries: VecDeque<Arc<HistoryEntry>>,
    cursor: usize,
    limit: usize,
    next_seq: u64,
    replay: Arc<AtomicU8>,
}

impl Default for History {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_LIMIT)
    }
}

impl History {
    /// Create an empty (uninitialized) history retaining at most `limit`
    /// entries. A limit of 0 is treated as 1.
    pub fn new(limit: usize) -> Self {
        Self {
            entries: VecDeque::new(),
            cursor: 0,
            limit: limit.max(1),
            next_seq: 0,
            replay: Arc::new(AtomicU8::new(ReplayState::Idle as u8)),
        }
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn limit(&self) -> usize {
        self.limit
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the history has never been initialized.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Cursor position, or `None` before the first `initialize`.
    pub fn cursor(&self) -> Option<usize> {
        (!self.entries.is_empty()).then_some(self.cursor)
    }

    pub fn replay_state(&self) -> ReplayState {
        ReplayState::from_u8(self.replay.load(Ordering::Acquire))
    }

    /// Check if a time travel is being applied.
    pub fn is_replaying(&self) -> bool {
        self.replay_state() != ReplayState::Idle
    }

    pub fn can_undo(&self) -> bool {
        !self.entries.is_empty() && self.cursor > 0
    }

    pub fn can_redo(&self) -> bool {
        !self.entries.is_empty() && self.cursor + 1 < self.entries.len()
    }

    /// Entry at a cursor index.
    pub fn entry(&self, index: usize) -> Option<&Arc<HistoryEntry>> {
        self.entries.get(index)
    }

    /// Entry under the cursor.
    pub fn current(&self) -> Option<&Arc<HistoryEntry>> {
        self.cursor().and_then(|c| self.entries.get(c))
    }

    /// All retained entries, oldest first.
    pub fn entries(&self) -> impl Iterator<Item = &Arc<HistoryEntry>> {
        self.entries.iter()
    }

    /// Listing for a history-browsing UI, oldest first.
    pub fn summary(&self) -> Vec<HistoryItem> {
        self.entries
            .iter()
            .enumerate()
            .map(|(index, e)| HistoryItem {
                index,
                seq: e.seq,
                timestamp: e.timestamp,
                description: e.describe(),
                is_current: index == self.cursor,
            })
            .collect()
    }

    // =========================================================================
    // Recording
    // =========================================================================

    /// Reset to a single `initialize` entry holding a copy of `page`.
    ///
    /// Any replay state left behind is detached: guards handed out before
    /// the reset no longer affect this history.
    pub fn initialize(&mut self, page: &Page) {
        self.entries.clear();
        self.cursor = 0;
        self.replay = Arc::new(AtomicU8::new(ReplayState::Idle as u8));
        self.push(page, HistoryAction::initialize());
        tracing::trace!(page = %page.id, "history initialized");
    }

    /// Record `page` as the state after `action`.
    ///
    /// Returns `Ok(false)` without touching anything while a time travel is
    /// being applied. Otherwise drops the redo branch, appends a copy of
    /// `page`, moves the cursor to the new tip and evicts from the oldest
    /// end past the limit.
    pub fn record(&mut self, page: &Page, action: HistoryAction) -> Result<bool> {
        if self.is_replaying() {
            tracing::trace!(action = %action.kind, "history record suppressed during replay");
            return Ok(false);
        }
        if self.entries.is_empty() {
            return Err(EditorError::InvalidHistoryState("history not initialized"));
        }

        let dropped = self.entries.len() - (self.cursor + 1);
        if dropped > 0 {
            self.entries.truncate(self.cursor + 1);
            tracing::trace!(dropped, "redo branch discarded");
        }

        self.push(page, action);

        let mut evicted = 0;
        while self.entries.len() > self.limit {
            self.entries.pop_front();
            evicted += 1;
        }
        if evicted > 0 {
            self.cursor -= evicted;
            tracing::debug!(evicted, limit = self.limit, "evicted oldest history entries");
        }
        Ok(true)
    }

    fn push(&mut self, page: &Page, action: HistoryAction) {
        let entry = HistoryEntry {
            seq: self.next_seq,
            timestamp: now_millis(),
            snapshot: page.clone(),
            action,
        };
        self.next_seq += 1;
        self.entries.push_back(Arc::new(entry));
        self.cursor = self.entries.len() - 1;
    }

    // =========================================================================
    // Time travel
    // =========================================================================

    /// Step back one entry. `Ok(None)` when already at the oldest entry.
    pub fn undo(&mut self) -> Result<Option<TimeTravel>> {
        self.ensure_navigable()?;
        if self.cursor == 0 {
            return Ok(None);
        }
        Ok(Some(self.travel(self.cursor - 1, ReplayState::Undo)))
    }

    /// Step forward one entry. `Ok(None)` when already at the tip.
    pub fn redo(&mut self) -> Result<Option<TimeTravel>> {
        self.ensure_navigable()?;
        if self.cursor + 1 >= self.entries.len() {
            return Ok(None);
        }
        Ok(Some(self.travel(self.cursor + 1, ReplayState::Redo)))
    }

    /// Move the cursor to any retained entry.
    pub fn jump_to(&mut self, index: usize) -> Result<TimeTravel> {
        self.ensure_navigable()?;
        if index >= self.entries.len() {
            return Err(EditorError::IndexOutOfRange {
                index,
                len: self.entries.len(),
            });
        }
        Ok(self.travel(index, ReplayState::Jump))
    }

    fn ensure_navigable(&self) -> Result<()> {
        if self.entries.is_empty() {
            return Err(EditorError::InvalidHistoryState("history not initialized"));
        }
        if self.is_replaying() {
            return Err(EditorError::InvalidHistoryState(
                "a time travel is still being applied",
            ));
        }
        Ok(())
    }

    fn travel(&mut self, index: usize, state: ReplayState) -> TimeTravel {
        self.replay.store(state as u8, Ordering::Release);
        self.cursor = index;
        let entry = &self.entries[index];
        tracing::trace!(?state, index, seq = entry.seq, "history cursor moved");
        TimeTravel {
            page: entry.snapshot.clone(),
            index,
            action: entry.action.clone(),
            guard: ReplayGuard {
                state: Some(Arc::clone(&self.replay)),
            },
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
