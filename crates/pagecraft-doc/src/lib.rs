//! Page editing core for pagecraft.
//!
//! Holds one page in memory, changes it only through [`PageOp`]s, and keeps
//! a bounded whole-page snapshot history for undo, redo and jump.
//!
//! # Design Philosophy
//!
//! - **Copy-on-write**: every op produces a new, independently owned page.
//!   Nothing is edited in place, so a failed op leaves no trace.
//! - **Snapshots, not inverses**: history stores whole pages. Undo is cursor
//!   movement, never re-execution.
//! - **Selection is a key**: the selected block is an id, re-checked against
//!   the page after every change.
//!
//! # Layers
//!
//! - [`ops`]: the mutation vocabulary and its pure `apply`
//! - [`history`]: cursor over snapshots, redo-branch truncation, eviction,
//!   replay suppression
//! - [`selection`]: the reconcile rule
//! - [`session`]: [`EditorSession`], which owns the live page and wires
//!   the three together
//! - [`registry`], [`persist`]: boundaries to block-type defaults and to
//!   storage
//!
//! ```no_run
//! use std::sync::Arc;
//! use pagecraft_doc::{BlockCatalog, EditorConfig, EditorSession};
//!
//! let mut session = EditorSession::create(
//!     "Landing",
//!     Arc::new(BlockCatalog::builtin()),
//!     &EditorConfig::default(),
//! );
//! let hero = session.add_block("hero", None)?;
//! session.add_block("features", None)?;
//! session.reorder_blocks(0, 1)?;
//! session.undo()?;
//! assert_eq!(session.page().blocks[0].id, hero);
//! # Ok::<(), pagecraft_doc::EditorError>(())
//! ```

pub mod action;
pub mod config;
mod error;
pub mod history;
pub mod ops;
pub mod persist;
pub mod registry;
pub mod selection;
pub mod session;

pub use action::{ActionKind, ActionMeta, HistoryAction};
pub use config::{ConfigError, EditorConfig};
pub use error::EditorError;
pub use history::{
    DEFAULT_HISTORY_LIMIT, History, HistoryEntry, HistoryItem, ReplayGuard, ReplayState,
    TimeTravel,
};
pub use ops::{Applied, BlockPatch, PageOp};
pub use persist::{DirStore, PageStore, StoreError};
pub use registry::{BlockCatalog, BlockDefaults, BlockRegistry};
pub use session::{EditorSession, EditorView};

pub use pagecraft_types::{
    Block, BlockId, BlockType, Content, FieldMap, InvariantViolation, LanguageTag, Page, PageId,
    Settings,
};

/// Result type for editing operations.
pub type Result<T> = std::result::Result<T, EditorError>;
