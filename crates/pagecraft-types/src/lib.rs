//! Page and block document types for pagecraft.
//!
//! This crate is the document model: typed ids, the [`Page`] aggregate, its
//! [`Block`] entries, and the invariants a page satisfies at rest. It has
//! **no internal pagecraft dependencies**. It is the leaf crate
//! that the editor and any exporter build on.
//!
//! ```text
//! Page (PageId)
//!     └── languages, default_language
//!     └── global_settings   (style key → value)
//!     └── blocks[]          (ordered, order = index)
//!             └── Block (BlockId, type, order)
//!                     └── settings  (key → value)
//!                     └── content   (language → field → value)
//! ```

pub mod block;
pub mod ids;
pub mod page;

pub use block::{Block, BlockType, Content, FieldMap, LanguageTag, Settings};
pub use ids::{BlockId, PageId};
pub use page::{InvariantViolation, Page};

/// Current time as Unix milliseconds.
pub fn now_millis() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
