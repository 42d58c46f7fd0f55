//! Typed identifiers for pages and blocks.
//!
//! An id is an opaque string. Ids minted here are hyphenated UUIDv7 strings,
//! but a stored page may carry ids from any producer (`"hero-1699999"`,
//! `"page-1"`) and they load and save back unchanged. The only requirement
//! is uniqueness within a page, which [`Page::validate`](crate::Page::validate)
//! checks.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Identity of a page. Assigned at creation and kept for the page's lifetime.
#[derive(Clone, Hash, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PageId(String);

/// Identity of a block within its page.
///
/// Survives reorders and content edits; duplication is the only op that
/// mints a new one.
#[derive(Clone, Hash, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BlockId(String);

/// Display width of [`PageId::short`] / [`BlockId::short`].
const SHORT_LEN: usize = 8;

macro_rules! impl_typed_id {
    ($T:ident, $name:literal) => {
        impl $T {
            /// Mint a fresh id (hyphenated UUIDv7).
            pub fn new() -> Self {
                Self(uuid::Uuid::now_v7().to_string())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }

            pub fn is_empty(&self) -> bool {
                self.0.is_empty()
            }

            /// Last eight characters, for listings. Minted ids lead with a
            /// timestamp, so only their tails tell neighbours apart.
            pub fn short(&self) -> &str {
                let start = self
                    .0
                    .char_indices()
                    .rev()
                    .nth(SHORT_LEN - 1)
                    .map_or(0, |(i, _)| i);
                &self.0[start..]
            }

            /// Whether a user-typed query names this id: the whole id, a
            /// leading prefix, or the `short()` tail.
            pub fn matches(&self, query: &str) -> bool {
                !query.is_empty() && (self.0.starts_with(query) || self.short() == query)
            }
        }

        impl Default for $T {
            fn default() -> Self {
                Self::new()
            }
        }

        impl From<&str> for $T {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }

        impl From<String> for $T {
            fn from(s: String) -> Self {
                Self(s)
            }
        }

        impl AsRef<str> for $T {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $T {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl fmt::Debug for $T {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({:?})", $name, self.0)
            }
        }
    };
}

impl_typed_id!(PageId, "PageId");
impl_typed_id!(BlockId, "BlockId");

// ============================================================================
// Tests
// ============================================================================
