//! Blocks: one ordered content unit within a page.
//!
//! The core treats a block's `settings` and `content` as opaque keyed data.
//! Their shape belongs to whoever registers the block type; the only
//! structure enforced here is "language → field → value" for content.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::ids::BlockId;

/// Language tag, e.g. `"en"` or `"pt-BR"`.
pub type LanguageTag = String;

/// Open mapping of style/config keys to values.
///
/// BTreeMap keeps serialization order stable, so two equal maps always
/// serialize to the same bytes.
pub type Settings = BTreeMap<String, serde_json::Value>;

/// Content fields for one language.
pub type FieldMap = BTreeMap<String, serde_json::Value>;

/// Content for every language: language tag → field name → value.
pub type Content = BTreeMap<LanguageTag, FieldMap>;

/// Block type label (hero, features, gallery, …).
///
/// Drawn from an external registry. The core never interprets it beyond
/// using it as a lookup key for defaults.
#[derive(Clone, Debug, Hash, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BlockType(String);

impl BlockType {
    pub fn new(label: impl Into<String>) -> Self {
        Self(label.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for BlockType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for BlockType {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for BlockType {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// An entry in a page's block list.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Block {
    /// Unique within the page.
    pub id: BlockId,
    /// Registry label.
    #[serde(rename = "type")]
    pub block_type: BlockType,
    /// Position in the page. Always equal to the block's index once a
    /// mutation has completed.
    pub order: usize,
    /// Block-specific style/config.
    #[serde(default)]
    pub settings: Settings,
    /// Per-language content.
    #[serde(default)]
    pub content: Content,
}

impl Block {
    /// Create a block with a fresh id and no settings or content.
    pub fn new(block_type: impl Into<BlockType>, order: usize) -> Self {
        Self {
            id: BlockId::new(),
            block_type: block_type.into(),
            order,
            settings: Settings::new(),
            content: Content::new(),
        }
    }

    /// Structural copy with a freshly minted id.
    ///
    /// Settings and content are deep-copied; `order` is left for the caller
    /// to renumber.
    pub fn duplicate(&self) -> Self {
        Self {
            id: BlockId::new(),
            ..self.clone()
        }
    }

    /// Content fields for one language, if present.
    pub fn fields(&self, language: &str) -> Option<&FieldMap> {
        self.content.get(language)
    }

    /// Languages this block carries content for.
    pub fn languages(&self) -> impl Iterator<Item = &str> {
        self.content.keys().map(String::as_str)
    }
}

// ============================================================================
// Tests
// ============================================================================
