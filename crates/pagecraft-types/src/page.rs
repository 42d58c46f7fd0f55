//! The page, root aggregate of the document model.
//!
//! ## At-rest invariants
//!
//! After every completed mutation a page satisfies:
//!
//! - `languages` is non-empty and contains `default_language`
//! - block ids are unique
//! - `blocks[i].order == i`, so sorting by `order` yields exactly `0..n-1`
//!
//! [`Page::validate`] checks all of these. Intermediate states inside a
//! single mutation may break them; [`Page::renumber`] restores contiguity.
//!
//! A page from outside (a stored document, another producer) only has to
//! satisfy the order rule *after sorting*: `[{order: 1}, {order: 0}]` is a
//! valid page whose vector is out of step. [`Page::adopt`] accepts that and
//! brings the vector in line; duplicate or missing orders are rejected.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::block::{Block, LanguageTag, Settings};
use crate::ids::{BlockId, PageId};

/// Reasons a page fails [`Page::validate`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvariantViolation {
    #[error("page has no languages")]
    NoLanguages,

    #[error("default language {0:?} is not one of the page languages")]
    DefaultLanguageMissing(LanguageTag),

    #[error("page id is empty")]
    EmptyPageId,

    #[error("block at index {0} has an empty id")]
    EmptyBlockId(usize),

    #[error("block id {0} appears more than once")]
    DuplicateBlockId(BlockId),

    #[error("block at index {index} has order {order}")]
    OrderMismatch { index: usize, order: usize },

    #[error("order {0} is used by more than one block")]
    DuplicateOrder(usize),

    #[error("orders skip {missing}: expected 0..{len}")]
    OrderGap { missing: usize, len: usize },
}

/// A page: ordered blocks plus page-wide settings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page {
    pub id: PageId,
    pub title: String,
    pub default_language: LanguageTag,
    pub languages: Vec<LanguageTag>,
    /// Kept sorted by `order`.
    #[serde(default)]
    pub blocks: Vec<Block>,
    /// Page-wide style keys (primary color, font family, spacing scale, …).
    #[serde(default)]
    pub global_settings: Settings,
}

impl Page {
    /// Create an empty page with a fresh id.
    ///
    /// `default_language` is added to `languages` if the caller left it out.
    pub fn new(
        title: impl Into<String>,
        default_language: impl Into<LanguageTag>,
        languages: impl IntoIterator<Item = LanguageTag>,
    ) -> Self {
        let default_language = default_language.into();
        let mut langs: Vec<LanguageTag> = Vec::new();
        for lang in std::iter::once(default_language.clone()).chain(languages) {
            if !langs.contains(&lang) {
                langs.push(lang);
            }
        }
        Self {
            id: PageId::new(),
            title: title.into(),
            default_language,
            languages: langs,
            blocks: Vec::new(),
            global_settings: Settings::new(),
        }
    }

    /// Number of blocks.
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    /// Check if the page has no blocks.
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Look up a block by id.
    pub fn block(&self, id: &BlockId) -> Option<&Block> {
        self.blocks.iter().find(|b| b.id == *id)
    }

    /// Mutable lookup by id.
    pub fn block_mut(&mut self, id: &BlockId) -> Option<&mut Block> {
        self.blocks.iter_mut().find(|b| b.id == *id)
    }

    /// Index of a block in document order.
    pub fn position(&self, id: &BlockId) -> Option<usize> {
        self.blocks.iter().position(|b| b.id == *id)
    }

    pub fn contains(&self, id: &BlockId) -> bool {
        self.position(id).is_some()
    }

    /// Rewrite every `order` from the block's index.
    pub fn renumber(&mut self) {
        for (index, block) in self.blocks.iter_mut().enumerate() {
            block.order = index;
        }
    }

    /// Sort blocks by `order` (stable), then renumber.
    pub fn normalize(&mut self) {
        self.blocks.sort_by_key(|b| b.order);
        self.renumber();
    }

    /// Accept a page from outside, where `order` is authoritative and the
    /// vector may not be.
    ///
    /// The sorted orders must be exactly `0..n-1`. On success the vector is
    /// sorted and the page passes [`validate`](Self::validate); on failure
    /// the page is left as it was.
    pub fn adopt(&mut self) -> Result<(), InvariantViolation> {
        let mut orders: Vec<usize> = self.blocks.iter().map(|b| b.order).collect();
        orders.sort_unstable();
        for (expected, &order) in orders.iter().enumerate() {
            if expected > 0 && order == orders[expected - 1] {
                return Err(InvariantViolation::DuplicateOrder(order));
            }
            if order != expected {
                return Err(InvariantViolation::OrderGap {
                    missing: expected,
                    len: orders.len(),
                });
            }
        }
        self.normalize();
        self.validate()
    }

    /// Check the at-rest invariants.
    pub fn validate(&self) -> Result<(), InvariantViolation> {
        if self.languages.is_empty() {
            return Err(InvariantViolation::NoLanguages);
        }
        if !self.languages.contains(&self.default_language) {
            return Err(InvariantViolation::DefaultLanguageMissing(
                self.default_language.clone(),
            ));
        }

        if self.id.is_empty() {
            return Err(InvariantViolation::EmptyPageId);
        }

        let mut seen = HashSet::with_capacity(self.blocks.len());
        for (index, block) in self.blocks.iter().enumerate() {
            if block.id.is_empty() {
                return Err(InvariantViolation::EmptyBlockId(index));
            }
            if !seen.insert(&block.id) {
                return Err(InvariantViolation::DuplicateBlockId(block.id.clone()));
            }
            if block.order != index {
                return Err(InvariantViolation::OrderMismatch {
                    index,
                    order: block.order,
                });
            }
        }
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================
