//! Block-type registry boundary.
//!
//! The editor never hard-codes per-type defaults. When a block is created or
//! reset it asks a [`BlockRegistry`] for the type's default settings and
//! content; an absent type is an [`EditorError::UnknownBlockType`].
//!
//! [`BlockCatalog`] is the map-backed registry. It can be loaded from RON:
//!
//! ```ron
//! (
//!     blocks: {
//!         "hero": (
//!             settings: { "align": "center" },
//!             content: { "heading": "Your headline" },
//!         ),
//!     },
//! )
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::json;

use pagecraft_types::{BlockType, Content, FieldMap, LanguageTag, Settings};

use crate::EditorError;
use crate::config::ConfigError;

/// Defaults for one block type.
///
/// `content` is a single field map; the editor copies it under every page
/// language so new blocks start with the same shape in each.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BlockDefaults {
    pub settings: Settings,
    pub content: FieldMap,
}

impl BlockDefaults {
    /// Content keyed by each of `languages`.
    pub fn content_for<'a>(&self, languages: impl IntoIterator<Item = &'a LanguageTag>) -> Content {
        languages
            .into_iter()
            .map(|lang| (lang.clone(), self.content.clone()))
            .collect()
    }
}

/// Lookup of block-type defaults.
pub trait BlockRegistry: Send + Sync {
    fn defaults_for(&self, block_type: &BlockType) -> Option<BlockDefaults>;

    /// Like `defaults_for`, failing with `UnknownBlockType`.
    fn require(&self, block_type: &BlockType) -> Result<BlockDefaults, EditorError> {
        self.defaults_for(block_type)
            .ok_or_else(|| EditorError::UnknownBlockType(block_type.clone()))
    }
}

/// Map-backed registry.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct BlockCatalog {
    #[serde(default)]
    blocks: BTreeMap<BlockType, BlockDefaults>,
}

impl BlockCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) a block type.
    pub fn with(mut self, block_type: impl Into<BlockType>, defaults: BlockDefaults) -> Self {
        self.insert(block_type, defaults);
        self
    }

    pub fn insert(&mut self, block_type: impl Into<BlockType>, defaults: BlockDefaults) {
        self.blocks.insert(block_type.into(), defaults);
    }

    pub fn types(&self) -> impl Iterator<Item = &BlockType> {
        self.blocks.keys()
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn from_ron_str(text: &str) -> Result<Self, ConfigError> {
        Ok(ron::from_str(text)?)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        let catalog = Self::from_ron_str(&text)?;
        tracing::debug!(path = %path.display(), types = catalog.len(), "loaded block catalog");
        Ok(catalog)
    }

    /// The stock landing-page blocks.
    pub fn builtin() -> Self {
        fn defaults(settings: serde_json::Value, content: serde_json::Value) -> BlockDefaults {
            BlockDefaults {
                settings: serde_json::from_value(settings).unwrap_or_default(),
                content: serde_json::from_value(content).unwrap_or_default(),
            }
        }

        Self::new()
            .with(
                "hero",
                defaults(
                    json!({ "align": "center", "background": "#ffffff", "height": "large" }),
                    json!({ "heading": "Your headline", "subheading": "", "ctaLabel": "Get started" }),
                ),
            )
            .with(
                "features",
                defaults(
                    json!({ "columns": 3 }),
                    json!({ "title": "Features", "items": [] }),
                ),
            )
            .with(
                "gallery",
                defaults(
                    json!({ "columns": 4, "gap": "md" }),
                    json!({ "images": [] }),
                ),
            )
            .with(
                "text",
                defaults(json!({ "width": "narrow" }), json!({ "body": "" })),
            )
            .with(
                "cta",
                defaults(
                    json!({ "variant": "primary" }),
                    json!({ "label": "Sign up", "href": "#" }),
                ),
            )
            .with(
                "footer",
                defaults(json!({}), json!({ "copyright": "", "links": [] })),
            )
    }
}

impl BlockRegistry for BlockCatalog {
    fn defaults_for(&self, block_type: &BlockType) -> Option<BlockDefaults> {
        self.blocks.get(block_type).cloned()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_has_stock_types() {
        let catalog = BlockCatalog::builtin();
        for t in ["hero", "features", "gallery", "text", "cta", "footer"] {
            assert!(catalog.defaults_for(&BlockType::new(t)).is_some(), "{t}");
        }
        let hero = catalog.defaults_for(&"hero".into()).unwrap();
        assert_eq!(hero.settings["align"], json!("center"));
        assert_eq!(hero.content["heading"], json!("Your headline"));
    }

    #[test]
    fn test_require_unknown_type() {
        let catalog = BlockCatalog::builtin();
        assert_eq!(
            catalog.require(&"carousel".into()).unwrap_err(),
            EditorError::UnknownBlockType("carousel".into())
        );
    }

    #[test]
    fn test_content_for_every_language() {
        let defaults = BlockCatalog::builtin().defaults_for(&"text".into()).unwrap();
        let langs = vec!["en".to_string(), "de".to_string()];
        let content = defaults.content_for(&langs);
        assert_eq!(content.len(), 2);
        assert_eq!(content["de"], defaults.content);
    }

    #[test]
    fn test_catalog_from_ron() {
        let catalog = BlockCatalog::from_ron_str(
            r#"(
                blocks: {
                    "banner": (
                        settings: { "tone": "warm" },
                        content: { "message": "Hello", "dismissible": true },
                    ),
                    "spacer": (settings: {}),
                },
            )"#,
        )
        .unwrap();

        assert_eq!(catalog.len(), 2);
        let banner = catalog.defaults_for(&"banner".into()).unwrap();
        assert_eq!(banner.settings["tone"], json!("warm"));
        assert_eq!(banner.content["dismissible"], json!(true));
        assert_eq!(
            catalog.defaults_for(&"spacer".into()).unwrap(),
            BlockDefaults::default()
        );
    }
}
