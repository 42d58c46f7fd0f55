//! Persistence boundary.
//!
//! The core only turns a page into text and back. Where the text goes is
//! up to a [`PageStore`]; [`DirStore`] keeps one JSON file per page id.
//!
//! Loading is strict about content and lenient about layout. Blocks may be
//! stored in any sequence as long as their `order` values are exactly
//! `0..n-1`; they come back sorted. A document that parses but has
//! duplicate or missing orders, repeated ids, or bad languages is rejected
//! rather than handed to the editor.

use std::path::{Path, PathBuf};

use pagecraft_types::{Page, PageId};

use crate::{EditorError, Result};

/// Serialize a page as pretty-printed JSON.
pub fn serialize(page: &Page) -> Result<String> {
    serde_json::to_string_pretty(page).map_err(|e| EditorError::MalformedDocument(e.to_string()))
}

/// Parse a page, put its blocks in `order` sequence and validate it.
pub fn deserialize(text: &str) -> Result<Page> {
    let mut page: Page =
        serde_json::from_str(text).map_err(|e| EditorError::MalformedDocument(e.to_string()))?;
    if let Err(violation) = page.adopt() {
        tracing::warn!(page = %page.id, %violation, "rejected persisted page");
        return Err(EditorError::MalformedDocument(violation.to_string()));
    }
    Ok(page)
}

/// Errors from a page store.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("page {0} not found")]
    NotFound(PageId),
    #[error("page id {0:?} cannot name a file")]
    InvalidId(PageId),
    #[error(transparent)]
    Document(#[from] EditorError),
}

/// Where pages live between sessions.
pub trait PageStore {
    fn load(&self, id: &PageId) -> std::result::Result<Page, StoreError>;
    fn save(&self, page: &Page) -> std::result::Result<(), StoreError>;
    fn exists(&self, id: &PageId) -> bool;
}

/// One `<page-id>.json` file per page in a directory.
#[derive(Clone, Debug)]
pub struct DirStore {
    root: PathBuf,
}

impl DirStore {
    /// Open a store rooted at `root`, creating the directory if needed.
    pub fn open(root: impl Into<PathBuf>) -> std::result::Result<Self, StoreError> {
        let root = root.into();
        std::fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// File for `id`. Ids are opaque, so anything that would escape the
    /// store directory or hide the file is refused.
    pub fn path_for(&self, id: &PageId) -> std::result::Result<PathBuf, StoreError> {
        let name = id.as_str();
        if name.is_empty() || name.starts_with('.') || name.contains(['/', '\\', '\0']) {
            return Err(StoreError::InvalidId(id.clone()));
        }
        Ok(self.root.join(format!("{name}.json")))
    }

    /// Ids of every page file in the store.
    pub fn list(&self) -> std::result::Result<Vec<PageId>, StoreError> {
        let mut ids = Vec::new();
        for entry in std::fs::read_dir(&self.root)? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str())
                && !stem.is_empty()
            {
                ids.push(PageId::from(stem));
            }
        }
        ids.sort();
        Ok(ids)
    }
}

impl PageStore for DirStore {
    fn load(&self, id: &PageId) -> std::result::Result<Page, StoreError> {
        let path = self.path_for(id)?;
        if !path.exists() {
            return Err(StoreError::NotFound(id.clone()));
        }
        let text = std::fs::read_to_string(&path)?;
        let page = deserialize(&text)?;
        tracing::debug!(page = %id, blocks = page.len(), "loaded page");
        Ok(page)
    }

    fn save(&self, page: &Page) -> std::result::Result<(), StoreError> {
        let path = self.path_for(&page.id)?;
        let text = serialize(page)?;
        // Temp file first; the rename is the commit point.
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, text)?;
        std::fs::rename(&tmp, &path)?;
        tracing::debug!(page = %page.id, blocks = page.len(), "saved page");
        Ok(())
    }

    fn exists(&self, id: &PageId) -> bool {
        self.path_for(id).is_ok_and(|path| path.exists())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use pagecraft_types::Block;
    use serde_json::json;

    fn sample() -> Page {
        let mut page = Page::new("Launch", "en", vec!["en".to_string(), "fr".to_string()]);
        let mut hero = Block::new("hero", 0);
        hero.content
            .entry("fr".into())
            .or_default()
            .insert("heading".into(), json!("Bienvenue"));
        page.blocks.push(hero);
        page.blocks.push(Block::new("footer", 1));
        page.global_settings.insert("fontFamily".into(), json!("Inter"));
        page
    }

    #[test]
    fn test_serialize_then_deserialize() {
        let page = sample();
        let text = serialize(&page).unwrap();
        assert_eq!(deserialize(&text).unwrap(), page);
    }

    #[test]
    fn test_serialization_is_stable() {
        let page = sample();
        assert_eq!(serialize(&page).unwrap(), serialize(&page.clone()).unwrap());
    }

    #[test]
    fn test_rejects_unparseable_text() {
        assert!(matches!(
            deserialize("{ not json"),
            Err(EditorError::MalformedDocument(_))
        ));
        assert!(matches!(
            deserialize(r#"{"title": "missing everything else"}"#),
            Err(EditorError::MalformedDocument(_))
        ));
    }

    #[test]
    fn test_rejects_invariant_violations() {
        let mut page = sample();
        page.blocks[1].order = 4;
        let text = serde_json::to_string(&page).unwrap();
        let err = deserialize(&text).unwrap_err();
        assert!(matches!(err, EditorError::MalformedDocument(msg) if msg.contains("order")));

        let mut page = sample();
        page.default_language = "es".into();
        let text = serde_json::to_string(&page).unwrap();
        assert!(deserialize(&text).is_err());
    }

    #[test]
    fn test_loads_blocks_stored_out_of_sequence() {
        let page = Page::new("Landing", "en", vec!["en".to_string()]);
        let mut value = serde_json::to_value(&page).unwrap();
        value["blocks"] = json!([
            {"id": "b-features", "type": "features", "order": 1},
            {"id": "b-hero", "type": "hero", "order": 0},
        ]);

        let loaded = deserialize(&value.to_string()).unwrap();
        let ids: Vec<_> = loaded.blocks.iter().map(|b| b.id.as_str()).collect();
        assert_eq!(ids, vec!["b-hero", "b-features"]);
        assert_eq!(loaded.blocks[0].order, 0);
        assert!(loaded.validate().is_ok());
    }

    #[test]
    fn test_rejects_duplicate_or_missing_orders() {
        let page = Page::new("Landing", "en", vec!["en".to_string()]);
        let mut value = serde_json::to_value(&page).unwrap();

        value["blocks"] = json!([
            {"id": "a", "type": "hero", "order": 0},
            {"id": "b", "type": "text", "order": 0},
        ]);
        let err = deserialize(&value.to_string()).unwrap_err();
        assert!(matches!(err, EditorError::MalformedDocument(msg) if msg.contains("order 0")));

        value["blocks"] = json!([
            {"id": "a", "type": "hero", "order": 2},
            {"id": "b", "type": "text", "order": 0},
        ]);
        let err = deserialize(&value.to_string()).unwrap_err();
        assert!(matches!(err, EditorError::MalformedDocument(msg) if msg.contains("skip 1")));
    }

    #[test]
    fn test_loads_ids_from_other_producers() {
        let text = r#"{
            "id": "page-1",
            "title": "Imported",
            "defaultLanguage": "en",
            "languages": ["en"],
            "blocks": [
                {"id": "hero-1699999", "type": "hero", "order": 0,
                 "content": {"en": {"heading": "Hi"}}}
            ]
        }"#;
        let page = deserialize(text).unwrap();
        assert_eq!(page.id, PageId::from("page-1"));
        assert_eq!(page.blocks[0].id.as_str(), "hero-1699999");

        let again = deserialize(&serialize(&page).unwrap()).unwrap();
        assert_eq!(again, page);
        assert!(serialize(&page).unwrap().contains(r#""id": "hero-1699999""#));
    }

    #[test]
    fn test_dir_store_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = DirStore::open(dir.path().join("pages")).unwrap();
        let page = sample();

        assert!(!store.exists(&page.id));
        store.save(&page).unwrap();
        assert!(store.exists(&page.id));
        assert_eq!(store.load(&page.id).unwrap(), page);
        assert_eq!(store.list().unwrap(), vec![page.id.clone()]);
    }

    #[test]
    fn test_dir_store_missing_and_corrupt() {
        let dir = tempfile::tempdir().unwrap();
        let store = DirStore::open(dir.path()).unwrap();
        let id = PageId::new();
        assert!(matches!(store.load(&id), Err(StoreError::NotFound(_))));

        std::fs::write(store.path_for(&id).unwrap(), "[]").unwrap();
        assert!(matches!(
            store.load(&id),
            Err(StoreError::Document(EditorError::MalformedDocument(_)))
        ));
    }

    #[test]
    fn test_dir_store_keeps_opaque_ids_inside_root() {
        let dir = tempfile::tempdir().unwrap();
        let store = DirStore::open(dir.path()).unwrap();

        let mut page = sample();
        page.id = PageId::from("page-1");
        store.save(&page).unwrap();
        assert_eq!(store.list().unwrap(), vec![PageId::from("page-1")]);
        assert_eq!(store.load(&page.id).unwrap(), page);

        for bad in ["", "../escape", "a/b", ".hidden"] {
            let id = PageId::from(bad);
            assert!(matches!(store.load(&id), Err(StoreError::InvalidId(_))), "{bad:?}");
            assert!(!store.exists(&id));
        }
        page.id = PageId::from("../escape");
        assert!(matches!(store.save(&page), Err(StoreError::InvalidId(_))));
    }
}
