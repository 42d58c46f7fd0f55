//! Editor configuration, loaded from RON.
//!
//! ```ron
//! (
//!     history_limit: 50,
//!     default_language: "en",
//!     languages: ["en", "de"],
//! )
//! ```
//!
//! Every field is optional; omitted fields take the defaults below.

use std::path::Path;

use serde::{Deserialize, Serialize};

use pagecraft_types::{LanguageTag, Page};

use crate::history::DEFAULT_HISTORY_LIMIT;

/// Error type for config and catalog loading.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("RON parse error: {0}")]
    Ron(#[from] ron::error::SpannedError),
}

/// Session-wide editor settings.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Maximum retained history entries (including the initial state).
    pub history_limit: usize,
    /// Language for new pages.
    pub default_language: LanguageTag,
    /// All languages of new pages. `default_language` is always included.
    pub languages: Vec<LanguageTag>,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            history_limit: DEFAULT_HISTORY_LIMIT,
            default_language: "en".to_string(),
            languages: vec!["en".to_string()],
        }
    }
}

impl EditorConfig {
    pub fn from_ron_str(text: &str) -> Result<Self, ConfigError> {
        Ok(ron::from_str(text)?)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        let config = Self::from_ron_str(&text)?;
        tracing::debug!(path = %path.display(), ?config, "loaded editor config");
        Ok(config)
    }

    /// An empty page in the configured languages.
    pub fn new_page(&self, title: impl Into<String>) -> Page {
        Page::new(
            title,
            self.default_language.clone(),
            self.languages.iter().cloned(),
        )
    }
}

// ============================================================================
// Tests
// ============================================================================
