//! History action records.
//!
//! Every recorded history entry carries the action that produced it: a tag
//! from a closed set plus free-form metadata. The metadata exists only to
//! build a human-readable description for a history list; nothing replays
//! it.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString, IntoStaticStr};

use pagecraft_types::BlockType;

/// What kind of change produced a history entry.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, IntoStaticStr,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
pub enum ActionKind {
    /// Seed entry for a freshly loaded or reset page.
    Initialize,
    AddBlock,
    UpdateBlock,
    DeleteBlock,
    ReorderBlocks,
    UpdatePageSettings,
    DuplicateBlock,
    /// Several block updates folded into one entry.
    BulkUpdate,
}

impl ActionKind {
    pub fn as_str(&self) -> &'static str {
        self.into()
    }
}

/// Free-form description inputs.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionMeta {
    /// Type of the block the action targeted.
    pub block_type: Option<BlockType>,
    /// Names of the fields the action changed.
    pub fields: Vec<String>,
    /// Source index for reorders.
    pub from: Option<usize>,
    /// Destination index for reorders.
    pub to: Option<usize>,
    /// Number of blocks touched by a bulk update.
    pub count: Option<usize>,
}

/// An action tag plus its metadata.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryAction {
    pub kind: ActionKind,
    pub meta: ActionMeta,
}

impl HistoryAction {
    pub fn new(kind: ActionKind) -> Self {
        Self {
            kind,
            meta: ActionMeta::default(),
        }
    }

    pub fn initialize() -> Self {
        Self::new(ActionKind::Initialize)
    }

    pub fn with_block_type(mut self, block_type: &BlockType) -> Self {
        self.meta.block_type = Some(block_type.clone());
        self
    }

    pub fn with_field(mut self, field: impl Into<String>) -> Self {
        self.meta.fields.push(field.into());
        self
    }

    pub fn with_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.meta.fields.extend(fields.into_iter().map(Into::into));
        self
    }

    pub fn with_move(mut self, from: usize, to: usize) -> Self {
        self.meta.from = Some(from);
        self.meta.to = Some(to);
        self
    }

    pub fn with_count(mut self, count: usize) -> Self {
        self.meta.count = Some(count);
        self
    }

    /// Human-readable one-liner for a history list.
    pub fn describe(&self) -> String {
        let block = match &self.meta.block_type {
            Some(t) => format!("{t} block"),
            None => "block".to_string(),
        };
        let fields = self.meta.fields.join(", ");

        match self.kind {
            ActionKind::Initialize => "Open page".to_string(),
            ActionKind::AddBlock => format!("Add {block}"),
            ActionKind::DeleteBlock => format!("Delete {block}"),
            ActionKind::DuplicateBlock => format!("Duplicate {block}"),
            ActionKind::UpdateBlock if self.meta.fields.iter().any(|f| f == "reset") => {
                format!("Reset {block}")
            }
            ActionKind::UpdateBlock if fields.is_empty() => format!("Update {block}"),
            ActionKind::UpdateBlock => format!("Update {fields} of {block}"),
            ActionKind::ReorderBlocks => match (self.meta.from, self.meta.to) {
                (Some(from), Some(to)) => format!("Move {block} from {from} to {to}"),
                _ => "Reorder blocks".to_string(),
            },
            ActionKind::UpdatePageSettings if fields.is_empty() => {
                "Update page settings".to_string()
            }
            ActionKind::UpdatePageSettings => format!("Update page {fields}"),
            ActionKind::BulkUpdate => match self.meta.count {
                Some(1) => "Update 1 block".to_string(),
                Some(n) => format!("Update {n} blocks"),
                None => "Update blocks".to_string(),
            },
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_tags_are_kebab_case() {
        assert_eq!(ActionKind::AddBlock.as_str(), "add-block");
        assert_eq!(ActionKind::UpdatePageSettings.to_string(), "update-page-settings");
        assert_eq!("bulk-update".parse::<ActionKind>().unwrap(), ActionKind::BulkUpdate);
        assert_eq!(
            serde_json::to_string(&ActionKind::ReorderBlocks).unwrap(),
            "\"reorder-blocks\""
        );
    }

    #[test]
    fn test_describe_block_actions() {
        let hero = BlockType::new("hero");
        assert_eq!(
            HistoryAction::new(ActionKind::AddBlock).with_block_type(&hero).describe(),
            "Add hero block"
        );
        assert_eq!(
            HistoryAction::new(ActionKind::UpdateBlock)
                .with_block_type(&hero)
                .with_field("content")
                .describe(),
            "Update content of hero block"
        );
        assert_eq!(
            HistoryAction::new(ActionKind::UpdateBlock)
                .with_block_type(&hero)
                .with_field("reset")
                .describe(),
            "Reset hero block"
        );
        assert_eq!(
            HistoryAction::new(ActionKind::ReorderBlocks)
                .with_block_type(&hero)
                .with_move(0, 1)
                .describe(),
            "Move hero block from 0 to 1"
        );
    }

    #[test]
    fn test_describe_page_and_bulk_actions() {
        assert_eq!(HistoryAction::initialize().describe(), "Open page");
        assert_eq!(
            HistoryAction::new(ActionKind::UpdatePageSettings).describe(),
            "Update page settings"
        );
        assert_eq!(
            HistoryAction::new(ActionKind::UpdatePageSettings)
                .with_field("title")
                .describe(),
            "Update page title"
        );
        assert_eq!(
            HistoryAction::new(ActionKind::BulkUpdate).with_count(3).describe(),
            "Update 3 blocks"
        );
    }
}
