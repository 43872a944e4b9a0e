use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use super::WritingStyle;

/// Entity references the user picked to ground an analyze call. Identifiers
/// are unique within each category; ordering carries no meaning.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KnowledgeSelection {
    #[serde(default)]
    pub character_ids: BTreeSet<i64>,
    #[serde(default)]
    pub worldview_ids: BTreeSet<i64>,
    #[serde(default)]
    pub location_ids: BTreeSet<i64>,
    #[serde(default)]
    pub item_ids: BTreeSet<i64>,
    #[serde(default)]
    pub foreshadowing_ids: BTreeSet<i64>,
    #[serde(default)]
    pub writing_style_id: Option<i64>,
}

impl KnowledgeSelection {
    /// The default selection for a project: empty categories, with the
    /// project's writing style pre-selected when one exists.
    pub fn with_default_style(writing_style_id: Option<i64>) -> Self {
        Self {
            writing_style_id,
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CharacterSummary {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub role: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorldviewSummary {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub category: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationSummary {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub location_type: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemSummary {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub category: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForeshadowingSummary {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub status: String,
}

/// Everything selectable in the assistant's knowledge pickers, fetched per
/// project.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KnowledgeBase {
    #[serde(default)]
    pub characters: Vec<CharacterSummary>,
    #[serde(default)]
    pub worldviews: Vec<WorldviewSummary>,
    #[serde(default)]
    pub locations: Vec<LocationSummary>,
    #[serde(default)]
    pub items: Vec<ItemSummary>,
    #[serde(default)]
    pub foreshadowings: Vec<ForeshadowingSummary>,
    #[serde(default)]
    pub writing_style: Option<WritingStyle>,
}

/// Text surrounding the selection, shipped with an analyze call.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeContext {
    #[serde(default)]
    pub chapter_id: Option<i64>,
    #[serde(default)]
    pub before_text: String,
    #[serde(default)]
    pub after_text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeRequest {
    pub project_id: i64,
    pub selected_text: String,
    pub user_prompt: String,
    pub context: AnalyzeContext,
    pub knowledge_selection: KnowledgeSelection,
}

/// A rewrite proposal returned by the analysis backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Proposal {
    pub explanation: String,
    pub suggested_text: String,
    /// Backend confidence in [0, 1].
    pub confidence: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
}

/// One turn of the assistant conversation shown in the panel history.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatTurn {
    pub role: ChatRole,
    pub content: String,
}

impl ChatTurn {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Assistant,
            content: content.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_style_seeding() {
        let selection = KnowledgeSelection::with_default_style(Some(7));
        assert_eq!(selection.writing_style_id, Some(7));
        assert!(selection.character_ids.is_empty());
        assert!(selection.foreshadowing_ids.is_empty());

        let none = KnowledgeSelection::with_default_style(None);
        assert_eq!(none, KnowledgeSelection::default());
    }

    #[test]
    fn selection_ids_deduplicate() {
        let mut selection = KnowledgeSelection::default();
        selection.character_ids.insert(3);
        selection.character_ids.insert(3);
        selection.character_ids.insert(1);
        assert_eq!(selection.character_ids.len(), 2);
    }
}
