use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ForeshadowingStatus {
    Planted,
    Revealed,
    Abandoned,
}

impl Default for ForeshadowingStatus {
    fn default() -> Self {
        ForeshadowingStatus::Planted
    }
}

/// A planted foreshadowing and where (or whether) it pays off.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Foreshadowing {
    pub id: i64,
    pub project_id: i64,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub planted_chapter: Option<u32>,
    #[serde(default)]
    pub planted_content: Option<String>,
    #[serde(default)]
    pub planted_method: Option<String>,
    #[serde(default)]
    pub planned_reveal_chapter: Option<u32>,
    #[serde(default)]
    pub actual_reveal_chapter: Option<u32>,
    #[serde(default)]
    pub reveal_content: Option<String>,
    #[serde(default)]
    pub status: ForeshadowingStatus,
    #[serde(default)]
    pub related_characters: Vec<i64>,
    #[serde(default)]
    pub related_items: Vec<i64>,
    #[serde(default)]
    pub related_locations: Vec<i64>,
    #[serde(default)]
    pub importance: u8,
    #[serde(default)]
    pub urgency: u8,
    #[serde(default)]
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
