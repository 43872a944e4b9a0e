use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutlineLevel {
    Volume,
    Chapter,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewStatus {
    Pending,
    Approved,
    NeedRevision,
}

impl Default for ReviewStatus {
    fn default() -> Self {
        ReviewStatus::Pending
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Outline {
    pub id: i64,
    pub project_id: i64,
    #[serde(default)]
    pub story_concept: String,
    #[serde(default)]
    pub version: u32,
    #[serde(default)]
    pub ai_generated: bool,
    pub outline_level: OutlineLevel,
    #[serde(default)]
    pub chapters: Vec<OutlineNode>,
    pub created_at: DateTime<Utc>,
}

/// A node of the outline tree: a volume or a chapter. Volumes carry chapter
/// nodes in `children`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutlineNode {
    pub id: i64,
    pub outline_id: i64,
    #[serde(default)]
    pub parent_id: Option<i64>,
    pub chapter_num: u32,
    pub title: String,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub key_events: Vec<String>,
    #[serde(default)]
    pub conflicts: String,
    #[serde(default)]
    pub emotional_beat: String,
    #[serde(default)]
    pub positioning: Option<String>,
    #[serde(default)]
    pub core_tasks: Vec<String>,
    #[serde(default)]
    pub key_turns: Vec<String>,
    #[serde(default)]
    pub character_growth: Option<String>,
    pub outline_type: OutlineLevel,
    #[serde(default)]
    pub review_status: ReviewStatus,
    #[serde(default)]
    pub order_index: u32,
    #[serde(default)]
    pub children: Vec<OutlineNode>,
}
