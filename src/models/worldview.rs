use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};

/// A worldview entry. Entries form a hierarchy via `parent_id`; `level` and
/// `order_index` are maintained by the backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Worldview {
    pub id: i64,
    pub project_id: i64,
    #[serde(default)]
    pub parent_id: Option<i64>,
    pub category: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub importance: u8,
    #[serde(default)]
    pub ai_weight: f32,
    #[serde(default)]
    pub level: u8,
    #[serde(default)]
    pub order_index: u32,
    #[serde(default)]
    pub children: Vec<Worldview>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
