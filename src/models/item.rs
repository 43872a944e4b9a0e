use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use std::collections::HashMap;

/// One hand-over of an item between characters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OwnershipRecord {
    pub chapter: u32,
    #[serde(default)]
    pub from: Option<i64>,
    #[serde(default)]
    pub to: Option<i64>,
    #[serde(default)]
    pub how: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    pub id: i64,
    pub project_id: i64,
    pub name: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub appearance: Option<String>,
    #[serde(default)]
    pub abilities: Option<String>,
    #[serde(default)]
    pub origin: Option<String>,
    #[serde(default)]
    pub level: Option<String>,
    #[serde(default)]
    pub rarity: Option<String>,
    #[serde(default)]
    pub attributes: HashMap<String, serde_json::Value>,
    #[serde(default)]
    pub current_owner_id: Option<i64>,
    #[serde(default)]
    pub ownership_history: Vec<OwnershipRecord>,
    #[serde(default)]
    pub first_appearance: Option<u32>,
    #[serde(default)]
    pub appearance_chapters: Vec<u32>,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub location_id: Option<i64>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub importance: u8,
    #[serde(default)]
    pub ai_weight: f32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
