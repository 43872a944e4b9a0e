use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Coordinates {
    pub x: f32,
    pub y: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    pub id: i64,
    pub project_id: i64,
    #[serde(default)]
    pub parent_id: Option<i64>,
    pub name: String,
    #[serde(default)]
    pub location_type: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub coordinates: Option<Coordinates>,
    #[serde(default)]
    pub climate: Option<String>,
    #[serde(default)]
    pub terrain: Option<String>,
    #[serde(default)]
    pub special_features: Option<String>,
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
    pub first_appearance: Option<u32>,
    #[serde(default)]
    pub appearance_chapters: Vec<u32>,
    #[serde(default)]
    pub children: Vec<Location>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
