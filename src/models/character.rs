use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};

/// A turning point in a character's arc, pinned to a chapter.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyMoment {
    pub chapter: u32,
    pub event: String,
    #[serde(default)]
    pub change: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Character {
    pub id: i64,
    pub project_id: i64,
    pub name: String,
    #[serde(default)]
    pub alias: Vec<String>,
    #[serde(default)]
    pub role_type: Option<String>,
    #[serde(default)]
    pub gender: Option<String>,
    #[serde(default)]
    pub age: Option<String>,
    #[serde(default)]
    pub appearance: Option<String>,
    #[serde(default)]
    pub personality: Option<String>,
    #[serde(default)]
    pub background: Option<String>,
    #[serde(default)]
    pub abilities: Vec<String>,
    #[serde(default)]
    pub goals: Option<String>,
    #[serde(default)]
    pub conflicts: Option<String>,
    #[serde(default)]
    pub character_arc: Option<String>,
    #[serde(default)]
    pub key_moments: Vec<KeyMoment>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub importance: u8,
    #[serde(default)]
    pub ai_weight: f32,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub current_location_id: Option<i64>,
    #[serde(default)]
    pub relations: Vec<CharacterRelation>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Directed relationship between two characters, with its evolution over
/// chapters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CharacterRelation {
    pub id: i64,
    pub from_character_id: i64,
    pub to_character_id: i64,
    #[serde(default)]
    pub relation_type: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub intimacy: u8,
    #[serde(default)]
    pub start_chapter: Option<u32>,
    #[serde(default)]
    pub end_chapter: Option<u32>,
    #[serde(default)]
    pub relation_changes: Vec<RelationChange>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelationChange {
    pub chapter: u32,
    pub event: String,
    #[serde(default)]
    pub before: String,
    #[serde(default)]
    pub after: String,
}
