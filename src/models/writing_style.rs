use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};

/// A sample passage tagged with the kind of scene it demonstrates.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StyleSample {
    pub scene_type: String,
    pub sample: String,
}

/// Per-project writing style preset. A project has at most one; when present
/// it is pre-selected in the assistant's knowledge selection.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WritingStyle {
    pub id: i64,
    pub project_id: i64,
    #[serde(default)]
    pub narrative_perspective: Option<String>,
    #[serde(default)]
    pub language_style: Option<String>,
    #[serde(default)]
    pub dialogue_style: Option<String>,
    #[serde(default)]
    pub description_density: Option<String>,
    #[serde(default)]
    pub custom_notes: Option<String>,
    #[serde(default)]
    pub style_samples: Vec<StyleSample>,
    #[serde(default)]
    pub ai_weight: f32,
    #[serde(default)]
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
