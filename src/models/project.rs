use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProjectStatus {
    Draft,
    Outlining,
    Writing,
    Completed,
}

impl Default for ProjectStatus {
    fn default() -> Self {
        ProjectStatus::Draft
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub theme: String,
    #[serde(default)]
    pub genre: String,
    #[serde(default)]
    pub target_length: u32,
    #[serde(default)]
    pub status: ProjectStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectListItem {
    pub id: i64,
    pub title: String,
    pub genre: String,
    pub status: ProjectStatus,
    pub updated_at: DateTime<Utc>,
}

impl From<Project> for ProjectListItem {
    fn from(project: Project) -> Self {
        Self {
            id: project.id,
            title: project.title,
            genre: project.genre,
            status: project.status,
            updated_at: project.updated_at,
        }
    }
}
