use std::sync::Arc;

use log::warn;
use serde::Serialize;

use crate::error::{Error, Result};
use crate::models::{Outline, OutlineNode};
use crate::services::{ApiClient, Notifier};

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OutlineGenerateConfig {
    pub story_concept: String,
    pub chapter_count: u32,
    pub outline_level: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OutlineNodeForm {
    #[serde(skip)]
    pub id: Option<i64>,
    pub parent_id: Option<i64>,
    pub chapter_num: u32,
    pub title: String,
    pub summary: String,
    pub key_events: Vec<String>,
    pub conflicts: String,
    pub emotional_beat: String,
}

pub struct OutlineScreen {
    api: Arc<ApiClient>,
    notices: Arc<dyn Notifier>,
    pub outline: Option<Outline>,
    pub loading: bool,
}

impl OutlineScreen {
    pub fn new(api: Arc<ApiClient>, notices: Arc<dyn Notifier>) -> Self {
        Self {
            api,
            notices,
            outline: None,
            loading: false,
        }
    }

    pub async fn refresh(&mut self, project_id: i64) {
        self.loading = true;
        match self.api.get_outline(project_id, true).await {
            Ok(outline) => self.outline = Some(outline),
            Err(err) => {
                warn!("outline fetch failed: {err}");
                self.notices.error("Failed to load outline");
            }
        }
        self.loading = false;
    }

    /// Kick off server-side outline generation and replace the local copy
    /// with the result.
    pub async fn generate(
        &mut self,
        project_id: i64,
        config: &OutlineGenerateConfig,
    ) -> Result<()> {
        if config.story_concept.trim().is_empty() {
            return Err(Error::Validation("story concept is required".to_string()));
        }
        self.loading = true;
        let result = self.api.generate_outline(project_id, config).await;
        self.loading = false;
        match result {
            Ok(outline) => {
                self.outline = Some(outline);
                self.notices.success("Outline generated");
                Ok(())
            }
            Err(err) => {
                self.notices.error("Outline generation failed");
                Err(err)
            }
        }
    }

    pub async fn save_node(&mut self, project_id: i64, form: &OutlineNodeForm) -> Result<OutlineNode> {
        if form.title.trim().is_empty() {
            return Err(Error::Validation("title is required".to_string()));
        }
        let saved = match form.id {
            Some(id) => self.api.update_outline_node(id, form).await,
            None => {
                let outline_id = self
                    .outline
                    .as_ref()
                    .map(|o| o.id)
                    .ok_or_else(|| Error::Validation("no outline loaded".to_string()))?;
                self.api.add_outline_node(outline_id, form).await
            }
        };
        match saved {
            Ok(node) => {
                self.refresh(project_id).await;
                self.notices.success("Outline chapter saved");
                Ok(node)
            }
            Err(err) => {
                self.notices.error("Failed to save outline chapter");
                Err(err)
            }
        }
    }

    pub async fn remove_node(&mut self, project_id: i64, node_id: i64) -> Result<()> {
        match self.api.delete_outline_node(node_id).await {
            Ok(()) => {
                self.refresh(project_id).await;
                self.notices.success("Outline chapter deleted");
                Ok(())
            }
            Err(err) => {
                self.notices.error("Failed to delete outline chapter");
                Err(err)
            }
        }
    }
}
