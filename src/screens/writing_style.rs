use std::sync::Arc;

use log::warn;
use serde::Serialize;

use crate::error::Result;
use crate::models::{StyleSample, WritingStyle};
use crate::services::{ApiClient, Notifier};

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WritingStyleForm {
    pub narrative_perspective: Option<String>,
    pub language_style: Option<String>,
    pub dialogue_style: Option<String>,
    pub description_density: Option<String>,
    pub custom_notes: Option<String>,
    pub style_samples: Vec<StyleSample>,
    pub ai_weight: f32,
    pub is_active: bool,
}

/// A project has at most one writing style preset; saving creates or updates
/// it in one call.
pub struct WritingStyleScreen {
    api: Arc<ApiClient>,
    notices: Arc<dyn Notifier>,
    pub style: Option<WritingStyle>,
    pub loading: bool,
}

impl WritingStyleScreen {
    pub fn new(api: Arc<ApiClient>, notices: Arc<dyn Notifier>) -> Self {
        Self {
            api,
            notices,
            style: None,
            loading: false,
        }
    }

    pub async fn refresh(&mut self, project_id: i64) {
        self.loading = true;
        match self.api.get_writing_style(project_id).await {
            Ok(style) => self.style = style,
            Err(err) => {
                warn!("writing style fetch failed: {err}");
                self.notices.error("Failed to load writing style");
            }
        }
        self.loading = false;
    }

    pub async fn submit(&mut self, project_id: i64, form: &WritingStyleForm) -> Result<WritingStyle> {
        match self.api.save_writing_style(project_id, form).await {
            Ok(style) => {
                self.style = Some(style.clone());
                self.notices.success("Writing style saved");
                Ok(style)
            }
            Err(err) => {
                self.notices.error("Failed to save writing style");
                Err(err)
            }
        }
    }

    pub async fn remove(&mut self) -> Result<()> {
        let Some(style) = self.style.as_ref() else {
            return Ok(());
        };
        match self.api.delete_writing_style(style.id).await {
            Ok(()) => {
                self.style = None;
                self.notices.success("Writing style deleted");
                Ok(())
            }
            Err(err) => {
                self.notices.error("Failed to delete writing style");
                Err(err)
            }
        }
    }
}
