use std::sync::Arc;

use log::warn;
use serde::Serialize;

use crate::error::{Error, Result};
use crate::models::Chapter;
use crate::services::{ApiClient, Notifier};

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChapterForm {
    pub title: String,
    pub content: String,
}

/// Editor state for the prose of one outline chapter. This screen hosts the
/// main writing textarea the assistant overlay usually operates on.
pub struct ChapterScreen {
    api: Arc<ApiClient>,
    notices: Arc<dyn Notifier>,
    pub chapter: Option<Chapter>,
    pub outline_chapter_id: Option<i64>,
    pub loading: bool,
}

impl ChapterScreen {
    pub fn new(api: Arc<ApiClient>, notices: Arc<dyn Notifier>) -> Self {
        Self {
            api,
            notices,
            chapter: None,
            outline_chapter_id: None,
            loading: false,
        }
    }

    pub async fn load(&mut self, outline_chapter_id: i64) {
        self.loading = true;
        self.outline_chapter_id = Some(outline_chapter_id);
        match self.api.get_chapter(outline_chapter_id).await {
            Ok(chapter) => self.chapter = chapter,
            Err(err) => {
                warn!("chapter fetch failed: {err}");
                self.notices.error("Failed to load chapter");
            }
        }
        self.loading = false;
    }

    pub async fn save(&mut self, form: &ChapterForm) -> Result<Chapter> {
        let outline_chapter_id = self
            .outline_chapter_id
            .ok_or_else(|| Error::Validation("no chapter selected".to_string()))?;
        if form.content.trim().is_empty() {
            return Err(Error::Validation("content must not be empty".to_string()));
        }
        match self.api.save_chapter(outline_chapter_id, form).await {
            Ok(chapter) => {
                self.chapter = Some(chapter.clone());
                self.notices.success("Chapter saved");
                Ok(chapter)
            }
            Err(err) => {
                self.notices.error("Failed to save chapter");
                Err(err)
            }
        }
    }

    pub async fn remove(&mut self) -> Result<()> {
        let Some(chapter) = self.chapter.as_ref() else {
            return Ok(());
        };
        match self.api.delete_chapter(chapter.id).await {
            Ok(()) => {
                self.chapter = None;
                self.notices.success("Chapter deleted");
                Ok(())
            }
            Err(err) => {
                self.notices.error("Failed to delete chapter");
                Err(err)
            }
        }
    }
}
