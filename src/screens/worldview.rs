use std::sync::Arc;

use log::warn;
use serde::Serialize;

use crate::error::{Error, Result};
use crate::models::Worldview;
use crate::services::{ApiClient, Notifier};

use super::projects::upsert;

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorldviewForm {
    #[serde(skip)]
    pub id: Option<i64>,
    pub project_id: i64,
    pub parent_id: Option<i64>,
    pub category: String,
    pub title: String,
    pub description: Option<String>,
    pub tags: Vec<String>,
    pub importance: u8,
}

pub struct WorldviewScreen {
    api: Arc<ApiClient>,
    notices: Arc<dyn Notifier>,
    pub entries: Vec<Worldview>,
    pub loading: bool,
}

impl WorldviewScreen {
    pub fn new(api: Arc<ApiClient>, notices: Arc<dyn Notifier>) -> Self {
        Self {
            api,
            notices,
            entries: Vec::new(),
            loading: false,
        }
    }

    pub async fn refresh(&mut self, project_id: i64) {
        self.loading = true;
        match self.api.list_worldviews(project_id).await {
            Ok(entries) => self.entries = entries,
            Err(err) => {
                warn!("worldview list failed: {err}");
                self.notices.error("Failed to load worldview entries");
            }
        }
        self.loading = false;
    }

    pub async fn submit(&mut self, form: &WorldviewForm) -> Result<Worldview> {
        if form.title.trim().is_empty() {
            return Err(Error::Validation("title is required".to_string()));
        }
        if form.category.trim().is_empty() {
            return Err(Error::Validation("category is required".to_string()));
        }
        let saved = match form.id {
            Some(id) => self.api.update_worldview(id, form).await,
            None => self.api.create_worldview(form).await,
        };
        match saved {
            Ok(entry) => {
                upsert(&mut self.entries, entry.clone(), |e| e.id);
                self.notices.success("Worldview entry saved");
                Ok(entry)
            }
            Err(err) => {
                self.notices.error("Failed to save worldview entry");
                Err(err)
            }
        }
    }

    pub async fn remove(&mut self, id: i64) -> Result<()> {
        match self.api.delete_worldview(id).await {
            Ok(()) => {
                self.entries.retain(|e| e.id != id);
                self.notices.success("Worldview entry deleted");
                Ok(())
            }
            Err(err) => {
                self.notices.error("Failed to delete worldview entry");
                Err(err)
            }
        }
    }
}
