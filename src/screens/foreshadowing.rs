use std::sync::Arc;

use log::warn;
use serde::Serialize;

use crate::error::{Error, Result};
use crate::models::{Foreshadowing, ForeshadowingStatus};
use crate::services::{ApiClient, Notifier};

use super::projects::upsert;

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ForeshadowingForm {
    #[serde(skip)]
    pub id: Option<i64>,
    pub project_id: i64,
    pub title: String,
    pub description: Option<String>,
    pub category: Option<String>,
    pub planted_chapter: Option<u32>,
    pub planted_content: Option<String>,
    pub planned_reveal_chapter: Option<u32>,
    pub actual_reveal_chapter: Option<u32>,
    pub reveal_content: Option<String>,
    pub status: Option<ForeshadowingStatus>,
    pub related_characters: Vec<i64>,
    pub importance: u8,
    pub urgency: u8,
    pub notes: Option<String>,
}

pub struct ForeshadowingScreen {
    api: Arc<ApiClient>,
    notices: Arc<dyn Notifier>,
    pub foreshadowings: Vec<Foreshadowing>,
    pub loading: bool,
}

impl ForeshadowingScreen {
    pub fn new(api: Arc<ApiClient>, notices: Arc<dyn Notifier>) -> Self {
        Self {
            api,
            notices,
            foreshadowings: Vec::new(),
            loading: false,
        }
    }

    pub async fn refresh(&mut self, project_id: i64) {
        self.loading = true;
        match self.api.list_foreshadowings(project_id).await {
            Ok(foreshadowings) => self.foreshadowings = foreshadowings,
            Err(err) => {
                warn!("foreshadowing list failed: {err}");
                self.notices.error("Failed to load foreshadowings");
            }
        }
        self.loading = false;
    }

    pub async fn submit(&mut self, form: &ForeshadowingForm) -> Result<Foreshadowing> {
        if form.title.trim().is_empty() {
            return Err(Error::Validation("title is required".to_string()));
        }
        let saved = match form.id {
            Some(id) => self.api.update_foreshadowing(id, form).await,
            None => self.api.create_foreshadowing(form).await,
        };
        match saved {
            Ok(foreshadowing) => {
                upsert(&mut self.foreshadowings, foreshadowing.clone(), |f| f.id);
                self.notices.success("Foreshadowing saved");
                Ok(foreshadowing)
            }
            Err(err) => {
                self.notices.error("Failed to save foreshadowing");
                Err(err)
            }
        }
    }

    pub async fn remove(&mut self, id: i64) -> Result<()> {
        match self.api.delete_foreshadowing(id).await {
            Ok(()) => {
                self.foreshadowings.retain(|f| f.id != id);
                self.notices.success("Foreshadowing deleted");
                Ok(())
            }
            Err(err) => {
                self.notices.error("Failed to delete foreshadowing");
                Err(err)
            }
        }
    }

    /// Foreshadowings still waiting for their payoff, oldest plant first.
    pub fn pending(&self) -> Vec<&Foreshadowing> {
        let mut pending: Vec<&Foreshadowing> = self
            .foreshadowings
            .iter()
            .filter(|f| f.status == ForeshadowingStatus::Planted)
            .collect();
        pending.sort_by_key(|f| f.planted_chapter.unwrap_or(u32::MAX));
        pending
    }
}
