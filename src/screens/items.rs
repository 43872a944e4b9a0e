use std::sync::Arc;

use log::warn;
use serde::Serialize;

use crate::error::{Error, Result};
use crate::models::Item;
use crate::services::{ApiClient, Notifier};

use super::projects::upsert;

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemForm {
    #[serde(skip)]
    pub id: Option<i64>,
    pub project_id: i64,
    pub name: String,
    pub category: Option<String>,
    pub description: Option<String>,
    pub appearance: Option<String>,
    pub abilities: Option<String>,
    pub origin: Option<String>,
    pub rarity: Option<String>,
    pub current_owner_id: Option<i64>,
    pub location_id: Option<i64>,
    pub tags: Vec<String>,
    pub importance: u8,
}

pub struct ItemScreen {
    api: Arc<ApiClient>,
    notices: Arc<dyn Notifier>,
    pub items: Vec<Item>,
    pub loading: bool,
}

impl ItemScreen {
    pub fn new(api: Arc<ApiClient>, notices: Arc<dyn Notifier>) -> Self {
        Self {
            api,
            notices,
            items: Vec::new(),
            loading: false,
        }
    }

    pub async fn refresh(&mut self, project_id: i64) {
        self.loading = true;
        match self.api.list_items(project_id).await {
            Ok(items) => self.items = items,
            Err(err) => {
                warn!("item list failed: {err}");
                self.notices.error("Failed to load items");
            }
        }
        self.loading = false;
    }

    pub async fn submit(&mut self, form: &ItemForm) -> Result<Item> {
        if form.name.trim().is_empty() {
            return Err(Error::Validation("name is required".to_string()));
        }
        let saved = match form.id {
            Some(id) => self.api.update_item(id, form).await,
            None => self.api.create_item(form).await,
        };
        match saved {
            Ok(item) => {
                upsert(&mut self.items, item.clone(), |i| i.id);
                self.notices.success("Item saved");
                Ok(item)
            }
            Err(err) => {
                self.notices.error("Failed to save item");
                Err(err)
            }
        }
    }

    pub async fn remove(&mut self, id: i64) -> Result<()> {
        match self.api.delete_item(id).await {
            Ok(()) => {
                self.items.retain(|i| i.id != id);
                self.notices.success("Item deleted");
                Ok(())
            }
            Err(err) => {
                self.notices.error("Failed to delete item");
                Err(err)
            }
        }
    }
}
