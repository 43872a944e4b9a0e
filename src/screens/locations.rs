use std::sync::Arc;

use log::warn;
use serde::Serialize;

use crate::error::{Error, Result};
use crate::models::Location;
use crate::services::{ApiClient, Notifier};

use super::projects::upsert;

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationForm {
    #[serde(skip)]
    pub id: Option<i64>,
    pub project_id: i64,
    pub parent_id: Option<i64>,
    pub name: String,
    pub location_type: Option<String>,
    pub description: Option<String>,
    pub climate: Option<String>,
    pub terrain: Option<String>,
    pub special_features: Option<String>,
    pub tags: Vec<String>,
    pub importance: u8,
}

pub struct LocationScreen {
    api: Arc<ApiClient>,
    notices: Arc<dyn Notifier>,
    pub locations: Vec<Location>,
    pub loading: bool,
}

impl LocationScreen {
    pub fn new(api: Arc<ApiClient>, notices: Arc<dyn Notifier>) -> Self {
        Self {
            api,
            notices,
            locations: Vec::new(),
            loading: false,
        }
    }

    pub async fn refresh(&mut self, project_id: i64) {
        self.loading = true;
        match self.api.list_locations(project_id).await {
            Ok(locations) => self.locations = locations,
            Err(err) => {
                warn!("location list failed: {err}");
                self.notices.error("Failed to load locations");
            }
        }
        self.loading = false;
    }

    pub async fn submit(&mut self, form: &LocationForm) -> Result<Location> {
        if form.name.trim().is_empty() {
            return Err(Error::Validation("name is required".to_string()));
        }
        let saved = match form.id {
            Some(id) => self.api.update_location(id, form).await,
            None => self.api.create_location(form).await,
        };
        match saved {
            Ok(location) => {
                upsert(&mut self.locations, location.clone(), |l| l.id);
                self.notices.success("Location saved");
                Ok(location)
            }
            Err(err) => {
                self.notices.error("Failed to save location");
                Err(err)
            }
        }
    }

    pub async fn remove(&mut self, id: i64) -> Result<()> {
        match self.api.delete_location(id).await {
            Ok(()) => {
                self.locations.retain(|l| l.id != id);
                self.notices.success("Location deleted");
                Ok(())
            }
            Err(err) => {
                self.notices.error("Failed to delete location");
                Err(err)
            }
        }
    }
}
