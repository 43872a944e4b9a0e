use std::sync::Arc;

use log::warn;
use serde::Serialize;

use crate::error::{Error, Result};
use crate::models::{Project, ProjectStatus};
use crate::services::{ApiClient, Notifier};

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectForm {
    #[serde(skip)]
    pub id: Option<i64>,
    pub title: String,
    pub theme: String,
    pub genre: String,
    pub target_length: u32,
    pub status: Option<ProjectStatus>,
}

pub struct ProjectScreen {
    api: Arc<ApiClient>,
    notices: Arc<dyn Notifier>,
    pub projects: Vec<Project>,
    pub loading: bool,
}

impl ProjectScreen {
    pub fn new(api: Arc<ApiClient>, notices: Arc<dyn Notifier>) -> Self {
        Self {
            api,
            notices,
            projects: Vec::new(),
            loading: false,
        }
    }

    pub async fn refresh(&mut self) {
        self.loading = true;
        match self.api.list_projects().await {
            Ok(projects) => self.projects = projects,
            Err(err) => {
                warn!("project list failed: {err}");
                self.notices.error("Failed to load projects");
            }
        }
        self.loading = false;
    }

    pub async fn submit(&mut self, form: &ProjectForm) -> Result<Project> {
        if form.title.trim().is_empty() {
            return Err(Error::Validation("title is required".to_string()));
        }
        let saved = match form.id {
            Some(id) => self.api.update_project(id, form).await,
            None => self.api.create_project(form).await,
        };
        match saved {
            Ok(project) => {
                upsert(&mut self.projects, project.clone(), |p| p.id);
                self.notices.success("Project saved");
                Ok(project)
            }
            Err(err) => {
                self.notices.error("Failed to save project");
                Err(err)
            }
        }
    }

    pub async fn remove(&mut self, id: i64) -> Result<()> {
        match self.api.delete_project(id).await {
            Ok(()) => {
                self.projects.retain(|p| p.id != id);
                self.notices.success("Project deleted");
                Ok(())
            }
            Err(err) => {
                self.notices.error("Failed to delete project");
                Err(err)
            }
        }
    }
}

/// Replace an existing entry by id or append a new one.
pub(crate) fn upsert<T, F>(list: &mut Vec<T>, entry: T, id_of: F)
where
    F: Fn(&T) -> i64,
{
    match list.iter().position(|e| id_of(e) == id_of(&entry)) {
        Some(index) => list[index] = entry,
        None => list.push(entry),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::notify::LogNotifier;
    use std::time::Duration;

    #[tokio::test]
    async fn empty_title_fails_validation_before_any_network_call() {
        // The backend URL is never contacted: validation fires first.
        let api = Arc::new(ApiClient::new("http://127.0.0.1:9/api", Duration::from_secs(1)).unwrap());
        let mut screen = ProjectScreen::new(api, Arc::new(LogNotifier));

        let err = screen
            .submit(&ProjectForm {
                title: "   ".to_string(),
                ..ProjectForm::default()
            })
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }

    #[test]
    fn upsert_replaces_by_id() {
        #[derive(Clone)]
        struct Row(i64, &'static str);
        let mut rows = vec![Row(1, "a"), Row(2, "b")];
        upsert(&mut rows, Row(2, "b2"), |r| r.0);
        upsert(&mut rows, Row(3, "c"), |r| r.0);
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[1].1, "b2");
    }
}
