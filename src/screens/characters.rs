use std::sync::Arc;

use log::warn;
use serde::Serialize;

use crate::error::{Error, Result};
use crate::models::{Character, CharacterRelation};
use crate::services::{ApiClient, Notifier};

use super::projects::upsert;

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CharacterForm {
    #[serde(skip)]
    pub id: Option<i64>,
    pub project_id: i64,
    pub name: String,
    pub alias: Vec<String>,
    pub role_type: Option<String>,
    pub gender: Option<String>,
    pub age: Option<String>,
    pub appearance: Option<String>,
    pub personality: Option<String>,
    pub background: Option<String>,
    pub abilities: Vec<String>,
    pub goals: Option<String>,
    pub conflicts: Option<String>,
    pub character_arc: Option<String>,
    pub tags: Vec<String>,
    pub importance: u8,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RelationForm {
    #[serde(skip)]
    pub id: Option<i64>,
    pub to_character_id: i64,
    pub relation_type: Option<String>,
    pub description: Option<String>,
    pub intimacy: u8,
}

pub struct CharacterScreen {
    api: Arc<ApiClient>,
    notices: Arc<dyn Notifier>,
    pub characters: Vec<Character>,
    pub loading: bool,
}

impl CharacterScreen {
    pub fn new(api: Arc<ApiClient>, notices: Arc<dyn Notifier>) -> Self {
        Self {
            api,
            notices,
            characters: Vec::new(),
            loading: false,
        }
    }

    pub async fn refresh(&mut self, project_id: i64) {
        self.loading = true;
        match self.api.list_characters(project_id).await {
            Ok(characters) => self.characters = characters,
            Err(err) => {
                warn!("character list failed: {err}");
                self.notices.error("Failed to load characters");
            }
        }
        self.loading = false;
    }

    pub async fn submit(&mut self, form: &CharacterForm) -> Result<Character> {
        if form.name.trim().is_empty() {
            return Err(Error::Validation("name is required".to_string()));
        }
        let saved = match form.id {
            Some(id) => self.api.update_character(id, form).await,
            None => self.api.create_character(form).await,
        };
        match saved {
            Ok(character) => {
                upsert(&mut self.characters, character.clone(), |c| c.id);
                self.notices.success("Character saved");
                Ok(character)
            }
            Err(err) => {
                self.notices.error("Failed to save character");
                Err(err)
            }
        }
    }

    pub async fn remove(&mut self, id: i64) -> Result<()> {
        match self.api.delete_character(id).await {
            Ok(()) => {
                self.characters.retain(|c| c.id != id);
                self.notices.success("Character deleted");
                Ok(())
            }
            Err(err) => {
                self.notices.error("Failed to delete character");
                Err(err)
            }
        }
    }

    pub async fn add_relation(
        &mut self,
        character_id: i64,
        form: &RelationForm,
    ) -> Result<CharacterRelation> {
        if form.to_character_id == 0 {
            return Err(Error::Validation("target character is required".to_string()));
        }
        match self.api.create_relation(character_id, form).await {
            Ok(relation) => {
                if let Some(character) =
                    self.characters.iter_mut().find(|c| c.id == character_id)
                {
                    character.relations.push(relation.clone());
                }
                Ok(relation)
            }
            Err(err) => {
                self.notices.error("Failed to save relation");
                Err(err)
            }
        }
    }

    pub async fn remove_relation(&mut self, character_id: i64, relation_id: i64) -> Result<()> {
        match self.api.delete_relation(character_id, relation_id).await {
            Ok(()) => {
                if let Some(character) =
                    self.characters.iter_mut().find(|c| c.id == character_id)
                {
                    character.relations.retain(|r| r.id != relation_id);
                }
                Ok(())
            }
            Err(err) => {
                self.notices.error("Failed to delete relation");
                Err(err)
            }
        }
    }
}
