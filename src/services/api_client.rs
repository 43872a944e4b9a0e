use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Serialize;
use url::Url;

use crate::error::{Error, Result};
use crate::models::{
    AnalyzeRequest, Chapter, Character, CharacterRelation, Foreshadowing, Item, KnowledgeBase,
    Location, Outline, OutlineNode, Project, Proposal, WritingStyle, Worldview,
};

use super::assistant::AssistantBackend;
use super::config_service;

/// Client for the novel manager's REST backend.
#[derive(Debug)]
pub struct ApiClient {
    client: Client,
    base_url: Url,
}

impl ApiClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let base_url = Url::parse(base_url)
            .map_err(|e| Error::Config(format!("invalid backend URL: {e}")))?;
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::Network(format!("failed to create HTTP client: {e}")))?;

        Ok(Self { client, base_url })
    }

    /// Create a client from the app's configuration.
    pub fn from_config() -> Result<Self> {
        let config = config_service::load_config()?;
        Self::new(
            &config.backend_url,
            Duration::from_secs(config.request_timeout_secs),
        )
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        let joined = format!(
            "{}/{}",
            self.base_url.as_str().trim_end_matches('/'),
            path.trim_start_matches('/')
        );
        Url::parse(&joined).map_err(|e| Error::Network(format!("invalid endpoint: {e}")))
    }

    async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T> {
        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(Error::Network(format!("API error ({status}): {error_text}")));
        }
        response
            .json()
            .await
            .map_err(|e| Error::Network(format!("failed to parse response: {e}")))
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let response = self.client.get(self.endpoint(path)?).send().await?;
        Self::decode(response).await
    }

    async fn post_json<T: DeserializeOwned>(
        &self,
        path: &str,
        body: &(impl Serialize + ?Sized),
    ) -> Result<T> {
        let response = self
            .client
            .post(self.endpoint(path)?)
            .json(body)
            .send()
            .await?;
        Self::decode(response).await
    }

    async fn put_json<T: DeserializeOwned>(
        &self,
        path: &str,
        body: &(impl Serialize + ?Sized),
    ) -> Result<T> {
        let response = self
            .client
            .put(self.endpoint(path)?)
            .json(body)
            .send()
            .await?;
        Self::decode(response).await
    }

    async fn delete(&self, path: &str) -> Result<()> {
        let response = self.client.delete(self.endpoint(path)?).send().await?;
        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(Error::Network(format!("API error ({status}): {error_text}")));
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Projects
    // ------------------------------------------------------------------

    pub async fn list_projects(&self) -> Result<Vec<Project>> {
        self.get_json("projects").await
    }

    pub async fn create_project(&self, body: &impl Serialize) -> Result<Project> {
        self.post_json("projects", body).await
    }

    pub async fn get_project(&self, id: i64) -> Result<Project> {
        self.get_json(&format!("projects/{id}")).await
    }

    pub async fn update_project(&self, id: i64, body: &impl Serialize) -> Result<Project> {
        self.put_json(&format!("projects/{id}"), body).await
    }

    pub async fn delete_project(&self, id: i64) -> Result<()> {
        self.delete(&format!("projects/{id}")).await
    }

    // ------------------------------------------------------------------
    // Outline
    // ------------------------------------------------------------------

    pub async fn get_outline(&self, project_id: i64, hierarchy: bool) -> Result<Outline> {
        let path = if hierarchy {
            format!("projects/{project_id}/outline?hierarchy=true")
        } else {
            format!("projects/{project_id}/outline")
        };
        self.get_json(&path).await
    }

    pub async fn generate_outline(
        &self,
        project_id: i64,
        body: &impl Serialize,
    ) -> Result<Outline> {
        self.post_json(&format!("projects/{project_id}/outline/generate"), body)
            .await
    }

    pub async fn update_outline_node(
        &self,
        node_id: i64,
        body: &impl Serialize,
    ) -> Result<OutlineNode> {
        self.put_json(&format!("outline-chapters/{node_id}"), body)
            .await
    }

    pub async fn add_outline_node(
        &self,
        outline_id: i64,
        body: &impl Serialize,
    ) -> Result<OutlineNode> {
        self.post_json(&format!("chapters/outline/{outline_id}/chapters"), body)
            .await
    }

    pub async fn delete_outline_node(&self, node_id: i64) -> Result<()> {
        self.delete(&format!("chapters/outline-chapter/{node_id}"))
            .await
    }

    // ------------------------------------------------------------------
    // Chapters
    // ------------------------------------------------------------------

    pub async fn get_chapter(&self, outline_chapter_id: i64) -> Result<Option<Chapter>> {
        self.get_json(&format!("chapters/outline-chapter/{outline_chapter_id}"))
            .await
    }

    pub async fn save_chapter(
        &self,
        outline_chapter_id: i64,
        body: &impl Serialize,
    ) -> Result<Chapter> {
        self.post_json(&format!("chapters/outline-chapter/{outline_chapter_id}"), body)
            .await
    }

    pub async fn delete_chapter(&self, chapter_id: i64) -> Result<()> {
        self.delete(&format!("chapters/{chapter_id}")).await
    }

    pub async fn project_chapters(&self, project_id: i64) -> Result<Vec<Chapter>> {
        self.get_json(&format!("chapters/project/{project_id}")).await
    }

    // ------------------------------------------------------------------
    // Characters
    // ------------------------------------------------------------------

    pub async fn list_characters(&self, project_id: i64) -> Result<Vec<Character>> {
        self.get_json(&format!("characters/project/{project_id}")).await
    }

    pub async fn create_character(&self, body: &impl Serialize) -> Result<Character> {
        self.post_json("characters", body).await
    }

    pub async fn update_character(&self, id: i64, body: &impl Serialize) -> Result<Character> {
        self.put_json(&format!("characters/{id}"), body).await
    }

    pub async fn delete_character(&self, id: i64) -> Result<()> {
        self.delete(&format!("characters/{id}")).await
    }

    pub async fn create_relation(
        &self,
        character_id: i64,
        body: &impl Serialize,
    ) -> Result<CharacterRelation> {
        self.post_json(&format!("characters/{character_id}/relations"), body)
            .await
    }

    pub async fn update_relation(
        &self,
        character_id: i64,
        relation_id: i64,
        body: &impl Serialize,
    ) -> Result<CharacterRelation> {
        self.put_json(
            &format!("characters/{character_id}/relations/{relation_id}"),
            body,
        )
        .await
    }

    pub async fn delete_relation(&self, character_id: i64, relation_id: i64) -> Result<()> {
        self.delete(&format!("characters/{character_id}/relations/{relation_id}"))
            .await
    }

    // ------------------------------------------------------------------
    // Worldview, locations, items, foreshadowings
    // ------------------------------------------------------------------

    pub async fn list_worldviews(&self, project_id: i64) -> Result<Vec<Worldview>> {
        self.get_json(&format!("worldviews/project/{project_id}")).await
    }

    pub async fn create_worldview(&self, body: &impl Serialize) -> Result<Worldview> {
        self.post_json("worldviews", body).await
    }

    pub async fn update_worldview(&self, id: i64, body: &impl Serialize) -> Result<Worldview> {
        self.put_json(&format!("worldviews/{id}"), body).await
    }

    pub async fn delete_worldview(&self, id: i64) -> Result<()> {
        self.delete(&format!("worldviews/{id}")).await
    }

    pub async fn list_locations(&self, project_id: i64) -> Result<Vec<Location>> {
        self.get_json(&format!("locations/project/{project_id}")).await
    }

    pub async fn create_location(&self, body: &impl Serialize) -> Result<Location> {
        self.post_json("locations", body).await
    }

    pub async fn update_location(&self, id: i64, body: &impl Serialize) -> Result<Location> {
        self.put_json(&format!("locations/{id}"), body).await
    }

    pub async fn delete_location(&self, id: i64) -> Result<()> {
        self.delete(&format!("locations/{id}")).await
    }

    pub async fn list_items(&self, project_id: i64) -> Result<Vec<Item>> {
        self.get_json(&format!("items/project/{project_id}")).await
    }

    pub async fn create_item(&self, body: &impl Serialize) -> Result<Item> {
        self.post_json("items", body).await
    }

    pub async fn update_item(&self, id: i64, body: &impl Serialize) -> Result<Item> {
        self.put_json(&format!("items/{id}"), body).await
    }

    pub async fn delete_item(&self, id: i64) -> Result<()> {
        self.delete(&format!("items/{id}")).await
    }

    pub async fn list_foreshadowings(&self, project_id: i64) -> Result<Vec<Foreshadowing>> {
        self.get_json(&format!("foreshadowings/project/{project_id}"))
            .await
    }

    pub async fn create_foreshadowing(&self, body: &impl Serialize) -> Result<Foreshadowing> {
        self.post_json("foreshadowings", body).await
    }

    pub async fn update_foreshadowing(
        &self,
        id: i64,
        body: &impl Serialize,
    ) -> Result<Foreshadowing> {
        self.put_json(&format!("foreshadowings/{id}"), body).await
    }

    pub async fn delete_foreshadowing(&self, id: i64) -> Result<()> {
        self.delete(&format!("foreshadowings/{id}")).await
    }

    // ------------------------------------------------------------------
    // Writing style
    // ------------------------------------------------------------------

    pub async fn get_writing_style(&self, project_id: i64) -> Result<Option<WritingStyle>> {
        self.get_json(&format!("writing-styles/project/{project_id}"))
            .await
    }

    pub async fn save_writing_style(
        &self,
        project_id: i64,
        body: &impl Serialize,
    ) -> Result<WritingStyle> {
        self.post_json(&format!("writing-styles/project/{project_id}"), body)
            .await
    }

    pub async fn delete_writing_style(&self, id: i64) -> Result<()> {
        self.delete(&format!("writing-styles/{id}")).await
    }

    // ------------------------------------------------------------------
    // AI assistant
    // ------------------------------------------------------------------

    pub async fn analyze(&self, request: &AnalyzeRequest) -> Result<Proposal> {
        self.post_json("ai-assistant/analyze", request).await
    }

    pub async fn knowledge_base(&self, project_id: i64) -> Result<KnowledgeBase> {
        self.get_json(&format!("ai-assistant/knowledge-base/{project_id}"))
            .await
    }
}

#[async_trait]
impl AssistantBackend for ApiClient {
    async fn analyze(&self, request: AnalyzeRequest) -> Result<Proposal> {
        ApiClient::analyze(self, &request).await
    }

    async fn knowledge_base(&self, project_id: i64) -> Result<KnowledgeBase> {
        ApiClient::knowledge_base(self, project_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoints_join_cleanly() {
        let client = ApiClient::new("http://localhost:5001/api", Duration::from_secs(5)).unwrap();
        assert_eq!(
            client.endpoint("characters/project/3").unwrap().as_str(),
            "http://localhost:5001/api/characters/project/3"
        );
        assert_eq!(
            client.endpoint("/projects").unwrap().as_str(),
            "http://localhost:5001/api/projects"
        );
    }

    #[test]
    fn invalid_base_url_is_a_config_error() {
        let err = ApiClient::new("not a url", Duration::from_secs(5)).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }
}
