//! `GraphApi` - one method per remote operation, each issuing exactly one
//! HTTP call through the host and returning the response untouched.

use kgflow_core::{
    AddEpisodeParams, AddMessagesParams, EntityNodeParams, GetEpisodesParams, GetMemoryParams,
    Result, SearchParams, CREDENTIALS_NAME,
};
use serde_json::Value;
use tracing::debug;

use crate::builders;
use crate::host::Host;
use crate::request::HttpRequest;

pub struct GraphApi<'h> {
    host: &'h dyn Host,
}

impl<'h> GraphApi<'h> {
    pub fn new(host: &'h dyn Host) -> Self {
        Self { host }
    }

    /// Credentials are re-read on every call; the host may cache them.
    async fn base_url(&self) -> Result<String> {
        Ok(self.host.get_credentials(CREDENTIALS_NAME).await?.base_url)
    }

    async fn send(&self, operation: &str, request: HttpRequest) -> Result<Value> {
        debug!(operation, method = %request.method, url = %request.url, "graph request");
        self.host.http_request(request).await
    }

    pub async fn add_episode(&self, params: &AddEpisodeParams) -> Result<Value> {
        let req = builders::add_episode(&self.base_url().await?, params)?;
        self.send("add_episode", req).await
    }

    pub async fn search_episodes(&self, params: &SearchParams) -> Result<Value> {
        let req = builders::search_episodes(&self.base_url().await?, params)?;
        self.send("search_episodes", req).await
    }

    pub async fn add_messages(&self, params: &AddMessagesParams) -> Result<Value> {
        let req = builders::add_messages(&self.base_url().await?, params)?;
        self.send("add_messages", req).await
    }

    pub async fn get_memory(&self, params: &GetMemoryParams) -> Result<Value> {
        let req = builders::get_memory(&self.base_url().await?, params)?;
        self.send("get_memory", req).await
    }

    pub async fn get_episodes(&self, params: &GetEpisodesParams) -> Result<Value> {
        let req = builders::get_episodes(&self.base_url().await?, params)?;
        self.send("get_episodes", req).await
    }

    pub async fn add_entity_node(&self, params: &EntityNodeParams) -> Result<Value> {
        let req = builders::add_entity_node(&self.base_url().await?, params)?;
        self.send("add_entity_node", req).await
    }

    pub async fn get_entity_edge(&self, uuid: &str) -> Result<Value> {
        let req = builders::get_entity_edge(&self.base_url().await?, uuid)?;
        self.send("get_entity_edge", req).await
    }

    pub async fn delete_entity_edge(&self, uuid: &str) -> Result<Value> {
        let req = builders::delete_entity_edge(&self.base_url().await?, uuid)?;
        self.send("delete_entity_edge", req).await
    }

    pub async fn delete_group(&self, group_id: &str) -> Result<Value> {
        let req = builders::delete_group(&self.base_url().await?, group_id)?;
        self.send("delete_group", req).await
    }

    pub async fn delete_episode(&self, uuid: &str) -> Result<Value> {
        let req = builders::delete_episode(&self.base_url().await?, uuid)?;
        self.send("delete_episode", req).await
    }

    pub async fn clear_data(&self) -> Result<Value> {
        let req = builders::clear_data(&self.base_url().await?)?;
        self.send("clear_data", req).await
    }

    pub async fn healthcheck(&self) -> Result<Value> {
        let req = builders::healthcheck(&self.base_url().await?)?;
        self.send("healthcheck", req).await
    }
}
