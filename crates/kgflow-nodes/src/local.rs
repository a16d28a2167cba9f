//! In-process host: fixed items and parameters, credentials from config,
//! HTTP through a [`Transport`].

use kgflow_api::{Host, HttpRequest, Transport};
use kgflow_core::{Credentials, Error, KgflowConfig, Result};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::sync::Arc;

pub struct LocalHost {
    items: Vec<Value>,
    parameters: Map<String, Value>,
    credentials: BTreeMap<String, Credentials>,
    transport: Arc<dyn Transport>,
    continue_on_fail: bool,
    workflow_id: String,
    execution_id: String,
}

impl LocalHost {
    /// No items, no parameters, no credentials.
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self {
            items: Vec::new(),
            parameters: Map::new(),
            credentials: BTreeMap::new(),
            transport,
            continue_on_fail: false,
            workflow_id: "kgflow".to_string(),
            execution_id: uuid::Uuid::new_v4().to_string(),
        }
    }

    /// Credentials and workflow identity from config. Without a configured
    /// execution id each host gets a fresh one.
    pub fn from_config(config: &KgflowConfig, transport: Arc<dyn Transport>) -> Self {
        let mut host = Self::new(transport);
        host.credentials = config.credentials.clone();
        host.workflow_id = config.workflow_id.clone();
        if let Some(id) = &config.execution_id {
            host.execution_id = id.clone();
        }
        host
    }

    pub fn items(mut self, items: Vec<Value>) -> Self {
        self.items = items;
        self
    }

    pub fn parameter(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.parameters.insert(name.into(), value.into());
        self
    }

    pub fn parameters(mut self, parameters: Map<String, Value>) -> Self {
        self.parameters.extend(parameters);
        self
    }

    pub fn credentials(mut self, name: impl Into<String>, credentials: Credentials) -> Self {
        self.credentials.insert(name.into(), credentials);
        self
    }

    pub fn continue_on_fail(mut self, enabled: bool) -> Self {
        self.continue_on_fail = enabled;
        self
    }

    pub fn workflow_id(mut self, id: impl Into<String>) -> Self {
        self.workflow_id = id.into();
        self
    }

    pub fn execution_id(mut self, id: impl Into<String>) -> Self {
        self.execution_id = id.into();
        self
    }
}

#[async_trait::async_trait]
impl Host for LocalHost {
    fn input_items(&self) -> &[Value] {
        &self.items
    }

    /// Parameters apply to every item alike.
    fn get_parameter(&self, name: &str, _item_index: usize, default: Option<Value>) -> Result<Value> {
        match self.parameters.get(name) {
            Some(v) => Ok(v.clone()),
            None => default.ok_or_else(|| Error::missing(name)),
        }
    }

    async fn get_credentials(&self, name: &str) -> Result<Credentials> {
        self.credentials
            .get(name)
            .cloned()
            .ok_or_else(|| Error::CredentialsNotFound(name.to_string()))
    }

    async fn http_request(&self, request: HttpRequest) -> Result<Value> {
        self.transport.send(request).await
    }

    fn continue_on_fail(&self) -> bool {
        self.continue_on_fail
    }

    fn workflow_id(&self) -> &str {
        &self.workflow_id
    }

    fn execution_id(&self) -> &str {
        &self.execution_id
    }
}
