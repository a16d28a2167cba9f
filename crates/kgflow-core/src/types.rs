//! Request types shared by the builders and the node adapters

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::Error;

/// Name under which the host stores the knowledge-graph credentials.
pub const CREDENTIALS_NAME: &str = "graphitiApi";

/// Default base URL offered by the credential form.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";

/// Connection settings for the knowledge-graph service.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    #[serde(rename = "baseUrl")]
    pub base_url: String,
}

impl Credentials {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }
}

/// Episode content type
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum EpisodeType {
    #[default]
    Text,
    Json,
}

impl EpisodeType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Json => "json",
        }
    }
}

impl FromStr for EpisodeType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            other => Err(Error::invalid_parameter(
                "type",
                format!("expected text or json, got '{}'", other),
            )),
        }
    }
}

/// Search target: relationships (edges) or concepts (nodes)
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SearchType {
    #[default]
    Edge,
    Node,
}

impl SearchType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Edge => "edge",
            Self::Node => "node",
        }
    }
}

impl FromStr for SearchType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "edge" => Ok(Self::Edge),
            "node" => Ok(Self::Node),
            other => Err(Error::invalid_parameter(
                "searchType",
                format!("expected edge or node, got '{}'", other),
            )),
        }
    }
}

/// Message role type
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RoleType {
    User,
    Assistant,
    System,
}

/// One message of a conversation history. Order within a sequence is
/// chronological and is sent as-is.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub content: String,
    pub role_type: RoleType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uuid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_description: Option<String>,
}

impl Message {
    fn with_role_type(role_type: RoleType, content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            role_type,
            role: None,
            uuid: None,
            name: None,
            timestamp: None,
            source_description: None,
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::with_role_type(RoleType::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::with_role_type(RoleType::Assistant, content)
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::with_role_type(RoleType::System, content)
    }

    pub fn role(mut self, role: impl Into<String>) -> Self {
        self.role = Some(role.into());
        self
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn timestamp(mut self, timestamp: impl Into<String>) -> Self {
        self.timestamp = Some(timestamp.into());
        self
    }

    pub fn source_description(mut self, description: impl Into<String>) -> Self {
        self.source_description = Some(description.into());
        self
    }
}

#[derive(Clone, Debug, Default)]
pub struct AddEpisodeParams {
    pub name: String,
    pub content: String,
    pub episode_type: EpisodeType,
    pub description: String,
    /// ISO-8601; blank means "not sent".
    pub reference_time: String,
}

#[derive(Clone, Debug, Default)]
pub struct SearchParams {
    pub query: String,
    pub search_type: SearchType,
    /// Blank means "not sent". Only meaningful for edge search.
    pub center_node_uuid: String,
    /// Only sent for node search.
    pub limit: u32,
}

#[derive(Clone, Debug, Serialize)]
pub struct AddMessagesParams {
    pub group_id: String,
    pub messages: Vec<Message>,
}

#[derive(Clone, Debug, Default)]
pub struct GetMemoryParams {
    pub group_id: String,
    /// Defaults to 10 when unset.
    pub max_facts: Option<u32>,
    pub center_node_uuid: Option<String>,
    pub messages: Vec<Message>,
}

#[derive(Clone, Debug)]
pub struct GetEpisodesParams {
    pub group_id: String,
    pub last_n: u32,
}

#[derive(Clone, Debug, Serialize)]
pub struct EntityNodeParams {
    pub uuid: String,
    pub group_id: String,
    pub name: String,
    pub summary: String,
}
