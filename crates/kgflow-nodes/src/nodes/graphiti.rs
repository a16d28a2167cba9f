//! Direct node: every remote operation exposed 1:1, response returned verbatim.

use kgflow_core::{
    AddEpisodeParams, AddMessagesParams, EntityNodeParams, EpisodeType, Error, GetEpisodesParams,
    GetMemoryParams, Result, SearchParams, SearchType,
};
use serde_json::Value;
use std::str::FromStr;

use crate::dispatch::Node;
use crate::params::ItemContext;
use crate::schema::{NodeDescription, NodeProperty, OptionValue};

const DEFAULT_SEARCH_LIMIT: u32 = 5;
const DEFAULT_LAST_N: u32 = 10;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Operation {
    AddEpisode,
    SearchEpisodes,
    AddMessages,
    GetMemory,
    GetEpisodes,
    AddEntityNode,
    GetEntityEdge,
    DeleteEntityEdge,
    DeleteGroup,
    DeleteEpisode,
    ClearData,
    Healthcheck,
}

impl FromStr for Operation {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Ok(match s {
            "addEpisode" => Self::AddEpisode,
            "searchEpisodes" => Self::SearchEpisodes,
            "addMessages" => Self::AddMessages,
            "getMemory" => Self::GetMemory,
            "getEpisodes" => Self::GetEpisodes,
            "addEntityNode" => Self::AddEntityNode,
            "getEntityEdge" => Self::GetEntityEdge,
            "deleteEntityEdge" => Self::DeleteEntityEdge,
            "deleteGroup" => Self::DeleteGroup,
            "deleteEpisode" => Self::DeleteEpisode,
            "clearData" => Self::ClearData,
            "healthcheck" => Self::Healthcheck,
            other => return Err(Error::unknown_operation(GraphitiNode::NAME, other)),
        })
    }
}

pub struct GraphitiNode {
    description: NodeDescription,
}

impl Default for GraphitiNode {
    fn default() -> Self {
        Self::new()
    }
}

impl GraphitiNode {
    pub const NAME: &'static str = "graphiti";

    pub fn new() -> Self {
        Self {
            description: describe(),
        }
    }
}

fn describe() -> NodeDescription {
    let op = |name, value, description| OptionValue::operation(name, value, description, description);
    NodeDescription {
        display_name: "Graphiti",
        name: GraphitiNode::NAME,
        icon: "file:node-icon.svg",
        group: "transform",
        version: 1,
        subtitle: "={{$parameter[\"operation\"]}}",
        description: "Interact with the Graphiti API: episodes, search, memory and entity management",
        usable_as_tool: false,
        credentials: NodeDescription::graphiti_credentials(),
        properties: vec![
            NodeProperty::operation(
                vec![
                    op("Add Episode", "addEpisode", "Add a new episode to Graphiti"),
                    op("Search Episodes", "searchEpisodes", "Search episodes in Graphiti"),
                    op("Add Messages", "addMessages", "Add conversation messages to a group"),
                    op("Get Memory", "getMemory", "Retrieve memory relevant to a message history"),
                    op("Get Episodes", "getEpisodes", "Get the most recent episodes of a group"),
                    op("Add Entity Node", "addEntityNode", "Create an entity node"),
                    op("Get Entity Edge", "getEntityEdge", "Get an entity edge by UUID"),
                    op("Delete Entity Edge", "deleteEntityEdge", "Delete an entity edge by UUID"),
                    op("Delete Group", "deleteGroup", "Delete all data of a group"),
                    op("Delete Episode", "deleteEpisode", "Delete an episode by UUID"),
                    op("Clear Data", "clearData", "Delete all data in the graph"),
                    op("Healthcheck", "healthcheck", "Check that the API is reachable"),
                ],
                "addEpisode",
            ),
            // addEpisode
            NodeProperty::string("name", "Name", "Name of the episode")
                .required()
                .show("operation", &["addEpisode"]),
            NodeProperty::string("content", "Content", "Content of the episode (text or JSON string)")
                .required()
                .show("operation", &["addEpisode"]),
            NodeProperty::options(
                "type",
                "Type",
                vec![OptionValue::new("Text", "text"), OptionValue::new("JSON", "json")],
                "text",
                "Type of episode content",
            )
            .required()
            .show("operation", &["addEpisode"]),
            NodeProperty::string("description", "Description", "Description of the episode")
                .required()
                .show("operation", &["addEpisode"]),
            NodeProperty::date_time("referenceTime", "Reference Time", "Reference time for the episode (optional)")
                .show("operation", &["addEpisode"]),
            // searchEpisodes
            NodeProperty::string("query", "Query", "Search query for episodes")
                .required()
                .show("operation", &["searchEpisodes"]),
            NodeProperty::options(
                "searchType",
                "Search Type",
                vec![OptionValue::new("Edge", "edge"), OptionValue::new("Node", "node")],
                "edge",
                "Type of search (edge or node)",
            )
            .required()
            .show("operation", &["searchEpisodes"]),
            NodeProperty::string("centerNodeUuid", "Center Node UUID", "Optional UUID for center node reranking (edge search only)")
                .show("operation", &["searchEpisodes"])
                .show("searchType", &["edge"]),
            NodeProperty::number("limit", "Limit", DEFAULT_SEARCH_LIMIT as u64, "Maximum number of results (node search only)")
                .bounds(1, None)
                .show("operation", &["searchEpisodes"])
                .show("searchType", &["node"]),
            // group-scoped operations
            NodeProperty::string("group_id", "Group ID", "Group the data belongs to")
                .required()
                .show("operation", &["addMessages", "getMemory", "getEpisodes", "addEntityNode", "deleteGroup"]),
            NodeProperty::json("messages", "Messages", "Ordered list of messages ({content, role_type, role?, uuid?, name?, timestamp?, source_description?})")
                .show("operation", &["addMessages", "getMemory"]),
            NodeProperty::number("max_facts", "Max Facts", 10, "Maximum number of facts to retrieve")
                .bounds(1, None)
                .show("operation", &["getMemory"]),
            NodeProperty::string("center_node_uuid", "Center Node UUID", "Optional UUID to center memory retrieval around")
                .show("operation", &["getMemory"]),
            NodeProperty::number("last_n", "Last N", DEFAULT_LAST_N as u64, "Number of most recent episodes to return")
                .bounds(1, None)
                .show("operation", &["getEpisodes"]),
            // entity node
            NodeProperty::string("uuid", "UUID", "Entity UUID (generated when empty)")
                .show("operation", &["addEntityNode"]),
            NodeProperty::string("name", "Name", "Entity name")
                .required()
                .show("operation", &["addEntityNode"]),
            NodeProperty::string("summary", "Summary", "Entity summary")
                .show("operation", &["addEntityNode"]),
            // uuid-addressed operations
            NodeProperty::string("uuid", "UUID", "UUID of the edge or episode")
                .required()
                .show("operation", &["getEntityEdge", "deleteEntityEdge", "deleteEpisode"]),
        ],
    }
}

#[async_trait::async_trait]
impl Node for GraphitiNode {
    fn description(&self) -> &NodeDescription {
        &self.description
    }

    async fn execute_item(&self, ctx: &ItemContext<'_>, operation: &str) -> Result<Value> {
        let api = ctx.api();
        match operation.parse::<Operation>()? {
            Operation::AddEpisode => {
                let params = AddEpisodeParams {
                    name: ctx.string("name")?,
                    content: ctx.string("content")?,
                    episode_type: ctx.parse_or_default::<EpisodeType>("type")?,
                    description: ctx.string("description")?,
                    reference_time: ctx.string_or("referenceTime", "")?,
                };
                api.add_episode(&params).await
            }
            Operation::SearchEpisodes => {
                let params = SearchParams {
                    query: ctx.string("query")?,
                    search_type: ctx.parse_or_default::<SearchType>("searchType")?,
                    center_node_uuid: ctx.string_or("centerNodeUuid", "")?,
                    limit: ctx.u32_or("limit", DEFAULT_SEARCH_LIMIT)?,
                };
                api.search_episodes(&params).await
            }
            Operation::AddMessages => {
                let params = AddMessagesParams {
                    group_id: ctx.string("group_id")?,
                    messages: ctx.messages("messages")?,
                };
                api.add_messages(&params).await
            }
            Operation::GetMemory => {
                let center = ctx.string_or("center_node_uuid", "")?;
                let params = GetMemoryParams {
                    group_id: ctx.string("group_id")?,
                    max_facts: ctx.u32_opt("max_facts")?,
                    center_node_uuid: (!center.is_empty()).then_some(center),
                    messages: ctx.messages("messages")?,
                };
                api.get_memory(&params).await
            }
            Operation::GetEpisodes => {
                let params = GetEpisodesParams {
                    group_id: ctx.string("group_id")?,
                    last_n: ctx.u32_or("last_n", DEFAULT_LAST_N)?,
                };
                api.get_episodes(&params).await
            }
            Operation::AddEntityNode => {
                let uuid = ctx.string_or("uuid", "")?;
                let params = EntityNodeParams {
                    uuid: if uuid.is_empty() {
                        uuid::Uuid::new_v4().to_string()
                    } else {
                        uuid
                    },
                    group_id: ctx.string("group_id")?,
                    name: ctx.string("name")?,
                    summary: ctx.string_or("summary", "")?,
                };
                api.add_entity_node(&params).await
            }
            Operation::GetEntityEdge => api.get_entity_edge(&ctx.string("uuid")?).await,
            Operation::DeleteEntityEdge => api.delete_entity_edge(&ctx.string("uuid")?).await,
            Operation::DeleteGroup => api.delete_group(&ctx.string("group_id")?).await,
            Operation::DeleteEpisode => api.delete_episode(&ctx.string("uuid")?).await,
            Operation::ClearData => api.clear_data().await,
            Operation::Healthcheck => api.healthcheck().await,
        }
    }
}
