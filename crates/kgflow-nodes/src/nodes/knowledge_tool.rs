//! Knowledge tool: search, add and recall knowledge with auto-detected inputs.

use kgflow_core::{
    AddEpisodeParams, EpisodeType, Error, GetMemoryParams, Result, SearchParams, SearchType,
};
use serde_json::{json, Value};
use std::str::FromStr;

use crate::dispatch::{count_of, fields_then, list_or_empty, Node};
use crate::params::{Detect, Fallback, ItemContext};
use crate::schema::{NodeDescription, NodeProperty, OptionValue};

pub const DEFAULT_LIMIT: u32 = 50;
pub const MAX_LIMIT: u64 = 100;
pub const DEFAULT_MAX_FACTS: u32 = 10;
pub const MAX_FACTS: u64 = 50;

const QUERY: Detect = Detect::new(
    &["query", "search", "question", "prompt", "message"],
    Fallback::Required,
);
const NAME: Detect = Detect::new(&["name", "title", "subject", "episodeName"], Fallback::Required);
const CONTENT: Detect = Detect::new(
    &["content", "text", "data", "body", "information"],
    Fallback::Required,
);
const DESCRIPTION: Detect = Detect::new(
    &["description", "summary", "about", "details"],
    Fallback::Required,
);
const REFERENCE_TIME: Detect = Detect::new(
    &["referenceTime", "timestamp", "date", "time"],
    Fallback::Now,
);
const GROUP_ID: Detect = Detect::new(
    &["groupId", "sessionId", "conversationId"],
    Fallback::ExecutionScoped,
);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Operation {
    SearchKnowledge,
    AddKnowledge,
    GetMemory,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SearchKnowledge => "searchKnowledge",
            Self::AddKnowledge => "addKnowledge",
            Self::GetMemory => "getMemory",
        }
    }
}

impl FromStr for Operation {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "searchKnowledge" => Ok(Self::SearchKnowledge),
            "addKnowledge" => Ok(Self::AddKnowledge),
            "getMemory" => Ok(Self::GetMemory),
            other => Err(Error::unknown_operation(KnowledgeToolNode::NAME, other)),
        }
    }
}

pub struct KnowledgeToolNode {
    description: NodeDescription,
}

impl Default for KnowledgeToolNode {
    fn default() -> Self {
        Self::new()
    }
}

impl KnowledgeToolNode {
    pub const NAME: &'static str = "graphitiKnowledgeTool";

    pub fn new() -> Self {
        Self {
            description: describe(),
        }
    }
}

fn describe() -> NodeDescription {
    NodeDescription {
        display_name: "Graphiti Knowledge Tool",
        name: KnowledgeToolNode::NAME,
        icon: "fa:search",
        group: "AI",
        version: 1,
        subtitle: "={{$parameter[\"operation\"]}}",
        description: "Search and manage knowledge in a Graphiti knowledge graph: semantic search, new knowledge episodes and contextual memory",
        usable_as_tool: true,
        credentials: NodeDescription::graphiti_credentials(),
        properties: vec![
            NodeProperty::operation(
                vec![
                    OptionValue::operation(
                        "Search Knowledge",
                        "searchKnowledge",
                        "Perform semantic search over the knowledge graph",
                        "Search knowledge graph",
                    ),
                    OptionValue::operation(
                        "Add Knowledge",
                        "addKnowledge",
                        "Add new knowledge episode to the graph",
                        "Add knowledge to graph",
                    ),
                    OptionValue::operation(
                        "Get Memory",
                        "getMemory",
                        "Retrieve contextual memory based on messages",
                        "Get contextual memory",
                    ),
                ],
                "searchKnowledge",
            ),
            NodeProperty::string("query", "Query", "Natural language query to search for in the knowledge graph")
                .required()
                .detect(&QUERY)
                .show("operation", &["searchKnowledge"]),
            NodeProperty::options(
                "searchType",
                "Search Type",
                vec![
                    OptionValue::new("Edge (Relationships)", "edge"),
                    OptionValue::new("Node (Concepts)", "node"),
                ],
                "edge",
                "Edge finds relationships between concepts, node finds core concepts",
            )
            .show("operation", &["searchKnowledge"]),
            NodeProperty::string("centerNodeUuid", "Center Node UUID", "UUID of a node to focus edge searches around")
                .show("operation", &["searchKnowledge"])
                .show("searchType", &["edge"]),
            NodeProperty::number("limit", "Limit", DEFAULT_LIMIT as u64, "Maximum number of results (node search only)")
                .bounds(1, Some(MAX_LIMIT))
                .show("operation", &["searchKnowledge"])
                .show("searchType", &["node"]),
            NodeProperty::string("name", "Name", "Human-readable name for the knowledge episode")
                .required()
                .detect(&NAME)
                .show("operation", &["addKnowledge"]),
            NodeProperty::string("content", "Content", "The knowledge content, text or JSON")
                .required()
                .detect(&CONTENT)
                .show("operation", &["addKnowledge"]),
            NodeProperty::options(
                "contentType",
                "Content Type",
                vec![OptionValue::new("Text", "text"), OptionValue::new("JSON", "json")],
                "text",
                "Type of content being added",
            )
            .show("operation", &["addKnowledge"]),
            NodeProperty::string("description", "Description", "Brief summary of what this knowledge episode contains")
                .required()
                .detect(&DESCRIPTION)
                .show("operation", &["addKnowledge"]),
            NodeProperty::date_time("referenceTime", "Reference Time", "When this knowledge occurred (defaults to now)")
                .detect(&REFERENCE_TIME)
                .show("operation", &["addKnowledge"]),
            NodeProperty::string("groupId", "Group ID", "Group to retrieve memory from")
                .required()
                .detect(&GROUP_ID)
                .show("operation", &["getMemory"]),
            NodeProperty::number("maxFacts", "Max Facts", DEFAULT_MAX_FACTS as u64, "Maximum number of memory facts to retrieve")
                .bounds(1, Some(MAX_FACTS))
                .show("operation", &["getMemory"]),
            NodeProperty::string("centerNodeUuid", "Center Node UUID", "Optional UUID of a node to center memory retrieval around")
                .show("operation", &["getMemory"]),
            NodeProperty::messages("Messages to build the memory retrieval query from")
                .show("operation", &["getMemory"]),
        ],
    }
}

#[async_trait::async_trait]
impl Node for KnowledgeToolNode {
    fn description(&self) -> &NodeDescription {
        &self.description
    }

    async fn execute_item(&self, ctx: &ItemContext<'_>, operation: &str) -> Result<Value> {
        let op = operation.parse::<Operation>()?;
        let api = ctx.api();
        match op {
            Operation::SearchKnowledge => {
                let query = ctx.detect("query", &QUERY)?;
                let search_type = ctx.parse_or_default::<SearchType>("searchType")?;
                let params = SearchParams {
                    query: query.clone(),
                    search_type,
                    center_node_uuid: ctx.string_or("centerNodeUuid", "")?,
                    limit: ctx.u32_or("limit", DEFAULT_LIMIT)?,
                };
                let resp = api.search_episodes(&params).await?;
                Ok(fields_then(
                    json!({
                        "results": list_or_empty(&resp, "results"),
                        "query": query,
                        "searchType": search_type.as_str(),
                        "operation": op.as_str(),
                        "resultsCount": count_of(&resp, "results"),
                    }),
                    resp,
                ))
            }
            Operation::AddKnowledge => {
                let params = AddEpisodeParams {
                    name: ctx.detect("name", &NAME)?,
                    content: ctx.detect("content", &CONTENT)?,
                    episode_type: ctx.parse_or_default::<EpisodeType>("contentType")?,
                    description: ctx.detect("description", &DESCRIPTION)?,
                    reference_time: ctx.detect("referenceTime", &REFERENCE_TIME)?,
                };
                let resp = api.add_episode(&params).await?;
                Ok(fields_then(
                    json!({
                        "success": true,
                        "name": params.name,
                        "description": params.description,
                        "contentType": params.episode_type.as_str(),
                        "operation": op.as_str(),
                    }),
                    resp,
                ))
            }
            Operation::GetMemory => {
                let group_id = ctx.detect("groupId", &GROUP_ID)?;
                let center = ctx.string_or("centerNodeUuid", "")?;
                let params = GetMemoryParams {
                    group_id: group_id.clone(),
                    max_facts: Some(ctx.u32_or("maxFacts", DEFAULT_MAX_FACTS)?),
                    center_node_uuid: (!center.is_empty()).then_some(center),
                    messages: ctx.messages("messages")?,
                };
                let resp = api.get_memory(&params).await?;
                Ok(fields_then(
                    json!({
                        "memory": list_or_empty(&resp, "memory"),
                        "facts": list_or_empty(&resp, "facts"),
                        "groupId": group_id,
                        "operation": op.as_str(),
                        "factsCount": count_of(&resp, "facts"),
                    }),
                    resp,
                ))
            }
        }
    }

    fn error_record(&self, operation: &str, message: &str) -> Value {
        json!({ "error": message, "operation": operation, "success": false })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tool_schema_bounds() {
        let schema = KnowledgeToolNode::new().description().input_schema();
        let props = &schema["properties"];
        assert_eq!(props["limit"]["minimum"], 1);
        assert_eq!(props["limit"]["maximum"], 100);
        assert_eq!(props["limit"]["default"], 50);
        assert_eq!(props["maxFacts"]["minimum"], 1);
        assert_eq!(props["maxFacts"]["maximum"], 50);
        assert_eq!(props["maxFacts"]["default"], 10);
        assert_eq!(
            props["operation"]["enum"],
            json!(["searchKnowledge", "addKnowledge", "getMemory"])
        );
        assert_eq!(props["messages"]["type"], "array");
    }

    #[test]
    fn auto_detected_fields_declare_aliases() {
        let node = KnowledgeToolNode::new();
        let query = node
            .description()
            .properties
            .iter()
            .find(|p| p.name == "query")
            .unwrap();
        assert_eq!(query.auto_detect, QUERY.aliases);
        assert!(query.default.is_null());
    }
}
