//! Memory tool: the conversational memory operations an agent calls directly,
//! with wider input detection and tool-shaped output.

use kgflow_core::{AddMessagesParams, EntityNodeParams, Error, GetMemoryParams, Message, Result};
use serde_json::{json, Value};
use std::str::FromStr;

use super::memory::conversation_turn;
use crate::dispatch::{count_of, fields_then, list_or_empty, Node};
use crate::params::{epoch_millis, iso_now, Detect, Fallback, ItemContext};
use crate::schema::{NodeDescription, NodeProperty, OptionValue};

pub const DEFAULT_MAX_FACTS: u32 = 8;
pub const MAX_FACTS: u64 = 50;

const SESSION_ID: Detect = Detect::new(&["sessionId"], Fallback::ExecutionScoped);
const CURRENT_MESSAGE: Detect = Detect::new(
    &["message", "userInput", "input", "currentMessage"],
    Fallback::Required,
);
const USER_MESSAGE: Detect = Detect::new(
    &["userMessage", "userInput", "input", "message"],
    Fallback::Required,
);
const AI_RESPONSE: Detect = Detect::new(
    &["aiResponse", "output", "response", "assistantResponse"],
    Fallback::Required,
);
const USER_NAME: Detect = Detect::new(&["userName", "user", "name"], Fallback::Text("User"));
const AI_NAME: Detect = Detect::new(
    &["aiName", "assistantName", "botName"],
    Fallback::Text("Assistant"),
);
const ENTITY_NAME: Detect = Detect::new(&["entityName", "name", "title"], Fallback::Required);
const ENTITY_UUID: Detect = Detect::new(&["entityUuid", "uuid"], Fallback::Empty);
const ENTITY_SUMMARY: Detect = Detect::new(
    &["entitySummary", "entityDescription", "summary", "description"],
    Fallback::Empty,
);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Operation {
    RetrieveMemory,
    StoreConversation,
    StoreEntity,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::RetrieveMemory => "retrieveMemory",
            Self::StoreConversation => "storeConversation",
            Self::StoreEntity => "storeEntity",
        }
    }
}

impl FromStr for Operation {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "retrieveMemory" => Ok(Self::RetrieveMemory),
            "storeConversation" => Ok(Self::StoreConversation),
            "storeEntity" => Ok(Self::StoreEntity),
            other => Err(Error::unknown_operation(MemoryToolNode::NAME, other)),
        }
    }
}

pub struct MemoryToolNode {
    description: NodeDescription,
}

impl Default for MemoryToolNode {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryToolNode {
    pub const NAME: &'static str = "graphitiMemoryTool";

    pub fn new() -> Self {
        Self {
            description: describe(),
        }
    }
}

fn describe() -> NodeDescription {
    NodeDescription {
        display_name: "Graphiti AI Memory Tool",
        name: MemoryToolNode::NAME,
        icon: "fa:brain",
        group: "AI",
        version: 1,
        subtitle: "={{$parameter[\"operation\"]}}",
        description: "Conversational memory for AI agents: retrieve context, store conversation turns and entities",
        usable_as_tool: true,
        credentials: NodeDescription::graphiti_credentials(),
        properties: vec![
            NodeProperty::operation(
                vec![
                    OptionValue::operation(
                        "Retrieve Memory",
                        "retrieveMemory",
                        "Get context relevant to the current message",
                        "Retrieve relevant memory",
                    ),
                    OptionValue::operation(
                        "Store Conversation",
                        "storeConversation",
                        "Store a user message and the AI response",
                        "Store a conversation turn",
                    ),
                    OptionValue::operation(
                        "Store Entity",
                        "storeEntity",
                        "Store an important entity",
                        "Store an entity",
                    ),
                ],
                "retrieveMemory",
            ),
            NodeProperty::string("sessionId", "Session ID", "Conversation session (Graphiti group)")
                .detect(&SESSION_ID),
            NodeProperty::string("currentMessage", "Current Message", "Message to retrieve context for")
                .required()
                .detect(&CURRENT_MESSAGE)
                .show("operation", &["retrieveMemory"]),
            NodeProperty::number("maxFacts", "Max Context Facts", DEFAULT_MAX_FACTS as u64, "Maximum number of relevant memory facts to retrieve")
                .bounds(1, Some(MAX_FACTS))
                .show("operation", &["retrieveMemory"]),
            NodeProperty::string("centerNodeUuid", "Focus Entity UUID", "Optional entity to focus retrieval around")
                .show("operation", &["retrieveMemory"]),
            NodeProperty::string("userMessage", "User Message", "The user's message")
                .required()
                .detect(&USER_MESSAGE)
                .show("operation", &["storeConversation"]),
            NodeProperty::string("aiResponse", "AI Response", "The AI's response")
                .required()
                .detect(&AI_RESPONSE)
                .show("operation", &["storeConversation"]),
            NodeProperty::string("userName", "User Name", "Role name for the user message")
                .detect(&USER_NAME)
                .show("operation", &["storeConversation"]),
            NodeProperty::string("aiName", "AI Name", "Role name for the AI message")
                .detect(&AI_NAME)
                .show("operation", &["storeConversation"]),
            NodeProperty::string("entityName", "Entity Name", "Name of the entity")
                .required()
                .detect(&ENTITY_NAME)
                .show("operation", &["storeEntity"]),
            NodeProperty::string("entityUuid", "Entity UUID", "Entity UUID (generated from the session when empty)")
                .detect(&ENTITY_UUID)
                .show("operation", &["storeEntity"]),
            NodeProperty::string("entitySummary", "Entity Summary", "Summary of the entity")
                .detect(&ENTITY_SUMMARY)
                .show("operation", &["storeEntity"]),
        ],
    }
}

#[async_trait::async_trait]
impl Node for MemoryToolNode {
    fn description(&self) -> &NodeDescription {
        &self.description
    }

    async fn execute_item(&self, ctx: &ItemContext<'_>, operation: &str) -> Result<Value> {
        let op = operation.parse::<Operation>()?;
        let session_id = ctx.detect("sessionId", &SESSION_ID)?;
        let api = ctx.api();
        match op {
            Operation::RetrieveMemory => {
                let current = ctx.detect("currentMessage", &CURRENT_MESSAGE)?;
                let center = ctx.string_or("centerNodeUuid", "")?;
                let resp = api
                    .get_memory(&GetMemoryParams {
                        group_id: session_id.clone(),
                        max_facts: Some(ctx.u32_or("maxFacts", DEFAULT_MAX_FACTS)?),
                        center_node_uuid: (!center.is_empty()).then_some(center),
                        messages: vec![Message::user(current.clone())
                            .role("User")
                            .timestamp(iso_now())],
                    })
                    .await?;
                Ok(json!({
                    "context": list_or_empty(&resp, "memory"),
                    "facts": list_or_empty(&resp, "facts"),
                    "sessionId": session_id,
                    "currentMessage": current,
                    "operation": op.as_str(),
                    "contextRetrieved": true,
                    "factsCount": count_of(&resp, "facts"),
                }))
            }
            Operation::StoreConversation => {
                let user_message = ctx.detect("userMessage", &USER_MESSAGE)?;
                let ai_response = ctx.detect("aiResponse", &AI_RESPONSE)?;
                let user_name = ctx.detect("userName", &USER_NAME)?;
                let ai_name = ctx.detect("aiName", &AI_NAME)?;
                let timestamp = iso_now();
                let resp = api
                    .add_messages(&AddMessagesParams {
                        group_id: session_id.clone(),
                        messages: conversation_turn(
                            &user_message,
                            &ai_response,
                            &user_name,
                            &ai_name,
                            &timestamp,
                        ),
                    })
                    .await?;
                Ok(fields_then(
                    json!({
                        "success": true,
                        "sessionId": session_id,
                        "userMessage": user_message,
                        "aiResponse": ai_response,
                        "operation": op.as_str(),
                        "messagesStored": 2,
                        "timestamp": timestamp,
                    }),
                    resp,
                ))
            }
            Operation::StoreEntity => {
                let entity_name = ctx.detect("entityName", &ENTITY_NAME)?;
                let mut entity_uuid = ctx.detect("entityUuid", &ENTITY_UUID)?;
                if entity_uuid.is_empty() {
                    entity_uuid = format!("{}_entity_{}", session_id, epoch_millis());
                }
                let entity_summary = ctx.detect("entitySummary", &ENTITY_SUMMARY)?;
                let resp = api
                    .add_entity_node(&EntityNodeParams {
                        uuid: entity_uuid.clone(),
                        group_id: session_id.clone(),
                        name: entity_name.clone(),
                        summary: entity_summary.clone(),
                    })
                    .await?;
                Ok(fields_then(
                    json!({
                        "success": true,
                        "sessionId": session_id,
                        "entityName": entity_name,
                        "entityUuid": entity_uuid,
                        "entitySummary": entity_summary,
                        "operation": op.as_str(),
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
