//! Conversational memory node: sessions map to Graphiti groups.

use chrono::Utc;
use kgflow_core::{
    AddMessagesParams, EntityNodeParams, Error, GetEpisodesParams, GetMemoryParams, Message,
    Result,
};
use serde_json::{json, Value};
use std::str::FromStr;

use crate::dispatch::{response_then, Node};
use crate::params::{epoch_millis, iso_now, Detect, Fallback, ItemContext};
use crate::schema::{NodeDescription, NodeProperty, OptionValue};

const DEFAULT_MAX_FACTS: u32 = 8;
const MAX_FACTS: u64 = 50;
const DEFAULT_RECENT_COUNT: u32 = 20;
const MAX_RECENT_COUNT: u64 = 100;

const SESSION_ID: Detect = Detect::new(&["sessionId"], Fallback::ExecutionScoped);
const USER_NAME: Detect = Detect::new(&["userName"], Fallback::Text("User"));
const AI_NAME: Detect = Detect::new(&["aiName"], Fallback::Text("Assistant"));
const CURRENT_MESSAGE: Detect = Detect::new(&["message", "userInput", "input"], Fallback::Required);
const USER_MESSAGE: Detect = Detect::new(&["userMessage", "userInput", "input"], Fallback::Required);
const AI_RESPONSE: Detect = Detect::new(&["aiResponse", "output", "response"], Fallback::Required);
const ENTITY_NAME: Detect = Detect::new(&["entityName"], Fallback::Required);
const ENTITY_UUID: Detect = Detect::new(&["entityUuid"], Fallback::Empty);
const ENTITY_SUMMARY: Detect = Detect::new(&["entitySummary", "entityDescription"], Fallback::Empty);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Operation {
    InitializeSession,
    RetrieveMemory,
    StoreConversation,
    GetSessionHistory,
    StoreEntity,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InitializeSession => "initializeSession",
            Self::RetrieveMemory => "retrieveMemory",
            Self::StoreConversation => "storeConversation",
            Self::GetSessionHistory => "getSessionHistory",
            Self::StoreEntity => "storeEntity",
        }
    }
}

impl FromStr for Operation {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "initializeSession" => Ok(Self::InitializeSession),
            "retrieveMemory" => Ok(Self::RetrieveMemory),
            "storeConversation" => Ok(Self::StoreConversation),
            "getSessionHistory" => Ok(Self::GetSessionHistory),
            "storeEntity" => Ok(Self::StoreEntity),
            other => Err(Error::unknown_operation(MemoryNode::NAME, other)),
        }
    }
}

pub struct MemoryNode {
    description: NodeDescription,
}

impl Default for MemoryNode {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryNode {
    pub const NAME: &'static str = "graphitiMemory";

    pub fn new() -> Self {
        Self {
            description: describe(),
        }
    }
}

fn default_session_name() -> String {
    format!("AI Conversation {}", Utc::now().format("%Y-%m-%d"))
}

fn describe() -> NodeDescription {
    NodeDescription {
        display_name: "Graphiti AI Memory",
        name: MemoryNode::NAME,
        icon: "file:node-icon.svg",
        group: "transform",
        version: 1,
        subtitle: "={{$parameter[\"operation\"]}}",
        description: "Persistent conversational memory for AI agents backed by Graphiti",
        usable_as_tool: false,
        credentials: NodeDescription::graphiti_credentials(),
        properties: vec![
            NodeProperty::operation(
                vec![
                    OptionValue::operation(
                        "Initialize Session",
                        "initializeSession",
                        "Start a new conversation session",
                        "Initialize a conversation session",
                    ),
                    OptionValue::operation(
                        "Retrieve Memory",
                        "retrieveMemory",
                        "Get memory relevant to the current message",
                        "Retrieve relevant memory",
                    ),
                    OptionValue::operation(
                        "Store Conversation",
                        "storeConversation",
                        "Store a user message and the AI response",
                        "Store a conversation turn",
                    ),
                    OptionValue::operation(
                        "Get Session History",
                        "getSessionHistory",
                        "Get the most recent episodes of the session",
                        "Get session history",
                    ),
                    OptionValue::operation(
                        "Store Entity",
                        "storeEntity",
                        "Store an entity mentioned in the conversation",
                        "Store an entity",
                    ),
                ],
                "retrieveMemory",
            ),
            NodeProperty::string("sessionId", "Session ID", "Conversation session (Graphiti group)")
                .required()
                .detect(&SESSION_ID),
            NodeProperty::string("sessionName", "Session Name", "Human-readable session name (dated when empty)")
                .show("operation", &["initializeSession"]),
            NodeProperty::string("userName", "User Name", "Name of the user in this session")
                .detect(&USER_NAME)
                .show("operation", &["initializeSession"]),
            NodeProperty::string("currentMessage", "Current Message", "Message to retrieve memory for")
                .required()
                .detect(&CURRENT_MESSAGE)
                .show("operation", &["retrieveMemory"]),
            NodeProperty::number("maxFacts", "Max Facts", DEFAULT_MAX_FACTS as u64, "Maximum number of facts to retrieve")
                .bounds(1, Some(MAX_FACTS))
                .show("operation", &["retrieveMemory"]),
            NodeProperty::string("centerNodeUuid", "Center Node UUID", "Optional node to center retrieval around")
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
            NodeProperty::number("recentCount", "Recent Count", DEFAULT_RECENT_COUNT as u64, "Number of recent episodes to return")
                .bounds(1, Some(MAX_RECENT_COUNT))
                .show("operation", &["getSessionHistory"]),
            NodeProperty::string("entityName", "Entity Name", "Name of the entity")
                .required()
                .detect(&ENTITY_NAME)
                .show("operation", &["storeEntity"]),
            NodeProperty::string("entityUuid", "Entity UUID", "Entity UUID (generated when empty)")
                .detect(&ENTITY_UUID)
                .show("operation", &["storeEntity"]),
            NodeProperty::string("entitySummary", "Entity Summary", "Summary of the entity")
                .detect(&ENTITY_SUMMARY)
                .show("operation", &["storeEntity"]),
        ],
    }
}

#[async_trait::async_trait]
impl Node for MemoryNode {
    fn description(&self) -> &NodeDescription {
        &self.description
    }

    async fn execute_item(&self, ctx: &ItemContext<'_>, operation: &str) -> Result<Value> {
        let op = operation.parse::<Operation>()?;
        let session_id = ctx.detect("sessionId", &SESSION_ID)?;
        let api = ctx.api();
        match op {
            Operation::InitializeSession => {
                let session_name = ctx.string_or("sessionName", &default_session_name())?;
                let user_name = ctx.detect("userName", &USER_NAME)?;
                let init = Message::system(format!(
                    "New conversation session started: {}",
                    session_name
                ))
                .role("System")
                .name("session_init")
                .timestamp(iso_now())
                .source_description(format!("Session initialization for {}", user_name));
                let resp = api
                    .add_messages(&AddMessagesParams {
                        group_id: session_id.clone(),
                        messages: vec![init],
                    })
                    .await?;
                Ok(response_then(
                    resp,
                    json!({
                        "sessionId": session_id,
                        "sessionName": session_name,
                        "userName": user_name,
                        "operation": op.as_str(),
                        "message": "Session initialized successfully",
                    }),
                ))
            }
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
                Ok(response_then(
                    resp,
                    json!({
                        "sessionId": session_id,
                        "currentMessage": current,
                        "operation": op.as_str(),
                        "contextRetrieved": true,
                    }),
                ))
            }
            Operation::StoreConversation => {
                let user_message = ctx.detect("userMessage", &USER_MESSAGE)?;
                let ai_response = ctx.detect("aiResponse", &AI_RESPONSE)?;
                let user_name = ctx.detect("userName", &USER_NAME)?;
                let ai_name = ctx.detect("aiName", &AI_NAME)?;
                let resp = api
                    .add_messages(&AddMessagesParams {
                        group_id: session_id.clone(),
                        messages: conversation_turn(
                            &user_message,
                            &ai_response,
                            &user_name,
                            &ai_name,
                            &iso_now(),
                        ),
                    })
                    .await?;
                Ok(response_then(
                    resp,
                    json!({
                        "sessionId": session_id,
                        "userMessage": user_message,
                        "aiResponse": ai_response,
                        "operation": op.as_str(),
                        "messagesStored": 2,
                    }),
                ))
            }
            Operation::GetSessionHistory => {
                let recent_count = ctx.u32_or("recentCount", DEFAULT_RECENT_COUNT)?;
                let resp = api
                    .get_episodes(&GetEpisodesParams {
                        group_id: session_id.clone(),
                        last_n: recent_count,
                    })
                    .await?;
                Ok(response_then(
                    resp,
                    json!({
                        "sessionId": session_id,
                        "operation": op.as_str(),
                        "recentCount": recent_count,
                    }),
                ))
            }
            Operation::StoreEntity => {
                let entity_name = ctx.detect("entityName", &ENTITY_NAME)?;
                let mut entity_uuid = ctx.detect("entityUuid", &ENTITY_UUID)?;
                if entity_uuid.is_empty() {
                    entity_uuid = format!("{}_entity_{}", ctx.host().workflow_id(), epoch_millis());
                }
                let resp = api
                    .add_entity_node(&EntityNodeParams {
                        uuid: entity_uuid.clone(),
                        group_id: session_id.clone(),
                        name: entity_name.clone(),
                        summary: ctx.detect("entitySummary", &ENTITY_SUMMARY)?,
                    })
                    .await?;
                Ok(response_then(
                    resp,
                    json!({
                        "sessionId": session_id,
                        "entityName": entity_name,
                        "entityUuid": entity_uuid,
                        "operation": op.as_str(),
                    }),
                ))
            }
        }
    }
}

/// User message then AI response, stamped with one shared timestamp.
pub(crate) fn conversation_turn(
    user_message: &str,
    ai_response: &str,
    user_name: &str,
    ai_name: &str,
    timestamp: &str,
) -> Vec<Message> {
    vec![
        Message::user(user_message)
            .role(user_name)
            .timestamp(timestamp)
            .source_description("User input in AI conversation"),
        Message::assistant(ai_response)
            .role(ai_name)
            .timestamp(timestamp)
            .source_description("AI response in conversation"),
    ]
}
