//! Tests for kgflow-nodes: adapters driven by a recording host

use kgflow_api::{Host, HttpMethod, HttpRequest, Transport};
use kgflow_core::*;
use kgflow_nodes::*;
use serde_json::{json, Map, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

struct FakeHost {
    items: Vec<Value>,
    parameters: Map<String, Value>,
    continue_on_fail: bool,
    requests: Mutex<Vec<HttpRequest>>,
    /// Requests with this index (0-based) fail with "network down".
    fail_at: Option<usize>,
    reply: Value,
    calls: AtomicUsize,
}

impl FakeHost {
    fn new(items: Vec<Value>) -> Self {
        Self {
            items,
            parameters: Map::new(),
            continue_on_fail: false,
            requests: Mutex::new(Vec::new()),
            fail_at: None,
            reply: json!({}),
            calls: AtomicUsize::new(0),
        }
    }

    fn param(mut self, name: &str, value: Value) -> Self {
        self.parameters.insert(name.to_string(), value);
        self
    }

    fn reply(mut self, reply: Value) -> Self {
        self.reply = reply;
        self
    }

    fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().clone()
    }

    fn body(&self, i: usize) -> Value {
        self.requests()[i].body.clone().unwrap()
    }
}

#[async_trait::async_trait]
impl Host for FakeHost {
    fn input_items(&self) -> &[Value] {
        &self.items
    }

    fn get_parameter(&self, name: &str, _: usize, default: Option<Value>) -> Result<Value> {
        match self.parameters.get(name) {
            Some(v) => Ok(v.clone()),
            None => default.ok_or_else(|| Error::missing(name)),
        }
    }

    async fn get_credentials(&self, _: &str) -> Result<Credentials> {
        Ok(Credentials::new("http://localhost:8000"))
    }

    async fn http_request(&self, request: HttpRequest) -> Result<Value> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().unwrap().push(request);
        if self.fail_at == Some(n) {
            return Err(Error::network("network down"));
        }
        Ok(self.reply.clone())
    }

    fn continue_on_fail(&self) -> bool {
        self.continue_on_fail
    }

    fn workflow_id(&self) -> &str {
        "wf"
    }

    fn execution_id(&self) -> &str {
        "ex"
    }
}

// ===========================================================================
// Direct node
// ===========================================================================

#[tokio::test]
async fn add_episode_with_blank_reference_time() {
    let host = FakeHost::new(vec![json!({})])
        .param("operation", json!("addEpisode"))
        .param("name", json!("n"))
        .param("content", json!("c"))
        .param("type", json!("text"))
        .param("description", json!("d"))
        .param("referenceTime", json!(""))
        .reply(json!({"uuid": "ep"}));
    let out = execute(&GraphitiNode::new(), &host).await.unwrap();
    assert_eq!(out, vec![json!({"uuid": "ep"})]);

    let req = &host.requests()[0];
    assert_eq!(req.method, HttpMethod::Post);
    assert_eq!(req.url, "http://localhost:8000/episodes/");
    assert_eq!(
        req.body,
        Some(json!({"name": "n", "content": "c", "type": "text", "description": "d"}))
    );
}

#[tokio::test]
async fn search_limit_only_for_node_search() {
    let host = FakeHost::new(vec![json!({})])
        .param("operation", json!("searchEpisodes"))
        .param("query", json!("q"))
        .param("searchType", json!("edge"))
        .param("limit", json!(7));
    execute(&GraphitiNode::new(), &host).await.unwrap();
    assert!(host.body(0).get("limit").is_none());

    let host = FakeHost::new(vec![json!({})])
        .param("operation", json!("searchEpisodes"))
        .param("query", json!("q"))
        .param("searchType", json!("node"))
        .param("limit", json!(7));
    execute(&GraphitiNode::new(), &host).await.unwrap();
    assert_eq!(host.body(0)["limit"], 7);
}

#[tokio::test]
async fn get_episodes_url() {
    let host = FakeHost::new(vec![json!({})])
        .param("operation", json!("getEpisodes"))
        .param("group_id", json!("g1"))
        .param("last_n", json!(5))
        .reply(json!([]));
    let out = execute(&GraphitiNode::new(), &host).await.unwrap();
    assert_eq!(out, vec![json!([])]);
    let req = &host.requests()[0];
    assert_eq!(req.method, HttpMethod::Get);
    assert_eq!(req.url, "http://localhost:8000/episodes/g1?last_n=5");
}

#[tokio::test]
async fn get_memory_defaults_max_facts() {
    let host = FakeHost::new(vec![json!({})])
        .param("operation", json!("getMemory"))
        .param("group_id", json!("g"))
        .param(
            "messages",
            json!({"message": [{"content": "hi", "role_type": "user"}]}),
        );
    execute(&GraphitiNode::new(), &host).await.unwrap();
    let body = host.body(0);
    assert_eq!(body["max_facts"], 10);
    assert_eq!(body["center_node_uuid"], Value::Null);
    assert_eq!(body["messages"][0]["content"], "hi");
}

#[tokio::test]
async fn add_entity_node_generates_uuid() {
    let host = FakeHost::new(vec![json!({})])
        .param("operation", json!("addEntityNode"))
        .param("group_id", json!("g"))
        .param("name", json!("Alice"));
    execute(&GraphitiNode::new(), &host).await.unwrap();
    let body = host.body(0);
    let uuid = body["uuid"].as_str().unwrap();
    assert_eq!(uuid.len(), 36);
    assert_eq!(body["summary"], "");
    assert_eq!(body["name"], "Alice");
}

#[tokio::test]
async fn add_entity_node_keeps_given_uuid_and_summary() {
    let host = FakeHost::new(vec![json!({})])
        .param("operation", json!("addEntityNode"))
        .param("uuid", json!("e-1"))
        .param("group_id", json!("g"))
        .param("name", json!("Alice"))
        .param("summary", json!("a person"))
        .reply(json!({"uuid": "e-1"}));
    let out = execute(&GraphitiNode::new(), &host).await.unwrap();
    assert_eq!(out, vec![json!({"uuid": "e-1"})]);
    assert_eq!(host.requests()[0].url, "http://localhost:8000/entity-node");
    assert_eq!(
        host.body(0),
        json!({"uuid": "e-1", "group_id": "g", "name": "Alice", "summary": "a person"})
    );
}

#[tokio::test]
async fn unknown_operation_is_rejected_before_requests() {
    let host = FakeHost::new(vec![json!({})]).param("operation", json!("explode"));
    let err = execute(&GraphitiNode::new(), &host).await.unwrap_err();
    assert!(matches!(err, Error::UnknownOperation { .. }));
    assert!(host.requests().is_empty());
}

#[tokio::test]
async fn zero_items_produce_zero_records() {
    let host = FakeHost::new(vec![]).param("operation", json!("healthcheck"));
    let out = execute(&GraphitiNode::new(), &host).await.unwrap();
    assert!(out.is_empty());
    assert!(host.requests().is_empty());
}

// ===========================================================================
// Failure policy
// ===========================================================================

#[tokio::test]
async fn continue_on_fail_records_error_and_keeps_going() {
    let mut host = FakeHost::new(vec![json!({}), json!({}), json!({})])
        .param("operation", json!("healthcheck"))
        .reply(json!({"status": "healthy"}));
    host.continue_on_fail = true;
    host.fail_at = Some(1);
    let out = execute(&GraphitiNode::new(), &host).await.unwrap();
    assert_eq!(out.len(), 3);
    assert_eq!(out[0], json!({"status": "healthy"}));
    assert_eq!(
        out[1],
        json!({"error": "network down", "operation": "healthcheck"})
    );
    assert_eq!(out[2], json!({"status": "healthy"}));
    assert_eq!(host.requests().len(), 3);
}

#[tokio::test]
async fn tool_error_record_has_success_false() {
    let mut host = FakeHost::new(vec![json!({"query": "q"})])
        .param("operation", json!("searchKnowledge"));
    host.continue_on_fail = true;
    host.fail_at = Some(0);
    let out = execute(&KnowledgeToolNode::new(), &host).await.unwrap();
    assert_eq!(
        out[0],
        json!({"error": "network down", "operation": "searchKnowledge", "success": false})
    );
}

#[tokio::test]
async fn failure_aborts_remaining_items() {
    let mut host = FakeHost::new(vec![json!({}), json!({}), json!({})])
        .param("operation", json!("clearData"));
    host.fail_at = Some(0);
    let err = execute(&GraphitiNode::new(), &host).await.unwrap_err();
    assert_eq!(err.to_string(), "graphiti: network down");
    assert_eq!(host.requests().len(), 1);
}

#[tokio::test]
async fn missing_required_parameter_fails_item() {
    let host = FakeHost::new(vec![json!({})]).param("operation", json!("deleteEpisode"));
    let err = execute(&GraphitiNode::new(), &host).await.unwrap_err();
    assert!(err.to_string().contains("uuid"));
    assert!(host.requests().is_empty());
}

// ===========================================================================
// Knowledge tool
// ===========================================================================

#[tokio::test]
async fn query_detected_from_aliases() {
    let host = FakeHost::new(vec![json!({"search": "", "question": "who?", "prompt": "p"})])
        .param("operation", json!("searchKnowledge"))
        .reply(json!({"results": [{"fact": "a"}, {"fact": "b"}]}));
    let out = execute(&KnowledgeToolNode::new(), &host).await.unwrap();
    assert_eq!(host.body(0)["query"], "who?");
    assert!(host.body(0).get("limit").is_none());
    assert_eq!(out[0]["query"], "who?");
    assert_eq!(out[0]["searchType"], "edge");
    assert_eq!(out[0]["resultsCount"], 2);
    assert_eq!(out[0]["operation"], "searchKnowledge");
}

#[tokio::test]
async fn explicit_parameter_beats_aliases() {
    let host = FakeHost::new(vec![json!({"query": "from item"})])
        .param("operation", json!("searchKnowledge"))
        .param("query", json!("configured"))
        .param("searchType", json!("node"));
    execute(&KnowledgeToolNode::new(), &host).await.unwrap();
    let body = host.body(0);
    assert_eq!(body["query"], "configured");
    assert_eq!(body["limit"], 50);
}

#[tokio::test]
async fn add_knowledge_defaults_reference_time_to_now() {
    let host = FakeHost::new(vec![json!({
        "title": "T", "text": "body", "summary": "S"
    })])
    .param("operation", json!("addKnowledge"))
    .reply(json!({"uuid": "ep"}));
    let out = execute(&KnowledgeToolNode::new(), &host).await.unwrap();
    let body = host.body(0);
    assert_eq!(body["name"], "T");
    assert_eq!(body["content"], "body");
    assert_eq!(body["description"], "S");
    assert_eq!(body["type"], "text");
    let ts = body["reference_time"].as_str().unwrap();
    assert!(ts.ends_with('Z'));
    assert_eq!(
        out[0],
        json!({
            "success": true, "name": "T", "description": "S",
            "contentType": "text", "operation": "addKnowledge", "uuid": "ep"
        })
    );
}

#[tokio::test]
async fn group_id_falls_back_to_execution() {
    let host = FakeHost::new(vec![json!({})])
        .param("operation", json!("getMemory"))
        .reply(json!({"facts": [{"fact": "x"}]}));
    let out = execute(&KnowledgeToolNode::new(), &host).await.unwrap();
    assert_eq!(host.body(0)["group_id"], "wf_ex");
    assert_eq!(host.body(0)["max_facts"], 10);
    assert_eq!(out[0]["groupId"], "wf_ex");
    assert_eq!(out[0]["memory"], json!([]));
    assert_eq!(out[0]["factsCount"], 1);
}

#[tokio::test]
async fn response_overrides_fields_listed_before_it() {
    let host = FakeHost::new(vec![json!({"query": "q"})])
        .param("operation", json!("searchKnowledge"))
        .reply(json!({"query": "rewritten", "results": []}));
    let out = execute(&KnowledgeToolNode::new(), &host).await.unwrap();
    assert_eq!(out[0]["query"], "rewritten");
}

// ===========================================================================
// Memory node
// ===========================================================================

#[tokio::test]
async fn store_conversation_sends_two_messages() {
    let host = FakeHost::new(vec![json!({"userInput": "hello", "output": "hi there"})])
        .param("operation", json!("storeConversation"))
        .reply(json!({"message": "Messages added"}));
    let out = execute(&MemoryNode::new(), &host).await.unwrap();

    let body = host.body(0);
    assert_eq!(host.requests()[0].url, "http://localhost:8000/messages");
    assert_eq!(body["group_id"], "wf_ex");
    let msgs = body["messages"].as_array().unwrap();
    assert_eq!(msgs.len(), 2);
    assert_eq!(msgs[0]["role_type"], "user");
    assert_eq!(msgs[0]["role"], "User");
    assert_eq!(msgs[0]["content"], "hello");
    assert_eq!(msgs[1]["role_type"], "assistant");
    assert_eq!(msgs[1]["role"], "Assistant");
    assert_eq!(msgs[1]["content"], "hi there");
    assert_eq!(msgs[0]["timestamp"], msgs[1]["timestamp"]);
    assert_eq!(msgs[0]["source_description"], "User input in AI conversation");

    assert_eq!(out[0]["messagesStored"], 2);
    assert_eq!(out[0]["message"], "Messages added");
    assert_eq!(out[0]["operation"], "storeConversation");
}

#[tokio::test]
async fn retrieve_memory_is_default_operation() {
    let host = FakeHost::new(vec![json!({"sessionId": "s1", "input": "what now"})])
        .reply(json!({"facts": [], "operation": "server"}));
    let out = execute(&MemoryNode::new(), &host).await.unwrap();
    let body = host.body(0);
    assert_eq!(host.requests()[0].url, "http://localhost:8000/get-memory");
    assert_eq!(body["group_id"], "s1");
    assert_eq!(body["max_facts"], 8);
    assert_eq!(body["messages"][0]["content"], "what now");
    assert_eq!(body["messages"][0]["role"], "User");
    assert_eq!(out[0]["operation"], "retrieveMemory");
    assert_eq!(out[0]["contextRetrieved"], true);
}

#[tokio::test]
async fn initialize_session_emits_system_message() {
    let host = FakeHost::new(vec![json!({"sessionId": "s1", "userName": "Ann"})])
        .param("operation", json!("initializeSession"))
        .param("sessionName", json!("Planning"));
    let out = execute(&MemoryNode::new(), &host).await.unwrap();
    let msg = &host.body(0)["messages"][0];
    assert_eq!(msg["role_type"], "system");
    assert_eq!(msg["name"], "session_init");
    assert_eq!(msg["content"], "New conversation session started: Planning");
    assert_eq!(msg["source_description"], "Session initialization for Ann");
    assert_eq!(out[0]["message"], "Session initialized successfully");
    assert_eq!(out[0]["userName"], "Ann");
}

#[tokio::test]
async fn initialize_session_dates_a_blank_name() {
    let host = FakeHost::new(vec![json!({"sessionId": "s1"})])
        .param("operation", json!("initializeSession"))
        .param("sessionName", json!(""));
    let out = execute(&MemoryNode::new(), &host).await.unwrap();
    let name = out[0]["sessionName"].as_str().unwrap();
    assert!(name.starts_with("AI Conversation 20"));
    assert!(!name.contains("{{"));
    assert_eq!(
        host.body(0)["messages"][0]["content"],
        format!("New conversation session started: {}", name)
    );
}

#[tokio::test]
async fn session_history_uses_recent_count() {
    let host = FakeHost::new(vec![json!({"sessionId": "s1"})])
        .param("operation", json!("getSessionHistory"))
        .reply(json!([{"uuid": "e1"}]));
    let out = execute(&MemoryNode::new(), &host).await.unwrap();
    assert_eq!(
        host.requests()[0].url,
        "http://localhost:8000/episodes/s1?last_n=20"
    );
    assert_eq!(out[0]["data"], json!([{"uuid": "e1"}]));
    assert_eq!(out[0]["recentCount"], 20);
}

#[tokio::test]
async fn store_entity_uuid_from_workflow() {
    let host = FakeHost::new(vec![json!({"entityName": "Acme"})])
        .param("operation", json!("storeEntity"));
    let out = execute(&MemoryNode::new(), &host).await.unwrap();
    let uuid = out[0]["entityUuid"].as_str().unwrap();
    assert!(uuid.starts_with("wf_entity_"));
    assert_eq!(host.body(0)["uuid"], uuid);
    assert_eq!(host.body(0)["summary"], "");
}

// ===========================================================================
// Memory tool
// ===========================================================================

#[tokio::test]
async fn memory_tool_retrieve_does_not_spread_response() {
    let host = FakeHost::new(vec![json!({"currentMessage": "ctx?"})])
        .param("operation", json!("retrieveMemory"))
        .reply(json!({"memory": [{"m": 1}], "facts": [{"f": 1}], "extra": true}));
    let out = execute(&MemoryToolNode::new(), &host).await.unwrap();
    assert_eq!(out[0]["context"], json!([{"m": 1}]));
    assert_eq!(out[0]["factsCount"], 1);
    assert_eq!(out[0]["currentMessage"], "ctx?");
    assert!(out[0].get("extra").is_none());
}

#[tokio::test]
async fn memory_tool_session_defaults_to_execution() {
    let host = FakeHost::new(vec![json!({"currentMessage": "ctx?"})])
        .param("operation", json!("retrieveMemory"))
        .reply(json!({"facts": []}));
    execute(&MemoryToolNode::new(), &host).await.unwrap();
    assert_eq!(host.body(0)["group_id"], "wf_ex");

    let required = MemoryToolNode::new().description().input_schema()["required"].clone();
    assert!(!required.as_array().unwrap().contains(&json!("sessionId")));
}

#[tokio::test]
async fn memory_tool_entity_uuid_from_session() {
    let host = FakeHost::new(vec![json!({"sessionId": "s9", "title": "Acme", "description": "a company"})])
        .param("operation", json!("storeEntity"));
    let out = execute(&MemoryToolNode::new(), &host).await.unwrap();
    assert!(out[0]["entityUuid"].as_str().unwrap().starts_with("s9_entity_"));
    assert_eq!(out[0]["entityName"], "Acme");
    assert_eq!(out[0]["entitySummary"], "a company");
    assert_eq!(out[0]["success"], true);
}

#[tokio::test]
async fn memory_tool_store_conversation_reports_timestamp() {
    let host = FakeHost::new(vec![json!({"message": "hey", "assistantResponse": "yo", "botName": "Bot"})])
        .param("operation", json!("storeConversation"));
    let out = execute(&MemoryToolNode::new(), &host).await.unwrap();
    let msgs = host.body(0)["messages"].clone();
    assert_eq!(msgs[0]["content"], "hey");
    assert_eq!(msgs[1]["role"], "Bot");
    assert_eq!(out[0]["timestamp"], msgs[0]["timestamp"]);
}

// ===========================================================================
// Registry and tool invocation
// ===========================================================================

struct CannedTransport {
    requests: Mutex<Vec<HttpRequest>>,
}

#[async_trait::async_trait]
impl Transport for CannedTransport {
    async fn send(&self, request: HttpRequest) -> Result<Value> {
        self.requests.lock().unwrap().push(request);
        Ok(json!({"results": []}))
    }
}

#[test]
fn registry_lists_all_adapters() {
    let registry = default_registry();
    assert_eq!(
        registry.list(),
        ["graphiti", "graphitiKnowledgeTool", "graphitiMemory", "graphitiMemoryTool"]
    );
    let tools: Vec<_> = registry
        .tool_definitions()
        .into_iter()
        .map(|d| d.name)
        .collect();
    assert_eq!(tools, ["graphitiKnowledgeTool", "graphitiMemoryTool"]);
    assert!(registry.require("nope").is_err());
}

#[tokio::test]
async fn tool_invocation_rejects_unknown_keys() {
    let transport = Arc::new(CannedTransport {
        requests: Mutex::new(Vec::new()),
    });
    let runner = ToolRunner::new(transport.clone())
        .credentials(CREDENTIALS_NAME, Credentials::new("http://localhost:8000"));
    let node = KnowledgeToolNode::new();

    let bad = runner
        .invoke(&node, json!({"operation": "searchKnowledge", "query": "q", "bogus": 1}))
        .await;
    assert!(bad.is_error());
    assert!(bad.to_content_string().contains("bogus"));
    assert!(transport.requests.lock().unwrap().is_empty());

    let ok = runner
        .invoke(&node, json!({"operation": "searchKnowledge", "query": "q"}))
        .await;
    assert!(!ok.is_error());
    assert_eq!(transport.requests.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn direct_node_is_not_a_tool() {
    let runner = ToolRunner::new(Arc::new(CannedTransport {
        requests: Mutex::new(Vec::new()),
    }));
    let result = runner
        .invoke(&GraphitiNode::new(), json!({"operation": "healthcheck"}))
        .await;
    assert!(result.is_error());
}
