//! Tool invocation: run a tool-capable node with one JSON argument object.
//!
//! The argument object is both the single input item and the parameter
//! set, so auto-detected fields see the same keys either way.

use kgflow_api::Transport;
use kgflow_core::{Credentials, Error, KgflowConfig, Result};
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::debug;

use crate::dispatch::{execute, Node};
use crate::local::LocalHost;

#[derive(Clone, Debug)]
pub enum ToolResult {
    Json(Value),
    Error(String),
}

impl ToolResult {
    pub fn error(s: impl Into<String>) -> Self {
        Self::Error(s.into())
    }

    pub fn to_content_string(&self) -> String {
        match self {
            Self::Json(v) => serde_json::to_string_pretty(v).unwrap_or_default(),
            Self::Error(e) => format!("Error: {}", e),
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error(_))
    }
}

/// What an agent framework needs to offer a node as a tool.
#[derive(Clone, Debug, Serialize)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    pub input_schema: Value,
}

impl ToolDefinition {
    pub fn of(node: &dyn Node) -> Self {
        let desc = node.description();
        Self {
            name: desc.name.to_string(),
            description: desc.description.to_string(),
            input_schema: desc.input_schema(),
        }
    }
}

/// Reject arguments that are not an object or carry undeclared keys.
pub fn validate_arguments(node: &dyn Node, args: &Value) -> Result<()> {
    let desc = node.description();
    if !desc.usable_as_tool {
        return Err(Error::InvalidArguments(format!(
            "{} is not usable as a tool",
            desc.name
        )));
    }
    let map = args
        .as_object()
        .ok_or_else(|| Error::InvalidArguments("arguments must be a JSON object".into()))?;
    let declared = desc.parameter_names();
    let unknown: Vec<&str> = map
        .keys()
        .map(String::as_str)
        .filter(|k| !declared.contains(k))
        .collect();
    if !unknown.is_empty() {
        return Err(Error::InvalidArguments(format!(
            "unknown argument(s) for {}: {}",
            desc.name,
            unknown.join(", ")
        )));
    }
    Ok(())
}

/// Runs tool nodes against configured credentials and a transport.
pub struct ToolRunner {
    credentials: BTreeMap<String, Credentials>,
    transport: Arc<dyn Transport>,
    workflow_id: String,
}

impl ToolRunner {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self {
            credentials: BTreeMap::new(),
            transport,
            workflow_id: "kgflow".to_string(),
        }
    }

    pub fn from_config(config: &KgflowConfig, transport: Arc<dyn Transport>) -> Self {
        Self {
            credentials: config.credentials.clone(),
            transport,
            workflow_id: config.workflow_id.clone(),
        }
    }

    pub fn credentials(mut self, name: impl Into<String>, credentials: Credentials) -> Self {
        self.credentials.insert(name.into(), credentials);
        self
    }

    /// Validate and run one invocation. Every call is its own execution.
    pub async fn invoke(&self, node: &dyn Node, args: Value) -> ToolResult {
        match self.try_invoke(node, args).await {
            Ok(v) => ToolResult::Json(v),
            Err(e) => ToolResult::error(e.to_string()),
        }
    }

    async fn try_invoke(&self, node: &dyn Node, args: Value) -> Result<Value> {
        validate_arguments(node, &args)?;
        let parameters = args.as_object().cloned().unwrap_or_default();
        let mut host = LocalHost::new(self.transport.clone())
            .workflow_id(self.workflow_id.clone())
            .parameters(parameters)
            .items(vec![args]);
        for (name, creds) in &self.credentials {
            host = host.credentials(name.clone(), creds.clone());
        }
        debug!(tool = node.name(), "invoking tool");
        let mut records = execute(node, &host).await?;
        Ok(records.pop().unwrap_or(Value::Null))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn content_string() {
        assert_eq!(ToolResult::error("bad").to_content_string(), "Error: bad");
        assert!(ToolResult::error("bad").is_error());
        assert!(ToolResult::Json(json!({"a": 1}))
            .to_content_string()
            .contains("\"a\": 1"));
    }

    #[tokio::test]
    async fn invoke_yields_json_or_error_only() {
        let transport: Arc<dyn Transport> = Arc::new(kgflow_api::ReqwestTransport::new());
        let runner = ToolRunner::new(transport);
        let node = crate::nodes::KnowledgeToolNode::new();
        match runner.invoke(&node, json!({"bogus": true})).await {
            ToolResult::Error(e) => assert!(e.contains("bogus")),
            ToolResult::Json(v) => panic!("expected an error, got {}", v),
        }
    }
}
