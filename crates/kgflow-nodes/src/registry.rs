//! Node registry: adapters by name.

use kgflow_api::Host;
use kgflow_core::{Error, Result};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

use crate::dispatch::{execute, Node};
use crate::tool::ToolDefinition;

pub struct NodeRegistry {
    nodes: HashMap<String, Arc<dyn Node>>,
}

impl Default for NodeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl NodeRegistry {
    pub fn new() -> Self {
        Self {
            nodes: HashMap::new(),
        }
    }

    /// Register a node. Replaces any existing node with the same name.
    pub fn register(&mut self, node: impl Node + 'static) {
        let name = node.name().to_string();
        self.nodes.insert(name, Arc::new(node));
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Node>> {
        self.nodes.get(name).cloned()
    }

    pub fn require(&self, name: &str) -> Result<Arc<dyn Node>> {
        self.get(name)
            .ok_or_else(|| Error::UnknownNode(name.to_string()))
    }

    /// Registered names, sorted.
    pub fn list(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.nodes.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub async fn execute(&self, name: &str, host: &dyn Host) -> Result<Vec<Value>> {
        let node = self.require(name)?;
        execute(node.as_ref(), host).await
    }

    /// Definitions of the tool-capable nodes, sorted by name.
    pub fn tool_definitions(&self) -> Vec<ToolDefinition> {
        let mut defs: Vec<ToolDefinition> = self
            .nodes
            .values()
            .filter(|n| n.description().usable_as_tool)
            .map(|n| ToolDefinition::of(n.as_ref()))
            .collect();
        defs.sort_by(|a, b| a.name.cmp(&b.name));
        defs
    }
}
