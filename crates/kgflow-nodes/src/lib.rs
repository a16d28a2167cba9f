//! kgflow nodes - the Graphiti adapters and the machinery they share
//!
//! Each adapter is a [`Node`]: a manifest plus per-item operation logic.
//! [`dispatch::execute`] runs a node over a host's input items;
//! [`ToolRunner`] runs tool-capable nodes from a single argument object.

pub mod dispatch;
pub mod local;
pub mod nodes;
pub mod params;
pub mod registry;
pub mod schema;
pub mod tool;

pub use dispatch::{execute, Node};
pub use local::LocalHost;
pub use nodes::{GraphitiNode, KnowledgeToolNode, MemoryNode, MemoryToolNode};
pub use params::{Detect, Fallback, ItemContext};
pub use registry::NodeRegistry;
pub use schema::{NodeDescription, NodeProperty};
pub use tool::{validate_arguments, ToolDefinition, ToolResult, ToolRunner};

/// Registry with all four adapters.
pub fn default_registry() -> NodeRegistry {
    let mut registry = NodeRegistry::new();
    registry.register(GraphitiNode::new());
    registry.register(KnowledgeToolNode::new());
    registry.register(MemoryNode::new());
    registry.register(MemoryToolNode::new());
    registry
}
