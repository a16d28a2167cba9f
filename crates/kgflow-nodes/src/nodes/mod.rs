//! The four Graphiti adapters.

pub mod graphiti;
pub mod knowledge_tool;
pub mod memory;
pub mod memory_tool;

pub use graphiti::GraphitiNode;
pub use knowledge_tool::KnowledgeToolNode;
pub use memory::MemoryNode;
pub use memory_tool::MemoryToolNode;
