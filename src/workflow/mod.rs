/// Workflow Definition Layer
///
/// Types handed over by the workflow editor and the graph index built from them:
/// - Type definitions (NodeDefinition, NodeKind, EdgeDefinition)
/// - Adjacency index with root detection and up-front validation

// Core workflow type definitions
pub mod types;

// Graph indexer built on petgraph
pub mod graph;

// Re-export commonly used types
pub use graph::GraphIndex;
pub use types::{EdgeDefinition, NodeDefinition, NodeKind, WorkflowRequest};
