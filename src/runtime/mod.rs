/// Runtime Execution Engine
///
/// This module provides the workflow execution engine. It handles:
/// - Depth-first traversal of the workflow graph from every root
/// - Per-kind node execution with error-as-value outcomes
/// - Data flow from each node to its children
/// - Folding visits into a persisted execution record

// Orchestrator walking the graph and appending to history
pub mod engine;

// Individual node execution handlers
pub mod executor;

// Execution record builder
pub mod record;

// HTTP and email capability boundaries
pub mod transport;

// Re-export main types
pub use engine::{ExecutionEngine, ExecutionReport};
pub use executor::{ExecutionOutcome, NodeExecutor};
pub use record::{ExecutionStatus, NodeExecutionRecord, WorkflowExecution};
