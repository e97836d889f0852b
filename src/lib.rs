/// nodeflow: minimal workflow execution engine
///
/// This library runs small directed workflows (start → steps → end) built in a
/// visual editor, producing a per-node result trace and a bounded execution history.

// Core configuration and setup
pub mod config;

// Run-level error types
pub mod error;

// Workflow definitions handed over by the editor, and the graph index
pub mod workflow;

// Runtime execution engine - traversal, node executors and execution records
pub mod runtime;

// Bounded execution history with SQLite persistence
pub mod history;

// HTTP API layer - execution and history endpoints
pub mod api;

// Server setup and initialization
pub mod server;

// Re-export commonly used types for external consumers
pub use error::EngineError;
pub use history::ExecutionHistoryStore;
pub use runtime::{ExecutionEngine, ExecutionOutcome, ExecutionReport, NodeExecutor, WorkflowExecution};
pub use server::start_server;
pub use workflow::{EdgeDefinition, NodeDefinition, NodeKind};
