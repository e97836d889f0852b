/// HTTP API Layer
///
/// REST endpoints the workflow editor talks to:
/// - Running a workflow graph and returning per-node outcomes
/// - Reading and clearing execution history

// Execution and history endpoints
pub mod executions;

// Re-export router builder
pub use executions::create_execution_routes;
