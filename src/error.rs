/// Run-level errors
///
/// Node failures are never errors: they come back as failure outcomes.
/// These variants abort a run before any node executes.

/// Errors that prevent a workflow run from starting.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Two nodes share the same id.
    #[error("duplicate node id '{node_id}'")]
    DuplicateNode { node_id: String },

    /// An edge points at a node that is not part of the workflow.
    #[error("edge '{edge_id}' references unknown node '{node_id}'")]
    UnknownNode { edge_id: String, node_id: String },

    /// The graph contains a cycle reachable through the given node.
    #[error("cycle detected at node '{node_id}'")]
    CycleDetected { node_id: String },
}
