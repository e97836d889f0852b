/// Workflow execution REST API endpoints
///
/// Lets the editor run a workflow graph and read or clear its execution
/// history.

use crate::{
    history::ExecutionHistoryStore,
    runtime::engine::{ExecutionEngine, ExecutionReport},
    workflow::types::WorkflowRequest,
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
    routing::{get, post},
    Router,
};
use serde_json::{json, Value};
use std::sync::Arc;

/// Application state containing shared resources
#[derive(Clone)]
pub struct AppState {
    /// Engine that runs workflow graphs
    pub engine: Arc<ExecutionEngine>,
    /// Execution history shared with the engine
    pub history: Arc<ExecutionHistoryStore>,
}

/// Create execution routes
pub fn create_execution_routes() -> Router<AppState> {
    Router::new()
        .route("/api/executions", post(execute_workflow))
        .route(
            "/api/workflows/{workflow_id}/executions",
            get(list_executions).delete(clear_executions),
        )
}

/// Run a workflow graph
///
/// POST /api/executions
/// Body: { "workflowId": "...", "nodes": [...], "edges": [...] }
/// Returns: { "outcomes": { nodeId: outcome }, "execution": { ... } }
async fn execute_workflow(
    State(state): State<AppState>,
    Json(request): Json<WorkflowRequest>,
) -> Result<Json<ExecutionReport>, (StatusCode, Json<Value>)> {
    if request.workflow_id.trim().is_empty() {
        return Err((StatusCode::BAD_REQUEST, Json(json!({ "error": "workflowId is required" }))));
    }

    tracing::info!("📥 Execution requested for workflow: {}", request.workflow_id);

    match state
        .engine
        .execute_workflow(&request.workflow_id, &request.nodes, &request.edges)
        .await
    {
        Ok(report) => Ok(Json(report)),
        Err(e) => {
            tracing::warn!("❌ Rejected workflow {}: {}", request.workflow_id, e);
            Err((StatusCode::BAD_REQUEST, Json(json!({ "error": e.to_string() }))))
        }
    }
}

/// List executions of a workflow, newest first
///
/// GET /api/workflows/:workflow_id/executions
/// Returns: { "executions": [...] }
async fn list_executions(
    State(state): State<AppState>,
    Path(workflow_id): Path<String>,
) -> Json<Value> {
    let executions = state.history.get_executions(&workflow_id).await;
    Json(json!({ "executions": executions }))
}

/// Clear the execution history of a workflow
///
/// DELETE /api/workflows/:workflow_id/executions
async fn clear_executions(
    State(state): State<AppState>,
    Path(workflow_id): Path<String>,
) -> Result<Json<Value>, StatusCode> {
    match state.history.clear_executions(&workflow_id).await {
        Ok(()) => Ok(Json(json!({ "message": "Execution history cleared" }))),
        Err(e) => {
            tracing::error!("Failed to clear execution history of {}: {}", workflow_id, e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}
