/// Workflow execution orchestrator
///
/// Walks the workflow graph depth-first from every root, threading each
/// node's outcome data into its children, and hands the finished execution
/// record to the history store.

use crate::error::EngineError;
use crate::history::ExecutionHistoryStore;
use crate::runtime::executor::{now_timestamp, ExecutionOutcome, NodeExecutor};
use crate::runtime::record::{ExecutionLedger, ExecutionStatus, WorkflowExecution};
use crate::workflow::graph::GraphIndex;
use crate::workflow::types::{EdgeDefinition, NodeDefinition};
use serde::Serialize;
use serde_json::Value;
use std::{collections::HashMap, sync::Arc};

/// Everything a caller gets back from one run
#[derive(Debug, Clone, Serialize)]
pub struct ExecutionReport {
    /// Latest outcome per node id, for immediate display
    pub outcomes: HashMap<String, ExecutionOutcome>,
    /// The record that was appended to history
    pub execution: WorkflowExecution,
}

/// Execution engine for workflow runs
///
/// Node executions are awaited one at a time: within a run, side-effecting
/// nodes never overlap. A node with several parents runs once per path that
/// reaches it, so its side effects repeat per path.
pub struct ExecutionEngine {
    /// Node executor for handling individual node execution
    executor: Arc<NodeExecutor>,
    /// Process-wide execution history
    history: Arc<ExecutionHistoryStore>,
}

impl ExecutionEngine {
    /// Create new execution engine with node executor and history store
    pub fn new(executor: Arc<NodeExecutor>, history: Arc<ExecutionHistoryStore>) -> Self {
        Self { executor, history }
    }

    pub fn history(&self) -> &Arc<ExecutionHistoryStore> {
        &self.history
    }

    /// Execute a workflow graph
    ///
    /// Roots run in node array order, children in edge insertion order,
    /// depth-first. A failed node does not stop its subtree; its children
    /// receive `null` as parent data. Only an invalid graph (duplicate ids,
    /// dangling edges, cycles) aborts, and it does so before any node runs.
    pub async fn execute_workflow(
        &self,
        workflow_id: &str,
        nodes: &[NodeDefinition],
        edges: &[EdgeDefinition],
    ) -> Result<ExecutionReport, EngineError> {
        let workflow_start_time = std::time::Instant::now();

        let index = GraphIndex::build(nodes, edges)?;
        let mut ledger = ExecutionLedger::start(workflow_id);

        tracing::info!("🚀 Starting workflow execution: {} (execution {}, {} roots)",
            workflow_id, ledger.execution_id(), index.roots().len());

        let mut outcomes: HashMap<String, ExecutionOutcome> = HashMap::new();

        // Stack of pending visits: (node id, data handed down by the parent)
        let mut pending: Vec<(&str, Option<Value>)> = index
            .roots()
            .iter()
            .rev()
            .map(|root| (root.as_str(), None))
            .collect();

        let mut step = 0usize;
        while let Some((node_id, parent_data)) = pending.pop() {
            // ids on the stack come from a validated index
            let Some(position) = index.position(node_id) else { continue };
            let node = &nodes[position];

            step += 1;
            tracing::info!("📍 Step {}: Executing node '{}' (type: {})", step, node.id, node.kind);

            let timestamp = now_timestamp();
            let outcome = self.executor.execute_node(node, parent_data.as_ref()).await;
            ledger.record(node, &outcome, timestamp);

            for child in index.children(node_id).iter().rev() {
                pending.push((child.as_str(), Some(outcome.data.clone())));
            }

            outcomes.insert(node.id.clone(), outcome);
        }

        let execution = ledger.finish();

        let workflow_duration = workflow_start_time.elapsed();
        match execution.status {
            ExecutionStatus::Completed => tracing::info!("🎉 Workflow '{}' completed in {:?} ({} steps)",
                workflow_id, workflow_duration, step),
            ExecutionStatus::Failed => tracing::warn!("⚠️ Workflow '{}' finished with failures in {:?} ({} steps)",
                workflow_id, workflow_duration, step),
        }

        if let Err(e) = self.history.add_execution(workflow_id, execution.clone()).await {
            tracing::error!("❌ Failed to persist execution {} of '{}': {}", execution.execution_id, workflow_id, e);
        }

        Ok(ExecutionReport { outcomes, execution })
    }
}
