/// Execution record builder
///
/// Folds the per-visit events of one run into the persisted
/// `WorkflowExecution` shape: one record per node, latest outcome wins,
/// timestamps accumulate across revisits.

use crate::runtime::executor::{now_timestamp, ExecutionOutcome};
use crate::workflow::types::{NodeDefinition, NodeKind};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// Overall status of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionStatus {
    /// Every node record succeeded
    Completed,
    /// At least one node record failed
    Failed,
}

/// Summary of one node across all its visits within a run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeExecutionRecord {
    pub node_id: String,
    #[serde(rename = "type")]
    pub kind: NodeKind,
    pub success: bool,
    /// One entry per visit, in visit order
    pub timestamps: Vec<String>,
    pub data: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// One complete workflow run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowExecution {
    pub execution_id: String,
    pub workflow_id: String,
    pub start_time: String,
    pub end_time: String,
    pub status: ExecutionStatus,
    /// Node records in first-visit order
    pub results: Vec<NodeExecutionRecord>,
}

/// In-progress ledger owned by a single orchestrator invocation
#[derive(Debug)]
pub struct ExecutionLedger {
    execution_id: String,
    workflow_id: String,
    start_time: String,
    results: Vec<NodeExecutionRecord>,
    /// Mapping from node ID to its slot in `results`
    slots: HashMap<String, usize>,
}

impl ExecutionLedger {
    /// Open a ledger with a fresh execution id and the current start time
    pub fn start(workflow_id: impl Into<String>) -> Self {
        Self {
            execution_id: uuid::Uuid::new_v4().to_string(),
            workflow_id: workflow_id.into(),
            start_time: now_timestamp(),
            results: Vec::new(),
            slots: HashMap::new(),
        }
    }

    pub fn execution_id(&self) -> &str {
        &self.execution_id
    }

    /// Record one visit of a node
    pub fn record(&mut self, node: &NodeDefinition, outcome: &ExecutionOutcome, timestamp: String) {
        match self.slots.get(&node.id) {
            Some(&slot) => {
                let record = &mut self.results[slot];
                record.success = outcome.success;
                record.data = outcome.data.clone();
                record.error = outcome.error.clone();
                record.timestamps.push(timestamp);
            }
            None => {
                self.slots.insert(node.id.clone(), self.results.len());
                self.results.push(NodeExecutionRecord {
                    node_id: node.id.clone(),
                    kind: node.kind,
                    success: outcome.success,
                    timestamps: vec![timestamp],
                    data: outcome.data.clone(),
                    error: outcome.error.clone(),
                });
            }
        }
    }

    /// Close the ledger, capturing end time and overall status
    pub fn finish(self) -> WorkflowExecution {
        let status = if self.results.iter().all(|record| record.success) {
            ExecutionStatus::Completed
        } else {
            ExecutionStatus::Failed
        };

        WorkflowExecution {
            execution_id: self.execution_id,
            workflow_id: self.workflow_id,
            start_time: self.start_time,
            end_time: now_timestamp(),
            status,
            results: self.results,
        }
    }
}
