/// Bounded execution history store
///
/// Keeps the most recent executions per workflow id in memory, newest first,
/// and mirrors every mutation to the optional SQLite storage.

use crate::history::storage::HistoryStorage;
use crate::runtime::record::WorkflowExecution;
use anyhow::Result;
use std::collections::HashMap;
use tokio::sync::Mutex;

/// Default number of executions kept per workflow
pub const DEFAULT_HISTORY_LIMIT: usize = 50;

/// Execution history shared by every run in the process
///
/// All mutations (prepend, truncate, persist) happen under one mutex, so
/// concurrent runs of the same workflow are appended in lock order and
/// none of them is lost.
#[derive(Debug)]
pub struct ExecutionHistoryStore {
    /// Key: workflow_id, Value: executions newest first
    executions: Mutex<HashMap<String, Vec<WorkflowExecution>>>,
    /// Durable backing, absent for purely in-memory stores
    storage: Option<HistoryStorage>,
    limit: usize,
}

impl ExecutionHistoryStore {
    /// Create a store with no durable backing
    pub fn in_memory(limit: usize) -> Self {
        Self {
            executions: Mutex::new(HashMap::new()),
            storage: None,
            limit,
        }
    }

    /// Create a store backed by SQLite, loading the persisted history
    pub async fn open(storage: HistoryStorage, limit: usize) -> Result<Self> {
        storage.init_schema().await?;
        let mut loaded = storage.load_all().await?;
        for executions in loaded.values_mut() {
            executions.truncate(limit);
        }

        tracing::info!("📥 Loaded execution history for {} workflows", loaded.len());

        Ok(Self {
            executions: Mutex::new(loaded),
            storage: Some(storage),
            limit,
        })
    }

    /// Prepend an execution and evict everything beyond the limit
    ///
    /// The in-memory list is updated even when persisting fails; the error is
    /// still returned so the caller can report it.
    pub async fn add_execution(&self, workflow_id: &str, execution: WorkflowExecution) -> Result<()> {
        let mut executions = self.executions.lock().await;
        let history = executions.entry(workflow_id.to_string()).or_default();

        history.insert(0, execution);
        if history.len() > self.limit {
            tracing::debug!("🧹 Evicting {} executions of '{}'", history.len() - self.limit, workflow_id);
            history.truncate(self.limit);
        }

        if let Some(storage) = &self.storage {
            storage.save_executions(workflow_id, history).await?;
        }

        Ok(())
    }

    /// Executions of one workflow, newest first (empty if none)
    pub async fn get_executions(&self, workflow_id: &str) -> Vec<WorkflowExecution> {
        self.executions
            .lock()
            .await
            .get(workflow_id)
            .cloned()
            .unwrap_or_default()
    }

    /// Drop the whole history of one workflow
    pub async fn clear_executions(&self, workflow_id: &str) -> Result<()> {
        let mut executions = self.executions.lock().await;
        executions.remove(workflow_id);

        if let Some(storage) = &self.storage {
            storage.delete_executions(workflow_id).await?;
        }

        tracing::info!("🗑️ Cleared execution history for '{}'", workflow_id);
        Ok(())
    }

    pub fn limit(&self) -> usize {
        self.limit
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::record::ExecutionStatus;
    use std::sync::Arc;

    fn execution(workflow_id: &str, execution_id: &str) -> WorkflowExecution {
        WorkflowExecution {
            execution_id: execution_id.to_string(),
            workflow_id: workflow_id.to_string(),
            start_time: "2024-01-01T00:00:00.000Z".to_string(),
            end_time: "2024-01-01T00:00:01.000Z".to_string(),
            status: ExecutionStatus::Completed,
            results: Vec::new(),
        }
    }

    fn ids(executions: &[WorkflowExecution]) -> Vec<String> {
        executions.iter().map(|e| e.execution_id.clone()).collect()
    }

    #[tokio::test]
    async fn test_unknown_workflow_has_empty_history() {
        let store = ExecutionHistoryStore::in_memory(DEFAULT_HISTORY_LIMIT);
        assert!(store.get_executions("nope").await.is_empty());
    }

    #[tokio::test]
    async fn test_newest_first() {
        let store = ExecutionHistoryStore::in_memory(DEFAULT_HISTORY_LIMIT);
        store.add_execution("wf", execution("wf", "a")).await.unwrap();
        store.add_execution("wf", execution("wf", "b")).await.unwrap();

        assert_eq!(ids(&store.get_executions("wf").await), ["b", "a"]);
    }

    #[tokio::test]
    async fn test_sixty_appends_keep_fifty_newest() {
        let store = ExecutionHistoryStore::in_memory(DEFAULT_HISTORY_LIMIT);
        for i in 0..60 {
            store.add_execution("wf", execution("wf", &i.to_string())).await.unwrap();
        }

        let history = store.get_executions("wf").await;
        assert_eq!(history.len(), 50);
        assert_eq!(history[0].execution_id, "59");
        assert_eq!(history[49].execution_id, "10");
        assert!(history.iter().all(|e| e.execution_id.parse::<u32>().unwrap() >= 10));
    }

    #[tokio::test]
    async fn test_histories_are_per_workflow() {
        let store = ExecutionHistoryStore::in_memory(DEFAULT_HISTORY_LIMIT);
        store.add_execution("wf-a", execution("wf-a", "1")).await.unwrap();
        store.add_execution("wf-b", execution("wf-b", "2")).await.unwrap();

        store.clear_executions("wf-a").await.unwrap();

        assert!(store.get_executions("wf-a").await.is_empty());
        assert_eq!(ids(&store.get_executions("wf-b").await), ["2"]);
    }

    #[tokio::test]
    async fn test_concurrent_appends_are_all_kept() {
        let store = Arc::new(ExecutionHistoryStore::in_memory(DEFAULT_HISTORY_LIMIT));

        let handles: Vec<_> = (0..10)
            .map(|i| {
                let store = Arc::clone(&store);
                tokio::spawn(async move {
                    store.add_execution("wf", execution("wf", &format!("run-{i}"))).await
                })
            })
            .collect();
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        let mut stored = ids(&store.get_executions("wf").await);
        stored.sort();
        let mut expected: Vec<_> = (0..10).map(|i| format!("run-{i}")).collect();
        expected.sort();
        assert_eq!(stored, expected);
    }

    #[tokio::test]
    async fn test_history_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("history.db");

        {
            let storage = HistoryStorage::connect(&db_path).await.unwrap();
            let store = ExecutionHistoryStore::open(storage, 3).await.unwrap();
            for i in 0..5 {
                store.add_execution("wf", execution("wf", &i.to_string())).await.unwrap();
            }
            store.add_execution("other", execution("other", "x")).await.unwrap();
            store.clear_executions("other").await.unwrap();
        }

        let storage = HistoryStorage::connect(&db_path).await.unwrap();
        let store = ExecutionHistoryStore::open(storage, 3).await.unwrap();

        assert_eq!(ids(&store.get_executions("wf").await), ["4", "3", "2"]);
        assert!(store.get_executions("other").await.is_empty());
    }

    #[tokio::test]
    async fn test_reopen_with_smaller_limit_truncates() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("history.db");

        {
            let store = ExecutionHistoryStore::open(HistoryStorage::connect(&db_path).await.unwrap(), 10)
                .await
                .unwrap();
            for i in 0..4 {
                store.add_execution("wf", execution("wf", &i.to_string())).await.unwrap();
            }
        }

        let store = ExecutionHistoryStore::open(HistoryStorage::connect(&db_path).await.unwrap(), 2)
            .await
            .unwrap();
        assert_eq!(ids(&store.get_executions("wf").await), ["3", "2"]);
    }
}
