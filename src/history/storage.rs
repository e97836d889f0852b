/// SQLite persistence layer for execution history
///
/// Durable key-value backing for the history store: one row per workflow id,
/// holding the JSON array of its executions (newest first).

use crate::runtime::record::WorkflowExecution;
use anyhow::Result;
use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePool},
    Row,
};
use std::{collections::HashMap, path::Path};

/// SQLite-based execution history storage
#[derive(Debug, Clone)]
pub struct HistoryStorage {
    /// SQLite connection pool for the history database
    pool: SqlitePool,
}

impl HistoryStorage {
    /// Create new storage instance with database connection
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Open (creating if missing) the history database file and its schema
    pub async fn connect(db_path: &Path) -> Result<Self> {
        tracing::info!("🗄️ Opening history database: {}", db_path.display());

        let options = SqliteConnectOptions::new()
            .filename(db_path)
            .create_if_missing(true);
        let pool = SqlitePool::connect_with(options).await?;

        let storage = Self::new(pool);
        storage.init_schema().await?;
        Ok(storage)
    }

    /// Initialize the history schema
    ///
    /// Safe to call multiple times (uses IF NOT EXISTS).
    pub async fn init_schema(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS execution_history (
                workflow_id TEXT PRIMARY KEY,
                executions JSON NOT NULL,
                updated_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Replace the stored history of one workflow
    pub async fn save_executions(&self, workflow_id: &str, executions: &[WorkflowExecution]) -> Result<()> {
        let executions_json = serde_json::to_string(executions)?;

        sqlx::query(
            r#"
            INSERT INTO execution_history (workflow_id, executions, updated_at)
            VALUES (?, ?, CURRENT_TIMESTAMP)
            ON CONFLICT(workflow_id) DO UPDATE SET
                executions = excluded.executions,
                updated_at = CURRENT_TIMESTAMP
            "#,
        )
        .bind(workflow_id)
        .bind(&executions_json)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Load every workflow's history for store initialization
    pub async fn load_all(&self) -> Result<HashMap<String, Vec<WorkflowExecution>>> {
        let rows = sqlx::query("SELECT workflow_id, executions FROM execution_history")
            .fetch_all(&self.pool)
            .await?;

        let mut histories = HashMap::new();
        for row in rows {
            let workflow_id: String = row.get("workflow_id");
            let executions_json: String = row.get("executions");
            let executions: Vec<WorkflowExecution> = serde_json::from_str(&executions_json)?;
            histories.insert(workflow_id, executions);
        }

        Ok(histories)
    }

    /// Delete the stored history of one workflow
    pub async fn delete_executions(&self, workflow_id: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM execution_history WHERE workflow_id = ?")
            .bind(workflow_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
