/// Execution History Layer
///
/// Keeps the most recent workflow executions per workflow id:
/// - Bounded in-memory store, newest first
/// - SQLite persistence with sqlx, loaded at startup and written on every mutation

// Bounded, mutex-guarded history store
pub mod store;

// SQLite persistence layer for execution history
pub mod storage;

pub use storage::HistoryStorage;
pub use store::{ExecutionHistoryStore, DEFAULT_HISTORY_LIMIT};
