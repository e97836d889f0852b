/// nodeflow: minimal workflow execution engine
///
/// Main entry point for the nodeflow server. Initializes configuration and starts
/// the HTTP server with execution and history endpoints.

use nodeflow::{config::Config, server::start_server};

/// Application entry point
///
/// The server provides:
/// - Workflow execution at POST /api/executions
/// - Execution history at /api/workflows/{workflow_id}/executions
/// - Health check at /healthz
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration (defaults to 0.0.0.0:3004 and data/history.db)
    let config = Config::default();

    start_server(config).await?;

    Ok(())
}
