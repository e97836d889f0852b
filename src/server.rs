/// Server setup and initialization
///
/// Wires together all components: history storage, transports, node executor,
/// execution engine, and HTTP routes.

use crate::{
    api::executions::{create_execution_routes, AppState},
    config::Config,
    history::{ExecutionHistoryStore, HistoryStorage},
    runtime::{
        engine::ExecutionEngine,
        executor::NodeExecutor,
        transport::{EmailJsTransport, ReqwestFetcher},
    },
};
use anyhow::Result;
use axum::{routing::get, Router};
use std::{path::Path, sync::Arc};
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

/// Build the router around an already constructed engine
///
/// Split out from `create_app` so tests can inject an engine with fake transports.
pub fn build_router(engine: Arc<ExecutionEngine>) -> Router {
    let app_state = AppState {
        history: Arc::clone(engine.history()),
        engine,
    };

    Router::new()
        // Health check endpoint
        .route("/healthz", get(health_check))
        // Execution and history API routes
        .merge(create_execution_routes().with_state(app_state))
}

/// Create the main Axum application with all routes
///
/// Opens the history database, builds the real HTTP and email transports and
/// wires them into the execution engine.
pub async fn create_app(config: Config) -> Result<Router> {
    tracing::info!("📁 Ensuring data directory exists: {}", config.history.data_dir);
    std::fs::create_dir_all(&config.history.data_dir)
        .map_err(|e| anyhow::anyhow!("Failed to create data directory: {}", e))?;

    tracing::info!("📋 Initializing execution history storage");
    let db_path = Path::new(&config.history.data_dir).join("history.db");
    let storage = HistoryStorage::connect(&db_path).await
        .map_err(|e| anyhow::anyhow!("Failed to open history database: {}", e))?;
    let history = Arc::new(ExecutionHistoryStore::open(storage, config.history.limit).await
        .map_err(|e| anyhow::anyhow!("Failed to load execution history: {}", e))?);
    tracing::debug!("🧮 Keeping up to {} executions per workflow", history.limit());

    tracing::info!("⚙️ Initializing node executor");
    let client = reqwest::Client::new();
    if config.email.service_id.is_none() || config.email.template_id.is_none() || config.email.public_key.is_none() {
        tracing::warn!("⚠️ Email defaults incomplete; email nodes must carry their own service configuration");
    }
    let node_executor = NodeExecutor::new(
        Arc::new(ReqwestFetcher::new(client.clone())),
        Arc::new(EmailJsTransport::new(client, config.email.endpoint.clone())),
        config.email.clone(),
    );

    tracing::info!("🚀 Initializing execution engine");
    let engine = Arc::new(ExecutionEngine::new(Arc::new(node_executor), history));

    let app = build_router(engine);
    tracing::info!("✅ Application initialized successfully");

    Ok(app)
}

/// Start the HTTP server with the given configuration
pub async fn start_server(config: Config) -> Result<()> {
    // Initialize tracing subscriber for logging (RUST_LOG, default info)
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .with_thread_ids(true)
        .with_level(true)
        .init();

    tracing::info!("Starting nodeflow server...");

    let app = create_app(config.clone()).await?;

    let bind_addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&bind_addr).await?;

    tracing::info!("Server listening on http://{}", bind_addr);

    axum::serve(listener, app.into_make_service()).await?;

    Ok(())
}

/// Health check endpoint handler
async fn health_check() -> &'static str {
    "ok"
}
