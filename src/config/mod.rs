/// Configuration management for the nodeflow engine
///
/// Handles server configuration, history storage and the process-wide
/// email service defaults.

use crate::history::DEFAULT_HISTORY_LIMIT;
use serde::{Deserialize, Serialize};

/// Default EmailJS send endpoint
pub const DEFAULT_EMAIL_ENDPOINT: &str = "https://api.emailjs.com/api/v1.0/email/send";

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Server configuration
    pub server: ServerConfig,
    /// History storage configuration
    pub history: HistoryConfig,
    /// Email service defaults
    pub email: EmailConfig,
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Server bind address (e.g., "0.0.0.0")
    pub host: String,
    /// Server port number
    pub port: u16,
}

/// Execution history storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryConfig {
    /// Directory holding history.db (default: "data")
    pub data_dir: String,
    /// Executions kept per workflow
    pub limit: usize,
}

/// Process-wide email service defaults
///
/// Any of the three credentials may be overridden per node
/// (`serviceId`, `templateId`, `publicKey`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmailConfig {
    pub service_id: Option<String>,
    pub template_id: Option<String>,
    pub public_key: Option<String>,
    /// Send endpoint of the email service
    pub endpoint: String,
}

impl Default for EmailConfig {
    fn default() -> Self {
        Self {
            service_id: None,
            template_id: None,
            public_key: None,
            endpoint: DEFAULT_EMAIL_ENDPOINT.to_string(),
        }
    }
}

impl Default for Config {
    /// Default configuration with ENV_VAR support for container deployment
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: std::env::var("NODEFLOW_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
                port: std::env::var("NODEFLOW_PORT")
                    .unwrap_or_else(|_| "3004".to_string())
                    .parse()
                    .unwrap_or(3004),
            },
            history: HistoryConfig {
                data_dir: std::env::var("NODEFLOW_DATA_DIR").unwrap_or_else(|_| "data".to_string()),
                limit: std::env::var("NODEFLOW_HISTORY_LIMIT")
                    .ok()
                    .and_then(|limit| limit.parse().ok())
                    .unwrap_or(DEFAULT_HISTORY_LIMIT),
            },
            email: EmailConfig {
                service_id: env_opt("NODEFLOW_EMAIL_SERVICE_ID"),
                template_id: env_opt("NODEFLOW_EMAIL_TEMPLATE_ID"),
                public_key: env_opt("NODEFLOW_EMAIL_PUBLIC_KEY"),
                endpoint: std::env::var("NODEFLOW_EMAIL_ENDPOINT")
                    .unwrap_or_else(|_| DEFAULT_EMAIL_ENDPOINT.to_string()),
            },
        }
    }
}

/// Non-empty environment variable, if set
fn env_opt(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|value| !value.trim().is_empty())
}
