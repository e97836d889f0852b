/// Node execution handlers for the five node kinds
///
/// This module contains the actual execution logic for each node kind:
/// - Start / End: markers that wrap their input in a status payload
/// - Text: `{{parentData}}` templating
/// - Api: HTTP call through the `HttpFetcher` capability
/// - Email: templated email through the `EmailTransport` capability
///
/// Every handler returns `anyhow::Result<Value>`; `execute_node` is the only
/// place where errors (and panics) are turned into failure outcomes.

use crate::{
    config::EmailConfig,
    runtime::transport::{EmailPayload, EmailTemplateParams, EmailTransport, HttpFetcher, HttpRequest},
    workflow::types::{NodeDefinition, NodeKind},
};
use anyhow::{anyhow, bail, Result};
use futures::FutureExt;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::{any::Any, panic::AssertUnwindSafe, sync::Arc};

/// Placeholder substituted by text nodes
pub const PARENT_DATA_PLACEHOLDER: &str = "{{parentData}}";

/// Subject used when an email node does not configure one
pub const DEFAULT_EMAIL_SUBJECT: &str = "Workflow Email";

const SUPPORTED_METHODS: &[&str] = &["GET", "POST", "PUT", "PATCH", "DELETE"];

/// Result of executing a single node once
///
/// Produced per node per visit and never mutated afterwards. `data` flows to
/// the node's children as their parent data; it is `null` on failure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionOutcome {
    pub success: bool,
    pub data: Value,
    /// Present only when `success` is false
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ExecutionOutcome {
    pub fn success(data: Value) -> Self {
        Self {
            success: true,
            data,
            error: None,
        }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            data: Value::Null,
            error: Some(error.into()),
        }
    }
}

/// ISO-8601 timestamp with millisecond precision, UTC
pub fn now_timestamp() -> String {
    chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true)
}

/// Node executor that handles execution of the different node kinds
///
/// Holds the two side-effect capabilities and the process-wide email defaults,
/// and dispatches each node to its handler based on `NodeKind`.
pub struct NodeExecutor {
    http: Arc<dyn HttpFetcher>,
    email: Arc<dyn EmailTransport>,
    email_defaults: EmailConfig,
}

/// Fully resolved email service credentials
struct EmailService {
    service_id: String,
    template_id: String,
    public_key: String,
}

impl NodeExecutor {
    /// Create new node executor with its transports and email defaults
    pub fn new(
        http: Arc<dyn HttpFetcher>,
        email: Arc<dyn EmailTransport>,
        email_defaults: EmailConfig,
    ) -> Self {
        Self {
            http,
            email,
            email_defaults,
        }
    }

    /// Execute a single node with the data produced by its parent
    ///
    /// Never fails: validation, transport and configuration errors as well as
    /// panics inside a handler all come back as failure outcomes.
    pub async fn execute_node(&self, node: &NodeDefinition, parent_data: Option<&Value>) -> ExecutionOutcome {
        tracing::info!("🚀 Starting node execution: {} (type: {})", node.id, node.kind);
        tracing::debug!("📥 Parent data: {}", parent_data.map(|v| v.to_string()).unwrap_or_else(|| "none".to_string()));

        let start_time = std::time::Instant::now();

        let handler = async {
            match node.kind {
                NodeKind::Start => Ok(self.execute_start_node()),
                NodeKind::End => Ok(self.execute_end_node(parent_data)),
                NodeKind::Text => self.execute_text_node(node, parent_data),
                NodeKind::Api => self.execute_api_node(node, parent_data).await,
                NodeKind::Email => self.execute_email_node(node, parent_data).await,
            }
        };

        let outcome = match AssertUnwindSafe(handler).catch_unwind().await {
            Ok(Ok(data)) => ExecutionOutcome::success(data),
            Ok(Err(e)) => ExecutionOutcome::failure(e.to_string()),
            Err(panic) => ExecutionOutcome::failure(format!("node panicked: {}", panic_message(&*panic))),
        };

        let duration = start_time.elapsed();
        match &outcome.error {
            None => {
                tracing::info!("✅ Node execution completed: {} in {:?}", node.id, duration);
                tracing::debug!("📤 Output data: {}", outcome.data);
            }
            Some(e) => {
                tracing::warn!("❌ Node execution failed: {} in {:?} - Error: {}", node.id, duration, e);
            }
        }

        outcome
    }

    fn execute_start_node(&self) -> Value {
        json!({
            "message": "Workflow started",
            "timestamp": now_timestamp(),
        })
    }

    fn execute_end_node(&self, parent_data: Option<&Value>) -> Value {
        json!({
            "message": "Workflow completed",
            "finalData": parent_data.cloned().unwrap_or(Value::Null),
            "timestamp": now_timestamp(),
        })
    }

    /// Execute text templating node
    ///
    /// Substitutes the first `{{parentData}}` occurrence when non-null parent
    /// data exists; non-string parents are rendered as compact JSON.
    fn execute_text_node(&self, node: &NodeDefinition, parent_data: Option<&Value>) -> Result<Value> {
        let original_text = match node.data.get("text") {
            Some(Value::String(text)) => text,
            Some(other) => bail!(
                "Validation error: text node requires 'text' to be a string, got {}",
                json_type_name(other)
            ),
            None => bail!("Validation error: text node requires a 'text' field"),
        };

        let processed_text = match parent_data.filter(|value| !value.is_null()) {
            Some(parent) if original_text.contains(PARENT_DATA_PLACEHOLDER) => {
                original_text.replacen(PARENT_DATA_PLACEHOLDER, &stringify(parent), 1)
            }
            _ => original_text.clone(),
        };

        Ok(json!({
            "text": processed_text,
            "originalText": original_text,
            "parentData": parent_data.cloned().unwrap_or(Value::Null),
            "timestamp": now_timestamp(),
        }))
    }

    /// Execute HTTP call node
    ///
    /// The response status is not checked: any response whose body parses as
    /// JSON is a success, and the parsed body becomes the node's data.
    async fn execute_api_node(&self, node: &NodeDefinition, parent_data: Option<&Value>) -> Result<Value> {
        let url = node
            .str_param("url")
            .filter(|url| !url.trim().is_empty())
            .ok_or_else(|| anyhow!("Validation error: api node requires a 'url'"))?;

        let method = node.str_param("method").unwrap_or("GET").to_uppercase();
        if !SUPPORTED_METHODS.contains(&method.as_str()) {
            bail!("Unsupported HTTP method: {}", method);
        }

        let mut headers = vec![("Content-Type".to_string(), "application/json".to_string())];
        if let Some(configured) = node.data.get("headers").and_then(Value::as_object) {
            for (key, value) in configured {
                let Some(value) = value.as_str() else { continue };
                match headers.iter_mut().find(|(name, _)| name.eq_ignore_ascii_case(key)) {
                    Some(existing) => existing.1 = value.to_string(),
                    None => headers.push((key.clone(), value.to_string())),
                }
            }
        }

        let parent = parent_data.filter(|value| !value.is_null());
        let (url, body) = if method == "GET" {
            (build_query_url(url, parent)?, None)
        } else {
            (url.to_string(), parent.cloned())
        };

        tracing::debug!("🌍 HTTP Request: {} {}", method, url);
        let response = self
            .http
            .fetch(HttpRequest {
                method: method.clone(),
                url: url.clone(),
                headers,
                body,
            })
            .await?;

        if !(200..300).contains(&response.status) {
            tracing::warn!("⚠️ {} {} answered with status {}", method, url, response.status);
        }

        serde_json::from_str(&response.body)
            .map_err(|e| anyhow!("Failed to parse JSON response (status {}): {}", response.status, e))
    }

    /// Execute email node
    ///
    /// Checks recipient, then service configuration, then content; nothing is
    /// sent unless all three are present. Only a 200 from the transport counts.
    async fn execute_email_node(&self, node: &NodeDefinition, parent_data: Option<&Value>) -> Result<Value> {
        let to_email = node
            .str_param("email")
            .map(str::trim)
            .filter(|email| !email.is_empty())
            .ok_or_else(|| anyhow!("Validation error: email node requires a recipient address in 'email'"))?;

        let service = self.resolve_email_service(node)?;

        let message = node.str_param("message").unwrap_or_default();
        let parent = parent_data.filter(|value| !value.is_null());
        if message.trim().is_empty() && parent.is_none() {
            bail!("Validation error: email node requires a message or data from a previous node");
        }

        let subject = node
            .str_param("subject")
            .filter(|subject| !subject.is_empty())
            .unwrap_or(DEFAULT_EMAIL_SUBJECT);
        let timestamp = now_timestamp();

        let payload = EmailPayload {
            service_id: service.service_id,
            template_id: service.template_id,
            user_id: service.public_key,
            template_params: EmailTemplateParams {
                to_email: to_email.to_string(),
                subject: subject.to_string(),
                message: message.to_string(),
                parent_data: parent.map(stringify).unwrap_or_default(),
                timestamp,
            },
        };

        let response = self
            .email
            .send(&payload)
            .await
            .map_err(|e| anyhow!("Failed to send email: {}", e))?;

        if response.status != 200 {
            bail!("Email sending failed with status: {} - {}", response.status, response.text);
        }

        tracing::info!("📧 Email sent to {}", to_email);

        let params = payload.template_params;
        Ok(json!({
            "to_email": params.to_email,
            "subject": params.subject,
            "message": params.message,
            "parent_data": params.parent_data,
            "status": response.status,
            "text": response.text,
            "timestamp": params.timestamp,
        }))
    }

    /// Resolve service id, template id and public key
    ///
    /// Node-level `serviceId`/`templateId`/`publicKey` win over process defaults.
    fn resolve_email_service(&self, node: &NodeDefinition) -> Result<EmailService> {
        let pick = |key: &str, fallback: &Option<String>| {
            node.str_param(key)
                .filter(|value| !value.is_empty())
                .map(str::to_string)
                .or_else(|| fallback.clone().filter(|value| !value.is_empty()))
        };

        let service_id = pick("serviceId", &self.email_defaults.service_id);
        let template_id = pick("templateId", &self.email_defaults.template_id);
        let public_key = pick("publicKey", &self.email_defaults.public_key);

        match (service_id, template_id, public_key) {
            (Some(service_id), Some(template_id), Some(public_key)) => Ok(EmailService {
                service_id,
                template_id,
                public_key,
            }),
            (service_id, template_id, public_key) => {
                let missing = [
                    ("service id", service_id.is_none()),
                    ("template id", template_id.is_none()),
                    ("public key", public_key.is_none()),
                ]
                .iter()
                .filter(|(_, is_missing)| *is_missing)
                .map(|(name, _)| *name)
                .collect::<Vec<_>>();

                Err(anyhow!("Email service configuration missing: {}", missing.join(", ")))
            }
        }
    }
}

/// Build a GET url carrying a flat parent object as query parameters
fn build_query_url(url: &str, parent: Option<&Value>) -> Result<String> {
    let params = match parent.and_then(flat_query_params) {
        Some(params) if !params.is_empty() => params,
        _ => return Ok(url.to_string()),
    };

    let mut parsed = reqwest::Url::parse(url).map_err(|e| anyhow!("Invalid URL '{}': {}", url, e))?;
    parsed
        .query_pairs_mut()
        .extend_pairs(params.iter().map(|(key, value)| (key.as_str(), value.as_str())));

    Ok(parsed.to_string())
}

/// Scalar entries of a JSON object, or None when the value is not a flat mapping
fn flat_query_params(value: &Value) -> Option<Vec<(String, String)>> {
    let object = value.as_object()?;
    let mut params = Vec::with_capacity(object.len());

    for (key, value) in object {
        match value {
            Value::Null => continue,
            Value::String(text) => params.push((key.clone(), text.clone())),
            Value::Number(_) | Value::Bool(_) => params.push((key.clone(), value.to_string())),
            Value::Array(_) | Value::Object(_) => return None,
        }
    }

    Some(params)
}

/// Strings pass through verbatim, everything else becomes compact JSON
fn stringify(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}
