/// Capability boundaries for side-effecting nodes
///
/// Api nodes talk to an `HttpFetcher` and email nodes to an `EmailTransport`.
/// The engine only ever sees these two narrow traits; the reqwest-backed
/// implementations below are what the server wires in.

use anyhow::Result;
use serde::Serialize;
use serde_json::Value;

/// Outgoing HTTP request built by an api node
#[derive(Debug, Clone, PartialEq)]
pub struct HttpRequest {
    /// Uppercase method name ("GET", "POST", ...)
    pub method: String,
    /// Fully built URL including any query string
    pub url: String,
    /// Header name/value pairs, already merged with defaults
    pub headers: Vec<(String, String)>,
    /// JSON body for non-GET requests
    pub body: Option<Value>,
}

/// Raw HTTP response as seen by an api node
#[derive(Debug, Clone, PartialEq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

/// HTTP fetch capability
#[async_trait::async_trait]
pub trait HttpFetcher: Send + Sync {
    /// Issue the request; network failures are errors, any status code is not
    async fn fetch(&self, request: HttpRequest) -> Result<HttpResponse>;
}

/// Payload handed to the email transport
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmailPayload {
    pub service_id: String,
    pub template_id: String,
    /// Public key of the email service account
    pub user_id: String,
    pub template_params: EmailTemplateParams,
}

/// Templated fields of an outgoing email
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmailTemplateParams {
    pub to_email: String,
    pub subject: String,
    pub message: String,
    pub parent_data: String,
    pub timestamp: String,
}

/// Transport response: status code plus response text
#[derive(Debug, Clone, PartialEq)]
pub struct EmailResponse {
    pub status: u16,
    pub text: String,
}

/// Email sending capability
#[async_trait::async_trait]
pub trait EmailTransport: Send + Sync {
    async fn send(&self, payload: &EmailPayload) -> Result<EmailResponse>;
}

/// reqwest-backed HTTP fetcher
#[derive(Debug, Clone, Default)]
pub struct ReqwestFetcher {
    client: reqwest::Client,
}

impl ReqwestFetcher {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait::async_trait]
impl HttpFetcher for ReqwestFetcher {
    async fn fetch(&self, request: HttpRequest) -> Result<HttpResponse> {
        let method = reqwest::Method::from_bytes(request.method.as_bytes())
            .map_err(|_| anyhow::anyhow!("Unsupported HTTP method: {}", request.method))?;

        let mut request_builder = self.client.request(method, &request.url);
        for (key, value) in &request.headers {
            request_builder = request_builder.header(key.as_str(), value.as_str());
        }
        if let Some(body) = &request.body {
            request_builder = request_builder.body(serde_json::to_vec(body)?);
        }

        tracing::debug!("🚀 Sending HTTP request: {} {}", request.method, request.url);
        let response = request_builder.send().await
            .map_err(|e| anyhow::anyhow!("HTTP request failed: {}", e))?;

        let status = response.status().as_u16();
        let body = response.text().await
            .map_err(|e| anyhow::anyhow!("Failed to read response body: {}", e))?;

        tracing::debug!("📡 Response status: {}", status);
        Ok(HttpResponse { status, body })
    }
}

/// Email transport speaking the EmailJS REST protocol
#[derive(Debug, Clone)]
pub struct EmailJsTransport {
    client: reqwest::Client,
    endpoint: String,
}

impl EmailJsTransport {
    pub fn new(client: reqwest::Client, endpoint: impl Into<String>) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
        }
    }
}

#[async_trait::async_trait]
impl EmailTransport for EmailJsTransport {
    async fn send(&self, payload: &EmailPayload) -> Result<EmailResponse> {
        tracing::debug!("📧 Sending email via {} to {}", self.endpoint, payload.template_params.to_email);

        let response = self
            .client
            .post(&self.endpoint)
            .json(payload)
            .send()
            .await
            .map_err(|e| anyhow::anyhow!("Email request failed: {}", e))?;

        let status = response.status().as_u16();
        let text = match response.text().await {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!("⚠️ Failed to read email service response body (status {}): {}", status, e);
                String::new()
            }
        };
        Ok(EmailResponse { status, text })
    }
}
