//! Shared fakes for integration tests.
#![allow(dead_code)]

use anyhow::Result;
use nodeflow::config::EmailConfig;
use nodeflow::history::ExecutionHistoryStore;
use nodeflow::runtime::transport::{
    EmailPayload, EmailResponse, EmailTransport, HttpFetcher, HttpRequest, HttpResponse,
};
use nodeflow::{ExecutionEngine, NodeExecutor};
use std::sync::{Arc, Mutex};

/// Fetcher that records every request and answers with a fixed JSON body
pub struct FakeFetcher {
    pub requests: Mutex<Vec<HttpRequest>>,
    status: u16,
    body: String,
}

impl FakeFetcher {
    pub fn responding(status: u16, body: &str) -> Arc<Self> {
        Arc::new(Self {
            requests: Mutex::new(Vec::new()),
            status,
            body: body.to_string(),
        })
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait::async_trait]
impl HttpFetcher for FakeFetcher {
    async fn fetch(&self, request: HttpRequest) -> Result<HttpResponse> {
        self.requests.lock().unwrap().push(request);
        Ok(HttpResponse {
            status: self.status,
            body: self.body.clone(),
        })
    }
}

/// Email transport that records payloads and always answers 200
#[derive(Default)]
pub struct FakeTransport {
    pub sent: Mutex<Vec<EmailPayload>>,
}

impl FakeTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn sent_count(&self) -> usize {
        self.sent.lock().unwrap().len()
    }
}

#[async_trait::async_trait]
impl EmailTransport for FakeTransport {
    async fn send(&self, payload: &EmailPayload) -> Result<EmailResponse> {
        self.sent.lock().unwrap().push(payload.clone());
        Ok(EmailResponse {
            status: 200,
            text: "OK".to_string(),
        })
    }
}

pub fn email_config() -> EmailConfig {
    EmailConfig {
        service_id: Some("svc".to_string()),
        template_id: Some("tpl".to_string()),
        public_key: Some("pk".to_string()),
        ..EmailConfig::default()
    }
}

/// Engine over in-memory history and the given fakes
pub fn engine(fetcher: Arc<FakeFetcher>, transport: Arc<FakeTransport>) -> ExecutionEngine {
    let executor = NodeExecutor::new(fetcher, transport, email_config());
    ExecutionEngine::new(Arc::new(executor), Arc::new(ExecutionHistoryStore::in_memory(50)))
}

pub fn default_engine() -> ExecutionEngine {
    engine(FakeFetcher::responding(200, "{}"), FakeTransport::new())
}
