//! Generative backend interaction.
//!
//! This module talks to an Ollama server's chat endpoint. It deliberately
//! performs exactly one request per call: no retries and no timeout beyond
//! what the HTTP transport applies on its own.
//!
//! # Architecture
//!
//! - [`SummaryBackend`]: trait seam used by the pipeline (stubbed in tests)
//! - [`OllamaBackend`]: `POST {base_url}/api/chat` implementation
//! - [`BackendReply`]: the backend's answer, either plain text or an already
//!   decoded JSON value, reduced to raw text by [`BackendReply::into_text`]

use crate::config::Settings;
use crate::error::BackendError;
use crate::prompt::SummaryRequest;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Instant;
use tracing::{error, info, instrument};

/// Trait for a generative model that turns a [`SummaryRequest`] into a reply.
#[async_trait]
pub trait SummaryBackend: Send + Sync {
    /// Send the request and return whatever the model produced.
    async fn complete(&self, request: &SummaryRequest) -> Result<BackendReply, BackendError>;

    /// Identifier of the model answering requests.
    fn model_name(&self) -> &str;
}

/// The content of a backend answer.
///
/// Some servers hand back structured output as a JSON value instead of a
/// string; both shapes are funneled through [`BackendReply::into_text`] so
/// the parser only ever sees text.
#[derive(Debug, Clone, PartialEq)]
pub enum BackendReply {
    Text(String),
    Object(Value),
}

impl BackendReply {
    /// Raw text of the reply. Structured values are re-serialized as pretty JSON.
    pub fn into_text(self) -> String {
        match self {
            BackendReply::Text(s) => s,
            BackendReply::Object(v) => serde_json::to_string_pretty(&v).unwrap_or_else(|_| v.to_string()),
        }
    }
}

impl From<Value> for BackendReply {
    fn from(v: Value) -> Self {
        match v {
            Value::String(s) => BackendReply::Text(s),
            other => BackendReply::Object(other),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    #[serde(default)]
    content: Value,
}

/// Response body of `/api/chat` (and the `response` field of `/api/generate`).
#[derive(Debug, Deserialize)]
struct ChatResponse {
    message: Option<ChatMessage>,
    response: Option<Value>,
}

impl ChatResponse {
    fn into_reply(self) -> Result<BackendReply, BackendError> {
        let content = self
            .message
            .map(|m| m.content)
            .or(self.response)
            .filter(|v| !v.is_null())
            .ok_or(BackendError::EmptyReply)?;
        Ok(content.into())
    }
}

/// Ollama chat client configured for deterministic decoding.
#[derive(Debug, Clone)]
pub struct OllamaBackend {
    client: reqwest::Client,
    base_url: String,
    model: String,
    num_ctx: u32,
}

impl OllamaBackend {
    pub fn new(client: reqwest::Client, settings: &Settings) -> Self {
        Self {
            client,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            model: settings.model.clone(),
            num_ctx: settings.num_ctx,
        }
    }

    fn payload(&self, request: &SummaryRequest) -> Value {
        let mut payload = json!({
            "model": self.model,
            "messages": [
                { "role": "system", "content": request.system },
                { "role": "user", "content": request.user },
            ],
            "stream": false,
            "options": {
                "temperature": 0,
                "num_ctx": self.num_ctx,
            },
        });
        if request.wants_json() {
            payload["format"] = json!("json");
        }
        payload
    }
}

#[async_trait]
impl SummaryBackend for OllamaBackend {
    #[instrument(level = "info", skip_all, fields(model = %self.model))]
    async fn complete(&self, request: &SummaryRequest) -> Result<BackendReply, BackendError> {
        let t0 = Instant::now();
        let url = format!("{}/api/chat", self.base_url);

        let resp = self
            .client
            .post(&url)
            .json(&self.payload(request))
            .send()
            .await
            .inspect_err(|e| error!(%url, error = %e, "Backend unreachable"))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            error!(status = status.as_u16(), "Backend returned an error status");
            return Err(BackendError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let reply = resp.json::<ChatResponse>().await?.into_reply()?;
        info!(elapsed_ms = t0.elapsed().as_millis() as u64, "Backend call completed");
        Ok(reply)
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}
