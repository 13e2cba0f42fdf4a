//! Schema-free single-turn chat over Ollama's native `/api/chat`.

use std::time::Duration;

use color_eyre::eyre::{eyre, Result, WrapErr};
use reqwest::blocking::Client;
use serde_json::json;
use tracing::{debug, info, instrument};

use crate::blocking::outside_runtime;
use crate::config::AssistantConfig;
use crate::ollama::ChatResponse;

/// The follow-up model turn: one user message in, one response object out.
pub trait ChatBackend: Send + Sync {
    fn chat(&self, prompt: &str) -> Result<ChatResponse>;
}

pub struct OllamaChatClient {
    client: Client,
    endpoint: String,
    model: String,
}

impl OllamaChatClient {
    pub fn new(host: &str, model: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = outside_runtime(|| {
            Client::builder()
                .timeout(timeout)
                .build()
                .wrap_err("building reqwest client for ollama chat")
        })?;
        Ok(Self {
            client,
            endpoint: format!("{}/api/chat", host.trim_end_matches('/')),
            model: model.into(),
        })
    }

    pub fn from_config(config: &AssistantConfig) -> Result<Self> {
        Self::new(&config.ollama_host, config.model.clone(), config.request_timeout)
    }
}

impl ChatBackend for OllamaChatClient {
    #[instrument(name = "raw_chat", skip(self, prompt), fields(model = %self.model, prompt_len = prompt.len()))]
    fn chat(&self, prompt: &str) -> Result<ChatResponse> {
        let body = json!({
            "model": self.model,
            "messages": [{ "role": "user", "content": prompt }],
            "stream": false,
        });

        info!(target: "ollama", "raw_chat_request: model={}", self.model);
        let (status, text) = outside_runtime(|| {
            let resp = self
                .client
                .post(&self.endpoint)
                .json(&body)
                .send()
                .wrap_err("sending ollama chat request")?;
            let status = resp.status();
            Ok((status, resp.text().unwrap_or_default()))
        })?;
        debug!(target: "ollama", status = %status, len = text.len(), "raw_chat_response_raw");

        if !status.is_success() {
            return Err(eyre!("status {}: {}", status.as_u16(), text));
        }
        serde_json::from_str(&text).wrap_err("decoding ollama chat response")
    }
}
