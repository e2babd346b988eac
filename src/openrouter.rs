//! Outbound model-call client for OpenRouter-compatible APIs.
//!
//! Defines the [`ModelClient`] trait the chat orchestrator depends on,
//! plus the production [`OpenRouterClient`] that posts to
//! `{base_url}/chat/completions` with Bearer authentication.
//!
//! The client performs no retries: the user is actively waiting on this
//! call, and a failure is surfaced as a visible assistant-channel error
//! by the orchestrator.

use anyhow::{bail, Result};
use async_trait::async_trait;
use std::time::Duration;

use crate::config::ModelConfig;

/// Abstract outbound model call.
///
/// Takes a model identifier, an optional system/context instruction
/// string, and the user message; returns the assistant text or an error.
#[async_trait]
pub trait ModelClient: Send + Sync {
    async fn chat(&self, model: &str, system: Option<&str>, user: &str) -> Result<String>;
}

/// Client for the OpenRouter chat-completions API (or any compatible
/// endpoint configured via `[model] base_url`).
pub struct OpenRouterClient {
    base_url: String,
    api_key: String,
    referer: String,
    client: reqwest::Client,
}

impl OpenRouterClient {
    pub fn new(config: &ModelConfig, api_key: String) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key,
            referer: config.referer.clone(),
            client,
        })
    }
}

#[async_trait]
impl ModelClient for OpenRouterClient {
    async fn chat(&self, model: &str, system: Option<&str>, user: &str) -> Result<String> {
        let mut messages = Vec::new();
        if let Some(system) = system {
            messages.push(serde_json::json!({ "role": "system", "content": system }));
        }
        messages.push(serde_json::json!({ "role": "user", "content": user }));

        let body = serde_json::json!({
            "model": model,
            "messages": messages,
        });

        let url = format!("{}/chat/completions", self.base_url);
        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .header("HTTP-Referer", &self.referer)
            .header("X-Title", "docchat")
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            bail!("API request failed: {} {}", status, text);
        }

        let json: serde_json::Value = response.json().await?;
        let content = json["choices"]
            .get(0)
            .and_then(|choice| choice["message"]["content"].as_str())
            .ok_or_else(|| anyhow::anyhow!("No response received"))?;

        Ok(content.to_string())
    }
}
