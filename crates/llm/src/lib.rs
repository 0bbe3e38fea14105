//! OpenAI-compatible chat-completions client used as the primary
//! generation path. Absence of a credential means the client is simply
//! not constructed; callers fall back to their local heuristics.

use anyhow::{anyhow, Context, Result};
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use std::env;
use tokio::runtime::Runtime;
use tracing::debug;

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
const DEFAULT_MODEL: &str = "gpt-4o";
const TEMPERATURE: f32 = 0.2;

#[derive(Clone)]
pub struct LlmClient {
    http: Client,
    api_key: String,
    base_url: String,
    model: String,
}

impl LlmClient {
    /// Builds a client from `OPENAI_API_KEY` / `OPENAI_API_BASE` /
    /// `OPENAI_MODEL`. Returns `None` when no key is configured, which is
    /// the signal that remote generation is unavailable.
    pub fn from_env() -> Option<Self> {
        let api_key = env::var("OPENAI_API_KEY").ok().filter(|key| !key.is_empty())?;
        let base_url =
            env::var("OPENAI_API_BASE").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        let model = env::var("OPENAI_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string());
        Some(Self {
            http: Client::new(),
            api_key,
            base_url,
            model,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub async fn complete(&self, prompt: &str) -> Result<String> {
        let url = format!("{}/chat/completions", self.base_url.trim_end_matches('/'));
        let payload = json!({
            "model": self.model,
            "messages": [{ "role": "user", "content": prompt }],
            "temperature": TEMPERATURE,
        });
        debug!(model = %self.model, "sending chat completion request");
        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&payload)
            .send()
            .await
            .with_context(|| "chat completion request failed")?
            .error_for_status()
            .context("chat completion returned an error status")?
            .json::<ChatResponse>()
            .await
            .context("failed to decode chat completion response")?;
        let text = response
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or_else(|| anyhow!("missing text in chat completion response"))?;
        Ok(text.trim().to_string())
    }

    /// Synchronous wrapper for callers outside an async context; the whole
    /// request is a single blocking round trip with no cancellation.
    pub fn complete_blocking(&self, prompt: &str) -> Result<String> {
        let rt = Runtime::new().context("failed to create tokio runtime")?;
        rt.block_on(self.complete(prompt))
    }
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Deserialize)]
struct ChatMessage {
    content: String,
}
