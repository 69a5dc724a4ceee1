// Agent Engine — Completion Provider
// OpenAI-compatible chat completion behind the `Completion` trait so tests
// can inject a canned model. Single request, JSON response mode, no retries.

use crate::atoms::error::{AgentError, AgentResult};
use async_trait::async_trait;
use log::debug;
use reqwest::Client;
use serde_json::{json, Value};
use std::time::Duration;

pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

// ── Port ───────────────────────────────────────────────────────────────────

/// One system+user chat completion returning the raw assistant text.
#[async_trait]
pub trait Completion: Send + Sync {
    async fn complete(&self, system_prompt: &str, user_message: &str) -> AgentResult<String>;
}

// ── OpenAI-compatible implementation ───────────────────────────────────────

pub struct OpenAiCompatProvider {
    client: Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl OpenAiCompatProvider {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        OpenAiCompatProvider {
            client: Client::builder()
                .connect_timeout(Duration::from_secs(10))
                .timeout(Duration::from_secs(60))
                .build()
                .unwrap_or_default(),
            base_url: base_url.into(),
            api_key: api_key.into(),
            model: DEFAULT_MODEL.to_string(),
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }
}

#[async_trait]
impl Completion for OpenAiCompatProvider {
    async fn complete(&self, system_prompt: &str, user_message: &str) -> AgentResult<String> {
        let url = format!("{}/chat/completions", self.base_url.trim_end_matches('/'));
        debug!("[providers] completion request to {} ({})", url, self.model);

        let body = json!({
            "model": self.model,
            "messages": [
                { "role": "system", "content": system_prompt },
                { "role": "user", "content": user_message },
            ],
            "response_format": { "type": "json_object" },
            "temperature": 0.7,
        });

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(AgentError::synthesis(format!(
                "completion request failed ({}): {}",
                status, text,
            )));
        }

        let payload: Value = response.json().await?;
        payload["choices"][0]["message"]["content"]
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| AgentError::synthesis("completion reply had no content"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_normalizes_base_url() {
        let provider = OpenAiCompatProvider::new("https://api.example.com/v1/", "k")
            .with_model("test-model");
        assert_eq!(provider.base_url, "https://api.example.com/v1/");
        assert_eq!(provider.model, "test-model");
    }
}
