// In crates/insights/src/client.rs

use app_config::types::InsightSettings;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

use crate::{Error, Result};

/// The external text-generation call behind the insight service.
///
/// A trait seam so the service can be exercised without network access.
#[async_trait]
pub trait Generator: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String>;
}

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<Message>,
    temperature: f64,
    max_tokens: u32,
    stream: bool,
}

#[derive(Debug, Serialize, Deserialize)]
struct Message {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: Message,
}

const SYSTEM_PROMPT: &str = "You are a trading-performance analyst for a retail \
trading journal. Summarize the supplied metrics plainly, note strengths and \
weaknesses, and keep the tone factual. Never invent numbers.";

/// A chat-completions client (OpenAI-style endpoint).
pub struct ChatClient {
    http_client: reqwest::Client,
    api_key: String,
    base_url: String,
    model: String,
}

impl ChatClient {
    /// Constructs a new ChatClient from InsightSettings.
    ///
    /// The request timeout is set on the underlying client; a timed-out
    /// request is retried once before the failure reaches the caller.
    pub fn new(settings: &InsightSettings) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.request_timeout_secs))
            .build()?;

        Ok(ChatClient {
            http_client,
            api_key: settings.api_key.clone(),
            base_url: settings.base_url.clone(),
            model: settings.model.clone(),
        })
    }

    async fn call_once(&self, prompt: &str) -> Result<String> {
        let request = ChatRequest {
            model: self.model.clone(),
            messages: vec![
                Message {
                    role: "system".to_string(),
                    content: SYSTEM_PROMPT.to_string(),
                },
                Message {
                    role: "user".to_string(),
                    content: prompt.to_string(),
                },
            ],
            temperature: 0.3,
            max_tokens: 1024,
            stream: false,
        };

        let url = format!("{}/chat/completions", self.base_url);
        let response = self
            .http_client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&request)
            .send()
            .await
            .map_err(Error::RequestFailed)?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Generation(format!(
                "upstream returned {status}: {body}"
            )));
        }

        let chat: ChatResponse = response.json().await.map_err(Error::RequestFailed)?;
        chat.choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| Error::Generation("empty choices in response".to_string()))
    }
}

#[async_trait]
impl Generator for ChatClient {
    async fn generate(&self, prompt: &str) -> Result<String> {
        debug!(model = %self.model, "requesting insight generation");
        match self.call_once(prompt).await {
            // A timeout gets one retry; everything else surfaces directly.
            Err(Error::RequestFailed(err)) if err.is_timeout() => {
                warn!("generation request timed out, retrying once");
                self.call_once(prompt).await
            }
            other => other,
        }
    }
}
