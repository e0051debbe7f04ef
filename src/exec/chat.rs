use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::error::CollaboratorError;

use super::collaborators::ChatService;

const SYSTEM_PROMPT: &str = "You are a concise local voice assistant. Answer in one or two \
short sentences suitable for speech. Never use markdown.";

/// Conversational fallback against a local llama-server completion endpoint.
#[derive(Clone)]
pub struct LlamaChat {
    client: Client,
    base_url: String,
}

#[derive(Serialize)]
struct CompletionRequest {
    prompt: String,
    stream: bool,
    n_predict: usize,
    temperature: f32,
    stop: Vec<String>,
}

#[derive(Deserialize)]
struct CompletionResponse {
    content: String,
}

impl LlamaChat {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            // Client-level cap under the dispatcher's network budget, so a
            // stalled server fails here with a clean reqwest error first.
            client: Client::builder()
                .timeout(Duration::from_secs(6))
                .build()
                .unwrap_or_default(),
            base_url: base_url.into(),
        }
    }
}

#[async_trait]
impl ChatService for LlamaChat {
    async fn chat_fallback(&self, text: &str) -> Result<String, CollaboratorError> {
        let prompt = format!("System: {}\nUser: {}\nAssistant:", SYSTEM_PROMPT, text);

        let request_body = CompletionRequest {
            prompt,
            stream: false,
            n_predict: 64,
            temperature: 0.4,
            stop: vec!["User:".to_string(), "System:".to_string()],
        };

        let response = self
            .client
            .post(format!("{}/completion", self.base_url))
            .json(&request_body)
            .send()
            .await
            .map_err(|e| CollaboratorError::Backend(format!("chat request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(CollaboratorError::Backend(format!(
                "chat server returned {}",
                response.status()
            )));
        }

        let body: CompletionResponse = response
            .json()
            .await
            .map_err(|e| CollaboratorError::Backend(format!("malformed chat reply: {}", e)))?;

        Ok(body.content.trim().to_string())
    }
}
