use std::time::Instant;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::transport::{authorize, build_client, send_json, with_retries};
use super::{FinishReason, GenerationResult, HttpBackendConfig, LlmBackend};
use crate::prompt::Message;
use crate::LlmError;

/// Ollama `/api/chat` backend
#[derive(Clone)]
pub struct OllamaBackend {
    client: Client,
    config: HttpBackendConfig,
}

impl OllamaBackend {
    pub fn new(config: HttpBackendConfig) -> Result<Self, LlmError> {
        let client = build_client(&config)?;
        Ok(Self { client, config })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api/{}", self.config.base_url(), path)
    }
}

#[async_trait]
impl LlmBackend for OllamaBackend {
    async fn generate(&self, messages: &[Message]) -> Result<GenerationResult, LlmError> {
        let started = Instant::now();
        let body = ChatRequest {
            model: &self.config.model,
            messages: messages.iter().map(WireMessage::from).collect(),
            stream: false,
            options: Options {
                temperature: self.config.temperature,
                num_predict: self.config.max_tokens,
            },
        };

        let reply: ChatResponse = with_retries(
            self.config.max_retries,
            self.config.initial_backoff,
            || send_json(authorize(self.client.post(self.url("chat")).json(&body), &self.config)),
        )
        .await?;

        let tokens = reply.eval_count.unwrap_or(0);
        tracing::debug!(model = %self.config.model, tokens, "Ollama generation complete");

        Ok(GenerationResult {
            text: reply.message.content,
            tokens,
            total_time_ms: started.elapsed().as_millis() as u64,
            finish_reason: match reply.done_reason.as_deref() {
                Some("length") => FinishReason::Length,
                _ => FinishReason::Stop,
            },
        })
    }

    async fn is_available(&self) -> bool {
        match self.client.get(self.url("tags")).send().await {
            Ok(response) => response.status().is_success(),
            Err(_) => false,
        }
    }

    fn model_name(&self) -> &str {
        &self.config.model
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<WireMessage>,
    stream: bool,
    options: Options,
}

#[derive(Serialize)]
struct Options {
    temperature: f32,
    num_predict: usize,
}

#[derive(Debug, Serialize, Deserialize)]
struct WireMessage {
    role: String,
    content: String,
}

impl From<&Message> for WireMessage {
    fn from(message: &Message) -> Self {
        Self {
            role: message.role.to_string(),
            content: message.content.clone(),
        }
    }
}

#[derive(Deserialize)]
struct ChatResponse {
    message: WireMessage,
    #[serde(default)]
    done_reason: Option<String>,
    #[serde(default)]
    eval_count: Option<usize>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_ignores_trailing_slash() {
        let backend = OllamaBackend::new(HttpBackendConfig {
            endpoint: "http://ollama:11434/".to_string(),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(backend.url("chat"), "http://ollama:11434/api/chat");
    }

    #[test]
    fn test_request_shape() {
        let messages = [Message::system("be brief"), Message::user("hi")];
        let body = ChatRequest {
            model: "llama3.2",
            messages: messages.iter().map(WireMessage::from).collect(),
            stream: false,
            options: Options {
                temperature: 0.0,
                num_predict: 64,
            },
        };

        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["messages"][0]["role"], "system");
        assert_eq!(json["messages"][1]["content"], "hi");
        assert_eq!(json["stream"], false);
        assert_eq!(json["options"]["num_predict"], 64);
    }

    #[test]
    fn test_response_without_counts() {
        let reply: ChatResponse = serde_json::from_str(
            r#"{"message":{"role":"assistant","content":"Hello"},"done":true}"#,
        )
        .unwrap();
        assert_eq!(reply.message.content, "Hello");
        assert!(reply.eval_count.is_none());
    }
}
